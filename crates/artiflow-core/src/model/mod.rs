//! Modelo de datos: `Artifact`, `ArtifactType` y valores de propiedades.

pub mod artifact;
pub mod artifact_type;
pub mod property;

pub use artifact::Artifact;
pub use artifact_type::{ArtifactType, SPAN_PROPERTY, VERSION_PROPERTY};
pub use property::{PropertyType, PropertyValue};
