//! artiflow-core: grafo de canales, placeholders y resolución de inputs.
pub mod channel;
pub mod errors;
pub mod hashing;
pub mod model;
pub mod placeholder;
pub mod resolution;
pub mod resolver;

pub use channel::{union, Channel, ChannelId, ChannelKind};
pub use errors::{LineageError, Result};
pub use model::{Artifact, ArtifactType, PropertyType, PropertyValue};
pub use placeholder::{ChannelValues, Placeholder, PlaceholderValue};
pub use resolution::{ArtifactPool, InputResolver, PoolEntry, ResolvedInputs};
pub use resolver::{ResolverNode, ResolverOp};
