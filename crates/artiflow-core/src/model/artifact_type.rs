//! Esquema nombrado de un artifact: un conjunto fijo de propiedades tipadas.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::PropertyType;

/// Propiedad bien conocida: bucket lógico de tiempo.
pub const SPAN_PROPERTY: &str = "span";
/// Propiedad bien conocida: desempate entre artifacts del mismo span.
pub const VERSION_PROPERTY: &str = "version";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactType {
    pub name: String,
    #[serde(default)]
    pub properties: IndexMap<String, PropertyType>,
}

impl ArtifactType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(),
               properties: IndexMap::new() }
    }

    /// Builder: declara una propiedad tipada.
    pub fn with_property(mut self, name: impl Into<String>, ty: PropertyType) -> Self {
        self.properties.insert(name.into(), ty);
        self
    }

    /// Tipo con `span` y `version` enteros declarados (el caso habitual de
    /// datos particionados en el tiempo).
    pub fn spanned(name: impl Into<String>) -> Self {
        Self::new(name).with_property(SPAN_PROPERTY, PropertyType::Int)
                       .with_property(VERSION_PROPERTY, PropertyType::Int)
    }

    pub fn property_type(&self, name: &str) -> Option<PropertyType> {
        self.properties.get(name).copied()
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}
