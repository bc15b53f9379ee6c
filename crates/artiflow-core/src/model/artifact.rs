//! Registro de artifact: la unidad sobre la que operan todos los algoritmos.
//!
//! Un `Artifact` es inmutable una vez publicado en el pool:
//! - `id` lo asigna la persistencia; `None` significa un registro en memoria
//!   aún no persistido, que nunca se deduplica por valor.
//! - `properties` sólo admite propiedades declaradas por el `ArtifactType` y
//!   con el tipo declarado; `custom_properties` es libre.
//! - `create_time`/`last_update_time` los asigna la persistencia.
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{ArtifactType, PropertyValue, SPAN_PROPERTY, VERSION_PROPERTY};
use crate::errors::{LineageError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(default)]
    pub id: Option<i64>,
    pub artifact_type: Arc<ArtifactType>,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    properties: IndexMap<String, PropertyValue>,
    #[serde(default)]
    pub custom_properties: IndexMap<String, PropertyValue>,
    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_update_time: Option<DateTime<Utc>>,
}

impl Artifact {
    pub fn new(artifact_type: Arc<ArtifactType>) -> Self {
        Self { id: None,
               artifact_type,
               uri: String::new(),
               properties: IndexMap::new(),
               custom_properties: IndexMap::new(),
               create_time: None,
               last_update_time: None }
    }

    pub fn type_name(&self) -> &str {
        &self.artifact_type.name
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = uri.into();
        self
    }

    pub fn with_create_time(mut self, ts: DateTime<Utc>) -> Self {
        self.create_time = Some(ts);
        self
    }

    /// Builder validado de `set_property`.
    pub fn with_property(mut self, name: &str, value: impl Into<PropertyValue>) -> Result<Self> {
        self.set_property(name, value)?;
        Ok(self)
    }

    /// Fija una propiedad declarada. Falla con `InvalidArgument` si el tipo no
    /// la declara o si el valor no coincide con el tipo declarado.
    pub fn set_property(&mut self, name: &str, value: impl Into<PropertyValue>) -> Result<()> {
        let value = value.into();
        self.check_property(name, &value)?;
        self.properties.insert(name.to_string(), value);
        Ok(())
    }

    /// Revalida todas las propiedades contra el tipo. Necesario para
    /// artifacts que llegan deserializados, que no pasan por `set_property`.
    pub fn validate(&self) -> Result<()> {
        self.properties
            .iter()
            .try_for_each(|(name, value)| self.check_property(name, value))
    }

    fn check_property(&self, name: &str, value: &PropertyValue) -> Result<()> {
        let declared = self.artifact_type.property_type(name).ok_or_else(|| {
                           LineageError::InvalidArgument(format!("artifact type {} has no property {name}",
                                                                 self.type_name()))
                       })?;
        if declared != value.property_type() {
            return Err(LineageError::InvalidArgument(format!("property {name} of {} expects {:?}, got {:?}",
                                                             self.type_name(),
                                                             declared,
                                                             value.property_type())));
        }
        Ok(())
    }

    pub fn set_custom_property(&mut self, name: &str, value: impl Into<PropertyValue>) {
        self.custom_properties.insert(name.to_string(), value.into());
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    pub fn properties(&self) -> &IndexMap<String, PropertyValue> {
        &self.properties
    }

    pub fn custom_property(&self, name: &str) -> Option<&PropertyValue> {
        self.custom_properties.get(name)
    }

    pub fn span(&self) -> Option<i64> {
        self.property(SPAN_PROPERTY).and_then(PropertyValue::as_int)
    }

    pub fn version(&self) -> Option<i64> {
        self.property(VERSION_PROPERTY).and_then(PropertyValue::as_int)
    }

    pub fn set_span(&mut self, span: i64) -> Result<()> {
        self.set_property(SPAN_PROPERTY, span)
    }

    pub fn set_version(&mut self, version: i64) -> Result<()> {
        self.set_property(VERSION_PROPERTY, version)
    }

    /// Identidad de artifact: ambos persistidos y con el mismo `id`.
    pub fn same_artifact(&self, other: &Artifact) -> bool {
        matches!((self.id, other.id), (Some(a), Some(b)) if a == b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PropertyType;

    fn examples() -> Arc<ArtifactType> {
        ArtifactType::spanned("Examples").into_shared()
    }

    #[test]
    fn declared_properties_are_typed() {
        let mut a = Artifact::new(examples());
        a.set_span(3).unwrap();
        assert_eq!(a.span(), Some(3));
        assert!(a.version().is_none());

        let err = a.set_property("span", "three").unwrap_err();
        assert!(matches!(err, LineageError::InvalidArgument(_)));
    }

    #[test]
    fn undeclared_property_is_rejected() {
        let plain = ArtifactType::new("Model").with_property("version", PropertyType::Int)
                                              .into_shared();
        let mut a = Artifact::new(plain);
        assert!(a.set_span(1).is_err());
        a.set_version(1).unwrap();
        a.set_custom_property("anything", "goes");
        assert_eq!(a.custom_property("anything"), Some(&PropertyValue::from("goes")));
    }

    #[test]
    fn validate_catches_deserialized_properties() {
        let raw = serde_json::json!({
            "artifact_type": {"name": "Examples", "properties": {"span": "int"}},
            "properties": {"span": {"string": "three"}, "bogus": {"int": 1}}
        });
        let a: Artifact = serde_json::from_value(raw).unwrap();
        assert!(matches!(a.validate(), Err(LineageError::InvalidArgument(_))));

        let ok: Artifact = serde_json::from_value(serde_json::json!({
                               "artifact_type": {"name": "Examples", "properties": {"span": "int"}},
                               "properties": {"span": {"int": 3}}
                           })).unwrap();
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn unpersisted_artifacts_are_never_the_same() {
        let a = Artifact::new(examples());
        let b = a.clone();
        assert!(!a.same_artifact(&b));
        assert!(a.clone().with_id(7).same_artifact(&b.with_id(7)));
    }
}
