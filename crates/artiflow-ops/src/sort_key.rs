//! Claves de orden de versiones dentro de un span.
//!
//! Las rutas se resuelven al construir el operador a un conjunto cerrado de
//! accesores; en `apply` no hay parsing ni errores.
use std::cmp::Ordering;

use artiflow_core::model::{Artifact, PropertyValue};
use artiflow_core::{LineageError, Result};

const MLMD_PREFIX: &str = "mlmd_artifact.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    Id,
    Uri,
    CreateTime,
    LastUpdateTime,
    /// Propiedad declarada (incluye `span` y `version`).
    Property(String),
    CustomProperty(String),
}

impl SortKey {
    /// Resuelve una ruta como `version`, `properties.foo` o
    /// `mlmd_artifact.create_time_since_epoch`.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(LineageError::InvalidArgument("Empty string is not allowed in version_sort_keys".into()));
        }
        let path = raw.strip_prefix(MLMD_PREFIX).unwrap_or(raw);
        let key = match path {
            "id" => SortKey::Id,
            "uri" => SortKey::Uri,
            "create_time_since_epoch" => SortKey::CreateTime,
            "last_update_time_since_epoch" => SortKey::LastUpdateTime,
            _ => match path.split_once('.') {
                Some(("properties", name)) if is_plain(name) => SortKey::Property(name.to_string()),
                Some(("custom_properties", name)) if is_plain(name) => SortKey::CustomProperty(name.to_string()),
                None if !path.is_empty() => SortKey::Property(path.to_string()),
                _ => return Err(LineageError::InvalidArgument(format!("unsupported version sort key: {raw}"))),
            },
        };
        Ok(key)
    }

    /// Valor de la clave en `artifact`; `None` si el artifact no lo tiene.
    pub fn value(&self, artifact: &Artifact) -> Option<PropertyValue> {
        match self {
            SortKey::Id => artifact.id.map(PropertyValue::Int),
            SortKey::Uri => Some(PropertyValue::String(artifact.uri.clone())),
            SortKey::CreateTime => artifact.create_time.map(|t| PropertyValue::Int(t.timestamp_millis())),
            SortKey::LastUpdateTime => artifact.last_update_time.map(|t| PropertyValue::Int(t.timestamp_millis())),
            SortKey::Property(name) => artifact.property(name).cloned(),
            SortKey::CustomProperty(name) => artifact.custom_property(name).cloned(),
        }
    }
}

fn is_plain(name: &str) -> bool {
    !name.is_empty() && !name.contains('.')
}

/// Parsea todas las claves; falla con la primera inválida.
pub fn parse_all(raw: &[String]) -> Result<Vec<SortKey>> {
    raw.iter().map(|k| SortKey::parse(k)).collect()
}

/// Orden ascendente por `keys` y luego por `id`. Un valor ausente queda por
/// debajo de cualquier valor presente.
pub fn compare_versions(a: &Artifact, b: &Artifact, keys: &[SortKey]) -> Ordering {
    keys.iter()
        .map(|k| compare_optional(k.value(a), k.value(b)))
        .find(|o| o.is_ne())
        .unwrap_or_else(|| a.id.cmp(&b.id))
}

fn compare_optional(a: Option<PropertyValue>, b: Option<PropertyValue>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (a, b) => a.is_some().cmp(&b.is_some()),
    }
}
