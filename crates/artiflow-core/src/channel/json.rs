//! Forma JSON de canales declarados y de salida.
//!
//! ```json
//! { "type": {"name": "Examples", "properties": {"span": "int"}},
//!   "additional_properties": {"split": {"string": "train"}},
//!   "additional_custom_properties": {},
//!   "producer_component_id": "gen", "output_key": "examples" }
//! ```
//!
//! El tipo se reconstruye del propio JSON, así que un nombre de tipo que nadie
//! registró vuelve igual, con sus propiedades.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, RwLock};

use super::{Channel, ChannelKind};
use crate::errors::{LineageError, Result};
use crate::model::{Artifact, ArtifactType, PropertyValue};

#[derive(Serialize, Deserialize)]
struct ChannelJson {
    #[serde(rename = "type")]
    artifact_type: ArtifactType,
    #[serde(default)]
    additional_properties: IndexMap<String, PropertyValue>,
    #[serde(default)]
    additional_custom_properties: IndexMap<String, PropertyValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    artifacts: Vec<Artifact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    producer_component_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output_key: Option<String>,
}

impl Channel {
    /// Serializa un canal declarado o de salida. Uniones, canales resueltos y
    /// adaptadores de pipeline no tienen forma JSON (`Usage`).
    pub fn to_json(&self) -> Result<Value> {
        let (artifacts, producer_component_id, output_key) = match &self.kind {
            ChannelKind::Declared { artifacts } => (artifacts.clone(), None, None),
            ChannelKind::Output { producer_id, output_key } => {
                (vec![], Some(producer_id.clone()), Some(output_key.clone()))
            }
            _ => {
                return Err(LineageError::Usage(format!("channel of type {} cannot be serialized to JSON",
                                                       self.type_name())))
            }
        };
        let doc = ChannelJson { artifact_type: (*self.artifact_type).clone(),
                                additional_properties: self.additional_properties(),
                                additional_custom_properties: self.additional_custom_properties(),
                                artifacts,
                                producer_component_id,
                                output_key };
        serde_json::to_value(doc).map_err(|e| LineageError::InvalidArgument(e.to_string()))
    }

    /// Inverso de `to_json`: canal de salida si trae productor y output key,
    /// declarado en otro caso. Canal nuevo, con id propio.
    pub fn from_json(value: &Value) -> Result<Channel> {
        let doc = ChannelJson::deserialize(value).map_err(|e| LineageError::InvalidArgument(format!("channel JSON: {e}")))?;
        doc.artifacts.iter().try_for_each(Artifact::validate)?;
        let artifact_type = Arc::new(doc.artifact_type);
        let mut channel = match (doc.producer_component_id, doc.output_key) {
            (Some(producer), Some(key)) if doc.artifacts.is_empty() => Channel::output(artifact_type, producer, key),
            (None, None) => Channel::with_artifacts(artifact_type, doc.artifacts)?,
            _ => {
                return Err(LineageError::InvalidArgument("channel JSON needs both producer_component_id and output_key, and no artifacts for outputs".into()))
            }
        };
        channel.additional_properties = Arc::new(RwLock::new(doc.additional_properties));
        channel.additional_custom_properties = Arc::new(RwLock::new(doc.additional_custom_properties));
        Ok(channel)
    }
}
