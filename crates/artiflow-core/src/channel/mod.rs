//! Grafo de canales.
//!
//! Un `Channel` es un handle tipado a una colección de artifacts y un nodo del
//! grafo de dependencias del pipeline. Las variantes viven en `ChannelKind`;
//! los datos comunes (identidad, tipo, flags de bookkeeping) en `Channel`.
//!
//! Invariantes:
//! - Cada canal tiene exactamente un tipo de artifact.
//! - Los hijos se guardan como `Arc<Channel>` inmutables: el grafo puede
//!   leerse concurrentemente una vez construido.
//! - Los flags mutables (`is_optional`, `is_async`, pipeline dueño) se
//!   modifican sólo sobre el receptor; las copias derivadas tienen los suyos.
//! - `additional_properties` y `additional_custom_properties` se comparten
//!   entre un canal y sus copias derivadas: un cambio en el padre se ve en
//!   `as_output_channel` / `as_optional`.
//! - Dos tipos de artifact son el mismo si coinciden nombre y propiedades.

mod dependency;
mod json;
mod union;

pub use union::union;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

use crate::errors::{LineageError, Result};
use crate::model::{Artifact, ArtifactType, PropertyValue};
use crate::resolver::ResolverNode;

/// Identidad de un nodo del grafo. Se asigna al construir el canal y no se
/// copia en derivaciones (`as_optional`, `as_output_channel`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelId(Uuid);

impl ChannelId {
    fn fresh() -> Self {
        ChannelId(Uuid::new_v4())
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub enum ChannelKind {
    /// Colección estática (posiblemente vacía: input declarado aún sin
    /// resolver).
    Declared { artifacts: Vec<Artifact> },
    /// Salida `output_key` del nodo `producer_id`.
    Output { producer_id: String, output_key: String },
    /// Entrada de un sub-pipeline; la dependencia se atribuye al pipeline.
    PipelineInput {
        wrapped: Arc<Channel>,
        output_key: String,
        pipeline_id: Option<String>,
    },
    /// Salida de un sub-pipeline hacia fuera.
    PipelineOutput {
        wrapped: Arc<Channel>,
        pipeline_id: String,
        output_key: String,
    },
    /// Secuencia ordenada y aplanada de canales del mismo tipo.
    Union { channels: Vec<Arc<Channel>> },
    /// Resolución diferida: árbol de operadores sobre otros canales.
    Resolved { node: ResolverNode },
}

/// Propiedades que se estampan en los artifacts publicados por el canal.
pub type SharedProperties = Arc<RwLock<IndexMap<String, PropertyValue>>>;

#[derive(Debug, Clone)]
pub struct Channel {
    id: ChannelId,
    artifact_type: Arc<ArtifactType>,
    kind: ChannelKind,
    is_optional: Option<bool>,
    is_async: bool,
    additional_properties: SharedProperties,
    additional_custom_properties: SharedProperties,
}

impl Channel {
    fn from_kind(artifact_type: Arc<ArtifactType>, kind: ChannelKind) -> Self {
        Self { id: ChannelId::fresh(),
               artifact_type,
               kind,
               is_optional: None,
               is_async: false,
               additional_properties: SharedProperties::default(),
               additional_custom_properties: SharedProperties::default() }
    }

    /// Canal declarado sin artifacts.
    pub fn declared(artifact_type: Arc<ArtifactType>) -> Self {
        Self::from_kind(artifact_type, ChannelKind::Declared { artifacts: vec![] })
    }

    /// Canal declarado con artifacts estáticos. Valida el tipo de todos antes
    /// de guardar ninguno.
    pub fn with_artifacts(artifact_type: Arc<ArtifactType>, artifacts: Vec<Artifact>) -> Result<Self> {
        check_artifact_types(&artifact_type, &artifacts)?;
        Ok(Self::from_kind(artifact_type, ChannelKind::Declared { artifacts }))
    }

    pub fn output(artifact_type: Arc<ArtifactType>, producer_id: impl Into<String>, output_key: impl Into<String>) -> Self {
        Self::from_kind(artifact_type,
                        ChannelKind::Output { producer_id: producer_id.into(),
                                              output_key: output_key.into() })
    }

    /// Adaptador de entrada a sub-pipeline. El pipeline dueño se fija luego
    /// con `set_pipeline`.
    pub fn pipeline_input(wrapped: &Channel, output_key: impl Into<String>) -> Self {
        Self::from_kind(wrapped.artifact_type.clone(),
                        ChannelKind::PipelineInput { wrapped: Arc::new(wrapped.clone()),
                                                     output_key: output_key.into(),
                                                     pipeline_id: None })
    }

    pub fn pipeline_output(wrapped: &Channel, pipeline_id: impl Into<String>, output_key: impl Into<String>) -> Self {
        Self::from_kind(wrapped.artifact_type.clone(),
                        ChannelKind::PipelineOutput { wrapped: Arc::new(wrapped.clone()),
                                                      pipeline_id: pipeline_id.into(),
                                                      output_key: output_key.into() })
    }

    /// Canal resuelto: `node` debe producir artifacts de `artifact_type`.
    pub fn resolved(artifact_type: Arc<ArtifactType>, node: ResolverNode) -> Result<Self> {
        let found = node.artifact_type();
        if **found != *artifact_type {
            return Err(LineageError::type_mismatch(&artifact_type.name, &found.name));
        }
        Ok(Self::from_kind(artifact_type, ChannelKind::Resolved { node }))
    }

    /// Atajo: canal resuelto cuyo tipo se toma del árbol.
    pub fn resolved_from(node: ResolverNode) -> Self {
        let ty = node.artifact_type().clone();
        Self::from_kind(ty, ChannelKind::Resolved { node })
    }

    pub(crate) fn union_of(artifact_type: Arc<ArtifactType>, channels: Vec<Arc<Channel>>) -> Self {
        Self::from_kind(artifact_type, ChannelKind::Union { channels })
    }

    pub fn id(&self) -> ChannelId {
        self.id
    }

    pub fn artifact_type(&self) -> &Arc<ArtifactType> {
        &self.artifact_type
    }

    pub fn type_name(&self) -> &str {
        &self.artifact_type.name
    }

    pub fn kind(&self) -> &ChannelKind {
        &self.kind
    }

    /// `None` = no especificado (se trata como requerido).
    pub fn is_optional(&self) -> Option<bool> {
        self.is_optional
    }

    pub fn is_async(&self) -> bool {
        self.is_async
    }

    /// Misma identidad de nodo (no igualdad de valor).
    pub fn same_channel(&self, other: &Channel) -> bool {
        self.id == other.id
    }

    pub fn producer_id(&self) -> Option<&str> {
        match &self.kind {
            ChannelKind::Output { producer_id, .. } => Some(producer_id),
            ChannelKind::PipelineOutput { pipeline_id, .. } => Some(pipeline_id),
            _ => None,
        }
    }

    pub fn output_key(&self) -> Option<&str> {
        match &self.kind {
            ChannelKind::Output { output_key, .. }
            | ChannelKind::PipelineInput { output_key, .. }
            | ChannelKind::PipelineOutput { output_key, .. } => Some(output_key),
            _ => None,
        }
    }

    /// Artifacts estáticos de un canal declarado.
    pub fn artifacts(&self) -> Option<&[Artifact]> {
        match &self.kind {
            ChannelKind::Declared { artifacts } => Some(artifacts),
            _ => None,
        }
    }

    /// Miembros de una unión (ya aplanados).
    pub fn members(&self) -> Option<&[Arc<Channel>]> {
        match &self.kind {
            ChannelKind::Union { channels } => Some(channels),
            _ => None,
        }
    }

    /// Snapshot de las propiedades adicionales.
    pub fn additional_properties(&self) -> IndexMap<String, PropertyValue> {
        snapshot(&self.additional_properties)
    }

    pub fn additional_custom_properties(&self) -> IndexMap<String, PropertyValue> {
        snapshot(&self.additional_custom_properties)
    }

    /// Fija una propiedad adicional; la ven también las copias derivadas.
    pub fn set_additional_property(&self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        write(&self.additional_properties, name.into(), value.into());
    }

    pub fn set_additional_custom_property(&self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        write(&self.additional_custom_properties, name.into(), value.into());
    }

    /// Estampa las propiedades adicionales en `artifact`. Las propiedades
    /// declaradas se validan contra su tipo (`InvalidArgument` si no cuadran).
    pub fn stamp(&self, artifact: Artifact) -> Result<Artifact> {
        let mut stamped = artifact;
        for (name, value) in self.additional_properties() {
            stamped.set_property(&name, value)?;
        }
        for (name, value) in self.additional_custom_properties() {
            stamped.set_custom_property(&name, value);
        }
        Ok(stamped)
    }

    /// Reemplaza los artifacts de un canal declarado. Si algún artifact es de
    /// otro tipo, falla sin modificar el canal.
    pub fn set_artifacts(&mut self, new_artifacts: Vec<Artifact>) -> Result<()> {
        check_artifact_types(&self.artifact_type, &new_artifacts)?;
        match &mut self.kind {
            ChannelKind::Declared { artifacts } => {
                *artifacts = new_artifacts;
                Ok(())
            }
            _ => Err(LineageError::Usage("set_artifacts is only valid on declared channels".into())),
        }
    }

    /// Copia marcada como opcional. El canal original no cambia.
    pub fn as_optional(&self) -> Channel {
        let mut copy = self.clone();
        copy.id = ChannelId::fresh();
        copy.is_optional = Some(true);
        copy
    }

    /// Marca el canal como asíncrono. Sólo aplica a canales de salida.
    pub fn set_as_async_channel(&mut self) -> Result<()> {
        match self.kind {
            ChannelKind::Output { .. } => {
                self.is_async = true;
                Ok(())
            }
            _ => Err(LineageError::Usage(format!("channel of type {} is not an output channel", self.type_name()))),
        }
    }

    /// Fija el pipeline dueño de un canal de entrada de sub-pipeline.
    pub fn set_pipeline(&mut self, id: impl Into<String>) -> Result<()> {
        match &mut self.kind {
            ChannelKind::PipelineInput { pipeline_id, .. } => {
                *pipeline_id = Some(id.into());
                Ok(())
            }
            _ => Err(LineageError::Usage("set_pipeline is only valid on pipeline input channels".into())),
        }
    }

    /// Convierte un canal declarado en la salida `output_key` de `producer_id`
    /// con el mismo tipo.
    pub fn as_output_channel(&self, producer_id: impl Into<String>, output_key: impl Into<String>) -> Result<Channel> {
        match self.kind {
            ChannelKind::Declared { .. } => {
                let mut out = Channel::output(self.artifact_type.clone(), producer_id, output_key);
                out.is_optional = self.is_optional;
                out.additional_properties = self.additional_properties.clone();
                out.additional_custom_properties = self.additional_custom_properties.clone();
                Ok(out)
            }
            _ => Err(LineageError::Usage("as_output_channel is only valid on declared channels".into())),
        }
    }
}

fn snapshot(props: &SharedProperties) -> IndexMap<String, PropertyValue> {
    props.read().unwrap_or_else(PoisonError::into_inner).clone()
}

fn write(props: &SharedProperties, name: String, value: PropertyValue) {
    props.write().unwrap_or_else(PoisonError::into_inner).insert(name, value);
}

fn check_artifact_types(expected: &ArtifactType, artifacts: &[Artifact]) -> Result<()> {
    match artifacts.iter().find(|a| *a.artifact_type != *expected) {
        Some(bad) => Err(LineageError::type_mismatch(&expected.name, bad.type_name())),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn my_type() -> Arc<ArtifactType> {
        ArtifactType::new("MyTypeName").into_shared()
    }

    fn another_type() -> Arc<ArtifactType> {
        ArtifactType::new("AnotherTypeName").into_shared()
    }

    #[test]
    fn declared_channel_keeps_artifacts() {
        let a = Artifact::new(my_type());
        let b = Artifact::new(my_type());
        let ch = Channel::with_artifacts(my_type(), vec![a, b]).unwrap();
        assert_eq!(ch.type_name(), "MyTypeName");
        assert_eq!(ch.artifacts().map(|a| a.len()), Some(2));
    }

    #[test]
    fn wrong_artifact_type_is_rejected_before_storing() {
        let good = Artifact::new(another_type());
        let mut ch = Channel::with_artifacts(another_type(), vec![good]).unwrap();

        let err = ch.set_artifacts(vec![Artifact::new(another_type()), Artifact::new(my_type())])
                    .unwrap_err();
        assert_eq!(err, LineageError::type_mismatch("AnotherTypeName", "MyTypeName"));
        assert_eq!(ch.artifacts().map(|a| a.len()), Some(1));

        assert!(Channel::with_artifacts(another_type(), vec![Artifact::new(my_type())]).is_err());
    }

    #[test]
    fn as_optional_does_not_touch_the_parent() {
        let required = Channel::output(my_type(), "x1", "out1");
        let mut optional = required.as_optional();

        assert_eq!(required.is_optional(), None);
        assert_eq!(optional.is_optional(), Some(true));
        assert_eq!(optional.producer_id(), required.producer_id());
        assert!(!optional.same_channel(&required));

        optional.set_as_async_channel().unwrap();
        assert!(optional.is_async());
        assert!(!required.is_async());
    }

    #[test]
    fn async_flag_only_applies_to_output_channels() {
        let mut ch = Channel::declared(my_type());
        assert!(matches!(ch.set_as_async_channel(), Err(LineageError::Usage(_))));
    }

    #[test]
    fn as_output_channel_keeps_type() {
        let ch = Channel::declared(my_type());
        let out = ch.as_output_channel("n1", "x").unwrap();
        assert_eq!(out.type_name(), "MyTypeName");
        assert_eq!(out.producer_id(), Some("n1"));
        assert_eq!(out.output_key(), Some("x"));
        assert!(out.as_output_channel("n2", "y").is_err());
    }

    #[test]
    fn as_output_channel_shares_additional_properties() {
        let ch1 = Channel::declared(my_type());
        ch1.set_additional_property("string_value", "foo");
        ch1.set_additional_custom_property("another_string_value", "bar");
        let ch2 = ch1.as_output_channel("n1", "x").unwrap();

        assert_eq!(ch2.additional_properties().get("string_value"), Some(&PropertyValue::from("foo")));
        assert_eq!(ch2.additional_custom_properties().get("another_string_value"),
                   Some(&PropertyValue::from("bar")));

        ch1.set_additional_property("string_value", "foo2");
        ch1.set_additional_custom_property("another_string_value", "bar2");
        assert_eq!(ch2.additional_properties().len(), 1);
        assert_eq!(ch2.additional_properties().get("string_value"), Some(&PropertyValue::from("foo2")));
        assert_eq!(ch2.additional_custom_properties().get("another_string_value"),
                   Some(&PropertyValue::from("bar2")));
    }

    #[test]
    fn stamp_validates_declared_properties() {
        let ch = Channel::declared(ArtifactType::spanned("Examples").into_shared());
        ch.set_additional_property("span", 4i64);
        ch.set_additional_custom_property("tag", "nightly");
        let a = ch.stamp(Artifact::new(ch.artifact_type().clone())).unwrap();
        assert_eq!(a.span(), Some(4));
        assert_eq!(a.custom_property("tag"), Some(&PropertyValue::from("nightly")));

        ch.set_additional_property("span", "four");
        let err = ch.stamp(Artifact::new(ch.artifact_type().clone())).unwrap_err();
        assert!(matches!(err, LineageError::InvalidArgument(_)));
    }

    #[test]
    fn same_name_with_other_properties_is_another_type() {
        let plain = ArtifactType::new("MyTypeName").into_shared();
        let spanned = ArtifactType::spanned("MyTypeName").into_shared();
        assert!(Channel::with_artifacts(plain.clone(), vec![Artifact::new(spanned.clone())]).is_err());
        let node = ResolverNode::input(&Channel::declared(spanned));
        assert!(matches!(Channel::resolved(plain, node), Err(LineageError::TypeMismatch { .. })));
    }

    #[test]
    fn resolved_channel_checks_node_type() {
        let input = Channel::output(my_type(), "x1", "out");
        let node = ResolverNode::input(&input);
        assert!(Channel::resolved(my_type(), node.clone()).is_ok());
        assert!(matches!(Channel::resolved(another_type(), node), Err(LineageError::TypeMismatch { .. })));
    }
}
