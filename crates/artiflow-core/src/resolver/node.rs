//! Árbol simbólico de operadores: `Input(canal)` en las hojas y `Op` encima.
//!
//! Un `Op` puede tener varias entradas (del mismo tipo de artifact): sus
//! salidas se concatenan en orden antes de aplicar el operador.
use log::debug;
use serde_json::json;
use std::sync::Arc;

use super::ResolverOp;
use crate::channel::Channel;
use crate::errors::{LineageError, Result};
use crate::hashing::hash_value;
use crate::model::{Artifact, ArtifactType};

#[derive(Debug, Clone)]
pub enum ResolverNode {
    /// Hoja: la colección de artifacts de otro canal.
    Input(Arc<Channel>),
    /// Aplicación de un operador sobre la concatenación de `inputs`.
    Op {
        op: Arc<dyn ResolverOp>,
        inputs: Vec<ResolverNode>,
        artifact_type: Arc<ArtifactType>,
    },
}

impl ResolverNode {
    /// Hoja sobre una copia del canal tomada en este momento.
    pub fn input(channel: &Channel) -> Self {
        ResolverNode::Input(Arc::new(channel.clone()))
    }

    pub fn then<O: ResolverOp + 'static>(self, op: O) -> Self {
        self.then_shared(Arc::new(op))
    }

    pub fn then_shared(self, op: Arc<dyn ResolverOp>) -> Self {
        let artifact_type = self.artifact_type().clone();
        ResolverNode::Op { op,
                           inputs: vec![self],
                           artifact_type }
    }

    /// Operador sobre varias entradas. Falla si no hay entradas o si sus
    /// tipos difieren.
    pub fn combine(op: Arc<dyn ResolverOp>, inputs: Vec<ResolverNode>) -> Result<Self> {
        let first = inputs.first()
                          .ok_or_else(|| LineageError::InvalidArgument(format!("{} needs at least one input", op.name())))?;
        let artifact_type = first.artifact_type().clone();
        if let Some(bad) = inputs.iter().find(|n| **n.artifact_type() != *artifact_type) {
            return Err(LineageError::type_mismatch(&artifact_type.name, &bad.artifact_type().name));
        }
        Ok(ResolverNode::Op { op,
                              inputs,
                              artifact_type })
    }

    /// Canales referenciados por las hojas del árbol, de izquierda a derecha.
    pub fn input_channels(&self) -> Vec<&Arc<Channel>> {
        match self {
            ResolverNode::Input(ch) => vec![ch],
            ResolverNode::Op { inputs, .. } => inputs.iter().flat_map(ResolverNode::input_channels).collect(),
        }
    }

    /// Los operadores preservan el tipo de sus entradas.
    pub fn artifact_type(&self) -> &Arc<ArtifactType> {
        match self {
            ResolverNode::Input(ch) => ch.artifact_type(),
            ResolverNode::Op { artifact_type, .. } => artifact_type,
        }
    }

    /// Nombres de operadores en post-orden (hojas primero).
    pub fn op_names(&self) -> Vec<&'static str> {
        match self {
            ResolverNode::Input(_) => vec![],
            ResolverNode::Op { op, inputs, .. } => {
                let mut names: Vec<&'static str> = inputs.iter().flat_map(ResolverNode::op_names).collect();
                names.push(op.name());
                names
            }
        }
    }

    /// Hash estable del árbol: operadores, parámetros e identidad de los
    /// canales hoja.
    pub fn fingerprint(&self) -> String {
        match self {
            ResolverNode::Input(ch) => hash_value(&json!({ "input": ch.id().to_string() })),
            ResolverNode::Op { op, inputs, .. } => {
                let inputs: Vec<String> = inputs.iter().map(ResolverNode::fingerprint).collect();
                hash_value(&json!({ "op": op.fingerprint(), "inputs": inputs }))
            }
        }
    }

    /// Evalúa el árbol. `load` resuelve las hojas (lo provee el resolver).
    pub fn evaluate<F>(&self, load: &mut F) -> Result<Vec<Artifact>>
        where F: FnMut(&Channel) -> Result<Vec<Artifact>>
    {
        match self {
            ResolverNode::Input(ch) => load(ch),
            ResolverNode::Op { op, inputs, .. } => {
                let mut artifacts = Vec::new();
                for input in inputs {
                    artifacts.extend(input.evaluate(load)?);
                }
                let out = op.apply(&artifacts)?;
                debug!("resolver op {} applied: {} -> {} artifacts", op.name(), artifacts.len(), out.len());
                Ok(out)
            }
        }
    }
}
