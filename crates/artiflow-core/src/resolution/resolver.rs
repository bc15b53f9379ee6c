use indexmap::IndexMap;
use log::{debug, warn};
use rayon::prelude::*;
use std::collections::{BTreeSet, HashSet};

use super::ArtifactPool;
use crate::channel::{Channel, ChannelKind};
use crate::errors::Result;
use crate::model::Artifact;
use crate::placeholder::ChannelValues;

/// Resuelve canales sobre un snapshot inmutable del pool.
///
/// No guarda estado mutable entre llamadas: varias resoluciones pueden correr
/// en paralelo sobre el mismo pool.
pub struct InputResolver<'a> {
    pool: &'a ArtifactPool,
    parallel: bool,
}

impl<'a> InputResolver<'a> {
    pub fn new(pool: &'a ArtifactPool) -> Self {
        Self { pool,
               parallel: true }
    }

    /// Activa/desactiva la resolución paralela en `resolve_all`.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Artifacts concretos de `channel`.
    ///
    /// - Declared: sus artifacts estáticos.
    /// - Output: salidas del productor en el pool con el tipo del canal
    ///   (nombre y propiedades).
    /// - PipelineInput/PipelineOutput: el canal envuelto.
    /// - Union: concatenación en orden; los artifacts persistidos repetidos
    ///   (mismo `id`) aparecen una sola vez, los no persistidos nunca se
    ///   deduplican.
    /// - Resolved: evaluación del árbol de operadores.
    pub fn resolve(&self, channel: &Channel) -> Result<Vec<Artifact>> {
        let out = match channel.kind() {
            ChannelKind::Declared { artifacts } => artifacts.clone(),
            ChannelKind::Output { producer_id, output_key } => {
                let (matching, other): (Vec<&Artifact>, Vec<&Artifact>) =
                    self.pool
                        .outputs_of(producer_id, output_key)
                        .into_iter()
                        .partition(|a| a.artifact_type == *channel.artifact_type());
                if !other.is_empty() {
                    warn!("{producer_id}.{output_key}: skipping {} artifacts not of type {}",
                          other.len(),
                          channel.type_name());
                }
                matching.into_iter().cloned().collect()
            }
            ChannelKind::PipelineInput { wrapped, .. } | ChannelKind::PipelineOutput { wrapped, .. } => {
                self.resolve(wrapped)?
            }
            ChannelKind::Union { channels } => {
                let mut seen = HashSet::new();
                let mut out = Vec::new();
                for member in channels {
                    for a in self.resolve(member)? {
                        if a.id.map_or(true, |id| seen.insert(id)) {
                            out.push(a);
                        }
                    }
                }
                out
            }
            ChannelKind::Resolved { node } => {
                debug!("evaluating resolver {} over {} inputs", node.fingerprint(), node.input_channels().len());
                node.evaluate(&mut |ch: &Channel| self.resolve(ch))?
            }
        };
        debug!("resolved channel {} ({}): {} artifacts", channel.id(), channel.type_name(), out.len());
        Ok(out)
    }

    /// Resuelve todos los inputs de un step. Con paralelismo activo cada
    /// input se resuelve en su propia tarea de rayon.
    pub fn resolve_all(&self, inputs: &IndexMap<String, Channel>) -> Result<ResolvedInputs> {
        let pairs: Vec<(&String, &Channel)> = inputs.iter().collect();
        let resolve_one = |(key, ch): &(&String, &Channel)| self.resolve(ch).map(|a| ((*key).clone(), a));
        let resolved: Vec<(String, Vec<Artifact>)> = if self.parallel {
            pairs.par_iter().map(resolve_one).collect::<Result<_>>()?
        } else {
            pairs.iter().map(resolve_one).collect::<Result<_>>()?
        };
        let required = inputs.iter()
                             .filter(|(_, ch)| ch.is_optional() != Some(true))
                             .map(|(k, _)| k.clone())
                             .collect();
        Ok(ResolvedInputs { artifacts: resolved.into_iter().collect(),
                            required })
    }
}

impl ChannelValues for InputResolver<'_> {
    fn artifacts_of(&self, channel: &Channel) -> Result<Vec<Artifact>> {
        self.resolve(channel)
    }
}

/// Artifacts resueltos por key de input.
#[derive(Debug, Clone, Default)]
pub struct ResolvedInputs {
    artifacts: IndexMap<String, Vec<Artifact>>,
    required: BTreeSet<String>,
}

impl ResolvedInputs {
    pub fn get(&self, key: &str) -> Option<&[Artifact]> {
        self.artifacts.get(key).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Artifact])> {
        self.artifacts.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Inputs requeridos que quedaron vacíos.
    pub fn missing_required(&self) -> Vec<&str> {
        self.artifacts
            .iter()
            .filter(|(k, v)| v.is_empty() && self.required.contains(*k))
            .map(|(k, _)| k.as_str())
            .collect()
    }

    /// `true` si todo input no opcional tiene al menos un artifact.
    pub fn is_satisfied(&self) -> bool {
        self.missing_required().is_empty()
    }
}
