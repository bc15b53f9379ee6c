//! Operaciones de la CLI sobre un pool ya cargado.
use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use std::sync::Arc;

use artiflow_core::{Artifact, ArtifactPool, ArtifactType, Channel, InputResolver, ResolverNode};
use artiflow_ops::build_op;

use crate::errors::AppError;

/// Tipo de los inputs cuya salida aún no tiene artifacts publicados.
const UNPUBLISHED_TYPE: &str = "Artifact";

/// Petición de `artiflow resolve`.
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    pub producer_id: String,
    pub output_key: String,
    /// Tipo esperado; si falta se toma del primer artifact publicado.
    pub type_name: Option<String>,
    pub op: Option<String>,
    pub params: Value,
}

/// Resuelve la salida `(producer_id, output_key)`, opcionalmente a través
/// de un operador.
pub fn resolve(pool: &ArtifactPool, req: &ResolveRequest) -> Result<Vec<Artifact>, AppError> {
    let Some(artifact_type) = output_type(pool, &req.producer_id, &req.output_key, req.type_name.as_deref()) else {
        warn!("{}.{} has no published artifacts", req.producer_id, req.output_key);
        return Ok(vec![]);
    };
    let channel = input_channel(artifact_type, &req.producer_id, &req.output_key, req.op.as_deref(), &req.params)?;
    let out = InputResolver::new(pool).resolve(&channel)?;
    info!("resolved {}.{}: {} artifacts", req.producer_id, req.output_key, out.len());
    Ok(out)
}

/// Un input de step en la CLI: `key=producer.output_key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSpec {
    pub key: String,
    pub producer_id: String,
    pub output_key: String,
}

impl FromStr for InputSpec {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let parsed = raw.split_once('=')
                        .and_then(|(key, output)| output.rsplit_once('.').map(|(p, o)| (key, p, o)))
                        .filter(|(key, p, o)| !key.is_empty() && !p.is_empty() && !o.is_empty());
        match parsed {
            Some((key, producer_id, output_key)) => Ok(Self { key: key.to_string(),
                                                              producer_id: producer_id.to_string(),
                                                              output_key: output_key.to_string() }),
            None => Err(AppError::Config(format!("input '{raw}' no tiene la forma key=producer.output_key"))),
        }
    }
}

/// Petición de `artiflow resolve-inputs`: varios inputs de un step resueltos
/// juntos, con el mismo operador opcional aplicado a cada uno.
#[derive(Debug, Clone)]
pub struct ResolveInputsRequest {
    pub inputs: Vec<InputSpec>,
    /// Keys que pueden quedar vacías sin bloquear el step.
    pub optional: BTreeSet<String>,
    pub op: Option<String>,
    pub params: Value,
    pub parallel: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedInput {
    pub key: String,
    pub artifacts: Vec<Artifact>,
}

/// Resultado de `resolve-inputs`, en el orden de los inputs pedidos.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputsReport {
    pub inputs: Vec<ResolvedInput>,
    pub missing_required: Vec<String>,
    pub satisfied: bool,
}

pub fn resolve_inputs(pool: &ArtifactPool, req: &ResolveInputsRequest) -> Result<InputsReport, AppError> {
    let mut channels: IndexMap<String, Channel> = IndexMap::new();
    for input in &req.inputs {
        if channels.contains_key(&input.key) {
            return Err(AppError::Config(format!("input {} repetido", input.key)));
        }
        let artifact_type = output_type(pool, &input.producer_id, &input.output_key, None)
            .unwrap_or_else(|| ArtifactType::new(UNPUBLISHED_TYPE).into_shared());
        let mut channel = input_channel(artifact_type, &input.producer_id, &input.output_key, req.op.as_deref(), &req.params)?;
        if req.optional.contains(&input.key) {
            channel = channel.as_optional();
        }
        channels.insert(input.key.clone(), channel);
    }
    debug!("resolving {} inputs (parallel={})", channels.len(), req.parallel);

    let resolved = InputResolver::new(pool).with_parallelism(req.parallel).resolve_all(&channels)?;
    let missing_required: Vec<String> = resolved.missing_required().into_iter().map(str::to_string).collect();
    if !missing_required.is_empty() {
        warn!("inputs requeridos sin artifacts: {}", missing_required.join(", "));
    }
    Ok(InputsReport { inputs: resolved.iter()
                                      .map(|(key, artifacts)| ResolvedInput { key: key.to_string(),
                                                                              artifacts: artifacts.to_vec() })
                                      .collect(),
                      satisfied: missing_required.is_empty(),
                      missing_required })
}

fn input_channel(artifact_type: Arc<ArtifactType>,
                 producer_id: &str,
                 output_key: &str,
                 op: Option<&str>,
                 params: &Value)
                 -> Result<Channel, AppError> {
    let channel = Channel::output(artifact_type, producer_id, output_key);
    match op {
        Some(name) => {
            let node = ResolverNode::input(&channel).then_shared(build_op(name, params)?);
            debug!("{producer_id}.{output_key} through {name}: resolver {}", node.fingerprint());
            Ok(Channel::resolved_from(node))
        }
        None => Ok(channel),
    }
}

fn output_type(pool: &ArtifactPool, producer_id: &str, output_key: &str, type_name: Option<&str>) -> Option<Arc<ArtifactType>> {
    match type_name {
        Some(name) => {
            let declared = pool.entries().iter().map(|e| &e.artifact.artifact_type).find(|t| t.name == name);
            Some(declared.cloned().unwrap_or_else(|| ArtifactType::new(name).into_shared()))
        }
        None => pool.outputs_of(producer_id, output_key)
                    .first()
                    .map(|a| a.artifact_type.clone()),
    }
}

/// Resumen de spans de una salida del pool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanSummary {
    pub producer_id: String,
    pub output_key: String,
    pub type_name: String,
    /// span -> versiones presentes (ascendente).
    pub spans: BTreeMap<i64, Vec<Option<i64>>>,
    pub unspanned: usize,
}

/// Un resumen por tipo de artifact de cada salida `(producer, key)`.
pub fn span_summaries(pool: &ArtifactPool) -> Vec<SpanSummary> {
    let mut out = Vec::new();
    for (producer_id, output_key) in pool.output_refs() {
        let mut by_type: BTreeMap<&str, SpanSummary> = BTreeMap::new();
        for a in pool.outputs_of(producer_id, output_key) {
            let summary = by_type.entry(a.type_name())
                                 .or_insert_with(|| SpanSummary { producer_id: producer_id.to_string(),
                                                                  output_key: output_key.to_string(),
                                                                  type_name: a.type_name().to_string(),
                                                                  spans: BTreeMap::new(),
                                                                  unspanned: 0 });
            match a.span() {
                Some(span) => summary.spans.entry(span).or_default().push(a.version()),
                None => summary.unspanned += 1,
            }
        }
        for mut summary in by_type.into_values() {
            summary.spans.values_mut().for_each(|versions| versions.sort());
            out.push(summary);
        }
    }
    out
}
