//! `LatestSpan`: selecciona los artifacts de los `n` spans más recientes.
//!
//! Pasos:
//! 1. Descartar artifacts sin `span`.
//! 2. Spans distintos ascendentes, filtrados por `min_span`.
//! 3. Quitar los `skip_last_n` más altos y quedarse con los `n` más altos
//!    restantes (`n < 0` = todos).
//! 4. Ordenar cada span por `version_sort_keys` y luego `id` (ascendente).
//!    Sin `keep_all_versions` sólo queda el último (la versión más alta).
//!
//! La salida va en orden ascendente de span y luego de versión.
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use artiflow_core::{Artifact, LineageError, ResolverOp, Result};

use crate::sort_key::{compare_versions, parse_all, SortKey};
use crate::spans::{group_by_span, take_last};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LatestSpanParams {
    /// Número de spans a devolver; negativo = todos.
    pub n: i64,
    pub skip_last_n: i64,
    pub min_span: Option<i64>,
    pub keep_all_versions: bool,
    pub version_sort_keys: Vec<String>,
}

impl Default for LatestSpanParams {
    fn default() -> Self {
        Self { n: 1,
               skip_last_n: 0,
               min_span: None,
               keep_all_versions: false,
               version_sort_keys: vec!["version".into(), "id".into()] }
    }
}

#[derive(Debug, Clone)]
pub struct LatestSpan {
    params: LatestSpanParams,
    keys: Vec<SortKey>,
}

impl LatestSpan {
    pub fn new(params: LatestSpanParams) -> Result<Self> {
        if params.skip_last_n < 0 {
            return Err(LineageError::InvalidArgument(format!("skip_last_n must be >= 0, got {}",
                                                             params.skip_last_n)));
        }
        let keys = parse_all(&params.version_sort_keys)?;
        Ok(Self { params, keys })
    }
}

impl ResolverOp for LatestSpan {
    fn name(&self) -> &'static str {
        "latest_span"
    }

    fn params(&self) -> Value {
        serde_json::to_value(&self.params).unwrap_or(Value::Null)
    }

    fn apply(&self, input: &[Artifact]) -> Result<Vec<Artifact>> {
        let groups = group_by_span(self.name(), input);
        let eligible: Vec<i64> = groups.keys()
                                       .copied()
                                       .filter(|s| self.params.min_span.map_or(true, |min| *s >= min))
                                       .collect();
        let skip = usize::try_from(self.params.skip_last_n).unwrap_or(0).min(eligible.len());
        let spans = take_last(&eligible[..eligible.len() - skip], self.params.n);
        debug!("latest_span: {} spans eligible, selected {:?}", eligible.len(), spans);

        let mut out = Vec::new();
        for span in spans {
            let Some(group) = groups.get(span) else { continue };
            let mut versions = group.clone();
            versions.sort_by(|a, b| compare_versions(a, b, &self.keys));
            if self.params.keep_all_versions {
                out.extend(versions.into_iter().cloned());
            } else if let Some(top) = versions.last() {
                out.push((*top).clone());
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_select_one_span_by_version_then_id() {
        let p = LatestSpanParams::default();
        assert_eq!(p.n, 1);
        assert_eq!(p.version_sort_keys, vec!["version", "id"]);
        assert!(LatestSpan::new(p).is_ok());
    }

    #[test]
    fn negative_skip_is_rejected() {
        let err = LatestSpan::new(LatestSpanParams { skip_last_n: -1,
                                                     ..Default::default() }).unwrap_err();
        assert!(matches!(err, LineageError::InvalidArgument(_)));
    }

    #[test]
    fn params_deserialize_with_defaults() {
        let p: LatestSpanParams = serde_json::from_value(serde_json::json!({"n": 2, "keep_all_versions": true})).unwrap();
        assert_eq!(p.n, 2);
        assert!(p.keep_all_versions);
        assert_eq!(p.skip_last_n, 0);
        assert!(serde_json::from_value::<LatestSpanParams>(serde_json::json!({"m": 2})).is_err());
    }

    #[test]
    fn fingerprint_changes_with_params() {
        let a = LatestSpan::new(LatestSpanParams::default()).unwrap();
        let b = LatestSpan::new(LatestSpanParams { n: 2,
                                                   ..Default::default() }).unwrap();
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
