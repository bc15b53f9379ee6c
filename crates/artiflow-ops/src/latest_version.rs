//! `LatestVersion`: los `n` artifacts de versión más alta, sin mirar spans.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use artiflow_core::model::VERSION_PROPERTY;
use artiflow_core::{Artifact, ResolverOp, Result};

use crate::sort_key::{compare_versions, SortKey};
use crate::spans::take_last;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LatestVersionParams {
    pub n: i64,
}

impl Default for LatestVersionParams {
    fn default() -> Self {
        Self { n: 1 }
    }
}

#[derive(Debug, Clone)]
pub struct LatestVersion {
    params: LatestVersionParams,
    keys: Vec<SortKey>,
}

impl LatestVersion {
    pub fn new(params: LatestVersionParams) -> Self {
        Self { params,
               keys: vec![SortKey::Property(VERSION_PROPERTY.to_string())] }
    }
}

impl ResolverOp for LatestVersion {
    fn name(&self) -> &'static str {
        "latest_version"
    }

    fn params(&self) -> Value {
        serde_json::to_value(&self.params).unwrap_or(Value::Null)
    }

    /// Ascendente por versión y luego `id`; devuelve la cola de tamaño `n`.
    fn apply(&self, input: &[Artifact]) -> Result<Vec<Artifact>> {
        let mut sorted: Vec<&Artifact> = input.iter().collect();
        sorted.sort_by(|a, b| compare_versions(a, b, &self.keys));
        Ok(take_last(&sorted, self.params.n).iter().map(|a| (*a).clone()).collect())
    }
}
