//! `LatestCreateTime`: los `n` artifacts creados más recientemente.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use artiflow_core::{Artifact, ResolverOp, Result};

use crate::sort_key::{compare_versions, SortKey};
use crate::spans::take_last;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LatestCreateTimeParams {
    pub n: i64,
}

impl Default for LatestCreateTimeParams {
    fn default() -> Self {
        Self { n: 1 }
    }
}

#[derive(Debug, Clone)]
pub struct LatestCreateTime {
    params: LatestCreateTimeParams,
}

impl LatestCreateTime {
    pub fn new(params: LatestCreateTimeParams) -> Self {
        Self { params }
    }
}

impl ResolverOp for LatestCreateTime {
    fn name(&self) -> &'static str {
        "latest_create_time"
    }

    fn params(&self) -> Value {
        serde_json::to_value(&self.params).unwrap_or(Value::Null)
    }

    fn apply(&self, input: &[Artifact]) -> Result<Vec<Artifact>> {
        let mut sorted: Vec<&Artifact> = input.iter().collect();
        sorted.sort_by(|a, b| compare_versions(a, b, &[SortKey::CreateTime]));
        Ok(take_last(&sorted, self.params.n).iter().map(|a| (*a).clone()).collect())
    }
}
