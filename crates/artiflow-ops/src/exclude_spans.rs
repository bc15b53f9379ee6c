//! `ExcludeSpans`: quita los artifacts cuyo span está en `denylist`.
//! Conserva el orden de entrada; los artifacts sin span no se tocan.
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

use artiflow_core::{Artifact, ResolverOp, Result};

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ExcludeSpansParams {
    pub denylist: BTreeSet<i64>,
}

#[derive(Debug, Clone)]
pub struct ExcludeSpans {
    params: ExcludeSpansParams,
}

impl ExcludeSpans {
    pub fn new(params: ExcludeSpansParams) -> Self {
        Self { params }
    }
}

impl ResolverOp for ExcludeSpans {
    fn name(&self) -> &'static str {
        "exclude_spans"
    }

    fn params(&self) -> Value {
        serde_json::to_value(&self.params).unwrap_or(Value::Null)
    }

    fn apply(&self, input: &[Artifact]) -> Result<Vec<Artifact>> {
        let out: Vec<Artifact> = input.iter()
                                      .filter(|a| a.span().map_or(true, |s| !self.params.denylist.contains(&s)))
                                      .cloned()
                                      .collect();
        debug!("exclude_spans: {} -> {} artifacts", input.len(), out.len());
        Ok(out)
    }
}
