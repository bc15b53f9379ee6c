//! `AllSpans`: todos los spans, opcionalmente sólo la versión más alta de
//! cada uno. Equivale a `LatestSpan` con `n = -1`.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use artiflow_core::{Artifact, ResolverOp, Result};

use crate::latest_span::{LatestSpan, LatestSpanParams};

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AllSpansParams {
    pub keep_all_versions: bool,
}

#[derive(Debug, Clone)]
pub struct AllSpans {
    params: AllSpansParams,
    inner: LatestSpan,
}

impl AllSpans {
    pub fn new(params: AllSpansParams) -> Result<Self> {
        let inner = LatestSpan::new(LatestSpanParams { n: -1,
                                                       keep_all_versions: params.keep_all_versions,
                                                       ..Default::default() })?;
        Ok(Self { params, inner })
    }
}

impl ResolverOp for AllSpans {
    fn name(&self) -> &'static str {
        "all_spans"
    }

    fn params(&self) -> Value {
        serde_json::to_value(&self.params).unwrap_or(Value::Null)
    }

    fn apply(&self, input: &[Artifact]) -> Result<Vec<Artifact>> {
        self.inner.apply(input)
    }
}
