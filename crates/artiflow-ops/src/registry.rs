//! Construcción de operadores por nombre con parámetros JSON.
//!
//! Acepta el nombre en `snake_case` (`latest_span`) o `CamelCase`
//! (`LatestSpan`). Los parámetros se validan antes de tocar artifacts:
//! nombre desconocido, parámetro desconocido o valor fuera de dominio
//! producen `InvalidArgument`.
use log::debug;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use artiflow_core::{Artifact, LineageError, ResolverOp, Result};

use crate::{AllSpans, ExcludeSpans, LatestCreateTime, LatestSpan, LatestVersion};

/// Nombres canónicos de los operadores registrados.
pub const OPERATOR_NAMES: [&str; 5] = ["latest_span", "latest_version", "latest_create_time", "all_spans", "exclude_spans"];

pub fn build_op(name: &str, params: &Value) -> Result<Arc<dyn ResolverOp>> {
    let op: Arc<dyn ResolverOp> = match canonical_name(name).as_str() {
        "latest_span" => Arc::new(LatestSpan::new(parse_params(name, params)?)?),
        "latest_version" => Arc::new(LatestVersion::new(parse_params(name, params)?)),
        "latest_create_time" => Arc::new(LatestCreateTime::new(parse_params(name, params)?)),
        "all_spans" => Arc::new(AllSpans::new(parse_params(name, params)?)?),
        "exclude_spans" => Arc::new(ExcludeSpans::new(parse_params(name, params)?)),
        _ => return Err(LineageError::InvalidArgument(format!("unknown resolver operator: {name}"))),
    };
    debug!("built operator {} with params {}", op.name(), op.params());
    Ok(op)
}

/// Construye y aplica en un paso.
pub fn invoke(name: &str, artifacts: &[Artifact], params: &Value) -> Result<Vec<Artifact>> {
    build_op(name, params)?.apply(artifacts)
}

fn parse_params<P: DeserializeOwned>(name: &str, params: &Value) -> Result<P> {
    let params = match params {
        Value::Null => Value::Object(Default::default()),
        other => other.clone(),
    };
    serde_json::from_value(params).map_err(|e| LineageError::InvalidArgument(format!("{name}: {e}")))
}

/// `LatestSpan` -> `latest_span`; los nombres ya en snake_case no cambian.
fn canonical_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn camel_and_snake_names_are_equivalent() {
        assert_eq!(canonical_name("LatestSpan"), "latest_span");
        assert_eq!(canonical_name("latest_span"), "latest_span");
        assert_eq!(canonical_name("ExcludeSpans"), "exclude_spans");
        for name in OPERATOR_NAMES {
            assert_eq!(build_op(name, &Value::Null).unwrap().name(), name);
        }
    }

    #[test]
    fn unknown_operator_or_param_is_invalid() {
        assert!(matches!(build_op("newest", &json!({})), Err(LineageError::InvalidArgument(_))));
        assert!(matches!(build_op("latest_span", &json!({"nn": 1})), Err(LineageError::InvalidArgument(_))));
        assert!(matches!(build_op("latest_span", &json!({"n": "one"})), Err(LineageError::InvalidArgument(_))));
        assert!(matches!(build_op("LatestSpan", &json!({"version_sort_keys": ["bad.path"]})),
                         Err(LineageError::InvalidArgument(_))));
    }
}
