//! artiflow-ops: operadores de selección deterministas sobre artifacts.
//!
//! Todos implementan `artiflow_core::ResolverOp`: validan parámetros al
//! construirse y en `apply` sólo ordenan/filtran clones de la entrada.
pub mod all_spans;
pub mod exclude_spans;
pub mod latest_create_time;
pub mod latest_span;
pub mod latest_version;
pub mod registry;
pub mod sort_key;
mod spans;

pub use all_spans::{AllSpans, AllSpansParams};
pub use exclude_spans::{ExcludeSpans, ExcludeSpansParams};
pub use latest_create_time::{LatestCreateTime, LatestCreateTimeParams};
pub use latest_span::{LatestSpan, LatestSpanParams};
pub use latest_version::{LatestVersion, LatestVersionParams};
pub use registry::{build_op, invoke, OPERATOR_NAMES};
pub use sort_key::SortKey;
