//! Resolución de inputs: recorre el grafo de canales sobre un `ArtifactPool`
//! y produce los conjuntos concretos de artifacts por input.

mod pool;
mod resolver;

pub use pool::{ArtifactPool, PoolEntry};
pub use resolver::{InputResolver, ResolvedInputs};
