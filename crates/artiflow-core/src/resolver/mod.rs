//! Framework de operadores de resolución.
//!
//! Un operador es una función pura `[Artifact] × params → [Artifact]`. Los
//! operadores se componen simbólicamente con `ResolverNode`, que es lo que
//! un `ResolvedChannel` guarda dentro del grafo de canales.

pub mod node;
pub mod op;

pub use node::ResolverNode;
pub use op::ResolverOp;
