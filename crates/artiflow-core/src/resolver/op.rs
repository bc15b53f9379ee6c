use serde_json::{json, Value};
use std::fmt::Debug;

use crate::errors::Result;
use crate::hashing::hash_value;
use crate::model::Artifact;

/// Contrato de operador de resolución.
///
/// Implementaciones deben:
/// - validar sus parámetros al construirse (nunca de forma perezosa en
///   `apply`);
/// - ser deterministas y no mutar los artifacts de entrada (reciben un slice
///   prestado y devuelven clones).
pub trait ResolverOp: Send + Sync + Debug {
    /// Nombre estable del operador (p. ej. `latest_span`).
    fn name(&self) -> &'static str;

    /// Parámetros ya validados, en forma JSON (para auditoría/fingerprint).
    fn params(&self) -> Value;

    /// Aplica el operador sobre la secuencia de entrada.
    fn apply(&self, input: &[Artifact]) -> Result<Vec<Artifact>>;

    /// Hash estable de `{op, params}` sobre JSON canónico.
    fn fingerprint(&self) -> String {
        hash_value(&json!({ "op": self.name(), "params": self.params() }))
    }
}
