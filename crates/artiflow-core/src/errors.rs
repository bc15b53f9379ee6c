//! Errores del core de resolución.
//!
//! Todos los errores son síncronos y se levantan en el punto de violación:
//! construcción (parámetros, tipos) o recorrido (grafo mal formado). No hay
//! reintentos internos ni resultados parciales.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum LineageError {
    /// Canal o unión construidos con artifacts/canales de otro tipo.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
    /// Parámetro de operador desconocido o fuera de dominio.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("union requires at least one channel")]
    EmptyUnion,
    /// Uso incorrecto de la API por parte del caller (índice fuera de rango,
    /// flags no aplicables a la variante, ...).
    #[error("usage error: {0}")]
    Usage(String),
    /// Grafo inconsistente detectado al recorrerlo.
    #[error("malformed graph: {0}")]
    MalformedGraph(String),
}

impl LineageError {
    pub(crate) fn type_mismatch(expected: &str, found: &str) -> Self {
        Self::TypeMismatch { expected: expected.to_string(),
                             found: found.to_string() }
    }
}

/// Alias de resultado usado por las APIs del crate.
pub type Result<T> = std::result::Result<T, LineageError>;
