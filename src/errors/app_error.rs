use artiflow_core::LineageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error en IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON inválido: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Error de configuración: {0}")]
    Config(String),
    #[error("Error de resolución: {0}")]
    Resolution(#[from] LineageError),
}
