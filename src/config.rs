//! Configuración de la aplicación desde variables de entorno (`.env`
//! incluido). Los flags de la CLI tienen prioridad sobre estos valores.
use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;

use crate::errors::AppError;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

pub const LOG_VAR: &str = "ARTIFLOW_LOG";
pub const POOL_VAR: &str = "ARTIFLOW_POOL";
pub const PARALLEL_VAR: &str = "ARTIFLOW_PARALLEL";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Filtro de logging (sintaxis `EnvFilter`).
    pub log_filter: String,
    /// Archivo JSON del pool por defecto.
    pub pool_path: Option<PathBuf>,
    /// Resolver inputs en paralelo.
    pub parallel: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { log_filter: "info".into(),
               pool_path: None,
               parallel: true }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual que `from_env` pero con una fuente de variables arbitraria.
    pub fn from_lookup<F>(get: F) -> Result<Self, AppError>
        where F: Fn(&str) -> Option<String>
    {
        let defaults = Self::default();
        let parallel = match get(PARALLEL_VAR) {
            Some(raw) => parse_bool(&raw).ok_or_else(|| AppError::Config(format!("{PARALLEL_VAR}={raw} no es booleano")))?,
            None => defaults.parallel,
        };
        Ok(Self { log_filter: get(LOG_VAR).filter(|v| !v.trim().is_empty()).unwrap_or(defaults.log_filter),
                  pool_path: get(POOL_VAR).filter(|v| !v.is_empty()).map(PathBuf::from),
                  parallel })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
