//! Lectura/escritura del pool de artifacts en JSON.
use log::debug;
use std::fs;
use std::path::Path;

use artiflow_core::ArtifactPool;

use crate::errors::AppError;

/// Carga un pool. Valida que no haya ids repetidos y que las propiedades de
/// cada artifact respeten su tipo.
pub fn load_pool(path: &Path) -> Result<ArtifactPool, AppError> {
    let raw = fs::read_to_string(path)?;
    let parsed: ArtifactPool = serde_json::from_str(&raw)?;
    let pool = ArtifactPool::from_entries(parsed.entries().to_vec())?;
    debug!("loaded pool {} ({} artifacts)", path.display(), pool.len());
    Ok(pool)
}

pub fn save_pool(pool: &ArtifactPool, path: &Path) -> Result<(), AppError> {
    fs::write(path, serde_json::to_string_pretty(pool)?)?;
    debug!("saved pool {} ({} artifacts)", path.display(), pool.len());
    Ok(())
}
