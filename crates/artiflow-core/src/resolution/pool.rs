//! Pool plano de artifacts atribuidos a `(producer_id, output_key)`.
//!
//! Es lo que el orquestador entrega al core: la persistencia real vive fuera.
//! `publish` simula la asignación de identidad y timestamps que haría el store
//! (ids crecientes, `create_time` no decreciente).
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::errors::{LineageError, Result};
use crate::model::Artifact;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolEntry {
    pub producer_id: String,
    pub output_key: String,
    pub artifact: Artifact,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtifactPool {
    entries: Vec<PoolEntry>,
}

impl ArtifactPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construye el pool a partir de entradas ya persistidas. Falla si dos
    /// entradas comparten `id`.
    pub fn from_entries(entries: Vec<PoolEntry>) -> Result<Self> {
        let mut pool = Self::new();
        for e in entries {
            pool.insert(e)?;
        }
        Ok(pool)
    }

    /// Inserta una entrada conservando su `id` (si lo tiene). Las propiedades
    /// del artifact se validan contra su tipo.
    pub fn insert(&mut self, entry: PoolEntry) -> Result<()> {
        entry.artifact.validate()?;
        if let Some(id) = entry.artifact.id {
            if self.entries.iter().any(|e| e.artifact.id == Some(id)) {
                return Err(LineageError::Usage(format!("artifact id {id} already in pool")));
            }
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Persiste `artifact` como salida `output_key` de `producer_id`: asigna
    /// el siguiente id y los timestamps. Devuelve la copia persistida.
    pub fn publish(&mut self, producer_id: &str, output_key: &str, artifact: Artifact) -> Artifact {
        let id = self.next_id();
        let ts = self.next_timestamp();
        let mut persisted = artifact.with_id(id).with_create_time(ts);
        persisted.last_update_time = Some(ts);
        debug!("pool publish id={id} type={} producer={producer_id} key={output_key}",
               persisted.type_name());
        self.entries.push(PoolEntry { producer_id: producer_id.to_string(),
                                      output_key: output_key.to_string(),
                                      artifact: persisted.clone() });
        persisted
    }

    fn next_id(&self) -> i64 {
        self.entries.iter().filter_map(|e| e.artifact.id).max().unwrap_or(0) + 1
    }

    fn next_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now();
        self.entries
            .iter()
            .filter_map(|e| e.artifact.create_time)
            .max()
            .map_or(now, |last| last.max(now))
    }

    /// Salidas de `(producer_id, output_key)` en orden de inserción.
    pub fn outputs_of(&self, producer_id: &str, output_key: &str) -> Vec<&Artifact> {
        self.entries
            .iter()
            .filter(|e| e.producer_id == producer_id && e.output_key == output_key)
            .map(|e| &e.artifact)
            .collect()
    }

    pub fn entries(&self) -> &[PoolEntry] {
        &self.entries
    }

    /// Pares `(producer_id, output_key)` distintos, en orden de aparición.
    pub fn output_refs(&self) -> Vec<(&str, &str)> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .map(|e| (e.producer_id.as_str(), e.output_key.as_str()))
            .filter(|r| seen.insert(*r))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
