//! artiflow: aplicación sobre `artiflow-core` y `artiflow-ops`.
//!
//! - `config`: configuración desde entorno.
//! - `errors`: errores de aplicación (`AppError`).
//! - `store`: pool de artifacts en JSON.
//! - `commands`: operaciones de la CLI `artiflow`.

pub mod commands;
pub mod config;
pub mod errors;
pub mod logging;
pub mod store;
