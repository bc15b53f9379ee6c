use tracing_subscriber::{fmt, EnvFilter};

/// Instala el subscriber global. `RUST_LOG` tiene prioridad sobre `default`.
/// Los registros del facade `log` (crates de librería) también se capturan.
pub fn init_logging(default: &str) {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default))
                                                  .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter)
                 .with_target(false)
                 .with_writer(std::io::stderr)
                 .try_init();
}
