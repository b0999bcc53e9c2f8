//! Inicialización de `tracing` para el binario.

use tracing_subscriber::EnvFilter;

/// Configura el subscriber global escribiendo a stderr.
///
/// `RUST_LOG` tiene prioridad; si no está definido se usa `warn`, o `debug`
/// con `verbose`.
pub fn init(verbose: bool) {
    let default_level = if verbose { "filelens=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Un segundo init (p. ej. en tests) no debe abortar.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
