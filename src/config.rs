//! Carga de opciones de escaneo desde un archivo JSON.

use crate::error::{AnalyzerError, Result};
use crate::scanner::ScanOptions;
use std::fs;
use std::path::Path;

/// Lee `ScanOptions`; los campos ausentes toman su valor por defecto.
pub fn load_options(path: &Path) -> Result<ScanOptions> {
    let contents = fs::read_to_string(path)
        .map_err(|err| AnalyzerError::Config(format!("{}: {err}", path.display())))?;
    let options: ScanOptions = serde_json::from_str(&contents)?;
    validate(&options)?;
    Ok(options)
}

fn validate(options: &ScanOptions) -> Result<()> {
    if options.max_file_size == 0 {
        return Err(AnalyzerError::Config(
            "max_file_size debe ser mayor que cero".to_string(),
        ));
    }
    if options.extensions.iter().all(|ext| ext.trim().is_empty()) {
        return Err(AnalyzerError::Config(
            "la lista de extensiones está vacía".to_string(),
        ));
    }
    Ok(())
}

/// Aplica las opciones de línea de comandos sobre las del archivo y vuelve a validar.
pub fn apply_overrides(
    mut options: ScanOptions,
    max_size_mb: Option<u64>,
    workers: Option<usize>,
) -> Result<ScanOptions> {
    if let Some(megabytes) = max_size_mb {
        options.max_file_size = megabytes.saturating_mul(1024 * 1024);
    }
    if let Some(workers) = workers {
        options.workers = workers;
    }
    validate(&options)?;
    Ok(options)
}
