//! Errores y diagnósticos del analizador.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errores que sí se propagan al llamador.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Archivo no encontrado: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("No se pudo acceder a la carpeta {}: {source}", path.display())]
    FolderAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error de E/S: {0}")]
    Io(#[from] io::Error),

    #[error("Configuración inválida: {0}")]
    Config(String),

    #[error("No se pudo exportar el reporte: {0}")]
    Export(String),

    #[error("Patrón inválido en la regla `{rule}`: {source}")]
    Rule {
        rule: &'static str,
        #[source]
        source: regex::Error,
    },
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;

impl From<serde_json::Error> for AnalyzerError {
    fn from(err: serde_json::Error) -> Self {
        AnalyzerError::Config(err.to_string())
    }
}

impl From<csv::Error> for AnalyzerError {
    fn from(err: csv::Error) -> Self {
        AnalyzerError::Export(err.to_string())
    }
}

/// Fallo de una etapa de extracción. Nunca cruza el límite del parser como error.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ParseFailure {
    pub parser: String,
    pub stage: String,
    pub message: String,
}

impl ParseFailure {
    pub fn new(
        parser: impl Into<String>,
        stage: impl Into<String>,
        message: impl fmt::Display,
    ) -> Self {
        Self {
            parser: parser.into(),
            stage: stage.into(),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.parser, self.stage, self.message)
    }
}

/// Condiciones no fatales registradas durante un análisis.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanIssue {
    UnsupportedFormat,
    FileTooLarge { size: u64, limit: u64 },
    PermissionDenied,
    FileNotFound,
    Io { message: String },
    ParseFailure(ParseFailure),
    FolderAccess { message: String },
    Cancelled,
}

impl ScanIssue {
    pub fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => ScanIssue::FileNotFound,
            io::ErrorKind::PermissionDenied => ScanIssue::PermissionDenied,
            _ => ScanIssue::Io {
                message: err.to_string(),
            },
        }
    }
}

impl fmt::Display for ScanIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanIssue::UnsupportedFormat => f.write_str("formato no soportado"),
            ScanIssue::FileTooLarge { size, limit } => write!(
                f,
                "archivo demasiado grande ({:.1} MB, límite {:.1} MB)",
                *size as f64 / (1024.0 * 1024.0),
                *limit as f64 / (1024.0 * 1024.0)
            ),
            ScanIssue::PermissionDenied => f.write_str("permiso denegado"),
            ScanIssue::FileNotFound => f.write_str("archivo no encontrado (¿eliminado durante el escaneo?)"),
            ScanIssue::Io { message } => write!(f, "error del sistema operativo: {message}"),
            ScanIssue::ParseFailure(failure) => write!(f, "extracción parcial: {failure}"),
            ScanIssue::FolderAccess { message } => {
                write!(f, "no se pudo recorrer la carpeta: {message}")
            }
            ScanIssue::Cancelled => f.write_str("cancelado antes de procesarse"),
        }
    }
}

/// Diagnóstico asociado a una ruta concreta.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub path: PathBuf,
    pub issue: ScanIssue,
}

impl Diagnostic {
    pub fn new(path: impl Into<PathBuf>, issue: ScanIssue) -> Self {
        Self {
            path: path.into(),
            issue,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.issue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_map_to_skip_conditions() {
        let not_found = io::Error::from(io::ErrorKind::NotFound);
        let denied = io::Error::from(io::ErrorKind::PermissionDenied);
        let other = io::Error::other("disco desconectado");

        assert_eq!(ScanIssue::from_io(&not_found), ScanIssue::FileNotFound);
        assert_eq!(ScanIssue::from_io(&denied), ScanIssue::PermissionDenied);
        assert!(matches!(ScanIssue::from_io(&other), ScanIssue::Io { .. }));
    }
}
