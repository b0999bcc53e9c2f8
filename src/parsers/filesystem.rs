//! Datos del sistema de archivos, el mínimo que todo parser de imagen garantiza.

use super::Extraction;
use crate::formatting::{UNAVAILABLE, format_optional_time, format_size};
use std::fs;
use std::path::Path;

/// Agrega nombre, tamaño, extensión, ruta y las tres marcas de tiempo.
///
/// Si `stat` falla igual se emiten los datos derivables de la ruta.
pub fn push_file_facts(path: &Path, extraction: &mut Extraction, uppercase_extension: bool) {
    let name = path
        .file_name()
        .map(|value| value.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|value| format!(".{}", value.to_string_lossy()))
        .map(|value| {
            if uppercase_extension {
                value.to_uppercase()
            } else {
                value
            }
        })
        .unwrap_or_default();

    extraction.push("File Name", name);

    match fs::metadata(path) {
        Ok(metadata) => {
            extraction.push("File Size", format_size(metadata.len()));
            extraction.push("File Extension", extension);
            extraction.push("File Path", path.display().to_string());
            extraction.push("File Created", format_optional_time(metadata.created().ok()));
            extraction.push("File Modified", format_optional_time(metadata.modified().ok()));
            extraction.push("File Accessed", format_optional_time(metadata.accessed().ok()));
        }
        Err(error) => {
            extraction.push("File Size", UNAVAILABLE);
            extraction.push("File Extension", extension);
            extraction.push("File Path", path.display().to_string());
            extraction.fail("file info", error);
        }
    }
}
