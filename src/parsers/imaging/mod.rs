//! Extracción escalonada de metadata en imágenes.
//!
//! Orden de etapas: datos del sistema de archivos, EXIF del contenedor,
//! EXIF de la librería de imagen, propiedades intrínsecas e información
//! técnica residual. El fallo de una etapa no impide las siguientes.

mod tags;
mod heic;
mod raster;

pub use tags::describe_orientation;
pub use heic::extract as extract_heif;

use super::Extraction;
use super::filesystem::push_file_facts;
use std::path::Path;

pub fn extract_raster(path: &Path, extraction: &mut Extraction) {
    push_file_facts(path, extraction, false);

    match tags::read_container_exif(path) {
        Ok(Some(data)) => tags::push_container_fields(&data, extraction),
        Ok(None) => {}
        Err(message) => extraction.fail("exif container", message),
    }

    if let Err(message) = raster::push_library_exif(path, extraction) {
        extraction.fail("exif library", message);
    }

    if let Err(message) = raster::push_image_info(path, extraction) {
        extraction.fail("image info", message);
    }

    if let Err(message) = raster::push_technical_info(path, extraction) {
        extraction.fail("technical info", message);
    }
}
