//! Resolución del parser responsable a partir de la extensión del archivo.
//!
//! No se inspecciona el contenido: un archivo renombrado con otra extensión
//! queda fuera del análisis.

use crate::parsers::ParserKind;
use std::path::Path;

const MIME_TABLE: &[(&str, &str)] = &[
    ("pdf", "application/pdf"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    ("doc", "application/msword"),
    ("xls", "application/vnd.ms-excel"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("tiff", "image/tiff"),
    ("tif", "image/tiff"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("webp", "image/webp"),
    ("heic", "image/heic"),
    ("heif", "image/heif"),
];

/// Extensión en minúsculas, sin punto.
pub fn normalized_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Tipo MIME declarado por la extensión.
pub fn mime_type(path: &Path) -> Option<&'static str> {
    let ext = normalized_extension(path)?;
    MIME_TABLE
        .iter()
        .find(|(candidate, _)| *candidate == ext)
        .map(|(_, mime)| *mime)
}

/// Variante de parser que declara soportar el tipo indicado.
pub fn parser_for_type(type_tag: &str) -> Option<ParserKind> {
    ParserKind::ALL
        .into_iter()
        .find(|kind| kind.supported_formats().contains(&type_tag))
}

/// `None` significa "nada que analizar", no un error.
pub fn resolve(path: &Path) -> Option<ParserKind> {
    mime_type(path).and_then(parser_for_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_by_lowercased_extension() {
        assert_eq!(resolve(Path::new("/tmp/Report.PDF")), Some(ParserKind::Pdf));
        assert_eq!(resolve(Path::new("a/b.docx")), Some(ParserKind::Word));
        assert_eq!(resolve(Path::new("libro.xlsx")), Some(ParserKind::Excel));
        assert_eq!(resolve(Path::new("foto.JPeG")), Some(ParserKind::RasterImage));
        assert_eq!(resolve(Path::new("foto.tif")), Some(ParserKind::RasterImage));
        assert_eq!(resolve(Path::new("IMG_0001.HEIC")), Some(ParserKind::Heif));
    }

    #[test]
    fn unknown_or_missing_extension_is_unsupported() {
        assert_eq!(resolve(Path::new("notas.txt")), None);
        assert_eq!(resolve(Path::new("Makefile")), None);
        assert_eq!(mime_type(Path::new("archivo.zip")), None);
    }

    #[test]
    fn legacy_office_types_are_claimed() {
        assert_eq!(mime_type(Path::new("viejo.doc")), Some("application/msword"));
        assert_eq!(resolve(Path::new("viejo.doc")), Some(ParserKind::Word));
        assert_eq!(resolve(Path::new("viejo.xls")), Some(ParserKind::Excel));
    }

    #[test]
    fn every_table_entry_has_a_parser() {
        for (ext, mime) in MIME_TABLE {
            assert!(
                parser_for_type(mime).is_some(),
                "la extensión {ext} no tiene parser"
            );
        }
    }
}
