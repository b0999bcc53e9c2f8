//! Parsers de metadata por formato.
//!
//! El conjunto de variantes es cerrado; el despacho se hace con un `match`
//! sobre [`ParserKind`] y el resolver es el único que elige la variante.

mod filesystem;
mod imaging;
mod office;
mod pdf;

pub use filesystem::push_file_facts;
pub use imaging::describe_orientation;

use crate::error::ParseFailure;
use crate::model::MetadataRecord;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ParserKind {
    Pdf,
    Word,
    Excel,
    RasterImage,
    Heif,
}

impl ParserKind {
    pub const ALL: [ParserKind; 5] = [
        ParserKind::Pdf,
        ParserKind::Word,
        ParserKind::Excel,
        ParserKind::RasterImage,
        ParserKind::Heif,
    ];

    /// Tipos MIME que reclama cada variante.
    pub fn supported_formats(self) -> &'static [&'static str] {
        match self {
            ParserKind::Pdf => &["application/pdf"],
            ParserKind::Word => &[
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                "application/msword",
            ],
            ParserKind::Excel => &[
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                "application/vnd.ms-excel",
            ],
            ParserKind::RasterImage => &[
                "image/jpeg",
                "image/tiff",
                "image/png",
                "image/webp",
                "image/gif",
                "image/bmp",
            ],
            ParserKind::Heif => &["image/heic", "image/heif"],
        }
    }

    /// Nombre usado como `source` en cada registro producido.
    pub fn source(self) -> &'static str {
        match self {
            ParserKind::Pdf => "PDFParser",
            ParserKind::Word => "DocxParser",
            ParserKind::Excel => "ExcelParser",
            ParserKind::RasterImage => "ImageParser",
            ParserKind::Heif => "HEICParser",
        }
    }

    /// Extrae registros y fallos parciales. Nunca devuelve error.
    pub fn extract(self, path: &Path) -> Extraction {
        let mut extraction = Extraction::new(self.source());
        match self {
            ParserKind::Pdf => pdf::extract(path, &mut extraction),
            ParserKind::Word => office::extract_word(path, &mut extraction),
            ParserKind::Excel => office::extract_excel(path, &mut extraction),
            ParserKind::RasterImage => imaging::extract_raster(path, &mut extraction),
            ParserKind::Heif => imaging::extract_heif(path, &mut extraction),
        }
        extraction
    }

    pub fn extract_metadata(self, path: &Path) -> Vec<MetadataRecord> {
        self.extract(path).records
    }
}

/// Registros extraídos junto con los fallos de cada etapa.
#[derive(Clone, Debug)]
pub struct Extraction {
    source: &'static str,
    pub records: Vec<MetadataRecord>,
    pub failures: Vec<ParseFailure>,
}

impl Extraction {
    pub fn new(source: &'static str) -> Self {
        Self {
            source,
            records: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn source(&self) -> &'static str {
        self.source
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.records
            .push(MetadataRecord::new(key, value, self.source));
    }

    /// Igual que [`Extraction::push`] pero omite valores vacíos.
    pub fn push_non_empty(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        if !value.trim().is_empty() {
            self.push(key, value);
        }
    }

    pub fn fail(&mut self, stage: &str, message: impl std::fmt::Display) {
        self.failures
            .push(ParseFailure::new(self.source, stage, message));
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.records.iter().any(|record| record.key == key)
    }
}
