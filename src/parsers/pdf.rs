//! Extracción de metadata en PDFs mediante lectura del diccionario Info.

use super::Extraction;
use crate::formatting::format_number;
use lopdf::{Dictionary, Document, Object};
use std::path::Path;

pub fn extract(path: &Path, extraction: &mut Extraction) {
    let doc = match Document::load(path) {
        Ok(doc) => doc,
        Err(error) => {
            extraction.fail("document", error);
            return;
        }
    };

    if let Some(info) = info_dictionary(&doc) {
        for (key, value) in info.iter() {
            let key = String::from_utf8_lossy(key);
            let clean_key = key.strip_prefix('/').unwrap_or(&key).to_string();
            let value = object_to_string(&doc, value).unwrap_or_default();
            extraction.push(clean_key, value);
        }
    }

    extraction.push("Pages", doc.get_pages().len().to_string());
    let encrypted = doc.trailer.get(b"Encrypt").is_ok();
    extraction.push("Encrypted", if encrypted { "True" } else { "False" });
}

/// Diccionario Info del trailer, directo o por referencia indirecta.
fn info_dictionary(doc: &Document) -> Option<&Dictionary> {
    let info = doc.trailer.get(b"Info").ok()?;
    match info.as_reference() {
        Ok(id) => doc.get_dictionary(id).ok(),
        Err(_) => info.as_dict().ok(),
    }
}

fn object_to_string(doc: &Document, obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes, _) => Some(decode_text(bytes).trim().to_string()),
        Object::Name(name) => Some(String::from_utf8_lossy(name).trim().to_string()),
        Object::Integer(value) => Some(value.to_string()),
        Object::Real(value) => Some(format_number(f64::from(*value))),
        Object::Boolean(value) => Some(if *value { "True" } else { "False" }.to_string()),
        Object::Reference(reference) => doc
            .get_object(*reference)
            .ok()
            .and_then(|inner| object_to_string(doc, inner)),
        _ => None,
    }
}

/// Cadenas de texto PDF: UTF-16BE con BOM o PDFDocEncoding (aprox. Latin-1).
fn decode_text(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&byte| byte as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::ParserKind;
    use tempfile::tempdir;

    #[test]
    fn decodes_utf16_and_latin1_strings() {
        let utf16 = [0xFE, 0xFF, 0x00, 0x4A, 0x00, 0xF3, 0x00, 0x73, 0x00, 0xE9];
        assert_eq!(decode_text(&utf16), "José");
        assert_eq!(decode_text(b"Informe"), "Informe");
        assert_eq!(decode_text(&[0x4D, 0xFC, 0x6C, 0x6C, 0x65, 0x72]), "Müller");
    }

    #[test]
    fn corrupt_pdf_yields_no_records() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("roto.pdf");
        std::fs::write(&path, b"%PDF-1.4\nesto no es un pdf valido")?;

        let extraction = ParserKind::Pdf.extract(&path);
        assert!(extraction.records.is_empty());
        assert_eq!(extraction.failures.len(), 1);
        assert_eq!(extraction.failures[0].parser, "PDFParser");
        Ok(())
    }

    #[test]
    fn info_dictionary_accepts_inline_and_indirect() {
        let mut doc = Document::with_version("1.5");
        assert!(info_dictionary(&doc).is_none());

        let mut info = Dictionary::new();
        info.set("Author", Object::string_literal("ana"));
        doc.trailer.set("Info", info.clone());
        assert!(info_dictionary(&doc).is_some_and(|dict| dict.has(b"Author")));

        let id = doc.add_object(info);
        doc.trailer.set("Info", id);
        assert!(info_dictionary(&doc).is_some_and(|dict| dict.has(b"Author")));

        doc.trailer.set("Info", 7i64);
        assert!(info_dictionary(&doc).is_none());
    }
}
