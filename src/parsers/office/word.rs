use super::package::{OfficePackage, extract_document_properties};
use crate::parsers::Extraction;
use std::path::Path;

pub fn extract(path: &Path, extraction: &mut Extraction) {
    let mut package = match OfficePackage::open(path) {
        Ok(package) => package,
        Err(message) => {
            extraction.fail("package", message);
            return;
        }
    };

    extract_document_properties(&mut package, extraction, "comments");
}
