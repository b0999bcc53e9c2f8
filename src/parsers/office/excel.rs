//! Libros de Excel: propiedades del documento más el listado de hojas.

use super::SPREADSHEET_NS;
use super::package::{OfficePackage, extract_document_properties, find_child};
use crate::parsers::Extraction;
use std::path::Path;
use xmltree::{Element, XMLNode};

pub fn extract(path: &Path, extraction: &mut Extraction) {
    let mut package = match OfficePackage::open(path) {
        Ok(package) => package,
        Err(message) => {
            extraction.fail("package", message);
            return;
        }
    };

    let workbook = match package.read_xml("xl/workbook.xml") {
        Ok(Some(root)) => root,
        Ok(None) => {
            extraction.fail("workbook", "El paquete no contiene xl/workbook.xml");
            return;
        }
        Err(message) => {
            extraction.fail("workbook", message);
            return;
        }
    };

    extract_document_properties(&mut package, extraction, "description");

    let names = sheet_names(&workbook);
    extraction.push("Sheets", names.len().to_string());
    extraction.push("Sheet Names", names.join(", "));
}

fn sheet_names(workbook: &Element) -> Vec<String> {
    let sheets = find_child(workbook, "sheets", SPREADSHEET_NS).or_else(|| {
        workbook.children.iter().find_map(|node| match node {
            XMLNode::Element(child) if child.name == "sheets" => Some(child),
            _ => None,
        })
    });

    let Some(sheets) = sheets else {
        return Vec::new();
    };

    sheets
        .children
        .iter()
        .filter_map(|node| match node {
            XMLNode::Element(sheet) if sheet.name == "sheet" => sheet.attributes.get("name").cloned(),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_sheet_names_in_order() -> Result<(), Box<dyn std::error::Error>> {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"
          xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <sheets>
        <sheet name="Ventas" sheetId="1" r:id="rId1"/>
        <sheet name="Costos" sheetId="2" r:id="rId2"/>
    </sheets>
</workbook>
"#;
        let root = Element::parse(xml.as_bytes())?;
        assert_eq!(sheet_names(&root), vec!["Ventas", "Costos"]);
        Ok(())
    }
}
