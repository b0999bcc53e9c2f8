//! Acceso a las partes XML de un paquete OOXML y a sus propiedades de documento.

use super::{APP_NS, CP_NS, DC_NS, DCTERMS_NS};
use crate::parsers::Extraction;
use chrono::{DateTime, NaiveDateTime};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use xmltree::{Element, XMLNode};
use zip::ZipArchive;
use zip::result::ZipError;

pub struct OfficePackage {
    archive: ZipArchive<File>,
}

impl OfficePackage {
    pub fn open(path: &Path) -> Result<Self, String> {
        let file = File::open(path)
            .map_err(|err| format!("No se pudo abrir el documento Office: {err}"))?;
        let archive = ZipArchive::new(file)
            .map_err(|err| format!("No se pudo leer el contenido del documento Office: {err}"))?;
        Ok(Self { archive })
    }

    /// Devuelve `Ok(None)` cuando la parte no existe en el paquete.
    pub fn read_xml(&mut self, name: &str) -> Result<Option<Element>, String> {
        let mut entry = match self.archive.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(err) => return Err(format!("No se pudo abrir `{name}`: {err}")),
        };

        let mut contents = String::new();
        entry
            .read_to_string(&mut contents)
            .map_err(|err| format!("No se pudo leer `{name}`: {err}"))?;

        Element::parse(contents.as_bytes())
            .map(Some)
            .map_err(|err| format!("XML inválido en `{name}`: {err}"))
    }
}

struct FieldDef {
    key: &'static str,
    local_name: &'static str,
    namespace: &'static str,
    timestamp: bool,
}

const fn field(key: &'static str, local_name: &'static str, namespace: &'static str) -> FieldDef {
    FieldDef {
        key,
        local_name,
        namespace,
        timestamp: false,
    }
}

const fn timestamp(key: &'static str, local_name: &'static str) -> FieldDef {
    FieldDef {
        key,
        local_name,
        namespace: DCTERMS_NS,
        timestamp: true,
    }
}

/// Lee `docProps/core.xml`, `docProps/app.xml` y `docProps/custom.xml`.
///
/// `description_key` permite nombrar `dc:description` como lo expone cada formato.
pub fn extract_document_properties(
    package: &mut OfficePackage,
    extraction: &mut Extraction,
    description_key: &'static str,
) {
    match package.read_xml("docProps/core.xml") {
        Ok(Some(root)) => push_core_properties(&root, extraction, description_key),
        Ok(None) => {}
        Err(message) => extraction.fail("core properties", message),
    }

    match package.read_xml("docProps/app.xml") {
        Ok(Some(root)) => push_app_properties(&root, extraction),
        Ok(None) => {}
        Err(message) => extraction.fail("app properties", message),
    }

    match package.read_xml("docProps/custom.xml") {
        Ok(Some(root)) => push_custom_properties(&root, extraction),
        Ok(None) => {}
        Err(message) => extraction.fail("custom properties", message),
    }
}

fn push_core_properties(root: &Element, extraction: &mut Extraction, description_key: &'static str) {
    let fields = [
        field("title", "title", DC_NS),
        field("subject", "subject", DC_NS),
        field("author", "creator", DC_NS),
        field("last_modified_by", "lastModifiedBy", CP_NS),
        timestamp("created", "created"),
        timestamp("modified", "modified"),
        field("keywords", "keywords", CP_NS),
        field("category", "category", CP_NS),
        field(description_key, "description", DC_NS),
        field("revision", "revision", CP_NS),
        field("version", "version", CP_NS),
        field("content_status", "contentStatus", CP_NS),
        field("identifier", "identifier", DC_NS),
        field("language", "language", DC_NS),
        FieldDef {
            key: "last_printed",
            local_name: "lastPrinted",
            namespace: CP_NS,
            timestamp: true,
        },
    ];

    push_fields(root, &fields, extraction);
}

fn push_app_properties(root: &Element, extraction: &mut Extraction) {
    let fields = [
        field("application", "Application", APP_NS),
        field("app_version", "AppVersion", APP_NS),
        field("company", "Company", APP_NS),
        field("manager", "Manager", APP_NS),
        field("template", "Template", APP_NS),
    ];

    push_fields(root, &fields, extraction);
}

fn push_fields(root: &Element, fields: &[FieldDef], extraction: &mut Extraction) {
    for def in fields {
        if let Some(value) = find_child_text(root, def.local_name, def.namespace) {
            let value = if def.timestamp {
                normalize_timestamp(&value)
            } else {
                value
            };
            extraction.push_non_empty(def.key, value);
        }
    }
}

fn push_custom_properties(root: &Element, extraction: &mut Extraction) {
    for node in &root.children {
        let XMLNode::Element(child) = node else {
            continue;
        };
        if child.name != "property" {
            continue;
        }
        let name = match child.attributes.get("name") {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => continue,
        };
        let value = child
            .children
            .iter()
            .find_map(|node| match node {
                XMLNode::Element(value_node) => Some(element_text_content(value_node)),
                _ => None,
            })
            .unwrap_or_default();
        extraction.push_non_empty(format!("custom:{name}"), value);
    }
}

pub fn find_child<'a>(root: &'a Element, local_name: &str, namespace: &str) -> Option<&'a Element> {
    root.children.iter().find_map(|node| match node {
        XMLNode::Element(child)
            if child.name == local_name && child.namespace.as_deref() == Some(namespace) =>
        {
            Some(child)
        }
        _ => None,
    })
}

fn find_child_text(root: &Element, local_name: &str, namespace: &str) -> Option<String> {
    find_child(root, local_name, namespace).map(element_text_content)
}

fn element_text_content(element: &Element) -> String {
    let mut content = String::new();
    for node in &element.children {
        match node {
            XMLNode::Text(text) | XMLNode::CData(text) => content.push_str(text),
            _ => {}
        }
    }
    content.trim().to_string()
}

/// Convierte fechas W3CDTF (`2024-01-01T10:00:00Z`) a `2024-01-01 10:00:00`.
fn normalize_timestamp(value: &str) -> String {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return datetime.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return datetime.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    value.to_string()
}
