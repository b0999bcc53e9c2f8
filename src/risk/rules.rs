//! Tabla de reglas por defecto. El orden define el orden de los hallazgos.

use crate::model::RiskLevel;

/// Definición estática de una regla antes de compilar sus patrones.
pub struct RuleDef {
    pub name: &'static str,
    pub pattern: &'static str,
    pub level: RiskLevel,
    pub case_sensitive: bool,
    /// Si el texto que sigue a la coincidencia cumple este patrón, la coincidencia se descarta.
    pub reject_after: Option<&'static str>,
}

const fn rule(name: &'static str, pattern: &'static str, level: RiskLevel) -> RuleDef {
    RuleDef {
        name,
        pattern,
        level,
        case_sensitive: false,
        reject_after: None,
    }
}

pub const DEFAULT_RULES: &[RuleDef] = &[
    // Datos personales
    rule(
        "Author Information",
        r"(author|creator|producer|company|organization|username|user(name)?|login)",
        RiskLevel::Medium,
    ),
    rule(
        "Email Addresses",
        r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b",
        RiskLevel::High,
    ),
    rule("Phone Numbers", r"\+7\d{10}", RiskLevel::High),
    // Rutas y ubicaciones
    rule(
        "File Paths",
        r"([A-Za-z]:\\[\\\S|*\S]?.*\$|/.*/.*|\\\\.*\\.*)",
        RiskLevel::High,
    ),
    rule(
        "Internal Network Paths",
        r"\\\\[A-Za-z0-9_.-]+\\",
        RiskLevel::High,
    ),
    rule(
        "Home Directory Paths",
        r"(/home/|/Users/|C:\\Users\\|C:\\Documents and Settings\\)",
        RiskLevel::Medium,
    ),
    // Geolocalización
    rule(
        "GPS Coordinates",
        r#"(\d{1,3}°\s\d{1,2}'\s\d{1,2}"|\d{1,3}\.\d+\s*[NS]\s*\d{1,3}\.\d+\s*[EW]|-?\d{1,3}\.\d+,\s*-?\d{1,3}\.\d+)"#,
        RiskLevel::High,
    ),
    rule(
        "GPS EXIF Data",
        r"(gps|gpslatitude|gpslongitude|gpsaltitude|geotag|geolocation)",
        RiskLevel::High,
    ),
    rule(
        "Address Information",
        r"(street|st\.|avenue|ave\.|boulevard|blvd\.|road|rd\.|city|town|zip(code)?|postal(code)?)",
        RiskLevel::Medium,
    ),
    // Sistema
    rule(
        "Computer Name",
        r"(computername|hostname|machine(name)?)",
        RiskLevel::Medium,
    ),
    RuleDef {
        name: "IP Addresses",
        pattern: r"\b(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\b",
        level: RiskLevel::Medium,
        case_sensitive: false,
        reject_after: Some(r"^\s*[.\d]"),
    },
    rule(
        "MAC Addresses",
        r"([0-9A-Fa-f]{2}[:-]){5}([0-9A-Fa-f]{2})",
        RiskLevel::Medium,
    ),
    // Fechas
    rule(
        "Creation Dates",
        r"(created|creation(date)?|date.*created|createtime)",
        RiskLevel::Low,
    ),
    rule(
        "Modification Dates",
        r"(modified|modification(date)?|date.*modified|lastmodified)",
        RiskLevel::Low,
    ),
    // Software
    rule(
        "Software Versions",
        r"(version|software|application|appversion|build(number)?)",
        RiskLevel::Low,
    ),
    rule(
        "Office Product IDs",
        r"(producer|generator|createdwith|softwareversion)",
        RiskLevel::Low,
    ),
    // Red
    rule(
        "URLs and Domains",
        r"(https?://|www\.|ftp://|\.(com|org|net|ru|com\.ru))",
        RiskLevel::Medium,
    ),
    rule(
        "Server Names",
        r"(server|host|database|db(name)?)",
        RiskLevel::High,
    ),
    // Credenciales
    rule(
        "Password References",
        r"(password|passwd|pwd|secret|key|token|auth)",
        RiskLevel::High,
    ),
    rule(
        "Security Identifiers",
        r"(sid|guid|uuid|api[_-]?key)",
        RiskLevel::High,
    ),
    // Documentos
    rule(
        "Document IDs",
        r"(documentid|docid|revision|version(id)?)",
        RiskLevel::Low,
    ),
    rule(
        "Template Paths",
        r"(template|normal\.dot(m)?)",
        RiskLevel::Medium,
    ),
];
