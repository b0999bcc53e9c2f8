//! Modelos compartidos entre parsers, motor de riesgos y exportadores.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Un dato de metadata extraído de un archivo.
///
/// `source` identifica al parser que lo produjo. Las claves pueden repetirse
/// dentro del mismo archivo.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub key: String,
    pub value: String,
    pub source: String,
}

impl MetadataRecord {
    pub fn new(
        key: impl Into<String>,
        value: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            source: source.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coincidencia de un registro de metadata con una regla de riesgo.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct RiskFinding {
    pub key: String,
    pub value: String,
    pub rule: String,
    pub level: RiskLevel,
    pub source: String,
}

impl RiskFinding {
    pub fn from_record(record: &MetadataRecord, rule: &str, level: RiskLevel) -> Self {
        Self {
            key: record.key.clone(),
            value: record.value.clone(),
            rule: rule.to_string(),
            level,
            source: record.source.clone(),
        }
    }

    /// Indica si el hallazgo corresponde al registro por la tripleta `(key, value, source)`.
    pub fn refers_to(&self, record: &MetadataRecord) -> bool {
        self.key == record.key && self.value == record.value && self.source == record.source
    }
}

/// Devuelve el primer hallazgo asociado a un registro, si existe.
pub fn finding_for_record<'a>(
    record: &MetadataRecord,
    findings: &'a [RiskFinding],
) -> Option<&'a RiskFinding> {
    findings.iter().find(|finding| finding.refers_to(record))
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct FileAnalysis {
    pub metadata: Vec<MetadataRecord>,
    pub risks: Vec<RiskFinding>,
}

impl FileAnalysis {
    pub fn new(metadata: Vec<MetadataRecord>, risks: Vec<RiskFinding>) -> Self {
        Self { metadata, risks }
    }

    pub fn has_risks(&self) -> bool {
        !self.risks.is_empty()
    }
}

/// Resultado de un escaneo de carpeta: solo archivos con al menos un riesgo.
pub type ScanResult = BTreeMap<PathBuf, FileAnalysis>;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct RiskSummary {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl RiskSummary {
    pub fn from_findings<'a>(findings: impl IntoIterator<Item = &'a RiskFinding>) -> Self {
        let mut summary = Self::default();
        for finding in findings {
            match finding.level {
                RiskLevel::High => summary.high += 1,
                RiskLevel::Medium => summary.medium += 1,
                RiskLevel::Low => summary.low += 1,
            }
        }
        summary
    }

    pub fn from_scan(result: &ScanResult) -> Self {
        Self::from_findings(result.values().flat_map(|analysis| analysis.risks.iter()))
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}
