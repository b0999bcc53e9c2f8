//! Motor de reglas de riesgo.
//!
//! Cada registro se evalúa contra todas las reglas, sin cortocircuito: una
//! coincidencia en la clave o en el valor produce un hallazgo por regla.

pub mod rules;

use crate::error::{AnalyzerError, Result};
use crate::model::{MetadataRecord, RiskFinding, RiskLevel};
use regex::{Regex, RegexBuilder};
use rules::{DEFAULT_RULES, RuleDef};

/// Regla compilada. Inmutable una vez construida.
#[derive(Clone, Debug)]
pub struct RiskRule {
    pub name: &'static str,
    pub level: RiskLevel,
    pub case_sensitive: bool,
    pattern: Regex,
    reject_after: Option<Regex>,
}

impl RiskRule {
    fn compile(def: &RuleDef) -> Result<Self> {
        let build = |pattern: &str| {
            RegexBuilder::new(pattern)
                .case_insensitive(!def.case_sensitive)
                .build()
                .map_err(|source| AnalyzerError::Rule {
                    rule: def.name,
                    source,
                })
        };

        Ok(Self {
            name: def.name,
            level: def.level,
            case_sensitive: def.case_sensitive,
            pattern: build(def.pattern)?,
            reject_after: def.reject_after.map(build).transpose()?,
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Busca alguna coincidencia válida en `text`.
    ///
    /// Con `reject_after` se prueba cada posición de inicio, no sólo las
    /// coincidencias disjuntas.
    pub fn matches(&self, text: &str) -> bool {
        match &self.reject_after {
            None => self.pattern.is_match(text),
            Some(reject) => {
                let mut start = 0;
                while let Some(found) = self.pattern.find_at(text, start) {
                    if !reject.is_match(&text[found.end()..]) {
                        return true;
                    }
                    let width = text[found.start()..].chars().next().map_or(1, char::len_utf8);
                    start = found.start() + width;
                }
                false
            }
        }
    }

    pub fn applies_to(&self, record: &MetadataRecord) -> bool {
        self.matches(&record.key) || self.matches(&record.value)
    }
}

/// Tabla ordenada de reglas, compartida en sólo lectura entre los workers.
#[derive(Clone, Debug)]
pub struct RuleEngine {
    rules: Vec<RiskRule>,
}

impl RuleEngine {
    pub fn new() -> Result<Self> {
        Self::from_definitions(DEFAULT_RULES)
    }

    pub fn from_definitions(definitions: &[RuleDef]) -> Result<Self> {
        let rules = definitions.iter().map(RiskRule::compile).collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[RiskRule] {
        &self.rules
    }

    /// Hallazgos en orden registro → regla.
    pub fn analyze(&self, records: &[MetadataRecord]) -> Vec<RiskFinding> {
        records
            .iter()
            .flat_map(|record| {
                self.rules
                    .iter()
                    .filter(|rule| rule.applies_to(record))
                    .map(move |rule| RiskFinding::from_record(record, rule.name, rule.level))
            })
            .collect()
    }
}
