//! FileLens: extracción de metadata y clasificación de riesgos de fuga de información.
//!
//! El flujo es `resolver` → `parsers` → `risk`, orquestado por [`Analyzer`]
//! para archivos sueltos y por [`BatchScanner`] para carpetas completas.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod export;
pub mod formatting;
pub mod logging;
pub mod model;
pub mod parsers;
pub mod resolver;
pub mod risk;
pub mod scanner;
pub mod ui;

pub use analyzer::Analyzer;
pub use error::{AnalyzerError, Diagnostic, ParseFailure, Result, ScanIssue};
pub use model::{
    FileAnalysis, MetadataRecord, RiskFinding, RiskLevel, RiskSummary, ScanResult,
    finding_for_record,
};
pub use parsers::ParserKind;
pub use risk::{RiskRule, RuleEngine};
pub use scanner::{BatchScanner, CancellationToken, ScanOptions, ScanReport};
