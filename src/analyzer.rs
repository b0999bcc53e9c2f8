//! Fachada de análisis: punto de entrada único para la CLI y los exportadores.

use crate::error::{AnalyzerError, Diagnostic, ParseFailure, Result, ScanIssue};
use crate::model::FileAnalysis;
use crate::parsers::ParserKind;
use crate::resolver;
use crate::risk::RuleEngine;
use crate::scanner::{BatchScanner, CancellationToken, ScanOptions, ScanReport};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct Analyzer {
    engine: Arc<RuleEngine>,
    scanner: BatchScanner,
}

impl Analyzer {
    pub fn new() -> Result<Self> {
        Self::with_options(ScanOptions::default())
    }

    pub fn with_options(options: ScanOptions) -> Result<Self> {
        let engine = Arc::new(RuleEngine::new()?);
        let scanner = BatchScanner::new(Arc::clone(&engine), options);
        Ok(Self { engine, scanner })
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    pub fn options(&self) -> &ScanOptions {
        self.scanner.options()
    }

    /// Analiza un archivo suelto.
    ///
    /// Falla sólo si la ruta no es un archivo regular. Un formato sin parser
    /// devuelve un análisis vacío.
    pub fn analyze_file(&self, path: &Path) -> Result<FileAnalysis> {
        self.analyze_file_with_diagnostics(path)
            .map(|(analysis, _)| analysis)
    }

    /// Como `analyze_file`, devolviendo además las extracciones parciales y
    /// el aviso de formato no soportado.
    pub fn analyze_file_with_diagnostics(
        &self,
        path: &Path,
    ) -> Result<(FileAnalysis, Vec<Diagnostic>)> {
        if !path.is_file() {
            return Err(AnalyzerError::FileNotFound(path.to_path_buf()));
        }

        let Some(kind) = resolver::resolve(path) else {
            debug!(path = %path.display(), "Formato no soportado");
            let diagnostic = Diagnostic::new(path, ScanIssue::UnsupportedFormat);
            return Ok((FileAnalysis::default(), vec![diagnostic]));
        };

        let (analysis, failures) = run_pipeline(kind, path, &self.engine);
        let diagnostics = failures
            .into_iter()
            .map(|failure| Diagnostic::new(path, ScanIssue::ParseFailure(failure)))
            .collect();
        Ok((analysis, diagnostics))
    }

    pub fn analyze_folder(&self, path: &Path) -> ScanReport {
        self.scanner.scan(path)
    }

    pub fn analyze_folder_with_cancel(&self, path: &Path, cancel: &CancellationToken) -> ScanReport {
        self.scanner.scan_with_cancel(path, cancel)
    }
}

/// Parser → motor de reglas para un archivo ya resuelto.
pub(crate) fn run_pipeline(
    kind: ParserKind,
    path: &Path,
    engine: &RuleEngine,
) -> (FileAnalysis, Vec<ParseFailure>) {
    let extraction = kind.extract(path);
    for failure in &extraction.failures {
        warn!(
            path = %path.display(),
            parser = %failure.parser,
            stage = %failure.stage,
            error = %failure.message,
            "Extracción parcial"
        );
    }

    let risks = engine.analyze(&extraction.records);
    (FileAnalysis::new(extraction.records, risks), extraction.failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_a_hard_error() -> Result<()> {
        let analyzer = Analyzer::new()?;
        let result = analyzer.analyze_file(Path::new("/no/existe/informe.pdf"));
        assert!(matches!(result, Err(AnalyzerError::FileNotFound(_))));
        Ok(())
    }

    #[test]
    fn directory_is_not_a_file() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let analyzer = Analyzer::new()?;
        assert!(matches!(
            analyzer.analyze_file(dir.path()),
            Err(AnalyzerError::FileNotFound(_))
        ));
        Ok(())
    }

    #[test]
    fn unsupported_format_is_empty() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("notas.txt");
        fs::write(&path, "author: ana")?;

        let analysis = Analyzer::new()?.analyze_file(&path)?;
        assert!(analysis.metadata.is_empty());
        assert!(analysis.risks.is_empty());
        Ok(())
    }

    #[test]
    fn file_diagnostics_expose_parse_failures() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let broken = dir.path().join("roto.xlsx");
        fs::write(&broken, b"no es un zip")?;
        let notes = dir.path().join("notas.txt");
        fs::write(&notes, "author: ana")?;

        let analyzer = Analyzer::new()?;
        let (analysis, diagnostics) = analyzer.analyze_file_with_diagnostics(&broken)?;
        assert!(analysis.metadata.is_empty());
        assert!(matches!(
            diagnostics.as_slice(),
            [Diagnostic { path, issue: ScanIssue::ParseFailure(failure) }]
                if *path == broken && failure.parser == "ExcelParser"
        ));

        let (_, diagnostics) = analyzer.analyze_file_with_diagnostics(&notes)?;
        assert_eq!(diagnostics, vec![Diagnostic::new(&notes, ScanIssue::UnsupportedFormat)]);
        Ok(())
    }
}
