//! Escaneo recursivo de carpetas.
//!
//! Los archivos se procesan en un pool de rayon y un único colector recibe
//! los resultados por canal. El resultado se indexa por ruta, por lo que el
//! orden de ejecución no altera el contenido final.

use crate::analyzer::run_pipeline;
use crate::error::{Diagnostic, ScanIssue};
use crate::model::{FileAnalysis, RiskSummary, ScanResult};
use crate::resolver;
use crate::risk::RuleEngine;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::thread;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "pdf", "docx", "xlsx", "jpg", "jpeg", "png", "tiff", "tif", "heic", "heif",
];

/// Política de inclusión del escaneo.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Tamaño máximo en bytes; los archivos mayores se omiten.
    pub max_file_size: u64,
    /// Hilos del pool. `0` deja que rayon decida.
    pub workers: usize,
    /// Extensiones admitidas, sin punto.
    pub extensions: Vec<String>,
    pub follow_links: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            workers: thread::available_parallelism()
                .map(|count| count.get())
                .unwrap_or(1),
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            follow_links: false,
        }
    }
}

impl ScanOptions {
    pub fn accepts(&self, path: &Path) -> bool {
        let Some(ext) = resolver::normalized_extension(path) else {
            return false;
        };
        self.extensions
            .iter()
            .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(&ext))
    }
}

/// Token de cancelación cooperativa. Clonarlo comparte el estado.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

/// Resultado del escaneo junto con los diagnósticos no fatales.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ScanReport {
    pub result: ScanResult,
    pub diagnostics: Vec<Diagnostic>,
}

impl ScanReport {
    pub fn summary(&self) -> RiskSummary {
        RiskSummary::from_scan(&self.result)
    }

    pub fn cancelled(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.issue == ScanIssue::Cancelled)
    }

    fn absorb(&mut self, outcome: FileOutcome) {
        self.diagnostics.extend(outcome.diagnostics);
        if let Some(analysis) = outcome.analysis
            && analysis.has_risks()
        {
            self.result.insert(outcome.path, analysis);
        }
    }
}

struct FileOutcome {
    path: PathBuf,
    analysis: Option<FileAnalysis>,
    diagnostics: Vec<Diagnostic>,
}

impl FileOutcome {
    fn skipped(path: &Path, issue: ScanIssue) -> Self {
        Self {
            path: path.to_path_buf(),
            analysis: None,
            diagnostics: vec![Diagnostic::new(path, issue)],
        }
    }
}

pub struct BatchScanner {
    engine: Arc<RuleEngine>,
    options: ScanOptions,
}

impl BatchScanner {
    pub fn new(engine: Arc<RuleEngine>, options: ScanOptions) -> Self {
        Self { engine, options }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    pub fn scan(&self, root: &Path) -> ScanReport {
        self.scan_with_cancel(root, &CancellationToken::new())
    }

    /// Escanea `root`. Nunca falla: los problemas quedan en `diagnostics`.
    pub fn scan_with_cancel(&self, root: &Path, cancel: &CancellationToken) -> ScanReport {
        self.scan_with_progress(root, cancel, &|_| {})
    }

    /// Igual que `scan_with_cancel`; `progress` se invoca desde el worker al
    /// terminar cada archivo, antes de enviar su resultado al colector.
    pub fn scan_with_progress(
        &self,
        root: &Path,
        cancel: &CancellationToken,
        progress: &(dyn Fn(&Path) + Sync),
    ) -> ScanReport {
        let mut report = ScanReport::default();

        if let Err(err) = fs::read_dir(root) {
            warn!(path = %root.display(), error = %err, "No se pudo acceder a la carpeta");
            report.diagnostics.push(Diagnostic::new(
                root,
                ScanIssue::FolderAccess {
                    message: err.to_string(),
                },
            ));
            return report;
        }

        // Las claves del resultado son rutas absolutas.
        let root = fs::canonicalize(root).unwrap_or_else(|err| {
            debug!(path = %root.display(), error = %err, "No se pudo canonicalizar la raíz");
            root.to_path_buf()
        });
        let root = root.as_path();

        let files = self.collect_files(root, &mut report.diagnostics);
        info!(path = %root.display(), files = files.len(), "Iniciando escaneo");

        let (sender, receiver) = mpsc::channel::<FileOutcome>();
        thread::scope(|scope| {
            scope.spawn(|| self.run_pool(&files, cancel, progress, sender));
            for outcome in receiver {
                report.absorb(outcome);
            }
        });

        report
            .diagnostics
            .sort_by(|left, right| left.path.cmp(&right.path));

        info!(
            path = %root.display(),
            with_risks = report.result.len(),
            diagnostics = report.diagnostics.len(),
            "Escaneo completado"
        );
        report
    }

    fn collect_files(&self, root: &Path, diagnostics: &mut Vec<Diagnostic>) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for entry in WalkDir::new(root).follow_links(self.options.follow_links) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().unwrap_or(root).to_path_buf();
                    debug!(path = %path.display(), error = %err, "Entrada omitida");
                    diagnostics.push(Diagnostic::new(
                        path,
                        ScanIssue::FolderAccess {
                            message: err.to_string(),
                        },
                    ));
                    continue;
                }
            };

            let path = entry.path();
            if entry.file_type().is_dir() || !path.is_file() {
                continue;
            }
            if self.options.accepts(path) {
                files.push(path.to_path_buf());
            }
        }

        files.sort();
        files
    }

    fn run_pool(
        &self,
        files: &[PathBuf],
        cancel: &CancellationToken,
        progress: &(dyn Fn(&Path) + Sync),
        sender: Sender<FileOutcome>,
    ) {
        let job = move || {
            files.par_iter().for_each_with(sender, |sender, path| {
                let outcome = self.process(path, cancel);
                progress(path);
                let _ = sender.send(outcome);
            });
        };

        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.workers)
            .thread_name(|index| format!("filelens-scan-{index}"))
            .build()
        {
            Ok(pool) => pool.install(job),
            Err(err) => {
                warn!(error = %err, "No se pudo crear el pool de escaneo; se usa el global");
                job();
            }
        }
    }

    fn process(&self, path: &Path, cancel: &CancellationToken) -> FileOutcome {
        if cancel.is_cancelled() {
            return FileOutcome::skipped(path, ScanIssue::Cancelled);
        }

        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(err) => {
                debug!(path = %path.display(), error = %err, "Archivo omitido");
                return FileOutcome::skipped(path, ScanIssue::from_io(&err));
            }
        };

        if metadata.len() > self.options.max_file_size {
            info!(
                path = %path.display(),
                size_mb = metadata.len() / (1024 * 1024),
                "Archivo grande omitido"
            );
            return FileOutcome::skipped(
                path,
                ScanIssue::FileTooLarge {
                    size: metadata.len(),
                    limit: self.options.max_file_size,
                },
            );
        }

        if let Err(err) = File::open(path) {
            debug!(path = %path.display(), error = %err, "Archivo sin permiso de lectura");
            return FileOutcome::skipped(path, ScanIssue::from_io(&err));
        }

        let Some(kind) = resolver::resolve(path) else {
            return FileOutcome::skipped(path, ScanIssue::UnsupportedFormat);
        };

        let engine = &self.engine;
        let analyzed = panic::catch_unwind(AssertUnwindSafe(|| run_pipeline(kind, path, engine)));
        match analyzed {
            Ok((analysis, failures)) => FileOutcome {
                path: path.to_path_buf(),
                analysis: Some(analysis),
                diagnostics: failures
                    .into_iter()
                    .map(|failure| Diagnostic::new(path, ScanIssue::ParseFailure(failure)))
                    .collect(),
            },
            Err(_) => {
                warn!(path = %path.display(), "El parser abortó de forma inesperada");
                FileOutcome::skipped(
                    path,
                    ScanIssue::Io {
                        message: "el parser abortó de forma inesperada".to_string(),
                    },
                )
            }
        }
    }
}
