use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use filelens::export::{self, ExportFormat};
use filelens::{Analyzer, RuleEngine, ScanOptions, config, logging, ui};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "filelens",
    version,
    about = "Audita la metadata de documentos e imágenes y señala riesgos de fuga de información"
)]
struct Cli {
    /// Muestra el log de depuración en stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analiza un único archivo.
    File {
        path: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Escanea una carpeta de forma recursiva.
    Folder {
        path: PathBuf,
        /// Archivo JSON con opciones de escaneo.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Tamaño máximo por archivo, en MiB.
        #[arg(long)]
        max_size_mb: Option<u64>,
        /// Hilos de trabajo (0 = automático).
        #[arg(long)]
        workers: Option<usize>,
        /// Lista los archivos omitidos y las extracciones parciales.
        #[arg(long)]
        diagnostics: bool,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Muestra la tabla de reglas de riesgo.
    Rules,
}

#[derive(clap::Args)]
struct OutputArgs {
    /// Exporta el resultado a este archivo.
    #[arg(long)]
    export: Option<PathBuf>,
    /// Formato de exportación; por defecto se deduce de la extensión.
    #[arg(long, value_enum)]
    format: Option<FormatArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Json,
}

impl From<FormatArg> for ExportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Json => ExportFormat::Json,
        }
    }
}

impl OutputArgs {
    fn destination(&self) -> Result<Option<(&Path, ExportFormat)>, String> {
        let Some(destination) = self.export.as_deref() else {
            return Ok(None);
        };
        let format = match self.format {
            Some(format) => format.into(),
            None => ExportFormat::from_path(destination).ok_or_else(|| {
                format!(
                    "No se pudo deducir el formato de `{}`; usa --format csv|json",
                    destination.display()
                )
            })?,
        };
        Ok(Some((destination, format)))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{} {message}", style("Error:").red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), String> {
    match command {
        Command::File { path, output } => analyze_file(&path, &output),
        Command::Folder {
            path,
            config,
            max_size_mb,
            workers,
            diagnostics,
            output,
        } => {
            let options = match config {
                Some(config_path) => {
                    config::load_options(&config_path).map_err(|err| err.to_string())?
                }
                None => ScanOptions::default(),
            };
            let options = config::apply_overrides(options, max_size_mb, workers)
                .map_err(|err| err.to_string())?;
            analyze_folder(&path, options, diagnostics, &output)
        }
        Command::Rules => {
            let engine = RuleEngine::new().map_err(|err| err.to_string())?;
            ui::render_header(&format!("{} reglas activas", engine.rules().len()));
            println!("{}", ui::rules_table(&engine));
            Ok(())
        }
    }
}

fn analyze_file(path: &Path, output: &OutputArgs) -> Result<(), String> {
    let destination = output.destination()?;
    let analyzer = Analyzer::new().map_err(|err| err.to_string())?;
    let analysis = analyzer.analyze_file(path).map_err(|err| err.to_string())?;

    ui::render_header(&path.display().to_string());
    ui::render_file(path, &analysis);

    if let Some((destination, format)) = destination {
        export::export_file(destination, format, path, &analysis).map_err(|err| err.to_string())?;
        info!(destination = %destination.display(), "Reporte exportado");
        println!(
            "\n{} {}",
            style("Reporte guardado en").dim(),
            style(destination.display()).cyan()
        );
    }

    Ok(())
}

fn analyze_folder(
    path: &Path,
    options: ScanOptions,
    show_diagnostics: bool,
    output: &OutputArgs,
) -> Result<(), String> {
    let destination = output.destination()?;
    let analyzer = Analyzer::with_options(options).map_err(|err| err.to_string())?;
    let report = analyzer.analyze_folder(path);

    ui::render_header(&path.display().to_string());
    ui::render_scan(path, &report);
    if show_diagnostics {
        ui::render_diagnostics(&report.diagnostics);
    } else if !report.diagnostics.is_empty() {
        println!(
            "{}",
            style(format!(
                "{} diagnósticos (usa --diagnostics para verlos)",
                report.diagnostics.len()
            ))
            .dim()
        );
    }

    if let Some((destination, format)) = destination {
        export::export_scan(destination, format, path, &report).map_err(|err| err.to_string())?;
        info!(destination = %destination.display(), "Reporte exportado");
        println!(
            "\n{} {}",
            style("Reporte guardado en").dim(),
            style(destination.display()).cyan()
        );
    }

    Ok(())
}
