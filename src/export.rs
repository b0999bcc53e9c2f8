//! Exportación de resultados a CSV y JSON.

use crate::error::{AnalyzerError, Diagnostic, Result};
use crate::model::{FileAnalysis, RiskFinding, RiskSummary, ScanResult, finding_for_record};
use crate::scanner::ScanReport;
use chrono::Local;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// Deduce el formato por la extensión del destino.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            _ => None,
        }
    }
}

fn generated_at() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn csv_writer<W: Write>(out: W) -> csv::Writer<W> {
    csv::WriterBuilder::new().flexible(true).from_writer(out)
}

fn statistics_row(summary: &RiskSummary) -> [String; 4] {
    [
        "Risk statistics:".to_string(),
        format!("High: {}", summary.high),
        format!("Medium: {}", summary.medium),
        format!("Low: {}", summary.low),
    ]
}

fn write_risk_rows<W: Write>(writer: &mut csv::Writer<W>, risks: &[RiskFinding]) -> Result<()> {
    writer.write_record(["Key", "Value", "Risk Level", "Rule", "Source"])?;
    for risk in risks {
        let level = risk.level.as_str().to_uppercase();
        writer.write_record([
            risk.key.as_str(),
            risk.value.as_str(),
            level.as_str(),
            risk.rule.as_str(),
            risk.source.as_str(),
        ])?;
    }
    Ok(())
}

/// Reporte CSV de un archivo: estadísticas, sección METADATA y RISK DETAILS.
pub fn write_file_csv<W: Write>(out: W, analysis: &FileAnalysis) -> Result<()> {
    let mut writer = csv_writer(out);
    let summary = RiskSummary::from_findings(&analysis.risks);

    writer.write_record(["Metadata Analysis Report"])?;
    writer.write_record([format!("Generated: {}", generated_at())])?;
    writer.write_record([format!("Total metadata items: {}", analysis.metadata.len())])?;
    writer.write_record([format!("Total risks found: {}", analysis.risks.len())])?;
    writer.write_record([""])?;
    writer.write_record(statistics_row(&summary))?;
    writer.write_record([""])?;

    writer.write_record(["METADATA"])?;
    writer.write_record(["Key", "Value", "Source", "Risk Level"])?;
    for record in &analysis.metadata {
        let level = finding_for_record(record, &analysis.risks)
            .map(|finding| finding.level.as_str().to_uppercase())
            .unwrap_or_else(|| "None".to_string());
        writer.write_record([
            record.key.as_str(),
            record.value.as_str(),
            record.source.as_str(),
            level.as_str(),
        ])?;
    }

    if !analysis.risks.is_empty() {
        writer.write_record([""])?;
        writer.write_record(["RISK DETAILS"])?;
        write_risk_rows(&mut writer, &analysis.risks)?;
    }

    writer.flush()?;
    Ok(())
}

/// Reporte CSV de una carpeta, un bloque por archivo con riesgos.
pub fn write_scan_csv<W: Write>(out: W, folder: &Path, result: &ScanResult) -> Result<()> {
    let mut writer = csv_writer(out);
    let summary = RiskSummary::from_scan(result);

    writer.write_record(["Folder Metadata Analysis Report"])?;
    writer.write_record([format!("Generated: {}", generated_at())])?;
    writer.write_record([format!("Folder: {}", folder.display())])?;
    writer.write_record([format!("Total files with risks: {}", result.len())])?;
    writer.write_record([""])?;
    writer.write_record([format!("Total risks found: {}", summary.total())])?;
    writer.write_record(statistics_row(&summary))?;
    writer.write_record([""])?;

    for (path, analysis) in result {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        writer.write_record([format!("FILE: {name}")])?;
        writer.write_record(["File path:".to_string(), path.display().to_string()])?;
        writer.write_record(["Risks found:".to_string(), analysis.risks.len().to_string()])?;
        writer.write_record([""])?;
        write_risk_rows(&mut writer, &analysis.risks)?;
        writer.write_record([""])?;
    }

    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct FileReport<'a> {
    generated: String,
    file: &'a Path,
    summary: RiskSummary,
    #[serde(flatten)]
    analysis: &'a FileAnalysis,
}

#[derive(Serialize)]
struct FolderReport<'a> {
    generated: String,
    folder: &'a Path,
    files_with_risks: usize,
    summary: RiskSummary,
    files: &'a ScanResult,
    diagnostics: &'a [Diagnostic],
}

fn to_json<W: Write, T: Serialize>(out: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(out, value).map_err(|err| AnalyzerError::Export(err.to_string()))
}

pub fn write_file_json<W: Write>(out: W, file: &Path, analysis: &FileAnalysis) -> Result<()> {
    let report = FileReport {
        generated: generated_at(),
        file,
        summary: RiskSummary::from_findings(&analysis.risks),
        analysis,
    };
    to_json(out, &report)
}

pub fn write_scan_json<W: Write>(out: W, folder: &Path, report: &ScanReport) -> Result<()> {
    let folder_report = FolderReport {
        generated: generated_at(),
        folder,
        files_with_risks: report.result.len(),
        summary: report.summary(),
        files: &report.result,
        diagnostics: &report.diagnostics,
    };
    to_json(out, &folder_report)
}

fn create(destination: &Path) -> Result<BufWriter<File>> {
    let file = File::create(destination).map_err(|err| {
        AnalyzerError::Export(format!("{}: {err}", destination.display()))
    })?;
    Ok(BufWriter::new(file))
}

pub fn export_file(
    destination: &Path,
    format: ExportFormat,
    file: &Path,
    analysis: &FileAnalysis,
) -> Result<()> {
    let mut out = create(destination)?;
    match format {
        ExportFormat::Csv => write_file_csv(&mut out, analysis)?,
        ExportFormat::Json => write_file_json(&mut out, file, analysis)?,
    }
    out.flush()?;
    Ok(())
}

pub fn export_scan(
    destination: &Path,
    format: ExportFormat,
    folder: &Path,
    report: &ScanReport,
) -> Result<()> {
    let mut out = create(destination)?;
    match format {
        ExportFormat::Csv => write_scan_csv(&mut out, folder, &report.result)?,
        ExportFormat::Json => write_scan_json(&mut out, folder, report)?,
    }
    out.flush()?;
    Ok(())
}
