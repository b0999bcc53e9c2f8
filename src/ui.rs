//! Renderizado en terminal: cabecera, tablas de metadata y de riesgos.

use crate::error::Diagnostic;
use crate::model::{FileAnalysis, RiskLevel, RiskSummary, finding_for_record};
use crate::risk::RuleEngine;
use crate::scanner::ScanReport;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Row, Table};
use console::style;
use std::path::Path;

const HEADER_WIDTH: usize = 74;

const KEY_COLOR: Color = Color::Rgb {
    r: 160,
    g: 196,
    b: 255,
};

const TITLE: &str = "FileLens · Auditoría de metadata y riesgos";

/// Líneas de la caja de cabecera: título y contexto del análisis.
/// El contexto se recorta por la izquierda para que la ruta conserve el final.
pub fn header_lines(context: &str) -> Vec<String> {
    let inner = HEADER_WIDTH - 4;
    let border = "─".repeat(HEADER_WIDTH - 2);

    let count = context.chars().count();
    let context = if count > inner {
        let tail: String = context.chars().skip(count - (inner - 1)).collect();
        format!("…{tail}")
    } else {
        context.to_string()
    };

    vec![
        format!("┌{border}┐"),
        format!("│ {TITLE:^inner$} │"),
        format!("│ {context:<inner$} │"),
        format!("└{border}┘"),
    ]
}

pub fn render_header(context: &str) {
    let lines = header_lines(context);
    println!();
    for (index, line) in lines.iter().enumerate() {
        let styled = style(line).cyan();
        if index == 1 {
            println!("{}", styled.bold());
        } else {
            println!("{styled}");
        }
    }
    println!();
}

pub fn level_color(level: RiskLevel) -> Color {
    match level {
        RiskLevel::High => Color::Red,
        RiskLevel::Medium => Color::Yellow,
        RiskLevel::Low => Color::Green,
    }
}

fn build_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(headers.iter().map(|text| header_cell(text)).collect::<Vec<_>>());
    table
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
        .add_attribute(Attribute::Underlined)
}

fn level_cell(level: RiskLevel) -> Cell {
    Cell::new(level.as_str().to_uppercase())
        .fg(level_color(level))
        .add_attribute(Attribute::Bold)
}

/// Tabla de metadata; cada fila toma el color del primer riesgo asociado.
pub fn metadata_table(analysis: &FileAnalysis) -> Table {
    let mut table = build_table(&["Clave", "Valor", "Origen", "Riesgo"]);

    for record in &analysis.metadata {
        let finding = finding_for_record(record, &analysis.risks);
        let value_color = finding
            .map(|finding| level_color(finding.level))
            .unwrap_or(Color::White);
        let risk = match finding {
            Some(finding) => level_cell(finding.level),
            None => Cell::new("-").fg(Color::DarkGrey),
        };

        table.add_row(Row::from(vec![
            Cell::new(&record.key).fg(KEY_COLOR),
            Cell::new(&record.value).fg(value_color),
            Cell::new(&record.source).fg(Color::DarkGrey),
            risk,
        ]));
    }

    table
}

pub fn risk_table(analysis: &FileAnalysis) -> Table {
    let mut table = build_table(&["Clave", "Valor", "Nivel", "Regla", "Origen"]);

    for finding in &analysis.risks {
        table.add_row(Row::from(vec![
            Cell::new(&finding.key).fg(KEY_COLOR),
            Cell::new(&finding.value),
            level_cell(finding.level),
            Cell::new(&finding.rule),
            Cell::new(&finding.source).fg(Color::DarkGrey),
        ]));
    }

    table
}

pub fn rules_table(engine: &RuleEngine) -> Table {
    let mut table = build_table(&["Regla", "Nivel", "Patrón"]);

    for rule in engine.rules() {
        table.add_row(Row::from(vec![
            Cell::new(rule.name).fg(KEY_COLOR),
            level_cell(rule.level),
            Cell::new(rule.pattern()).fg(Color::DarkGrey),
        ]));
    }

    table
}

pub fn summary_line(summary: &RiskSummary) -> String {
    format!(
        "{} riesgos · {} · {} · {}",
        summary.total(),
        style(format!("altos {}", summary.high)).red().bold(),
        style(format!("medios {}", summary.medium)).yellow().bold(),
        style(format!("bajos {}", summary.low)).green().bold()
    )
}

pub fn render_file(path: &Path, analysis: &FileAnalysis) {
    println!("{}", style(path.display()).bold());
    println!(
        "{}",
        style(format!("{} registros de metadata", analysis.metadata.len())).dim()
    );

    if analysis.metadata.is_empty() {
        println!("{}", style("Sin metadata para este formato.").dim());
        return;
    }

    println!("\n{}", metadata_table(analysis));

    if analysis.has_risks() {
        println!("\n{}", risk_table(analysis));
    }
    println!(
        "\n{}",
        summary_line(&RiskSummary::from_findings(&analysis.risks))
    );
}

pub fn render_scan(folder: &Path, report: &ScanReport) {
    println!(
        "{} {}",
        style("Carpeta:").bold(),
        style(folder.display()).cyan()
    );

    if report.result.is_empty() {
        println!("{}", style("No se encontraron archivos con riesgos.").green());
    }

    for (path, analysis) in &report.result {
        println!("\n{}", style(path.display()).bold().underlined());
        println!("{}", risk_table(analysis));
    }

    println!(
        "\n{} archivos con riesgos · {}",
        report.result.len(),
        summary_line(&report.summary())
    );

    if report.cancelled() {
        println!("{}", style("Escaneo cancelado: resultado parcial.").yellow());
    }
}

pub fn render_diagnostics(diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }

    println!(
        "\n{}",
        style(format!("{} diagnósticos", diagnostics.len())).yellow().bold()
    );
    for diagnostic in diagnostics {
        println!("  {} {}", style("•").yellow(), style(diagnostic).dim());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MetadataRecord, RiskFinding};

    #[test]
    fn levels_use_traffic_light_colors() {
        assert_eq!(level_color(RiskLevel::High), Color::Red);
        assert_eq!(level_color(RiskLevel::Medium), Color::Yellow);
        assert_eq!(level_color(RiskLevel::Low), Color::Green);
    }

    #[test]
    fn metadata_table_has_one_row_per_record() {
        let author = MetadataRecord::new("Author", "ana", "PDFParser");
        let pages = MetadataRecord::new("Pages", "2", "PDFParser");
        let risks = vec![RiskFinding::from_record(
            &author,
            "Author Information",
            RiskLevel::Medium,
        )];
        let analysis = FileAnalysis::new(vec![author, pages], risks);

        let table = metadata_table(&analysis);
        assert_eq!(table.row_iter().count(), 2);
        assert!(table.to_string().contains("MEDIUM"));
    }

    #[test]
    fn header_keeps_box_width_and_path_tail() {
        let long = format!("/datos/{}/informe.pdf", "x".repeat(120));
        for context in ["22 reglas activas", long.as_str()] {
            let lines = header_lines(context);
            assert_eq!(lines.len(), 4);
            for line in &lines {
                assert_eq!(line.chars().count(), HEADER_WIDTH);
            }
        }
        assert!(header_lines(&long)[2].contains("…"));
        assert!(header_lines(&long)[2].contains("informe.pdf"));
    }
}
