use chrono::{DateTime, Local};
use std::time::SystemTime;

pub const UNAVAILABLE: &str = "Unavailable";

pub fn format_optional_time(time: Option<SystemTime>) -> String {
    match time {
        Some(value) => format_system_time(value),
        None => UNAVAILABLE.to_string(),
    }
}

pub fn format_system_time(time: SystemTime) -> String {
    let datetime: DateTime<Local> = time.into();
    datetime.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Tamaño legible: bytes por debajo de 1 KB, KB por debajo de 1 MB, MB en adelante.
pub fn format_size(bytes: u64) -> String {
    let kb = bytes as f64 / 1024.0;
    let mb = kb / 1024.0;

    if mb >= 1.0 {
        format!("{mb:.1} MB")
    } else if kb >= 1.0 {
        format!("{kb:.1} KB")
    } else {
        format!("{bytes} bytes")
    }
}

/// Formatea un número sin decimales sobrantes (`50` en lugar de `50.0`).
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let rendered = format!("{value:.4}");
        rendered
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}
