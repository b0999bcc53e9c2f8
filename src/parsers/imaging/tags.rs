//! Lectura y presentación de campos EXIF.
//!
//! Hay dos recorridos independientes: el lector binario sobre el contenedor
//! (`EXIF_<IFD> <Tag>`) y el bloque EXIF que entrega la librería de imagen
//! (`EXIF_<Tag>`). Ambos se conservan aunque se solapen.

use crate::formatting::format_number;
use crate::parsers::Extraction;
use exif::{Context, Exif, Field, In, Rational, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const ORIENTATIONS: [&str; 8] = [
    "Horizontal (normal)",
    "Mirrored horizontal",
    "Rotated 180°",
    "Mirrored vertical",
    "Mirrored horizontal then rotated 90° CCW",
    "Rotated 90° CW",
    "Mirrored horizontal then rotated 90° CW",
    "Rotated 90° CCW",
];

/// Texto legible para el valor del tag 274 (Orientation).
pub fn describe_orientation(value: u32) -> String {
    value
        .checked_sub(1)
        .and_then(|index| ORIENTATIONS.get(index as usize))
        .map(|label| label.to_string())
        .unwrap_or_else(|| format!("Unknown ({value})"))
}

/// `Ok(None)` cuando el archivo simplemente no trae EXIF.
pub fn read_container_exif(path: &Path) -> Result<Option<Exif>, String> {
    let file = File::open(path).map_err(|err| format!("No se pudo abrir la imagen: {err}"))?;
    let mut reader = BufReader::new(file);
    match exif::Reader::new().read_from_container(&mut reader) {
        Ok(data) => Ok(Some(data)),
        Err(exif::Error::NotFound(_)) => Ok(None),
        Err(err) => Err(format!("No se pudo leer EXIF: {err}")),
    }
}

pub fn read_raw_exif(bytes: Vec<u8>) -> Result<Exif, String> {
    exif::Reader::new()
        .read_raw(bytes)
        .map_err(|err| format!("Bloque EXIF inválido: {err}"))
}

/// Tags que apuntan a datos binarios o a la miniatura y no aportan texto útil.
fn is_opaque(tag: Tag) -> bool {
    matches!(
        tag,
        Tag::JPEGInterchangeFormat | Tag::JPEGInterchangeFormatLength | Tag::MakerNote
    )
}

fn ifd_label(field: &Field) -> &'static str {
    match field.tag.context() {
        Context::Tiff if field.ifd_num == In::THUMBNAIL => "Thumbnail",
        Context::Tiff => "Image",
        Context::Exif => "EXIF",
        Context::Gps => "GPS",
        _ => "Interoperability",
    }
}

/// Recorrido del lector binario: todos los IFD, con anotaciones GPS.
pub fn push_container_fields(exif: &Exif, extraction: &mut Extraction) {
    for field in exif.fields() {
        if is_opaque(field.tag) {
            continue;
        }
        let rendered = plain_value(field);
        let value = match field.tag {
            Tag::GPSLatitude => format!("{rendered} (Latitude)"),
            Tag::GPSLongitude => format!("{rendered} (Longitude)"),
            Tag::GPSAltitude => format!("{rendered} meters"),
            _ => rendered,
        };
        extraction.push(format!("EXIF_{} {}", ifd_label(field), field.tag), value);
    }
}

/// Recorrido del bloque entregado por la librería de imagen: solo la imagen principal.
pub fn push_library_fields(exif: &Exif, extraction: &mut Extraction) {
    for field in exif.fields().filter(|field| field.ifd_num == In::PRIMARY) {
        if is_opaque(field.tag) {
            continue;
        }
        let value = format_field(exif, field);
        extraction.push_non_empty(format!("EXIF_{}", field.tag), value);
    }
}

/// Presentación según el tipo de dato: focal en mm, apertura `f/X`,
/// exposición `1/Ns`, fechas con guiones y GPS en grados decimales.
pub fn format_field(exif: &Exif, field: &Field) -> String {
    match field.tag {
        Tag::GPSLatitude => return format_coordinate(exif, &field.value, Tag::GPSLatitudeRef, "N"),
        Tag::GPSLongitude => {
            return format_coordinate(exif, &field.value, Tag::GPSLongitudeRef, "E");
        }
        Tag::GPSAltitude => {
            if let Some(altitude) = single_number(&field.value) {
                return format!("{} meters", format_number(altitude));
            }
        }
        _ => {}
    }

    let name = field.tag.to_string().to_lowercase();

    if (name.contains("date") || name.contains("time"))
        && let Some(text) = ascii_value(&field.value)
        && text.contains(':')
    {
        return text.replacen(':', "-", 2);
    }

    if let Some(number) = single_number(&field.value) {
        if name.contains("focal") {
            return format!("{}mm", format_number(number));
        }
        if name.contains("aperture") || name.contains("fnumber") {
            return format!("f/{}", format_number(number));
        }
        if name.contains("exposure") && number > 0.0 && number < 1.0 {
            return format!("1/{}s", (1.0 / number).round() as u64);
        }
    }

    plain_value(field)
}

/// Texto ASCII sin comillas; el resto con la presentación de kamadak-exif.
pub fn plain_value(field: &Field) -> String {
    match ascii_value(&field.value) {
        Some(text) => text.trim().to_string(),
        None => field.display_value().to_string(),
    }
}

fn format_coordinate(exif: &Exif, value: &Value, ref_tag: Tag, default_ref: &str) -> String {
    let reference = exif
        .get_field(ref_tag, In::PRIMARY)
        .and_then(|field| ascii_value(&field.value))
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| default_ref.to_string());

    match value {
        Value::Rational(parts) => match dms_to_decimal(parts) {
            Some(decimal) => format!("{decimal:.6}° {reference}"),
            None => format!("{parts:?}"),
        },
        other => format!("{:?}", other),
    }
}

/// `grados + minutos/60 + segundos/3600`.
pub fn dms_to_decimal(parts: &[Rational]) -> Option<f64> {
    match parts {
        [degrees, minutes, seconds] => {
            if degrees.denom == 0 || minutes.denom == 0 || seconds.denom == 0 {
                return None;
            }
            Some(degrees.to_f64() + minutes.to_f64() / 60.0 + seconds.to_f64() / 3600.0)
        }
        _ => None,
    }
}

pub fn ascii_value(value: &Value) -> Option<String> {
    match value {
        Value::Ascii(parts) => {
            let text = parts
                .iter()
                .map(|part| String::from_utf8_lossy(part).into_owned())
                .collect::<Vec<_>>()
                .join(" ");
            Some(text.trim_end_matches('\0').to_string())
        }
        _ => None,
    }
}

/// Valor numérico cuando el campo tiene un único componente.
pub fn single_number(value: &Value) -> Option<f64> {
    match value {
        Value::Byte(v) if v.len() == 1 => Some(f64::from(v[0])),
        Value::Short(v) if v.len() == 1 => Some(f64::from(v[0])),
        Value::Long(v) if v.len() == 1 => Some(f64::from(v[0])),
        Value::SShort(v) if v.len() == 1 => Some(f64::from(v[0])),
        Value::SLong(v) if v.len() == 1 => Some(f64::from(v[0])),
        Value::Rational(v) if v.len() == 1 && v[0].denom != 0 => Some(v[0].to_f64()),
        Value::SRational(v) if v.len() == 1 && v[0].denom != 0 => Some(v[0].to_f64()),
        Value::Float(v) if v.len() == 1 => Some(f64::from(v[0])),
        Value::Double(v) if v.len() == 1 => Some(v[0]),
        _ => None,
    }
}

pub fn orientation(exif: &Exif) -> Option<u32> {
    exif.get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
}

/// Valor de un tag principal ya formateado como número.
pub fn primary_number(exif: &Exif, tag: Tag) -> Option<String> {
    exif.get_field(tag, In::PRIMARY)
        .and_then(|field| single_number(&field.value))
        .map(format_number)
}

pub fn primary_text(exif: &Exif, tag: Tag) -> Option<String> {
    exif.get_field(tag, In::PRIMARY)
        .map(plain_value)
        .filter(|text| !text.is_empty())
}

/// `Exif` construido en memoria a partir de campos sueltos.
#[cfg(test)]
pub(crate) fn exif_from_fields(fields: &[Field]) -> Result<Exif, Box<dyn std::error::Error>> {
    let mut writer = exif::experimental::Writer::new();
    for field in fields {
        writer.push_field(field);
    }
    let mut tiff = std::io::Cursor::new(Vec::new());
    writer.write(&mut tiff, false)?;
    Ok(exif::Reader::new().read_raw(tiff.into_inner())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rational(num: u32, denom: u32) -> Rational {
        Rational { num, denom }
    }

    #[test]
    fn orientation_table_covers_all_values() {
        assert_eq!(describe_orientation(1), "Horizontal (normal)");
        assert_eq!(describe_orientation(6), "Rotated 90° CW");
        assert_eq!(describe_orientation(8), "Rotated 90° CCW");
        assert_eq!(describe_orientation(0), "Unknown (0)");
        assert_eq!(describe_orientation(9), "Unknown (9)");
    }

    #[test]
    fn dms_converts_to_decimal_degrees() {
        let parts = [rational(40, 1), rational(26, 1), rational(4632, 100)];
        let decimal = dms_to_decimal(&parts).unwrap_or_default();
        assert_eq!(format!("{decimal:.6}"), "40.446200");
        assert!(dms_to_decimal(&parts[..2]).is_none());
        assert!(dms_to_decimal(&[rational(1, 0), rational(0, 1), rational(0, 1)]).is_none());
    }

    #[test]
    fn single_number_rejects_multi_component_values() {
        assert_eq!(single_number(&Value::Short(vec![6])), Some(6.0));
        assert_eq!(
            single_number(&Value::Rational(vec![rational(28, 10)])),
            Some(2.8)
        );
        assert_eq!(single_number(&Value::Short(vec![1, 2])), None);
        assert_eq!(single_number(&Value::Ascii(vec![b"x".to_vec()])), None);
    }

    #[test]
    fn ascii_values_drop_trailing_nul() {
        let value = Value::Ascii(vec![b"2024:05:01 10:20:30\0".to_vec()]);
        assert_eq!(ascii_value(&value).as_deref(), Some("2024:05:01 10:20:30"));
    }

    fn field(tag: Tag, value: Value) -> Field {
        Field {
            tag,
            ifd_num: In::PRIMARY,
            value,
        }
    }

    fn value_of<'a>(extraction: &'a Extraction, key: &str) -> Option<&'a str> {
        extraction
            .records
            .iter()
            .find(|record| record.key == key)
            .map(|record| record.value.as_str())
    }

    fn photo_fields() -> Vec<Field> {
        vec![
            field(Tag::FocalLength, Value::Rational(vec![rational(50, 1)])),
            field(Tag::FNumber, Value::Rational(vec![rational(28, 10)])),
            field(Tag::ExposureTime, Value::Rational(vec![rational(1, 125)])),
            field(
                Tag::DateTimeOriginal,
                Value::Ascii(vec![b"2024:05:01 10:20:30".to_vec()]),
            ),
            field(Tag::GPSLatitudeRef, Value::Ascii(vec![b"S".to_vec()])),
            field(
                Tag::GPSLatitude,
                Value::Rational(vec![rational(40, 1), rational(26, 1), rational(4632, 100)]),
            ),
            field(Tag::GPSAltitude, Value::Rational(vec![rational(650, 1)])),
        ]
    }

    #[test]
    fn library_fields_use_readable_units() -> Result<(), Box<dyn std::error::Error>> {
        let exif = exif_from_fields(&photo_fields())?;
        let mut extraction = Extraction::new("ImageParser");
        push_library_fields(&exif, &mut extraction);

        assert_eq!(value_of(&extraction, "EXIF_FocalLength"), Some("50mm"));
        assert_eq!(value_of(&extraction, "EXIF_FNumber"), Some("f/2.8"));
        assert_eq!(value_of(&extraction, "EXIF_ExposureTime"), Some("1/125s"));
        assert_eq!(
            value_of(&extraction, "EXIF_DateTimeOriginal"),
            Some("2024-05-01 10:20:30")
        );
        assert_eq!(value_of(&extraction, "EXIF_GPSLatitude"), Some("40.446200° S"));
        assert_eq!(value_of(&extraction, "EXIF_GPSAltitude"), Some("650 meters"));
        Ok(())
    }

    #[test]
    fn container_fields_annotate_gps() -> Result<(), Box<dyn std::error::Error>> {
        let exif = exif_from_fields(&photo_fields())?;
        let mut extraction = Extraction::new("ImageParser");
        push_container_fields(&exif, &mut extraction);

        assert_eq!(
            value_of(&extraction, "EXIF_GPS GPSLatitude"),
            Some("40 deg 26 min 46.32 sec (Latitude)")
        );
        assert_eq!(value_of(&extraction, "EXIF_GPS GPSAltitude"), Some("650 meters"));
        assert_eq!(value_of(&extraction, "EXIF_GPS GPSLatitudeRef"), Some("S"));
        assert!(extraction.contains_key("EXIF_EXIF FocalLength"));
        Ok(())
    }

    #[test]
    fn longitude_defaults_to_east_without_reference() -> Result<(), Box<dyn std::error::Error>> {
        let exif = exif_from_fields(&[field(
            Tag::GPSLongitude,
            Value::Rational(vec![rational(3, 1), rational(30, 1), rational(0, 1)]),
        )])?;
        let mut extraction = Extraction::new("ImageParser");
        push_library_fields(&exif, &mut extraction);

        assert_eq!(value_of(&extraction, "EXIF_GPSLongitude"), Some("3.500000° E"));
        Ok(())
    }
}
