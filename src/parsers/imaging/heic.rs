//! Imágenes HEIC/HEIF.
//!
//! El EXIF se lee del contenedor ISOBMFF con kamadak-exif. Las propiedades de
//! la imagen requieren libheif y sólo están disponibles con la feature `heif`.

use super::tags::{self, describe_orientation};
use crate::parsers::Extraction;
use crate::parsers::filesystem::push_file_facts;
use exif::{Exif, Tag};
use std::path::Path;

pub fn extract(path: &Path, extraction: &mut Extraction) {
    push_file_facts(path, extraction, true);
    extraction.push("File Format", "HEIC/HEIF");

    let exif = codec::embedded_exif(path, extraction).or_else(|| {
        match tags::read_container_exif(path) {
            Ok(data) => data,
            Err(message) => {
                extraction.fail("exif container", message);
                None
            }
        }
    });

    if let Some(data) = &exif {
        tags::push_library_fields(data, extraction);
    }

    codec::push_image_info(path, extraction);

    if let Some(data) = &exif {
        push_camera_summary(data, extraction);
    }
}

/// Orientación y resumen de cámara con unidades legibles.
fn push_camera_summary(exif: &Exif, extraction: &mut Extraction) {
    if let Some(value) = tags::orientation(exif) {
        extraction.push("Orientation", describe_orientation(value));
    }
    if let Some(make) = tags::primary_text(exif, Tag::Make) {
        extraction.push("Camera Make", make);
    }
    if let Some(model) = tags::primary_text(exif, Tag::Model) {
        extraction.push("Camera Model", model);
    }
    if let Some(exposure) = tags::primary_number(exif, Tag::ExposureTime) {
        extraction.push("Exposure Time", format!("{exposure}s"));
    }
    if let Some(aperture) = tags::primary_number(exif, Tag::FNumber) {
        extraction.push("Aperture", format!("f/{aperture}"));
    }
    if let Some(iso) = tags::primary_number(exif, Tag::PhotographicSensitivity) {
        extraction.push("ISO", iso);
    }
    if let Some(focal) = tags::primary_number(exif, Tag::FocalLength) {
        extraction.push("Focal Length", format!("{focal}mm"));
    }
}

#[cfg_attr(not(feature = "heif"), allow(dead_code))]
fn aspect_ratio(width: u32, height: u32) -> Option<String> {
    if width == 0 || height == 0 {
        return None;
    }
    let divisor = gcd(width, height);
    Some(format!("{}:{}", width / divisor, height / divisor))
}

#[cfg_attr(not(feature = "heif"), allow(dead_code))]
fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

#[cfg_attr(not(feature = "heif"), allow(dead_code))]
fn megapixels(width: u32, height: u32) -> String {
    let total = f64::from(width) * f64::from(height) / 1_000_000.0;
    format!("{total:.2} MP")
}

#[cfg(feature = "heif")]
mod codec {
    use super::{aspect_ratio, megapixels};
    use crate::parsers::Extraction;
    use crate::parsers::imaging::tags;
    use exif::Exif;
    use libheif_rs::{HeifContext, ImageHandle, ItemId};
    use std::path::Path;

    fn open(path: &Path) -> Result<HeifContext<'static>, String> {
        let name = path
            .to_str()
            .ok_or_else(|| "La ruta no es UTF-8 válido".to_string())?;
        HeifContext::read_from_file(name).map_err(|err| format!("No se pudo abrir el HEIF: {err}"))
    }

    fn primary(context: &HeifContext<'_>) -> Result<ImageHandle, String> {
        context
            .primary_image_handle()
            .map_err(|err| format!("Sin imagen principal: {err}"))
    }

    /// Bloque EXIF del ítem principal; los primeros 4 bytes son el offset a la cabecera TIFF.
    pub fn embedded_exif(path: &Path, extraction: &mut Extraction) -> Option<Exif> {
        let handle = match open(path).and_then(|context| primary(&context)) {
            Ok(handle) => handle,
            Err(message) => {
                extraction.fail("heif container", message);
                return None;
            }
        };

        let mut ids: [ItemId; 1] = [0];
        if handle.metadata_block_ids(&mut ids, b"Exif") == 0 {
            return None;
        }
        let block = handle.metadata(ids[0]).ok()?;
        let offset = u32::from_be_bytes(block.get(..4)?.try_into().ok()?) as usize;
        let payload = block.get(4 + offset..)?.to_vec();

        match tags::read_raw_exif(payload) {
            Ok(data) => Some(data),
            Err(message) => {
                extraction.fail("exif block", message);
                None
            }
        }
    }

    pub fn push_image_info(path: &Path, extraction: &mut Extraction) {
        let context = match open(path) {
            Ok(context) => context,
            Err(message) => {
                extraction.fail("image info", message);
                return;
            }
        };
        let handle = match primary(&context) {
            Ok(handle) => handle,
            Err(message) => {
                extraction.fail("image info", message);
                return;
            }
        };

        let (width, height) = (handle.width(), handle.height());
        let alpha = handle.has_alpha_channel();
        let frames = context.number_of_top_level_images();

        extraction.push("Image Width", width.to_string());
        extraction.push("Image Height", height.to_string());
        extraction.push("Image Mode", if alpha { "RGBA" } else { "RGB" });
        extraction.push("Image Format", "HEIF");
        extraction.push("Image Bands", if alpha { "R, G, B, A" } else { "R, G, B" });
        extraction.push("Image Palette", "No");
        extraction.push("Image Animated", if frames > 1 { "Yes" } else { "No" });
        extraction.push("Image Frames", frames.to_string());
        if let Some(ratio) = aspect_ratio(width, height) {
            extraction.push("Aspect Ratio", ratio);
        }
        extraction.push("Megapixels", megapixels(width, height));
        extraction.push("Tech_luma_bits", handle.luma_bits_per_pixel().to_string());
    }
}

#[cfg(not(feature = "heif"))]
mod codec {
    use crate::parsers::Extraction;
    use exif::Exif;
    use std::path::Path;

    pub fn embedded_exif(_path: &Path, _extraction: &mut Extraction) -> Option<Exif> {
        None
    }

    pub fn push_image_info(_path: &Path, extraction: &mut Extraction) {
        extraction.push(
            "HEIC_Warning",
            "HEIF decoding support is not compiled in; image properties unavailable",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exif::{Field, In, Rational, Value};
    use tempfile::tempdir;

    fn field(tag: Tag, value: Value) -> Field {
        Field {
            tag,
            ifd_num: In::PRIMARY,
            value,
        }
    }

    fn rational(num: u32, denom: u32) -> Value {
        Value::Rational(vec![Rational { num, denom }])
    }

    #[test]
    fn camera_summary_uses_readable_units() -> Result<(), Box<dyn std::error::Error>> {
        let exif = tags::exif_from_fields(&[
            field(Tag::Make, Value::Ascii(vec![b"Apple".to_vec()])),
            field(Tag::Model, Value::Ascii(vec![b"iPhone 15 Pro".to_vec()])),
            field(Tag::Orientation, Value::Short(vec![6])),
            field(Tag::ExposureTime, rational(1, 125)),
            field(Tag::FNumber, rational(28, 10)),
            field(Tag::PhotographicSensitivity, Value::Short(vec![200])),
            field(Tag::FocalLength, rational(50, 1)),
        ])?;

        let mut extraction = Extraction::new("HEICParser");
        push_camera_summary(&exif, &mut extraction);

        let pairs: Vec<(&str, &str)> = extraction
            .records
            .iter()
            .map(|record| (record.key.as_str(), record.value.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("Orientation", "Rotated 90° CW"),
                ("Camera Make", "Apple"),
                ("Camera Model", "iPhone 15 Pro"),
                ("Exposure Time", "0.008s"),
                ("Aperture", "f/2.8"),
                ("ISO", "200"),
                ("Focal Length", "50mm"),
            ]
        );
        Ok(())
    }

    #[test]
    fn camera_summary_skips_missing_tags() -> Result<(), Box<dyn std::error::Error>> {
        let exif = tags::exif_from_fields(&[field(
            Tag::Make,
            Value::Ascii(vec![b"Canon".to_vec()]),
        )])?;

        let mut extraction = Extraction::new("HEICParser");
        push_camera_summary(&exif, &mut extraction);

        assert_eq!(extraction.records.len(), 1);
        assert!(extraction.contains_key("Camera Make"));
        assert!(!extraction.contains_key("Orientation"));
        Ok(())
    }

    #[test]
    fn aspect_ratio_is_reduced() {
        assert_eq!(aspect_ratio(4032, 3024).as_deref(), Some("4:3"));
        assert_eq!(aspect_ratio(1920, 1080).as_deref(), Some("16:9"));
        assert_eq!(aspect_ratio(0, 10), None);
    }

    #[test]
    fn megapixels_use_two_decimals() {
        assert_eq!(megapixels(4032, 3024), "12.19 MP");
    }

    #[test]
    fn unreadable_heic_still_reports_file_facts() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("foto.heic");
        std::fs::write(&path, b"no es un heic")?;

        let mut extraction = Extraction::new("HEICParser");
        extract(&path, &mut extraction);

        assert!(extraction.contains_key("File Name"));
        assert!(extraction.contains_key("File Format"));
        let extension = extraction
            .records
            .iter()
            .find(|record| record.key == "File Extension")
            .map(|record| record.value.as_str());
        assert_eq!(extension, Some(".HEIC"));
        Ok(())
    }
}
