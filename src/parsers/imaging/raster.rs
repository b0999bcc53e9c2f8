//! Etapas de imágenes raster que dependen de la librería `image` y de `png`.

use super::tags::{self, describe_orientation};
use crate::parsers::Extraction;
use exif::{In, Tag};
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, ColorType, ImageDecoder, ImageFormat, ImageReader};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

const EXIF_HEADER: &[u8] = b"Exif\0\0";

fn open_reader(path: &Path) -> Result<ImageReader<BufReader<File>>, String> {
    ImageReader::open(path)
        .map_err(|err| format!("No se pudo abrir la imagen: {err}"))?
        .with_guessed_format()
        .map_err(|err| format!("No se pudo identificar el formato: {err}"))
}

/// Segundo recorrido EXIF, con el bloque que expone el decodificador de `image`.
pub fn push_library_exif(path: &Path, extraction: &mut Extraction) -> Result<(), String> {
    let mut decoder = open_reader(path)?
        .into_decoder()
        .map_err(|err| format!("No se pudo decodificar la imagen: {err}"))?;

    let Some(mut bytes) = decoder
        .exif_metadata()
        .map_err(|err| format!("No se pudo leer el bloque EXIF: {err}"))?
    else {
        return Ok(());
    };

    if bytes.starts_with(EXIF_HEADER) {
        bytes.drain(..EXIF_HEADER.len());
    }

    let data = tags::read_raw_exif(bytes)?;
    tags::push_library_fields(&data, extraction);
    Ok(())
}

/// Dimensiones, modo de color, bandas, paleta, animación y perfil ICC.
pub fn push_image_info(path: &Path, extraction: &mut Extraction) -> Result<(), String> {
    let reader = open_reader(path)?;
    let format = reader.format();
    let mut decoder = reader
        .into_decoder()
        .map_err(|err| format!("No se pudo decodificar la imagen: {err}"))?;

    let (width, height) = decoder.dimensions();
    let color = decoder.color_type();
    let has_icc = matches!(decoder.icc_profile(), Ok(Some(profile)) if !profile.is_empty());
    let layout = frame_layout(path, format);

    extraction.push("Image Width", width.to_string());
    extraction.push("Image Height", height.to_string());
    extraction.push("Image Mode", color_mode(color));
    if let Some(format) = format {
        extraction.push("Image Format", format_name(format));
    }
    extraction.push("Image Bands", color_bands(color));
    extraction.push("Image Palette", yes_no(layout.palette));
    extraction.push("Image Animated", yes_no(layout.frames > 1));
    extraction.push("Image Frames", layout.frames.to_string());
    if has_icc {
        extraction.push("Color Profile", "Present");
    }

    Ok(())
}

/// Información técnica residual según el formato y la orientación EXIF.
pub fn push_technical_info(path: &Path, extraction: &mut Extraction) -> Result<(), String> {
    let format = open_reader(path)?.format();

    match format {
        Some(ImageFormat::Png) => push_png_chunks(path, extraction)?,
        Some(ImageFormat::Jpeg) => push_jpeg_segments(path, extraction)?,
        Some(ImageFormat::Tiff) => push_tiff_tags(path, extraction)?,
        _ => {}
    }

    if let Ok(Some(data)) = tags::read_container_exif(path)
        && let Some(value) = tags::orientation(&data)
    {
        extraction.push("Orientation", describe_orientation(value));
    }

    Ok(())
}

struct FrameLayout {
    palette: bool,
    frames: u32,
}

fn frame_layout(path: &Path, format: Option<ImageFormat>) -> FrameLayout {
    let single = FrameLayout {
        palette: false,
        frames: 1,
    };

    match format {
        Some(ImageFormat::Png) => png_layout(path).unwrap_or(single),
        Some(ImageFormat::Gif) => FrameLayout {
            palette: true,
            frames: gif_frame_count(path).unwrap_or(1),
        },
        _ => single,
    }
}

fn png_layout(path: &Path) -> Option<FrameLayout> {
    let file = File::open(path).ok()?;
    let reader = png::Decoder::new(BufReader::new(file)).read_info().ok()?;
    let info = reader.info();
    Some(FrameLayout {
        palette: info.color_type == png::ColorType::Indexed,
        frames: info
            .animation_control
            .as_ref()
            .map(|control| control.num_frames)
            .unwrap_or(1),
    })
}

fn gif_frame_count(path: &Path) -> Option<u32> {
    let file = File::open(path).ok()?;
    let decoder = GifDecoder::new(BufReader::new(file)).ok()?;
    let count = decoder.into_frames().take_while(Result::is_ok).count();
    u32::try_from(count).ok().filter(|count| *count > 0)
}

fn push_png_chunks(path: &Path, extraction: &mut Extraction) -> Result<(), String> {
    let file = File::open(path).map_err(|err| format!("No se pudo abrir el PNG: {err}"))?;
    let reader = png::Decoder::new(BufReader::new(file))
        .read_info()
        .map_err(|err| format!("No se pudo leer la cabecera PNG: {err}"))?;
    let info = reader.info();

    if let Some(dims) = info.pixel_dims
        && dims.unit == png::Unit::Meter
    {
        let x = (f64::from(dims.xppu) * 0.0254).round();
        let y = (f64::from(dims.yppu) * 0.0254).round();
        extraction.push("Resolution", format!("{x}x{y} DPI"));
    }

    for chunk in &info.uncompressed_latin1_text {
        extraction.push(format!("Tech_{}", chunk.keyword), chunk.text.clone());
    }
    for chunk in &info.compressed_latin1_text {
        if let Ok(text) = chunk.get_text() {
            extraction.push(format!("Tech_{}", chunk.keyword), text);
        }
    }
    for chunk in &info.utf8_text {
        if let Ok(text) = chunk.get_text() {
            extraction.push(format!("Tech_{}", chunk.keyword), text);
        }
    }

    Ok(())
}

/// Recorre los segmentos previos a los datos de imagen (APP0 JFIF, APP14, SOF).
fn push_jpeg_segments(path: &Path, extraction: &mut Extraction) -> Result<(), String> {
    let bytes = fs::read(path).map_err(|err| format!("No se pudo leer el JPEG: {err}"))?;
    if !bytes.starts_with(&[0xFF, 0xD8]) {
        return Err("Cabecera JPEG inválida".to_string());
    }

    let mut pos = 2;
    while pos + 4 <= bytes.len() {
        if bytes[pos] != 0xFF {
            break;
        }
        let marker = bytes[pos + 1];
        match marker {
            0xFF => {
                pos += 1;
                continue;
            }
            0x01 | 0xD0..=0xD8 => {
                pos += 2;
                continue;
            }
            0xD9 | 0xDA => break,
            _ => {}
        }

        let length = usize::from(u16::from_be_bytes([bytes[pos + 2], bytes[pos + 3]]));
        if length < 2 || pos + 2 + length > bytes.len() {
            break;
        }
        let segment = &bytes[pos + 4..pos + 2 + length];

        match marker {
            0xE0 if segment.starts_with(b"JFIF\0") && segment.len() >= 12 => {
                push_jfif(segment, extraction)
            }
            0xEE if segment.starts_with(b"Adobe") && segment.len() >= 12 => {
                extraction.push("Tech_adobe", "True");
                extraction.push("Tech_adobe_transform", segment[11].to_string());
            }
            0xC2 => extraction.push("Tech_progressive", "True"),
            _ => {}
        }

        pos += 2 + length;
    }

    Ok(())
}

fn push_jfif(segment: &[u8], extraction: &mut Extraction) {
    let (major, minor, unit) = (segment[5], segment[6], segment[7]);
    let x = u16::from_be_bytes([segment[8], segment[9]]);
    let y = u16::from_be_bytes([segment[10], segment[11]]);

    extraction.push("Tech_jfif_version", format!("{major}.{minor:02}"));
    extraction.push("Tech_jfif_unit", unit.to_string());
    extraction.push("Tech_jfif_density", format!("{x}x{y}"));

    match unit {
        1 => extraction.push("Resolution", format!("{x}x{y} DPI")),
        2 => {
            let x = (f64::from(x) * 2.54).round();
            let y = (f64::from(y) * 2.54).round();
            extraction.push("Resolution", format!("{x}x{y} DPI"));
        }
        _ => {}
    }
}

fn push_tiff_tags(path: &Path, extraction: &mut Extraction) -> Result<(), String> {
    let Some(data) = tags::read_container_exif(path)? else {
        return Ok(());
    };

    if let Some(field) = data.get_field(Tag::Compression, In::PRIMARY) {
        extraction.push("Compression", tags::plain_value(field));
    }

    let inches = data
        .get_field(Tag::ResolutionUnit, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .is_none_or(|unit| unit == 2);
    if inches
        && let Some(x) = tags::primary_number(&data, Tag::XResolution)
        && let Some(y) = tags::primary_number(&data, Tag::YResolution)
    {
        extraction.push("Resolution", format!("{x}x{y} DPI"));
    }

    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

fn format_name(format: ImageFormat) -> String {
    format!("{format:?}").to_uppercase()
}

fn color_mode(color: ColorType) -> String {
    match color {
        ColorType::L8 => "L".to_string(),
        ColorType::La8 => "LA".to_string(),
        ColorType::Rgb8 => "RGB".to_string(),
        ColorType::Rgba8 => "RGBA".to_string(),
        ColorType::L16 => "I;16".to_string(),
        ColorType::La16 => "LA;16".to_string(),
        ColorType::Rgb16 => "RGB;16".to_string(),
        ColorType::Rgba16 => "RGBA;16".to_string(),
        ColorType::Rgb32F => "RGB;F".to_string(),
        ColorType::Rgba32F => "RGBA;F".to_string(),
        other => format!("{other:?}"),
    }
}

fn color_bands(color: ColorType) -> String {
    let mut bands: Vec<&str> = if color.has_color() {
        vec!["R", "G", "B"]
    } else {
        vec!["L"]
    };
    if color.has_alpha() {
        bands.push("A");
    }
    bands.join(", ")
}
