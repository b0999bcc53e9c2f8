#![allow(dead_code)]

use exif::experimental::Writer;
use exif::{Field, In, Tag, Value};
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};
use lopdf::{Document, Object, Stream, dictionary};
use rust_xlsxwriter::{DocProperties, Workbook};
use std::fs::File;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// PDF de una página con las entradas indicadas en el diccionario Info.
pub fn write_pdf(path: &Path, info: &[(&str, &str)]) -> TestResult {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let content_id = doc.add_object(Stream::new(dictionary! {}, b"BT ET".to_vec()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    if !info.is_empty() {
        let mut dict = lopdf::Dictionary::new();
        for (key, value) in info {
            dict.set(*key, Object::string_literal(*value));
        }
        let info_id = doc.add_object(dict);
        doc.trailer.set("Info", info_id);
    }

    doc.save(path)?;
    Ok(())
}

pub fn write_docx(path: &Path, creator: &str, company: &str) -> TestResult {
    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
    <Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
    <Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>
    <Override PartName="/docProps/custom.xml" ContentType="application/vnd.openxmlformats-officedocument.custom-properties+xml"/>
</Types>
"#;

    const DOCUMENT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
    <w:body>
        <w:p><w:r><w:t>Documento de prueba</w:t></w:r></w:p>
    </w:body>
</w:document>
"#;

    const CUSTOM_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/custom-properties"
            xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">
    <property fmtid="{D5CDD505-2E9C-101B-9397-08002B2CF9AE}" pid="2" name="Proyecto">
        <vt:lpwstr>Dato Confidencial</vt:lpwstr>
    </property>
</Properties>
"#;

    let core_xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties"
                   xmlns:dc="http://purl.org/dc/elements/1.1/"
                   xmlns:dcterms="http://purl.org/dc/terms/"
                   xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
    <dc:creator>{creator}</dc:creator>
    <cp:lastModifiedBy>Editor Prueba</cp:lastModifiedBy>
    <dcterms:created xsi:type="dcterms:W3CDTF">2024-01-01T00:00:00Z</dcterms:created>
    <dcterms:modified xsi:type="dcterms:W3CDTF">2024-02-01T00:00:00Z</dcterms:modified>
    <dc:title>Documento Demo</dc:title>
    <dc:subject></dc:subject>
    <cp:revision>6</cp:revision>
</cp:coreProperties>
"#
    );

    let app_xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"
            xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">
    <Application>Microsoft Office Word</Application>
    <AppVersion>16.0000</AppVersion>
    <Company>{company}</Company>
    <Template>Normal.dotm</Template>
</Properties>
"#
    );

    let file = File::create(path)?;
    let mut writer = ZipWriter::new(file);
    let options = FileOptions::<'_, ()>::default().compression_method(CompressionMethod::Stored);

    for (name, contents) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("word/document.xml", DOCUMENT_XML),
        ("docProps/core.xml", core_xml.as_str()),
        ("docProps/app.xml", app_xml.as_str()),
        ("docProps/custom.xml", CUSTOM_XML),
    ] {
        writer.start_file(name, options)?;
        writer.write_all(contents.as_bytes())?;
    }

    writer.finish()?;
    Ok(())
}

pub fn write_xlsx(path: &Path, author: &str, sheets: &[&str]) -> TestResult {
    let mut workbook = Workbook::new();
    let properties = DocProperties::new().set_author(author);
    workbook.set_properties(&properties);

    for name in sheets {
        workbook.add_worksheet().set_name(*name)?;
    }

    workbook.save(path)?;
    Ok(())
}

/// JPEG de 8x8 con un segmento APP1 que contiene Orientation y Artist.
pub fn write_jpeg_with_exif(path: &Path, orientation: u16, artist: &str) -> TestResult {
    let image = RgbImage::from_pixel(8, 8, Rgb([200, 30, 30]));
    let mut jpeg = Vec::new();
    JpegEncoder::new(&mut jpeg).encode_image(&image)?;

    let orientation = Field {
        tag: Tag::Orientation,
        ifd_num: In::PRIMARY,
        value: Value::Short(vec![orientation]),
    };
    let artist = Field {
        tag: Tag::Artist,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![artist.as_bytes().to_vec()]),
    };
    let mut writer = Writer::new();
    writer.push_field(&orientation);
    writer.push_field(&artist);
    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, false)?;
    let tiff = tiff.into_inner();

    let segment_len = u16::try_from(2 + 6 + tiff.len())?;
    let mut output = Vec::with_capacity(jpeg.len() + tiff.len() + 10);
    output.extend_from_slice(&jpeg[..2]);
    output.extend_from_slice(&[0xFF, 0xE1]);
    output.extend_from_slice(&segment_len.to_be_bytes());
    output.extend_from_slice(b"Exif\0\0");
    output.extend_from_slice(&tiff);
    output.extend_from_slice(&jpeg[2..]);

    std::fs::write(path, output)?;
    Ok(())
}

pub fn write_png(path: &Path) -> TestResult {
    RgbImage::from_pixel(4, 3, Rgb([10, 120, 240])).save(path)?;
    Ok(())
}

pub fn value_of<'a>(records: &'a [filelens::MetadataRecord], key: &str) -> Option<&'a str> {
    records
        .iter()
        .find(|record| record.key == key)
        .map(|record| record.value.as_str())
}
