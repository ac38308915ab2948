//! Minimal .docx writer.
//!
//! A .docx file is a zip archive of WordprocessingML parts. This writer
//! emits the smallest package Word and LibreOffice both accept: content
//! types, package relationships, a styles part defining Heading1, and the
//! document body. Markdown from the payload goes in as plain paragraphs,
//! one per input line, with no rich-text conversion.

use std::fs;
use std::io::Write;
use std::path::Path;

use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Errors from document writing.
#[derive(Debug, Error)]
pub enum DocxError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
</Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
<w:style w:type="paragraph" w:styleId="Heading1">
<w:name w:val="heading 1"/>
<w:basedOn w:val="Normal"/>
<w:pPr><w:spacing w:before="240" w:after="120"/><w:outlineLvl w:val="0"/></w:pPr>
<w:rPr><w:b/><w:sz w:val="32"/><w:szCs w:val="32"/></w:rPr>
</w:style>
</w:styles>"#;

/// Write one document: heading, generation timestamp, optional source line,
/// a blank separator, then the body as one paragraph per line.
///
/// Creates missing parent directories and silently overwrites an existing
/// file at `path`.
pub fn write_docx(
    path: &Path,
    title: &str,
    body: &str,
    source: Option<&str>,
) -> Result<(), DocxError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let document = build_document_xml(title, body, source, &stamp);

    let file = fs::File::create(path)?;
    let mut archive = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    archive.start_file("[Content_Types].xml", options)?;
    archive.write_all(CONTENT_TYPES_XML.as_bytes())?;
    archive.start_file("_rels/.rels", options)?;
    archive.write_all(PACKAGE_RELS_XML.as_bytes())?;
    archive.start_file("word/_rels/document.xml.rels", options)?;
    archive.write_all(DOCUMENT_RELS_XML.as_bytes())?;
    archive.start_file("word/styles.xml", options)?;
    archive.write_all(STYLES_XML.as_bytes())?;
    archive.start_file("word/document.xml", options)?;
    archive.write_all(document.as_bytes())?;
    archive.finish()?;

    Ok(())
}

/// Assemble `word/document.xml`. Pure, so structure checks need no unzip.
fn build_document_xml(title: &str, body: &str, source: Option<&str>, stamp: &str) -> String {
    let mut xml = String::with_capacity(1024 + body.len() * 2);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
    );

    push_heading(&mut xml, title);
    push_paragraph(&mut xml, &format!("Generated: {stamp}"));
    if let Some(source) = source {
        if !source.is_empty() {
            push_paragraph(&mut xml, &format!("Source: {source}"));
        }
    }
    push_paragraph(&mut xml, "");
    for line in body.lines() {
        push_paragraph(&mut xml, line);
    }

    xml.push_str("</w:body></w:document>");
    xml
}

fn push_heading(xml: &mut String, text: &str) {
    xml.push_str(
        r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t xml:space="preserve">"#,
    );
    xml.push_str(&escape_xml(text));
    xml.push_str("</w:t></w:r></w:p>");
}

fn push_paragraph(xml: &mut String, text: &str) {
    if text.is_empty() {
        xml.push_str("<w:p/>");
        return;
    }
    xml.push_str(r#"<w:p><w:r><w:t xml:space="preserve">"#);
    xml.push_str(&escape_xml(text));
    xml.push_str("</w:t></w:r></w:p>");
}

/// Escape for an XML text node. Control characters XML 1.0 forbids are
/// dropped; tab is the only one it allows that survives line splitting.
fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\t' => out.push(c),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}
