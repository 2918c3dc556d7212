//! Writes a single-sheet XLSX package from a `Sheet`.
//!
//! Text is written as inline strings (`t="inlineStr"`) so no shared
//! string table has to be built.

use crate::error::{Error, Result};
use std::io::{Cursor, Write};
use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use super::cell::CellValue;
use super::cell_ref::{cell_ref, col_to_letter};
use super::sheet::{Sheet, SheetRow};

const SPREADSHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Maximum sheet-name length Excel accepts.
const MAX_SHEET_NAME: usize = 31;

/// Writer for fresh XLSX packages.
#[derive(Debug, Clone)]
pub struct XlsxWriter {
    creator: String,
    compression: zip::CompressionMethod,
}

impl Default for XlsxWriter {
    fn default() -> Self {
        Self {
            creator: "xlpatch".to_string(),
            compression: zip::CompressionMethod::Deflated,
        }
    }
}

impl XlsxWriter {
    /// Create a writer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the author recorded in `docProps/core.xml`.
    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = creator.into();
        self
    }

    /// Set the ZIP compression method.
    pub fn with_compression(mut self, compression: zip::CompressionMethod) -> Self {
        self.compression = compression;
        self
    }

    /// Serialize `sheet` into XLSX bytes.
    pub fn write(&self, sheet: &Sheet) -> Result<Vec<u8>> {
        let sheet_name = sanitize_sheet_name(&sheet.name);
        let parts = [
            ("[Content_Types].xml", content_types_xml()),
            ("_rels/.rels", package_rels_xml()),
            ("docProps/app.xml", app_xml()),
            ("docProps/core.xml", core_xml(&self.creator)),
            ("xl/workbook.xml", workbook_xml(&sheet_name)),
            ("xl/_rels/workbook.xml.rels", workbook_rels_xml()),
            ("xl/styles.xml", styles_xml()),
            ("xl/worksheets/sheet1.xml", worksheet_xml(sheet)),
        ];

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(self.compression);

        for (name, body) in &parts {
            writer
                .start_file(*name, options)
                .map_err(|e| Error::Encode(format!("{}: {}", name, e)))?;
            writer
                .write_all(body.as_bytes())
                .map_err(|e| Error::Encode(format!("{}: {}", name, e)))?;
        }

        let cursor = writer
            .finish()
            .map_err(|e| Error::Encode(e.to_string()))?;
        let bytes = cursor.into_inner();

        debug!(
            sheet = %sheet_name,
            rows = sheet.rows.len(),
            bytes = bytes.len(),
            "encoded workbook"
        );

        Ok(bytes)
    }
}

/// Make a sheet name acceptable to Excel.
fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c => c,
        })
        .take(MAX_SHEET_NAME)
        .collect();
    let cleaned = cleaned.trim_matches('\'');

    if cleaned.trim().is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Escape text content, dropping characters XML 1.0 cannot carry.
fn xml_text(s: &str) -> String {
    let legal: String = s
        .chars()
        .filter(|&c| matches!(c, '\t' | '\n' | '\r') || c >= '\u{20}')
        .collect();
    if legal.len() != s.len() {
        warn!("dropped control characters from cell text");
    }
    quick_xml::escape::escape(legal.as_str()).into_owned()
}

fn worksheet_xml(sheet: &Sheet) -> String {
    let mut out = String::with_capacity(1024 + sheet.rows.len() * 128);
    out.push_str(XML_DECLARATION);
    out.push('\n');
    out.push_str(&format!(
        r#"<worksheet xmlns="{}" xmlns:r="{}">"#,
        SPREADSHEET_NS, RELATIONSHIPS_NS
    ));

    let max_row = sheet.last_row_index();
    let max_col = sheet.max_column();
    if max_row > 0 && max_col > 0 {
        out.push_str(&format!(
            r#"<dimension ref="A1:{}{}"/>"#,
            col_to_letter(max_col),
            max_row
        ));
    } else {
        out.push_str(r#"<dimension ref="A1"/>"#);
    }

    out.push_str("<sheetData>");
    for row in &sheet.rows {
        write_row(&mut out, row);
    }
    out.push_str("</sheetData></worksheet>");
    out
}

fn write_row(out: &mut String, row: &SheetRow) {
    out.push_str(&format!(r#"<row r="{}">"#, row.index));
    for cell in &row.cells {
        let reference = cell_ref(cell.column, row.index);
        match &cell.value {
            CellValue::Empty => {}
            CellValue::Text(s) if s.is_empty() => {}
            CellValue::Text(s) => {
                let space = if s.trim() != s.as_str() {
                    r#" xml:space="preserve""#
                } else {
                    ""
                };
                out.push_str(&format!(
                    r#"<c r="{}" t="inlineStr"><is><t{}>{}</t></is></c>"#,
                    reference,
                    space,
                    xml_text(s)
                ));
            }
            CellValue::Number(n) => {
                out.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, xml_text(n)));
            }
            CellValue::Bool(b) => {
                out.push_str(&format!(
                    r#"<c r="{}" t="b"><v>{}</v></c>"#,
                    reference,
                    if *b { 1 } else { 0 }
                ));
            }
            CellValue::Error(code) => {
                out.push_str(&format!(
                    r#"<c r="{}" t="e"><v>{}</v></c>"#,
                    reference,
                    xml_text(code)
                ));
            }
        }
    }
    out.push_str("</row>");
}

fn content_types_xml() -> String {
    format!(
        r#"{}
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/><Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/></Types>"#,
        XML_DECLARATION
    )
}

fn package_rels_xml() -> String {
    format!(
        r#"{}
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/></Relationships>"#,
        XML_DECLARATION
    )
}

fn app_xml() -> String {
    format!(
        r#"{}
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>xlpatch</Application></Properties>"#,
        XML_DECLARATION
    )
}

fn core_xml(creator: &str) -> String {
    format!(
        r#"{}
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:creator>{}</dc:creator></cp:coreProperties>"#,
        XML_DECLARATION,
        xml_text(creator)
    )
}

fn workbook_xml(sheet_name: &str) -> String {
    format!(
        r#"{}
<workbook xmlns="{}" xmlns:r="{}"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        XML_DECLARATION,
        SPREADSHEET_NS,
        RELATIONSHIPS_NS,
        xml_text(sheet_name)
    )
}

fn workbook_rels_xml() -> String {
    format!(
        r#"{}
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#,
        XML_DECLARATION
    )
}

fn styles_xml() -> String {
    format!(
        r#"{}
<styleSheet xmlns="{}"><fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#,
        XML_DECLARATION, SPREADSHEET_NS
    )
}
