//! XLSX reader: decodes the first worksheet of a workbook package.

use crate::container::OoxmlContainer;
use crate::error::{Error, Result};
use std::path::Path;
use tracing::{debug, warn};

use super::cell::CellValue;
use super::cell_ref::{parse_cell_ref, MAX_COLUMN, MAX_ROW};
use super::shared_strings::SharedStrings;
use super::sheet::{Sheet, SheetRow};

const OFFICE_DOCUMENT_REL: &str = "officeDocument";
const SHARED_STRINGS_REL: &str = "sharedStrings";
const DEFAULT_WORKBOOK_PATH: &str = "xl/workbook.xml";

/// Sheet info from workbook.xml.
#[derive(Debug, Clone)]
struct SheetInfo {
    name: String,
    rel_id: String,
}

/// Reader for XLSX (Excel) workbooks.
pub struct XlsxReader {
    container: OoxmlContainer,
    workbook_path: String,
    shared_strings: SharedStrings,
    sheets: Vec<SheetInfo>,
}

impl XlsxReader {
    /// Open an XLSX file for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let container = OoxmlContainer::open(path)?;
        Self::from_container(container)
    }

    /// Create a reader from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let container = OoxmlContainer::from_bytes(data)?;
        Self::from_container(container)
    }

    fn from_container(container: OoxmlContainer) -> Result<Self> {
        let workbook_path = Self::locate_workbook(&container)?;
        let workbook_rels = container.read_relationships(&workbook_path)?;

        let shared_strings_path = workbook_rels
            .find_by_type(SHARED_STRINGS_REL)
            .map(|rel| OoxmlContainer::resolve_path(&workbook_path, &rel.target))
            .unwrap_or_else(|| "xl/sharedStrings.xml".to_string());

        let shared_strings = if container.exists(&shared_strings_path) {
            SharedStrings::parse(&container.read_xml(&shared_strings_path)?)?
        } else {
            SharedStrings::default()
        };

        let sheets = Self::parse_workbook(&container.read_xml(&workbook_path)?)?;

        debug!(
            workbook = %workbook_path,
            sheets = sheets.len(),
            shared_strings = shared_strings.len(),
            "opened workbook"
        );

        Ok(Self {
            container,
            workbook_path,
            shared_strings,
            sheets,
        })
    }

    /// Find the workbook part through the package relationships.
    fn locate_workbook(container: &OoxmlContainer) -> Result<String> {
        let package_rels = container.read_relationships("")?;
        let target = package_rels
            .find_by_type(OFFICE_DOCUMENT_REL)
            .map(|rel| OoxmlContainer::resolve_path("", &rel.target));

        match target {
            Some(path) if container.exists(&path) => Ok(path),
            _ if container.exists(DEFAULT_WORKBOOK_PATH) => Ok(DEFAULT_WORKBOOK_PATH.to_string()),
            _ => Err(Error::MissingComponent(DEFAULT_WORKBOOK_PATH.to_string())),
        }
    }

    /// Parse workbook.xml for sheet info, in tab order.
    fn parse_workbook(xml: &str) -> Result<Vec<SheetInfo>> {
        let mut sheets = Vec::new();
        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                quick_xml::events::Event::Empty(e) | quick_xml::events::Event::Start(e)
                    if e.local_name().as_ref() == b"sheet" =>
                {
                    let mut name = String::new();
                    let mut rel_id = String::new();

                    for attr in e.attributes().flatten() {
                        match attr.key.local_name().as_ref() {
                            b"name" => {
                                name = attr
                                    .unescape_value()
                                    .map(|v| v.into_owned())
                                    .unwrap_or_else(|_| {
                                        String::from_utf8_lossy(&attr.value).to_string()
                                    });
                            }
                            b"id" => {
                                rel_id = String::from_utf8_lossy(&attr.value).to_string();
                            }
                            _ => {}
                        }
                    }

                    if !name.is_empty() {
                        sheets.push(SheetInfo { name, rel_id });
                    }
                }
                quick_xml::events::Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Decode the first worksheet.
    pub fn first_sheet(&self) -> Result<Sheet> {
        let info = self
            .sheets
            .first()
            .ok_or_else(|| Error::Decode("workbook contains no worksheets".to_string()))?;

        let rels = self.container.read_relationships(&self.workbook_path)?;
        let target = rels
            .get(&info.rel_id)
            .ok_or_else(|| Error::MissingComponent(format!("relationship {}", info.rel_id)))?;
        let sheet_path = OoxmlContainer::resolve_path(&self.workbook_path, &target.target);

        let xml = self.container.read_xml(&sheet_path)?;
        let mut sheet = self.parse_sheet(&xml)?;
        sheet.name = info.name.clone();

        debug!(
            sheet = %sheet.name,
            path = %sheet_path,
            rows = sheet.rows.len(),
            "decoded worksheet"
        );

        Ok(sheet)
    }

    /// Parse a worksheet XML into a sparse sheet.
    fn parse_sheet(&self, xml: &str) -> Result<Sheet> {
        let mut sheet = Sheet::default();
        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut current_row: Option<SheetRow> = None;
        let mut last_row_index = 0u32;
        let mut last_column = 0u32;

        let mut in_cell = false;
        let mut in_value = false;
        let mut in_inline = false;
        let mut in_phonetic = false;
        let mut cell_column = 0u32;
        let mut cell_type: Option<String> = None;
        let mut cell_value = String::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                quick_xml::events::Event::Start(ref e) => match e.local_name().as_ref() {
                    b"row" => {
                        let index = row_index(e, last_row_index)?;
                        last_row_index = index;
                        last_column = 0;
                        current_row = Some(SheetRow::new(index));
                    }
                    b"c" if current_row.is_some() => {
                        let (column, t) = cell_attributes(e, last_column)?;
                        last_column = column;
                        in_cell = true;
                        cell_column = column;
                        cell_type = t;
                        cell_value.clear();
                    }
                    b"v" if in_cell => in_value = true,
                    b"is" if in_cell => in_inline = true,
                    b"rPh" if in_inline => in_phonetic = true,
                    b"t" if in_inline && !in_phonetic => in_value = true,
                    _ => {}
                },
                quick_xml::events::Event::Empty(ref e) => match e.local_name().as_ref() {
                    b"row" => {
                        last_row_index = row_index(e, last_row_index)?;
                    }
                    b"c" if current_row.is_some() => {
                        let (column, _) = cell_attributes(e, last_column)?;
                        last_column = column;
                    }
                    _ => {}
                },
                quick_xml::events::Event::Text(ref e) => {
                    if in_value {
                        let text = e.unescape().map_err(quick_xml::Error::from)?;
                        cell_value.push_str(&text);
                    }
                }
                quick_xml::events::Event::CData(ref e) => {
                    if in_value {
                        cell_value.push_str(&String::from_utf8_lossy(e));
                    }
                }
                quick_xml::events::Event::End(ref e) => match e.local_name().as_ref() {
                    b"row" => {
                        if let Some(row) = current_row.take() {
                            if !row.cells.is_empty() {
                                sheet.push_row(row);
                            }
                        }
                    }
                    b"c" if in_cell => {
                        let value = self.resolve_cell_value(&cell_value, cell_type.as_deref());
                        if value != CellValue::Empty {
                            if let Some(ref mut row) = current_row {
                                row.set(cell_column, value);
                            }
                        }
                        in_cell = false;
                        in_inline = false;
                    }
                    b"v" | b"t" => in_value = false,
                    b"rPh" => in_phonetic = false,
                    b"is" => in_inline = false,
                    _ => {}
                },
                quick_xml::events::Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(sheet)
    }

    /// Resolve a cell value based on its type.
    fn resolve_cell_value(&self, value: &str, cell_type: Option<&str>) -> CellValue {
        if cell_type == Some("s") {
            return match value.trim().parse::<usize>() {
                Ok(idx) => match self.shared_strings.get(idx) {
                    Some(s) => CellValue::from_raw(s, Some("s")),
                    None => {
                        warn!(index = idx, "shared string index out of range");
                        CellValue::Empty
                    }
                },
                Err(_) => CellValue::from_raw(value, Some("s")),
            };
        }
        CellValue::from_raw(value, cell_type)
    }

    /// Get the number of sheets.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Get sheet names in tab order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Read the `r` attribute of a row, or continue from the previous row.
///
/// Row numbers outside the worksheet grid are a decode failure.
fn row_index(e: &quick_xml::events::BytesStart<'_>, previous: u32) -> Result<u32> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"r" {
            let raw = String::from_utf8_lossy(&attr.value);
            return raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|&r| r > 0 && r <= MAX_ROW)
                .ok_or_else(|| Error::Decode(format!("invalid row index: {}", raw)));
        }
    }
    previous
        .checked_add(1)
        .filter(|&r| r <= MAX_ROW)
        .ok_or_else(|| Error::Decode(format!("row after {} is outside the worksheet", previous)))
}

/// Read the column (from `r`) and type (`t`) of a cell.
fn cell_attributes(
    e: &quick_xml::events::BytesStart<'_>,
    previous_column: u32,
) -> Result<(u32, Option<String>)> {
    let mut column = None;
    let mut cell_type = None;

    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"r" => {
                let raw = String::from_utf8_lossy(&attr.value);
                let (col, _) = parse_cell_ref(&raw)
                    .ok_or_else(|| Error::Decode(format!("invalid cell reference: {}", raw)))?;
                column = Some(col);
            }
            b"t" => cell_type = Some(String::from_utf8_lossy(&attr.value).to_string()),
            _ => {}
        }
    }

    let column = match column {
        Some(column) => column,
        None => previous_column
            .checked_add(1)
            .filter(|&c| c <= MAX_COLUMN)
            .ok_or_else(|| {
                Error::Decode(format!("cell after column {} is outside the worksheet", previous_column))
            })?,
    };
    Ok((column, cell_type))
}

impl std::fmt::Debug for XlsxReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XlsxReader")
            .field("workbook_path", &self.workbook_path)
            .field("sheets", &self.sheet_names())
            .finish()
    }
}
