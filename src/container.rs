//! ZIP container for OOXML spreadsheet packages.
//!
//! Parts are addressed by their ZIP entry name without a leading slash,
//! e.g. `xl/workbook.xml`.

use crate::error::{Error, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::Path;

/// Package-level relationships part.
const PACKAGE_RELS: &str = "_rels/.rels";

/// A relationship entry from a .rels part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID, e.g. `rId1`
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target as written in the part
    pub target: String,
    /// `TargetMode="External"`
    pub external: bool,
}

/// Relationships of one part, keyed by ID.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    pub by_id: HashMap<String, Relationship>,
}

impl Relationships {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.by_id.get(id)
    }

    /// Insert a relationship, replacing any with the same ID.
    pub fn add(&mut self, rel: Relationship) {
        self.by_id.insert(rel.id.clone(), rel);
    }

    /// First relationship whose type URI ends with `suffix`.
    pub fn find_by_type(&self, suffix: &str) -> Option<&Relationship> {
        let mut matches: Vec<&Relationship> = self
            .by_id
            .values()
            .filter(|rel| rel.rel_type.ends_with(suffix))
            .collect();
        matches.sort_by(|a, b| a.id.cmp(&b.id));
        matches.into_iter().next()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Decode the raw bytes of an XML part.
///
/// Handles UTF-8 with or without a BOM and UTF-16 in either byte order.
/// For UTF-16 input the encoding declaration is rewritten to UTF-8 so the
/// XML reader does not try to decode the text a second time.
pub fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    let utf16 = match bytes {
        [0xEF, 0xBB, 0xBF, rest @ ..] => {
            return String::from_utf8(rest.to_vec()).map_err(|e| Error::Decode(e.to_string()));
        }
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes)?,
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes)?,
        _ => match std::str::from_utf8(bytes) {
            Ok(text) => return Ok(text.to_string()),
            // ASCII markup without a BOM leaves a NUL in every other byte
            Err(_) if bytes.len() >= 4 && bytes[1] == 0 && bytes[3] == 0 => {
                decode_utf16(bytes, u16::from_le_bytes)?
            }
            Err(_) if bytes.len() >= 4 && bytes[0] == 0 && bytes[2] == 0 => {
                decode_utf16(bytes, u16::from_be_bytes)?
            }
            Err(_) => return Ok(String::from_utf8_lossy(bytes).into_owned()),
        },
    };
    Ok(declare_utf8(utf16))
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> Result<String> {
    let units = bytes.chunks_exact(2).map(|pair| to_unit([pair[0], pair[1]]));

    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::Decode(e.to_string()))
}

/// Rewrite a UTF-16 encoding declaration as UTF-8.
fn declare_utf8(content: String) -> String {
    let Some(end) = content
        .strip_prefix("<?xml")
        .and_then(|rest| rest.find("?>"))
        .map(|i| i + "<?xml".len())
    else {
        return content;
    };

    let declaration = &content[..end];
    let lower = declaration.to_ascii_lowercase();
    match lower.find("utf-16") {
        Some(start) => format!(
            "{}UTF-8{}",
            &content[..start],
            &content[start + "utf-16".len()..]
        ),
        None => content,
    }
}

/// Read access to the parts of a ZIP-based OOXML package.
pub struct OoxmlContainer {
    archive: RefCell<zip::ZipArchive<Cursor<Vec<u8>>>>,
}

impl OoxmlContainer {
    /// Open a package from a file path.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use xlpatch::container::OoxmlContainer;
    ///
    /// let container = OoxmlContainer::open("fixtures/codes.xlsx")?;
    /// assert!(container.exists("xl/workbook.xml"));
    /// # Ok::<(), xlpatch::Error>(())
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_bytes(std::fs::read(path.as_ref())?)
    }

    /// Open a package held in memory.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let archive = zip::ZipArchive::new(Cursor::new(data))?;
        Ok(Self {
            archive: RefCell::new(archive),
        })
    }

    /// Read an XML part as text.
    pub fn read_xml(&self, path: &str) -> Result<String> {
        decode_xml_bytes(&self.read_binary(path)?)
    }

    /// Read a part's raw bytes. A missing part is [`Error::MissingComponent`].
    pub fn read_binary(&self, path: &str) -> Result<Vec<u8>> {
        let mut archive = self.archive.borrow_mut();
        let mut entry = archive
            .by_name(path)
            .map_err(|_| Error::MissingComponent(path.to_string()))?;
        let mut data = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut data)?;
        Ok(data)
    }

    pub fn exists(&self, path: &str) -> bool {
        self.archive.borrow().index_for_name(path).is_some()
    }

    /// Names of every entry in the archive.
    pub fn list_files(&self) -> Vec<String> {
        self.archive
            .borrow()
            .file_names()
            .map(String::from)
            .collect()
    }

    /// Read the relationships owned by a part.
    ///
    /// An empty `part_path` means the package itself. A part without a
    /// .rels file has no relationships.
    pub fn read_relationships(&self, part_path: &str) -> Result<Relationships> {
        let rels_path = rels_path_for(part_path);
        match self.read_xml(&rels_path) {
            Ok(content) => parse_relationships(&content),
            Err(Error::MissingComponent(_)) => Ok(Relationships::new()),
            Err(e) => Err(e),
        }
    }

    /// Resolve a relationship target against the part that owns it.
    ///
    /// Absolute targets (leading `/`) are package-rooted. `..` segments
    /// never climb above the package root.
    pub fn resolve_path(base: &str, target: &str) -> String {
        if let Some(absolute) = target.strip_prefix('/') {
            return absolute.to_string();
        }

        let mut segments: Vec<&str> = match base.rsplit_once('/') {
            Some((dir, _)) => dir.split('/').filter(|s| !s.is_empty()).collect(),
            None => Vec::new(),
        };
        for segment in target.split(['/', '\\']) {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                name => segments.push(name),
            }
        }
        segments.join("/")
    }
}

/// `xl/workbook.xml` -> `xl/_rels/workbook.xml.rels`
fn rels_path_for(part_path: &str) -> String {
    let part = part_path.trim_start_matches('/');
    if part.is_empty() {
        return PACKAGE_RELS.to_string();
    }
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

fn parse_relationships(content: &str) -> Result<Relationships> {
    let mut rels = Relationships::new();
    let mut reader = quick_xml::Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            quick_xml::events::Event::Empty(e) | quick_xml::events::Event::Start(e)
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let mut rel = Relationship {
                    id: String::new(),
                    rel_type: String::new(),
                    target: String::new(),
                    external: false,
                };

                for attr in e.attributes().flatten() {
                    let value = attr
                        .unescape_value()
                        .map(|v| v.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
                    match attr.key.local_name().as_ref() {
                        b"Id" => rel.id = value,
                        b"Type" => rel.rel_type = value,
                        b"Target" => rel.target = value,
                        b"TargetMode" => rel.external = value.eq_ignore_ascii_case("external"),
                        _ => {}
                    }
                }

                if !rel.id.is_empty() {
                    rels.add(rel);
                }
            }
            quick_xml::events::Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

impl std::fmt::Debug for OoxmlContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OoxmlContainer")
            .field("entries", &self.archive.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn package(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in parts {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_resolve_path() {
        assert_eq!(
            OoxmlContainer::resolve_path("xl/workbook.xml", "worksheets/sheet1.xml"),
            "xl/worksheets/sheet1.xml"
        );
        assert_eq!(
            OoxmlContainer::resolve_path("xl/worksheets/sheet1.xml", "../sharedStrings.xml"),
            "xl/sharedStrings.xml"
        );
        assert_eq!(
            OoxmlContainer::resolve_path("xl/workbook.xml", "/xl/worksheets/sheet2.xml"),
            "xl/worksheets/sheet2.xml"
        );
        assert_eq!(OoxmlContainer::resolve_path("", "xl/workbook.xml"), "xl/workbook.xml");
        assert_eq!(OoxmlContainer::resolve_path("xl/workbook.xml", "../../a.xml"), "a.xml");
    }

    #[test]
    fn test_rels_path() {
        assert_eq!(rels_path_for(""), "_rels/.rels");
        assert_eq!(rels_path_for("/"), "_rels/.rels");
        assert_eq!(rels_path_for("xl/workbook.xml"), "xl/_rels/workbook.xml.rels");
        assert_eq!(rels_path_for("book.xml"), "_rels/book.xml.rels");
    }

    #[test]
    fn test_read_relationships() {
        let data = package(&[(
            "xl/_rels/workbook.xml.rels",
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://x/worksheet" Target="worksheets/sheet1.xml"/>
  <Relationship Id="rId9" Type="http://x/hyperlink" Target="https://example.com/?a=1&amp;b=2" TargetMode="External"/>
</Relationships>"#,
        )]);
        let container = OoxmlContainer::from_bytes(data).unwrap();
        let rels = container.read_relationships("xl/workbook.xml").unwrap();

        assert_eq!(rels.len(), 2);
        assert_eq!(rels.get("rId1").unwrap().target, "worksheets/sheet1.xml");
        assert_eq!(rels.find_by_type("worksheet").unwrap().id, "rId1");
        let link = rels.get("rId9").unwrap();
        assert!(link.external);
        assert_eq!(link.target, "https://example.com/?a=1&b=2");
        assert!(rels.get("rId2").is_none());
    }

    #[test]
    fn test_missing_rels_is_empty() {
        let data = package(&[("xl/workbook.xml", "<workbook/>")]);
        let container = OoxmlContainer::from_bytes(data).unwrap();
        assert!(container.read_relationships("xl/workbook.xml").unwrap().is_empty());
        assert!(container.read_relationships("").unwrap().is_empty());
    }

    #[test]
    fn test_missing_part() {
        let data = package(&[("xl/workbook.xml", "<workbook/>")]);
        let container = OoxmlContainer::from_bytes(data).unwrap();
        assert!(container.exists("xl/workbook.xml"));
        assert!(!container.exists("xl/sharedStrings.xml"));
        assert_eq!(container.list_files(), vec!["xl/workbook.xml"]);
        assert!(matches!(
            container.read_xml("xl/sharedStrings.xml"),
            Err(Error::MissingComponent(_))
        ));
    }

    #[test]
    fn test_not_a_zip() {
        let err = OoxmlContainer::from_bytes(b"CODE,DECODE\n".to_vec()).unwrap_err();
        assert!(err.is_decode_failure());
    }

    #[test]
    fn test_decode_xml_bytes() {
        assert_eq!(decode_xml_bytes(b"\xFF\xFE<\0a\0/\0>\0").unwrap(), "<a/>");
        assert_eq!(decode_xml_bytes(b"\xFE\xFF\0<\0a\0/\0>").unwrap(), "<a/>");
        assert_eq!(decode_xml_bytes(b"\xEF\xBB\xBF<a/>").unwrap(), "<a/>");
        assert_eq!(decode_xml_bytes(b"<a/>").unwrap(), "<a/>");
    }

    #[test]
    fn test_utf16_declaration_rewritten() {
        let xml = "<?xml version=\"1.0\" encoding=\"utf-16\"?><a/>";
        let mut bytes = vec![0xFF, 0xFE];
        for unit in xml.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(
            decode_xml_bytes(&bytes).unwrap(),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><a/>"
        );
    }
}
