//! XLSX workbook codec.
//!
//! Reading covers exactly what a bulk-upload fixture needs: the first
//! worksheet, every cell normalized to a [`CellValue`]. Writing produces
//! a fresh single-sheet package.
//!
//! # Example
//!
//! ```no_run
//! use xlpatch::xlsx::{XlsxReader, XlsxWriter};
//!
//! let reader = XlsxReader::open("fixtures/codes.xlsx")?;
//! let sheet = reader.first_sheet()?;
//! println!("{}: {} rows", sheet.name, sheet.rows.len());
//!
//! let bytes = XlsxWriter::new().write(&sheet)?;
//! std::fs::write("copy.xlsx", bytes)?;
//! # Ok::<(), xlpatch::Error>(())
//! ```

mod cell;
pub mod cell_ref;
mod reader;
mod shared_strings;
mod sheet;
mod writer;

pub use cell::CellValue;
pub use reader::XlsxReader;
pub use shared_strings::SharedStrings;
pub use sheet::{Sheet, SheetCell, SheetRow};
pub use writer::XlsxWriter;
