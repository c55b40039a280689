//! sheetpatch-core: in-place editing of existing xlsx packages.
//!
//! A [`Workbook`] is opened from a file or from bytes. Its worksheets keep the
//! parsed tree of their part, cell edits mutate that tree, and saving copies
//! the original package entry by entry, replacing only the parts that changed.
//!
//! ```no_run
//! use sheetpatch_core::{CellValue, Workbook};
//!
//! let mut wb = Workbook::open("report.xlsx")?;
//! let format = wb.formats().first().cloned();
//! let ws = wb.worksheet_mut("Test")?;
//! ws.update_cell(2, 1, Some(CellValue::from(9)), None)?;
//! ws.update_cell(3, 1, Some(CellValue::from("total")), format.as_ref())?;
//! ws.update_textbox("text box 1", "Updated");
//! wb.save("report-out.xlsx")?;
//! # Ok::<(), sheetpatch_core::SheetpatchError>(())
//! ```

pub mod cell;
pub mod drawing;
pub mod error;
pub mod package;
pub mod relationships;
pub mod style;
pub mod utils;
pub mod workbook;
pub mod worksheet;
pub mod xml;

pub use cell::{Cell, CellValue, DateSystem};
pub use drawing::Drawing;
pub use error::{Result, SheetpatchError};
pub use package::{CompressionLevel, OverwritePolicy, Package, PackageSource, SaveOptions};
pub use relationships::Relationship;
pub use style::CellFormat;
pub use utils::{cell_address, column_to_letter, letter_to_column, parse_address};
pub use workbook::Workbook;
pub use worksheet::{SheetEntry, Worksheet};
