//! Cell values and their SpreadsheetML encoding.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{Result, SheetpatchError};

/// Days between 1899-12-30 (the 1900 system's day zero) and the Unix epoch.
const UNIX_EPOCH_SERIAL_1900: f64 = 25569.0;
/// Days between 1904-01-01 and the Unix epoch.
const UNIX_EPOCH_SERIAL_1904: f64 = 24107.0;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// A value written into a cell.
///
/// Clearing a cell is expressed as `None` at the call site, not as a variant.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    /// Integer or floating point number.
    Number(f64),
    /// Text, stored as an inline string.
    Text(String),
    /// Date and time. Stored as a serial day count when a number format is
    /// applied, otherwise as `YYYY-MM-DD HH:MM:SS` text.
    Temporal(NaiveDateTime),
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<f32> for CellValue {
    fn from(n: f32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<u32> for CellValue {
    fn from(n: u32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

/// Booleans have no cell type here; they are stored as the text `true` / `false`.
impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Text(if b { "true" } else { "false" }.to_string())
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::Temporal(dt)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Temporal(d.and_time(chrono::NaiveTime::MIN))
    }
}

/// Which day zero the workbook counts serial dates from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DateSystem {
    /// Serial 1 is 1900-01-01 (day zero 1899-12-30 for dates after February 1900).
    #[default]
    V1900,
    /// Serial 0 is 1904-01-01 (`workbookPr date1904="1"`).
    V1904,
}

impl DateSystem {
    /// Serial day count of `dt`, with the time of day as the fractional part.
    pub fn serial(self, dt: &NaiveDateTime) -> f64 {
        let offset = match self {
            DateSystem::V1900 => UNIX_EPOCH_SERIAL_1900,
            DateSystem::V1904 => UNIX_EPOCH_SERIAL_1904,
        };
        dt.and_utc().timestamp_millis() as f64 / MILLIS_PER_DAY + offset
    }
}

/// The XML payload computed for a value, ready to be attached to a `<c>` node.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum CellContent {
    /// `<v>text</v>`, with the `t` attribute to set (if any).
    Value { type_tag: Option<&'static str>, text: String },
    /// `<is><t>text</t></is>` with `t="inlineStr"`.
    InlineString(String),
}

impl CellValue {
    /// Classify the value into the content stored in the cell.
    ///
    /// Dates become serial numbers only when a number format is applied;
    /// without one they would render as a bare float, so they are written as text.
    pub(crate) fn content(&self, formatted: bool, dates: DateSystem) -> Result<CellContent> {
        match self {
            CellValue::Number(n) => {
                if !n.is_finite() {
                    return Err(SheetpatchError::InvalidValue(format!(
                        "{} cannot be stored in a numeric cell",
                        n
                    )));
                }
                Ok(CellContent::Value {
                    type_tag: Some("n"),
                    text: format_number(*n),
                })
            }
            CellValue::Temporal(dt) if formatted => Ok(CellContent::Value {
                type_tag: None,
                text: format_number(dates.serial(dt)),
            }),
            CellValue::Temporal(dt) => Ok(CellContent::InlineString(
                dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            )),
            CellValue::Text(s) => Ok(CellContent::InlineString(s.clone())),
        }
    }
}

/// Decimal form of a finite number: integral values without a fraction, others
/// in shortest round-trip form.
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        itoa::Buffer::new().format(n as i64).to_string()
    } else {
        ryu::Buffer::new().format_finite(n).to_string()
    }
}

/// Read-only view of a cell node.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    /// Address from the `r` attribute, e.g. `"B7"`.
    pub address: String,
    /// The `t` attribute (`"n"`, `"inlineStr"`, `"s"`, ...), if present.
    pub data_type: Option<String>,
    /// The `s` attribute, if present.
    pub style: Option<String>,
    /// Text of the `<v>` node or of the inline string's `<t>` runs.
    pub value: Option<String>,
}

impl Cell {
    /// Whether the cell holds an inline string.
    pub fn is_inline_string(&self) -> bool {
        self.data_type.as_deref() == Some("inlineStr")
    }

    /// The value parsed as a number, when it is not a string cell.
    pub fn number(&self) -> Option<f64> {
        match self.data_type.as_deref() {
            None | Some("n") => self.value.as_deref()?.parse().ok(),
            _ => None,
        }
    }
}
