//! Custom number formats declared in `xl/styles.xml`.
//!
//! Only the `numFmts` table is read. Built-in formats (ids below 164) are not
//! listed there and so never appear in the registry.

use std::io::{Read, Seek};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Result, SheetpatchError};
use crate::package::Package;

/// Path of the styles part.
pub const STYLES_PART: &str = "xl/styles.xml";

/// A custom number format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellFormat {
    /// 1-based position in the `numFmts` table. This is the value written to a
    /// cell's `s` attribute when the format is applied.
    pub id: u32,
    /// The format string, e.g. `[$-F400]h:mm:ss\ AM/PM`.
    pub format_code: String,
    /// `numFmtId` as declared in the styles part.
    pub num_fmt_id: u32,
}

/// Parse the `numFmts/numFmt` entries of a styles part, in document order.
pub fn parse_number_formats(xml: &[u8]) -> Result<Vec<CellFormat>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut formats = Vec::new();
    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut num_fmts_depth: Option<usize> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                depth += 1;
                match e.local_name().as_ref() {
                    b"numFmts" if depth == 2 => num_fmts_depth = Some(depth),
                    b"numFmt" if num_fmts_depth == Some(depth - 1) => {
                        push_format(&mut formats, &e)?;
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"numFmt" && num_fmts_depth == Some(depth) {
                    push_format(&mut formats, &e)?;
                }
            }
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"numFmts" && num_fmts_depth == Some(depth) {
                    num_fmts_depth = None;
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SheetpatchError::missing_part(
                    STYLES_PART,
                    format!("{} at position {}", e, reader.error_position()),
                ));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(formats)
}

fn push_format(formats: &mut Vec<CellFormat>, e: &BytesStart<'_>) -> Result<()> {
    let mut num_fmt_id = 0;
    let mut format_code = String::new();

    for attr in e.attributes() {
        let attr = attr.map_err(|err| SheetpatchError::missing_part(STYLES_PART, err))?;
        match attr.key.as_ref() {
            b"numFmtId" => {
                num_fmt_id = String::from_utf8_lossy(&attr.value).parse().unwrap_or(0);
            }
            b"formatCode" => {
                format_code = attr
                    .unescape_value()
                    .map_err(|err| SheetpatchError::missing_part(STYLES_PART, err))?
                    .into_owned();
            }
            _ => {}
        }
    }

    formats.push(CellFormat {
        id: formats.len() as u32 + 1,
        format_code,
        num_fmt_id,
    });
    Ok(())
}

/// Read and parse the styles part. A package without one is rejected.
pub fn load_number_formats<R: Read + Seek>(package: &mut Package<R>) -> Result<Vec<CellFormat>> {
    let xml = package.read_part(STYLES_PART)?;
    let formats = parse_number_formats(&xml)?;
    log::trace!("{}: {} custom number formats", STYLES_PART, formats.len());
    Ok(formats)
}
