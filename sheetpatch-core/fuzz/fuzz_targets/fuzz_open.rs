#![no_main]

//! Fuzz target for opening and re-saving packages.
//!
//! Arbitrary bytes are tried as a whole archive, and as the worksheet part of
//! an otherwise valid package. Neither may panic. When only the worksheet is
//! arbitrary, a package that opens must also save and open again.

use std::io::{Cursor, Write};

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sheetpatch_core::{CellValue, Workbook};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"/>"#;

#[derive(Arbitrary, Debug)]
struct OpenInput {
    archive: Vec<u8>,
    sheet: Vec<u8>,
    column: u16,
    row: u16,
    value: f64,
}

fn package_with_sheet(sheet: &[u8]) -> Option<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, content) in [
        ("xl/workbook.xml", WORKBOOK.as_bytes()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.as_bytes()),
        ("xl/styles.xml", STYLES.as_bytes()),
        ("xl/worksheets/sheet1.xml", sheet),
    ] {
        zip.start_file(name, options).ok()?;
        zip.write_all(content).ok()?;
    }
    Some(zip.finish().ok()?.into_inner())
}

fn open_edit_save(bytes: &[u8], column: u32, row: u32, value: f64, strict: bool) {
    let Ok(mut wb) = Workbook::open_from_bytes(bytes) else {
        return;
    };
    if let Ok(ws) = wb.worksheet_at_mut(0) {
        let _ = ws.update_cell(column, row, Some(CellValue::Number(value)), None);
        let _ = ws.row_count();
    }
    match wb.save_to_bytes() {
        Ok(saved) if strict => {
            Workbook::open_from_bytes(&saved).expect("saved workbook must open");
        }
        Ok(_) => {}
        Err(e) => assert!(!strict, "opened workbook failed to save: {}", e),
    }
}

fuzz_target!(|input: OpenInput| {
    let column = u32::from(input.column);
    let row = u32::from(input.row);
    open_edit_save(&input.archive, column, row, input.value, false);
    if let Some(bytes) = package_with_sheet(&input.sheet) {
        open_edit_save(&bytes, column, row, input.value, true);
    }
});
