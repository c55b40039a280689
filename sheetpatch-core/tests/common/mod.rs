//! In-memory xlsx fixtures shared by the integration tests.
#![allow(dead_code)]

use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/worksheets/sheet2.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/drawings/drawing1.xml" ContentType="application/vnd.openxmlformats-officedocument.drawing+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/><Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/></Types>"#;

pub const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

pub const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><workbookPr defaultThemeVersion="124226"/><bookViews><workbookView xWindow="240" yWindow="15" windowWidth="16095" windowHeight="9660"/></bookViews><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/><sheet name="Test" sheetId="2" r:id="rId2"/></sheets><calcPr calcId="145621"/></workbook>"#;

pub const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet2.xml"/><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

pub const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><numFmts count="3"><numFmt numFmtId="164" formatCode="[$-F400]h:mm:ss\ AM/PM"/><numFmt numFmtId="165" formatCode="yyyy\-mm\-dd;@"/><numFmt numFmtId="166" formatCode="&quot;$&quot;#,##0.00"/></numFmts><fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="4"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="164" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/><xf numFmtId="165" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/><xf numFmtId="166" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/></cellXfs></styleSheet>"#;

pub const SHARED_STRINGS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="2" uniqueCount="2"><si><t>Item</t></si><si><t>Amount</t></si></sst>"#;

/// First sheet: a header row and a text box drawing.
pub const SHEET1: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><dimension ref="A1:B1"/><sheetViews><sheetView tabSelected="1" workbookViewId="0"/></sheetViews><sheetFormatPr defaultRowHeight="15"/><sheetData><row r="1" spans="1:2"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row></sheetData><pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/><drawing r:id="rId1"/></worksheet>"#;

pub const SHEET1_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/drawing" Target="../drawings/drawing1.xml"/></Relationships>"#;

pub const DRAWING1: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<xdr:wsDr xmlns:xdr="http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><xdr:twoCellAnchor><xdr:from><xdr:col>3</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>2</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:from><xdr:to><xdr:col>6</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>6</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:to><xdr:sp macro="" textlink=""><xdr:nvSpPr><xdr:cNvPr id="2" name="text box 1"/><xdr:cNvSpPr txBox="1"/></xdr:nvSpPr><xdr:spPr><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></xdr:spPr><xdr:txBody><a:bodyPr vertOverflow="clip" wrap="square" rtlCol="0"/><a:lstStyle/><a:p><a:r><a:rPr lang="en-GB" sz="1100"/><a:t>Placeholder text</a:t></a:r></a:p></xdr:txBody></xdr:sp><xdr:clientData/></xdr:twoCellAnchor></xdr:wsDr>"#;

/// Second sheet ("Test"): eight rows of mixed content.
pub const SHEET2: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><dimension ref="A1:C8"/><sheetData><row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row><row r="2"><c r="A2" t="inlineStr"><is><t>alpha</t></is></c><c r="B2"><v>10</v></c></row><row r="3"><c r="A3" t="inlineStr"><is><t>beta</t></is></c><c r="B3"><v>20.5</v></c></row><row r="4"><c r="A4" t="inlineStr"><is><t>gamma</t></is></c><c r="B4"><v>30</v></c></row><row r="5"><c r="A5" t="inlineStr"><is><t>delta</t></is></c><c r="B5" s="3"><v>40</v></c></row><row r="6"><c r="A6" t="inlineStr"><is><t>epsilon</t></is></c><c r="B6"><v>50</v></c></row><row r="7"><c r="B7"><f>SUM(B2:B6)</f><v>150.5</v></c></row><row r="8"><c r="C8" s="1"><v>0.5</v></c></row></sheetData><mergeCells count="1"><mergeCell ref="A7:A8"/></mergeCells><pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/></worksheet>"#;

/// Bytes of a tiny binary part that must survive every save untouched.
pub const IMAGE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0x0d, 1, 2, 3, 4];

/// A package part: name, content and compression method.
#[derive(Clone, Debug)]
pub struct Part {
    pub name: String,
    pub content: Vec<u8>,
    pub method: CompressionMethod,
}

impl Part {
    pub fn new(name: &str, content: impl AsRef<[u8]>) -> Self {
        Part {
            name: name.to_string(),
            content: content.as_ref().to_vec(),
            method: CompressionMethod::Deflated,
        }
    }

    pub fn stored(mut self) -> Self {
        self.method = CompressionMethod::Stored;
        self
    }
}

/// Parts of the standard fixture workbook: two worksheets (the last one
/// named "Test" with eight rows), three custom number formats and a drawing
/// with a text box named "text box 1" on the first sheet.
pub fn standard_parts() -> Vec<Part> {
    vec![
        Part::new("[Content_Types].xml", CONTENT_TYPES),
        Part::new("_rels/.rels", ROOT_RELS),
        Part::new("xl/workbook.xml", WORKBOOK),
        Part::new("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
        Part::new("xl/styles.xml", STYLES),
        Part::new("xl/sharedStrings.xml", SHARED_STRINGS).stored(),
        Part::new("xl/worksheets/sheet1.xml", SHEET1),
        Part::new("xl/worksheets/_rels/sheet1.xml.rels", SHEET1_RELS),
        Part::new("xl/drawings/drawing1.xml", DRAWING1),
        Part::new("xl/worksheets/sheet2.xml", SHEET2),
        Part::new("xl/media/image1.png", IMAGE).stored(),
    ]
}

/// Zip `parts` in order.
pub fn build_package(parts: &[Part]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for part in parts {
        let options = SimpleFileOptions::default().compression_method(part.method);
        zip.start_file(part.name.as_str(), options).unwrap();
        zip.write_all(&part.content).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

pub fn standard_package() -> Vec<u8> {
    build_package(&standard_parts())
}

/// Standard parts with `name` replaced by `content`.
pub fn with_part(name: &str, content: &str) -> Vec<Part> {
    let mut parts = standard_parts();
    let part = parts.iter_mut().find(|p| p.name == name).unwrap();
    part.content = content.as_bytes().to_vec();
    parts
}

/// Standard parts without `name`.
pub fn without_part(name: &str) -> Vec<Part> {
    standard_parts().into_iter().filter(|p| p.name != name).collect()
}

/// Decompressed content of one entry.
pub fn read_entry(package: &[u8], name: &str) -> Vec<u8> {
    let mut archive = ZipArchive::new(Cursor::new(package)).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut buf = Vec::new();
    file.read_to_end(&mut buf).unwrap();
    buf
}

pub fn read_entry_string(package: &[u8], name: &str) -> String {
    String::from_utf8(read_entry(package, name)).unwrap()
}

/// Entry names in archive order.
pub fn entry_names(package: &[u8]) -> Vec<String> {
    let archive = ZipArchive::new(Cursor::new(package)).unwrap();
    archive.file_names().map(str::to_string).collect()
}

/// Stored (still compressed) bytes of an entry plus its CRC and method.
pub fn raw_entry(package: &[u8], name: &str) -> (Vec<u8>, u32, CompressionMethod) {
    let mut archive = ZipArchive::new(Cursor::new(package)).unwrap();
    let index = archive.index_for_name(name).unwrap();
    let mut file = archive.by_index_raw(index).unwrap();
    let crc = file.crc32();
    let method = file.compression();
    let mut buf = Vec::new();
    file.read_to_end(&mut buf).unwrap();
    (buf, crc, method)
}
