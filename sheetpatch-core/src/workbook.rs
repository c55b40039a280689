//! Workbook representation and package I/O.

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use rayon::prelude::*;

use crate::cell::DateSystem;
use crate::error::{Result, SheetpatchError};
use crate::package::{
    rewrite_source, rewrite_to_path, CompressionLevel, OverwritePolicy, Package, PackageSource,
    SaveOptions,
};
use crate::relationships::{find_target, parse_relationships, resolve_target, WORKBOOK_RELS};
use crate::style::{load_number_formats, CellFormat};
use crate::worksheet::{SheetEntry, Worksheet, WorksheetSource, WORKBOOK_PART};
use crate::xml::ns;

/// An opened workbook package.
pub struct Workbook {
    source: PackageSource,
    worksheets: Vec<Worksheet>,
    formats: Vec<CellFormat>,
    date_system: DateSystem,
    options: SaveOptions,
}

impl Workbook {
    /// Open the workbook stored at `path`.
    ///
    /// The archive is only held open while loading; saving reads it again.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut package = Package::open(path)?;
        Self::from_package(&mut package, PackageSource::Path(path.to_path_buf()))
    }

    /// Open a workbook from bytes (e.g., from memory or network).
    pub fn open_from_bytes(data: &[u8]) -> Result<Self> {
        let mut package = Package::from_bytes(data)?;
        Self::from_package(&mut package, PackageSource::Bytes(data.to_vec()))
    }

    fn from_package<R: Read + Seek>(package: &mut Package<R>, source: PackageSource) -> Result<Self> {
        // Phase 1: read everything needed from the archive (sequential ZIP extraction)
        let workbook_xml = package.read_part(WORKBOOK_PART)?;
        let (entries, date_system) = parse_workbook_xml(&workbook_xml)?;

        let rels_xml = package.read_part(WORKBOOK_RELS)?;
        let rels = parse_relationships(&rels_xml, WORKBOOK_RELS)?;
        let formats = load_number_formats(package)?;

        let mut sources = Vec::with_capacity(entries.len());
        for entry in entries {
            let target = find_target(&rels, WORKBOOK_RELS, &entry.r_id)?;
            let part_path = resolve_target(WORKBOOK_PART, &target);
            let xml = package.read_part(&part_path)?;
            sources.push(WorksheetSource::new(entry, part_path, xml));
        }

        // Phase 2: parse worksheet trees, in parallel when there is more than one
        let parsed: Vec<Result<Worksheet>> = if sources.len() > 1 {
            sources
                .into_par_iter()
                .map(|source| Worksheet::from_source(source, date_system))
                .collect()
        } else {
            sources
                .into_iter()
                .map(|source| Worksheet::from_source(source, date_system))
                .collect()
        };

        // Phase 3: resolve drawings, in manifest order
        let mut worksheets = Vec::with_capacity(parsed.len());
        for result in parsed {
            let mut worksheet = result?;
            worksheet.attach_drawing(package)?;
            worksheets.push(worksheet);
        }

        log::debug!(
            "opened workbook with {} worksheets and {} number formats",
            worksheets.len(),
            formats.len()
        );
        Ok(Workbook {
            source,
            worksheets,
            formats,
            date_system,
            options: SaveOptions::default(),
        })
    }

    /// Worksheets in the order the workbook declares them.
    pub fn worksheets(&self) -> &[Worksheet] {
        &self.worksheets
    }

    pub fn worksheets_mut(&mut self) -> &mut [Worksheet] {
        &mut self.worksheets
    }

    /// Sheet names in declaration order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.worksheets.iter().map(Worksheet::name).collect()
    }

    /// Get a worksheet by name.
    pub fn worksheet(&self, name: &str) -> Result<&Worksheet> {
        self.worksheets
            .iter()
            .find(|ws| ws.name() == name)
            .ok_or_else(|| SheetpatchError::WorksheetNotFound(name.to_string()))
    }

    /// Get a mutable worksheet by name.
    pub fn worksheet_mut(&mut self, name: &str) -> Result<&mut Worksheet> {
        self.worksheets
            .iter_mut()
            .find(|ws| ws.name() == name)
            .ok_or_else(|| SheetpatchError::WorksheetNotFound(name.to_string()))
    }

    /// Get a worksheet by position.
    pub fn worksheet_at(&self, index: usize) -> Result<&Worksheet> {
        self.worksheets
            .get(index)
            .ok_or_else(|| SheetpatchError::WorksheetNotFound(format!("index {}", index)))
    }

    /// Get a mutable worksheet by position.
    pub fn worksheet_at_mut(&mut self, index: usize) -> Result<&mut Worksheet> {
        self.worksheets
            .get_mut(index)
            .ok_or_else(|| SheetpatchError::WorksheetNotFound(format!("index {}", index)))
    }

    /// Custom number formats, in the order of the styles part.
    pub fn formats(&self) -> &[CellFormat] {
        &self.formats
    }

    /// The format with registry id `id` (1-based).
    pub fn format(&self, id: u32) -> Option<&CellFormat> {
        self.formats.iter().find(|f| f.id == id)
    }

    /// The first format whose code is exactly `code`.
    pub fn find_format(&self, code: &str) -> Option<&CellFormat> {
        self.formats.iter().find(|f| f.format_code == code)
    }

    pub fn date_system(&self) -> DateSystem {
        self.date_system
    }

    pub fn source(&self) -> &PackageSource {
        &self.source
    }

    /// Set compression level for replaced parts.
    pub fn set_compression(&mut self, level: CompressionLevel) {
        self.options.compression = level;
    }

    pub fn set_overwrite_policy(&mut self, policy: OverwritePolicy) {
        self.options.overwrite = policy;
    }

    pub fn save_options(&self) -> SaveOptions {
        self.options
    }

    /// Whether any worksheet or drawing was changed.
    pub fn is_dirty(&self) -> bool {
        self.worksheets
            .iter()
            .any(|ws| ws.is_dirty() || ws.drawing().is_some_and(|d| d.is_dirty()))
    }

    /// Save the workbook to a file. `destination` may be the file it was opened from.
    pub fn save(&self, destination: impl AsRef<Path>) -> Result<()> {
        self.save_with(destination, &self.options)
    }

    /// Save the workbook to a file with explicit options.
    pub fn save_with(&self, destination: impl AsRef<Path>, options: &SaveOptions) -> Result<()> {
        rewrite_to_path(&self.source, destination.as_ref(), &self.replacements()?, options)
    }

    /// Save the workbook to an in-memory byte vector.
    pub fn save_to_bytes(&self) -> Result<Vec<u8>> {
        let cursor = rewrite_source(
            &self.source,
            Cursor::new(Vec::new()),
            &self.replacements()?,
            &self.options,
        )?;
        Ok(cursor.into_inner())
    }

    /// Save the workbook to any writer that implements Write + Seek.
    pub fn save_to_writer<W: Write + Seek>(&self, writer: W) -> Result<()> {
        rewrite_source(&self.source, writer, &self.replacements()?, &self.options)?;
        Ok(())
    }

    /// Serialized content of every mutated part, keyed by package path.
    fn replacements(&self) -> Result<HashMap<String, Vec<u8>>> {
        let mut parts = HashMap::new();
        for worksheet in &self.worksheets {
            if worksheet.is_dirty() {
                parts.insert(
                    worksheet.part_path().to_string(),
                    worksheet.serialize()?.into_bytes(),
                );
            }
            if let Some(drawing) = worksheet.drawing().filter(|d| d.is_dirty()) {
                parts.insert(drawing.part_path().to_string(), drawing.serialize()?.into_bytes());
            }
        }
        Ok(parts)
    }
}

/// Parse workbook.xml into its sheet entries and date system.
fn parse_workbook_xml(xml: &[u8]) -> Result<(Vec<SheetEntry>, DateSystem)> {
    let mut reader = NsReader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut sheets = Vec::new();
    let mut date_system = DateSystem::V1900;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"sheet" => {
                    if let Some(entry) = parse_sheet_element(&reader, &e)? {
                        sheets.push(entry);
                    }
                }
                b"workbookPr" => {
                    if let Some(value) = attr_value(&e, b"date1904")? {
                        if value == "1" || value.eq_ignore_ascii_case("true") {
                            date_system = DateSystem::V1904;
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SheetpatchError::missing_part(
                    WORKBOOK_PART,
                    format!("{} at position {}", e, reader.error_position()),
                ));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok((sheets, date_system))
}

fn parse_sheet_element(reader: &NsReader<&[u8]>, e: &BytesStart<'_>) -> Result<Option<SheetEntry>> {
    let mut name = None;
    let mut sheet_id = None;
    let mut r_id = None;

    for attr in e.attributes() {
        let attr = attr.map_err(|err| SheetpatchError::missing_part(WORKBOOK_PART, err))?;
        let value = attr
            .unescape_value()
            .map_err(|err| SheetpatchError::missing_part(WORKBOOK_PART, err))?;
        let (resolved, local) = reader.resolve_attribute(attr.key);
        match (resolved, local.as_ref()) {
            (ResolveResult::Unbound, b"name") => name = Some(value.into_owned()),
            (ResolveResult::Unbound, b"sheetId") => sheet_id = value.parse::<u32>().ok(),
            // r:id under whatever prefix maps to the relationships namespace
            (ResolveResult::Bound(Namespace(uri)), b"id")
                if uri == ns::OFFICE_RELATIONSHIPS.as_bytes() =>
            {
                r_id = Some(value.into_owned())
            }
            _ => {}
        }
    }

    match (name, sheet_id, r_id) {
        (Some(name), Some(sheet_id), Some(r_id)) => Ok(Some(SheetEntry { name, sheet_id, r_id })),
        (name, _, _) => {
            log::warn!(
                "{}: skipping sheet '{}' without sheetId or r:id",
                WORKBOOK_PART,
                name.unwrap_or_default()
            );
            Ok(None)
        }
    }
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| SheetpatchError::missing_part(WORKBOOK_PART, err))?;
        if attr.key.as_ref() == key {
            let value = attr
                .unescape_value()
                .map_err(|err| SheetpatchError::missing_part(WORKBOOK_PART, err))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}
