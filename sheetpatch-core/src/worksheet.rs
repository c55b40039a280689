//! Worksheet parts and in-place cell editing.
//!
//! A worksheet keeps the parsed tree of its part and edits it directly, so
//! everything the crate does not understand (formulas, merged ranges,
//! conditional formats, extension lists) is written back untouched.

use std::io::{Read, Seek};

use crate::cell::{Cell, CellContent, CellValue, DateSystem};
use crate::drawing::Drawing;
use crate::error::{Result, SheetpatchError};
use crate::package::Package;
use crate::relationships::{self, rels_for_part, resolve_target};
use crate::style::CellFormat;
use crate::utils::{parse_address_bytes, parse_u32_bytes, part_number, worksheet_address};
use crate::xml::{ns, XmlDocument, XmlElement};

/// Path of the workbook part; worksheet relationship ids are resolved against its manifest.
pub const WORKBOOK_PART: &str = "xl/workbook.xml";

/// A `sheets/sheet` entry of the workbook part.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetEntry {
    pub name: String,
    pub sheet_id: u32,
    /// Relationship id, e.g. `rId1`, compared as an opaque string.
    pub r_id: String,
}

/// Bytes of a worksheet part read from the package, not yet parsed.
pub(crate) struct WorksheetSource {
    entry: SheetEntry,
    part_path: String,
    xml: Vec<u8>,
}

impl WorksheetSource {
    pub(crate) fn new(entry: SheetEntry, part_path: String, xml: Vec<u8>) -> Self {
        WorksheetSource {
            entry,
            part_path,
            xml,
        }
    }

    /// Resolve `entry` through the workbook manifest and read its part.
    pub(crate) fn read<R: Read + Seek>(package: &mut Package<R>, entry: SheetEntry) -> Result<Self> {
        let part_path = relationships::resolve_part(package, WORKBOOK_PART, &entry.r_id)?;
        let xml = package.read_part(&part_path)?;
        Ok(WorksheetSource {
            entry,
            part_path,
            xml,
        })
    }
}

/// A worksheet of an opened workbook.
#[derive(Clone, Debug)]
pub struct Worksheet {
    name: String,
    sheet_id: u32,
    r_id: String,
    part_path: String,
    sheet_number: Option<u32>,
    document: XmlDocument,
    /// Namespace of the root element; the main namespace for every query.
    main_ns: String,
    drawing: Option<Drawing>,
    date_system: DateSystem,
    dirty: bool,
}

impl Worksheet {
    /// Resolve, read and parse the worksheet named by `entry`, and the drawing
    /// it references, if any.
    pub fn load<R: Read + Seek>(
        package: &mut Package<R>,
        entry: SheetEntry,
        date_system: DateSystem,
    ) -> Result<Self> {
        let source = WorksheetSource::read(package, entry)?;
        let mut worksheet = Worksheet::from_source(source, date_system)?;
        worksheet.attach_drawing(package)?;
        Ok(worksheet)
    }

    /// Parse a worksheet part. The drawing is attached separately.
    pub(crate) fn from_source(source: WorksheetSource, date_system: DateSystem) -> Result<Self> {
        let WorksheetSource {
            entry,
            part_path,
            xml,
        } = source;

        let document = XmlDocument::parse(&part_path, &xml).map_err(|e| match e {
            SheetpatchError::Xml { part, message } => SheetpatchError::MissingPart { part, reason: message },
            other => other,
        })?;
        let main_ns = document
            .root()
            .namespace()
            .unwrap_or(ns::SPREADSHEETML)
            .to_string();
        if document.root().child(&main_ns, "sheetData").is_none() {
            return Err(SheetpatchError::missing_part(&part_path, "worksheet has no sheetData element"));
        }

        log::trace!("parsed worksheet '{}' from {}", entry.name, part_path);
        Ok(Worksheet {
            name: entry.name,
            sheet_id: entry.sheet_id,
            r_id: entry.r_id,
            sheet_number: part_number(&part_path),
            part_path,
            document,
            main_ns,
            drawing: None,
            date_system,
            dirty: false,
        })
    }

    /// Resolve the first `drawing` reference through this worksheet's own
    /// manifest and load the drawing. A worksheet without one is left as is.
    pub(crate) fn attach_drawing<R: Read + Seek>(&mut self, package: &mut Package<R>) -> Result<()> {
        let Some(rel_id) = self.drawing_rel_id() else {
            return Ok(());
        };
        let manifest = rels_for_part(&self.part_path);

        let target = relationships::resolve(package, &manifest, &rel_id).map_err(|e| match e {
            SheetpatchError::UnresolvedRelationship { manifest, id } => SheetpatchError::missing_part(
                manifest,
                format!("drawing relationship '{}' is not declared", id),
            ),
            SheetpatchError::Xml { part, message } => SheetpatchError::MissingPart { part, reason: message },
            other => other,
        })?;
        let drawing_path = resolve_target(&self.part_path, &target);
        let bytes = package.read_part(&drawing_path)?;

        log::trace!("worksheet '{}' uses drawing {}", self.name, drawing_path);
        self.drawing = Some(Drawing::parse(drawing_path, &bytes)?);
        Ok(())
    }

    fn drawing_rel_id(&self) -> Option<String> {
        self.document
            .root()
            .descendants()
            .filter(|el| el.is(&self.main_ns, "drawing"))
            .find_map(|el| el.attribute_ns(ns::OFFICE_RELATIONSHIPS, "id"))
            .map(str::to_string)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sheet_id(&self) -> u32 {
        self.sheet_id
    }

    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    /// Package path of the worksheet part, e.g. `xl/worksheets/sheet2.xml`.
    pub fn part_path(&self) -> &str {
        &self.part_path
    }

    /// Trailing number of the part file name.
    pub fn sheet_number(&self) -> Option<u32> {
        self.sheet_number
    }

    pub fn drawing(&self) -> Option<&Drawing> {
        self.drawing.as_ref()
    }

    /// Trailing number of the drawing part file name.
    pub fn drawing_sheet_number(&self) -> Option<u32> {
        self.drawing.as_ref().and_then(Drawing::drawing_number)
    }

    /// Whether any cell was changed since the worksheet was loaded.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn date_system(&self) -> DateSystem {
        self.date_system
    }

    /// Set, replace or clear the value of a cell.
    ///
    /// `None` removes the cell node; its row stays. Otherwise the row and cell
    /// are created in address order when missing, the cell's previous content
    /// is discarded and `format`, when given, is applied as its style index.
    /// On error the worksheet is unchanged.
    pub fn update_cell(
        &mut self,
        column: u32,
        row: u32,
        value: Option<CellValue>,
        format: Option<&CellFormat>,
    ) -> Result<()> {
        let address = worksheet_address(column, row)?;

        let Some(value) = value else {
            self.remove_cell(column, row);
            return Ok(());
        };
        let content = value.content(format.is_some(), self.date_system)?;

        let sheet_data = self
            .document
            .root_mut()
            .child_mut(&self.main_ns, "sheetData")
            .ok_or_else(|| SheetpatchError::missing_part(&self.part_path, "worksheet has no sheetData element"))?;
        let cell = find_or_insert_row(sheet_data, &self.main_ns, row)
            .and_then(|row_el| find_or_insert_cell(row_el, &self.main_ns, &address, column))
            .ok_or_else(|| SheetpatchError::xml(&self.part_path, "cell node could not be placed"))?;

        if let Some(format) = format {
            cell.set_attribute("s", itoa::Buffer::new().format(format.id));
        }
        cell.remove_attribute("t");
        cell.clear_children();

        match content {
            CellContent::Value { type_tag, text } => {
                if let Some(tag) = type_tag {
                    cell.set_attribute("t", tag);
                }
                let mut v = cell.new_in_same_namespace("v");
                v.set_text(text);
                cell.push_element(v);
            }
            CellContent::InlineString(text) => {
                cell.set_attribute("t", "inlineStr");
                let mut is = cell.new_in_same_namespace("is");
                let mut t = is.new_in_same_namespace("t");
                if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
                    t.set_attribute_ns("xml:space", ns::XML, "preserve");
                }
                t.set_text(text);
                is.push_element(t);
                cell.push_element(is);
            }
        }

        self.dirty = true;
        Ok(())
    }

    /// Remove the cell at `(column, row)`, keeping its row.
    pub fn clear_cell(&mut self, column: u32, row: u32) -> Result<()> {
        self.update_cell(column, row, None, None)
    }

    fn remove_cell(&mut self, column: u32, row: u32) {
        let main_ns = &self.main_ns;
        let Some(sheet_data) = self.document.root_mut().child_mut(main_ns, "sheetData") else {
            return;
        };
        let Some(row_index) = row_position(sheet_data, main_ns, row).found() else {
            log::debug!("{}: clear of row {} which does not exist", self.part_path, row);
            return;
        };
        let Some(row_el) = sheet_data.element_at_mut(row_index) else {
            return;
        };
        if let Some(cell_index) = cell_position(row_el, main_ns, column).found() {
            pin_following_cells(row_el, main_ns, cell_index, column, row);
            row_el.remove_child(cell_index);
            self.dirty = true;
        }
    }

    /// Read the cell at `(column, row)`, if a node for it exists.
    pub fn cell(&self, column: u32, row: u32) -> Result<Option<Cell>> {
        let address = worksheet_address(column, row)?;
        let Some(sheet_data) = self.sheet_data() else {
            return Ok(None);
        };
        let Some(row_index) = row_position(sheet_data, &self.main_ns, row).found() else {
            return Ok(None);
        };
        let Some(row_el) = sheet_data.at_path(&[row_index]) else {
            return Ok(None);
        };
        let Some(cell_index) = cell_position(row_el, &self.main_ns, column).found() else {
            return Ok(None);
        };
        let Some(cell) = row_el.at_path(&[cell_index]) else {
            return Ok(None);
        };

        let data_type = cell.attribute("t").map(str::to_string);
        let value = if data_type.as_deref() == Some("inlineStr") {
            cell.child(&self.main_ns, "is").map(XmlElement::text)
        } else {
            cell.child(&self.main_ns, "v").map(XmlElement::text)
        };

        Ok(Some(Cell {
            address: cell.attribute("r").map_or(address, str::to_string),
            data_type,
            style: cell.attribute("s").map(str::to_string),
            value,
        }))
    }

    /// Replace the text of the named text box in this worksheet's drawing.
    ///
    /// Returns `false` when the name is empty, there is no drawing, or the
    /// drawing has no such text box.
    pub fn update_textbox(&mut self, name: &str, text: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        match self.drawing.as_mut() {
            Some(drawing) => drawing.update_textbox(name, text),
            None => {
                log::debug!("worksheet '{}' has no drawing, text box '{}' skipped", self.name, name);
                false
            }
        }
    }

    /// Number of `row` elements in `sheetData`.
    pub fn row_count(&self) -> usize {
        self.sheet_data()
            .map_or(0, |sheet_data| {
                sheet_data.elements().filter(|el| el.is(&self.main_ns, "row")).count()
            })
    }

    /// The worksheet part as XML text: no indentation, CRLF line endings.
    pub fn serialize(&self) -> Result<String> {
        self.document.to_crlf_string()
    }

    fn sheet_data(&self) -> Option<&XmlElement> {
        self.document.root().child(&self.main_ns, "sheetData")
    }
}

/// Where a row or cell is, or where it would be inserted.
enum Position {
    Found(usize),
    InsertAt(usize),
}

impl Position {
    fn found(self) -> Option<usize> {
        match self {
            Position::Found(index) => Some(index),
            Position::InsertAt(_) => None,
        }
    }
}

/// Scan the `local` children of `parent` for the one at `target`.
///
/// `r` is optional on rows and cells; a child without it sits one past its
/// preceding sibling (the first one at 1). Children whose `r` cannot be
/// decoded are skipped.
fn position(
    parent: &XmlElement,
    main_ns: &str,
    local: &str,
    target: u32,
    decode: impl Fn(&[u8]) -> Option<u32>,
) -> Position {
    let mut previous = 0u32;
    for (index, el) in parent.indexed_elements() {
        if !el.is(main_ns, local) {
            continue;
        }
        let at = match el.attribute("r") {
            None => previous.saturating_add(1),
            Some(r) => match decode(r.as_bytes()) {
                Some(at) => at,
                None => {
                    log::warn!("<{}> with unusable reference '{}' ignored", local, r);
                    continue;
                }
            },
        };
        previous = at;
        if at == target {
            return Position::Found(index);
        }
        if at > target {
            return Position::InsertAt(index);
        }
    }
    Position::InsertAt(parent.children().len())
}

fn row_position(sheet_data: &XmlElement, main_ns: &str, row: u32) -> Position {
    position(sheet_data, main_ns, "row", row, parse_u32_bytes)
}

fn cell_position(row_el: &XmlElement, main_ns: &str, column: u32) -> Position {
    position(row_el, main_ns, "c", column, |r| {
        parse_address_bytes(r).map(|(column, _)| column)
    })
}

/// Give cells after `index` that rely on their position an explicit `r`, up to
/// the next cell that has one, so removing the cell at `index` keeps them in place.
fn pin_following_cells(row_el: &mut XmlElement, main_ns: &str, index: usize, column: u32, row: u32) {
    let mut next = column;
    let following: Vec<usize> = row_el
        .indexed_elements()
        .filter(|(i, el)| *i > index && el.is(main_ns, "c"))
        .map(|(i, _)| i)
        .collect();
    for i in following {
        let Some(cell) = row_el.element_at_mut(i) else {
            break;
        };
        if cell.attribute("r").is_some() {
            break;
        }
        next = next.saturating_add(1);
        match worksheet_address(next, row) {
            Ok(address) => cell.set_attribute("r", address),
            Err(_) => break,
        }
    }
}

fn find_or_insert_row<'a>(
    sheet_data: &'a mut XmlElement,
    main_ns: &str,
    row: u32,
) -> Option<&'a mut XmlElement> {
    let index = match row_position(sheet_data, main_ns, row) {
        Position::Found(index) => index,
        Position::InsertAt(index) => {
            let mut row_el = sheet_data.new_in_same_namespace("row");
            row_el.set_attribute("r", itoa::Buffer::new().format(row));
            sheet_data.insert_element(index, row_el);
            index
        }
    };
    let row_el = sheet_data.element_at_mut(index)?;
    if row_el.attribute("r").is_none() {
        row_el.set_attribute("r", itoa::Buffer::new().format(row));
    }
    Some(row_el)
}

fn find_or_insert_cell<'a>(
    row_el: &'a mut XmlElement,
    main_ns: &str,
    address: &str,
    column: u32,
) -> Option<&'a mut XmlElement> {
    let index = match cell_position(row_el, main_ns, column) {
        Position::Found(index) => index,
        Position::InsertAt(index) => {
            let mut cell = row_el.new_in_same_namespace("c");
            cell.set_attribute("r", address);
            row_el.insert_element(index, cell);
            index
        }
    };
    let cell = row_el.element_at_mut(index)?;
    if cell.attribute("r").is_none() {
        cell.set_attribute("r", address);
    }
    Some(cell)
}
