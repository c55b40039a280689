//! Worksheet drawings and the text of their shapes.

use crate::error::{Result, SheetpatchError};
use crate::utils::part_number;
use crate::xml::{ns, XmlDocument, XmlElement};

/// Path from a shape to the first run of its text body.
const TEXT_RUN_PATH: [(&str, &str); 4] = [
    (ns::SPREADSHEET_DRAWING, "txBody"),
    (ns::DRAWINGML, "p"),
    (ns::DRAWINGML, "r"),
    (ns::DRAWINGML, "t"),
];

/// A parsed drawing part (`xl/drawings/drawingN.xml`).
#[derive(Clone, Debug)]
pub struct Drawing {
    part_path: String,
    drawing_number: Option<u32>,
    document: XmlDocument,
    dirty: bool,
}

impl Drawing {
    /// Parse a drawing part. Unparseable content is reported as a missing part.
    pub fn parse(part_path: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let part_path = part_path.into();
        let document = XmlDocument::parse(&part_path, bytes).map_err(|e| match e {
            SheetpatchError::Xml { part, message } => SheetpatchError::MissingPart { part, reason: message },
            other => other,
        })?;
        Ok(Drawing {
            drawing_number: part_number(&part_path),
            part_path,
            document,
            dirty: false,
        })
    }

    pub fn part_path(&self) -> &str {
        &self.part_path
    }

    /// Trailing number of the part file name (`drawing3.xml` -> 3).
    pub fn drawing_number(&self) -> Option<u32> {
        self.drawing_number
    }

    pub fn document(&self) -> &XmlDocument {
        &self.document
    }

    /// Whether a text box was edited since the drawing was loaded.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Names of all shapes (`xdr:cNvPr/@name`) in document order.
    pub fn shape_names(&self) -> Vec<&str> {
        self.document
            .root()
            .descendants()
            .filter(|el| el.is(ns::SPREADSHEET_DRAWING, "cNvPr"))
            .filter_map(|el| el.attribute("name"))
            .collect()
    }

    /// Text of the first run in the named text box.
    pub fn textbox_text(&self, name: &str) -> Option<String> {
        let (shape_path, run_path) = self.shape_path(name)?;
        let shape = self.document.root().at_path(&shape_path)?;
        Some(shape.at_path(&run_path?)?.text())
    }

    /// Replace the text of the first run in the shape whose `cNvPr` is named
    /// `name`. Only the first shape with that name is considered.
    ///
    /// Returns whether a run was updated.
    pub fn update_textbox(&mut self, name: &str, text: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        let Some((shape_path, run_path)) = self.shape_path(name) else {
            log::debug!("{}: no text box named '{}'", self.part_path, name);
            return false;
        };
        let Some(run_path) = run_path else {
            log::debug!("{}: shape '{}' has no text run", self.part_path, name);
            return false;
        };

        let path: Vec<usize> = shape_path.into_iter().chain(run_path).collect();
        match self.document.root_mut().at_path_mut(&path) {
            Some(run) => {
                run.set_text(text);
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Path to the shape element (the grandparent of the matching `cNvPr`) and,
    /// when it has one, the path from it to the first text run.
    fn shape_path(&self, name: &str) -> Option<(Vec<usize>, Option<Vec<usize>>)> {
        let root = self.document.root();
        let is_named = |el: &XmlElement| {
            el.is(ns::SPREADSHEET_DRAWING, "cNvPr") && el.attribute("name") == Some(name)
        };
        let mut path = root.find_path(&is_named)?;
        if path.len() < 2 {
            return None;
        }
        path.truncate(path.len() - 2);

        let run = root.at_path(&path)?.locate(&TEXT_RUN_PATH);
        Some((path, run))
    }

    /// XML text of the drawing with CRLF line endings.
    pub fn serialize(&self) -> Result<String> {
        self.document.to_crlf_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DRAWING: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<xdr:wsDr xmlns:xdr="http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><xdr:twoCellAnchor><xdr:sp macro="" textlink=""><xdr:nvSpPr><xdr:cNvPr id="2" name="text box 1"/><xdr:cNvSpPr txBox="1"/></xdr:nvSpPr><xdr:txBody><a:bodyPr/><a:p><a:r><a:rPr lang="en-US"/><a:t>Original</a:t></a:r></a:p></xdr:txBody></xdr:sp></xdr:twoCellAnchor><xdr:twoCellAnchor><xdr:sp><xdr:nvSpPr><xdr:cNvPr id="3" name="empty box"/></xdr:nvSpPr><xdr:txBody><a:p/></xdr:txBody></xdr:sp></xdr:twoCellAnchor><xdr:twoCellAnchor><xdr:sp><xdr:nvSpPr><xdr:cNvPr id="4" name="text box 1"/></xdr:nvSpPr><xdr:txBody><a:p><a:r><a:t>Second</a:t></a:r></a:p></xdr:txBody></xdr:sp></xdr:twoCellAnchor></xdr:wsDr>"#;

    fn drawing() -> Drawing {
        Drawing::parse("xl/drawings/drawing1.xml", DRAWING.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse() {
        let drawing = drawing();
        assert_eq!(drawing.drawing_number(), Some(1));
        assert_eq!(drawing.shape_names(), vec!["text box 1", "empty box", "text box 1"]);
        assert_eq!(drawing.textbox_text("text box 1").as_deref(), Some("Original"));
        assert!(!drawing.is_dirty());
    }

    #[test]
    fn test_update_textbox_first_match_only() {
        let mut drawing = drawing();
        assert!(drawing.update_textbox("text box 1", "Updated"));
        assert!(drawing.is_dirty());
        assert_eq!(drawing.textbox_text("text box 1").as_deref(), Some("Updated"));

        let xml = drawing.serialize().unwrap();
        assert!(xml.contains("<a:t>Updated</a:t>"));
        assert!(xml.contains("<a:t>Second</a:t>"));
        assert!(!xml.contains("Original"));
    }

    #[test]
    fn test_update_textbox_misses() {
        let mut drawing = drawing();
        assert!(!drawing.update_textbox("", "x"));
        assert!(!drawing.update_textbox("no such box", "x"));
        assert!(!drawing.update_textbox("empty box", "x"));
        assert!(!drawing.is_dirty());
    }

    #[test]
    fn test_unparseable_drawing_is_missing_part() {
        let err = Drawing::parse("xl/drawings/drawing1.xml", b"<xdr:wsDr>").unwrap_err();
        assert!(matches!(err, SheetpatchError::MissingPart { .. }));
    }
}
