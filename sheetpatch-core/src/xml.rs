//! A small mutable XML tree built from `quick-xml` events.
//!
//! Element and attribute names keep their original prefixes so a part
//! serializes back with the producer's namespace declarations intact. Each
//! name also carries the namespace URI it resolved to at parse time, and every
//! query takes that URI explicitly instead of relying on a default prefix.

use std::borrow::Cow;

use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};

use crate::error::{Result, SheetpatchError};

/// Namespace URIs used by the parts this crate edits.
pub mod ns {
    /// SpreadsheetML main namespace (transitional).
    pub const SPREADSHEETML: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
    /// Relationship references such as `r:id` inside officeDocument parts.
    pub const OFFICE_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
    /// Relationship manifests (`*.rels`).
    pub const PACKAGE_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships";
    /// Worksheet drawings (`xdr:`).
    pub const SPREADSHEET_DRAWING: &str =
        "http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing";
    /// DrawingML main (`a:`).
    pub const DRAWINGML: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
    /// The reserved `xml:` prefix.
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
}

/// A node in the tree.
#[derive(Clone, Debug)]
pub enum XmlNode {
    Element(XmlElement),
    /// Unescaped character data.
    Text(String),
    /// Comments, CDATA, processing instructions and declarations, replayed verbatim.
    Other(Event<'static>),
}

/// An attribute with its qualified name as written in the source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XmlAttribute {
    pub name: String,
    /// Resolved namespace; unprefixed attributes have none.
    pub namespace: Option<String>,
    pub value: String,
}

/// An element with its qualified name as written in the source.
#[derive(Clone, Debug)]
pub struct XmlElement {
    name: String,
    namespace: Option<String>,
    attributes: Vec<XmlAttribute>,
    children: Vec<XmlNode>,
}

impl XmlElement {
    /// Create an element with a qualified name (e.g. `"row"` or `"x:row"`).
    pub fn new(name: impl Into<String>, namespace: Option<&str>) -> Self {
        XmlElement {
            name: name.into(),
            namespace: namespace.map(str::to_string),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create an element named `local` that shares this element's prefix and namespace.
    pub fn new_in_same_namespace(&self, local: &str) -> Self {
        let name = match self.prefix() {
            Some(prefix) => format!("{}:{}", prefix, local),
            None => local.to_string(),
        };
        XmlElement::new(name, self.namespace())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local_name(&self) -> &str {
        self.name.split_once(':').map_or(self.name.as_str(), |(_, local)| local)
    }

    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Whether this element is `{namespace}local`.
    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.namespace.as_deref() == Some(namespace) && self.local_name() == local
    }

    pub fn attributes(&self) -> &[XmlAttribute] {
        &self.attributes
    }

    /// Value of an unprefixed attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace.is_none() && a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Value of a namespace-qualified attribute, whatever prefix the document uses.
    pub fn attribute_ns(&self, namespace: &str, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| {
                a.namespace.as_deref() == Some(namespace)
                    && a.name.split_once(':').is_some_and(|(_, l)| l == local)
            })
            .map(|a| a.value.as_str())
    }

    /// Set an unprefixed attribute, replacing its value in place if it exists.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|a| a.namespace.is_none() && a.name == name)
        {
            Some(attr) => attr.value = value,
            None => self.attributes.push(XmlAttribute {
                name: name.to_string(),
                namespace: None,
                value,
            }),
        }
    }

    /// Set a qualified attribute such as `xml:space`.
    pub fn set_attribute_ns(&mut self, qualified_name: &str, namespace: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == qualified_name) {
            Some(attr) => attr.value = value,
            None => self.attributes.push(XmlAttribute {
                name: qualified_name.to_string(),
                namespace: Some(namespace.to_string()),
                value,
            }),
        }
    }

    /// Remove an unprefixed attribute, returning its value.
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let idx = self
            .attributes
            .iter()
            .position(|a| a.namespace.is_none() && a.name == name)?;
        Some(self.attributes.remove(idx).value)
    }

    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// Child elements, skipping text and other nodes.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            _ => None,
        })
    }

    /// Child elements with their node index.
    pub fn indexed_elements(&self) -> impl Iterator<Item = (usize, &XmlElement)> {
        self.children.iter().enumerate().filter_map(|(i, node)| match node {
            XmlNode::Element(el) => Some((i, el)),
            _ => None,
        })
    }

    /// First child element named `{namespace}local`.
    pub fn child(&self, namespace: &str, local: &str) -> Option<&XmlElement> {
        self.elements().find(|el| el.is(namespace, local))
    }

    /// Mutable first child element named `{namespace}local`.
    pub fn child_mut(&mut self, namespace: &str, local: &str) -> Option<&mut XmlElement> {
        self.children.iter_mut().find_map(|node| match node {
            XmlNode::Element(el) if el.is(namespace, local) => Some(el),
            _ => None,
        })
    }

    /// The child element stored at node index `index`.
    pub fn element_at_mut(&mut self, index: usize) -> Option<&mut XmlElement> {
        match self.children.get_mut(index) {
            Some(XmlNode::Element(el)) => Some(el),
            _ => None,
        }
    }

    /// Insert an element at node index `index` (clamped to the end).
    pub fn insert_element(&mut self, index: usize, element: XmlElement) {
        let index = index.min(self.children.len());
        self.children.insert(index, XmlNode::Element(element));
    }

    pub fn push_element(&mut self, element: XmlElement) {
        self.children.push(XmlNode::Element(element));
    }

    pub fn remove_child(&mut self, index: usize) -> Option<XmlNode> {
        (index < self.children.len()).then(|| self.children.remove(index))
    }

    pub fn clear_children(&mut self) {
        self.children.clear();
    }

    /// Concatenated text of this element and its descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                XmlNode::Text(t) => out.push_str(t),
                XmlNode::Element(el) => el.collect_text(out),
                XmlNode::Other(Event::CData(cdata)) => out.push_str(&String::from_utf8_lossy(cdata)),
                XmlNode::Other(_) => {}
            }
        }
    }

    /// Replace all children with a single text node.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children.clear();
        self.children.push(XmlNode::Text(text.into()));
    }

    /// All descendant elements in document order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: vec![self.children.iter()],
        }
    }

    /// Node-index path to the first descendant (document order) matching `pred`.
    pub fn find_path<F>(&self, pred: &F) -> Option<Vec<usize>>
    where
        F: Fn(&XmlElement) -> bool,
    {
        for (i, el) in self.indexed_elements() {
            if pred(el) {
                return Some(vec![i]);
            }
            if let Some(mut path) = el.find_path(pred) {
                path.insert(0, i);
                return Some(path);
            }
        }
        None
    }

    /// Node-index path to the first element reached by following `steps` of
    /// `(namespace, local)` names, trying every matching branch in document order.
    pub fn locate(&self, steps: &[(&str, &str)]) -> Option<Vec<usize>> {
        let Some((&(namespace, local), rest)) = steps.split_first() else {
            return Some(Vec::new());
        };
        for (i, el) in self.indexed_elements() {
            if el.is(namespace, local) {
                if let Some(mut path) = el.locate(rest) {
                    path.insert(0, i);
                    return Some(path);
                }
            }
        }
        None
    }

    /// The descendant at a node-index path from [`find_path`](Self::find_path) or
    /// [`locate`](Self::locate).
    pub fn at_path(&self, path: &[usize]) -> Option<&XmlElement> {
        let mut current = self;
        for &index in path {
            current = match current.children.get(index) {
                Some(XmlNode::Element(el)) => el,
                _ => return None,
            };
        }
        Some(current)
    }

    pub fn at_path_mut(&mut self, path: &[usize]) -> Option<&mut XmlElement> {
        let mut current = self;
        for &index in path {
            current = current.element_at_mut(index)?;
        }
        Some(current)
    }

    fn write(&self, writer: &mut Writer<Vec<u8>>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for attr in &self.attributes {
            start.push_attribute(Attribute {
                key: QName(attr.name.as_bytes()),
                value: Cow::Owned(escape_attribute(&attr.value).into_bytes()),
            });
        }

        if self.children.is_empty() {
            write_event(writer, Event::Empty(start))?;
            return Ok(());
        }

        write_event(writer, Event::Start(start))?;
        for node in &self.children {
            write_node(writer, node)?;
        }
        write_event(writer, Event::End(BytesEnd::new(self.name.as_str())))
    }
}

/// Pre-order iterator over descendant elements.
pub struct Descendants<'a> {
    stack: Vec<std::slice::Iter<'a, XmlNode>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a XmlElement;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(XmlNode::Element(el)) => {
                    self.stack.push(el.children.iter());
                    return Some(el);
                }
                Some(_) => continue,
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// A parsed XML part.
#[derive(Clone, Debug)]
pub struct XmlDocument {
    /// Declaration, comments and processing instructions before the root.
    prolog: Vec<XmlNode>,
    root: XmlElement,
    epilog: Vec<XmlNode>,
}

impl XmlDocument {
    /// Parse `bytes` as the part named `part` (used in error messages).
    pub fn parse(part: &str, bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(bytes);
        reader.config_mut().trim_text(false);

        let mut scopes = NamespaceScopes::default();
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut root: Option<XmlElement> = None;
        let mut buf = Vec::new();

        loop {
            let event = reader.read_event_into(&mut buf).map_err(|e| {
                SheetpatchError::xml(part, format!("{} at position {}", e, reader.error_position()))
            })?;

            let finished = match event {
                Event::Start(e) => {
                    stack.push(scopes.open(&e, part)?);
                    None
                }
                Event::Empty(e) => {
                    let element = scopes.open(&e, part)?;
                    scopes.close();
                    Some(element)
                }
                Event::End(_) => {
                    scopes.close();
                    let element = stack
                        .pop()
                        .ok_or_else(|| SheetpatchError::xml(part, "unbalanced end tag"))?;
                    Some(element)
                }
                Event::Text(e) => {
                    let text = e.unescape().map_err(|err| SheetpatchError::xml(part, err))?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XmlNode::Text(text.into_owned())),
                        None if text.trim().is_empty() => {}
                        None => return Err(SheetpatchError::xml(part, "text outside the root element")),
                    }
                    None
                }
                Event::Eof => break,
                other => {
                    let node = XmlNode::Other(other.into_owned());
                    match (stack.last_mut(), root.is_some()) {
                        (Some(parent), _) => parent.children.push(node),
                        (None, false) => prolog.push(node),
                        (None, true) => epilog.push(node),
                    }
                    None
                }
            };

            if let Some(element) = finished {
                match stack.last_mut() {
                    Some(parent) => parent.children.push(XmlNode::Element(element)),
                    None if root.is_none() => root = Some(element),
                    None => return Err(SheetpatchError::xml(part, "more than one root element")),
                }
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(SheetpatchError::xml(part, "unexpected end of document"));
        }
        let root = root.ok_or_else(|| SheetpatchError::xml(part, "document has no root element"))?;

        Ok(XmlDocument { prolog, root, epilog })
    }

    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut XmlElement {
        &mut self.root
    }

    /// Serialize without indentation, every line break emitted as CRLF.
    ///
    /// Prolog nodes are each followed by a line break. Line feeds inside
    /// attribute values are character references, so only text and markup
    /// line breaks are affected.
    pub fn to_xml_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        for node in &self.prolog {
            write_node(&mut writer, node)?;
            writer.get_mut().extend_from_slice(b"\r\n");
        }
        self.root.write(&mut writer)?;
        for node in &self.epilog {
            writer.get_mut().extend_from_slice(b"\r\n");
            write_node(&mut writer, node)?;
        }
        Ok(writer.into_inner())
    }

    /// [`to_xml_bytes`](Self::to_xml_bytes) as a string.
    pub fn to_crlf_string(&self) -> Result<String> {
        let bytes = self.to_xml_bytes()?;
        String::from_utf8(bytes).map_err(|e| SheetpatchError::xml("<serializer>", e))
    }
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &XmlNode) -> Result<()> {
    match node {
        XmlNode::Element(el) => el.write(writer),
        XmlNode::Text(text) => write_event(writer, Event::Text(BytesText::from_escaped(escape_text(text)))),
        XmlNode::Other(event) => {
            // comments, CDATA and processing instructions are written verbatim
            let mut raw = Writer::new(Vec::new());
            write_event(&mut raw, event.clone())?;
            push_crlf(writer.get_mut(), &raw.into_inner());
            Ok(())
        }
    }
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| SheetpatchError::xml("<serializer>", e))
}

/// Escape character data. Line feeds become CRLF; a carriage return that does
/// not start a CRLF pair is kept as a character reference.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\r' => out.push_str("&#13;"),
            '\n' => out.push_str("\r\n"),
            c => out.push(c),
        }
    }
    out
}

/// Escape a double-quoted attribute value. Whitespace other than a space is
/// written as a character reference so attribute-value normalization keeps it.
fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            c => out.push(c),
        }
    }
    out
}

fn push_crlf(out: &mut Vec<u8>, bytes: &[u8]) {
    let mut previous = 0u8;
    for &b in bytes {
        if b == b'\n' && previous != b'\r' {
            out.push(b'\r');
        }
        out.push(b);
        previous = b;
    }
}

/// In-scope `xmlns` declarations, one frame per open element.
#[derive(Default)]
struct NamespaceScopes {
    frames: Vec<Vec<(String, String)>>,
}

impl NamespaceScopes {
    /// Push the element's declarations and build it with resolved names.
    fn open(&mut self, start: &BytesStart<'_>, part: &str) -> Result<XmlElement> {
        let mut declared = Vec::new();
        let mut attributes = Vec::new();

        for attr in start.attributes() {
            let attr = attr.map_err(|e| SheetpatchError::xml(part, e))?;
            let name = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| SheetpatchError::xml(part, e))?
                .to_string();
            let value = attr
                .unescape_value()
                .map_err(|e| SheetpatchError::xml(part, e))?
                .into_owned();

            if name == "xmlns" {
                declared.push((String::new(), value.clone()));
            } else if let Some(prefix) = name.strip_prefix("xmlns:") {
                declared.push((prefix.to_string(), value.clone()));
            }
            attributes.push(XmlAttribute {
                name,
                namespace: None,
                value,
            });
        }
        self.frames.push(declared);

        for attr in &mut attributes {
            if let Some((prefix, _)) = attr.name.split_once(':') {
                if prefix != "xmlns" {
                    attr.namespace = self.lookup(prefix);
                }
            }
        }

        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| SheetpatchError::xml(part, e))?
            .to_string();
        let namespace = match name.split_once(':') {
            Some((prefix, _)) => self.lookup(prefix),
            None => self.lookup(""),
        };

        Ok(XmlElement {
            name,
            namespace,
            attributes,
            children: Vec::new(),
        })
    }

    fn close(&mut self) {
        self.frames.pop();
    }

    fn lookup(&self, prefix: &str) -> Option<String> {
        if prefix == "xml" {
            return Some(ns::XML.to_string());
        }
        self.frames
            .iter()
            .rev()
            .flat_map(|frame| frame.iter())
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.clone())
            .filter(|uri| !uri.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>a &amp; b</t></is></c></row></sheetData><drawing r:id="rId1"/></worksheet>"#;

    #[test]
    fn test_parse_resolves_default_namespace() {
        let doc = XmlDocument::parse("sheet1.xml", SHEET.as_bytes()).unwrap();
        let root = doc.root();
        assert!(root.is(ns::SPREADSHEETML, "worksheet"));
        let sheet_data = root.child(ns::SPREADSHEETML, "sheetData").unwrap();
        assert_eq!(sheet_data.elements().count(), 1);
        assert_eq!(sheet_data.text(), "a & b");
    }

    #[test]
    fn test_prefixed_attribute_lookup() {
        let doc = XmlDocument::parse("sheet1.xml", SHEET.as_bytes()).unwrap();
        let drawing = doc.root().child(ns::SPREADSHEETML, "drawing").unwrap();
        assert_eq!(drawing.attribute_ns(ns::OFFICE_RELATIONSHIPS, "id"), Some("rId1"));
        assert_eq!(drawing.attribute("id"), None);
    }

    #[test]
    fn test_prefixed_main_namespace() {
        let xml = r#"<x:worksheet xmlns:x="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><x:sheetData/></x:worksheet>"#;
        let doc = XmlDocument::parse("sheet1.xml", xml.as_bytes()).unwrap();
        let sheet_data = doc.root().child(ns::SPREADSHEETML, "sheetData").unwrap();
        let row = sheet_data.new_in_same_namespace("row");
        assert_eq!(row.name(), "x:row");
        assert!(row.is(ns::SPREADSHEETML, "row"));
    }

    #[test]
    fn test_serialize_roundtrip_keeps_declaration_and_escapes() {
        let doc = XmlDocument::parse("sheet1.xml", SHEET.as_bytes()).unwrap();
        let text = doc.to_crlf_string().unwrap();
        assert!(text.starts_with(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#));
        assert!(text.contains("?>\r\n<worksheet"));
        assert!(text.contains("<t>a &amp; b</t>"));
        assert!(text.contains(r#"<drawing r:id="rId1"/>"#));
        assert!(!text.replace("\r\n", "").contains('\n'));

        let reparsed = XmlDocument::parse("sheet1.xml", text.as_bytes()).unwrap();
        assert_eq!(reparsed.root().text(), "a & b");
    }

    #[test]
    fn test_crlf_is_not_doubled() {
        let xml = "<root>\r\n<a/>\n</root>";
        let doc = XmlDocument::parse("p.xml", xml.as_bytes()).unwrap();
        assert_eq!(doc.to_crlf_string().unwrap(), "<root>\r\n<a/>\r\n</root>");
    }

    #[test]
    fn test_attribute_whitespace_survives_serialization() {
        let xml = r#"<dataValidation prompt="line1&#10;line2&#9;tab&#13;" error="a &quot;b&quot; &amp; c"/>"#;
        let doc = XmlDocument::parse("sheet1.xml", xml.as_bytes()).unwrap();
        let text = doc.to_crlf_string().unwrap();
        assert_eq!(
            text,
            r#"<dataValidation prompt="line1&#10;line2&#9;tab&#13;" error="a &quot;b&quot; &amp; c"/>"#
        );

        let reparsed = XmlDocument::parse("sheet1.xml", text.as_bytes()).unwrap();
        assert_eq!(reparsed.root().attribute("prompt"), Some("line1\nline2\ttab\r"));
        assert_eq!(reparsed.root().attribute("error"), Some("a \"b\" & c"));
    }

    #[test]
    fn test_text_line_breaks() {
        let xml = "<t>a\nb&#13;c\r\nd</t>";
        let doc = XmlDocument::parse("p.xml", xml.as_bytes()).unwrap();
        assert_eq!(doc.to_crlf_string().unwrap(), "<t>a\r\nb&#13;c\r\nd</t>");
    }

    #[test]
    fn test_comment_line_breaks() {
        let xml = "<r><!-- one\ntwo --><a/></r>";
        let doc = XmlDocument::parse("p.xml", xml.as_bytes()).unwrap();
        assert_eq!(doc.to_crlf_string().unwrap(), "<r><!-- one\r\ntwo --><a/></r>");
    }

    #[test]
    fn test_descendants_preorder() {
        let xml = "<a><b><c/></b><d/></a>";
        let doc = XmlDocument::parse("p.xml", xml.as_bytes()).unwrap();
        let names: Vec<&str> = doc.root().descendants().map(|e| e.name()).collect();
        assert_eq!(names, vec!["b", "c", "d"]);
    }

    #[test]
    fn test_locate_backtracks_across_branches() {
        let xml = r#"<r xmlns="urn:t"><p/><p><q><t>x</t></q></p></r>"#;
        let mut doc = XmlDocument::parse("p.xml", xml.as_bytes()).unwrap();
        let path = doc.root().locate(&[("urn:t", "p"), ("urn:t", "q"), ("urn:t", "t")]).unwrap();
        assert_eq!(path, vec![1, 0, 0]);
        doc.root_mut().at_path_mut(&path).unwrap().set_text("y");
        assert_eq!(doc.root().text(), "y");
    }

    #[test]
    fn test_parse_errors() {
        assert!(XmlDocument::parse("p.xml", b"<a><b></a>").is_err());
        assert!(XmlDocument::parse("p.xml", b"").is_err());
        assert!(XmlDocument::parse("p.xml", b"<a/><b/>").is_err());
    }

    #[test]
    fn test_attribute_editing() {
        let mut el = XmlElement::new("c", Some(ns::SPREADSHEETML));
        el.set_attribute("r", "A1");
        el.set_attribute("t", "n");
        el.set_attribute("t", "inlineStr");
        assert_eq!(el.attribute("t"), Some("inlineStr"));
        assert_eq!(el.remove_attribute("t"), Some("inlineStr".to_string()));
        assert_eq!(el.attributes().len(), 1);
    }
}
