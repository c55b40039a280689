//! Relationship manifests (`_rels/*.rels`) and target resolution.

use std::io::{Read, Seek};

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{Result, SheetpatchError};
use crate::package::Package;

/// Manifest of the workbook part.
pub const WORKBOOK_RELS: &str = "xl/_rels/workbook.xml.rels";

/// One `Relationship` entry of a manifest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    /// Target exactly as written, usually relative to the source part's directory.
    pub target: String,
    /// `TargetMode="External"`: the target is a URI outside the package.
    pub external: bool,
}

/// Manifest path for `part`: `xl/worksheets/sheet1.xml` -> `xl/worksheets/_rels/sheet1.xml.rels`.
pub fn rels_for_part(part: &str) -> String {
    let (dir, file_name) = match part.rsplit_once('/') {
        Some((dir, file_name)) => (dir, file_name),
        None => ("", part),
    };
    if dir.is_empty() {
        format!("_rels/{}.rels", file_name)
    } else {
        format!("{}/_rels/{}.rels", dir, file_name)
    }
}

/// Absolute package path of `target` as seen from `source_part`.
///
/// Fragments are dropped, a leading `/` anchors at the package root, and
/// `.`/`..` segments are collapsed.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    let target = match target.find('#') {
        Some(at) => &target[..at],
        None => target,
    };
    if target.is_empty() {
        return normalize_segments(source_part.split('/'));
    }
    if let Some(absolute) = target.strip_prefix('/') {
        return normalize_segments(absolute.split('/'));
    }
    let base = source_part.rsplit_once('/').map_or("", |(dir, _)| dir);
    normalize_segments(base.split('/').chain(target.split('/')))
}

fn normalize_segments<'a>(segments: impl Iterator<Item = &'a str>) -> String {
    let mut out: Vec<&str> = Vec::new();
    for segment in segments {
        match segment {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out.join("/")
}

/// Parse a relationship manifest. `manifest_part` names it in error messages.
pub fn parse_relationships(xml: &[u8], manifest_part: &str) -> Result<Vec<Relationship>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut rels = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"Relationship" {
                    let mut id = None;
                    let mut rel_type = String::new();
                    let mut target = None;
                    let mut external = false;

                    for attr in e.attributes() {
                        let attr = attr.map_err(|err| SheetpatchError::xml(manifest_part, err))?;
                        let value = attr
                            .unescape_value()
                            .map_err(|err| SheetpatchError::xml(manifest_part, err))?;
                        match attr.key.as_ref() {
                            b"Id" => id = Some(value.into_owned()),
                            b"Type" => rel_type = value.into_owned(),
                            b"Target" => target = Some(value.into_owned()),
                            b"TargetMode" => external = value.eq_ignore_ascii_case("External"),
                            _ => {}
                        }
                    }

                    match (id, target) {
                        (Some(id), Some(target)) => rels.push(Relationship {
                            id,
                            rel_type,
                            target,
                            external,
                        }),
                        _ => log::warn!("{}: skipping Relationship without Id or Target", manifest_part),
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SheetpatchError::xml(
                    manifest_part,
                    format!("{} at position {}", e, reader.error_position()),
                ));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

/// Raw `Target` of the first relationship in `manifest_part` whose `Id` is
/// `relationship_id`.
pub fn resolve<R: Read + Seek>(
    package: &mut Package<R>,
    manifest_part: &str,
    relationship_id: &str,
) -> Result<String> {
    let xml = package.read_part(manifest_part)?;
    find_target(&parse_relationships(&xml, manifest_part)?, manifest_part, relationship_id)
}

/// Absolute package path of the part that `source_part` references as `relationship_id`.
pub fn resolve_part<R: Read + Seek>(
    package: &mut Package<R>,
    source_part: &str,
    relationship_id: &str,
) -> Result<String> {
    let manifest = rels_for_part(source_part);
    let target = resolve(package, &manifest, relationship_id)?;
    Ok(resolve_target(source_part, &target))
}

/// Lookup over an already parsed manifest.
pub fn find_target(rels: &[Relationship], manifest_part: &str, relationship_id: &str) -> Result<String> {
    rels.iter()
        .find(|rel| rel.id == relationship_id)
        .map(|rel| rel.target.clone())
        .ok_or_else(|| SheetpatchError::UnresolvedRelationship {
            manifest: manifest_part.to_string(),
            id: relationship_id.to_string(),
        })
}
