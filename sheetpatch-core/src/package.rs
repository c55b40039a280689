//! Archive access and package rewriting.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::{Path, PathBuf};

use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{Result, SheetpatchError};

/// Where a workbook was opened from. The package is re-read from here on save.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PackageSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// Compression level for entries written during save.
///
/// Entries that are copied unchanged keep their original compression.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CompressionLevel {
    /// No compression - fastest saves, largest files
    None,
    /// Fast compression (deflate level 1)
    Fast,
    /// Default compression (deflate level 6)
    #[default]
    Default,
    /// Best compression (deflate level 9)
    Best,
}

impl CompressionLevel {
    fn file_options(self) -> SimpleFileOptions {
        match self {
            CompressionLevel::None => SimpleFileOptions::default()
                .large_file(false)
                .compression_method(CompressionMethod::Stored),
            CompressionLevel::Fast => SimpleFileOptions::default()
                .large_file(false)
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(1)),
            CompressionLevel::Default => SimpleFileOptions::default()
                .large_file(false)
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(6)),
            CompressionLevel::Best => SimpleFileOptions::default()
                .large_file(false)
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(9)),
        }
    }
}

/// What to do when a replaced part already exists in the source package.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverwritePolicy {
    /// Write the new content in place of the old entry.
    #[default]
    Replace,
    /// Fail with [`SheetpatchError::PartExists`].
    Reject,
}

/// Options for saving a workbook.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SaveOptions {
    pub compression: CompressionLevel,
    pub overwrite: OverwritePolicy,
}

/// An opened package.
pub struct Package<R> {
    archive: ZipArchive<R>,
}

impl Package<BufReader<File>> {
    /// Open the package stored at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            SheetpatchError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to open file '{}': {}", path.display(), e),
            ))
        })?;
        Package::new(BufReader::new(file))
    }
}

impl<'a> Package<Cursor<&'a [u8]>> {
    /// Open a package held in memory.
    pub fn from_bytes(data: &'a [u8]) -> Result<Self> {
        Package::new(Cursor::new(data))
    }
}

impl<R: Read + Seek> Package<R> {
    pub fn new(reader: R) -> Result<Self> {
        Ok(Package {
            archive: ZipArchive::new(reader)?,
        })
    }

    /// Entry names in archive order.
    pub fn part_names(&self) -> Vec<String> {
        self.archive.file_names().map(str::to_string).collect()
    }

    pub fn has_part(&self, name: &str) -> bool {
        self.archive.index_for_name(name).is_some()
    }

    /// Read a part's decompressed bytes. An absent entry is a `MissingPart` error.
    pub fn read_part(&mut self, name: &str) -> Result<Vec<u8>> {
        self.read_optional(name)?
            .ok_or_else(|| SheetpatchError::missing_part(name, "not present in the package"))
    }

    /// Read a part's decompressed bytes, or `None` when the entry is absent.
    pub fn read_optional(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut buf = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut buf)?;
        log::trace!("read part {} ({} bytes)", name, buf.len());
        Ok(Some(buf))
    }

    /// Copy every entry into `writer`, in archive order.
    ///
    /// Entries named in `replacements` are written with the new content; all
    /// others are raw-copied, so their compressed bytes and metadata are unchanged.
    /// Replacements for names the archive does not contain are appended.
    pub fn rewrite<W: Write + Seek>(
        &mut self,
        writer: W,
        replacements: &HashMap<String, Vec<u8>>,
        options: &SaveOptions,
    ) -> Result<W> {
        let mut zip = ZipWriter::new(writer);
        let file_options = options.compression.file_options();
        let mut written = Vec::with_capacity(replacements.len());

        for index in 0..self.archive.len() {
            let file = self.archive.by_index_raw(index)?;
            let name = file.name().to_string();

            match replacements.get(&name) {
                Some(content) => {
                    if options.overwrite == OverwritePolicy::Reject {
                        return Err(SheetpatchError::PartExists(name));
                    }
                    drop(file);
                    log::trace!("replacing part {} ({} bytes)", name, content.len());
                    zip.start_file(name.as_str(), file_options)?;
                    zip.write_all(content)?;
                    written.push(name);
                }
                None => zip.raw_copy_file(file)?,
            }
        }

        let mut added: Vec<&String> = replacements
            .keys()
            .filter(|name| !written.contains(*name))
            .collect();
        added.sort();
        for name in added {
            log::trace!("adding part {}", name);
            zip.start_file(name.as_str(), file_options)?;
            zip.write_all(&replacements[name])?;
        }

        Ok(zip.finish()?)
    }
}

/// Rewrite the package behind `source` into `writer`.
pub(crate) fn rewrite_source<W: Write + Seek>(
    source: &PackageSource,
    writer: W,
    replacements: &HashMap<String, Vec<u8>>,
    options: &SaveOptions,
) -> Result<W> {
    match source {
        PackageSource::Path(path) => Package::open(path)?.rewrite(writer, replacements, options),
        PackageSource::Bytes(bytes) => {
            Package::from_bytes(bytes)?.rewrite(writer, replacements, options)
        }
    }
}

/// Rewrite the package behind `source` into the file at `destination`.
///
/// When `destination` is the source file itself, output goes to a sibling
/// temporary file that then replaces the source.
pub(crate) fn rewrite_to_path(
    source: &PackageSource,
    destination: &Path,
    replacements: &HashMap<String, Vec<u8>>,
    options: &SaveOptions,
) -> Result<()> {
    if !is_same_file(source, destination) {
        let file = File::create(destination)?;
        rewrite_source(source, file, replacements, options)?;
        return Ok(());
    }

    let mut tmp_name = destination.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let result = File::create(&tmp_path)
        .map_err(SheetpatchError::from)
        .and_then(|file| rewrite_source(source, file, replacements, options));
    match result {
        Ok(_) => {
            std::fs::rename(&tmp_path, destination)?;
            Ok(())
        }
        Err(e) => {
            let _ = std::fs::remove_file(&tmp_path);
            Err(e)
        }
    }
}

fn is_same_file(source: &PackageSource, destination: &Path) -> bool {
    let PackageSource::Path(source) = source else {
        return false;
    };
    match (std::fs::canonicalize(source), std::fs::canonicalize(destination)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archive(entries: &[(&str, &str, CompressionMethod)]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content, method) in entries {
            let options = SimpleFileOptions::default().compression_method(*method);
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    fn sample() -> Vec<u8> {
        archive(&[
            ("a.xml", "<a/>", CompressionMethod::Deflated),
            ("b.xml", "<b/>", CompressionMethod::Stored),
            ("c.bin", "binary", CompressionMethod::Deflated),
        ])
    }

    #[test]
    fn test_read_part() {
        let bytes = sample();
        let mut package = Package::from_bytes(&bytes).unwrap();
        assert_eq!(package.part_names(), vec!["a.xml", "b.xml", "c.bin"]);
        assert!(package.has_part("b.xml"));
        assert_eq!(package.read_part("b.xml").unwrap(), b"<b/>");
        assert!(package.read_optional("missing.xml").unwrap().is_none());
        assert!(matches!(
            package.read_part("missing.xml"),
            Err(SheetpatchError::MissingPart { .. })
        ));
    }

    #[test]
    fn test_rewrite_replaces_and_preserves_order() {
        let bytes = sample();
        let mut replacements = HashMap::new();
        replacements.insert("b.xml".to_string(), b"<b>new</b>".to_vec());

        let out = Package::from_bytes(&bytes)
            .unwrap()
            .rewrite(Cursor::new(Vec::new()), &replacements, &SaveOptions::default())
            .unwrap()
            .into_inner();

        let mut rewritten = Package::from_bytes(&out).unwrap();
        assert_eq!(rewritten.part_names(), vec!["a.xml", "b.xml", "c.bin"]);
        assert_eq!(rewritten.read_part("b.xml").unwrap(), b"<b>new</b>");
        assert_eq!(rewritten.read_part("c.bin").unwrap(), b"binary");
    }

    #[test]
    fn test_rewrite_raw_copies_untouched_entries() {
        let bytes = sample();
        let mut replacements = HashMap::new();
        replacements.insert("a.xml".to_string(), b"<a>1</a>".to_vec());

        let out = Package::from_bytes(&bytes)
            .unwrap()
            .rewrite(Cursor::new(Vec::new()), &replacements, &SaveOptions::default())
            .unwrap()
            .into_inner();

        let mut before = ZipArchive::new(Cursor::new(&bytes)).unwrap();
        let mut after = ZipArchive::new(Cursor::new(&out)).unwrap();
        for name in ["b.xml", "c.bin"] {
            let original = before.by_name(name).unwrap();
            let copied = after.by_name(name).unwrap();
            assert_eq!(original.crc32(), copied.crc32());
            assert_eq!(original.compressed_size(), copied.compressed_size());
            assert_eq!(original.compression(), copied.compression());
        }
    }

    #[test]
    fn test_rewrite_reject_policy() {
        let bytes = sample();
        let mut replacements = HashMap::new();
        replacements.insert("a.xml".to_string(), b"<a/>".to_vec());
        let options = SaveOptions {
            overwrite: OverwritePolicy::Reject,
            ..SaveOptions::default()
        };

        let result = Package::from_bytes(&bytes)
            .unwrap()
            .rewrite(Cursor::new(Vec::new()), &replacements, &options);
        assert!(matches!(result, Err(SheetpatchError::PartExists(name)) if name == "a.xml"));
    }

    #[test]
    fn test_rewrite_appends_new_parts() {
        let bytes = sample();
        let mut replacements = HashMap::new();
        replacements.insert("z.xml".to_string(), b"<z/>".to_vec());

        let out = Package::from_bytes(&bytes)
            .unwrap()
            .rewrite(Cursor::new(Vec::new()), &replacements, &SaveOptions::default())
            .unwrap()
            .into_inner();
        let rewritten = Package::from_bytes(&out).unwrap();
        assert_eq!(rewritten.part_names(), vec!["a.xml", "b.xml", "c.bin", "z.xml"]);
    }

    #[test]
    fn test_compression_level_default() {
        assert_eq!(CompressionLevel::default(), CompressionLevel::Default);
        assert_eq!(SaveOptions::default().overwrite, OverwritePolicy::Replace);
    }
}
