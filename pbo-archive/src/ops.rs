//! Create, list and extract operations.
//!
//! These compose the tree builder, the header codec and the data mover
//! into whole-archive passes. Each call is a single sequential pass;
//! bytes already written when an error occurs are left in place.

use crate::pbo::{PboReader, PboWriter, header};
use crate::tree::{SourceFile, TreeBuilder};
use filetime::FileTime;
use pbo_core::config::ReadLimits;
use pbo_core::entry::{Archive, Entry, Property};
use pbo_core::error::{PboError, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};

/// Settings for [`create`].
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// Store source modification times instead of zero.
    pub preserve_timestamps: bool,
    /// Metadata properties; a marker record is written when non-empty.
    pub properties: Vec<Property>,
}

impl CreateOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to enable timestamp capture.
    pub fn with_timestamps(mut self, enable: bool) -> Self {
        self.preserve_timestamps = enable;
        self
    }

    /// Builder method to add a metadata property.
    pub fn with_property(mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        self.properties.push(Property::new(key, value));
        self
    }
}

/// Settings for [`extract`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// Set output file times from entry timestamps.
    pub restore_timestamps: bool,
    /// String bounds for the header reader.
    pub limits: ReadLimits,
}

impl ExtractOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to enable timestamp restoration.
    pub fn with_timestamps(mut self, enable: bool) -> Self {
        self.restore_timestamps = enable;
        self
    }

    /// Builder method to set the string bounds.
    pub fn with_limits(mut self, limits: ReadLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// Settings for [`list`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ListOptions {
    /// String bounds for the header reader.
    pub limits: ReadLimits,
}

impl ListOptions {
    /// Builder method to set the string bounds.
    pub fn with_limits(mut self, limits: ReadLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// Archive every file under `paths` into `writer`.
pub fn create<P, W>(paths: &[P], writer: W, options: &CreateOptions) -> Result<W>
where
    P: AsRef<Path>,
    W: Write,
{
    create_with(paths, writer, options, |_| {})
}

/// Like [`create`], calling `on_entry` before each body is written.
pub fn create_with<P, W, F>(
    paths: &[P],
    writer: W,
    options: &CreateOptions,
    on_entry: F,
) -> Result<W>
where
    P: AsRef<Path>,
    W: Write,
    F: FnMut(&Entry),
{
    let files = collect_files(paths, options)?;
    write_archive(&files, writer, options, on_entry)
}

/// Walk `paths` and return the files [`write_archive`] will store.
pub fn collect_files<P>(paths: &[P], options: &CreateOptions) -> Result<Vec<SourceFile>>
where
    P: AsRef<Path>,
{
    if paths.is_empty() {
        return Err(PboError::invalid_argument("no input paths given"));
    }

    TreeBuilder::new()
        .capture_timestamps(options.preserve_timestamps)
        .build(paths)
}

/// Write the header block for `files`, then each body in the same order.
pub fn write_archive<W, F>(
    files: &[SourceFile],
    writer: W,
    options: &CreateOptions,
    mut on_entry: F,
) -> Result<W>
where
    W: Write,
    F: FnMut(&Entry),
{
    let mut archive = Archive {
        entries: files.iter().map(|f| f.entry.clone()).collect(),
        properties: options.properties.clone(),
    };
    archive.normalize(options.preserve_timestamps);

    let mut pbo = PboWriter::new(writer);
    pbo.write_header(&archive)?;

    for (file, entry) in files.iter().zip(&archive.entries) {
        on_entry(entry);
        let mut source = File::open(&file.source)?;
        pbo.write_body(&mut source)?;
        tracing::debug!(path = %file.source.display(), size = entry.data_size, "added file");
    }

    pbo.finish()
}

/// Host-form paths of an archive's regular entries, in header order.
///
/// The header block is parsed up front; paths are translated as they are
/// yielded.
#[derive(Debug)]
pub struct List {
    properties: Vec<Property>,
    entries: std::vec::IntoIter<Entry>,
}

impl List {
    /// Metadata properties of the archive.
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Entries not yet yielded.
    pub fn entries(&self) -> &[Entry] {
        self.entries.as_slice()
    }
}

impl Iterator for List {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        self.entries
            .by_ref()
            .find(Entry::is_regular)
            .map(|e| e.host_path())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.entries.len()))
    }
}

/// Read the header block from `reader` and list its files.
///
/// Only the header block is consumed. Offsets in the listed entries are
/// relative to the reader's starting position.
pub fn list<R: Read>(mut reader: R, options: &ListOptions) -> Result<List> {
    let archive = header::read_archive(&mut reader, 0, &options.limits)?;
    Ok(List {
        properties: archive.properties,
        entries: archive.entries.into_iter(),
    })
}

/// Extract every regular entry of `reader` under `destination`.
///
/// Returns the number of files written.
pub fn extract<R, P>(reader: R, destination: P, options: &ExtractOptions) -> Result<usize>
where
    R: Read + Seek,
    P: AsRef<Path>,
{
    extract_with(reader, destination, options, |_, _| true)
}

/// Like [`extract`], writing only entries for which `select` returns true.
pub fn extract_with<R, P, F>(
    reader: R,
    destination: P,
    options: &ExtractOptions,
    select: F,
) -> Result<usize>
where
    R: Read + Seek,
    P: AsRef<Path>,
    F: FnMut(&Entry, &Path) -> bool,
{
    let mut pbo = PboReader::with_limits(reader, options.limits)?;
    extract_entries(&mut pbo, destination, options, select)
}

/// Extract the regular entries of an opened archive under `destination`.
///
/// `select` receives each entry and its target path before anything is
/// written for it. Returns the number of files written.
pub fn extract_entries<R, P, F>(
    pbo: &mut PboReader<R>,
    destination: P,
    options: &ExtractOptions,
    mut select: F,
) -> Result<usize>
where
    R: Read + Seek,
    P: AsRef<Path>,
    F: FnMut(&Entry, &Path) -> bool,
{
    let destination = destination.as_ref();
    let entries = pbo.entries().to_vec();
    let mut extracted = 0;

    for entry in entries.iter().filter(|e| e.is_regular()) {
        let target = destination.join(entry.host_path());
        if !select(entry, &target) {
            continue;
        }
        entry.validate_path()?;

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        if entry.original_size != entry.data_size {
            tracing::warn!(
                path = %entry.path_lossy(),
                original_size = entry.original_size,
                data_size = entry.data_size,
                "sizes differ, extracting stored bytes as-is"
            );
        }

        let mut output = BufWriter::new(File::create(&target)?);
        pbo.extract(entry, &mut output)?;
        output.flush()?;
        drop(output);

        // A zero timestamp was never recorded; the file keeps its creation time.
        if let Some(modified) = entry.modified().filter(|_| options.restore_timestamps) {
            let time = FileTime::from_system_time(modified);
            filetime::set_file_times(&target, time, time)?;
        }

        tracing::debug!(path = %target.display(), size = entry.data_size, "extracted file");
        extracted += 1;
    }

    Ok(extracted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn single_entry(path: &[u8], body: &[u8]) -> Vec<u8> {
        let archive = Archive::from_entries(vec![Entry::regular(path, body.len() as u32)]);
        let mut writer = PboWriter::new(Vec::new());
        writer.write_header(&archive).unwrap();
        writer.write_body_bytes(body).unwrap();
        writer.finish().unwrap()
    }

    #[test]
    fn test_create_empty_input() {
        let paths: [&str; 0] = [];
        let err = create(&paths, Vec::new(), &CreateOptions::new()).unwrap_err();
        assert!(matches!(err, PboError::InvalidArgument { .. }));
        assert_eq!(err.kind(), pbo_core::ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_list_skips_marker() {
        let mut archive = Archive::from_entries(vec![
            Entry::regular(&b"one"[..], 1),
            Entry::regular(&b"two"[..], 1),
        ]);
        archive.properties.push(Property::new("prefix", "x"));
        let mut data = Vec::new();
        header::write_header_block(&mut data, &archive).unwrap();
        data.extend_from_slice(b"12");

        let listing = list(Cursor::new(data), &ListOptions::default()).unwrap();
        assert_eq!(listing.properties().len(), 1);
        assert_eq!(listing.entries().len(), 2);
        let paths: Vec<PathBuf> = listing.collect();
        assert_eq!(paths, vec![PathBuf::from("one"), PathBuf::from("two")]);
    }

    #[test]
    fn test_extract_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        let data = single_entry(b"..\\escape.txt", b"bad");

        let err = extract(Cursor::new(data), dir.path().join("out"), &ExtractOptions::new())
            .unwrap_err();
        assert!(matches!(err, PboError::PathTraversal { .. }));
        assert!(!dir.path().join("escape.txt").exists());
    }

    #[test]
    fn test_extract_with_filter() {
        let dir = TempDir::new().unwrap();
        let archive = Archive::from_entries(vec![
            Entry::regular(&b"keep.txt"[..], 4),
            Entry::regular(&b"skip.log"[..], 4),
        ]);
        let mut writer = PboWriter::new(Vec::new());
        writer.write_header(&archive).unwrap();
        writer.write_body_bytes(b"keep").unwrap();
        writer.write_body_bytes(b"skip").unwrap();
        let data = writer.finish().unwrap();

        let count = extract_with(
            Cursor::new(data),
            dir.path(),
            &ExtractOptions::new(),
            |entry, _| entry.path.ends_with(b".txt"),
        )
        .unwrap();
        assert_eq!(count, 1);
        assert_eq!(fs::read(dir.path().join("keep.txt")).unwrap(), b"keep");
        assert!(!dir.path().join("skip.log").exists());
    }

    #[test]
    fn test_extract_filter_skips_unsafe_entry() {
        let dir = TempDir::new().unwrap();
        let archive = Archive::from_entries(vec![
            Entry::regular(&b"..\\evil.txt"[..], 4),
            Entry::regular(&b"good.txt"[..], 4),
        ]);
        let mut writer = PboWriter::new(Vec::new());
        writer.write_header(&archive).unwrap();
        writer.write_body_bytes(b"evil").unwrap();
        writer.write_body_bytes(b"good").unwrap();
        let data = writer.finish().unwrap();

        let out = dir.path().join("out");
        let count = extract_with(Cursor::new(data), &out, &ExtractOptions::new(), |entry, _| {
            entry.path == b"good.txt"
        })
        .unwrap();
        assert_eq!(count, 1);
        assert_eq!(fs::read(out.join("good.txt")).unwrap(), b"good");
        assert!(!dir.path().join("evil.txt").exists());
    }

    #[test]
    fn test_extract_zero_timestamp_not_restored() {
        let dir = TempDir::new().unwrap();
        let data = single_entry(b"fresh.txt", b"now");

        let options = ExtractOptions::new().with_timestamps(true);
        extract(Cursor::new(data), dir.path(), &options).unwrap();

        let metadata = fs::metadata(dir.path().join("fresh.txt")).unwrap();
        let mtime = FileTime::from_last_modification_time(&metadata);
        assert!(mtime.unix_seconds() > 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_extract_parent_is_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("sub"), b"not a directory").unwrap();
        let data = single_entry(b"sub\\inner.txt", b"x");

        let err = extract(Cursor::new(data), dir.path(), &ExtractOptions::new()).unwrap_err();
        assert!(matches!(err, PboError::Io(_)));
    }

    #[test]
    fn test_options_builders() {
        let create = CreateOptions::new()
            .with_timestamps(true)
            .with_property("prefix", "addon");
        assert!(create.preserve_timestamps);
        assert_eq!(create.properties, vec![Property::new("prefix", "addon")]);

        let extract = ExtractOptions::new().with_limits(ReadLimits::UNBOUNDED);
        assert!(!extract.restore_timestamps);
        assert_eq!(extract.limits, ReadLimits::UNBOUNDED);

        let list = ListOptions::default();
        assert_eq!(list.limits, ReadLimits::BOUNDED);
    }
}
