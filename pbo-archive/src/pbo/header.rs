//! PBO header block parsing and serialization.
//!
//! The header block is a run of records, each a null-terminated path
//! followed by five little-endian `u32` fields:
//!
//! ```text
//! path\0 | tag | original_size | offset | timestamp | data_size
//! ```
//!
//! An optional metadata marker (tag "Vers") may head the block; its fixed
//! fields are followed by key/value string pairs ending with an empty
//! key. The block ends with a sentinel record (empty path, all zeros).
//!
//! Reading is split in two passes: [`read_header_block`] parses records
//! while a [`HeaderCursor`] tracks the stream position, then
//! [`resolve_offsets`] assigns each entry its absolute body position.

use pbo_core::config::{ReadLimits, StringLimit};
use pbo_core::entry::{Archive, Entry, EntryKind, Property};
use pbo_core::error::{PboError, Result};
use std::io::{self, Read, Write};

/// Size of the fixed fields following each record path.
pub const FIELDS_SIZE: usize = 20;

/// Reader wrapper tracking how many bytes the header parser consumed.
pub struct HeaderCursor<'a, R: Read + ?Sized> {
    reader: &'a mut R,
    position: u64,
}

impl<'a, R: Read + ?Sized> HeaderCursor<'a, R> {
    /// Start a cursor at stream position `start`.
    pub fn new(reader: &'a mut R, start: u64) -> Self {
        Self {
            reader,
            position: start,
        }
    }

    /// Current stream position.
    pub fn position(&self) -> u64 {
        self.position
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.reader.read_exact(buf).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                PboError::unexpected_eof(buf.len() as u64)
            } else {
                PboError::Io(e)
            }
        })?;
        self.position += buf.len() as u64;
        Ok(())
    }

    /// Read a null-terminated string subject to `limit`.
    pub fn read_cstring(&mut self, limit: StringLimit, field: &'static str) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut byte = [0u8; 1];

        loop {
            self.read_exact(&mut byte)?;
            if byte[0] == 0 {
                return Ok(out);
            }
            if !limit.allows(out.len() + 1) {
                return Err(PboError::string_too_long(
                    field,
                    limit.max_len().unwrap_or(usize::MAX),
                ));
            }
            out.push(byte[0]);
        }
    }

    /// Read the five fixed record fields.
    pub fn read_fields(&mut self) -> Result<[u32; 5]> {
        let mut buf = [0u8; FIELDS_SIZE];
        self.read_exact(&mut buf)?;

        let mut fields = [0u32; 5];
        for (field, chunk) in fields.iter_mut().zip(buf.chunks_exact(4)) {
            *field = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Ok(fields)
    }
}

/// One raw header record, as stored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordHeader {
    /// Path bytes in archive form.
    pub path: Vec<u8>,
    /// Raw tag field.
    pub tag: u32,
    /// Original size field.
    pub original_size: u32,
    /// Offset field (0 = implicit).
    pub offset: u32,
    /// Timestamp field.
    pub timestamp: u32,
    /// Data size field.
    pub data_size: u32,
}

impl RecordHeader {
    /// The record terminating the header block.
    pub fn sentinel() -> Self {
        Self::default()
    }

    /// The metadata marker record.
    pub fn marker() -> Self {
        Self {
            tag: EntryKind::MetadataMarker.tag(),
            ..Self::default()
        }
    }

    /// Build the record persisted for `entry`.
    pub fn from_entry(entry: &Entry) -> Result<Self> {
        let offset = u32::try_from(entry.offset).map_err(|_| {
            PboError::overflow(format!("offset of {}", entry.path_lossy()), entry.offset)
        })?;

        Ok(Self {
            path: entry.path.clone(),
            tag: entry.kind.tag(),
            original_size: entry.original_size,
            offset,
            timestamp: entry.timestamp,
            data_size: entry.data_size,
        })
    }

    /// Read one record.
    pub fn read<R: Read + ?Sized>(
        cursor: &mut HeaderCursor<'_, R>,
        limits: &ReadLimits,
    ) -> Result<Self> {
        let path = cursor.read_cstring(limits.path, "path")?;
        let [tag, original_size, offset, timestamp, data_size] = cursor.read_fields()?;

        Ok(Self {
            path,
            tag,
            original_size,
            offset,
            timestamp,
            data_size,
        })
    }

    /// Classify the tag field.
    pub fn kind(&self) -> Result<EntryKind> {
        EntryKind::from_tag(self.tag).ok_or_else(|| {
            PboError::invalid_format(format!(
                "unknown entry tag {:02x?}",
                self.tag.to_le_bytes()
            ))
        })
    }

    /// Check if this record terminates the header block.
    pub fn is_sentinel(&self) -> bool {
        self.tag == 0 && self.path.is_empty()
    }

    /// Convert into an entry of the given kind.
    pub fn into_entry(self, kind: EntryKind) -> Entry {
        Entry {
            path: self.path,
            kind,
            original_size: self.original_size,
            offset: u64::from(self.offset),
            timestamp: self.timestamp,
            data_size: self.data_size,
        }
    }

    /// Serialize the record.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.path.len() + 1 + FIELDS_SIZE);
        push_cstring(&mut out, &self.path, "path")?;
        for field in [
            self.tag,
            self.original_size,
            self.offset,
            self.timestamp,
            self.data_size,
        ] {
            out.extend_from_slice(&field.to_le_bytes());
        }
        Ok(out)
    }

    /// Write the record.
    pub fn write<W: Write + ?Sized>(&self, writer: &mut W) -> Result<u64> {
        let bytes = self.to_bytes()?;
        writer.write_all(&bytes)?;
        Ok(bytes.len() as u64)
    }
}

/// Append a null-terminated string, rejecting embedded NUL bytes.
fn push_cstring(out: &mut Vec<u8>, s: &[u8], field: &'static str) -> Result<()> {
    if s.contains(&0) {
        return Err(PboError::invalid_argument(format!(
            "{field} contains a NUL byte: {}",
            String::from_utf8_lossy(s)
        )));
    }
    out.extend_from_slice(s);
    out.push(0);
    Ok(())
}

/// Read the property list following a metadata marker.
pub fn read_properties<R: Read + ?Sized>(
    cursor: &mut HeaderCursor<'_, R>,
    limits: &ReadLimits,
) -> Result<Vec<Property>> {
    let mut properties = Vec::new();

    loop {
        let key = cursor.read_cstring(limits.key, "property key")?;
        if key.is_empty() {
            return Ok(properties);
        }
        let value = cursor.read_cstring(limits.value, "property value")?;

        tracing::trace!(
            key = %String::from_utf8_lossy(&key),
            value = %String::from_utf8_lossy(&value),
            "read property"
        );
        properties.push(Property { key, value });
    }
}

/// Serialize a property list, including the empty-key terminator.
pub fn properties_to_bytes(properties: &[Property]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for property in properties {
        if property.key.is_empty() {
            return Err(PboError::invalid_argument("property key must not be empty"));
        }
        push_cstring(&mut out, &property.key, "property key")?;
        push_cstring(&mut out, &property.value, "property value")?;
    }
    out.push(0);
    Ok(out)
}

/// A parsed header block whose offsets are not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderBlock {
    /// Entries with their persisted offset fields.
    pub archive: Archive,
    /// Stream position immediately after the sentinel.
    pub body_start: u64,
}

/// Parse records up to and including the sentinel.
pub fn read_header_block<R: Read + ?Sized>(
    cursor: &mut HeaderCursor<'_, R>,
    limits: &ReadLimits,
) -> Result<HeaderBlock> {
    let mut archive = Archive::new();
    let mut first = true;

    loop {
        let record = RecordHeader::read(cursor, limits)?;
        let kind = record.kind()?;

        if record.is_sentinel() {
            break;
        }

        match kind {
            EntryKind::MetadataMarker => {
                if !first {
                    return Err(PboError::invalid_format(
                        "metadata marker is not the first record",
                    ));
                }
                if !record.path.is_empty() {
                    return Err(PboError::invalid_format(format!(
                        "metadata marker has non-empty path {}",
                        String::from_utf8_lossy(&record.path)
                    )));
                }
                archive.properties = read_properties(cursor, limits)?;
                tracing::debug!(count = archive.properties.len(), "read metadata block");
            }
            EntryKind::Regular => {
                tracing::debug!(
                    path = %String::from_utf8_lossy(&record.path),
                    size = record.data_size,
                    offset = record.offset,
                    "read entry"
                );
                archive.entries.push(record.into_entry(kind));
            }
        }

        first = false;
    }

    Ok(HeaderBlock {
        archive,
        body_start: cursor.position(),
    })
}

/// Assign every entry its absolute body position.
///
/// A persisted offset of zero means "right after the previous body"; a
/// non-zero offset repositions the running cursor. The cursor advances by
/// `data_size` after each entry. An explicit offset may point back at an
/// earlier body, so two entries can share one.
pub fn resolve_offsets(entries: &mut [Entry], body_start: u64) -> Result<()> {
    let mut cursor = body_start;

    for entry in entries.iter_mut() {
        if entry.offset == 0 {
            entry.offset = cursor;
        }
        cursor = entry.offset + u64::from(entry.data_size);

        if entry.original_size == 0 {
            match entry.kind {
                EntryKind::Regular => entry.original_size = entry.data_size,
                other => {
                    return Err(PboError::unsupported(format!(
                        "zero original size on {other} entry"
                    )));
                }
            }
        }
    }

    Ok(())
}

/// Parse a header block starting at stream position `start` and resolve
/// every entry's body offset.
pub fn read_archive<R: Read + ?Sized>(
    reader: &mut R,
    start: u64,
    limits: &ReadLimits,
) -> Result<Archive> {
    let mut cursor = HeaderCursor::new(reader, start);
    let HeaderBlock {
        mut archive,
        body_start,
    } = read_header_block(&mut cursor, limits)?;

    resolve_offsets(&mut archive.entries, body_start)?;
    Ok(archive)
}

/// Serialize the header block of `archive`: optional metadata marker and
/// properties, one record per entry, then the sentinel.
pub fn write_header_block<W: Write + ?Sized>(writer: &mut W, archive: &Archive) -> Result<u64> {
    let mut written = 0u64;

    if archive.has_metadata() {
        written += RecordHeader::marker().write(writer)?;
        let props = properties_to_bytes(&archive.properties)?;
        writer.write_all(&props)?;
        written += props.len() as u64;
    }

    for entry in &archive.entries {
        if !entry.is_regular() {
            return Err(PboError::invalid_argument(
                "metadata is written from the property list, not as an entry",
            ));
        }
        if entry.path.is_empty() {
            return Err(PboError::invalid_argument("entry path must not be empty"));
        }
        written += RecordHeader::from_entry(entry)?.write(writer)?;
    }

    written += RecordHeader::sentinel().write(writer)?;
    Ok(written)
}
