//! Archive entry metadata.
//!
//! This module defines the in-memory model of one archive: an ordered
//! sequence of [`Entry`] records plus the key/value [`Property`] list
//! carried by the optional metadata marker.

use crate::error::{PboError, Result};
use crate::path;
use std::borrow::Cow;
use std::path::{Component, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Tag value of a regular file record.
pub const REGULAR_TAG: u32 = 0;

/// Tag value of the metadata marker record ("Vers").
///
/// Stored little-endian, so the bytes on disk read `sreV`.
pub const MARKER_TAG: u32 = 0x5665_7273;

/// Kind of a header record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryKind {
    /// A file with a body in the data region.
    #[default]
    Regular,
    /// The metadata marker heading the property block.
    MetadataMarker,
}

impl EntryKind {
    /// Classify a raw tag field. Returns `None` for unknown tags.
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            REGULAR_TAG => Some(Self::Regular),
            MARKER_TAG => Some(Self::MetadataMarker),
            _ => None,
        }
    }

    /// The raw tag field for this kind.
    pub fn tag(self) -> u32 {
        match self {
            Self::Regular => REGULAR_TAG,
            Self::MetadataMarker => MARKER_TAG,
        }
    }

    /// Get the kind name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Regular => "Regular",
            Self::MetadataMarker => "Vers",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A key/value pair from the metadata block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Property key, never empty once materialized.
    pub key: Vec<u8>,
    /// Property value.
    pub value: Vec<u8>,
}

impl Property {
    /// Create a new property.
    pub fn new(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Key as (lossy) UTF-8.
    pub fn key_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.key)
    }

    /// Value as (lossy) UTF-8.
    pub fn value_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.value)
    }
}

/// One header record.
///
/// `path` is kept in archive form (backslash separated, no leading
/// separator). `offset` holds the persisted field until the reader
/// resolves it to an absolute stream position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Entry {
    /// Archive-relative path bytes.
    pub path: Vec<u8>,
    /// Record kind.
    pub kind: EntryKind,
    /// Size of the file content.
    pub original_size: u32,
    /// Body position in the archive stream (0 = implicit when persisted).
    pub offset: u64,
    /// Modification time in Unix seconds, 0 when not preserved.
    pub timestamp: u32,
    /// Number of body bytes stored in the archive.
    pub data_size: u32,
}

impl Entry {
    /// Create a regular file entry with equal original and data sizes.
    pub fn regular(path: impl Into<Vec<u8>>, size: u32) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Regular,
            original_size: size,
            offset: 0,
            timestamp: 0,
            data_size: size,
        }
    }

    /// Builder method to set the timestamp.
    pub fn with_timestamp(mut self, timestamp: u32) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Builder method to set an explicit body offset.
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Check if this is a regular file entry.
    pub fn is_regular(&self) -> bool {
        self.kind == EntryKind::Regular
    }

    /// Path as (lossy) UTF-8, in archive form.
    pub fn path_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.path)
    }

    /// Path translated to the host convention.
    pub fn host_path(&self) -> PathBuf {
        path::archive_to_host_path(&self.path)
    }

    /// Modification time, if one was recorded.
    pub fn modified(&self) -> Option<SystemTime> {
        if self.timestamp == 0 {
            None
        } else {
            Some(UNIX_EPOCH + Duration::from_secs(u64::from(self.timestamp)))
        }
    }

    /// Validate the entry path for extraction.
    ///
    /// Rejects empty paths, absolute paths, drive prefixes and `..`
    /// components.
    pub fn validate_path(&self) -> Result<()> {
        if self.path.is_empty() {
            return Err(PboError::path_traversal(""));
        }

        let host = self.host_path();
        if host.is_absolute() || host.has_root() {
            return Err(PboError::path_traversal(self.path_lossy()));
        }

        for component in host.components() {
            match component {
                Component::ParentDir | Component::Prefix(_) | Component::RootDir => {
                    return Err(PboError::path_traversal(self.path_lossy()));
                }
                Component::CurDir | Component::Normal(_) => {}
            }
        }

        Ok(())
    }
}

/// The structural contents of one archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Archive {
    /// Regular entries, in header (and body) order.
    pub entries: Vec<Entry>,
    /// Properties from the metadata block, in stream order.
    pub properties: Vec<Property>,
}

impl Archive {
    /// Create an empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an archive from an entry list.
    pub fn from_entries(entries: Vec<Entry>) -> Self {
        Self {
            entries,
            properties: Vec::new(),
        }
    }

    /// Get entries.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Get properties.
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Whether a metadata marker is (or will be) present.
    pub fn has_metadata(&self) -> bool {
        !self.properties.is_empty()
    }

    /// Look up the first property with the given key.
    pub fn property(&self, key: &[u8]) -> Option<&[u8]> {
        self.properties
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_slice())
    }

    /// Iterate regular file entries.
    pub fn regular_entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| e.is_regular())
    }

    /// Find an entry by its archive-form path.
    pub fn find(&self, path: &[u8]) -> Option<&Entry> {
        self.entries.iter().find(|e| e.path == path)
    }

    /// Normalize entries before serialization.
    ///
    /// Sets `data_size = original_size` (nothing is ever compressed) and
    /// zeroes timestamps unless they are to be preserved.
    pub fn normalize(&mut self, preserve_timestamps: bool) {
        for entry in &mut self.entries {
            entry.data_size = entry.original_size;
            if !preserve_timestamps {
                entry.timestamp = 0;
            }
        }
    }

    /// Total number of body bytes.
    pub fn body_size(&self) -> u64 {
        self.regular_entries().map(|e| u64::from(e.data_size)).sum()
    }
}
