//! # pbo-archive
//!
//! PBO container support: the header block codec, random-access reading,
//! sequential writing, directory tree walking, and the create / list /
//! extract operations built on them.
//!
//! ## Example
//!
//! ```rust
//! use pbo_archive::{PboReader, PboWriter};
//! use pbo_core::{Archive, Entry};
//! use std::io::Cursor;
//!
//! let archive = Archive::from_entries(vec![Entry::regular(&b"a.txt"[..], 5)]);
//! let mut writer = PboWriter::new(Vec::new());
//! writer.write_header(&archive).unwrap();
//! writer.write_body_bytes(b"hello").unwrap();
//! let bytes = writer.finish().unwrap();
//!
//! let mut reader = PboReader::new(Cursor::new(bytes)).unwrap();
//! assert_eq!(reader.extract_by_path(b"a.txt").unwrap().unwrap(), b"hello");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod ops;
pub mod pbo;
pub mod tree;

// Re-exports
pub use ops::{
    CreateOptions, ExtractOptions, List, ListOptions, collect_files, create, create_with, extract,
    extract_entries, extract_with, list, write_archive,
};
pub use pbo::{PboReader, PboWriter, RecordHeader};
pub use tree::{SourceFile, TreeBuilder};
