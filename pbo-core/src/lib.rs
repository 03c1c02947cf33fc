//! # pbo-core
//!
//! Core components for reading and writing PBO ("packed bank of files")
//! archives.
//!
//! This crate provides the leaves the container codec is built from:
//!
//! - [`entry`]: Entry, property and archive model
//! - [`path`]: Archive/host path translation
//! - [`copy`]: Bounded stream-to-stream body copying
//! - [`config`]: String bounds for the header reader
//! - [`error`]: Error types
//!
//! ## Example
//!
//! ```rust
//! use pbo_core::copy::copy_exact;
//! use pbo_core::path::to_archive;
//! use std::io::Cursor;
//!
//! let mut body = Cursor::new(b"hello world".to_vec());
//! let mut out = Vec::new();
//! copy_exact(&mut body, &mut out, 5).unwrap();
//! assert_eq!(out, b"hello");
//!
//! #[cfg(unix)]
//! assert_eq!(to_archive(b"addons/config.cpp"), b"addons\\config.cpp");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod copy;
pub mod entry;
pub mod error;
pub mod path;

// Re-exports for convenience
pub use config::{ReadLimits, StringLimit};
pub use copy::{COPY_BUFFER_SIZE, DataMover, copy_exact};
pub use entry::{Archive, Entry, EntryKind, MARKER_TAG, Property, REGULAR_TAG};
pub use error::{ErrorKind, PboError, Result};
