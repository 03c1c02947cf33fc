//! PBO archive format support.
//!
//! A PBO is a header block followed by the concatenated bodies of its
//! files, in header order:
//!
//! ```text
//! [marker + properties] entry* sentinel | body* (in header order)
//! ```
//!
//! Bodies are stored raw. Entries with a zero offset field sit right after
//! the previous body; see [`header::resolve_offsets`].

pub mod header;

pub use header::{HeaderBlock, HeaderCursor, RecordHeader};

use pbo_core::config::ReadLimits;
use pbo_core::copy::DataMover;
use pbo_core::entry::{Archive, Entry, Property};
use pbo_core::error::{PboError, Result};
use std::io::{Read, Seek, SeekFrom, Write};

/// PBO archive writer.
///
/// The header block is written first; bodies must then be supplied in
/// exactly the header order.
pub struct PboWriter<W: Write> {
    writer: W,
    mover: DataMover,
    bodies: Vec<Entry>,
    next_body: usize,
    header_written: bool,
    position: u64,
}

impl<W: Write> PboWriter<W> {
    /// Create a new PBO writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            mover: DataMover::new(),
            bodies: Vec::new(),
            next_body: 0,
            header_written: false,
            position: 0,
        }
    }

    /// Write the header block for `archive`.
    pub fn write_header(&mut self, archive: &Archive) -> Result<()> {
        if self.header_written {
            return Err(PboError::invalid_argument("header already written"));
        }

        self.position += header::write_header_block(&mut self.writer, archive)?;
        self.bodies = archive.regular_entries().cloned().collect();
        self.header_written = true;

        tracing::debug!(
            entries = self.bodies.len(),
            properties = archive.properties.len(),
            header_len = self.position,
            body_len = archive.body_size(),
            "wrote header block"
        );
        Ok(())
    }

    /// The entry whose body is expected next.
    pub fn next_entry(&self) -> Option<&Entry> {
        self.bodies.get(self.next_body)
    }

    /// Copy the next entry's body from `source`.
    ///
    /// Exactly `data_size` bytes are taken from `source`.
    pub fn write_body<R: Read + ?Sized>(&mut self, source: &mut R) -> Result<u64> {
        let entry = self.expect_body()?;
        let len = u64::from(entry.data_size);

        self.mover.copy(source, &mut self.writer, len)?;
        self.position += len;
        self.next_body += 1;
        Ok(len)
    }

    /// Write the next entry's body from memory.
    pub fn write_body_bytes(&mut self, data: &[u8]) -> Result<()> {
        let entry = self.expect_body()?;
        if data.len() as u64 != u64::from(entry.data_size) {
            return Err(PboError::invalid_argument(format!(
                "body for {} is {} bytes, header says {}",
                entry.path_lossy(),
                data.len(),
                entry.data_size
            )));
        }

        self.writer.write_all(data)?;
        self.position += data.len() as u64;
        self.next_body += 1;
        Ok(())
    }

    fn expect_body(&self) -> Result<&Entry> {
        if !self.header_written {
            return Err(PboError::invalid_argument("header not written yet"));
        }
        self.bodies
            .get(self.next_body)
            .ok_or_else(|| PboError::invalid_argument("all bodies already written"))
    }

    /// Bytes written so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Flush and return the inner writer.
    ///
    /// Fails if any body announced in the header is still missing.
    pub fn finish(mut self) -> Result<W> {
        if !self.header_written {
            return Err(PboError::invalid_argument("header not written"));
        }
        let missing = self.bodies.len() - self.next_body;
        if missing > 0 {
            return Err(PboError::invalid_argument(format!(
                "{missing} entry bodies not written"
            )));
        }

        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// PBO archive reader with extraction support.
pub struct PboReader<R: Read + Seek> {
    reader: R,
    archive: Archive,
    mover: DataMover,
}

impl<R: Read + Seek> PboReader<R> {
    /// Create a new PBO reader with the default string bounds.
    pub fn new(reader: R) -> Result<Self> {
        Self::with_limits(reader, ReadLimits::default())
    }

    /// Create a new PBO reader with explicit string bounds.
    ///
    /// The header block is read from the current stream position.
    pub fn with_limits(mut reader: R, limits: ReadLimits) -> Result<Self> {
        let start = reader.stream_position()?;
        let archive = header::read_archive(&mut reader, start, &limits)?;
        Ok(Self {
            reader,
            archive,
            mover: DataMover::new(),
        })
    }

    /// Get the parsed archive.
    pub fn archive(&self) -> &Archive {
        &self.archive
    }

    /// Get entries.
    pub fn entries(&self) -> &[Entry] {
        &self.archive.entries
    }

    /// Get metadata properties.
    pub fn properties(&self) -> &[Property] {
        &self.archive.properties
    }

    /// Extract an entry's body to a writer.
    pub fn extract<W: Write + ?Sized>(&mut self, entry: &Entry, writer: &mut W) -> Result<u64> {
        if !entry.is_regular() {
            return Err(PboError::unsupported(format!(
                "cannot extract {} entry",
                entry.kind
            )));
        }

        self.reader.seek(SeekFrom::Start(entry.offset))?;
        self.mover
            .copy(&mut self.reader, writer, u64::from(entry.data_size))
    }

    /// Extract an entry to a Vec.
    pub fn extract_to_vec(&mut self, entry: &Entry) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(entry.data_size as usize);
        self.extract(entry, &mut data)?;
        Ok(data)
    }

    /// Extract an entry by its archive-form path.
    pub fn extract_by_path(&mut self, path: &[u8]) -> Result<Option<Vec<u8>>> {
        let entry = self.archive.find(path).cloned();
        match entry {
            Some(e) => Ok(Some(self.extract_to_vec(&e)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Header for one entry "a.txt" (5 bytes) plus the body "hello".
    fn create_test_pbo() -> Vec<u8> {
        let mut data = b"a.txt\0".to_vec();
        for field in [0u32, 5, 0, 0, 5] {
            data.extend_from_slice(&field.to_le_bytes());
        }
        data.extend_from_slice(&[0u8; 21]);
        data.extend_from_slice(b"hello");
        data
    }

    #[test]
    fn test_pbo_reader() {
        let reader = PboReader::new(Cursor::new(create_test_pbo())).unwrap();

        assert_eq!(reader.entries().len(), 1);
        assert!(reader.properties().is_empty());
        let entry = &reader.entries()[0];
        assert_eq!(entry.path, b"a.txt");
        assert_eq!(entry.data_size, 5);
        assert_eq!(entry.offset, 6 + 20 + 21);
    }

    #[test]
    fn test_pbo_extraction() {
        let mut reader = PboReader::new(Cursor::new(create_test_pbo())).unwrap();
        let entry = reader.entries()[0].clone();
        assert_eq!(reader.extract_to_vec(&entry).unwrap(), b"hello");
    }

    #[test]
    fn test_pbo_reader_nonzero_start() {
        let mut data = b"JUNK".to_vec();
        data.extend(create_test_pbo());
        let mut cursor = Cursor::new(data);
        cursor.set_position(4);

        let mut reader = PboReader::new(cursor).unwrap();
        assert_eq!(reader.entries()[0].offset, 4 + 47);
        assert_eq!(reader.extract_by_path(b"a.txt").unwrap().unwrap(), b"hello");
        assert!(reader.extract_by_path(b"missing").unwrap().is_none());
    }

    #[test]
    fn test_pbo_truncated_body() {
        let mut data = create_test_pbo();
        data.truncate(data.len() - 2);

        let mut reader = PboReader::new(Cursor::new(data)).unwrap();
        let entry = reader.entries()[0].clone();
        let err = reader.extract_to_vec(&entry).unwrap_err();
        assert!(matches!(err, PboError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_pbo_writer_multiple_files() {
        let mut archive = Archive::from_entries(vec![
            Entry::regular(&b"file1.txt"[..], 9),
            Entry::regular(&b"dir\\file2.txt"[..], 19),
            Entry::regular(&b"empty.txt"[..], 0),
        ]);
        archive.properties.push(Property::new("prefix", "test"));

        let mut writer = PboWriter::new(Vec::new());
        writer.write_header(&archive).unwrap();
        writer.write_body_bytes(b"Content 1").unwrap();
        writer
            .write_body(&mut Cursor::new(b"Content 2 is longer".to_vec()))
            .unwrap();
        assert_eq!(writer.next_entry().unwrap().path, b"empty.txt");
        writer.write_body_bytes(b"").unwrap();
        assert!(writer.next_entry().is_none());
        let output = writer.finish().unwrap();

        let mut reader = PboReader::new(Cursor::new(output)).unwrap();
        assert_eq!(reader.entries().len(), 3);
        assert_eq!(reader.properties()[0].value, b"test");

        let data1 = reader.extract_by_path(b"file1.txt").unwrap().unwrap();
        let data2 = reader.extract_by_path(b"dir\\file2.txt").unwrap().unwrap();
        let data3 = reader.extract_by_path(b"empty.txt").unwrap().unwrap();
        assert_eq!(data1, b"Content 1");
        assert_eq!(data2, b"Content 2 is longer");
        assert!(data3.is_empty());
    }

    #[test]
    fn test_pbo_writer_order_enforced() {
        let archive = Archive::from_entries(vec![Entry::regular(&b"a"[..], 3)]);
        let mut writer = PboWriter::new(Vec::new());

        assert!(writer.write_body_bytes(b"abc").is_err());
        writer.write_header(&archive).unwrap();
        assert!(writer.write_header(&archive).is_err());
        assert!(writer.write_body_bytes(b"ab").is_err());
        writer.write_body_bytes(b"abc").unwrap();
        assert!(writer.write_body_bytes(b"abc").is_err());
        assert!(writer.finish().is_ok());
    }

    #[test]
    fn test_pbo_writer_missing_body() {
        let archive = Archive::from_entries(vec![Entry::regular(&b"a"[..], 3)]);
        let mut writer = PboWriter::new(Vec::new());
        writer.write_header(&archive).unwrap();

        let err = writer.finish().unwrap_err();
        assert!(matches!(err, PboError::InvalidArgument { .. }));
    }

    #[test]
    fn test_pbo_writer_short_source() {
        let archive = Archive::from_entries(vec![Entry::regular(&b"a"[..], 10)]);
        let mut writer = PboWriter::new(Vec::new());
        writer.write_header(&archive).unwrap();

        let err = writer
            .write_body(&mut Cursor::new(b"short".to_vec()))
            .unwrap_err();
        assert!(matches!(err, PboError::UnexpectedEof { .. }));
    }
}
