//! Annotation file format: local on-disk copy of one LYTAF database

use crate::core::record::LytafSource;
use crate::core::temporal::{TimeRange, Timestamp};
use crate::error::{Error, Result};
use crate::storage::table::{AnnotationTable, EventRow, EventTypeRow};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use crc32fast::Hasher as Crc32Hasher;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Annotation file format version
pub const FILE_VERSION: u8 = 1;

/// Header size (64 bytes)
pub const HEADER_SIZE: usize = 64;

/// Magic number: "LYTAF"
pub const MAGIC: &[u8; 5] = b"LYTAF";

/// Compression level for ZSTD (1-22, higher = better compression but slower)
pub const ZSTD_COMPRESSION_LEVEL: i32 = 3;

/// Flag bits in AnnotationHeader.flags
pub const FLAG_COMPRESSED: u8 = 0x01; // Payload is compressed with ZSTD
pub const FLAG_EMPTY: u8 = 0x02; // No events, span fields are meaningless

/// Annotation file header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationHeader {
    pub source: LytafSource,
    pub first_begin: Timestamp,
    pub last_end: Timestamp,
    pub event_count: u32,
    pub type_count: u32,
    pub payload_size: u32,
    pub checksum: u32,
    pub flags: u8,
}

impl AnnotationHeader {
    /// Create a header for an empty file
    pub fn new(source: LytafSource) -> Self {
        Self {
            source,
            first_begin: Timestamp::from_nanos(0),
            last_end: Timestamp::from_nanos(0),
            event_count: 0,
            type_count: 0,
            payload_size: 0,
            checksum: 0,
            flags: FLAG_EMPTY,
        }
    }

    /// Time span covered by the stored events, `None` when there are none
    pub fn span(&self) -> Option<TimeRange> {
        if self.flags & FLAG_EMPTY != 0 {
            return None;
        }
        TimeRange::new(self.first_begin, self.last_end).ok()
    }

    /// Serialize header to bytes
    pub fn serialize(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(HEADER_SIZE);

        buf.put_slice(MAGIC);
        buf.put_u8(FILE_VERSION);
        buf.put_u8(self.source.tag());
        // Reserved
        buf.put_u8(0);
        buf.put_i64(self.first_begin.as_nanos());
        buf.put_i64(self.last_end.as_nanos());
        buf.put_u32(self.event_count);
        buf.put_u32(self.type_count);
        buf.put_u32(self.payload_size);
        buf.put_u32(self.checksum);
        buf.put_u8(self.flags);

        // Padding to 64 bytes: 5+1+1+1+8+8+4+4+4+4+1 = 41, need 23 more
        buf.put_bytes(0, 23);

        debug_assert_eq!(buf.len(), HEADER_SIZE);
        buf.freeze()
    }

    /// Deserialize header from bytes
    pub fn deserialize(mut buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(Error::Storage("Invalid header size".to_string()));
        }

        let magic = &buf[0..5];
        if magic != MAGIC {
            return Err(Error::Storage(format!("Invalid magic number: {:?}", magic)));
        }
        buf.advance(5);

        let version = buf.get_u8();
        if version != FILE_VERSION {
            return Err(Error::Storage(format!("Unsupported version: {}", version)));
        }

        let tag = buf.get_u8();
        let source = LytafSource::from_tag(tag)
            .ok_or_else(|| Error::Storage(format!("Unknown source tag: {}", tag)))?;
        buf.advance(1);

        let first_begin = Timestamp::from_nanos(buf.get_i64());
        let last_end = Timestamp::from_nanos(buf.get_i64());
        let event_count = buf.get_u32();
        let type_count = buf.get_u32();
        let payload_size = buf.get_u32();
        let checksum = buf.get_u32();
        let flags = buf.get_u8();

        Ok(Self {
            source,
            first_begin,
            last_end,
            event_count,
            type_count,
            payload_size,
            checksum,
            flags,
        })
    }
}

/// Annotation file writer.
///
/// Rows are buffered and written as one compressed payload by `finalize`.
/// The file is written under a temporary name and renamed into place, so a
/// reader never sees a half-written file.
pub struct AnnotationWriter {
    file: File,
    path: PathBuf,
    tmp_path: PathBuf,
    header: AnnotationHeader,
    table: AnnotationTable,
}

impl AnnotationWriter {
    /// Create a new annotation file
    pub fn create<P: AsRef<Path>>(path: P, source: LytafSource) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = path.with_extension("tmp");
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)?;

        let header = AnnotationHeader::new(source);
        file.write_all(&header.serialize())?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
            tmp_path,
            header,
            table: AnnotationTable::default(),
        })
    }

    /// Add an event-type row
    pub fn append_event_type(&mut self, row: EventTypeRow) {
        self.table.event_types.push(row);
        self.header.type_count += 1;
    }

    /// Add an event row
    pub fn append(&mut self, row: EventRow) -> Result<()> {
        if row.begin_time > row.end_time {
            return Err(Error::Temporal(format!(
                "Event row begins at {} after it ends at {}",
                row.begin_time, row.end_time
            )));
        }

        let begin = Timestamp::try_from_secs(row.begin_time)?;
        let end = Timestamp::try_from_secs(row.end_time)?;
        for secs in [row.insertion_time, row.reference_time] {
            Timestamp::try_from_secs(secs)?;
        }
        if self.header.flags & FLAG_EMPTY != 0 {
            self.header.first_begin = begin;
            self.header.last_end = end;
            self.header.flags &= !FLAG_EMPTY;
        } else {
            self.header.first_begin = self.header.first_begin.min(begin);
            self.header.last_end = self.header.last_end.max(end);
        }

        self.table.events.push(row);
        self.header.event_count += 1;
        Ok(())
    }

    /// Add every row of a table
    pub fn append_table(&mut self, table: &AnnotationTable) -> Result<()> {
        for row in &table.event_types {
            self.append_event_type(row.clone());
        }
        for row in &table.events {
            self.append(row.clone())?;
        }
        Ok(())
    }

    /// Finalize the file (write payload and header, then move into place).
    /// Returns the finalized header.
    pub fn finalize(self) -> Result<AnnotationHeader> {
        let AnnotationWriter {
            mut file,
            path,
            tmp_path,
            mut header,
            table,
        } = self;

        let serialized = bincode::serialize(&table)?;
        let compressed = zstd::encode_all(&serialized[..], ZSTD_COMPRESSION_LEVEL)
            .map_err(|e| Error::Storage(format!("ZSTD compression failed: {}", e)))?;

        let mut hasher = Crc32Hasher::new();
        hasher.update(&compressed);

        file.write_all(&compressed)?;

        header.payload_size = u32::try_from(compressed.len())
            .map_err(|_| Error::Storage("Annotation payload exceeds 4 GiB".to_string()))?;
        header.checksum = hasher.finalize();
        header.flags |= FLAG_COMPRESSED;

        file.seek(SeekFrom::Start(0))?;
        file.write_all(&header.serialize())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, &path)?;
        Ok(header)
    }

    /// Get current header
    pub fn header(&self) -> &AnnotationHeader {
        &self.header
    }
}

/// Write a whole table to `path` in one call
pub fn write_table<P: AsRef<Path>>(
    path: P,
    source: LytafSource,
    table: &AnnotationTable,
) -> Result<AnnotationHeader> {
    let mut writer = AnnotationWriter::create(path, source)?;
    writer.append_table(table)?;
    writer.finalize()
}

/// Annotation file reader
pub struct AnnotationReader {
    file: File,
    header: AnnotationHeader,
    path: PathBuf,
}

impl AnnotationReader {
    /// Open an existing annotation file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path)?;

        let mut header_buf = vec![0u8; HEADER_SIZE];
        file.read_exact(&mut header_buf)
            .map_err(|e| Error::Storage(format!("Truncated annotation header: {}", e)))?;
        let header = AnnotationHeader::deserialize(&header_buf)?;

        Ok(Self {
            file,
            header,
            path: path.to_path_buf(),
        })
    }

    /// Read and verify the stored table
    pub fn read_table(&mut self) -> Result<AnnotationTable> {
        self.file.seek(SeekFrom::Start(HEADER_SIZE as u64))?;

        let mut payload = vec![0u8; self.header.payload_size as usize];
        self.file
            .read_exact(&mut payload)
            .map_err(|e| Error::Storage(format!("Truncated annotation payload: {}", e)))?;

        let mut hasher = Crc32Hasher::new();
        hasher.update(&payload);
        let calculated = hasher.finalize();
        if calculated != self.header.checksum {
            return Err(Error::Storage(format!(
                "Checksum mismatch: expected {}, got {}",
                self.header.checksum, calculated
            )));
        }

        let serialized = if self.header.flags & FLAG_COMPRESSED != 0 {
            zstd::decode_all(&payload[..])
                .map_err(|e| Error::Storage(format!("ZSTD decompression failed: {}", e)))?
        } else {
            payload
        };

        let table: AnnotationTable = bincode::deserialize(&serialized)?;
        if table.events.len() != self.header.event_count as usize {
            return Err(Error::Storage(format!(
                "Event count mismatch: header says {}, payload has {}",
                self.header.event_count,
                table.events.len()
            )));
        }
        Ok(table)
    }

    /// Get file header
    pub fn header(&self) -> &AnnotationHeader {
        &self.header
    }

    /// Get file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}
