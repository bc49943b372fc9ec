//! Cask container reader.
//!
//! Memory-mapped, read-only access to a finalized container. Used by the
//! verification dump and by tests; the converter itself never reads.

use std::fs::File;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use memmap2::Mmap;

use super::format::*;
use super::value::{DatasetValue, Encoding};
use crate::util::{Error, Result};

/// One entry observed during read traversal.
#[derive(Clone, Debug, PartialEq)]
pub enum Entry {
    /// A named group.
    Group,
    /// A named dataset with its decoded value.
    Dataset(DatasetValue),
}

impl Entry {
    /// True if this entry is a group.
    #[inline]
    pub fn is_group(&self) -> bool {
        matches!(self, Entry::Group)
    }
}

/// Readable Cask container.
#[derive(Debug)]
pub struct IContainer {
    mmap: Mmap,
    version: u16,
    root_pos: u64,
}

impl IContainer {
    /// Open and validate a container file.
    ///
    /// Fails with [`Error::NotFrozen`] if the file was never finalized.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;

        let size = file.metadata()?.len();
        if size < HEADER_SIZE as u64 {
            return Err(Error::UnexpectedEof(size));
        }

        // Safety: file is opened read-only for the lifetime of the map
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| Error::MmapFailed(e.to_string()))?;

        if &mmap[0..5] != CASK_MAGIC {
            return Err(Error::InvalidMagic);
        }
        if mmap[FROZEN_OFFSET] != FROZEN_FLAG {
            return Err(Error::NotFrozen);
        }
        let version = LittleEndian::read_u16(&mmap[VERSION_OFFSET..VERSION_OFFSET + 2]);
        if version != CURRENT_VERSION {
            return Err(Error::UnsupportedVersion(version));
        }
        let root_pos = LittleEndian::read_u64(&mmap[ROOT_POS_OFFSET..ROOT_POS_OFFSET + 8]);

        Ok(Self {
            mmap,
            version,
            root_pos,
        })
    }

    /// Get the format version.
    #[inline]
    pub fn version(&self) -> u16 {
        self.version
    }

    /// Visit every entry depth-first in stored order.
    ///
    /// The visitor receives the absolute slash-delimited path and the
    /// decoded entry.
    pub fn for_each_entry<F>(&self, mut visitor: F) -> Result<()>
    where
        F: FnMut(&str, &Entry),
    {
        self.visit_group(self.root_pos, "", &mut visitor)
    }

    /// Look up a single entry by slash-delimited path.
    pub fn entry(&self, path: &str) -> Result<Entry> {
        let mut pos = self.root_pos;
        let components: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
        if components.is_empty() {
            return Ok(Entry::Group);
        }

        for (depth, component) in components.iter().enumerate() {
            let children = self.read_group(pos)?;
            let (_, offset) = children
                .into_iter()
                .find(|(name, _)| name == component)
                .ok_or_else(|| Error::EntryNotFound(path.to_string()))?;

            let last = depth == components.len() - 1;
            if is_dataset_offset(offset) {
                if !last {
                    return Err(Error::NotAGroup(path.to_string()));
                }
                return Ok(Entry::Dataset(self.read_dataset(extract_offset(offset))?));
            }
            pos = extract_offset(offset);
        }
        Ok(Entry::Group)
    }

    /// Read a dataset value by path.
    pub fn dataset(&self, path: &str) -> Result<DatasetValue> {
        match self.entry(path)? {
            Entry::Dataset(value) => Ok(value),
            Entry::Group => Err(Error::TypeMismatch {
                expected: "dataset".to_string(),
                actual: "group".to_string(),
            }),
        }
    }

    /// Child entry names of a group, in stored order.
    pub fn child_names(&self, path: &str) -> Result<Vec<String>> {
        let pos = match self.entry(path)? {
            Entry::Group => self.group_pos(path)?,
            Entry::Dataset(_) => return Err(Error::NotAGroup(path.to_string())),
        };
        Ok(self
            .read_group(pos)?
            .into_iter()
            .map(|(name, _)| name)
            .collect())
    }

    fn group_pos(&self, path: &str) -> Result<u64> {
        let mut pos = self.root_pos;
        for component in path.split('/').filter(|p| !p.is_empty()) {
            let children = self.read_group(pos)?;
            let (_, offset) = children
                .into_iter()
                .find(|(name, _)| name == component)
                .ok_or_else(|| Error::GroupNotFound(path.to_string()))?;
            if is_dataset_offset(offset) {
                return Err(Error::NotAGroup(path.to_string()));
            }
            pos = extract_offset(offset);
        }
        Ok(pos)
    }

    fn visit_group<F>(&self, pos: u64, prefix: &str, visitor: &mut F) -> Result<()>
    where
        F: FnMut(&str, &Entry),
    {
        for (name, offset) in self.read_group(pos)? {
            let path = format!("{prefix}/{name}");
            if is_group_offset(offset) {
                visitor(&path, &Entry::Group);
                self.visit_group(extract_offset(offset), &path, visitor)?;
            } else {
                let value = self.read_dataset(extract_offset(offset))?;
                visitor(&path, &Entry::Dataset(value));
            }
        }
        Ok(())
    }

    /// Parse a group record: child names with tagged offsets, stored order.
    fn read_group(&self, pos: u64) -> Result<Vec<(String, u64)>> {
        let mut cursor = pos;
        let count = self.read_u64(&mut cursor)? as usize;

        let mut offsets = Vec::with_capacity(self.capped_capacity(cursor, count, 8));
        for _ in 0..count {
            offsets.push(self.read_u64(&mut cursor)?);
        }

        let mut children = Vec::with_capacity(offsets.len());
        for offset in offsets {
            let len = self.read_u16(&mut cursor)? as usize;
            let bytes = self.read_bytes(&mut cursor, len)?;
            children.push((String::from_utf8(bytes.to_vec())?, offset));
        }
        Ok(children)
    }

    /// Parse a dataset record at the given position.
    fn read_dataset(&self, pos: u64) -> Result<DatasetValue> {
        let mut cursor = pos;
        let encoding = Encoding::from_u8(self.read_u8(&mut cursor)?)?;

        Ok(match encoding {
            Encoding::Int64 => DatasetValue::Int64(self.read_u64(&mut cursor)? as i64),
            Encoding::Float64 => DatasetValue::Float64(f64::from_bits(self.read_u64(&mut cursor)?)),
            Encoding::Bool => DatasetValue::Bool(self.read_u8(&mut cursor)? != 0),
            Encoding::Utf8 => DatasetValue::Utf8(self.read_string(&mut cursor)?),
            Encoding::Int64Array => {
                let count = self.read_u64(&mut cursor)? as usize;
                let mut items = Vec::with_capacity(self.capped_capacity(cursor, count, 8));
                for _ in 0..count {
                    items.push(self.read_u64(&mut cursor)? as i64);
                }
                DatasetValue::Int64Array(items)
            }
            Encoding::Float64Array => {
                let count = self.read_u64(&mut cursor)? as usize;
                let mut items = Vec::with_capacity(self.capped_capacity(cursor, count, 8));
                for _ in 0..count {
                    items.push(f64::from_bits(self.read_u64(&mut cursor)?));
                }
                DatasetValue::Float64Array(items)
            }
            Encoding::BoolArray => {
                let count = self.read_u64(&mut cursor)? as usize;
                let bytes = self.read_bytes(&mut cursor, count)?;
                DatasetValue::BoolArray(bytes.iter().map(|b| *b != 0).collect())
            }
            Encoding::Utf8Array => {
                let count = self.read_u64(&mut cursor)? as usize;
                let mut items = Vec::with_capacity(self.capped_capacity(cursor, count, 4));
                for _ in 0..count {
                    items.push(self.read_string(&mut cursor)?);
                }
                DatasetValue::Utf8Array(items)
            }
        })
    }

    /// Preallocation bound for a count read from the file: no more elements
    /// than the bytes remaining after the cursor could possibly hold. A
    /// corrupt count then fails on a bounds-checked element read instead of
    /// triggering a huge allocation up front.
    fn capped_capacity(&self, cursor: u64, count: usize, elem_size: usize) -> usize {
        let remaining = self.mmap.len().saturating_sub(cursor as usize);
        count.min(remaining / elem_size)
    }

    fn read_string(&self, cursor: &mut u64) -> Result<String> {
        let len = self.read_u32(cursor)? as usize;
        let bytes = self.read_bytes(cursor, len)?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    fn read_bytes(&self, cursor: &mut u64, len: usize) -> Result<&[u8]> {
        let start = *cursor as usize;
        let end = start
            .checked_add(len)
            .ok_or(Error::UnexpectedEof(u64::MAX))?;
        if end > self.mmap.len() {
            return Err(Error::UnexpectedEof(end as u64));
        }
        *cursor += len as u64;
        Ok(&self.mmap[start..end])
    }

    fn read_u8(&self, cursor: &mut u64) -> Result<u8> {
        Ok(self.read_bytes(cursor, 1)?[0])
    }

    fn read_u16(&self, cursor: &mut u64) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.read_bytes(cursor, 2)?))
    }

    fn read_u32(&self, cursor: &mut u64) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.read_bytes(cursor, 4)?))
    }

    fn read_u64(&self, cursor: &mut u64) -> Result<u64> {
        Ok(LittleEndian::read_u64(self.read_bytes(cursor, 8)?))
    }
}
