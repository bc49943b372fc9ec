//! Cask container writer.
//!
//! The writer is a builder: `create_group` and `create_dataset` assemble an
//! in-memory entry tree, and `finish` streams it out in one pass. Records
//! are written child-before-parent so every group record can carry the file
//! positions of its children; the root group position is patched into the
//! header last, then the frozen flag is set.
//!
//! A container that is dropped without `finish` is left with the frozen
//! flag clear and is rejected by the reader. No rollback is performed.

use std::path::Path;

use log::debug;

use super::format::*;
use super::stream::OStream;
use super::value::{DatasetValue, Encoding};
use crate::util::{Error, Result};

/// An entry pending write: a named group with children, or a dataset.
enum OEntry {
    Group(Vec<(String, OEntry)>),
    Dataset(DatasetValue),
}

impl OEntry {
    fn kind_name(&self) -> &'static str {
        match self {
            Self::Group(_) => "group",
            Self::Dataset(_) => "dataset",
        }
    }
}

/// Writable Cask container.
pub struct OContainer {
    stream: OStream,
    root: Vec<(String, OEntry)>,
}

impl OContainer {
    /// Create a new container file at the given path.
    ///
    /// The header is written immediately with the frozen flag clear; the
    /// record tree follows on [`OContainer::finish`].
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let mut stream = OStream::create(path.as_ref())?;

        stream.write_bytes(CASK_MAGIC)?;
        stream.write_u8(NOT_FROZEN_FLAG)?;
        stream.write_u16(CURRENT_VERSION)?;
        stream.write_u64(0)?; // root position, patched on finish

        debug!("created container at {}", path.as_ref().display());
        Ok(Self {
            stream,
            root: Vec::new(),
        })
    }

    /// Create a group at the given slash-delimited path.
    ///
    /// Every parent component must already exist as a group. An existing
    /// entry with the same name is replaced (last-write-wins).
    pub fn create_group(&mut self, path: &str) -> Result<()> {
        let (parent, name) = Self::split_path(path)?;
        let siblings = Self::resolve_group(&mut self.root, path, parent)?;
        Self::insert(siblings, name, OEntry::Group(Vec::new()));
        Ok(())
    }

    /// Create a dataset at the given slash-delimited path.
    ///
    /// The value must match the declared encoding; a mismatch is reported
    /// as [`Error::EncodingRejected`] without touching the entry tree.
    /// An existing entry with the same name is replaced (last-write-wins).
    pub fn create_dataset(
        &mut self,
        path: &str,
        value: DatasetValue,
        encoding: Encoding,
    ) -> Result<()> {
        if value.encoding() != encoding {
            return Err(Error::EncodingRejected {
                path: path.to_string(),
                declared: encoding.name().to_string(),
                actual: value.encoding().name().to_string(),
            });
        }

        let (parent, name) = Self::split_path(path)?;
        let siblings = Self::resolve_group(&mut self.root, path, parent)?;
        Self::insert(siblings, name, OEntry::Dataset(value));
        Ok(())
    }

    /// Write the record tree, patch the header, and freeze the container.
    pub fn finish(mut self) -> Result<()> {
        let root = std::mem::take(&mut self.root);
        let root_entry = OEntry::Group(root);
        let root_offset = Self::write_entry(&mut self.stream, &root_entry)?;

        self.stream.seek(ROOT_POS_OFFSET as u64)?;
        self.stream.write_u64(extract_offset(root_offset))?;
        self.stream.seek(FROZEN_OFFSET as u64)?;
        self.stream.write_u8(FROZEN_FLAG)?;
        self.stream.flush()?;

        debug!("container frozen, root record at {}", extract_offset(root_offset));
        Ok(())
    }

    /// Split a path into parent components and the final entry name.
    fn split_path(path: &str) -> Result<(Vec<&str>, &str)> {
        let mut parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
        match parts.pop() {
            Some(name) => Ok((parts, name)),
            None => Err(Error::invalid(format!("empty entry path: {path:?}"))),
        }
    }

    /// Walk parent components down the pending tree, failing if any is
    /// missing or is a dataset.
    fn resolve_group<'a>(
        root: &'a mut Vec<(String, OEntry)>,
        full_path: &str,
        components: Vec<&str>,
    ) -> Result<&'a mut Vec<(String, OEntry)>> {
        let mut current = root;
        for component in components {
            let entry = current
                .iter_mut()
                .find(|(name, _)| name == component)
                .map(|(_, entry)| entry)
                .ok_or_else(|| Error::GroupNotFound(full_path.to_string()))?;
            current = match entry {
                OEntry::Group(children) => children,
                OEntry::Dataset(_) => return Err(Error::NotAGroup(full_path.to_string())),
            };
        }
        Ok(current)
    }

    /// Insert an entry, replacing any existing sibling with the same name.
    fn insert(siblings: &mut Vec<(String, OEntry)>, name: &str, entry: OEntry) {
        if let Some(existing) = siblings.iter_mut().find(|(n, _)| n == name) {
            debug!(
                "replacing existing {} entry {:?} ({})",
                existing.1.kind_name(),
                name,
                entry.kind_name()
            );
            existing.1 = entry;
        } else {
            siblings.push((name.to_string(), entry));
        }
    }

    /// Write one entry record, post-order, returning its tagged offset.
    fn write_entry(stream: &mut OStream, entry: &OEntry) -> Result<u64> {
        match entry {
            OEntry::Dataset(value) => {
                let pos = stream.pos();
                Self::write_dataset(stream, value)?;
                Ok(make_dataset_offset(pos))
            }
            OEntry::Group(children) => {
                let mut offsets = Vec::with_capacity(children.len());
                for (_, child) in children {
                    offsets.push(Self::write_entry(stream, child)?);
                }

                let pos = stream.pos();
                stream.write_u64(children.len() as u64)?;
                for offset in &offsets {
                    stream.write_u64(*offset)?;
                }
                for (name, _) in children {
                    Self::write_name(stream, name)?;
                }
                Ok(make_group_offset(pos))
            }
        }
    }

    fn write_name(stream: &mut OStream, name: &str) -> Result<()> {
        let bytes = name.as_bytes();
        if bytes.len() > u16::MAX as usize {
            return Err(Error::invalid(format!(
                "entry name too long: {} bytes",
                bytes.len()
            )));
        }
        stream.write_u16(bytes.len() as u16)?;
        stream.write_bytes(bytes)
    }

    fn write_dataset(stream: &mut OStream, value: &DatasetValue) -> Result<()> {
        stream.write_u8(value.encoding() as u8)?;
        match value {
            DatasetValue::Int64(v) => stream.write_i64(*v),
            DatasetValue::Float64(v) => stream.write_f64(*v),
            DatasetValue::Bool(v) => stream.write_u8(*v as u8),
            DatasetValue::Utf8(v) => Self::write_string(stream, v),
            DatasetValue::Int64Array(items) => {
                stream.write_u64(items.len() as u64)?;
                for v in items {
                    stream.write_i64(*v)?;
                }
                Ok(())
            }
            DatasetValue::Float64Array(items) => {
                stream.write_u64(items.len() as u64)?;
                for v in items {
                    stream.write_f64(*v)?;
                }
                Ok(())
            }
            DatasetValue::BoolArray(items) => {
                stream.write_u64(items.len() as u64)?;
                for v in items {
                    stream.write_u8(*v as u8)?;
                }
                Ok(())
            }
            DatasetValue::Utf8Array(items) => {
                stream.write_u64(items.len() as u64)?;
                for v in items {
                    Self::write_string(stream, v)?;
                }
                Ok(())
            }
        }
    }

    fn write_string(stream: &mut OStream, value: &str) -> Result<()> {
        let bytes = value.as_bytes();
        if bytes.len() > u32::MAX as usize {
            return Err(Error::invalid(format!(
                "string payload too long: {} bytes",
                bytes.len()
            )));
        }
        stream.write_u32(bytes.len() as u32)?;
        stream.write_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut container = OContainer::create(dir.path().join("t.cask")).unwrap();

        let err = container
            .create_dataset(
                "mixed",
                DatasetValue::Utf8("[1, {}]".into()),
                Encoding::Int64Array,
            )
            .unwrap_err();
        assert!(err.is_encoding_rejection());

        // The rejected key can still be written with a matching encoding
        container
            .create_dataset("mixed", DatasetValue::Utf8("[1, {}]".into()), Encoding::Utf8)
            .unwrap();
        container.finish().unwrap();
    }

    #[test]
    fn test_missing_parent_group() {
        let dir = tempfile::tempdir().unwrap();
        let mut container = OContainer::create(dir.path().join("t.cask")).unwrap();

        let err = container
            .create_dataset("no_such/leaf", DatasetValue::Int64(1), Encoding::Int64)
            .unwrap_err();
        assert!(matches!(err, Error::GroupNotFound(_)));
    }

    #[test]
    fn test_dataset_is_not_a_group() {
        let dir = tempfile::tempdir().unwrap();
        let mut container = OContainer::create(dir.path().join("t.cask")).unwrap();

        container
            .create_dataset("leaf", DatasetValue::Int64(1), Encoding::Int64)
            .unwrap();
        let err = container.create_group("leaf/child").unwrap_err();
        assert!(matches!(err, Error::NotAGroup(_)));
    }
}
