//! Attribute tree to container conversion.
//!
//! One depth-first pass over the extracted attribute tree. Nested mappings
//! become groups, scalars and sequences become datasets. A sequence whose
//! elements all share one primitive category is written as a native array;
//! anything else collapses to a single dataset holding its canonical JSON
//! text. That collapse is a documented fidelity loss.
//!
//! Sequence homogeneity is decided by explicit classification before the
//! write, not by probing the backend. The writer can still reject a
//! declared encoding; when it does, the walker retries that one key with
//! the textual fallback and keeps going. Rejection never aborts the
//! traversal, every other error does.

use std::path::Path;

use log::{debug, info, warn};

use crate::cask::{DatasetValue, Encoding, OContainer};
use crate::extract::AttributeSource;
use crate::node::{AttrMap, Node, SeqKind};
use crate::util::{Error, Result};

/// Counters reported after a conversion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// Top-level entity groups created.
    pub entities: usize,
    /// Groups created below entity level.
    pub groups: usize,
    /// Datasets created.
    pub datasets: usize,
    /// Datasets that fell back to canonical text.
    pub fallbacks: usize,
}

/// Extract attributes from `input` and write them to a container at
/// `output`.
///
/// An empty extraction is not an error: nothing is written, no output file
/// is created, and the returned summary is all zeros.
pub fn convert_file(
    source: &dyn AttributeSource,
    input: &Path,
    output: &Path,
) -> Result<Summary> {
    let entities = source.extract(input)?;

    if entities.is_empty() {
        info!(
            "no attributes extracted from {}: nothing to do",
            input.display()
        );
        return Ok(Summary::default());
    }

    let mut container = OContainer::create(output)?;
    let summary = write_entities(&mut container, &entities)?;
    container.finish()?;

    info!(
        "wrote {}: {} entities, {} groups, {} datasets ({} text fallbacks)",
        output.display(),
        summary.entities,
        summary.groups,
        summary.datasets,
        summary.fallbacks
    );
    Ok(summary)
}

/// Write every entity of an extracted attribute map into an open container.
///
/// Each top-level entity becomes one child group of the root, never a bare
/// dataset, and its attribute tree is placed inside.
pub fn write_entities(container: &mut OContainer, entities: &AttrMap) -> Result<Summary> {
    let mut summary = Summary::default();

    for (entity, attrs) in entities.iter() {
        container.create_group(entity)?;
        summary.entities += 1;
        debug!("created entity group {entity:?}");

        match attrs {
            Node::Map(map) => {
                for (key, value) in map.iter() {
                    place(container, entity, key, value, &mut summary)?;
                }
            }
            other => {
                return Err(Error::invalid(format!(
                    "entity {entity:?}: attribute root must be a mapping, got {}",
                    other.kind_name()
                )))
            }
        }
    }

    Ok(summary)
}

/// Place one key-value pair under an existing parent group.
fn place(
    container: &mut OContainer,
    parent: &str,
    key: &str,
    value: &Node,
    summary: &mut Summary,
) -> Result<()> {
    let path = format!("{parent}/{key}");

    match value {
        Node::Map(map) => {
            container.create_group(&path)?;
            summary.groups += 1;
            for (child_key, child) in map.iter() {
                place(container, &path, child_key, child, summary)?;
            }
            Ok(())
        }
        Node::Seq(items) => {
            let (dataset, encoding) = match Node::classify_seq(items) {
                SeqKind::Int64 => (
                    DatasetValue::Int64Array(
                        items
                            .iter()
                            .map(|n| match n {
                                Node::Int(v) => *v,
                                _ => unreachable!("classified as int64"),
                            })
                            .collect(),
                    ),
                    Encoding::Int64Array,
                ),
                SeqKind::Float64 => (
                    DatasetValue::Float64Array(
                        items
                            .iter()
                            .map(|n| match n {
                                Node::Int(v) => *v as f64,
                                Node::Float(v) => *v,
                                _ => unreachable!("classified as float64"),
                            })
                            .collect(),
                    ),
                    Encoding::Float64Array,
                ),
                SeqKind::Bool => (
                    DatasetValue::BoolArray(
                        items
                            .iter()
                            .map(|n| match n {
                                Node::Bool(v) => *v,
                                _ => unreachable!("classified as bool"),
                            })
                            .collect(),
                    ),
                    Encoding::BoolArray,
                ),
                SeqKind::Text => (
                    DatasetValue::Utf8Array(
                        items
                            .iter()
                            .map(|n| match n {
                                Node::Text(v) => v.clone(),
                                _ => unreachable!("classified as text"),
                            })
                            .collect(),
                    ),
                    Encoding::Utf8Array,
                ),
                SeqKind::Opaque => {
                    debug!("sequence at {path:?} is not homogeneous, storing canonical text");
                    summary.fallbacks += 1;
                    write_dataset(
                        container,
                        &path,
                        DatasetValue::Utf8(value.canonical_text()),
                        Encoding::Utf8,
                    )?;
                    summary.datasets += 1;
                    return Ok(());
                }
            };

            write_with_fallback(container, &path, dataset, encoding, value, summary)?;
            summary.datasets += 1;
            Ok(())
        }
        Node::Int(v) => {
            write_with_fallback(
                container,
                &path,
                DatasetValue::Int64(*v),
                Encoding::Int64,
                value,
                summary,
            )?;
            summary.datasets += 1;
            Ok(())
        }
        Node::Float(v) => {
            write_with_fallback(
                container,
                &path,
                DatasetValue::Float64(*v),
                Encoding::Float64,
                value,
                summary,
            )?;
            summary.datasets += 1;
            Ok(())
        }
        Node::Bool(v) => {
            write_with_fallback(
                container,
                &path,
                DatasetValue::Bool(*v),
                Encoding::Bool,
                value,
                summary,
            )?;
            summary.datasets += 1;
            Ok(())
        }
        Node::Text(v) => {
            write_with_fallback(
                container,
                &path,
                DatasetValue::Utf8(v.clone()),
                Encoding::Utf8,
                value,
                summary,
            )?;
            summary.datasets += 1;
            Ok(())
        }
        Node::Null => {
            // Unrecognized scalar kinds land as canonical text
            write_dataset(
                container,
                &path,
                DatasetValue::Utf8(value.canonical_text()),
                Encoding::Utf8,
            )?;
            summary.datasets += 1;
            summary.fallbacks += 1;
            Ok(())
        }
    }
}

/// Write a dataset with its natively-typed encoding, retrying once with
/// the canonical-text fallback if the container rejects the encoding.
///
/// Classification normally guarantees acceptance, so the retry only fires
/// if classification and the writer's own validation ever diverge. The
/// rejection stays local to this one key.
fn write_with_fallback(
    container: &mut OContainer,
    path: &str,
    dataset: DatasetValue,
    encoding: Encoding,
    original: &Node,
    summary: &mut Summary,
) -> Result<()> {
    match container.create_dataset(path, dataset, encoding) {
        Ok(()) => Ok(()),
        Err(err) if err.is_encoding_rejection() => {
            warn!("{err}; storing canonical text instead");
            summary.fallbacks += 1;
            write_dataset(
                container,
                path,
                DatasetValue::Utf8(original.canonical_text()),
                Encoding::Utf8,
            )
        }
        Err(err) => Err(err),
    }
}

/// Write a dataset, wrapping any I/O failure with the key path.
fn write_dataset(
    container: &mut OContainer,
    path: &str,
    dataset: DatasetValue,
    encoding: Encoding,
) -> Result<()> {
    container
        .create_dataset(path, dataset, encoding)
        .map_err(|err| match err {
            Error::Io(e) => Error::WriteFailed {
                path: path.to_string(),
                reason: e.to_string(),
            },
            other => other,
        })
}
