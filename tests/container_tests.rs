//! Integration tests for the Cask container format itself.

use std::fs;
use std::io::Write;

use stepcask::cask::{DatasetValue, Encoding, Entry, IContainer, OContainer};
use stepcask::Error;

use tempfile::tempdir;

#[test]
fn test_scalar_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scalars.cask");

    {
        let mut container = OContainer::create(&path).unwrap();
        container.create_group("g").unwrap();
        container
            .create_dataset("g/int", DatasetValue::Int64(-42), Encoding::Int64)
            .unwrap();
        container
            .create_dataset("g/float", DatasetValue::Float64(3.25), Encoding::Float64)
            .unwrap();
        container
            .create_dataset("g/flag", DatasetValue::Bool(true), Encoding::Bool)
            .unwrap();
        container
            .create_dataset(
                "g/text",
                DatasetValue::Utf8("héllo".into()),
                Encoding::Utf8,
            )
            .unwrap();
        container.finish().unwrap();
    }

    let container = IContainer::open(&path).unwrap();
    assert_eq!(container.dataset("g/int").unwrap(), DatasetValue::Int64(-42));
    assert_eq!(
        container.dataset("g/float").unwrap(),
        DatasetValue::Float64(3.25)
    );
    assert_eq!(container.dataset("g/flag").unwrap(), DatasetValue::Bool(true));
    assert_eq!(
        container.dataset("g/text").unwrap(),
        DatasetValue::Utf8("héllo".into())
    );
}

#[test]
fn test_unfinished_container_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("unfinished.cask");

    {
        let mut container = OContainer::create(&path).unwrap();
        container.create_group("g").unwrap();
        // Dropped without finish: frozen flag stays clear
    }

    let err = IContainer::open(&path).unwrap_err();
    assert!(matches!(err, Error::NotFrozen));
}

#[test]
fn test_invalid_magic_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bogus.cask");

    let mut file = fs::File::create(&path).unwrap();
    file.write_all(b"not a cask file at all").unwrap();
    drop(file);

    let err = IContainer::open(&path).unwrap_err();
    assert!(matches!(err, Error::InvalidMagic));
}

#[test]
fn test_truncated_file_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tiny.cask");
    fs::write(&path, b"Cask").unwrap();

    let err = IContainer::open(&path).unwrap_err();
    assert!(matches!(err, Error::UnexpectedEof(_)));
}

#[test]
fn test_missing_file() {
    let err = IContainer::open("/no/such/file.cask").unwrap_err();
    assert!(matches!(err, Error::FileNotFound(_)));
}

#[test]
fn test_duplicate_name_last_write_wins() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dupes.cask");

    {
        let mut container = OContainer::create(&path).unwrap();
        container
            .create_dataset("key", DatasetValue::Int64(1), Encoding::Int64)
            .unwrap();
        container
            .create_dataset("key", DatasetValue::Utf8("two".into()), Encoding::Utf8)
            .unwrap();
        container.finish().unwrap();
    }

    let container = IContainer::open(&path).unwrap();
    assert_eq!(container.child_names("").unwrap(), vec!["key"]);
    assert_eq!(
        container.dataset("key").unwrap(),
        DatasetValue::Utf8("two".into())
    );
}

#[test]
fn test_deep_hierarchy_traversal_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("deep.cask");

    {
        let mut container = OContainer::create(&path).unwrap();
        container.create_group("a").unwrap();
        container.create_group("a/b").unwrap();
        container.create_group("a/b/c").unwrap();
        container
            .create_dataset("a/b/c/leaf", DatasetValue::Int64(7), Encoding::Int64)
            .unwrap();
        container
            .create_dataset("a/sibling", DatasetValue::Bool(false), Encoding::Bool)
            .unwrap();
        container.finish().unwrap();
    }

    let container = IContainer::open(&path).unwrap();
    let mut paths = Vec::new();
    container
        .for_each_entry(|p, _| paths.push(p.to_string()))
        .unwrap();
    assert_eq!(paths, vec!["/a", "/a/b", "/a/b/c", "/a/b/c/leaf", "/a/sibling"]);

    assert_eq!(
        container.entry("a/b/c/leaf").unwrap(),
        Entry::Dataset(DatasetValue::Int64(7))
    );
    assert_eq!(container.entry("a/b").unwrap(), Entry::Group);
    assert!(matches!(
        container.entry("a/nope").unwrap_err(),
        Error::EntryNotFound(_)
    ));
}

#[test]
fn test_corrupt_child_count_fails_cleanly() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("corrupt_count.cask");

    // Valid header pointing at a group record whose child count far
    // exceeds what the file could hold
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"Cask\0");
    bytes.push(0xFF);
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&16u64.to_le_bytes());
    bytes.extend_from_slice(&u64::MAX.to_le_bytes());
    fs::write(&path, &bytes).unwrap();

    let container = IContainer::open(&path).unwrap();
    let err = container.child_names("").unwrap_err();
    assert!(matches!(err, Error::UnexpectedEof(_)));
}

#[test]
fn test_corrupt_array_count_fails_cleanly() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("corrupt_array.cask");

    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"Cask\0");
    bytes.push(0xFF);
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&25u64.to_le_bytes());
    // Dataset record at 16: int64 array claiming u64::MAX elements
    bytes.push(4);
    bytes.extend_from_slice(&u64::MAX.to_le_bytes());
    // Root group record at 25 with one dataset child named "d"
    bytes.extend_from_slice(&1u64.to_le_bytes());
    bytes.extend_from_slice(&(16u64 | (1 << 63)).to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.push(b'd');
    fs::write(&path, &bytes).unwrap();

    let container = IContainer::open(&path).unwrap();
    let err = container.dataset("d").unwrap_err();
    assert!(matches!(err, Error::UnexpectedEof(_)));
}

#[test]
fn test_empty_sequence_dataset() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty_arrays.cask");

    {
        let mut container = OContainer::create(&path).unwrap();
        container
            .create_dataset(
                "empty_text",
                DatasetValue::Utf8Array(Vec::new()),
                Encoding::Utf8Array,
            )
            .unwrap();
        container
            .create_dataset(
                "empty_ints",
                DatasetValue::Int64Array(Vec::new()),
                Encoding::Int64Array,
            )
            .unwrap();
        container.finish().unwrap();
    }

    let container = IContainer::open(&path).unwrap();
    assert_eq!(
        container.dataset("empty_text").unwrap(),
        DatasetValue::Utf8Array(Vec::new())
    );
    assert_eq!(
        container.dataset("empty_ints").unwrap(),
        DatasetValue::Int64Array(Vec::new())
    );
}
