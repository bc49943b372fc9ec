//! Cask format constants.

/// Magic bytes at the start of a Cask file.
pub const CASK_MAGIC: &[u8; 5] = b"Cask\0";

/// Size of the file header in bytes.
pub const HEADER_SIZE: usize = 16;

/// Offset of the frozen flag in the header.
pub const FROZEN_OFFSET: usize = 5;

/// Offset of the version in the header.
pub const VERSION_OFFSET: usize = 6;

/// Offset of the root group position in the header.
pub const ROOT_POS_OFFSET: usize = 8;

/// Current Cask format version.
pub const CURRENT_VERSION: u16 = 1;

/// Frozen flag value once the container is finalized.
pub const FROZEN_FLAG: u8 = 0xFF;

/// Frozen flag value while the container is still being written.
pub const NOT_FROZEN_FLAG: u8 = 0x00;

/// Bit mask for the kind flag in child offsets.
/// MSB set = dataset record, MSB clear = group record.
pub const KIND_FLAG_MASK: u64 = 1 << 63;

/// Mask to extract the actual file position from a child offset.
pub const OFFSET_MASK: u64 = !(1 << 63);

/// Check if a child offset points at a group record.
#[inline]
pub const fn is_group_offset(offset: u64) -> bool {
    (offset & KIND_FLAG_MASK) == 0
}

/// Check if a child offset points at a dataset record.
#[inline]
pub const fn is_dataset_offset(offset: u64) -> bool {
    (offset & KIND_FLAG_MASK) != 0
}

/// Extract the file position from a child offset.
#[inline]
pub const fn extract_offset(offset: u64) -> u64 {
    offset & OFFSET_MASK
}

/// Create a group child offset (MSB clear).
#[inline]
pub const fn make_group_offset(pos: u64) -> u64 {
    pos & OFFSET_MASK
}

/// Create a dataset child offset (MSB set).
#[inline]
pub const fn make_dataset_offset(pos: u64) -> u64 {
    pos | KIND_FLAG_MASK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic() {
        assert_eq!(&CASK_MAGIC[..4], b"Cask");
        assert_eq!(CASK_MAGIC.len(), 5);
    }

    #[test]
    fn test_offsets() {
        let group_offset = make_group_offset(0x1234);
        assert!(is_group_offset(group_offset));
        assert!(!is_dataset_offset(group_offset));
        assert_eq!(extract_offset(group_offset), 0x1234);

        let ds_offset = make_dataset_offset(0x5678);
        assert!(is_dataset_offset(ds_offset));
        assert!(!is_group_offset(ds_offset));
        assert_eq!(extract_offset(ds_offset), 0x5678);
        assert_eq!(ds_offset, 0x8000000000005678);
    }
}
