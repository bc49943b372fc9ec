//! Cask binary container format.
//!
//! A Cask file is a hierarchy of named groups holding named datasets,
//! written once and then frozen. This module provides the writer used by
//! the converter and the reader used by verification tooling.
//!
//! ## File Structure
//!
//! ```text
//! +------------------+
//! | Magic: "Cask\0"  |  5 bytes
//! +------------------+
//! | Frozen flag      |  1 byte (0x00 or 0xFF)
//! +------------------+
//! | Version          |  2 bytes (u16 LE)
//! +------------------+
//! | Root Group Pos   |  8 bytes (u64 LE)
//! +------------------+
//! | ... Records ...  |
//! +------------------+
//! ```
//!
//! Records are written child-before-parent; a group record holds a child
//! count, one tagged offset per child (MSB set = dataset), and the child
//! names. A dataset record holds an encoding tag and its payload.

mod format;
mod reader;
mod stream;
mod value;
mod writer;

pub use format::*;
pub use reader::{Entry, IContainer};
pub use value::{DatasetValue, Encoding};
pub use writer::OContainer;
