//! # stepcask
//!
//! Writes nested product attribute trees - the kind extracted from STEP
//! engineering-data files - into a hierarchical binary container of named
//! groups and datasets.
//!
//! Mappings become groups, scalars and homogeneous sequences become
//! natively-typed datasets, and anything a native encoding cannot hold is
//! stored as its canonical JSON text. The conversion is a single write-once
//! pass; the container is frozen on completion.
//!
//! ## Modules
//!
//! - [`util`] - Error handling
//! - [`node`] - Attribute tree model (maps, sequences, scalars)
//! - [`cask`] - Cask binary container format (writer and reader)
//! - [`convert`] - Tree walker and conversion driver
//! - [`extract`] - Pluggable attribute sources
//!
//! ## Example
//!
//! ```ignore
//! use stepcask::convert::convert_file;
//! use stepcask::extract::SampleExtractor;
//!
//! let summary = convert_file(
//!     &SampleExtractor,
//!     "example_part.step".as_ref(),
//!     "part_attributes.cask".as_ref(),
//! )?;
//! println!("{} datasets written", summary.datasets);
//! ```

pub mod cask;
pub mod convert;
pub mod extract;
pub mod node;
pub mod util;

// Re-export commonly used types
pub use node::{AttrMap, Node};
pub use util::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cask::{DatasetValue, Encoding, Entry, IContainer, OContainer};
    pub use crate::convert::{convert_file, write_entities, Summary};
    pub use crate::extract::{AttributeSource, SampleExtractor};
    pub use crate::node::{AttrMap, Node, SeqKind};
    pub use crate::util::{Error, Result};
}
