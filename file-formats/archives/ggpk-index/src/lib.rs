//! # ggpk_index - Archive Index and Patch Reconciliation
//!
//! Path-addressed access to game archives through a single [`Index`]
//! contract with two interchangeable backends:
//!
//! - [`BundleIndex`] for monolithic `_.index.bin` bundles, whose records are
//!   packed back to back and are rewritten as a whole
//! - [`StandaloneIndex`] for standalone archives, whose records are relocated
//!   one at a time
//!
//! [`ArchiveIndex::open`] picks the backend from the file name. On top of the
//! contract sit [`replace`], which applies a zip [`Payload`] to an index, and
//! [`extract_parallel`], which writes a subtree out over a rayon pool.
//!
//! ## Examples
//!
//! ```no_run
//! use ggpk_index::{ArchiveIndex, Flow, Payload, replace};
//!
//! # fn main() -> Result<(), ggpk_index::Error> {
//! let mut index = ArchiveIndex::open("Content.ggpk")?;
//! let payload = Payload::read("patch.zip")?;
//!
//! let summary = replace(&mut index, payload.entries()?, |_, path| {
//!     println!("Replaced: {path}");
//!     Flow::Continue
//! })?;
//! println!("{} files replaced", summary.replaced);
//! # Ok(())
//! # }
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod archive;
pub mod builder;
pub mod bundle;
pub mod error;
pub mod extract;
pub mod index;
mod io;
pub mod path;
pub mod payload;
pub mod record;
pub mod replace;
pub mod standalone;
pub mod tree;

pub use archive::{ArchiveIndex, BUNDLE_INDEX_FILE_NAME};
pub use builder::IndexBuilder;
pub use bundle::BundleIndex;
pub use error::{Error, Result};
pub use extract::{ExtractOptions, extract_parallel};
pub use index::{BackendKind, Index, WriteStrategy};
pub use payload::{Payload, PayloadEntries, PayloadEntry};
pub use record::{FileRecord, RecordTable};
pub use replace::{Flow, ReplaceSummary, replace, replace_file};
pub use standalone::StandaloneIndex;
pub use tree::{DirectoryNode, Node};
