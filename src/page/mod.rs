//! # Page Format Module
//!
//! This module defines the on-disk page format for DenKV and the zero-copy
//! views used to read it. Every page in the data file begins with a 16-byte
//! header; what follows depends on the page type recorded in the header's
//! flag word.
//!
//! ## Page Layout
//!
//! ```text
//! +--------------------------+
//! | PageHeader (16 bytes)    |
//! |   id, flags, count,      |
//! |   overflow               |
//! +--------------------------+
//! | Element array            |  <- count fixed-size entries (branch/leaf),
//! |                          |     or the id array (freelist),
//! |                          |     or the Meta struct (meta)
//! +--------------------------+
//! | Payload region           |  <- keys and values, packed back to back,
//! |                          |     addressed by each element's own pos
//! +--------------------------+
//! ```
//!
//! A logical page occupies `(1 + overflow) * page_size` contiguous bytes, so
//! a payload larger than one page spills into the following physical pages
//! and stays addressable through ordinary offsets.
//!
//! ## Page Types
//!
//! The header's flag word carries one type bit per page kind:
//!
//! - **Branch** (0x01): interior B+Tree node, keys plus child page ids
//! - **Leaf** (0x02): terminal B+Tree node, key/value pairs or sub-bucket
//!   markers
//! - **Meta** (0x04): database root metadata, written by the commit layer
//! - **Freelist** (0x10): the persisted list of free page ids
//!
//! ## Relative Element Offsets
//!
//! Branch and leaf elements address their payload with a `pos` offset
//! measured from the element's own first byte, not from the page start. An
//! element is therefore self-describing wherever it sits in the array, and
//! the stored format is identical no matter how the array is traversed.
//! This is part of the persisted contract and is never rewritten in terms
//! of page-relative offsets.
//!
//! ## Zero-Copy Access
//!
//! All decoding goes through `zerocopy` reinterpretation of borrowed bytes.
//! Views (`Page`, `LeafPage`, `BranchPage`, element views) hold `&'a [u8]`
//! and hand out `&'a [u8]` slices of keys and values; nothing is copied and
//! no view can outlive the buffer it was created from. The persisted structs
//! use little-endian field types with no alignment requirement, so views
//! work on any buffer, including read-only memory maps and odd offsets.
//!
//! ## Module Organization
//!
//! - `header`: `PageHeader`, type classification, `Page` view, diagnostics
//! - `branch`: branch element layout, views, and the branch page encoder
//! - `leaf`: leaf element layout, views, and the leaf page encoder
//! - `meta`: the meta-page struct layout
//! - `view`: bounds-checked byte-reinterpretation primitives
//!
//! ## Thread Safety
//!
//! Everything here is plain data plus borrowed views; there is no interior
//! mutability and no synchronization. A page buffer must not be mutated
//! while read views derived from it are alive, which the borrow checker
//! enforces within one owner and the transaction layer enforces across
//! copy-on-write remaps.

mod branch;
mod header;
mod leaf;
mod meta;
pub(crate) mod view;

pub use branch::{write_branch_page, BranchElement, BranchItem, BranchPage, BranchPageElement};
pub use header::{Page, PageHeader, PageInfo, PageKind, PageType};
pub use leaf::{write_leaf_page, LeafElement, LeafItem, LeafPage, LeafPageElement};
pub use meta::{write_meta_page, Meta, MetaPage, META_MAGIC, META_SIZE, META_VERSION};

/// Page identifier: the ordinal of a fixed-size page slot in the data file.
pub type Pgid = u64;

/// Default page size used by tooling and tests. Real buffers may use any
/// size the storage layer chooses; decoding never assumes this value.
pub const DEFAULT_PAGE_SIZE: usize = 4096;

pub const PAGE_HEADER_SIZE: usize = 16;
pub const BRANCH_ELEMENT_SIZE: usize = 16;
pub const LEAF_ELEMENT_SIZE: usize = 16;

pub const BRANCH_PAGE_FLAG: u16 = 0x01;
pub const LEAF_PAGE_FLAG: u16 = 0x02;
pub const META_PAGE_FLAG: u16 = 0x04;
pub const FREELIST_PAGE_FLAG: u16 = 0x10;

/// Set in a leaf element's flag word when the entry names a sub-bucket
/// rather than a plain value. Owned and interpreted by the bucket layer.
pub const BUCKET_LEAF_FLAG: u32 = 0x01;

/// The tree layer never lets a usable branch/leaf page drop below this many
/// keys; split and merge sizing is computed against it.
pub const MIN_KEYS_PER_PAGE: usize = 2;
