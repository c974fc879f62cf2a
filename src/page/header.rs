//! # Page Header and Type Classification
//!
//! Every page begins with the same 16-byte header. The header names the
//! page (`id`), types it (`flags`), counts the fixed-size elements that
//! follow it (`count`), and records how many extra contiguous pages the
//! payload spills into (`overflow`).
//!
//! ## Header Layout (16 bytes, little-endian)
//!
//! ```text
//! Offset  Size  Field     Description
//! ------  ----  --------  -----------------------------------------
//! 0       8     id        Page identifier (u64)
//! 8       2     flags     Type bits: branch/leaf/meta/freelist
//! 10      2     count     Number of elements following the header
//! 12      4     overflow  Additional contiguous pages in this span
//! ```
//!
//! ## Classification
//!
//! `Page::kind()` turns the flag word into a typed view once, so callers
//! branch on a `PageKind` instead of re-casting raw bytes at every access.
//! Unrecognized flag words still format through `type_name()` for
//! diagnostics; only classification treats them as an error.
//!
//! ## Zero-Copy Access
//!
//! `PageHeader` is read in place from the buffer (`ref_from_bytes`), and
//! `Page` carries only the borrowed buffer plus the header reference parsed
//! at construction. Nothing in this module copies page bytes; `PageInfo` is
//! the one deliberate exception, an owned snapshot that survives the buffer
//! for logging and tooling.

use std::fmt;

use eyre::{bail, ensure, Result};
use zerocopy::little_endian::{U16, U32, U64};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::freelist::FreelistPage;

use super::{
    view, BranchPage, LeafPage, Meta, MetaPage, Pgid, BRANCH_PAGE_FLAG, FREELIST_PAGE_FLAG,
    LEAF_PAGE_FLAG, META_PAGE_FLAG, PAGE_HEADER_SIZE,
};

/// Page type decoded from the header's flag word.
///
/// The four known bits are tested in a fixed order, so a malformed header
/// with several bits set still classifies deterministically. A flag word
/// with none of the known bits set decodes as `Unknown` and keeps the raw
/// value for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    Branch,
    Leaf,
    Meta,
    Freelist,
    Unknown(u16),
}

impl PageType {
    pub fn from_flags(flags: u16) -> Self {
        if flags & BRANCH_PAGE_FLAG != 0 {
            PageType::Branch
        } else if flags & LEAF_PAGE_FLAG != 0 {
            PageType::Leaf
        } else if flags & META_PAGE_FLAG != 0 {
            PageType::Meta
        } else if flags & FREELIST_PAGE_FLAG != 0 {
            PageType::Freelist
        } else {
            PageType::Unknown(flags)
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageType::Branch => f.write_str("branch"),
            PageType::Leaf => f.write_str("leaf"),
            PageType::Meta => f.write_str("meta"),
            PageType::Freelist => f.write_str("freelist"),
            PageType::Unknown(flags) => write!(f, "unknown<{:02x}>", flags),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct PageHeader {
    id: U64,
    flags: U16,
    count: U16,
    overflow: U32,
}

const _: () = assert!(std::mem::size_of::<PageHeader>() == PAGE_HEADER_SIZE);

impl PageHeader {
    pub fn new(id: Pgid, flags: u16) -> Self {
        Self {
            id: U64::new(id),
            flags: U16::new(flags),
            count: U16::new(0),
            overflow: U32::new(0),
        }
    }

    pub fn from_bytes(data: &[u8]) -> Result<&Self> {
        ensure!(
            data.len() >= PAGE_HEADER_SIZE,
            "buffer too small for PageHeader: {} < {}",
            data.len(),
            PAGE_HEADER_SIZE
        );

        Self::ref_from_bytes(&data[..PAGE_HEADER_SIZE])
            .map_err(|e| eyre::eyre!("failed to read PageHeader: {:?}", e))
    }

    pub fn from_bytes_mut(data: &mut [u8]) -> Result<&mut Self> {
        ensure!(
            data.len() >= PAGE_HEADER_SIZE,
            "buffer too small for PageHeader: {} < {}",
            data.len(),
            PAGE_HEADER_SIZE
        );

        Self::mut_from_bytes(&mut data[..PAGE_HEADER_SIZE])
            .map_err(|e| eyre::eyre!("failed to read PageHeader: {:?}", e))
    }

    pub fn write_to(&self, data: &mut [u8]) -> Result<()> {
        ensure!(
            data.len() >= PAGE_HEADER_SIZE,
            "buffer too small for PageHeader: {} < {}",
            data.len(),
            PAGE_HEADER_SIZE
        );

        data[..PAGE_HEADER_SIZE].copy_from_slice(self.as_bytes());
        Ok(())
    }

    zerocopy_accessors! {
        id: u64,
        flags: u16,
        count: u16,
        overflow: u32,
    }

    pub fn page_type(&self) -> PageType {
        PageType::from_flags(self.flags())
    }

    /// Human-readable page type; falls back to `unknown<XX>` with the raw
    /// flag value so diagnostics stay usable for unrecognized pages.
    pub fn type_name(&self) -> String {
        self.page_type().to_string()
    }
}

/// Borrowed view of one page: the parsed header plus the raw buffer it
/// came from. The buffer covers the full `(1 + overflow) * page_size` span.
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
    header: &'a PageHeader,
    data: &'a [u8],
}

/// A page classified into its typed view. Built once by [`Page::kind`];
/// all variants alias the same borrowed buffer.
#[derive(Debug, Clone, Copy)]
pub enum PageKind<'a> {
    Branch(BranchPage<'a>),
    Leaf(LeafPage<'a>),
    Meta(MetaPage<'a>),
    Freelist(FreelistPage<'a>),
}

impl<'a> Page<'a> {
    pub fn from_bytes(data: &'a [u8]) -> Result<Self> {
        let header = PageHeader::from_bytes(data)?;
        Ok(Self { header, data })
    }

    pub fn header(&self) -> &'a PageHeader {
        self.header
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn id(&self) -> Pgid {
        self.header.id()
    }

    pub fn flags(&self) -> u16 {
        self.header.flags()
    }

    pub fn count(&self) -> u16 {
        self.header.count()
    }

    pub fn overflow(&self) -> u32 {
        self.header.overflow()
    }

    pub fn page_type(&self) -> PageType {
        self.header.page_type()
    }

    pub fn type_name(&self) -> String {
        self.header.type_name()
    }

    /// Classify this page by its flag word and wrap it in the matching
    /// typed view. Unknown flag words are an error here (unlike
    /// [`Page::type_name`], which always produces a string).
    pub fn kind(&self) -> Result<PageKind<'a>> {
        match self.page_type() {
            PageType::Branch => Ok(PageKind::Branch(BranchPage::from_page(*self)?)),
            PageType::Leaf => Ok(PageKind::Leaf(LeafPage::from_page(*self)?)),
            PageType::Meta => Ok(PageKind::Meta(MetaPage::from_page(*self)?)),
            PageType::Freelist => Ok(PageKind::Freelist(FreelistPage::from_page(*self)?)),
            PageType::Unknown(flags) => bail!(
                "cannot classify page {}: unknown type flags {:#06x}",
                self.id(),
                flags
            ),
        }
    }

    /// View the bytes immediately after the header as the meta struct.
    /// Computes the offset only; field semantics belong to the commit layer.
    pub fn as_meta(&self) -> Result<&'a Meta> {
        view::struct_at::<Meta>(self.data, PAGE_HEADER_SIZE)
    }

    /// First `n` bytes of the raw buffer (clamped to the buffer length),
    /// for diagnostic logging. No interpretation.
    pub fn hex_dump(&self, n: usize) -> &'a [u8] {
        &self.data[..n.min(self.data.len())]
    }

    /// Total byte span of this logical page for a given page size,
    /// accounting for overflow pages.
    pub fn buffer_len(&self, page_size: usize) -> usize {
        (1 + self.overflow() as usize) * page_size
    }

    pub fn info(&self) -> PageInfo {
        PageInfo {
            id: self.id(),
            type_name: self.type_name(),
            count: self.count() as usize,
            overflow_count: self.overflow() as usize,
        }
    }
}

/// Owned diagnostics snapshot of a page header. Safe to retain, log, or
/// serialize after the source buffer is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    pub id: Pgid,
    pub type_name: String,
    pub count: usize,
    pub overflow_count: usize,
}
