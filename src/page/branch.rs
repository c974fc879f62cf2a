//! # Branch Page Elements
//!
//! A branch page is an interior tree node: an array of separator keys,
//! each paired with the id of the child page covering keys greater than or
//! equal to it. Branch elements carry no values; the key bytes live
//! out-of-line in the payload region, addressed the same way leaf payloads
//! are.
//!
//! ## Branch Element Layout (16 bytes, little-endian)
//!
//! ```text
//! Offset  Size  Field   Description
//! ------  ----  ------  ------------------------------------------
//! 0       4     pos     Offset to the key, FROM THIS ELEMENT'S START
//! 4       4     ksize   Key length in bytes
//! 8       8     pgid    Child page id this key routes to
//! ```
//!
//! `pos` is relative to the element's own first byte, exactly as in leaf
//! elements; see the leaf module docs for the layout diagram. Routing
//! semantics (which child covers which key range) belong to the tree
//! layer, not to this codec.

use eyre::{ensure, Result};
use zerocopy::little_endian::{U32, U64};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use super::{
    view, Page, PageHeader, Pgid, BRANCH_ELEMENT_SIZE, BRANCH_PAGE_FLAG, PAGE_HEADER_SIZE,
};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct BranchPageElement {
    pos: U32,
    ksize: U32,
    pgid: U64,
}

const _: () = assert!(std::mem::size_of::<BranchPageElement>() == BRANCH_ELEMENT_SIZE);

impl BranchPageElement {
    pub fn new(pos: u32, ksize: u32, pgid: Pgid) -> Self {
        Self {
            pos: U32::new(pos),
            ksize: U32::new(ksize),
            pgid: U64::new(pgid),
        }
    }

    zerocopy_getters! {
        pos: u32,
        ksize: u32,
        pgid: u64,
    }
}

/// Read-only view of a branch page.
#[derive(Debug, Clone, Copy)]
pub struct BranchPage<'a> {
    page: Page<'a>,
}

/// One branch element plus the buffer tail its `pos` resolves against.
#[derive(Debug, Clone, Copy)]
pub struct BranchElement<'a> {
    elem: &'a BranchPageElement,
    data: &'a [u8],
}

impl<'a> BranchPage<'a> {
    pub fn from_page(page: Page<'a>) -> Result<Self> {
        ensure!(
            page.flags() & BRANCH_PAGE_FLAG != 0,
            "expected branch page, got {} (page {})",
            page.type_name(),
            page.id()
        );
        Ok(Self { page })
    }

    pub fn from_bytes(data: &'a [u8]) -> Result<Self> {
        Self::from_page(Page::from_bytes(data)?)
    }

    pub fn page(&self) -> Page<'a> {
        self.page
    }

    pub fn count(&self) -> u16 {
        self.page.count()
    }

    /// The whole element array as one zero-copy slice. Empty when
    /// `count == 0`.
    pub fn elements(&self) -> Result<&'a [BranchPageElement]> {
        let count = self.count() as usize;
        if count == 0 {
            return Ok(&[]);
        }
        view::slice_at(self.page.data(), PAGE_HEADER_SIZE, count)
    }

    pub fn element(&self, index: usize) -> Result<BranchElement<'a>> {
        let count = self.count() as usize;
        ensure!(
            index < count,
            "branch element index {} out of bounds (count={})",
            index,
            count
        );
        BranchElement::at(
            self.page.data(),
            PAGE_HEADER_SIZE + index * BRANCH_ELEMENT_SIZE,
        )
    }

    pub fn key_at(&self, index: usize) -> Result<&'a [u8]> {
        self.element(index)?.key()
    }
}

impl<'a> BranchElement<'a> {
    fn at(page: &'a [u8], offset: usize) -> Result<Self> {
        ensure!(
            offset <= page.len(),
            "branch element offset {} beyond page buffer ({} bytes)",
            offset,
            page.len()
        );
        let data = &page[offset..];
        let elem = view::struct_at::<BranchPageElement>(data, 0)?;
        Ok(Self { elem, data })
    }

    pub fn raw(&self) -> &'a BranchPageElement {
        self.elem
    }

    pub fn pos(&self) -> u32 {
        self.elem.pos()
    }

    pub fn ksize(&self) -> u32 {
        self.elem.ksize()
    }

    /// Child page id this element routes to.
    pub fn pgid(&self) -> Pgid {
        self.elem.pgid()
    }

    /// Key bytes, `[pos, pos+ksize)` relative to this element.
    pub fn key(&self) -> Result<&'a [u8]> {
        view::bytes_at(self.data, self.pos() as usize, self.ksize() as usize)
    }
}

/// One entry for [`write_branch_page`].
#[derive(Debug, Clone, Copy)]
pub struct BranchItem<'a> {
    pub key: &'a [u8],
    pub pgid: Pgid,
}

impl<'a> BranchItem<'a> {
    pub fn new(key: &'a [u8], pgid: Pgid) -> Self {
        Self { key, pgid }
    }
}

/// Serialize `items` into `data` as a branch page: element array after the
/// header, key bytes packed after the array, each element's `pos` relative
/// to the element's own offset.
///
/// Sets the branch flag and `count` in the header; id and overflow are the
/// allocator's and are left untouched.
pub fn write_branch_page(data: &mut [u8], items: &[BranchItem<'_>]) -> Result<()> {
    ensure!(
        items.len() <= u16::MAX as usize,
        "too many branch elements for one page: {}",
        items.len()
    );

    let payload: usize = items.iter().map(|i| i.key.len()).sum();
    let needed = PAGE_HEADER_SIZE + items.len() * BRANCH_ELEMENT_SIZE + payload;
    ensure!(
        needed <= data.len(),
        "branch page needs {} bytes, buffer has {}",
        needed,
        data.len()
    );

    let header = PageHeader::from_bytes_mut(data)?;
    header.set_flags(header.flags() | BRANCH_PAGE_FLAG);
    header.set_count(items.len() as u16);

    let mut elem_off = PAGE_HEADER_SIZE;
    let mut payload_off = PAGE_HEADER_SIZE + items.len() * BRANCH_ELEMENT_SIZE;
    for item in items {
        let pos = (payload_off - elem_off) as u32;
        let elem = BranchPageElement::new(pos, item.key.len() as u32, item.pgid);
        data[elem_off..elem_off + BRANCH_ELEMENT_SIZE].copy_from_slice(elem.as_bytes());
        elem_off += BRANCH_ELEMENT_SIZE;

        data[payload_off..payload_off + item.key.len()].copy_from_slice(item.key);
        payload_off += item.key.len();
    }

    Ok(())
}
