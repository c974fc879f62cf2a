//! # Leaf Page Elements
//!
//! A leaf page stores the terminal key/value pairs of the tree (or
//! sub-bucket markers). After the 16-byte page header comes an array of
//! `count` fixed-size leaf elements; the key and value bytes for each
//! element are packed back to back in the payload region that follows the
//! array.
//!
//! ## Leaf Element Layout (16 bytes, little-endian)
//!
//! ```text
//! Offset  Size  Field   Description
//! ------  ----  ------  ------------------------------------------
//! 0       4     flags   0x01 = sub-bucket marker (bucket layer's bit)
//! 4       4     pos     Offset to the key, FROM THIS ELEMENT'S START
//! 8       4     ksize   Key length in bytes
//! 12      4     vsize   Value length in bytes
//! ```
//!
//! ## Relative Addressing
//!
//! `pos` is measured from the element's own first byte, so the element
//! describes its payload without knowing where it sits in the array:
//!
//! ```text
//! page offset 16          32          48    [16 + pos]
//! +-----------+-----------+-----------+-----+-------------+----
//! | header    | element 0 | element 1 | ... | key0 value0 | key1 ...
//! +-----------+-----------+-----------+-----+-------------+----
//!             '------------- pos -----------'
//! ```
//!
//! The key occupies `[pos, pos+ksize)` and the value `[pos+ksize,
//! pos+ksize+vsize)`, both relative to the element. This is the persisted
//! format; the decoder re-derives it with slice arithmetic and never
//! converts to page-relative offsets.
//!
//! ## Zero-Copy Guarantees
//!
//! `LeafPage` and `LeafElement` borrow the page buffer with lifetime `'a`
//! and return `&'a [u8]` slices pointing directly into it. Reading a key
//! or value copies nothing; the views die with the buffer.

use eyre::{ensure, Result};
use zerocopy::little_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use super::{
    view, Page, PageHeader, BUCKET_LEAF_FLAG, LEAF_ELEMENT_SIZE, LEAF_PAGE_FLAG, PAGE_HEADER_SIZE,
};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct LeafPageElement {
    flags: U32,
    pos: U32,
    ksize: U32,
    vsize: U32,
}

const _: () = assert!(std::mem::size_of::<LeafPageElement>() == LEAF_ELEMENT_SIZE);

impl LeafPageElement {
    pub fn new(flags: u32, pos: u32, ksize: u32, vsize: u32) -> Self {
        Self {
            flags: U32::new(flags),
            pos: U32::new(pos),
            ksize: U32::new(ksize),
            vsize: U32::new(vsize),
        }
    }

    zerocopy_getters! {
        flags: u32,
        pos: u32,
        ksize: u32,
        vsize: u32,
    }

    pub fn is_bucket(&self) -> bool {
        self.flags() & BUCKET_LEAF_FLAG != 0
    }
}

/// Read-only view of a leaf page: the classified [`Page`] plus typed
/// access to its element array and payloads.
#[derive(Debug, Clone, Copy)]
pub struct LeafPage<'a> {
    page: Page<'a>,
}

/// One leaf element plus the buffer tail it resolves its payload against.
/// `data` starts at the element's own first byte, which is exactly the
/// base that `pos` is relative to.
#[derive(Debug, Clone, Copy)]
pub struct LeafElement<'a> {
    elem: &'a LeafPageElement,
    data: &'a [u8],
}

impl<'a> LeafPage<'a> {
    pub fn from_page(page: Page<'a>) -> Result<Self> {
        ensure!(
            page.flags() & LEAF_PAGE_FLAG != 0,
            "expected leaf page, got {} (page {})",
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
    pub fn elements(&self) -> Result<&'a [LeafPageElement]> {
        let count = self.count() as usize;
        if count == 0 {
            return Ok(&[]);
        }
        view::slice_at(self.page.data(), PAGE_HEADER_SIZE, count)
    }

    pub fn element(&self, index: usize) -> Result<LeafElement<'a>> {
        let count = self.count() as usize;
        ensure!(
            index < count,
            "leaf element index {} out of bounds (count={})",
            index,
            count
        );
        LeafElement::at(self.page.data(), PAGE_HEADER_SIZE + index * LEAF_ELEMENT_SIZE)
    }

    pub fn key_at(&self, index: usize) -> Result<&'a [u8]> {
        self.element(index)?.key()
    }

    pub fn value_at(&self, index: usize) -> Result<&'a [u8]> {
        self.element(index)?.value()
    }
}

impl<'a> LeafElement<'a> {
    fn at(page: &'a [u8], offset: usize) -> Result<Self> {
        ensure!(
            offset <= page.len(),
            "leaf element offset {} beyond page buffer ({} bytes)",
            offset,
            page.len()
        );
        let data = &page[offset..];
        let elem = view::struct_at::<LeafPageElement>(data, 0)?;
        Ok(Self { elem, data })
    }

    pub fn raw(&self) -> &'a LeafPageElement {
        self.elem
    }

    pub fn flags(&self) -> u32 {
        self.elem.flags()
    }

    pub fn pos(&self) -> u32 {
        self.elem.pos()
    }

    pub fn ksize(&self) -> u32 {
        self.elem.ksize()
    }

    pub fn vsize(&self) -> u32 {
        self.elem.vsize()
    }

    pub fn is_bucket(&self) -> bool {
        self.elem.is_bucket()
    }

    /// Key bytes, `[pos, pos+ksize)` relative to this element.
    pub fn key(&self) -> Result<&'a [u8]> {
        view::bytes_at(self.data, self.pos() as usize, self.ksize() as usize)
    }

    /// Value bytes, immediately after the key.
    pub fn value(&self) -> Result<&'a [u8]> {
        let start = self.pos() as usize + self.ksize() as usize;
        view::bytes_at(self.data, start, self.vsize() as usize)
    }
}

/// One entry for [`write_leaf_page`].
#[derive(Debug, Clone, Copy)]
pub struct LeafItem<'a> {
    pub flags: u32,
    pub key: &'a [u8],
    pub value: &'a [u8],
}

impl<'a> LeafItem<'a> {
    pub fn new(key: &'a [u8], value: &'a [u8]) -> Self {
        Self {
            flags: 0,
            key,
            value,
        }
    }

    pub fn bucket(key: &'a [u8], value: &'a [u8]) -> Self {
        Self {
            flags: BUCKET_LEAF_FLAG,
            key,
            value,
        }
    }
}

/// Serialize `items` into `data` as a leaf page: element array right after
/// the header, payloads packed key-then-value after the array, each
/// element's `pos` written relative to that element's own offset.
///
/// Sets the leaf flag and `count` in the header. The id and overflow
/// fields belong to the allocator and are left untouched. Items must
/// already be in the order the tree layer wants them stored.
pub fn write_leaf_page(data: &mut [u8], items: &[LeafItem<'_>]) -> Result<()> {
    ensure!(
        items.len() <= u16::MAX as usize,
        "too many leaf elements for one page: {}",
        items.len()
    );

    let payload: usize = items.iter().map(|i| i.key.len() + i.value.len()).sum();
    let needed = PAGE_HEADER_SIZE + items.len() * LEAF_ELEMENT_SIZE + payload;
    ensure!(
        needed <= data.len(),
        "leaf page needs {} bytes, buffer has {}",
        needed,
        data.len()
    );

    let header = PageHeader::from_bytes_mut(data)?;
    header.set_flags(header.flags() | LEAF_PAGE_FLAG);
    header.set_count(items.len() as u16);

    let mut elem_off = PAGE_HEADER_SIZE;
    let mut payload_off = PAGE_HEADER_SIZE + items.len() * LEAF_ELEMENT_SIZE;
    for item in items {
        let pos = (payload_off - elem_off) as u32;
        let elem =
            LeafPageElement::new(item.flags, pos, item.key.len() as u32, item.value.len() as u32);
        data[elem_off..elem_off + LEAF_ELEMENT_SIZE].copy_from_slice(elem.as_bytes());
        elem_off += LEAF_ELEMENT_SIZE;

        data[payload_off..payload_off + item.key.len()].copy_from_slice(item.key);
        payload_off += item.key.len();
        data[payload_off..payload_off + item.value.len()].copy_from_slice(item.value);
        payload_off += item.value.len();
    }

    Ok(())
}
