//! # Meta Page Layout
//!
//! A meta page records the database roots the commit layer swaps between
//! on every copy-on-write transaction. This module pins the byte layout
//! and offers typed field access; validation of magic, version, and
//! checksum is the commit layer's job, as is every field's meaning.
//!
//! ## Meta Layout (64 bytes at page offset 16, little-endian)
//!
//! ```text
//! Offset  Size  Field          Description
//! ------  ----  -------------  --------------------------------------
//! 16      4     magic          File format marker
//! 20      4     version        Format version
//! 24      4     page_size      Page size the file was written with
//! 28      4     flags          Reserved
//! 32      8     root           Root bucket's page id
//! 40      8     root_sequence  Root bucket's sequence counter
//! 48      8     freelist       Page id of the persisted freelist
//! 56      8     high_water     One past the highest allocated page id
//! 64      8     txid           Transaction id that wrote this meta
//! 72      8     checksum       Commit-layer checksum over the fields
//! ```

use eyre::{ensure, Result};
use zerocopy::little_endian::{U32, U64};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use super::{Page, PageHeader, META_PAGE_FLAG, PAGE_HEADER_SIZE};

pub const META_SIZE: usize = 64;

pub const META_MAGIC: u32 = 0xDE4B_C0DE;
pub const META_VERSION: u32 = 1;

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct Meta {
    magic: U32,
    version: U32,
    page_size: U32,
    flags: U32,
    root: U64,
    root_sequence: U64,
    freelist: U64,
    high_water: U64,
    txid: U64,
    checksum: U64,
}

const _: () = assert!(std::mem::size_of::<Meta>() == META_SIZE);

impl Meta {
    pub fn new(page_size: u32) -> Self {
        Self {
            magic: U32::new(META_MAGIC),
            version: U32::new(META_VERSION),
            page_size: U32::new(page_size),
            flags: U32::new(0),
            root: U64::new(0),
            root_sequence: U64::new(0),
            freelist: U64::new(0),
            high_water: U64::new(0),
            txid: U64::new(0),
            checksum: U64::new(0),
        }
    }

    zerocopy_accessors! {
        magic: u32,
        version: u32,
        page_size: u32,
        flags: u32,
        root: u64,
        root_sequence: u64,
        freelist: u64,
        high_water: u64,
        txid: u64,
        checksum: u64,
    }
}

/// Read-only view of a meta page: the classified [`Page`] plus the typed
/// meta struct parsed once at construction.
#[derive(Debug, Clone, Copy)]
pub struct MetaPage<'a> {
    page: Page<'a>,
    meta: &'a Meta,
}

impl<'a> MetaPage<'a> {
    pub fn from_page(page: Page<'a>) -> Result<Self> {
        ensure!(
            page.flags() & META_PAGE_FLAG != 0,
            "expected meta page, got {} (page {})",
            page.type_name(),
            page.id()
        );
        let meta = page.as_meta()?;
        Ok(Self { page, meta })
    }

    pub fn from_bytes(data: &'a [u8]) -> Result<Self> {
        Self::from_page(Page::from_bytes(data)?)
    }

    pub fn page(&self) -> Page<'a> {
        self.page
    }

    pub fn meta(&self) -> &'a Meta {
        self.meta
    }
}

/// Serialize `meta` into `data` as a meta page: sets the meta flag,
/// zeroes `count`, and copies the struct to its offset. The page id is
/// the allocator's and is left untouched.
pub fn write_meta_page(data: &mut [u8], meta: &Meta) -> Result<()> {
    ensure!(
        PAGE_HEADER_SIZE + META_SIZE <= data.len(),
        "meta page needs {} bytes, buffer has {}",
        PAGE_HEADER_SIZE + META_SIZE,
        data.len()
    );

    let header = PageHeader::from_bytes_mut(data)?;
    header.set_flags(header.flags() | META_PAGE_FLAG);
    header.set_count(0);

    data[PAGE_HEADER_SIZE..PAGE_HEADER_SIZE + META_SIZE].copy_from_slice(meta.as_bytes());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::DEFAULT_PAGE_SIZE;
    use super::*;

    #[test]
    fn meta_size_is_64_bytes() {
        assert_eq!(size_of::<Meta>(), 64);
    }

    #[test]
    fn meta_layout_matches_disk_format() {
        let mut bytes = [0u8; 64];
        bytes[..4].copy_from_slice(&META_MAGIC.to_le_bytes());
        bytes[4..8].copy_from_slice(&1u32.to_le_bytes());
        bytes[8..12].copy_from_slice(&4096u32.to_le_bytes());
        bytes[16..24].copy_from_slice(&3u64.to_le_bytes());
        bytes[24..32].copy_from_slice(&9u64.to_le_bytes());
        bytes[32..40].copy_from_slice(&2u64.to_le_bytes());
        bytes[40..48].copy_from_slice(&8u64.to_le_bytes());
        bytes[48..56].copy_from_slice(&41u64.to_le_bytes());
        bytes[56..64].copy_from_slice(&0xFEEDFACEu64.to_le_bytes());

        let meta = Meta::read_from_bytes(&bytes[..]).unwrap();

        assert_eq!(meta.magic(), META_MAGIC);
        assert_eq!(meta.version(), 1);
        assert_eq!(meta.page_size(), 4096);
        assert_eq!(meta.flags(), 0);
        assert_eq!(meta.root(), 3);
        assert_eq!(meta.root_sequence(), 9);
        assert_eq!(meta.freelist(), 2);
        assert_eq!(meta.high_water(), 8);
        assert_eq!(meta.txid(), 41);
        assert_eq!(meta.checksum(), 0xFEEDFACE);
    }

    #[test]
    fn meta_struct_sits_right_after_the_header() {
        let mut data = vec![0u8; DEFAULT_PAGE_SIZE];
        write_meta_page(&mut data, &Meta::new(DEFAULT_PAGE_SIZE as u32)).unwrap();

        assert_eq!(&data[16..20], &META_MAGIC.to_le_bytes());

        let page = Page::from_bytes(&data).unwrap();
        assert_eq!(page.as_meta().unwrap().page_size(), DEFAULT_PAGE_SIZE as u32);
    }

    #[test]
    fn write_then_read_round_trip() {
        let mut meta = Meta::new(DEFAULT_PAGE_SIZE as u32);
        meta.set_root(5);
        meta.set_root_sequence(2);
        meta.set_freelist(3);
        meta.set_high_water(12);
        meta.set_txid(77);
        meta.set_checksum(0xC0FFEE);

        let mut data = vec![0u8; DEFAULT_PAGE_SIZE];
        PageHeader::from_bytes_mut(&mut data).unwrap().set_id(1);
        write_meta_page(&mut data, &meta).unwrap();

        let view = MetaPage::from_bytes(&data).unwrap();
        assert_eq!(view.page().id(), 1);
        assert_eq!(view.page().type_name(), "meta");
        assert_eq!(view.meta().magic(), META_MAGIC);
        assert_eq!(view.meta().version(), META_VERSION);
        assert_eq!(view.meta().root(), 5);
        assert_eq!(view.meta().root_sequence(), 2);
        assert_eq!(view.meta().freelist(), 3);
        assert_eq!(view.meta().high_water(), 12);
        assert_eq!(view.meta().txid(), 77);
        assert_eq!(view.meta().checksum(), 0xC0FFEE);
    }

    #[test]
    fn wrong_page_type_is_error() {
        let mut data = vec![0u8; DEFAULT_PAGE_SIZE];
        PageHeader::from_bytes_mut(&mut data)
            .unwrap()
            .set_flags(super::super::LEAF_PAGE_FLAG);

        let result = MetaPage::from_bytes(&data);

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("expected meta"));
    }

    #[test]
    fn meta_view_requires_room_for_the_struct() {
        let mut data = vec![0u8; PAGE_HEADER_SIZE + META_SIZE - 1];
        PageHeader::from_bytes_mut(&mut data)
            .unwrap()
            .set_flags(META_PAGE_FLAG);

        assert!(MetaPage::from_bytes(&data).is_err());
        assert!(write_meta_page(&mut data, &Meta::new(4096)).is_err());
    }
}
