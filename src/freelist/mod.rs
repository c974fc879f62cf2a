//! # Freelist Persistence and Page-Id Merge
//!
//! Pages freed by committed transactions go back into a free list that the
//! allocator reuses before growing the file. This module owns the two
//! format-level pieces of that machinery: the on-page encoding of the id
//! list and the sorted merge that combines id sequences.
//!
//! ## Freelist Page Layout
//!
//! A freelist page stores little-endian `u64` page ids directly after the
//! 16-byte header. The header's `count` field is only 16 bits, so a list
//! of 65535 ids or more is stored with a sentinel:
//!
//! ```text
//! count < 0xFFFF:
//! +-----------+------------------------------+
//! | header    | id[0] id[1] ... id[count-1]  |
//! +-----------+------------------------------+
//!
//! count == 0xFFFF:
//! +-----------+-----------+------------------+
//! | header    | real count| id[0] id[1] ...  |
//! |           | (u64)     |                  |
//! +-----------+-----------+------------------+
//! ```
//!
//! ## Merging Sorted Id Lists
//!
//! Combining the stable free list with a transaction's pending-free list
//! is the hot path. The two inputs are usually wildly different in length,
//! so [`merge_page_ids`] gallops: it binary-searches how far the current
//! leader runs before the other list's head fits, copies that whole run,
//! and swaps roles. For skewed inputs the comparison count drops toward
//! `O(min(n,m) * log(max(n,m)))`; for balanced inputs it degrades to an
//! ordinary linear merge.

use eyre::{ensure, Result};
use zerocopy::little_endian::U64;
use zerocopy::IntoBytes;

use crate::page::{view, Page, PageHeader, Pgid, FREELIST_PAGE_FLAG, PAGE_HEADER_SIZE};

/// Header `count` value marking an oversized id list whose real count is
/// stored as the first u64 of the element area.
pub const FREELIST_COUNT_SENTINEL: u16 = 0xFFFF;

/// Merge the sorted id sequences `a` and `b` into `dst`, preserving
/// duplicates (multiset merge) and the relative order of equal ids from
/// the same input. Only the first `a.len() + b.len()` slots of `dst` are
/// written; `dst` is never read.
///
/// # Panics
///
/// Panics when `dst` is shorter than `a.len() + b.len()`. That is a caller
/// bug, not a runtime condition, and must not be silently absorbed.
pub fn merge_page_ids(dst: &mut [Pgid], a: &[Pgid], b: &[Pgid]) {
    assert!(
        dst.len() >= a.len() + b.len(),
        "merge destination too small: {} < {} + {}",
        dst.len(),
        a.len(),
        b.len()
    );

    if a.is_empty() {
        dst[..b.len()].copy_from_slice(b);
        return;
    }
    if b.is_empty() {
        dst[..a.len()].copy_from_slice(a);
        return;
    }

    // Lead is whichever input starts lower; it always holds the next id
    // to copy out.
    let (mut lead, mut follow) = if b[0] < a[0] { (b, a) } else { (a, b) };

    let mut out = 0;
    loop {
        // Largest prefix of lead that stays at or below follow's head.
        let n = lead.partition_point(|&id| id <= follow[0]);
        dst[out..out + n].copy_from_slice(&lead[..n]);
        out += n;
        if n >= lead.len() {
            break;
        }

        let rest = &lead[n..];
        lead = follow;
        follow = rest;
    }

    dst[out..out + follow.len()].copy_from_slice(follow);
}

/// Allocating convenience over [`merge_page_ids`]: sizes the destination
/// exactly and returns it.
pub fn merge(a: &[Pgid], b: &[Pgid]) -> Vec<Pgid> {
    if a.is_empty() {
        return b.to_vec();
    }
    if b.is_empty() {
        return a.to_vec();
    }
    let mut merged = vec![0; a.len() + b.len()];
    merge_page_ids(&mut merged, a, b);
    merged
}

/// Read-only view of a freelist page.
#[derive(Debug, Clone, Copy)]
pub struct FreelistPage<'a> {
    page: Page<'a>,
}

impl<'a> FreelistPage<'a> {
    pub fn from_page(page: Page<'a>) -> Result<Self> {
        ensure!(
            page.flags() & FREELIST_PAGE_FLAG != 0,
            "expected freelist page, got {} (page {})",
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

    /// Number of ids stored on this page, resolving the sentinel.
    pub fn id_count(&self) -> Result<usize> {
        let (_, count) = self.layout()?;
        Ok(count)
    }

    /// The stored ids, copied out. The bookkeeping layer owns its own
    /// mutable, sorted copy; handing out an owned `Vec` keeps the page
    /// buffer free to be remapped or reused underneath it.
    pub fn page_ids(&self) -> Result<Vec<Pgid>> {
        let (offset, count) = self.layout()?;
        if count == 0 {
            return Ok(Vec::new());
        }
        let ids: &[U64] = view::slice_at(self.page.data(), offset, count)?;
        Ok(ids.iter().map(|id| id.get()).collect())
    }

    /// Byte offset of the first id and the resolved id count.
    fn layout(&self) -> Result<(usize, usize)> {
        let count = self.page.count();
        if count == FREELIST_COUNT_SENTINEL {
            let real = view::struct_at::<U64>(self.page.data(), PAGE_HEADER_SIZE)?;
            Ok((PAGE_HEADER_SIZE + size_of::<U64>(), real.get() as usize))
        } else {
            Ok((PAGE_HEADER_SIZE, count as usize))
        }
    }
}

/// Serialize `ids` into `data` as a freelist page, using the sentinel
/// encoding when the list does not fit the 16-bit header count. Sets the
/// freelist flag; id and overflow are the allocator's and are left
/// untouched. Ids are stored in the order given (the bookkeeping layer
/// keeps its list sorted).
pub fn write_freelist_page(data: &mut [u8], ids: &[Pgid]) -> Result<()> {
    let oversized = ids.len() >= FREELIST_COUNT_SENTINEL as usize;
    let prefix = if oversized { size_of::<U64>() } else { 0 };
    let needed = PAGE_HEADER_SIZE + prefix + ids.len() * size_of::<U64>();
    ensure!(
        needed <= data.len(),
        "freelist page needs {} bytes, buffer has {}",
        needed,
        data.len()
    );

    let header = PageHeader::from_bytes_mut(data)?;
    header.set_flags(header.flags() | FREELIST_PAGE_FLAG);

    let mut offset = PAGE_HEADER_SIZE;
    if oversized {
        header.set_count(FREELIST_COUNT_SENTINEL);
        *view::struct_at_mut::<U64>(data, offset)? = U64::new(ids.len() as u64);
        offset += 8;
    } else {
        header.set_count(ids.len() as u16);
    }

    for id in ids {
        data[offset..offset + 8].copy_from_slice(U64::new(*id).as_bytes());
        offset += 8;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::DEFAULT_PAGE_SIZE;

    #[test]
    fn merge_interleaves_and_keeps_duplicates() {
        let a = [1, 3, 5, 9];
        let b = [2, 3, 6];
        let mut dst = [0; 7];

        merge_page_ids(&mut dst, &a, &b);

        assert_eq!(dst, [1, 2, 3, 3, 5, 6, 9]);
    }

    #[test]
    fn merge_with_empty_input_copies_the_other() {
        let mut dst = [0; 2];
        merge_page_ids(&mut dst, &[], &[4, 5]);
        assert_eq!(dst, [4, 5]);

        let mut dst = [0; 2];
        merge_page_ids(&mut dst, &[4, 5], &[]);
        assert_eq!(dst, [4, 5]);

        let mut dst: [Pgid; 0] = [];
        merge_page_ids(&mut dst, &[], &[]);
    }

    #[test]
    fn merge_single_elements() {
        let mut dst = [0; 2];
        merge_page_ids(&mut dst, &[7], &[2]);
        assert_eq!(dst, [2, 7]);

        let mut dst = [0; 2];
        merge_page_ids(&mut dst, &[2], &[2]);
        assert_eq!(dst, [2, 2]);
    }

    #[test]
    fn merge_disjoint_ranges_either_order() {
        let mut dst = [0; 5];
        merge_page_ids(&mut dst, &[1, 2, 3], &[10, 11]);
        assert_eq!(dst, [1, 2, 3, 10, 11]);

        let mut dst = [0; 5];
        merge_page_ids(&mut dst, &[10, 11], &[1, 2, 3]);
        assert_eq!(dst, [1, 2, 3, 10, 11]);
    }

    #[test]
    fn merge_fully_interleaved() {
        let mut dst = [0; 6];
        merge_page_ids(&mut dst, &[1, 3, 5], &[2, 4, 6]);
        assert_eq!(dst, [1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn merge_skewed_inputs() {
        let big: Vec<Pgid> = (0..1000).map(|i| i * 2).collect();
        let small = [3, 501, 1999];
        let mut dst = vec![0; big.len() + small.len()];

        merge_page_ids(&mut dst, &big, &small);

        let mut expected = big.clone();
        expected.extend_from_slice(&small);
        expected.sort_unstable();
        assert_eq!(dst, expected);
    }

    #[test]
    fn merge_duplicates_within_one_input() {
        let mut dst = [0; 4];
        merge_page_ids(&mut dst, &[1, 1, 2], &[1]);
        assert_eq!(dst, [1, 1, 1, 2]);
    }

    #[test]
    fn merge_leaves_destination_tail_untouched() {
        let mut dst = [99; 6];
        merge_page_ids(&mut dst, &[1, 3], &[2]);
        assert_eq!(dst, [1, 2, 3, 99, 99, 99]);
    }

    #[test]
    #[should_panic(expected = "merge destination too small")]
    fn merge_panics_when_destination_one_short() {
        let mut dst = [0; 6];
        merge_page_ids(&mut dst, &[1, 3, 5, 9], &[2, 3, 6]);
    }

    #[test]
    #[should_panic(expected = "merge destination too small")]
    fn merge_panics_for_empty_destination() {
        let mut dst: [Pgid; 0] = [];
        merge_page_ids(&mut dst, &[1], &[]);
    }

    #[test]
    fn merge_convenience_allocates_exactly() {
        assert_eq!(merge(&[1, 3, 5, 9], &[2, 3, 6]), vec![1, 2, 3, 3, 5, 6, 9]);
        assert_eq!(merge(&[], &[4, 5]), vec![4, 5]);
        assert_eq!(merge(&[4, 5], &[]), vec![4, 5]);
        assert_eq!(merge(&[], &[]), Vec::<Pgid>::new());
    }

    #[test]
    fn freelist_page_round_trip() {
        let ids = [3, 5, 6, 12, 13];
        let mut data = vec![0u8; DEFAULT_PAGE_SIZE];
        write_freelist_page(&mut data, &ids).unwrap();

        let page = Page::from_bytes(&data).unwrap();
        assert_eq!(page.type_name(), "freelist");
        assert_eq!(page.count(), 5);

        let freelist = FreelistPage::from_page(page).unwrap();
        assert_eq!(freelist.id_count().unwrap(), 5);
        assert_eq!(freelist.page_ids().unwrap(), ids);
    }

    #[test]
    fn freelist_page_empty_list() {
        let mut data = vec![0u8; DEFAULT_PAGE_SIZE];
        write_freelist_page(&mut data, &[]).unwrap();

        let freelist = FreelistPage::from_bytes(&data).unwrap();
        assert_eq!(freelist.id_count().unwrap(), 0);
        assert!(freelist.page_ids().unwrap().is_empty());
    }

    #[test]
    fn freelist_page_sentinel_encoding() {
        let count = FREELIST_COUNT_SENTINEL as usize;
        let ids: Vec<Pgid> = (1..=count as Pgid).collect();
        let mut data = vec![0u8; PAGE_HEADER_SIZE + 8 + count * 8];
        write_freelist_page(&mut data, &ids).unwrap();

        let page = Page::from_bytes(&data).unwrap();
        assert_eq!(page.count(), FREELIST_COUNT_SENTINEL);

        let freelist = FreelistPage::from_page(page).unwrap();
        assert_eq!(freelist.id_count().unwrap(), count);
        assert_eq!(freelist.page_ids().unwrap(), ids);
    }

    #[test]
    fn freelist_page_below_sentinel_uses_plain_count() {
        let count = FREELIST_COUNT_SENTINEL as usize - 1;
        let ids: Vec<Pgid> = (0..count as Pgid).collect();
        let mut data = vec![0u8; PAGE_HEADER_SIZE + count * 8];
        write_freelist_page(&mut data, &ids).unwrap();

        let page = Page::from_bytes(&data).unwrap();
        assert_eq!(page.count() as usize, count);
        assert_eq!(
            FreelistPage::from_page(page).unwrap().page_ids().unwrap(),
            ids
        );
    }

    #[test]
    fn freelist_write_rejects_small_buffer() {
        let mut data = vec![0u8; PAGE_HEADER_SIZE + 8];
        let result = write_freelist_page(&mut data, &[1, 2]);

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("needs"));
    }

    #[test]
    fn freelist_wrong_page_type_is_error() {
        let mut data = vec![0u8; DEFAULT_PAGE_SIZE];
        PageHeader::from_bytes_mut(&mut data)
            .unwrap()
            .set_flags(crate::page::LEAF_PAGE_FLAG);

        assert!(FreelistPage::from_bytes(&data).is_err());
    }

    #[test]
    fn freelist_corrupt_count_is_error_not_panic() {
        let mut data = vec![0u8; 64];
        write_freelist_page(&mut data, &[1, 2]).unwrap();
        PageHeader::from_bytes_mut(&mut data).unwrap().set_count(500);

        let freelist = FreelistPage::from_bytes(&data).unwrap();
        assert!(freelist.page_ids().is_err());
    }
}
