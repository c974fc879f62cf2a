//! Fuzz testing for the sorted page-id merge and the freelist codec.
//!
//! The merge precondition is sorted inputs, so the raw id lists are
//! sorted first. The merged output must then be a sorted permutation of
//! the concatenation, and it must survive a freelist page round trip at
//! any length, including across the count sentinel.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use denkv::freelist::{merge, merge_page_ids, write_freelist_page, FreelistPage};
use denkv::Pgid;

#[derive(Debug, Arbitrary)]
struct MergeInput {
    a: Vec<Pgid>,
    b: Vec<Pgid>,
}

fuzz_target!(|input: MergeInput| {
    let MergeInput { mut a, mut b } = input;
    if a.len() + b.len() > 1 << 16 {
        return;
    }
    a.sort_unstable();
    b.sort_unstable();

    let merged = merge(&a, &b);
    assert_eq!(merged.len(), a.len() + b.len());
    assert!(merged.windows(2).all(|w| w[0] <= w[1]));

    let mut expected = [a.as_slice(), b.as_slice()].concat();
    expected.sort_unstable();
    assert_eq!(merged, expected);

    let mut dst = vec![0; a.len() + b.len() + 3];
    merge_page_ids(&mut dst, &a, &b);
    assert_eq!(&dst[..merged.len()], merged.as_slice());

    let mut page = vec![0u8; 16 + 8 + merged.len() * 8];
    write_freelist_page(&mut page, &merged).unwrap();
    let decoded = FreelistPage::from_bytes(&page).unwrap().page_ids().unwrap();
    assert_eq!(decoded, merged);
});
