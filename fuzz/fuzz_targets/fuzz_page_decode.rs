//! Fuzz testing for the page decoder.
//!
//! Arbitrary bytes are fed through the page views the way a corrupted or
//! hostile database file would arrive. Every classification and element
//! access must come back as an error for bad input; panics and
//! out-of-bounds reads are the bugs this target hunts.

#![no_main]

use libfuzzer_sys::fuzz_target;

use denkv::page::{Page, PageKind};

fuzz_target!(|data: &[u8]| {
    let Ok(page) = Page::from_bytes(data) else {
        return;
    };

    let _ = page.type_name();
    let _ = page.info();
    let _ = page.hex_dump(64);
    let _ = page.buffer_len(4096);

    match page.kind() {
        Ok(PageKind::Leaf(leaf)) => {
            let _ = leaf.elements();
            for i in 0..leaf.count() as usize {
                if let Ok(elem) = leaf.element(i) {
                    let _ = elem.key();
                    let _ = elem.value();
                    let _ = elem.is_bucket();
                }
            }
        }
        Ok(PageKind::Branch(branch)) => {
            let _ = branch.elements();
            for i in 0..branch.count() as usize {
                if let Ok(elem) = branch.element(i) {
                    let _ = elem.key();
                    let _ = elem.pgid();
                }
            }
        }
        Ok(PageKind::Meta(meta)) => {
            let m = meta.meta();
            let _ = (m.magic(), m.version(), m.root(), m.txid(), m.checksum());
        }
        Ok(PageKind::Freelist(freelist)) => {
            let _ = freelist.id_count();
            let _ = freelist.page_ids();
        }
        Err(_) => {}
    }
});
