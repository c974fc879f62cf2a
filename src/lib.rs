//! # DenKV Page Format
//!
//! DenKV is an embedded copy-on-write B+Tree key-value store. This crate is
//! its storage foundation: the binary page format and the zero-copy views
//! that let the engine layers interpret raw page bytes as typed structures.
//!
//! - **Zero-copy data access**: every key, value, and element read returns a
//!   slice into the page buffer, never an intermediate copy
//! - **Pinned on-disk layout**: all persisted structs are `#[repr(C)]` with
//!   little-endian, alignment-free field types and compile-time size checks
//! - **Borrow-checked view lifetimes**: a view cannot outlive the buffer it
//!   aliases, so remap/reuse hazards are compile errors instead of bugs
//!
//! ## Quick Start
//!
//! ```
//! use denkv::page::{LeafItem, Page, PageHeader, PageKind};
//! use denkv::DEFAULT_PAGE_SIZE;
//!
//! # fn main() -> eyre::Result<()> {
//! let mut buf = vec![0u8; DEFAULT_PAGE_SIZE];
//! PageHeader::from_bytes_mut(&mut buf)?.set_id(7);
//! denkv::page::write_leaf_page(
//!     &mut buf,
//!     &[LeafItem::new(b"answer", b"42"), LeafItem::new(b"question", b"?")],
//! )?;
//!
//! let page = Page::from_bytes(&buf)?;
//! match page.kind()? {
//!     PageKind::Leaf(leaf) => assert_eq!(leaf.key_at(0)?, b"answer"),
//!     _ => unreachable!(),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The engine is layered; this crate is the bottom two boxes:
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │      Bucket / Key-Value API          │
//! ├─────────────────────────────────────┤
//! │  Transactions │ Copy-on-Write Commit │
//! ├───────────────┼─────────────────────┤
//! │  B+Tree Cursors, Splits and Merges   │
//! ├─────────────────────────────────────┤
//! │  Page Format (header, elements,      │
//! │  meta, freelist pages)        ← here │
//! ├─────────────────────────────────────┤
//! │  Free-Id Bookkeeping         ← here  │
//! └─────────────────────────────────────┘
//! ```
//!
//! Upper layers own allocation, I/O, locking, and the commit protocol. They
//! hand this crate a page id plus the raw buffer for that page and consume
//! the typed views it returns.
//!
//! ## Module Overview
//!
//! - [`page`]: page header, type classification, branch/leaf element views,
//!   meta layout, page encoders, diagnostics
//! - [`freelist`]: freelist page codec and the sorted page-id merge

#[macro_use]
mod macros;

pub mod freelist;
pub mod page;

pub use page::{Page, PageHeader, PageInfo, PageKind, PageType, Pgid, DEFAULT_PAGE_SIZE};
