//! # Byte Reinterpretation Primitives
//!
//! Bounds-checked building blocks for viewing a region of a page buffer as
//! a typed value, a typed slice, or a raw byte slice, without copying. The
//! header and element logic computes offsets from in-page fields and funnels
//! every reinterpretation through these functions, so a corrupt or hostile
//! field value surfaces as an error instead of an out-of-bounds slice.
//!
//! All typed casts require `Unaligned` targets with pinned little-endian
//! fields; a cast therefore never fails on alignment and works identically
//! on mmap'd buffers, heap buffers, and arbitrary sub-slices.
//!
//! Offset arithmetic uses checked addition: `pos`/`ksize`/`vsize` come from
//! disk and may be anything, and an overflowed range must fail loudly, not
//! wrap into a plausible one.

use eyre::{bail, ensure, Result};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Borrow the bytes `[offset, offset + size_of::<T>())` as a `&T`.
pub(crate) fn struct_at<T>(data: &[u8], offset: usize) -> Result<&T>
where
    T: FromBytes + KnownLayout + Immutable + Unaligned,
{
    let bytes = bytes_at(data, offset, size_of::<T>())?;
    T::ref_from_bytes(bytes)
        .map_err(|e| eyre::eyre!("failed to read struct at offset {}: {:?}", offset, e))
}

/// Mutable counterpart of [`struct_at`].
pub(crate) fn struct_at_mut<T>(data: &mut [u8], offset: usize) -> Result<&mut T>
where
    T: FromBytes + IntoBytes + KnownLayout + Unaligned,
{
    let end = checked_end(offset, size_of::<T>())?;
    ensure!(
        end <= data.len(),
        "byte range {}..{} out of bounds for {}-byte buffer",
        offset,
        end,
        data.len()
    );
    T::mut_from_bytes(&mut data[offset..end])
        .map_err(|e| eyre::eyre!("failed to read struct at offset {}: {:?}", offset, e))
}

/// Borrow `count` contiguous `T`s starting at `offset` as a `&[T]`.
pub(crate) fn slice_at<T>(data: &[u8], offset: usize, count: usize) -> Result<&[T]>
where
    T: FromBytes + KnownLayout + Immutable + Unaligned,
{
    let len = match count.checked_mul(size_of::<T>()) {
        Some(len) => len,
        None => bail!("element count {} overflows byte length", count),
    };
    let bytes = bytes_at(data, offset, len)?;
    <[T]>::ref_from_bytes(bytes).map_err(|e| {
        eyre::eyre!(
            "failed to read {} elements at offset {}: {:?}",
            count,
            offset,
            e
        )
    })
}

/// Borrow the raw bytes `[offset, offset + len)`.
pub(crate) fn bytes_at(data: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    let end = checked_end(offset, len)?;
    ensure!(
        end <= data.len(),
        "byte range {}..{} out of bounds for {}-byte buffer",
        offset,
        end,
        data.len()
    );
    Ok(&data[offset..end])
}

fn checked_end(offset: usize, len: usize) -> Result<usize> {
    match offset.checked_add(len) {
        Some(end) => Ok(end),
        None => bail!("byte range at offset {} with length {} overflows", offset, len),
    }
}
