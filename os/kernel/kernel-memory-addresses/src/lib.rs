//! # Physical Memory Address Types
//!
//! Strongly typed wrappers for physical addresses, page bases and page frame
//! numbers used by the page allocator.
//!
//! ## Overview
//!
//! | Type | Description |
//! |------|-------------|
//! | [`PhysicalAddress`] | A raw 64-bit physical address, not necessarily aligned. |
//! | [`PhysicalPage<S>`] | A page-aligned physical base of a page of size `S`. |
//! | [`FrameNumber`] | Index of a 4 KiB frame, i.e. `address >> 12`. |
//!
//! All of them are `#[repr(transparent)]`, `Copy`, and ordered, so they can be
//! compared against range bounds and used as table indices without casts
//! leaking into allocator code.
//!
//! ## Typical Usage
//!
//! ```rust
//! # use kernel_memory_addresses::*;
//! let end_of_kernel = PhysicalAddress::new(0x0011_2345);
//!
//! // First full page after the kernel image
//! let first = end_of_kernel.align_up::<Size4K>();
//! assert_eq!(first.as_u64(), 0x0011_3000);
//! assert!(first.is_aligned::<Size4K>());
//!
//! // Frame numbers index the page frame table
//! let frame = FrameNumber::containing(first);
//! assert_eq!(frame.as_usize(), 0x113);
//! assert_eq!(frame.start_address(), first);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]

mod frame_number;
mod page_size;
mod physical_address;
mod physical_page;

pub use frame_number::FrameNumber;
pub use page_size::{PageSize, Size4K};
pub use physical_address::PhysicalAddress;
pub use physical_page::PhysicalPage;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_helpers() {
        let a = PhysicalAddress::new(0x12345);
        assert_eq!(a.align_down::<Size4K>().as_u64(), 0x12000);
        assert_eq!(a.align_up::<Size4K>().as_u64(), 0x13000);
        assert_eq!(a.page_offset::<Size4K>(), 0x345);
        assert!(!a.is_aligned::<Size4K>());
    }

    #[test]
    fn align_up_keeps_aligned_addresses() {
        let a = PhysicalAddress::new(0x4000);
        assert_eq!(a.align_up::<Size4K>(), a);
        assert_eq!(a.align_down::<Size4K>(), a);
        assert!(a.is_aligned::<Size4K>());
    }

    #[test]
    fn page_and_frame_agree() {
        let a = PhysicalAddress::new(0x0000_0000_0020_0042);
        let page = a.page::<Size4K>();
        let frame = FrameNumber::containing(a);
        assert_eq!(page.base().as_u64(), 0x20_0000);
        assert_eq!(frame.as_usize(), 0x200);
        assert_eq!(frame.start_address(), page.base());
        assert_eq!(FrameNumber::from(page), frame);
    }

    #[test]
    fn exact_page_rejects_unaligned() {
        assert!(PhysicalPage::<Size4K>::from_aligned(PhysicalAddress::new(0x1001)).is_none());
        let p = PhysicalPage::<Size4K>::from_aligned(PhysicalAddress::new(0x1000));
        assert_eq!(p.map(PhysicalPage::base), Some(PhysicalAddress::new(0x1000)));
    }

    #[test]
    fn frame_arithmetic() {
        let f = FrameNumber::new(7);
        assert_eq!(f.next().as_usize(), 8);
        assert_eq!(f.start_address().as_u64(), 7 * 4096);
        assert!(FrameNumber::new(3) < f);
    }
}
