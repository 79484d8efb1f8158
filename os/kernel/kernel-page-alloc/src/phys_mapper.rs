//! # Touching Physical Pages
//!
//! The allocator only ever deals in physical addresses, but poisoning a
//! released page (and zeroing a fresh one on request) means writing its bytes.
//! [`PhysMapper`] is the seam that turns a physical page into a pointer the
//! kernel can write through.
//!
//! ## Implementations
//! - [`HhdmPhysMapper`]: the kernel's higher-half direct map; every physical
//!   address is visible at `HHDM_BASE + pa`.
//! - Tests back "physical memory" with a heap buffer and hand out pointers
//!   into it.
//!
//! ## Example
//! ```rust
//! use kernel_memory_addresses::{PhysicalAddress, Size4K};
//! use kernel_page_alloc::phys_mapper::{HhdmPhysMapper, PhysMapper};
//! use kernel_info::memory::HHDM_BASE;
//!
//! let page = PhysicalAddress::new(0x1234_0000).page::<Size4K>();
//! let ptr = unsafe { HhdmPhysMapper.page_ptr(page) };
//! assert_eq!(ptr as u64, HHDM_BASE + 0x1234_0000);
//! ```

use kernel_info::memory::HHDM_BASE;
use kernel_memory_addresses::{PhysicalPage, Size4K};

/// Converts a physical page into a writable pointer in the current address space.
pub trait PhysMapper {
    /// Pointer to the first byte of `page`.
    ///
    /// # Safety
    /// The caller must only dereference the pointer for pages the mapping is
    /// known to cover, and only for `Size4K::SIZE` bytes.
    unsafe fn page_ptr(&self, page: PhysicalPage<Size4K>) -> *mut u8;
}

impl<M: PhysMapper + ?Sized> PhysMapper for &M {
    #[inline]
    unsafe fn page_ptr(&self, page: PhysicalPage<Size4K>) -> *mut u8 {
        unsafe { (**self).page_ptr(page) }
    }
}

/// [`PhysMapper`] implementation for kernels with a higher-half direct map (HHDM).
///
/// # Safety
/// - The HHDM mapping must be present, writable, and cover the physical range
///   handed to the allocator.
#[derive(Debug, Default, Copy, Clone)]
pub struct HhdmPhysMapper;

impl PhysMapper for HhdmPhysMapper {
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    unsafe fn page_ptr(&self, page: PhysicalPage<Size4K>) -> *mut u8 {
        (HHDM_BASE + page.base().as_u64()) as usize as *mut u8
    }
}
