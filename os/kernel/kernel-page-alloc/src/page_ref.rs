//! Owning handles for page references.
//!
//! Manual `inc_ref`/`dec_ref` calls are easy to mismatch. A [`PageRef`] stands
//! for exactly one reference: cloning it through [`PageRef::share`] takes a new
//! reference, and dropping it gives exactly one back through the release path,
//! so the last handle to go away reclaims the page.

use crate::allocator::{PageAllocator, PageRelease};
use crate::phys_mapper::PhysMapper;
use core::fmt;
use core::mem::ManuallyDrop;
use kernel_memory_addresses::{FrameNumber, PhysicalAddress};

/// One counted reference to an allocated physical page.
///
/// # Example
/// ```rust,ignore
/// let page = pages.allocate_page().expect("out of memory");
/// let cow = page.share();          // refcount 2, e.g. after fork
/// assert!(!page.is_private());
/// drop(cow);                       // refcount 1
/// assert!(page.is_private());
/// ```
#[must_use = "dropping a PageRef releases the page reference immediately"]
pub struct PageRef<'a, M: PhysMapper, const N: usize> {
    alloc: &'a PageAllocator<M, N>,
    pa: PhysicalAddress,
}

impl<'a, M: PhysMapper, const N: usize> PageRef<'a, M, N> {
    /// Adopt one existing reference to the page at `pa`.
    ///
    /// # Safety
    /// The caller must own a reference to `pa` (from `allocate` or `inc_ref`)
    /// and hand it over; the guard will drop it.
    pub unsafe fn from_raw(alloc: &'a PageAllocator<M, N>, pa: PhysicalAddress) -> Self {
        Self { alloc, pa }
    }

    /// Give up the guard but keep the reference; pair it with a later
    /// `release` or [`from_raw`](Self::from_raw).
    #[must_use]
    pub fn into_raw(self) -> PhysicalAddress {
        let this = ManuallyDrop::new(self);
        this.pa
    }

    #[inline]
    #[must_use]
    pub const fn address(&self) -> PhysicalAddress {
        self.pa
    }

    #[inline]
    #[must_use]
    pub const fn frame(&self) -> FrameNumber {
        FrameNumber::containing(self.pa)
    }

    /// Current number of owners of this page (at least 1 while the guard lives).
    #[must_use]
    pub fn ref_count(&self) -> u32 {
        self.alloc.ref_count(self.pa).unwrap_or_default()
    }

    /// Whether this is the only reference, i.e. the page may be written in place.
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.alloc.is_private(self.pa)
    }

    /// Take another reference to the same page.
    ///
    /// # Panics
    /// If the reference count saturates.
    #[track_caller]
    pub fn share(&self) -> Self {
        self.alloc.share(self.pa)
    }

    /// Pointer to the page contents through the allocator's mapper.
    ///
    /// Writing through it is only sound while [`is_private`](Self::is_private)
    /// holds; shared pages must be copied first.
    #[must_use]
    pub fn as_mut_ptr(&self) -> *mut u8 {
        self.alloc.page_ptr(self.pa)
    }

    /// Drop the reference now and report what happened to the page.
    #[track_caller]
    #[allow(clippy::missing_panics_doc)]
    pub fn release(self) -> PageRelease {
        let this = ManuallyDrop::new(self);
        match this.alloc.try_release(this.pa) {
            Ok(outcome) => outcome,
            Err(e) => panic!("release of guarded page {}: {e}", this.pa),
        }
    }
}

impl<M: PhysMapper, const N: usize> Drop for PageRef<'_, M, N> {
    fn drop(&mut self) {
        self.alloc.release(self.pa);
    }
}

impl<M: PhysMapper, const N: usize> fmt::Debug for PageRef<'_, M, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageRef").field("pa", &self.pa).finish_non_exhaustive()
    }
}
