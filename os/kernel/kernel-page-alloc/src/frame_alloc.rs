//! Frame source for page-table construction.
//!
//! The virtual memory manager only needs "give me a 4 KiB frame" and "take it
//! back". [`FrameAlloc`] is that narrow interface; a shared reference to a
//! [`PageAllocator`] implements it, so the VMM and every other kernel user
//! draw from the same reference-counted pool.

use crate::allocator::PageAllocator;
use crate::phys_mapper::PhysMapper;
use kernel_memory_addresses::PhysicalAddress;

pub trait FrameAlloc {
    /// Allocate one zeroed 4 KiB *physical* frame for page tables.
    fn alloc_4k(&mut self) -> Option<PhysicalAddress>;

    /// Return a frame obtained from [`alloc_4k`](Self::alloc_4k).
    fn free_4k(&mut self, pa: PhysicalAddress);
}

impl<M: PhysMapper, const N: usize> FrameAlloc for &PageAllocator<M, N> {
    fn alloc_4k(&mut self) -> Option<PhysicalAddress> {
        self.allocate_zeroed()
    }

    #[track_caller]
    fn free_4k(&mut self, pa: PhysicalAddress) {
        self.release(pa);
    }
}
