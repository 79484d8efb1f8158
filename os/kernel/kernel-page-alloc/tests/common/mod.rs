#![allow(dead_code)]

use kernel_memory_addresses::{PhysicalAddress, PhysicalPage, Size4K};
use kernel_page_alloc::PageAllocator;
use kernel_page_alloc::phys_mapper::PhysMapper;
use std::alloc::{Layout, alloc_zeroed, dealloc};
use std::ptr::NonNull;

pub const PAGE: u64 = 4096;
pub const POISON: u8 = kernel_info::memory::PAGE_POISON;

/// Frames in the simulated machine; physical addresses run from 0.
pub const FRAMES: usize = 64;
/// Kernel image ends in the middle of frame 3, so frame 4 is the first free one.
pub const KERNEL_END: PhysicalAddress = PhysicalAddress::new(3 * PAGE + 0x100);
pub const FIRST: PhysicalAddress = PhysicalAddress::new(4 * PAGE);
pub const TOP: PhysicalAddress = PhysicalAddress::new(FRAMES as u64 * PAGE);
pub const MANAGED: usize = FRAMES - 4;

pub type TestAlloc<'r> = PageAllocator<&'r TestRam, FRAMES>;

/// Heap buffer standing in for physical memory, 4 KiB aligned.
///
/// Physical address `pa` lives at byte offset `pa` of the buffer.
pub struct TestRam {
    base: NonNull<u8>,
    layout: Layout,
}

// The buffer is only reached through raw pointers handed to the allocator.
unsafe impl Send for TestRam {}
unsafe impl Sync for TestRam {}

impl TestRam {
    pub fn with_frames(n: usize) -> Self {
        let layout = Layout::from_size_align(n * PAGE as usize, PAGE as usize).unwrap();
        let base = NonNull::new(unsafe { alloc_zeroed(layout) }).expect("test RAM");
        Self { base, layout }
    }

    fn offset(&self, pa: PhysicalAddress) -> usize {
        let off = pa.as_u64() as usize;
        assert!(off + PAGE as usize <= self.layout.size(), "{pa} outside test RAM");
        off
    }

    /// Copy of the 4 KiB page at `pa`.
    pub fn page_bytes(&self, pa: PhysicalAddress) -> Vec<u8> {
        let off = self.offset(pa);
        unsafe { std::slice::from_raw_parts(self.base.as_ptr().add(off), PAGE as usize) }.to_vec()
    }

    pub fn fill_page(&self, pa: PhysicalAddress, byte: u8) {
        let off = self.offset(pa);
        unsafe { std::ptr::write_bytes(self.base.as_ptr().add(off), byte, PAGE as usize) };
    }

    pub fn fill_all(&self, byte: u8) {
        unsafe { std::ptr::write_bytes(self.base.as_ptr(), byte, self.layout.size()) };
    }
}

impl Drop for TestRam {
    fn drop(&mut self) {
        unsafe { dealloc(self.base.as_ptr(), self.layout) };
    }
}

impl PhysMapper for TestRam {
    unsafe fn page_ptr(&self, page: PhysicalPage<Size4K>) -> *mut u8 {
        let off = self.offset(page.base());
        unsafe { self.base.as_ptr().add(off) }
    }
}

/// An allocator over `ram`, initialized with the standard test layout.
pub fn booted(ram: &TestRam) -> TestAlloc<'_> {
    let pages = PageAllocator::new(ram);
    unsafe { pages.init(KERNEL_END, TOP) };
    pages
}

pub fn all_bytes_are(bytes: &[u8], value: u8) -> bool {
    bytes.iter().all(|&b| b == value)
}
