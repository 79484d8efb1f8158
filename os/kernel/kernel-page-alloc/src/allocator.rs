//! The reference-counted page allocator.

use crate::error::PageAllocError;
use crate::frame_table::PageFrameTable;
use crate::free_list::FreeList;
use crate::page_ref::PageRef;
use crate::phys_mapper::PhysMapper;
use kernel_info::memory::PAGE_POISON;
use kernel_memory_addresses::{FrameNumber, PageSize, PhysicalAddress, Size4K};
use kernel_sync::SpinLock;
use log::{debug, error, info, trace, warn};

#[allow(clippy::cast_possible_truncation)]
const PAGE_BYTES: usize = Size4K::SIZE as usize;

/// What a single reference drop did to a page.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PageRelease {
    /// The last owner let go; the page was poisoned and put on the free list.
    Reclaimed,
    /// Other owners remain; the page was left untouched.
    StillShared {
        /// Reference count after the drop.
        remaining: u32,
    },
}

/// A consistent snapshot of the allocator's bookkeeping.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct PageAllocStats {
    /// Frames in the allocatable range.
    pub total: usize,
    /// Frames on the free list.
    pub free: usize,
    /// Frames with at least one owner.
    pub allocated: usize,
}

/// The allocatable frames `[first, end)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct FrameRange {
    first: FrameNumber,
    end: FrameNumber,
}

impl FrameRange {
    const fn len(self) -> usize {
        self.end.as_usize() - self.first.as_usize()
    }
}

/// Everything the lock protects, mutated only as one unit.
struct PageAllocState<const N: usize> {
    frames: PageFrameTable<N>,
    free: FreeList<N>,
    range: Option<FrameRange>,
}

impl<const N: usize> PageAllocState<N> {
    const fn new() -> Self {
        Self {
            frames: PageFrameTable::new(),
            free: FreeList::new(),
            range: None,
        }
    }

    /// Map `pa` to its frame if it names a page the allocator manages.
    fn managed_frame(&self, pa: PhysicalAddress) -> Result<FrameNumber, PageAllocError> {
        let range = self.range.ok_or(PageAllocError::Uninitialized)?;
        if !pa.is_aligned::<Size4K>() {
            return Err(PageAllocError::Unaligned(pa));
        }
        if pa < range.first.start_address() {
            return Err(PageAllocError::BelowRange(pa));
        }
        if pa >= range.end.start_address() {
            return Err(PageAllocError::AboveRange(pa));
        }
        Ok(FrameNumber::containing(pa))
    }
}

/// Physical page allocator with per-page reference counts.
///
/// Manages the 4 KiB frames between the end of the kernel image and the top of
/// physical memory. `N` is the compile-time capacity of the frame table in
/// frames; the table is indexed by absolute frame number, so it must cover
/// `[0, phys_top)`.
///
/// All state sits behind a single spin lock; every operation is one short
/// critical section.
///
/// # Example
/// ```rust
/// use kernel_memory_addresses::{PhysicalAddress, PhysicalPage, Size4K};
/// use kernel_page_alloc::{PageAllocator, phys_mapper::PhysMapper};
///
/// #[repr(C, align(4096))]
/// struct Ram([u8; 16 * 4096]);
///
/// struct RamMapper(*mut u8);
/// impl PhysMapper for RamMapper {
///     unsafe fn page_ptr(&self, page: PhysicalPage<Size4K>) -> *mut u8 {
///         unsafe { self.0.add(page.base().as_u64() as usize) }
///     }
/// }
///
/// let mut ram = Box::new(Ram([0; 16 * 4096]));
/// let pages = PageAllocator::<_, 16>::new(RamMapper(ram.0.as_mut_ptr()));
/// unsafe { pages.init(PhysicalAddress::new(0x2345), PhysicalAddress::new(16 * 4096)) };
/// assert_eq!(pages.free_pages(), 13);
///
/// let pa = pages.allocate().expect("out of memory");
/// pages.inc_ref(pa);
/// assert_eq!(pages.ref_count(pa), Some(2));
/// pages.release(pa);
/// pages.release(pa);
/// assert_eq!(pages.free_pages(), 13);
/// ```
pub struct PageAllocator<M: PhysMapper, const N: usize> {
    mapper: M,
    state: SpinLock<PageAllocState<N>>,
}

impl<M: PhysMapper, const N: usize> PageAllocator<M, N> {
    /// Create an allocator with no pages; call [`init`](Self::init) once during boot.
    pub const fn new(mapper: M) -> Self {
        Self {
            mapper,
            state: SpinLock::new(PageAllocState::new()),
        }
    }

    /// Seed the free list with every full page in `[kernel_end, phys_top)`.
    ///
    /// `kernel_end` is rounded up to a page boundary; `phys_top` is rounded
    /// down and clamped to the table capacity. Every seeded page goes through
    /// the release path and is therefore poisoned.
    ///
    /// # Safety
    /// - The range must be RAM that nothing else uses, now or later.
    /// - The mapper must cover every page in the range for the allocator's lifetime.
    ///
    /// # Panics
    /// If the allocator was already initialized.
    #[track_caller]
    pub unsafe fn init(&self, kernel_end: PhysicalAddress, phys_top: PhysicalAddress) {
        if let Err(e) = unsafe { self.try_init(kernel_end, phys_top) } {
            fatal("init", e);
        }
    }

    /// Fallible form of [`init`](Self::init); returns the number of pages seeded.
    ///
    /// # Safety
    /// Same as [`init`](Self::init).
    ///
    /// # Errors
    /// [`PageAllocError::AlreadyInitialized`] on a second call.
    pub unsafe fn try_init(
        &self,
        kernel_end: PhysicalAddress,
        phys_top: PhysicalAddress,
    ) -> Result<usize, PageAllocError> {
        let capacity = FrameNumber::new(N).start_address();
        let mut top = phys_top.align_down::<Size4K>();
        if top > capacity {
            warn!("top of memory {phys_top} exceeds frame table capacity, clamping to {capacity}");
            top = capacity;
        }
        let mut first = kernel_end.align_up::<Size4K>();
        if first > top {
            warn!("kernel ends at {kernel_end}, above top of memory {top}; no pages to manage");
            first = top;
        }

        let range = FrameRange {
            first: FrameNumber::containing(first),
            end: FrameNumber::containing(top),
        };

        let mut state = self.state.lock();
        if state.range.is_some() {
            return Err(PageAllocError::AlreadyInitialized);
        }
        state.range = Some(range);

        let mut frame = range.first;
        while frame < range.end {
            self.release_frame(&mut state, frame)?;
            frame = frame.next();
        }
        let seeded = state.free.len();
        drop(state);

        info!(
            "page allocator: {seeded} pages ({} KiB) free in [{first}, {top})",
            seeded * PAGE_BYTES / 1024
        );
        Ok(seeded)
    }

    /// Hand out one page with a reference count of exactly 1.
    ///
    /// Returns `None` when no page is free. The page's contents are
    /// unspecified; use [`allocate_zeroed`](Self::allocate_zeroed) when that
    /// matters.
    #[must_use]
    pub fn allocate(&self) -> Option<PhysicalAddress> {
        let mut state = self.state.lock();
        let Some(frame) = state.free.pop() else {
            drop(state);
            debug!("page allocator: out of memory");
            return None;
        };
        state.frames.set(frame, 1);
        drop(state);

        trace!("page allocator: allocated {frame}");
        Some(frame.start_address())
    }

    /// Like [`allocate`](Self::allocate), but the page is filled with zeros.
    #[must_use]
    pub fn allocate_zeroed(&self) -> Option<PhysicalAddress> {
        let pa = self.allocate()?;
        // SAFETY: the page is managed by us and exclusively owned by the caller.
        unsafe { self.fill(FrameNumber::containing(pa), 0) };
        Some(pa)
    }

    /// Allocate a page and wrap it in an owning [`PageRef`].
    #[must_use]
    pub fn allocate_page(&self) -> Option<PageRef<'_, M, N>> {
        let pa = self.allocate()?;
        // SAFETY: the fresh page carries exactly the one reference we hand over.
        Some(unsafe { PageRef::from_raw(self, pa) })
    }

    /// Drop one reference to the page at `pa`.
    ///
    /// The last owner's release poisons the page and returns it to the free
    /// list; earlier releases only decrement the count.
    ///
    /// # Panics
    /// If `pa` is misaligned, outside the allocatable range, or already free.
    #[track_caller]
    pub fn release(&self, pa: PhysicalAddress) {
        if let Err(e) = self.try_release(pa) {
            fatal("release", e);
        }
    }

    /// Fallible form of [`release`](Self::release).
    ///
    /// # Errors
    /// The address checks of [`release`](Self::release); nothing is modified
    /// on error.
    pub fn try_release(&self, pa: PhysicalAddress) -> Result<PageRelease, PageAllocError> {
        let mut state = self.state.lock();
        let frame = state.managed_frame(pa)?;
        let outcome = self.release_frame(&mut state, frame)?;
        drop(state);

        trace!("page allocator: released {frame}: {outcome:?}");
        Ok(outcome)
    }

    /// Add an owner to the already allocated page at `pa`.
    ///
    /// # Panics
    /// If `pa` is not an allocatable page, or the page is free.
    #[track_caller]
    pub fn inc_ref(&self, pa: PhysicalAddress) {
        if let Err(e) = self.try_inc_ref(pa) {
            fatal("inc_ref", e);
        }
    }

    /// Fallible form of [`inc_ref`](Self::inc_ref); returns the new count.
    ///
    /// # Errors
    /// Invalid address, a free page, or a saturated count.
    pub fn try_inc_ref(&self, pa: PhysicalAddress) -> Result<u32, PageAllocError> {
        let mut state = self.state.lock();
        let frame = state.managed_frame(pa)?;
        if state.free.contains(frame) {
            return Err(PageAllocError::NotAllocated(pa));
        }
        state
            .frames
            .increment(frame)
            .ok_or(PageAllocError::RefCountOverflow(pa))
    }

    /// Remove an owner from the page at `pa` without ever reclaiming it.
    ///
    /// A page whose count reaches zero this way stays off the free list until
    /// it is passed to [`release`](Self::release).
    ///
    /// # Panics
    /// If `pa` is not an allocatable page or its count is already zero.
    #[track_caller]
    pub fn dec_ref(&self, pa: PhysicalAddress) {
        if let Err(e) = self.try_dec_ref(pa) {
            fatal("dec_ref", e);
        }
    }

    /// Fallible form of [`dec_ref`](Self::dec_ref); returns the new count.
    ///
    /// # Errors
    /// Invalid address, or a count that is already zero.
    pub fn try_dec_ref(&self, pa: PhysicalAddress) -> Result<u32, PageAllocError> {
        let mut state = self.state.lock();
        let frame = state.managed_frame(pa)?;
        state
            .frames
            .decrement(frame)
            .ok_or(PageAllocError::RefCountUnderflow(pa))
    }

    /// Take an additional reference to the allocated page at `pa` as a guard.
    ///
    /// # Panics
    /// Same as [`inc_ref`](Self::inc_ref).
    #[track_caller]
    pub fn share(&self, pa: PhysicalAddress) -> PageRef<'_, M, N> {
        self.inc_ref(pa);
        // SAFETY: we just took the reference the guard will drop.
        unsafe { PageRef::from_raw(self, pa) }
    }

    /// Number of pages on the free list.
    #[must_use]
    pub fn free_pages(&self) -> usize {
        self.state.lock().free.len()
    }

    /// Reference count of the frame containing `pa`, or `None` beyond the frame table.
    #[must_use]
    pub fn ref_count(&self, pa: PhysicalAddress) -> Option<u32> {
        let frame = FrameNumber::containing(pa);
        if !PageFrameTable::<N>::covers(frame) {
            return None;
        }
        Some(self.state.lock().frames.get(frame))
    }

    /// Whether the page at `pa` has exactly one owner and may be written in place.
    #[must_use]
    pub fn is_private(&self, pa: PhysicalAddress) -> bool {
        self.ref_count(pa) == Some(1)
    }

    /// The managed range `[first, top)`, once initialized.
    #[must_use]
    pub fn bounds(&self) -> Option<(PhysicalAddress, PhysicalAddress)> {
        self.state
            .lock()
            .range
            .map(|r| (r.first.start_address(), r.end.start_address()))
    }

    /// Snapshot of the bookkeeping, taken under one lock acquisition.
    ///
    /// Walks the frame table, so this is meant for diagnostics, not hot paths.
    #[must_use]
    pub fn stats(&self) -> PageAllocStats {
        let state = self.state.lock();
        let Some(range) = state.range else {
            return PageAllocStats::default();
        };
        PageAllocStats {
            total: range.len(),
            free: state.free.len(),
            allocated: state.frames.count_owned(range.first, range.end),
        }
    }

    /// Drop one reference to a managed frame. Caller holds the lock.
    fn release_frame(
        &self,
        state: &mut PageAllocState<N>,
        frame: FrameNumber,
    ) -> Result<PageRelease, PageAllocError> {
        if state.free.contains(frame) {
            return Err(PageAllocError::DoubleFree(frame.start_address()));
        }
        match state.frames.get(frame) {
            0 | 1 => {
                // SAFETY: the frame is in the managed range and has no owner left.
                unsafe { self.fill(frame, PAGE_POISON) };
                state.frames.set(frame, 0);
                state.free.push(frame);
                Ok(PageRelease::Reclaimed)
            }
            n => {
                state.frames.set(frame, n - 1);
                Ok(PageRelease::StillShared { remaining: n - 1 })
            }
        }
    }

    /// Overwrite the whole frame with `byte`.
    ///
    /// # Safety
    /// `frame` must be managed by this allocator and not in use by anyone else.
    unsafe fn fill(&self, frame: FrameNumber, byte: u8) {
        unsafe {
            let ptr = self.mapper.page_ptr(frame.page());
            core::ptr::write_bytes(ptr, byte, PAGE_BYTES);
        }
    }

    /// Pointer to the page at `pa` through this allocator's mapper.
    pub(crate) fn page_ptr(&self, pa: PhysicalAddress) -> *mut u8 {
        // SAFETY: producing the pointer is harmless; dereferencing is the caller's business.
        unsafe { self.mapper.page_ptr(pa.page::<Size4K>()) }
    }
}

/// Report a broken ownership invariant and halt.
#[cold]
#[track_caller]
fn fatal(op: &str, err: PageAllocError) -> ! {
    error!("page allocator: {op}: {err}");
    panic!("{op}: {err}");
}
