//! # Reference-Counted Physical Page Allocator
//!
//! This crate owns the kernel's physical memory: it hands out 4 KiB pages to
//! page-table construction, process stacks, and IPC buffers, and takes them
//! back when released. Each page carries a reference count so several virtual
//! mappings can share one physical page (copy-on-write after a process is
//! duplicated) without the page being reclaimed while still mapped.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │               PageAllocator (API)                   │
//! │    • init / allocate / release                      │
//! │    • inc_ref / dec_ref / PageRef guards             │
//! │    • free_pages / ref_count / stats                 │
//! └─────────────────┬───────────────────────────────────┘
//!                   │  one SpinLock around all state
//! ┌─────────────────▼───────────────────────────────────┐
//! │   PageFrameTable          FreeList                  │
//! │   refcount per frame      LIFO of free frame        │
//! │                           numbers + free_pages      │
//! └─────────────────┬───────────────────────────────────┘
//!                   │  poison / zero page contents
//! ┌─────────────────▼───────────────────────────────────┐
//! │                PhysMapper                           │
//! │    • HHDM in the kernel, heap-backed RAM in tests   │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Page Lifecycle
//!
//! ```text
//!            init / last release            allocate
//!   ┌────────┐  (poisoned)  ┌────────────┐ ───────────► ┌──────────────┐
//!   │ unused │ ───────────► │ free, rc=0 │              │ owned, rc=1  │
//!   └────────┘              └────────────┘ ◄─────────── └──────┬───────┘
//!                                 ▲        release (rc ≤ 1)    │ inc_ref / share
//!                                 │                            ▼
//!                                 │                     ┌──────────────┐
//!                                 │                     │ shared, rc≥2 │
//!                                 │                     └──────┬───────┘
//!                                 │      release: rc -= 1      │
//!                                 └────────── … ───────────────┘
//! ```
//!
//! * A page on the free list always has reference count 0.
//! * `free_pages` always equals the length of the free list.
//! * Only the last owner's release reclaims a page; earlier releases and
//!   `dec_ref` only decrement.
//! * A reclaimed page is overwritten with [`PAGE_POISON`](kernel_info::memory::PAGE_POISON)
//!   so that reads through dangling references produce obvious garbage.
//!
//! ## Failure Model
//!
//! Running out of pages is expected: [`PageAllocator::allocate`] returns
//! `None` and the caller fails its own request. Everything else (releasing a
//! misaligned, foreign, or already free page; decrementing a zero count) is a
//! bookkeeping bug. The plain entry points log and panic, which halts the
//! kernel; `try_*` variants return a [`PageAllocError`] instead and leave the
//! state untouched.
//!
//! ## Concurrency
//!
//! The frame table, free list and counter form one unit behind a single
//! [`kernel_sync::SpinLock`]. Every operation is one short critical section;
//! there is no per-frame locking and no lock-free path.
//!
//! ## Usage
//!
//! The kernel constructs one [`KernelPageAllocator`] and passes it (or a
//! `&'static` to it) to whoever needs pages:
//!
//! ```rust,no_run
//! use kernel_memory_addresses::PhysicalAddress;
//! use kernel_page_alloc::{KernelPageAllocator, phys_mapper::HhdmPhysMapper};
//! use kernel_info::memory::PHYS_TOP;
//!
//! static PAGES: KernelPageAllocator = KernelPageAllocator::new(HhdmPhysMapper);
//!
//! # let kernel_end = PhysicalAddress::new(0x0040_0000);
//! // Early boot, once:
//! unsafe { PAGES.init(kernel_end, PhysicalAddress::new(PHYS_TOP)) };
//!
//! let page = PAGES.allocate_page().expect("out of memory");
//! let cow = page.share();
//! assert_eq!(page.ref_count(), 2);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]

mod allocator;
mod error;
pub mod frame_alloc;
mod frame_table;
mod free_list;
mod page_ref;
pub mod phys_mapper;

pub use allocator::{PageAllocStats, PageAllocator, PageRelease};
pub use error::PageAllocError;
pub use frame_alloc::FrameAlloc;
pub use page_ref::PageRef;

use kernel_info::memory::MAX_PHYS_FRAMES;
use phys_mapper::HhdmPhysMapper;

/// The kernel's page allocator: HHDM access, table covering `[0, PHYS_TOP)`.
pub type KernelPageAllocator = PageAllocator<HhdmPhysMapper, MAX_PHYS_FRAMES>;
