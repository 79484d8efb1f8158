//! # Kernel Memory Configuration
//!
//! Compile-time constants describing the physical memory the kernel manages
//! and the window through which the kernel touches it. Every other crate in
//! the workspace sources its layout from here, so a change of the supported
//! physical range is a one-line edit.
//!
//! ## Physical Memory Layout
//!
//! ```text
//! 0x0000_0000 ┌─────────────────────────────────┐
//!             │     Low Memory (< 1MiB)         │
//!             │  (BIOS, VGA, DMA buffers)       │
//! PHYS_LOAD   ├─────────────────────────────────┤ 0x0010_0000 (1 MiB)
//!             │       Kernel Image              │
//!             │   (Text, Data, BSS)             │
//! kernel end  ├─────────────────────────────────┤ (rounded up to a page)
//!             │    Allocatable Pages            │
//!             │  (Managed by kernel-page-alloc) │
//! PHYS_TOP    └─────────────────────────────────┘ 0x0E00_0000 (224 MiB)
//! ```
//!
//! The page frame table is sized from [`memory::MAX_PHYS_FRAMES`] at compile
//! time; physical memory above [`memory::PHYS_TOP`] is never handed out.
//!
//! ## Usage
//!
//! ```rust
//! use kernel_info::memory::{MAX_PHYS_FRAMES, PAGE_SIZE, PHYS_TOP};
//!
//! assert_eq!(MAX_PHYS_FRAMES as u64 * PAGE_SIZE, PHYS_TOP);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

pub mod memory;
