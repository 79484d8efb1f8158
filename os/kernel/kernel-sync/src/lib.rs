//! # Kernel synchronization primitives
//!
//! Busy-waiting locks for kernel data that is touched from several CPUs.
//! A waiter never sleeps or yields to a scheduler; critical sections are
//! expected to be short and bounded.
//!
//! ```rust
//! use kernel_sync::SpinLock;
//!
//! let counter = SpinLock::new(0_u32);
//! counter.with_lock(|c| *c += 1);
//! assert_eq!(*counter.lock(), 1);
//! assert!(!counter.is_locked());
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod raw_spin;
mod spin_lock;

pub use raw_spin::RawSpin;
pub use spin_lock::{SpinLock, SpinLockGuard};
