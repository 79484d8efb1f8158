//! LIFO list of free page frames.
//!
//! The links live in a side array indexed by frame number rather than inside
//! the free pages themselves, so a free page can be poisoned in full and the
//! list survives stray writes through dangling pointers.
//!
//! ```text
//!   head ──► #41 ──► #17 ──► #40 ──► TAIL
//!
//!   links[41] = 17, links[17] = 40, links[40] = TAIL
//!   links[n]  = UNLINKED for every frame not on the list
//! ```

use kernel_memory_addresses::FrameNumber;

/// Link value of a frame that is not on the list.
const UNLINKED: u32 = u32::MAX;
/// Link value of the last frame on the list.
const TAIL: u32 = u32::MAX - 1;

/// Singly linked free list over frame numbers `0..N`.
///
/// # Invariants
/// - `len` equals the number of frames reachable from `head`.
/// - `links[f] != UNLINKED` iff `f` is on the list.
pub(crate) struct FreeList<const N: usize> {
    head: Option<FrameNumber>,
    links: [u32; N],
    len: usize,
}

impl<const N: usize> FreeList<N> {
    const FITS_LINKS: () = assert!(N < TAIL as usize, "too many frames for u32 links");

    pub(crate) const fn new() -> Self {
        let () = Self::FITS_LINKS;
        Self {
            head: None,
            links: [UNLINKED; N],
            len: 0,
        }
    }

    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[cfg(test)]
    pub(crate) const fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    #[inline]
    pub(crate) const fn contains(&self, frame: FrameNumber) -> bool {
        self.links[frame.as_usize()] != UNLINKED
    }

    /// Link `frame` in front of the list.
    ///
    /// Returns `false` (and leaves the list untouched) if the frame is
    /// already linked.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn push(&mut self, frame: FrameNumber) -> bool {
        if self.contains(frame) {
            return false;
        }
        // N < TAIL, so every frame index fits into a link.
        self.links[frame.as_usize()] = match self.head {
            Some(next) => next.as_usize() as u32,
            None => TAIL,
        };
        self.head = Some(frame);
        self.len += 1;
        true
    }

    /// Unlink and return the most recently pushed frame.
    pub(crate) fn pop(&mut self) -> Option<FrameNumber> {
        let frame = self.head?;
        let link = core::mem::replace(&mut self.links[frame.as_usize()], UNLINKED);
        self.head = match link {
            TAIL => None,
            next => Some(FrameNumber::new(next as usize)),
        };
        self.len -= 1;
        Some(frame)
    }

    /// Walk the list from the head.
    #[cfg(test)]
    pub(crate) fn iter(&self) -> impl Iterator<Item = FrameNumber> + '_ {
        core::iter::successors(self.head, |f| match self.links[f.as_usize()] {
            TAIL | UNLINKED => None,
            next => Some(FrameNumber::new(next as usize)),
        })
    }
}
