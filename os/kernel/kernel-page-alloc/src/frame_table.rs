//! Per-frame reference counts.

use kernel_memory_addresses::FrameNumber;

/// One reference count per physical frame of the supported range.
///
/// Indexed by absolute [`FrameNumber`]; frames outside the allocatable range
/// simply stay at zero forever.
pub(crate) struct PageFrameTable<const N: usize> {
    refs: [u32; N],
}

impl<const N: usize> PageFrameTable<N> {
    pub(crate) const fn new() -> Self {
        Self { refs: [0; N] }
    }

    /// Whether `frame` has an entry in this table.
    #[inline]
    pub(crate) const fn covers(frame: FrameNumber) -> bool {
        frame.as_usize() < N
    }

    #[inline]
    pub(crate) const fn get(&self, frame: FrameNumber) -> u32 {
        self.refs[frame.as_usize()]
    }

    #[inline]
    pub(crate) const fn set(&mut self, frame: FrameNumber, count: u32) {
        self.refs[frame.as_usize()] = count;
    }

    /// Add one owner; `None` if the count would overflow.
    #[inline]
    pub(crate) fn increment(&mut self, frame: FrameNumber) -> Option<u32> {
        let slot = &mut self.refs[frame.as_usize()];
        *slot = slot.checked_add(1)?;
        Some(*slot)
    }

    /// Drop one owner; `None` if the count is already zero.
    #[inline]
    pub(crate) fn decrement(&mut self, frame: FrameNumber) -> Option<u32> {
        let slot = &mut self.refs[frame.as_usize()];
        *slot = slot.checked_sub(1)?;
        Some(*slot)
    }

    /// Number of frames in `[first, end)` that have at least one owner.
    pub(crate) fn count_owned(&self, first: FrameNumber, end: FrameNumber) -> usize {
        self.refs[first.as_usize()..end.as_usize()]
            .iter()
            .filter(|&&c| c > 0)
            .count()
    }
}
