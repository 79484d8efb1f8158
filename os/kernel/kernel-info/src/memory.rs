//! # Memory Layout

/// Size of one physical page frame in bytes.
pub const PAGE_SIZE: u64 = 4096;

/// A simple Higher Half Direct Map (HHDM) base.
/// Anything you map at [`HHDM_BASE`] + `pa` lets the kernel
/// access physical memory via a fixed offset.
pub const HHDM_BASE: u64 = 0xffff_8880_0000_0000;

/// Where the kernel image is placed in *physical* memory.
pub const PHYS_LOAD: u64 = 0x0010_0000; // 1 MiB

/// Top of the supported physical memory (exclusive).
///
/// This is the static upper bound the page frame table is sized for; RAM
/// beyond it is ignored by the page allocator.
pub const PHYS_TOP: u64 = 0x0E00_0000; // 224 MiB

/// Number of page frames covered by the page frame table.
#[allow(clippy::cast_possible_truncation)]
pub const MAX_PHYS_FRAMES: usize = (PHYS_TOP / PAGE_SIZE) as usize;

/// Byte pattern written over every page returned to the free list.
///
/// Reads through a dangling reference then yield `0x0101_0101...` instead of
/// plausible stale data.
pub const PAGE_POISON: u8 = 0x01;

const _: () = {
    assert!(PAGE_SIZE.is_power_of_two());
    assert!(PHYS_TOP.is_multiple_of(PAGE_SIZE));
    assert!(PHYS_LOAD.is_multiple_of(PAGE_SIZE));
    assert!(PHYS_LOAD < PHYS_TOP);
    assert!(PAGE_POISON != 0);
    // frame numbers are stored as u32 in the free list links
    assert!(MAX_PHYS_FRAMES < u32::MAX as usize);
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_table_covers_supported_range() {
        assert_eq!(MAX_PHYS_FRAMES as u64 * PAGE_SIZE, PHYS_TOP);
        assert_eq!(MAX_PHYS_FRAMES, 57_344);
    }
}
