use kernel_memory_addresses::PhysicalAddress;

/// Errors reported by the page allocator.
///
/// Apart from running out of memory (which is not an error, see
/// [`PageAllocator::allocate`](crate::PageAllocator::allocate)) every variant
/// describes a caller bug that has already corrupted, or would corrupt, page
/// ownership. The panicking entry points treat all of them as fatal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageAllocError {
    #[error("page allocator used before initialization")]
    Uninitialized,
    #[error("page allocator already initialized")]
    AlreadyInitialized,
    #[error("address {0} is not page aligned")]
    Unaligned(PhysicalAddress),
    #[error("address {0} lies below the allocatable range")]
    BelowRange(PhysicalAddress),
    #[error("address {0} lies at or above the top of memory")]
    AboveRange(PhysicalAddress),
    #[error("page {0} released while already free")]
    DoubleFree(PhysicalAddress),
    #[error("page {0} is not allocated")]
    NotAllocated(PhysicalAddress),
    #[error("reference count of page {0} would drop below zero")]
    RefCountUnderflow(PhysicalAddress),
    #[error("reference count of page {0} overflowed")]
    RefCountOverflow(PhysicalAddress),
}
