mod common;

use common::*;
use kernel_page_alloc::{PageRef, PageRelease};

#[test]
fn dropping_the_only_guard_reclaims_the_page() {
    let ram = TestRam::with_frames(FRAMES);
    let pages = booted(&ram);

    let page = pages.allocate_page().unwrap();
    let pa = page.address();
    assert_eq!(page.ref_count(), 1);
    assert!(page.is_private());
    assert_eq!(pages.free_pages(), MANAGED - 1);

    drop(page);
    assert_eq!(pages.free_pages(), MANAGED);
    assert_eq!(pages.ref_count(pa), Some(0));
    assert!(all_bytes_are(&ram.page_bytes(pa), POISON));
}

#[test]
fn each_shared_guard_drops_exactly_one_reference() {
    let ram = TestRam::with_frames(FRAMES);
    let pages = booted(&ram);

    let page = pages.allocate_page().unwrap();
    let cow = page.share();
    let cow2 = cow.share();
    assert_eq!(cow.address(), page.address());
    assert_eq!(page.ref_count(), 3);

    drop(cow);
    assert_eq!(page.ref_count(), 2);
    drop(cow2);
    assert_eq!(page.ref_count(), 1);
    assert_eq!(pages.free_pages(), MANAGED - 1);

    drop(page);
    assert_eq!(pages.free_pages(), MANAGED);
}

#[test]
fn the_first_owner_may_go_first() {
    let ram = TestRam::with_frames(FRAMES);
    let pages = booted(&ram);

    let parent = pages.allocate_page().unwrap();
    let child = parent.share();
    let pa = parent.address();

    assert_eq!(parent.release(), PageRelease::StillShared { remaining: 1 });
    assert!(child.is_private());
    assert_eq!(child.release(), PageRelease::Reclaimed);
    assert_eq!(pages.ref_count(pa), Some(0));
}

#[test]
fn share_by_address_pairs_with_guard_drop() {
    let ram = TestRam::with_frames(FRAMES);
    let pages = booted(&ram);

    let pa = pages.allocate().unwrap();
    {
        let mapping = pages.share(pa);
        assert_eq!(mapping.ref_count(), 2);
    }
    assert_eq!(pages.ref_count(pa), Some(1));
    pages.release(pa);
    assert_eq!(pages.free_pages(), MANAGED);
}

#[test]
fn into_raw_and_from_raw_hand_over_the_reference() {
    let ram = TestRam::with_frames(FRAMES);
    let pages = booted(&ram);

    let pa = pages.allocate_page().unwrap().into_raw();
    assert_eq!(pages.ref_count(pa), Some(1), "into_raw must not release");

    let page = unsafe { PageRef::from_raw(&pages, pa) };
    assert_eq!(page.frame().start_address(), pa);
    drop(page);
    assert_eq!(pages.free_pages(), MANAGED);
}

#[test]
fn copy_on_write_keeps_the_shared_original_intact() {
    let ram = TestRam::with_frames(FRAMES);
    let pages = booted(&ram);

    let parent = pages.allocate_page().unwrap();
    unsafe { parent.as_mut_ptr().write_bytes(0x11, PAGE as usize) };
    let child = parent.share();

    // the child wants to write: shared, so copy first
    let child = if child.is_private() {
        child
    } else {
        let copy = pages.allocate_page().unwrap();
        unsafe {
            copy.as_mut_ptr()
                .copy_from_nonoverlapping(child.as_mut_ptr(), PAGE as usize);
        }
        drop(child);
        copy
    };
    unsafe { child.as_mut_ptr().write_bytes(0x22, 16) };

    assert!(parent.is_private());
    assert!(child.is_private());
    assert_ne!(parent.address(), child.address());
    assert!(all_bytes_are(&ram.page_bytes(parent.address()), 0x11));
    let child_bytes = ram.page_bytes(child.address());
    assert!(all_bytes_are(&child_bytes[..16], 0x22));
    assert!(all_bytes_are(&child_bytes[16..], 0x11));
}

#[test]
fn guards_are_released_on_unwind() {
    let ram = TestRam::with_frames(FRAMES);
    let pages = booted(&ram);

    let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _a = pages.allocate_page().unwrap();
        let _b = pages.allocate_page().unwrap();
        panic!("caller failed mid-request");
    }));
    assert!(res.is_err());
    assert_eq!(pages.free_pages(), MANAGED);
}
