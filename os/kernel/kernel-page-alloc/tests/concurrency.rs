mod common;

use common::*;
use kernel_memory_addresses::PhysicalAddress;
use kernel_page_alloc::PageAllocator;
use std::collections::HashSet;
use std::sync::{Barrier, Mutex};
use std::thread;

const BIG_FRAMES: usize = 256;
const BIG_TOP: PhysicalAddress = PhysicalAddress::new(BIG_FRAMES as u64 * PAGE);

#[test]
fn parallel_allocate_release_never_hands_out_a_page_twice() {
    let threads = 8;
    let rounds = 500;
    let per_round = 4;

    let ram = TestRam::with_frames(BIG_FRAMES);
    let pages = PageAllocator::<_, BIG_FRAMES>::new(&ram);
    unsafe { pages.init(KERNEL_END, BIG_TOP) };
    let initial = pages.free_pages();

    let live = Mutex::new(HashSet::new());
    let start = Barrier::new(threads);

    thread::scope(|s| {
        for t in 0..threads {
            let (pages, ram, live, start) = (&pages, &ram, &live, &start);
            s.spawn(move || {
                let tag = u8::try_from(t).unwrap() + 0x10;
                start.wait();
                for _ in 0..rounds {
                    let mut mine = Vec::with_capacity(per_round);
                    for _ in 0..per_round {
                        let pa = pages.allocate().expect("pool sized for all threads");
                        assert!(live.lock().unwrap().insert(pa), "{pa} handed out twice");
                        ram.fill_page(pa, tag);
                        mine.push(pa);
                    }
                    for pa in mine {
                        assert!(all_bytes_are(&ram.page_bytes(pa), tag), "{pa} written by another thread");
                        assert!(live.lock().unwrap().remove(&pa));
                        pages.release(pa);
                    }
                }
            });
        }
    });

    assert_eq!(pages.free_pages(), initial);
    let stats = pages.stats();
    assert_eq!(stats.allocated, 0);
    assert_eq!(stats.free, stats.total);
}

#[test]
fn parallel_sharing_of_one_page_balances_out() {
    let threads = 8;
    let rounds = 2_000;

    let ram = TestRam::with_frames(FRAMES);
    let pages = booted(&ram);
    let pa = pages.allocate().unwrap();
    let free_before = pages.free_pages();

    thread::scope(|s| {
        for _ in 0..threads {
            let pages = &pages;
            s.spawn(move || {
                for _ in 0..rounds {
                    let mapping = pages.share(pa);
                    assert!(mapping.ref_count() >= 2);
                    drop(mapping);
                }
            });
        }
    });

    assert_eq!(pages.ref_count(pa), Some(1));
    assert_eq!(pages.free_pages(), free_before);
    pages.release(pa);
    assert_eq!(pages.free_pages(), free_before + 1);
}

#[test]
fn contended_exhaustion_hands_out_every_page_once() {
    let threads = 8;

    let ram = TestRam::with_frames(FRAMES);
    let pages = booted(&ram);
    let start = Barrier::new(threads);

    let grabbed: Vec<Vec<PhysicalAddress>> = thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let (pages, start) = (&pages, &start);
                s.spawn(move || {
                    start.wait();
                    std::iter::from_fn(|| pages.allocate()).collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let all: HashSet<_> = grabbed.iter().flatten().copied().collect();
    assert_eq!(all.len(), MANAGED);
    assert_eq!(grabbed.iter().map(Vec::len).sum::<usize>(), MANAGED);
    assert_eq!(pages.free_pages(), 0);
}
