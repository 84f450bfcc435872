//! Decoder Memory Tests
//!
//! Heap usage of the decoder measured with a counting allocator. Kept in
//! its own test binary so no other test allocates concurrently.

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicUsize, Ordering};

use resplink::protocol::ReplyDecoder;

struct CountingAlloc;

static CURRENT: AtomicUsize = AtomicUsize::new(0);
static PEAK: AtomicUsize = AtomicUsize::new(0);

unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            let now = CURRENT.fetch_add(layout.size(), Ordering::SeqCst) + layout.size();
            PEAK.fetch_max(now, Ordering::SeqCst);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout);
        CURRENT.fetch_sub(layout.size(), Ordering::SeqCst);
    }
}

#[global_allocator]
static ALLOCATOR: CountingAlloc = CountingAlloc;

/// Bytes allocated at peak while running `f`, above what was live before it
fn peak_during<F: FnOnce()>(f: F) -> usize {
    let baseline = CURRENT.load(Ordering::SeqCst);
    PEAK.store(baseline, Ordering::SeqCst);
    f();
    PEAK.load(Ordering::SeqCst) - baseline
}

// =============================================================================
// Allocation Bound Tests
// =============================================================================

#[test]
fn test_large_declared_arrays_allocate_by_input_size() {
    // 500 nested headers each declaring a million children: 5000 bytes
    let mut input = Vec::new();
    for _ in 0..500 {
        input.extend_from_slice(b"*1000000\r\n");
    }
    let mut decoder = ReplyDecoder::new(64 * 1024);

    let peak = peak_during(|| {
        decoder.feed(&input).unwrap();
        assert_eq!(decoder.decode().unwrap(), None);
    });

    assert_eq!(decoder.depth(), 501);
    assert!(
        peak < 1024 * 1024,
        "decoding {} bytes allocated {} bytes",
        input.len(),
        peak
    );
}
