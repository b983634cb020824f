//! Unitary and channel updates reuse the scratch buffers
//!
//! This binary installs a counting global allocator, so it holds a single
//! test to keep other tests' allocations out of the count.

use num_complex::Complex64;
use rhosim_state::{BufferedDensityMatrix, InitialState};
use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicUsize, Ordering};

struct CountingAllocator;

static ALLOCATED: AtomicUsize = AtomicUsize::new(0);

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        ALLOCATED.fetch_add(layout.size(), Ordering::SeqCst);
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }
}

#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator;

fn bytes_allocated_by(f: impl FnOnce()) -> usize {
    let before = ALLOCATED.load(Ordering::SeqCst);
    f();
    ALLOCATED.load(Ordering::SeqCst) - before
}

#[test]
fn test_updates_do_not_allocate_tensor_sized_buffers() {
    let h = std::f64::consts::FRAC_1_SQRT_2;
    let hadamard = vec![
        Complex64::new(h, 0.0),
        Complex64::new(h, 0.0),
        Complex64::new(h, 0.0),
        Complex64::new(-h, 0.0),
    ];
    let dephasing = vec![
        vec![
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
        ],
        vec![
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(1.0, 0.0),
        ],
    ];

    let mut state =
        BufferedDensityMatrix::<f64>::create(&InitialState::Basis(0), &[2; 8]).unwrap();
    let tensor_bytes = state.tensor().len() * std::mem::size_of::<Complex64>();

    let unitary_bytes = bytes_allocated_by(|| state.apply_unitary(&hadamard, &[3]).unwrap());
    let channel_bytes = bytes_allocated_by(|| state.apply_channel(&dephasing, &[5]).unwrap());

    assert!(
        unitary_bytes < tensor_bytes / 64,
        "unitary allocated {} bytes for a {} byte tensor",
        unitary_bytes,
        tensor_bytes
    );
    assert!(
        channel_bytes < tensor_bytes / 64,
        "channel allocated {} bytes for a {} byte tensor",
        channel_bytes,
        tensor_bytes
    );
    assert!((state.trace() - 1.0).abs() < 1e-12);
}
