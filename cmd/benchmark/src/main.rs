//! Allocator and pool benchmarks
//!
//! Each suite measures a batch of work per iteration and compares every
//! variant against the first one.
//!
//! Usage: benchmark [iterations] [warmup]
//!
//! RUST_LOG=taskrt_bench=debug cargo run --release -p taskrt-benchmark -- 200 20

use std::hint::black_box;

use taskrt::{
    clobber_memory, do_not_optimize, FreeListAllocator, LinearAllocator, MonotonicAllocator,
    ObjectPool, RawAllocator, Resettable, Suite, ThreadPool, TypedPool, DEFAULT_ITERATIONS,
    DEFAULT_WARMUP,
};
use tracing_subscriber::EnvFilter;

const BATCH: usize = 1000;
const OBJECT_SIZE: usize = 64;

#[derive(Clone, Copy)]
#[allow(dead_code)]
struct Particle {
    position: [f32; 3],
    velocity: [f32; 3],
    mass: f32,
    id: u32,
}

impl Particle {
    fn new(id: u32) -> Self {
        Self {
            position: [id as f32; 3],
            velocity: [0.5; 3],
            mass: 1.0,
            id,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    let mut args = std::env::args().skip(1);
    let iterations = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_ITERATIONS);
    let warmup = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_WARMUP);

    println!("=== taskrt Benchmarks ===");
    println!("iterations={} warmup={} batch={}\n", iterations, warmup, BATCH);

    if let Err(e) = allocator_suite(iterations, warmup) {
        eprintln!("allocator suite failed: {}", e);
        std::process::exit(1);
    }
    pool_suite(iterations, warmup);
}

fn allocator_suite(iterations: usize, warmup: usize) -> Result<(), taskrt::AllocError> {
    let mut suite = Suite::new("Allocation: 1000 x 64B", iterations, warmup);

    suite.add("Box", || {
        let mut boxes = Vec::with_capacity(BATCH);
        for i in 0..BATCH {
            boxes.push(Box::new(Particle::new(i as u32)));
        }
        do_not_optimize(&boxes);
    });

    let mut arena = LinearAllocator::<{ 128 * 1024 }>::boxed();
    suite.add("LinearAllocator", || {
        for _ in 0..BATCH {
            if let Ok(p) = arena.allocate(OBJECT_SIZE, 8) {
                do_not_optimize(&p);
            }
        }
        arena.reset();
    });

    let mut mono = MonotonicAllocator::new(128 * 1024)?;
    suite.add("MonotonicAllocator", || {
        for _ in 0..BATCH {
            if let Ok(p) = mono.allocate(OBJECT_SIZE, 8) {
                do_not_optimize(&p);
            }
        }
        mono.reset();
    });

    let mut pool = ObjectPool::new(OBJECT_SIZE, 8)?;
    let mut slots = Vec::with_capacity(BATCH);
    suite.add("ObjectPool", || {
        for _ in 0..BATCH {
            if let Ok(p) = pool.allocate_slot() {
                slots.push(p);
            }
        }
        for p in slots.drain(..) {
            // SAFETY: every slot came from this pool and is released once
            unsafe { pool.deallocate_slot(p) };
        }
    });

    let mut typed = TypedPool::<Particle>::new()?;
    let mut particles = Vec::with_capacity(BATCH);
    suite.add("TypedPool<Particle>", || {
        for i in 0..BATCH {
            if let Ok(p) = typed.alloc_init(Particle::new(i as u32)) {
                particles.push(p);
            }
        }
        clobber_memory();
        for p in particles.drain(..) {
            // SAFETY: initialised by alloc_init above, destroyed once
            unsafe { typed.destroy(p) };
        }
    });

    let mut heap = FreeListAllocator::new(256 * 1024)?;
    let mut spans = Vec::with_capacity(BATCH);
    suite.add("FreeListAllocator", || {
        for _ in 0..BATCH {
            if let Ok(p) = heap.allocate(OBJECT_SIZE, 8) {
                spans.push(p);
            }
        }
        for p in spans.drain(..) {
            // SAFETY: span came from this heap and is released once
            let _ = unsafe { heap.deallocate(p) };
        }
        heap.reset();
    });

    suite.print_results();
    Ok(())
}

fn work(seed: u64) -> u64 {
    let mut x = seed;
    for _ in 0..2_000 {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    }
    x
}

fn pool_suite(iterations: usize, warmup: usize) {
    const TASKS: u64 = 256;
    let mut suite = Suite::new("Dispatch: 256 tasks", iterations, warmup);

    suite.add("sequential", || {
        let total = (0..TASKS).fold(0u64, |acc, i| acc ^ work(black_box(i)));
        do_not_optimize(&total);
    });

    let pool = ThreadPool::with_default_workers();
    suite.add(format!("ThreadPool({})", pool.thread_count()), || {
        let futures: Vec<_> = (0..TASKS)
            .filter_map(|i| pool.submit(move || work(black_box(i))).ok())
            .collect();
        let total = futures
            .into_iter()
            .filter_map(|f| f.get().ok())
            .fold(0u64, |acc, x| acc ^ x);
        do_not_optimize(&total);
    });

    suite.add("ThreadPool detached + wait_all", || {
        for i in 0..TASKS {
            let _ = pool.submit_detached(move || {
                do_not_optimize(&work(black_box(i)));
            });
        }
        pool.wait_all();
    });

    suite.print_results();
    println!("{}", pool.stats());
}
