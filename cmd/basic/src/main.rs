//! Basic taskrt example
//!
//! Submits work to a FIFO pool and a priority pool, then runs a per-task
//! arena inside a worker.
//!
//! # Environment Variables
//!
//! - `TASKRT_NUM_WORKERS=4` - Worker count (defaults to hardware concurrency)
//! - `TASKRT_THREAD_NAME=demo` - Worker thread name prefix
//! - `RUST_LOG=debug` - Tracing filter
//!
//! RUST_LOG=taskrt_runtime=debug cargo run -p taskrt-basic

use std::cell::RefCell;
use std::sync::{Arc, Mutex};

use taskrt::{
    current_worker, AllocVec, AllocatorRef, MemoryUsage, MonotonicAllocator, PoolConfig, Priority,
    PriorityThreadPool, ThreadPool, TracingSink,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    println!("=== taskrt Basic Example ===\n");

    let config = PoolConfig::from_env().log_sink(Arc::new(TracingSink));
    let pool = match ThreadPool::try_with_config(config) {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("failed to start pool: {}", e);
            std::process::exit(1);
        }
    };
    info!(workers = pool.thread_count(), "pool ready");

    // Squares, collected through futures
    let futures: Vec<_> = (1..=10u64)
        .filter_map(|i| pool.submit(move || (i, i * i, current_worker())).ok())
        .collect();
    for f in futures {
        match f.get() {
            Ok((i, sq, worker)) => println!("{:>3}^2 = {:>4}  (worker {:?})", i, sq, worker),
            Err(e) => warn!(error = %e, "task failed"),
        }
    }

    // A panicking task only fails its own future
    if let Ok(f) = pool.submit(|| -> u32 { panic!("deliberate failure") }) {
        match f.get() {
            Ok(_) => println!("unexpected success"),
            Err(e) => println!("panicking task reported: {}", e),
        }
    }

    // Detached panics go to the log sink
    let _ = pool.submit_detached(|| panic!("detached failure"));
    pool.wait_all();

    // Per-task scratch arena
    let summary = pool.submit(|| {
        let arena = RefCell::new(MonotonicAllocator::new(16 * 1024)?);
        let mut words = AllocVec::new_in(AllocatorRef::new(&arena));
        for w in ["thread", "pool", "arena", "bench"] {
            words.push(w)?;
        }
        let used = arena.borrow().bytes_used();
        Ok::<_, taskrt::AllocError>((words.len(), used))
    });
    match summary.map(|f| f.get()) {
        Ok(Ok(Ok((n, used)))) => println!("arena held {} words in {} bytes", n, used),
        Ok(Ok(Err(e))) => warn!(error = %e, "arena exhausted"),
        Ok(Err(e)) => warn!(error = %e, "arena task failed"),
        Err(e) => warn!(error = %e, "submit rejected"),
    }

    println!("\nFIFO pool: {}", pool.stats());
    pool.join();

    // Priority pool: one worker, queued behind a slow task
    let prio = PriorityThreadPool::new(1);
    let _ = prio.submit_detached(Priority::Normal, || {
        std::thread::sleep(std::time::Duration::from_millis(20))
    });
    let order = Arc::new(Mutex::new(Vec::new()));
    for p in [Priority::Low, Priority::Critical, Priority::High, Priority::Normal] {
        let order = Arc::clone(&order);
        let _ = prio.submit_detached(p, move || {
            if let Ok(mut order) = order.lock() {
                order.push(p);
            }
        });
    }
    prio.wait_all();
    if let Ok(order) = order.lock() {
        let names: Vec<String> = order.iter().map(|p| p.to_string()).collect();
        println!("priority completion order: {}", names.join(" "));
    }
    println!("Priority pool: {}", prio.stats());

    println!("\n=== Done ===");
}
