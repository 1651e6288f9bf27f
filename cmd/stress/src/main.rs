//! Stress test - many tasks, concurrent submitters, mid-flight shutdown
//!
//! Usage: stress [tasks] [submitters]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use taskrt::{Priority, PriorityThreadPool, ThreadPool};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    println!("=== taskrt Stress Test ===\n");

    let mut args = std::env::args().skip(1);
    let num_tasks: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(100_000);
    let submitters: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(4).max(1);

    fan_in(num_tasks, submitters);
    priority_mix(num_tasks / 10);
    shutdown_under_load(num_tasks / 10);

    println!("\n=== Stress Test Complete ===");
}

/// Several threads submitting detached tasks into one pool
fn fan_in(num_tasks: usize, submitters: usize) {
    println!("[fan-in] {} tasks from {} submitters", num_tasks, submitters);

    let pool = Arc::new(ThreadPool::new(8));
    let completed = Arc::new(AtomicU64::new(0));
    let start = Instant::now();

    let per_thread = num_tasks / submitters;
    let handles: Vec<_> = (0..submitters)
        .map(|_| {
            let pool = Arc::clone(&pool);
            let completed = Arc::clone(&completed);
            thread::spawn(move || {
                for i in 0..per_thread {
                    let completed = Arc::clone(&completed);
                    let _ = pool.submit_detached(move || {
                        std::hint::black_box(i.wrapping_mul(31));
                        completed.fetch_add(1, Ordering::Relaxed);
                    });
                }
            })
        })
        .collect();
    for h in handles {
        let _ = h.join();
    }
    let submit_time = start.elapsed();

    pool.wait_all();
    let total_time = start.elapsed();
    let done = completed.load(Ordering::Relaxed);

    println!("  submitted in {:?}", submit_time);
    println!("  completed {} in {:?}", done, total_time);
    println!(
        "  throughput: {:.0} tasks/sec",
        done as f64 / total_time.as_secs_f64()
    );
    println!("  {}", pool.stats());
    info!(tasks = done, elapsed_ms = total_time.as_millis() as u64, "fan-in finished");
}

/// Random priorities; every future must resolve
fn priority_mix(num_tasks: usize) {
    println!("\n[priority] {} tasks across all levels", num_tasks);

    let pool = PriorityThreadPool::new(4);
    let start = Instant::now();
    let futures: Vec<_> = (0..num_tasks)
        .filter_map(|i| {
            let priority = Priority::from_u8((i % Priority::COUNT) as u8).unwrap_or_default();
            pool.submit(priority, move || (priority, i)).ok()
        })
        .collect();

    let mut per_level = [0u64; Priority::COUNT];
    for f in futures {
        if let Ok((priority, _)) = f.get() {
            per_level[priority.as_u8() as usize] += 1;
        }
    }
    println!("  resolved in {:?}", start.elapsed());
    for p in Priority::iter() {
        println!("  {:<8} {}", p.to_string(), per_level[p.as_u8() as usize]);
    }
    println!("  {}", pool.stats());
}

/// Shut down with a deep queue and check nothing is lost
fn shutdown_under_load(num_tasks: usize) {
    println!("\n[shutdown] {} slow tasks, shutdown after 20ms", num_tasks);

    let pool = ThreadPool::new(4);
    let futures: Vec<_> = (0..num_tasks)
        .filter_map(|_| {
            pool.submit(|| thread::sleep(Duration::from_millis(1))).ok()
        })
        .collect();

    thread::sleep(Duration::from_millis(20));
    pool.shutdown();
    pool.wait_all();

    let (mut ok, mut cancelled, mut failed) = (0u64, 0u64, 0u64);
    for f in futures {
        match f.get() {
            Ok(()) => ok += 1,
            Err(e) if e.is_cancelled() => cancelled += 1,
            Err(_) => failed += 1,
        }
    }
    println!("  completed={} cancelled={} failed={}", ok, cancelled, failed);
    println!("  {}", pool.stats());
    if ok + cancelled + failed != num_tasks as u64 {
        eprintln!("  LOST FUTURES: {}", num_tasks as u64 - ok - cancelled - failed);
        std::process::exit(1);
    }
    pool.join();
}
