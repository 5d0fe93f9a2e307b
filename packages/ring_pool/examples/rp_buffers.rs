//! Recycling byte buffers between worker threads with the `ring_pool` crate:
//!
//! * Creating a pool shared by several threads.
//! * Renting a buffer, or allocating one when the pool is empty.
//! * Returning buffers for reuse.
//! * Inspecting the pool metrics.

use std::sync::Arc;
use std::thread;

use ring_pool::RingPool;

const CHUNK_SIZE: usize = 64 * 1024;
const WORKERS: usize = 4;
const CHUNKS_PER_WORKER: usize = 1000;

fn main() {
    // The pool never holds more than this many idle buffers. If workers return more buffers
    // than that, the extras are simply dropped.
    let pool = Arc::new(RingPool::<Vec<u8>>::new(8).unwrap());

    let workers = (0..WORKERS)
        .map(|worker| {
            let pool = Arc::clone(&pool);

            thread::spawn(move || {
                let mut checksum = 0_u64;

                for chunk in 0..CHUNKS_PER_WORKER {
                    // Most of the time this reuses a buffer some thread returned earlier.
                    let mut buffer = pool.rent_or_else(|| Vec::with_capacity(CHUNK_SIZE));

                    buffer.clear();
                    buffer.resize(CHUNK_SIZE, (worker + chunk).to_le_bytes()[0]);
                    checksum += buffer.iter().map(|b| u64::from(*b)).sum::<u64>();

                    pool.return_item(buffer);
                }

                checksum
            })
        })
        .collect::<Vec<_>>();

    let checksum = workers
        .into_iter()
        .map(|worker| worker.join().unwrap())
        .sum::<u64>();

    println!("Processed {} chunks, checksum {checksum}", WORKERS * CHUNKS_PER_WORKER);
    println!(
        "Pool holds about {} of {} buffers",
        pool.available_count(),
        pool.capacity()
    );

    println!("{}", nm::Report::collect());
}
