//! Submits six range-summation tasks to an elastic pool and prints the
//! result retrieved through each handle.
//!
//! Run with `RUST_LOG=info` to watch elastic workers spawn and retire.

use std::thread;
use std::time::Duration;
use task_pool::prelude::*;

struct RangeSum {
    begin: u64,
    end: u64,
}

impl Task for RangeSum {
    fn run(&mut self) -> ValueBox {
        println!("{:?} summing [{}, {}]", thread::current().name(), self.begin, self.end);
        // Simulate a slow computation so the backlog forces elastic growth
        thread::sleep(Duration::from_secs(1));
        ValueBox::new((self.begin..=self.end).sum::<u64>())
    }

    fn task_type(&self) -> &str {
        "RangeSum"
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let config = PoolConfig::new()
        .with_mode(PoolMode::Elastic)
        .with_max_threads(10);
    let pool = ThreadPool::with_config(config)?;
    pool.start(4)?;

    let handles: Vec<TaskHandle> = (0..6u64)
        .map(|i| {
            pool.submit(RangeSum {
                begin: i * 1000 + 1,
                end: (i + 1) * 1000,
            })
        })
        .collect::<Result<_>>()?;

    for (i, handle) in handles.into_iter().enumerate() {
        let sum: u64 = handle.get().take()?;
        println!("range {}: sum = {}", i, sum);
    }

    println!("threads at peak: {}", pool.current_threads());
    pool.shutdown()?;
    Ok(())
}
