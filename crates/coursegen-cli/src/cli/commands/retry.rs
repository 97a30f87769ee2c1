//! `coursegen retry` – reset failed tasks to pending and rerun them.

use anyhow::Result;

use coursegen_core::config::GenConfig;
use coursegen_core::retry::{self, RetryError};
use coursegen_core::scheduler::BatchOptions;

use super::{open_store, print_summary, run_context};

pub async fn run_retry(cfg: &GenConfig, batch_size: Option<usize>) -> Result<()> {
    let store = open_store(cfg)?;
    let ctx = run_context(cfg, store);
    let opts = BatchOptions {
        batch_size: batch_size.unwrap_or(cfg.batch_size),
        batch_delay: cfg.batch_delay(),
    };

    match retry::retry_failed(&ctx, &opts).await {
        Ok(summary) => {
            print_summary(&summary);
            Ok(())
        }
        // Nothing failed: not an operator error.
        Err(RetryError::NoFailedTasks) => {
            println!("No failed tasks to retry.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
