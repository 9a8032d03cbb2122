//! # Waiter Dispatcher
//!
//! Background task that periodically runs the waiter-assignment pass, so
//! newly seated customers get a waiter without anyone calling
//! `POST /table/assign-waiter`.
//!
//! ```text
//!   tick ──► assign_waiter_to_tables() ──► Assigned / NoAvailableWaiters /
//!    ▲                                      NoUnstaffedTables / error(warn)
//!    └──────────── every dispatch_interval_secs until shutdown ◄──────────┘
//! ```

use std::time::Duration;

use oaxaca_core::WaiterAssignment;
use oaxaca_db::TableAllocator;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Starts the dispatcher. It exits once `shutdown` turns `true` or its
/// sender is dropped.
pub fn spawn(
    allocator: TableAllocator,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(period_secs = period.as_secs(), mode = ?allocator.mode(), "Waiter dispatcher started");

        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => run_pass(&allocator).await,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Waiter dispatcher stopped");
    })
}

/// One assignment pass. Failures are logged and retried on the next tick.
pub async fn run_pass(allocator: &TableAllocator) {
    match allocator.assign_waiter_to_tables().await {
        Ok(WaiterAssignment::Assigned { assignments }) => {
            debug!(count = assignments.len(), "Dispatcher assigned waiters");
        }
        Ok(outcome) => debug!(?outcome, "Dispatcher pass made no assignment"),
        Err(e) => warn!(error = %e, "Dispatcher pass failed"),
    }
}
