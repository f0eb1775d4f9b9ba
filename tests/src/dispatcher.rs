use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use netprobe_core::dispatcher::Dispatcher;

/// Drives a large task batch through a small admission limit and checks
/// that the observed parallelism never exceeds it.
#[tokio::test]
async fn concurrency_stays_within_the_admission_limit() {
    let limit = 10;
    let active = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let dispatcher = Dispatcher::new(limit);
    let results = {
        let active = Arc::clone(&active);
        let peak = Arc::clone(&peak);
        dispatcher
            .run_collect((0..200u32).collect(), move |i| {
                let active = Arc::clone(&active);
                let peak = Arc::clone(&peak);
                async move {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(2)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                    Some(i)
                }
            })
            .await
    };

    assert_eq!(results.len(), 200);
    assert!(
        peak.load(Ordering::SeqCst) <= limit,
        "observed {} concurrent tasks with a limit of {}",
        peak.load(Ordering::SeqCst),
        limit
    );
}

/// One address failing must never take its siblings down with it.
#[tokio::test]
async fn one_failing_task_does_not_poison_the_batch() {
    let dispatcher = Dispatcher::new(16);
    let mut results = dispatcher
        .run_collect((0..10u16).collect(), |i| async move {
            if i == 4 { None } else { Some(i) }
        })
        .await;

    results.sort_unstable();
    assert_eq!(results, vec![0, 1, 2, 3, 5, 6, 7, 8, 9]);
}

/// The strict policy surfaces an error, but only after every task had
/// its chance to run.
#[tokio::test]
async fn strict_batches_finish_before_failing() {
    let ran = Arc::new(AtomicUsize::new(0));
    let dispatcher = Dispatcher::new(4);

    let outcome = {
        let ran = Arc::clone(&ran);
        dispatcher
            .run_all((0..25u32).collect(), move |i| {
                let ran = Arc::clone(&ran);
                async move {
                    ran.fetch_add(1, Ordering::SeqCst);
                    if i == 7 {
                        anyhow::bail!("probe transport failed");
                    }
                    Ok(Some(i))
                }
            })
            .await
    };

    assert!(outcome.is_err());
    assert_eq!(ran.load(Ordering::SeqCst), 25);
}
