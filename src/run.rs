// src/run.rs
// One invocation end to end: FETCH -> (empty ? REPORT_NONE : DELIVER) -> DONE.
// Fetch failures abort; store and per-review delivery failures are collected
// and reported without stopping the rest of the batch.

use chrono::{DateTime, Duration, FixedOffset, Utc};

use crate::error::RunError;
use crate::notify::{render_review, ReviewNotifier};
use crate::reviews::store::SeenSetStore;
use crate::reviews::types::ReviewSource;

/// Reference timezone for the daily check schedule (Pacific, fixed offset).
fn reference_tz() -> FixedOffset {
    FixedOffset::west_opt(8 * 3600).unwrap()
}

const CHECK_HOUR: u32 = 9;

#[derive(Debug, Default)]
pub struct RunResult {
    pub delivered: usize,
    /// Store and per-review delivery failures, human-readable. Non-empty
    /// errors with a nonzero `delivered` is partial success, not failure.
    pub errors: Vec<String>,
}

/// Next 09:00 in the reference timezone: today if not yet passed, else
/// tomorrow.
pub fn next_check_time(now: DateTime<Utc>) -> DateTime<Utc> {
    let tz = reference_tz();
    let local = now.with_timezone(&tz);
    let mut target = local
        .date_naive()
        .and_hms_opt(CHECK_HOUR, 0, 0)
        .unwrap()
        .and_local_timezone(tz)
        .unwrap();
    if local > target {
        target += Duration::days(1);
    }
    target.with_timezone(&Utc)
}

/// Heartbeat text for a run that found nothing new.
pub fn status_message(now: DateTime<Utc>, days: i64) -> String {
    let tz = reference_tz();
    format!(
        "*App Review Check*\n\
         Time: {}\n\
         Status: No new reviews found in the last {} days\n\
         Next check: {}",
        now.with_timezone(&tz).format("%Y-%m-%d %H:%M:%S %:z"),
        days,
        next_check_time(now)
            .with_timezone(&tz)
            .format("%Y-%m-%d %H:%M:%S %:z"),
    )
}

pub async fn run(
    source: &dyn ReviewSource,
    store: &SeenSetStore,
    notifier: &dyn ReviewNotifier,
    app_id: &str,
    days: i64,
    dry_run: bool,
) -> Result<RunResult, RunError> {
    let outcome = crate::reviews::process(source, store, app_id, Duration::days(days)).await?;

    let mut result = RunResult::default();
    if let Some(e) = outcome.store_error {
        result.errors.push(format!("seen-set persistence failed: {e}"));
    }

    if outcome.new_reviews.is_empty() {
        if dry_run {
            println!("No new reviews found in the specified time period.");
        } else {
            let message = status_message(Utc::now(), days);
            if let Err(e) = notifier.notify_status(&message).await {
                tracing::warn!(error = %e, "failed to send status notification");
                result.errors.push(format!("status notification failed: {e}"));
            }
        }
        return Ok(result);
    }

    if dry_run {
        println!("\nFound {} new reviews:", outcome.new_reviews.len());
        for review in &outcome.new_reviews {
            println!("\n{}", render_review(review));
            println!("--------------------------------------------------");
        }
        return Ok(result);
    }

    let mut failed = 0usize;
    for review in &outcome.new_reviews {
        match notifier.notify_review(review).await {
            Ok(()) => result.delivered += 1,
            Err(e) => {
                tracing::error!(review_id = %review.id, error = %e, "delivery failed");
                result.errors.push(format!("review {}: {e}", review.id));
                failed += 1;
            }
        }
    }

    if result.delivered == 0 && failed > 0 {
        return Err(RunError::AllDeliveriesFailed(failed));
    }
    tracing::info!(delivered = result.delivered, failed, "run complete");
    Ok(result)
}
