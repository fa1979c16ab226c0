use std::any::Any;
use std::net::Ipv4Addr;
use std::panic::AssertUnwindSafe;

use futures::{FutureExt, StreamExt};
use tracing::{Level, event};

use crate::core::common::CandidateRecord;
use crate::core::konst::{APP_NAME, IPS_SEPARATOR};
use crate::dns::resolver::{Failure, FailureKind, Outcome, Resolve};
use crate::util::message::{batch_start_msg, batch_summary_msg};
use crate::util::progress::Progress;
use crate::util::result::BatchSummary;

/// Resolve every record that has no addresses yet, writing results back by index.
///
/// At most `concurrency` lookups are in flight at once. Outcomes are merged on
/// the calling task as they complete, in whatever order that happens. Records
/// that already carry addresses are left untouched and do not count towards
/// progress.
pub async fn resolve_batch<R, P>(
    records: &mut [CandidateRecord],
    resolver: &R,
    concurrency: usize,
    progress: &mut P,
) -> BatchSummary
where
    R: Resolve,
    P: Progress,
{
    let pending: Vec<(usize, String)> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| !record.is_resolved())
        .map(|(index, record)| (index, record.subdomain.to_owned()))
        .collect();

    let total = pending.len();
    let mut summary = BatchSummary::new(records.len(), total);

    if pending.is_empty() {
        summary.complete();
        return summary;
    }

    let concurrency = concurrency.max(1);
    event!(target: APP_NAME, Level::INFO, "{}", batch_start_msg(total, summary.skipped, concurrency));
    progress.start(total);

    let mut lookups = futures::stream::iter(pending)
        .map(|(index, subdomain)| async move {
            // A panicking lookup must not take the batch down with it.
            let outcome = AssertUnwindSafe(resolver.resolve(&subdomain))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Outcome::Failed(Failure::new(FailureKind::Other, panic_message(panic))));
            (index, outcome)
        })
        .buffer_unordered(concurrency);

    let mut done = 0;
    while let Some((index, outcome)) = lookups.next().await {
        let record = &mut records[index];
        match &outcome {
            Outcome::Resolved(_) => summary.record_resolved(),
            Outcome::Failed(failure) => {
                event!(target: APP_NAME, Level::TRACE, "{} {}", record.subdomain, failure);
                summary.record_failed(failure.kind)
            }
        }
        merge_outcome(record, outcome);

        done += 1;
        progress.advance(done, total);
    }

    progress.finish();
    summary.complete();
    debug_assert!(summary.is_complete());
    event!(target: APP_NAME, Level::INFO, "{}", batch_summary_msg(&summary));

    summary
}

/// Write a lookup outcome into its record.
pub fn merge_outcome(record: &mut CandidateRecord, outcome: Outcome) {
    match outcome {
        Outcome::Resolved(ips) => {
            record.ips = Some(join_ips(&ips));
            record.valid = true;
            record.reason = None;
        }
        Outcome::Failed(failure) => {
            record.valid = false;
            record.reason = Some(failure.to_string());
        }
    }
}

pub fn join_ips(ips: &[Ipv4Addr]) -> String {
    ips.iter().map(|ip| ip.to_string()).collect::<Vec<String>>().join(IPS_SEPARATOR)
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("lookup panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("lookup panicked: {s}")
    } else {
        "lookup panicked".to_owned()
    }
}
