use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::util::result::BatchSummary;

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Count")]
    count: usize,
}

pub fn batch_start_msg(scheduled: usize, skipped: usize, concurrency: usize) -> String {
    format!("Resolving A records for {scheduled} subdomains ({skipped} already resolved, {concurrency} in flight)")
}

pub fn batch_summary_msg(summary: &BatchSummary) -> String {
    format!(
        "Resolved {}/{} subdomains, {} failed, in {:.2}s",
        summary.resolved,
        summary.scheduled,
        summary.failed,
        summary.elapsed.as_secs_f64()
    )
}

pub fn batch_summary_table_msg(summary: &BatchSummary) -> String {
    let mut rows = vec![
        SummaryRow {
            metric: "total".to_owned(),
            count: summary.total,
        },
        SummaryRow {
            metric: "skipped".to_owned(),
            count: summary.skipped,
        },
        SummaryRow {
            metric: "resolved".to_owned(),
            count: summary.resolved,
        },
        SummaryRow {
            metric: "failed".to_owned(),
            count: summary.failed,
        },
    ];
    for (kind, count) in &summary.failures {
        rows.push(SummaryRow {
            metric: format!("  {kind}"),
            count: *count,
        });
    }

    let mut table = Table::new(rows);
    table.with(Style::modern());
    format!("{}\n{}", batch_summary_msg(summary), table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::resolver::FailureKind;

    #[test]
    fn summary_table_lists_failure_kinds() {
        let mut summary = BatchSummary::new(4, 3);
        summary.record_resolved();
        summary.record_failed(FailureKind::Timeout);
        summary.record_failed(FailureKind::NoSuchDomain);

        let table = batch_summary_table_msg(&summary);
        assert!(table.contains("Resolved 1/3 subdomains, 2 failed"));
        assert!(table.contains("NXDOMAIN"));
        assert!(table.contains("Timeout"));
        assert!(table.contains("skipped"));
    }

    #[test]
    fn start_msg_is_expected() {
        assert_eq!(
            batch_start_msg(10, 2, 500),
            "Resolving A records for 10 subdomains (2 already resolved, 500 in flight)"
        );
    }
}
