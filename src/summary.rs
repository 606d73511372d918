use crate::models::{InsightRow, PerformanceSummary, PlatformTotals};
use crate::platforms::round2;

pub const SUMMARY_PERIOD: &str = "Last 7 days";

fn mean_roas(series: &[InsightRow]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    series.iter().map(|r| r.roas).sum::<f64>() / series.len() as f64
}

fn totals(series: &[InsightRow]) -> PlatformTotals {
    PlatformTotals {
        total_spend: series.iter().map(|r| r.spend).sum(),
        avg_roas: round2(mean_roas(series)),
        total_clicks: series.iter().map(|r| r.clicks).sum(),
    }
}

/// Aggregate both platforms' weekly series into the dashboard overview.
pub fn summarize(meta: &[InsightRow], google: &[InsightRow]) -> PerformanceSummary {
    let meta_totals = totals(meta);
    let google_totals = totals(google);

    let combined = PlatformTotals {
        total_spend: meta_totals.total_spend + google_totals.total_spend,
        // Averaged from the unrounded platform means
        avg_roas: round2((mean_roas(meta) + mean_roas(google)) / 2.0),
        total_clicks: meta_totals.total_clicks + google_totals.total_clicks,
    };

    PerformanceSummary {
        period: SUMMARY_PERIOD.to_string(),
        meta: meta_totals,
        google: google_totals,
        combined,
    }
}
