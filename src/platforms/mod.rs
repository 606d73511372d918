//! Ad platform data adapters.
//!
//! Every adapter call resolves to data: the live API response reshaped into
//! the chart rows, or synthetic rows when mock mode is on, credentials are
//! missing, or the live call fails. [`Fetched::provenance`] records which of
//! those happened.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{CampaignRow, InsightRow, KeywordRow, Platform};

pub mod google;
pub mod meta;
pub mod mock;

pub use google::GoogleSource;
pub use meta::MetaSource;

/// Length of the daily series every `insights()` call returns.
pub const WEEK_DAYS: usize = 7;

#[derive(Debug, Clone, PartialEq)]
pub enum FallbackReason {
    /// `use_mock_data` is switched on.
    MockMode,
    MissingCredentials(Vec<&'static str>),
    /// The live call succeeded but returned no rows.
    Empty,
    /// Transport, upstream status or schema failure.
    Upstream(String),
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MockMode => f.write_str("mock mode enabled"),
            Self::MissingCredentials(names) => {
                write!(f, "missing credentials: {}", names.join(", "))
            }
            Self::Empty => f.write_str("live call returned no rows"),
            Self::Upstream(detail) => write!(f, "live call failed: {detail}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Provenance {
    Live,
    /// Live series that was shorter than a week and topped up with mock rows.
    /// The synthetic rows are not date-aligned with the live ones.
    Padded { synthetic_rows: usize },
    Fallback(FallbackReason),
}

/// Data returned across the adapter boundary, tagged with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub data: T,
    pub provenance: Provenance,
}

impl<T> Fetched<T> {
    pub fn live(data: T) -> Self {
        Self {
            data,
            provenance: Provenance::Live,
        }
    }

    pub fn fallback(data: T, reason: FallbackReason) -> Self {
        Self {
            data,
            provenance: Provenance::Fallback(reason),
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self.provenance, Provenance::Live)
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.provenance, Provenance::Fallback(_))
    }

    pub fn into_data(self) -> T {
        self.data
    }
}

#[async_trait]
pub trait PlatformSource: Send + Sync {
    fn platform(&self) -> Platform;

    /// Exactly [`WEEK_DAYS`] daily rows, oldest first.
    async fn insights(&self) -> Fetched<Vec<InsightRow>>;

    async fn campaign_summary(&self) -> Fetched<Vec<CampaignRow>>;
}

#[async_trait]
pub trait KeywordSource: Send + Sync {
    async fn keyword_performance(&self) -> Fetched<Vec<KeywordRow>>;
}

/// Round to two decimal places, the precision every money/ratio field is reported in.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Return on ad spend. Zero spend yields zero rather than dividing.
pub fn roas(revenue: f64, spend: f64) -> f64 {
    if spend > 0.0 {
        round2(revenue / spend)
    } else {
        0.0
    }
}

/// Reject negative amounts coming back from an upstream API.
pub(crate) fn non_negative(value: f64, field: &str) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(crate::error::AgentError::Schema(format!(
            "{field} must be a non-negative number, got {value}"
        )))
    }
}

/// Substitute mock data without attempting a live call.
pub(crate) fn skip_live<T>(
    platform: Platform,
    operation: &str,
    reason: FallbackReason,
    mock: impl FnOnce() -> T,
) -> Fetched<T> {
    match &reason {
        FallbackReason::MockMode => {
            tracing::debug!(%platform, operation, "Serving mock data: {}", reason)
        }
        _ => tracing::warn!(%platform, operation, "Serving mock data: {}", reason),
    }
    Fetched::fallback(mock(), reason)
}

/// Resolve a live row-list call, falling back to mock rows on error or an empty result.
pub(crate) fn settle_rows<R>(
    platform: Platform,
    operation: &str,
    outcome: Result<Vec<R>>,
    mock: impl FnOnce() -> Vec<R>,
) -> Fetched<Vec<R>> {
    match outcome {
        Ok(rows) if rows.is_empty() => skip_live(platform, operation, FallbackReason::Empty, mock),
        Ok(rows) => {
            tracing::info!(%platform, operation, rows = rows.len(), "Live data fetched");
            Fetched::live(rows)
        }
        Err(e) => skip_live(
            platform,
            operation,
            FallbackReason::Upstream(e.to_string()),
            mock,
        ),
    }
}

/// Resolve a live daily series and force it to exactly one week.
pub(crate) fn settle_series(
    platform: Platform,
    outcome: Result<Vec<InsightRow>>,
    mock: impl FnOnce() -> Vec<InsightRow>,
) -> Fetched<Vec<InsightRow>> {
    match outcome {
        Ok(rows) if !rows.is_empty() => {
            let fetched = fit_week(rows, mock);
            match fetched.provenance {
                Provenance::Padded { synthetic_rows } => tracing::warn!(
                    %platform,
                    synthetic_rows,
                    "Live insights shorter than a week, padded with mock rows"
                ),
                _ => tracing::info!(%platform, "Live insights fetched"),
            }
            fetched
        }
        other => settle_rows(platform, "insights", other, mock),
    }
}

/// Trim a live series to its most recent week or pad a short one with mock
/// rows. Padding appends the leading mock rows as-is, so their dates may
/// overlap or skip relative to the live rows.
pub fn fit_week(
    mut rows: Vec<InsightRow>,
    mock: impl FnOnce() -> Vec<InsightRow>,
) -> Fetched<Vec<InsightRow>> {
    if rows.len() > WEEK_DAYS {
        rows.drain(..rows.len() - WEEK_DAYS);
    }
    if rows.len() == WEEK_DAYS {
        return Fetched::live(rows);
    }

    let missing = WEEK_DAYS - rows.len();
    rows.extend(mock().into_iter().take(missing));
    Fetched {
        data: rows,
        provenance: Provenance::Padded {
            synthetic_rows: missing,
        },
    }
}
