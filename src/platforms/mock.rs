//! Synthetic rows served when live data is unavailable.

use chrono::{Duration, NaiveDate, Utc};
use rand::Rng;
use std::ops::RangeInclusive;

use super::{WEEK_DAYS, round2};
use crate::models::{CampaignRow, InsightRow, KeywordRow};

pub struct SeriesProfile {
    pub spend: RangeInclusive<u32>,
    pub roas: (f64, f64),
    pub clicks: RangeInclusive<u64>,
    pub conversions: Option<RangeInclusive<u64>>,
}

pub const META_SERIES: SeriesProfile = SeriesProfile {
    spend: 100..=500,
    roas: (1.5, 4.0),
    clicks: 50..=200,
    conversions: None,
};

pub const GOOGLE_SERIES: SeriesProfile = SeriesProfile {
    spend: 150..=600,
    roas: (2.0, 5.0),
    clicks: 80..=300,
    conversions: Some(5..=50),
};

pub struct CampaignProfile {
    pub names: &'static [&'static str],
    pub impressions: RangeInclusive<u64>,
    pub clicks: RangeInclusive<u64>,
    pub spend: (f64, f64),
    pub cpc: (f64, f64),
    pub ctr: (f64, f64),
    pub conversions: RangeInclusive<u64>,
    pub roas: (f64, f64),
    pub quality_score: Option<RangeInclusive<u8>>,
}

pub const META_CAMPAIGNS: CampaignProfile = CampaignProfile {
    names: &["Brand Awareness", "Lead Generation", "Conversions", "Traffic"],
    impressions: 10_000..=100_000,
    clicks: 500..=5_000,
    spend: (100.0, 1000.0),
    cpc: (0.5, 2.5),
    ctr: (1.0, 5.0),
    conversions: 10..=500,
    roas: (1.5, 6.0),
    quality_score: None,
};

pub const GOOGLE_CAMPAIGNS: CampaignProfile = CampaignProfile {
    names: &[
        "Search - Brand",
        "Search - Generic",
        "Display Network",
        "Shopping",
        "YouTube",
    ],
    impressions: 15_000..=150_000,
    clicks: 800..=8_000,
    spend: (150.0, 1500.0),
    cpc: (0.3, 3.0),
    ctr: (1.5, 6.0),
    conversions: 20..=600,
    roas: (2.0, 8.0),
    quality_score: Some(5..=10),
};

const KEYWORDS: &[&str] = &[
    "marketing automation",
    "digital advertising",
    "social media ads",
    "ppc management",
    "google ads optimization",
];

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// One week of daily rows ending `today`, oldest first.
pub fn insights(profile: &SeriesProfile, today: NaiveDate, rng: &mut impl Rng) -> Vec<InsightRow> {
    (0..WEEK_DAYS as i64)
        .map(|i| {
            let date = today - Duration::days(WEEK_DAYS as i64 - 1 - i);
            InsightRow {
                date: date.format("%Y-%m-%d").to_string(),
                spend: f64::from(rng.gen_range(profile.spend.clone())),
                roas: round2(rng.gen_range(profile.roas.0..profile.roas.1)),
                clicks: rng.gen_range(profile.clicks.clone()),
                conversions: profile
                    .conversions
                    .as_ref()
                    .map(|range| rng.gen_range(range.clone())),
            }
        })
        .collect()
}

pub fn campaigns(profile: &CampaignProfile, rng: &mut impl Rng) -> Vec<CampaignRow> {
    profile
        .names
        .iter()
        .map(|name| CampaignRow {
            campaign: name.to_string(),
            impressions: rng.gen_range(profile.impressions.clone()),
            clicks: rng.gen_range(profile.clicks.clone()),
            spend: round2(rng.gen_range(profile.spend.0..profile.spend.1)),
            cpc: round2(rng.gen_range(profile.cpc.0..profile.cpc.1)),
            ctr: round2(rng.gen_range(profile.ctr.0..profile.ctr.1)),
            conversions: rng.gen_range(profile.conversions.clone()),
            roas: round2(rng.gen_range(profile.roas.0..profile.roas.1)),
            quality_score: profile
                .quality_score
                .as_ref()
                .map(|range| rng.gen_range(range.clone())),
        })
        .collect()
}

pub fn keywords(rng: &mut impl Rng) -> Vec<KeywordRow> {
    KEYWORDS
        .iter()
        .map(|keyword| KeywordRow {
            keyword: keyword.to_string(),
            impressions: rng.gen_range(5_000..=50_000),
            clicks: rng.gen_range(100..=2_000),
            cpc: round2(rng.gen_range(1.0..5.0)),
            position: (rng.gen_range(1.0..4.0_f64) * 10.0).round() / 10.0,
            quality_score: rng.gen_range(6..=10),
        })
        .collect()
}
