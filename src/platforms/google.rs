//! Google Ads adapter over the REST `searchStream` endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;

use super::{
    FallbackReason, Fetched, KeywordSource, PlatformSource, mock, non_negative, roas, round2,
    settle_rows, settle_series, skip_live,
};
use crate::config::{Config, GoogleCredentials};
use crate::error::{AgentError, Result};
use crate::models::{
    CampaignRow, InsightRow, KeywordRow, Platform, deserialize_flexible_f64,
    deserialize_flexible_u64,
};
use crate::transport::{ApiRequest, Transport};

const INSIGHTS_QUERY: &str = "
    SELECT
        segments.date,
        metrics.cost_micros,
        metrics.clicks,
        metrics.conversions,
        metrics.conversions_value
    FROM customer
    WHERE segments.date DURING LAST_7_DAYS
    ORDER BY segments.date ASC";

const CAMPAIGNS_QUERY: &str = "
    SELECT
        campaign.name,
        metrics.impressions,
        metrics.clicks,
        metrics.cost_micros,
        metrics.average_cpc,
        metrics.ctr,
        metrics.conversions,
        metrics.conversions_value
    FROM campaign
    WHERE segments.date DURING LAST_30_DAYS
    ORDER BY metrics.impressions DESC
    LIMIT 10";

const KEYWORDS_QUERY: &str = "
    SELECT
        ad_group_criterion.keyword.text,
        metrics.impressions,
        metrics.clicks,
        metrics.average_cpc,
        metrics.historical_quality_score
    FROM keyword_view
    WHERE segments.date DURING LAST_30_DAYS
    ORDER BY metrics.impressions DESC
    LIMIT 10";

const MICROS: f64 = 1_000_000.0;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct SearchBatch<R> {
    #[serde(default = "Vec::new")]
    results: Vec<R>,
}

/// Metric columns shared by every query. Proto3 JSON omits zero values and
/// encodes int64 as strings, hence the flexible defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Metrics {
    #[serde(default, deserialize_with = "deserialize_flexible_u64")]
    cost_micros: u64,
    #[serde(default, deserialize_with = "deserialize_flexible_u64")]
    impressions: u64,
    #[serde(default, deserialize_with = "deserialize_flexible_u64")]
    clicks: u64,
    #[serde(default, deserialize_with = "deserialize_flexible_f64")]
    conversions: f64,
    #[serde(default, deserialize_with = "deserialize_flexible_f64")]
    conversions_value: f64,
    #[serde(default, deserialize_with = "deserialize_flexible_f64")]
    average_cpc: f64,
    #[serde(default, deserialize_with = "deserialize_flexible_f64")]
    ctr: f64,
    #[serde(default, deserialize_with = "deserialize_flexible_u64")]
    historical_quality_score: u64,
}

impl Metrics {
    fn spend(&self) -> f64 {
        self.cost_micros as f64 / MICROS
    }

    fn conversions(&self) -> Result<u64> {
        Ok(non_negative(self.conversions, "conversions")?.round() as u64)
    }
}

#[derive(Debug, Deserialize)]
struct Segments {
    date: String,
}

#[derive(Debug, Deserialize)]
struct DailyResult {
    segments: Segments,
    #[serde(default)]
    metrics: Metrics,
}

#[derive(Debug, Default, Deserialize)]
struct CampaignRef {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CampaignResult {
    #[serde(default)]
    campaign: CampaignRef,
    #[serde(default)]
    metrics: Metrics,
}

#[derive(Debug, Deserialize)]
struct Keyword {
    text: String,
}

#[derive(Debug, Deserialize)]
struct Criterion {
    keyword: Keyword,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeywordResult {
    ad_group_criterion: Criterion,
    #[serde(default)]
    metrics: Metrics,
}

impl DailyResult {
    fn into_row(self) -> Result<InsightRow> {
        let spend = self.metrics.spend();
        let revenue = non_negative(self.metrics.conversions_value, "conversions_value")?;
        Ok(InsightRow {
            date: self.segments.date,
            spend: round2(spend),
            roas: roas(revenue, spend),
            clicks: self.metrics.clicks,
            conversions: Some(self.metrics.conversions()?),
        })
    }
}

impl CampaignResult {
    fn into_row(self) -> Result<CampaignRow> {
        let m = &self.metrics;
        let spend = m.spend();
        Ok(CampaignRow {
            campaign: self
                .campaign
                .name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "Unnamed".to_string()),
            impressions: m.impressions,
            clicks: m.clicks,
            spend: round2(spend),
            cpc: round2(non_negative(m.average_cpc, "average_cpc")? / MICROS),
            ctr: round2(non_negative(m.ctr, "ctr")? * 100.0),
            conversions: m.conversions()?,
            roas: roas(non_negative(m.conversions_value, "conversions_value")?, spend),
            // Quality score is keyword-level; campaigns have none.
            quality_score: None,
        })
    }
}

impl KeywordResult {
    fn into_row(self) -> Result<KeywordRow> {
        let m = &self.metrics;
        Ok(KeywordRow {
            keyword: self.ad_group_criterion.keyword.text,
            impressions: m.impressions,
            clicks: m.clicks,
            cpc: round2(non_negative(m.average_cpc, "average_cpc")? / MICROS),
            // Average position was retired from the API
            position: 0.0,
            quality_score: u8::try_from(m.historical_quality_score.min(10)).unwrap_or(10),
        })
    }
}

pub struct GoogleSource {
    config: Arc<Config>,
    tx: Arc<dyn Transport>,
}

impl GoogleSource {
    pub fn new(config: Arc<Config>, tx: Arc<dyn Transport>) -> Self {
        Self { config, tx }
    }

    fn live_credentials(&self) -> std::result::Result<GoogleCredentials<'_>, FallbackReason> {
        if self.config.data.use_mock_data {
            return Err(FallbackReason::MockMode);
        }
        self.config
            .google
            .credentials()
            .map_err(FallbackReason::MissingCredentials)
    }

    /// Exchange the long-lived refresh token for an access token.
    async fn access_token(&self, creds: &GoogleCredentials<'_>) -> Result<String> {
        let req = ApiRequest::post(self.config.google.token_url.as_str()).form(&[
            ("client_id", creds.client_id),
            ("client_secret", creds.client_secret),
            ("refresh_token", creds.refresh_token),
            ("grant_type", "refresh_token"),
        ]);
        let token: TokenResponse = serde_json::from_value(self.tx.send(req).await?)?;
        Ok(token.access_token)
    }

    async fn search<R>(&self, creds: GoogleCredentials<'_>, query: &str) -> Result<Vec<R>>
    where
        R: DeserializeOwned + Send,
    {
        let access_token = self.access_token(&creds).await?;
        let customer_id: String = creds.customer_id.chars().filter(|c| *c != '-').collect();
        let url = format!(
            "{}/{}/customers/{}/googleAds:searchStream",
            self.config.google.ads_url.trim_end_matches('/'),
            self.config.google.api_version,
            customer_id
        );

        let mut req = ApiRequest::post(url)
            .header("Authorization", format!("Bearer {access_token}"))
            .header("developer-token", creds.developer_token)
            .json(json!({ "query": query }));
        if let Some(login) = creds.login_customer_id {
            req = req.header("login-customer-id", login.replace('-', ""));
        }

        let value = self.tx.send(req).await?;
        if !value.is_array() {
            return Err(AgentError::Schema(
                "searchStream response is not a batch array".to_string(),
            ));
        }
        let batches: Vec<SearchBatch<R>> = serde_json::from_value(value)?;
        Ok(batches.into_iter().flat_map(|b| b.results).collect())
    }

    async fn fetch_insights(&self, creds: GoogleCredentials<'_>) -> Result<Vec<InsightRow>> {
        let results: Vec<DailyResult> = self.search(creds, INSIGHTS_QUERY).await?;
        let mut rows = results
            .into_iter()
            .map(DailyResult::into_row)
            .collect::<Result<Vec<_>>>()?;
        rows.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(rows)
    }

    async fn fetch_campaigns(&self, creds: GoogleCredentials<'_>) -> Result<Vec<CampaignRow>> {
        let results: Vec<CampaignResult> = self.search(creds, CAMPAIGNS_QUERY).await?;
        results.into_iter().map(CampaignResult::into_row).collect()
    }

    async fn fetch_keywords(&self, creds: GoogleCredentials<'_>) -> Result<Vec<KeywordRow>> {
        let results: Vec<KeywordResult> = self.search(creds, KEYWORDS_QUERY).await?;
        results.into_iter().map(KeywordResult::into_row).collect()
    }
}

#[async_trait]
impl PlatformSource for GoogleSource {
    fn platform(&self) -> Platform {
        Platform::Google
    }

    async fn insights(&self) -> Fetched<Vec<InsightRow>> {
        let today = mock::today();
        let mock_week = || mock::insights(&mock::GOOGLE_SERIES, today, &mut rand::thread_rng());

        let outcome = match self.live_credentials() {
            Ok(creds) => self.fetch_insights(creds).await,
            Err(reason) => return skip_live(self.platform(), "insights", reason, mock_week),
        };
        settle_series(self.platform(), outcome, mock_week)
    }

    async fn campaign_summary(&self) -> Fetched<Vec<CampaignRow>> {
        let mock_rows = || mock::campaigns(&mock::GOOGLE_CAMPAIGNS, &mut rand::thread_rng());

        let outcome = match self.live_credentials() {
            Ok(creds) => self.fetch_campaigns(creds).await,
            Err(reason) => {
                return skip_live(self.platform(), "campaign_summary", reason, mock_rows);
            }
        };
        settle_rows(self.platform(), "campaign_summary", outcome, mock_rows)
    }
}

#[async_trait]
impl KeywordSource for GoogleSource {
    async fn keyword_performance(&self) -> Fetched<Vec<KeywordRow>> {
        let mock_rows = || mock::keywords(&mut rand::thread_rng());

        let outcome = match self.live_credentials() {
            Ok(creds) => self.fetch_keywords(creds).await,
            Err(reason) => return skip_live(self.platform(), "keywords", reason, mock_rows),
        };
        settle_rows(self.platform(), "keywords", outcome, mock_rows)
    }
}
