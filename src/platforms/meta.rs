//! Meta (Facebook / Instagram) Marketing API adapter.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use serde::Deserialize;
use std::sync::Arc;

use super::{
    FallbackReason, Fetched, PlatformSource, WEEK_DAYS, mock, non_negative, roas, round2,
    settle_rows, settle_series, skip_live,
};
use crate::config::{Config, MetaCredentials};
use crate::error::Result;
use crate::models::{
    CampaignRow, InsightRow, Platform, deserialize_flexible_f64, deserialize_flexible_u64,
};
use crate::transport::{ApiRequest, Transport};

const CONVERSION_ACTION: &str = "offsite_conversion";

#[derive(Debug, Deserialize)]
struct InsightsPage<T> {
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ActionStat {
    action_type: String,
    #[serde(default, deserialize_with = "deserialize_flexible_f64")]
    value: f64,
}

#[derive(Debug, Deserialize)]
struct DailyInsight {
    date_start: String,
    #[serde(default, deserialize_with = "deserialize_flexible_f64")]
    spend: f64,
    #[serde(default, deserialize_with = "deserialize_flexible_u64")]
    clicks: u64,
    #[serde(default)]
    actions: Vec<ActionStat>,
    #[serde(default)]
    action_values: Vec<ActionStat>,
}

#[derive(Debug, Deserialize)]
struct CampaignInsight {
    #[serde(default)]
    campaign_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flexible_u64")]
    impressions: u64,
    #[serde(default, deserialize_with = "deserialize_flexible_u64")]
    clicks: u64,
    #[serde(default, deserialize_with = "deserialize_flexible_f64")]
    spend: f64,
    #[serde(default, deserialize_with = "deserialize_flexible_f64")]
    cpc: f64,
    #[serde(default, deserialize_with = "deserialize_flexible_f64")]
    ctr: f64,
    #[serde(default)]
    actions: Vec<ActionStat>,
    #[serde(default)]
    action_values: Vec<ActionStat>,
}

fn conversion_stat(stats: &[ActionStat]) -> Option<f64> {
    stats
        .iter()
        .find(|s| s.action_type == CONVERSION_ACTION)
        .map(|s| s.value)
}

impl DailyInsight {
    fn into_row(self) -> Result<InsightRow> {
        let spend = non_negative(self.spend, "spend")?;
        let revenue = conversion_stat(&self.action_values)
            .or_else(|| conversion_stat(&self.actions))
            .unwrap_or(0.0);
        Ok(InsightRow {
            date: self.date_start,
            spend,
            roas: roas(non_negative(revenue, "revenue")?, spend),
            clicks: self.clicks,
            conversions: None,
        })
    }
}

impl CampaignInsight {
    fn into_row(self) -> Result<CampaignRow> {
        let spend = non_negative(self.spend, "spend")?;
        let revenue = non_negative(
            conversion_stat(&self.action_values).unwrap_or(0.0),
            "revenue",
        )?;
        let conversions = non_negative(
            conversion_stat(&self.actions).unwrap_or(0.0),
            "conversions",
        )?;
        Ok(CampaignRow {
            campaign: self
                .campaign_name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "Unnamed".to_string()),
            impressions: self.impressions,
            clicks: self.clicks,
            spend: round2(spend),
            cpc: round2(non_negative(self.cpc, "cpc")?),
            ctr: round2(non_negative(self.ctr, "ctr")?),
            conversions: conversions.round() as u64,
            roas: roas(revenue, spend),
            quality_score: None,
        })
    }
}

pub struct MetaSource {
    config: Arc<Config>,
    tx: Arc<dyn Transport>,
}

impl MetaSource {
    pub fn new(config: Arc<Config>, tx: Arc<dyn Transport>) -> Self {
        Self { config, tx }
    }

    fn live_credentials(&self) -> std::result::Result<MetaCredentials<'_>, FallbackReason> {
        if self.config.data.use_mock_data {
            return Err(FallbackReason::MockMode);
        }
        self.config
            .meta
            .credentials()
            .map_err(FallbackReason::MissingCredentials)
    }

    fn insights_url(&self, creds: &MetaCredentials<'_>) -> String {
        format!(
            "{}/{}/act_{}/insights",
            self.config.meta.graph_url.trim_end_matches('/'),
            self.config.meta.api_version,
            creds.ad_account_id.trim_start_matches("act_")
        )
    }

    async fn fetch_insights(
        &self,
        creds: MetaCredentials<'_>,
        today: NaiveDate,
    ) -> Result<Vec<InsightRow>> {
        let since = today - Duration::days(WEEK_DAYS as i64 - 1);
        let time_range = serde_json::json!({
            "since": since.to_string(),
            "until": today.to_string(),
        });

        let req = ApiRequest::get(self.insights_url(&creds))
            .query("access_token", creds.access_token)
            .query("time_range", time_range.to_string())
            .query("level", "account")
            .query("time_increment", "1")
            .query("fields", "spend,clicks,actions,action_values");

        let page: InsightsPage<DailyInsight> = serde_json::from_value(self.tx.send(req).await?)?;
        let mut rows = page
            .data
            .into_iter()
            .map(DailyInsight::into_row)
            .collect::<Result<Vec<_>>>()?;
        rows.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(rows)
    }

    async fn fetch_campaigns(&self, creds: MetaCredentials<'_>) -> Result<Vec<CampaignRow>> {
        let req = ApiRequest::get(self.insights_url(&creds))
            .query("access_token", creds.access_token)
            .query("level", "campaign")
            .query("date_preset", "last_30d")
            .query(
                "fields",
                "campaign_name,impressions,clicks,spend,cpc,ctr,actions,action_values",
            );

        let page: InsightsPage<CampaignInsight> =
            serde_json::from_value(self.tx.send(req).await?)?;
        page.data.into_iter().map(CampaignInsight::into_row).collect()
    }
}

#[async_trait]
impl PlatformSource for MetaSource {
    fn platform(&self) -> Platform {
        Platform::Meta
    }

    async fn insights(&self) -> Fetched<Vec<InsightRow>> {
        let today = mock::today();
        let mock_week = || mock::insights(&mock::META_SERIES, today, &mut rand::thread_rng());

        let outcome = match self.live_credentials() {
            Ok(creds) => self.fetch_insights(creds, today).await,
            Err(reason) => return skip_live(self.platform(), "insights", reason, mock_week),
        };
        settle_series(self.platform(), outcome, mock_week)
    }

    async fn campaign_summary(&self) -> Fetched<Vec<CampaignRow>> {
        let mock_rows = || mock::campaigns(&mock::META_CAMPAIGNS, &mut rand::thread_rng());

        let outcome = match self.live_credentials() {
            Ok(creds) => self.fetch_campaigns(creds).await,
            Err(reason) => {
                return skip_live(self.platform(), "campaign_summary", reason, mock_rows);
            }
        };
        settle_rows(self.platform(), "campaign_summary", outcome, mock_rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentError;
    use crate::platforms::Provenance;
    use crate::transport::MockTransport;
    use serde_json::json;

    fn live_config() -> Arc<Config> {
        let mut cfg = Config::default();
        cfg.data.use_mock_data = false;
        cfg.meta.access_token = Some("token".into());
        cfg.meta.ad_account_id = Some("act_42".into());
        cfg.meta.app_id = Some("app".into());
        cfg.meta.app_secret = Some("secret".into());
        Arc::new(cfg)
    }

    fn day(date: &str, spend: &str, revenue: &str) -> serde_json::Value {
        json!({
            "date_start": date,
            "date_stop": date,
            "spend": spend,
            "clicks": "40",
            "action_values": [{"action_type": "offsite_conversion", "value": revenue}]
        })
    }

    #[tokio::test]
    async fn test_live_insights_are_reshaped() {
        let mut tx = MockTransport::new();
        tx.expect_send()
            .withf(|req| {
                req.url == "https://graph.facebook.com/v18.0/act_42/insights"
                    && req.query_value("access_token") == Some("token")
                    && req.query_value("level") == Some("account")
                    && req.query_value("time_increment") == Some("1")
            })
            .times(1)
            .returning(|_| {
                let data: Vec<_> = (1..=7)
                    .rev()
                    .map(|d| day(&format!("2024-01-0{d}"), "100.00", "250"))
                    .collect();
                Ok(json!({ "data": data }))
            });

        let source = MetaSource::new(live_config(), Arc::new(tx));
        let fetched = source.insights().await;

        assert!(fetched.is_live());
        assert_eq!(fetched.data.len(), WEEK_DAYS);
        assert_eq!(fetched.data[0].date, "2024-01-01");
        assert_eq!(fetched.data[6].date, "2024-01-07");
        assert!(fetched.data.iter().all(|r| r.roas == 2.5 && r.clicks == 40));
    }

    #[tokio::test]
    async fn test_zero_spend_day_has_zero_roas() {
        let mut tx = MockTransport::new();
        tx.expect_send().returning(|_| {
            let data: Vec<_> = (1..=7)
                .map(|d| day(&format!("2024-01-0{d}"), "0", "90"))
                .collect();
            Ok(json!({ "data": data }))
        });

        let fetched = MetaSource::new(live_config(), Arc::new(tx)).insights().await;
        assert!(fetched.data.iter().all(|r| r.roas == 0.0 && r.spend == 0.0));
    }

    #[tokio::test]
    async fn test_short_live_series_is_padded_to_a_week() {
        let mut tx = MockTransport::new();
        tx.expect_send().returning(|_| {
            Ok(json!({ "data": [day("2024-01-06", "50", "100"), day("2024-01-07", "50", "100")] }))
        });

        let fetched = MetaSource::new(live_config(), Arc::new(tx)).insights().await;
        assert_eq!(fetched.provenance, Provenance::Padded { synthetic_rows: 5 });
        assert_eq!(fetched.data.len(), WEEK_DAYS);
        assert_eq!(fetched.data[0].roas, 2.0);
    }

    #[tokio::test]
    async fn test_transport_failure_falls_back_to_mock() {
        let mut tx = MockTransport::new();
        tx.expect_send().times(2).returning(|_| {
            Err(AgentError::Upstream {
                status: 400,
                body: "Invalid OAuth access token".into(),
            })
        });

        let source = MetaSource::new(live_config(), Arc::new(tx));
        let insights = source.insights().await;
        assert!(insights.is_fallback());
        assert_eq!(insights.data.len(), WEEK_DAYS);
        assert!(insights.data.iter().all(|r| r.spend >= 0.0));

        let campaigns = source.campaign_summary().await;
        assert!(campaigns.is_fallback());
        assert_eq!(campaigns.data.len(), mock::META_CAMPAIGNS.names.len());
    }

    #[tokio::test]
    async fn test_malformed_payload_falls_back_to_mock() {
        let mut tx = MockTransport::new();
        tx.expect_send()
            .returning(|_| Ok(json!({"error": {"message": "nope"}})));

        let fetched = MetaSource::new(live_config(), Arc::new(tx)).insights().await;
        assert!(matches!(
            fetched.provenance,
            Provenance::Fallback(FallbackReason::Upstream(_))
        ));
        assert_eq!(fetched.data.len(), WEEK_DAYS);
    }

    #[tokio::test]
    async fn test_missing_credentials_skip_the_network() {
        let mut cfg = (*live_config()).clone();
        cfg.meta.app_secret = None;
        let mut tx = MockTransport::new();
        tx.expect_send().never();

        let fetched = MetaSource::new(Arc::new(cfg), Arc::new(tx)).insights().await;
        assert_eq!(
            fetched.provenance,
            Provenance::Fallback(FallbackReason::MissingCredentials(vec!["META_APP_SECRET"]))
        );
    }

    #[tokio::test]
    async fn test_mock_mode_skips_the_network() {
        let mut tx = MockTransport::new();
        tx.expect_send().never();

        let source = MetaSource::new(Arc::new(Config::default()), Arc::new(tx));
        assert_eq!(source.platform(), Platform::Meta);
        let campaigns = source.campaign_summary().await;
        assert_eq!(
            campaigns.provenance,
            Provenance::Fallback(FallbackReason::MockMode)
        );
    }

    #[tokio::test]
    async fn test_live_campaign_summary() {
        let mut tx = MockTransport::new();
        tx.expect_send()
            .withf(|req| req.query_value("level") == Some("campaign"))
            .returning(|_| {
                Ok(json!({
                    "data": [{
                        "campaign_name": "Spring Sale",
                        "impressions": "12000",
                        "clicks": "340",
                        "spend": "200.456",
                        "cpc": "0.5896",
                        "ctr": "2.8333",
                        "actions": [{"action_type": "offsite_conversion", "value": "12"}],
                        "action_values": [{"action_type": "offsite_conversion", "value": "801.824"}]
                    }, {
                        "spend": "0"
                    }]
                }))
            });

        let fetched = MetaSource::new(live_config(), Arc::new(tx))
            .campaign_summary()
            .await;
        assert!(fetched.is_live());
        let first = &fetched.data[0];
        assert_eq!(first.campaign, "Spring Sale");
        assert_eq!(first.impressions, 12_000);
        assert_eq!(first.spend, 200.46);
        assert_eq!(first.cpc, 0.59);
        assert_eq!(first.ctr, 2.83);
        assert_eq!(first.conversions, 12);
        assert_eq!(first.roas, 4.0);

        let second = &fetched.data[1];
        assert_eq!(second.campaign, "Unnamed");
        assert_eq!(second.roas, 0.0);
    }
}
