use serde::{Deserialize, Deserializer, Serialize};

/// Ad platform a row or intent refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Meta,
    Google,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Meta => "meta",
            Self::Google => "google",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier selecting which data-shaping call(s) answer a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCall {
    MetaPerformanceChart,
    GooglePerformanceChart,
    ComparisonChart,
    MetaCampaignTable,
    GoogleCampaignTable,
    AllCampaignsTable,
}

/// Intent labels, also the keys of the reply templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    MetaPerformance,
    GooglePerformance,
    Comparison,
    CampaignDetails,
    AllCampaignDetails,
    GeneralHelp,
}

/// Result of classifying one chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentDescriptor {
    pub tool_call: Option<ToolCall>,
    pub intent: IntentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub platforms: Vec<Platform>,
}

/// One day of a platform's performance series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightRow {
    pub date: String,
    #[serde(rename = "Spend")]
    pub spend: f64,
    #[serde(rename = "ROAS")]
    pub roas: f64,
    #[serde(rename = "Clicks")]
    pub clicks: u64,
    #[serde(
        rename = "Conversions",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub conversions: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignRow {
    pub campaign: String,
    pub impressions: u64,
    pub clicks: u64,
    pub spend: f64,
    pub cpc: f64,
    pub ctr: f64,
    pub conversions: u64,
    pub roas: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<u8>,
}

/// Google keyword-level performance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRow {
    pub keyword: String,
    pub impressions: u64,
    pub clicks: u64,
    pub cpc: f64,
    pub position: f64,
    pub quality_score: u8,
}

/// Payload attached to a chat reply, shaped for the chart/table renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReplyData {
    Insights(Vec<InsightRow>),
    Campaigns(Vec<CampaignRow>),
    InsightComparison {
        meta: Vec<InsightRow>,
        google: Vec<InsightRow>,
    },
    CampaignComparison {
        meta: Vec<CampaignRow>,
        google: Vec<CampaignRow>,
    },
}

/// Body of `POST /chat`
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

/// Body returned from `POST /chat`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub role: String,
    pub content: String,
    pub tool_call: Option<ToolCall>,
    pub data: Option<ReplyData>,
}

impl ChatReply {
    pub fn assistant(
        content: String,
        tool_call: Option<ToolCall>,
        data: Option<ReplyData>,
    ) -> Self {
        Self {
            role: "assistant".to_string(),
            content,
            tool_call,
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformTotals {
    pub total_spend: f64,
    pub avg_roas: f64,
    pub total_clicks: u64,
}

/// Body returned from `GET /summary`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSummary {
    pub period: String,
    pub meta: PlatformTotals,
    pub google: PlatformTotals,
    pub combined: PlatformTotals,
}

/// Flexible float deserializer: the ad APIs send numbers either as JSON
/// numbers or as decimal strings. Missing or null fields read as zero.
pub(crate) fn deserialize_flexible_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlexibleNumber {
        Float(f64),
        String(String),
        Null(()),
    }

    match FlexibleNumber::deserialize(deserializer)? {
        FlexibleNumber::Float(f) => Ok(f),
        FlexibleNumber::String(s) if s.trim().is_empty() => Ok(0.0),
        FlexibleNumber::String(s) => s.trim().parse::<f64>().map_err(serde::de::Error::custom),
        FlexibleNumber::Null(()) => Ok(0.0),
    }
}

/// Flexible non-negative integer deserializer (int64 values arrive as strings
/// in Google's JSON encoding; conversions arrive as fractional floats).
pub(crate) fn deserialize_flexible_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = deserialize_flexible_f64(deserializer)?;
    if value.is_finite() && value >= 0.0 {
        Ok(value.round() as u64)
    } else {
        Err(serde::de::Error::custom(format!(
            "expected a non-negative count, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "deserialize_flexible_f64")]
        amount: f64,
        #[serde(default, deserialize_with = "deserialize_flexible_u64")]
        count: u64,
    }

    #[test]
    fn test_flexible_numbers_accept_strings_and_numbers() {
        let p: Probe = serde_json::from_value(json!({"amount": "12.50", "count": "7"})).unwrap();
        assert_eq!(p.amount, 12.5);
        assert_eq!(p.count, 7);

        let p: Probe = serde_json::from_value(json!({"amount": 3, "count": 2.6})).unwrap();
        assert_eq!(p.amount, 3.0);
        assert_eq!(p.count, 3);

        let p: Probe = serde_json::from_value(json!({})).unwrap();
        assert_eq!(p.amount, 0.0);
        assert_eq!(p.count, 0);
    }

    #[test]
    fn test_flexible_numbers_reject_garbage() {
        assert!(serde_json::from_value::<Probe>(json!({"amount": "n/a"})).is_err());
        assert!(serde_json::from_value::<Probe>(json!({"count": -4})).is_err());
    }

    #[test]
    fn test_chat_reply_serializes_wire_names() {
        let reply = ChatReply::assistant(
            "hi".to_string(),
            Some(ToolCall::MetaPerformanceChart),
            Some(ReplyData::Insights(vec![InsightRow {
                date: "2024-01-01".to_string(),
                spend: 120.0,
                roas: 2.5,
                clicks: 40,
                conversions: None,
            }])),
        );

        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(
            value,
            json!({
                "role": "assistant",
                "content": "hi",
                "tool_call": "meta_performance_chart",
                "data": [{"date": "2024-01-01", "Spend": 120.0, "ROAS": 2.5, "Clicks": 40}]
            })
        );
    }

    #[test]
    fn test_comparison_payload_is_keyed_by_platform() {
        let data = ReplyData::CampaignComparison {
            meta: vec![],
            google: vec![],
        };
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!({"meta": [], "google": []})
        );
    }

    #[test]
    fn test_general_help_intent_serializes_null_tool_call() {
        let intent = IntentDescriptor {
            tool_call: None,
            intent: IntentKind::GeneralHelp,
            platform: None,
            platforms: vec![],
        };
        assert_eq!(
            serde_json::to_value(&intent).unwrap(),
            json!({"tool_call": null, "intent": "general_help"})
        );
    }
}
