use crate::models::{IntentDescriptor, IntentKind, Platform, ToolCall};

const COMPARISON_KEYWORDS: &[&str] = &["compare", "comparison", "both", "all", "versus", "vs"];
const CAMPAIGN_KEYWORDS: &[&str] = &["campaign", "campaigns", "breakdown", "detail", "details"];
const GOOGLE_KEYWORDS: &[&str] = &["google", "search", "youtube", "display", "shopping", "ppc"];
const META_KEYWORDS: &[&str] = &["meta", "facebook", "instagram", "fb", "ig"];

/// Maps a chat message to the intent that decides reply text and data.
pub trait IntentParser: Send + Sync {
    fn parse(&self, message: &str) -> IntentDescriptor;
}

/// Lower-cased message with the keyword groups it mentions.
struct Mentions {
    comparison: bool,
    campaign: bool,
    google: bool,
    meta: bool,
}

impl Mentions {
    fn scan(message: &str) -> Self {
        let lower = message.to_lowercase();
        let any = |keywords: &[&str]| keywords.iter().any(|kw| lower.contains(kw));
        Self {
            comparison: any(COMPARISON_KEYWORDS),
            campaign: any(CAMPAIGN_KEYWORDS),
            google: any(GOOGLE_KEYWORDS),
            meta: any(META_KEYWORDS),
        }
    }
}

/// One entry of the decision list. `when` is checked against the scanned
/// message; the first rule that holds produces the intent.
struct Rule {
    when: fn(&Mentions) -> bool,
    tool_call: ToolCall,
    intent: IntentKind,
    platform: Option<Platform>,
    platforms: &'static [Platform],
}

const BOTH: &[Platform] = &[Platform::Meta, Platform::Google];

// Order is significant: comparison beats campaign, and for campaign tables
// google is checked before meta.
const RULES: &[Rule] = &[
    Rule {
        when: |m| m.comparison,
        tool_call: ToolCall::ComparisonChart,
        intent: IntentKind::Comparison,
        platform: None,
        platforms: BOTH,
    },
    Rule {
        when: |m| m.campaign && m.google,
        tool_call: ToolCall::GoogleCampaignTable,
        intent: IntentKind::CampaignDetails,
        platform: Some(Platform::Google),
        platforms: &[],
    },
    Rule {
        when: |m| m.campaign && m.meta,
        tool_call: ToolCall::MetaCampaignTable,
        intent: IntentKind::CampaignDetails,
        platform: Some(Platform::Meta),
        platforms: &[],
    },
    Rule {
        when: |m| m.campaign,
        tool_call: ToolCall::AllCampaignsTable,
        intent: IntentKind::AllCampaignDetails,
        platform: None,
        platforms: BOTH,
    },
    Rule {
        when: |m| m.meta,
        tool_call: ToolCall::MetaPerformanceChart,
        intent: IntentKind::MetaPerformance,
        platform: Some(Platform::Meta),
        platforms: &[],
    },
    Rule {
        when: |m| m.google,
        tool_call: ToolCall::GooglePerformanceChart,
        intent: IntentKind::GooglePerformance,
        platform: Some(Platform::Google),
        platforms: &[],
    },
];

/// Fixed-priority keyword matcher. First matching rule wins, nothing is combined.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordIntent;

impl IntentParser for KeywordIntent {
    fn parse(&self, message: &str) -> IntentDescriptor {
        classify(message)
    }
}

pub fn classify(message: &str) -> IntentDescriptor {
    let mentions = Mentions::scan(message);

    let descriptor = RULES
        .iter()
        .find(|rule| (rule.when)(&mentions))
        .map(|rule| IntentDescriptor {
            tool_call: Some(rule.tool_call),
            intent: rule.intent,
            platform: rule.platform,
            platforms: rule.platforms.to_vec(),
        })
        .unwrap_or(IntentDescriptor {
            tool_call: None,
            intent: IntentKind::GeneralHelp,
            platform: None,
            platforms: Vec::new(),
        });

    tracing::debug!(
        intent = ?descriptor.intent,
        tool_call = ?descriptor.tool_call,
        "Classified chat message"
    );
    descriptor
}
