use crate::models::{IntentDescriptor, IntentKind};

pub const META_PERFORMANCE_REPLY: &str = "Here's your Meta Ads performance data for the last 7 days. I'm showing you daily spend, ROAS, and click trends.";
pub const GOOGLE_PERFORMANCE_REPLY: &str = "Here's your Google Ads performance overview. The chart shows spend, ROAS, clicks, and conversion trends over the past week.";
pub const COMPARISON_REPLY: &str = "I've prepared a side-by-side comparison of your Meta and Google Ads performance. This will help you understand which platform is delivering better results.";
pub const CAMPAIGN_DETAILS_REPLY: &str = "Here's a detailed breakdown of your campaign performance with key metrics like impressions, clicks, CTR, and ROAS.";
pub const ALL_CAMPAIGN_DETAILS_REPLY: &str =
    "Here's an overview of all your campaigns across both Meta and Google Ads platforms.";
pub const GENERAL_HELP_REPLY: &str = "I can help you analyze your advertising performance! Try asking:\n• \"How is Meta performing?\"\n• \"Show me Google Ads results\"\n• \"Compare my ad platforms\"\n• \"Show campaign breakdown\"";

/// Produces the natural-language half of a chat reply.
pub trait Synthesizer: Send + Sync {
    fn compose(&self, message: &str, intent: &IntentDescriptor) -> String;
}

/// Fixed reply per intent label. The message itself does not influence the text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateSynth;

impl TemplateSynth {
    pub fn template(intent: IntentKind) -> &'static str {
        match intent {
            IntentKind::MetaPerformance => META_PERFORMANCE_REPLY,
            IntentKind::GooglePerformance => GOOGLE_PERFORMANCE_REPLY,
            IntentKind::Comparison => COMPARISON_REPLY,
            IntentKind::CampaignDetails => CAMPAIGN_DETAILS_REPLY,
            IntentKind::AllCampaignDetails => ALL_CAMPAIGN_DETAILS_REPLY,
            IntentKind::GeneralHelp => GENERAL_HELP_REPLY,
        }
    }
}

impl Synthesizer for TemplateSynth {
    fn compose(&self, _message: &str, intent: &IntentDescriptor) -> String {
        Self::template(intent.intent).to_string()
    }
}
