use std::sync::Arc;

use crate::intent::IntentParser;
use crate::models::{ChatReply, KeywordRow, PerformanceSummary, ReplyData, ToolCall};
use crate::platforms::{KeywordSource, PlatformSource};
use crate::summary::summarize;
use crate::synth::Synthesizer;

/// Routes a chat message to reply text and the platform data its intent asks for.
pub struct Dispatcher {
    parser: Arc<dyn IntentParser>,
    synth: Arc<dyn Synthesizer>,
    meta: Arc<dyn PlatformSource>,
    google: Arc<dyn PlatformSource>,
    keywords: Arc<dyn KeywordSource>,
}

impl Dispatcher {
    pub fn new(
        parser: Arc<dyn IntentParser>,
        synth: Arc<dyn Synthesizer>,
        meta: Arc<dyn PlatformSource>,
        google: Arc<dyn PlatformSource>,
        keywords: Arc<dyn KeywordSource>,
    ) -> Self {
        Self {
            parser,
            synth,
            meta,
            google,
            keywords,
        }
    }

    /// Answer one chat message. Never fails: adapters already substitute
    /// mock data for anything they could not fetch.
    pub async fn handle(&self, message: &str) -> ChatReply {
        let intent = self.parser.parse(message);
        let content = self.synth.compose(message, &intent);

        let data = match intent.tool_call {
            Some(tool_call) => Some(self.fetch(tool_call).await),
            None => None,
        };

        tracing::info!(
            intent = ?intent.intent,
            tool_call = ?intent.tool_call,
            "Chat message handled"
        );
        ChatReply::assistant(content, intent.tool_call, data)
    }

    async fn fetch(&self, tool_call: ToolCall) -> ReplyData {
        match tool_call {
            ToolCall::MetaPerformanceChart => {
                ReplyData::Insights(self.meta.insights().await.into_data())
            }
            ToolCall::GooglePerformanceChart => {
                ReplyData::Insights(self.google.insights().await.into_data())
            }
            ToolCall::ComparisonChart => {
                let (meta, google) = tokio::join!(self.meta.insights(), self.google.insights());
                ReplyData::InsightComparison {
                    meta: meta.into_data(),
                    google: google.into_data(),
                }
            }
            ToolCall::MetaCampaignTable => {
                ReplyData::Campaigns(self.meta.campaign_summary().await.into_data())
            }
            ToolCall::GoogleCampaignTable => {
                ReplyData::Campaigns(self.google.campaign_summary().await.into_data())
            }
            ToolCall::AllCampaignsTable => {
                let (meta, google) = tokio::join!(
                    self.meta.campaign_summary(),
                    self.google.campaign_summary()
                );
                ReplyData::CampaignComparison {
                    meta: meta.into_data(),
                    google: google.into_data(),
                }
            }
        }
    }

    /// Weekly totals for both platforms and their combination.
    pub async fn summary(&self) -> PerformanceSummary {
        let (meta, google) = tokio::join!(self.meta.insights(), self.google.insights());
        summarize(&meta.data, &google.data)
    }

    pub async fn keywords(&self) -> Vec<KeywordRow> {
        self.keywords.keyword_performance().await.into_data()
    }
}
