use serde::{Deserialize, Serialize};

use account_insight::analysis::AccountStats;
use account_insight::{AnalysisMode, EnrichedPost, PostTableRow};

use crate::pipeline::{AnalysisOutcome, PipelineOptions};

#[derive(Debug, Deserialize)]
pub struct ApiAnalyzeRequest {
    pub account: String,
    pub competitors: Option<Vec<String>>,
    pub mode: Option<String>,
    pub transcribe: Option<bool>,
    pub visual: Option<bool>,
    pub comments: Option<bool>,
    pub save: Option<bool>,
    pub supplement: Option<String>,
    pub request_id: Option<String>,
}

impl ApiAnalyzeRequest {
    pub fn into_options(self) -> Result<PipelineOptions, String> {
        let account = self.account.trim().to_string();
        if account.is_empty() {
            return Err("account is required".to_string());
        }

        let mode = match self.mode.as_deref() {
            None => AnalysisMode::SuccessFactors,
            Some(raw) => AnalysisMode::from_str(raw)
                .ok_or_else(|| format!("invalid analysis mode: {}", raw))?,
        };

        Ok(PipelineOptions {
            account,
            competitors: self
                .competitors
                .unwrap_or_default()
                .into_iter()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .collect(),
            mode,
            transcribe: self.transcribe.unwrap_or(true),
            visual: self.visual.unwrap_or(false),
            comments: self.comments.unwrap_or(false),
            save: self.save.unwrap_or(false),
            supplement: self
                .supplement
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ApiAnalyzeResponse {
    pub request_id: String,
    pub username: String,
    pub table: Vec<PostTableRow>,
    pub sample_overview: String,
    pub trend_text: String,
    pub comparison_text: String,
    pub stats: AccountStats,
    pub enriched: Vec<EnrichedPost>,
    pub report: Option<String>,
    pub saved_path: Option<String>,
    pub warnings: Vec<String>,
}

impl ApiAnalyzeResponse {
    pub fn from_outcome(outcome: AnalysisOutcome, request_id: String) -> Self {
        Self {
            request_id,
            username: outcome.username,
            table: outcome.table,
            sample_overview: outcome.sample_overview,
            trend_text: outcome.trend_text,
            comparison_text: outcome.comparison_text,
            stats: outcome.stats,
            enriched: outcome.enriched,
            report: outcome.report,
            saved_path: outcome
                .saved_path
                .map(|path| path.to_string_lossy().to_string()),
            warnings: outcome.warnings,
        }
    }
}
