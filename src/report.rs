use serde::{Deserialize, Serialize};
use std::env;

use account_insight::config::ReportConfig;
use account_insight::{
    format_number, rank_tier, AccountProfile, AnalysisMode, EnrichedPost, PostRecord,
};

use crate::media::head;

#[derive(Clone)]
pub struct ReportClient {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
}

impl ReportClient {
    pub fn from_env(config: &ReportConfig) -> Option<Self> {
        let api_key = env::var("ANTHROPIC_API_KEY").ok()?;
        Some(Self {
            client: reqwest::Client::new(),
            api_key,
            api_base: config.api_base.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    pub async fn generate(&self, system: &str, user: &str) -> Result<String, String> {
        let request = MessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system: system.to_string(),
            messages: vec![Message {
                role: "user".to_string(),
                content: user.to_string(),
            }],
        };

        let url = format!("{}/v1/messages", self.api_base.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request)
            .send()
            .await
            .map_err(|err| format!("report request failed: {}", err))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_else(|_| String::new());
            let detail = error_body.trim();
            if detail.is_empty() {
                return Err(format!("report API error: {}", status));
            }
            return Err(format!("report API error: {} {}", status, head(detail, 300)));
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|err| format!("report response parse failed: {}", err))?;

        let text = body
            .content
            .first()
            .ok_or_else(|| "report response missing content".to_string())?
            .text
            .trim()
            .to_string();

        if text.is_empty() {
            return Err("report is empty".to_string());
        }
        Ok(text)
    }
}

pub fn build_system_prompt(mode: AnalysisMode) -> String {
    let focus = match mode {
        AnalysisMode::SuccessFactors => {
            "Extract the success factors behind the account's best-performing posts. \
             Explain what the top posts share in hook, topic, format, and delivery, \
             and what the bottom posts lack, so the patterns are repeatable."
        }
        AnalysisMode::Improvement => {
            "Produce concrete improvement proposals. For each weakness you identify, \
             give a specific, actionable change and the expected effect, prioritized \
             by likely impact."
        }
        AnalysisMode::ConceptReview => {
            "Review the account concept itself. Judge whether the positioning, target \
             audience, and content pillars are coherent, and propose adjustments to \
             the concept where the data contradicts it."
        }
        AnalysisMode::Competitive => {
            "Compare the account against its competitors. Identify where competitors \
             outperform it and why, and which competitor tactics are worth adopting \
             or deliberately avoiding."
        }
        AnalysisMode::NewAccount => {
            "Design a plan for a new account in this niche. Use the analyzed accounts \
             as evidence for what works, and lay out positioning, content pillars, \
             posting cadence, and the first ten post concepts."
        }
    };

    format!(
        "You are a short-form video strategy consultant. You are given post metrics, \
         transcripts, visual analyses, comment summaries, and trend statistics for a \
         social media account. {} Ground every claim in the supplied data, cite the \
         specific posts or numbers that support it, and structure the report with \
         markdown headings. Write the full report; do not summarize it away.",
        focus
    )
}

pub fn build_user_prompt(
    username: &str,
    profile: Option<&AccountProfile>,
    population: &[PostRecord],
    enriched: &[EnrichedPost],
    trend_text: &str,
    comparison_text: &str,
    supplement: Option<&str>,
) -> String {
    let total_posts = population.len();
    let mut sections = Vec::new();

    let mut account = format!("# Account: @{}\n", username);
    if let Some(profile) = profile {
        account.push_str(&format!("Display name: {}\n", profile.display_name));
        if let Some(followers) = &profile.followers {
            account.push_str(&format!("Followers: {}\n", followers.display()));
        }
    }
    account.push_str(&format!("Posts fetched: {}\n", total_posts));
    sections.push(account);

    for entry in enriched {
        let post = &entry.post;
        // Tier is judged against the full view-sorted population, not the
        // handful of posts that were sampled for enrichment.
        let tier = population
            .iter()
            .position(|candidate| candidate.id == post.id)
            .and_then(|index| rank_tier(index + 1, total_posts))
            .map(|tier| format!(" [{} tier]", tier.label()))
            .unwrap_or_default();

        let mut block = format!(
            "## Post{}: {}\nViews: {} / Likes: {} / Comments: {}\n",
            tier,
            if post.title.is_empty() {
                "(untitled)"
            } else {
                post.title.as_str()
            },
            format_number(post.view_count as f64),
            format_number(post.like_count as f64),
            format_number(post.comment_count as f64),
        );
        if let Some(date) = post.upload_date {
            block.push_str(&format!("Uploaded: {}\n", date.format("%Y-%m-%d")));
        }
        block.push_str(&format!("URL: {}\n", post.url));
        if let Some(transcript) = &entry.transcript {
            block.push_str(&format!("\n### Transcript\n{}\n", transcript));
        }
        if let Some(visual) = &entry.visual_analysis {
            block.push_str(&format!("\n### Visual analysis\n{}\n", visual));
        }
        if let Some(comments) = &entry.comment_analysis {
            block.push_str(&format!("\n### Comment analysis\n{}\n", comments));
        }
        sections.push(block);
    }

    if !trend_text.trim().is_empty() {
        sections.push(format!("# Trend analysis\n{}\n", trend_text));
    }
    if !comparison_text.trim().is_empty() {
        sections.push(format!("# Competitor comparison\n{}\n", comparison_text));
    }
    if let Some(supplement) = supplement {
        if !supplement.trim().is_empty() {
            sections.push(format!("# Additional context from the requester\n{}\n", supplement));
        }
    }

    sections.join("\n")
}

#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    temperature: f64,
    system: String,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}
