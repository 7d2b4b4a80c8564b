use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use std::time::Duration;

use account_insight::config::CommentsConfig;

use crate::media::{head, run_command};

#[derive(Clone)]
pub struct CommentAnalyzer {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
    max_comments: usize,
}

#[derive(Debug, Clone)]
pub struct CommentRecord {
    pub text: String,
    pub likes: u64,
}

impl CommentAnalyzer {
    pub fn from_env(config: &CommentsConfig) -> Option<Self> {
        let api_key = env::var("OPENAI_API_KEY").ok()?;
        Some(Self {
            client: reqwest::Client::new(),
            api_key,
            api_base: config.api_base.clone(),
            model: config.model.clone(),
            max_comments: config.max_comments,
        })
    }

    // Ok(None) when the post simply has no comments; that is not a failure.
    pub async fn analyze_url(&self, url: &str) -> Result<Option<String>, String> {
        let comments = fetch_comments(url, self.max_comments).await?;
        if comments.is_empty() {
            return Ok(None);
        }
        let summary = self.summarize(&comments).await?;
        Ok(Some(format_comment_summary(&summary)))
    }

    async fn summarize(&self, comments: &[CommentRecord]) -> Result<CommentSummary, String> {
        let mut listing = Vec::new();
        for (index, comment) in comments.iter().enumerate() {
            let likes = if comment.likes > 0 {
                format!(" (likes: {})", comment.likes)
            } else {
                String::new()
            };
            listing.push(format!("{}. {}{}", index + 1, comment.text, likes));
        }

        let request = ChatRequest {
            model: self.model.clone(),
            max_tokens: 1500,
            temperature: 0.1,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: comment_prompt(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: format!("Analyze these comments:\n\n{}", listing.join("\n")),
                },
            ],
        };

        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|err| format!("comment analysis request failed: {}", err))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_else(|_| String::new());
            let detail = error_body.trim();
            if detail.is_empty() {
                return Err(format!("comment analysis API error: {}", status));
            }
            return Err(format!(
                "comment analysis API error: {} {}",
                status,
                head(detail, 200)
            ));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|err| format!("comment analysis response parse failed: {}", err))?;

        let content = body
            .choices
            .first()
            .ok_or_else(|| "comment analysis response missing choices".to_string())?
            .message
            .content
            .trim()
            .to_string();

        let json = extract_json(&content)
            .ok_or_else(|| "comment analysis response missing JSON".to_string())?;
        serde_json::from_str(&json)
            .map_err(|err| format!("comment analysis JSON parse failed: {}", err))
    }
}

async fn fetch_comments(url: &str, max_comments: usize) -> Result<Vec<CommentRecord>, String> {
    let output = run_command(
        "yt-dlp",
        &["--skip-download", "--write-comments", "--dump-json", url],
        Duration::from_secs(60),
    )
    .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("comment fetch failed: {}", head(&stderr, 200)));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let data: Value = serde_json::from_str(stdout.trim())
        .map_err(|err| format!("comment data parse failed: {}", err))?;

    let raw = data
        .get("comments")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let comments: Vec<CommentRecord> = raw
        .iter()
        .take(max_comments)
        .filter_map(|entry| {
            let text = entry.get("text").and_then(Value::as_str)?.trim();
            if text.is_empty() {
                return None;
            }
            Some(CommentRecord {
                text: text.to_string(),
                likes: entry
                    .get("like_count")
                    .and_then(Value::as_u64)
                    .unwrap_or(0),
            })
        })
        .collect();

    Ok(comments)
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentSummary {
    #[serde(default)]
    pub total_analyzed: u64,
    #[serde(default)]
    pub sentiment_distribution: Option<SentimentDistribution>,
    #[serde(default)]
    pub audience_quality_score: Option<u32>,
    #[serde(default)]
    pub audience_quality_reason: Option<String>,
    #[serde(default)]
    pub monetization_potential: Option<String>,
    #[serde(default)]
    pub monetization_reason: Option<String>,
    #[serde(default)]
    pub top_themes: Vec<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SentimentDistribution {
    #[serde(default)]
    pub positive: u32,
    #[serde(default)]
    pub neutral: u32,
    #[serde(default)]
    pub negative: u32,
}

pub fn format_comment_summary(summary: &CommentSummary) -> String {
    let mut parts = vec![format!("Comments analyzed: {}", summary.total_analyzed)];

    if let Some(sentiment) = &summary.sentiment_distribution {
        parts.push(format!(
            "Sentiment: positive {}% / neutral {}% / negative {}%",
            sentiment.positive, sentiment.neutral, sentiment.negative
        ));
    }
    if let Some(score) = summary.audience_quality_score {
        let reason = summary.audience_quality_reason.as_deref().unwrap_or("");
        parts.push(format!("Audience quality: {}/10 - {}", score, reason));
    }
    if let Some(potential) = &summary.monetization_potential {
        let reason = summary.monetization_reason.as_deref().unwrap_or("");
        parts.push(format!(
            "Monetization potential: {} - {}",
            potential, reason
        ));
    }
    if !summary.top_themes.is_empty() {
        parts.push(format!("Top themes: {}", summary.top_themes.join(", ")));
    }
    if let Some(text) = &summary.summary {
        parts.push(format!("Overall: {}", text));
    }

    parts.join("\n")
}

fn comment_prompt() -> String {
    r#"You are an expert at analyzing social-media comment sections.
Return a single JSON object with these fields:
- total_analyzed (integer)
- sentiment_distribution: {positive, neutral, negative} (integer percentages)
- audience_quality_score (1-10; high when comments show questions and shared experiences, low for emoji-only or hostile threads)
- audience_quality_reason (one sentence)
- monetization_potential ("high"/"medium"/"low")
- monetization_reason (one sentence)
- top_themes (array of up to 3 short strings)
- summary (at most three sentences on the overall character of the comment section)
Output JSON only, no markdown or commentary."#
        .to_string()
}

fn extract_json(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if start >= end {
        return None;
    }
    Some(text[start..=end].to_string())
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_extraction_strips_fences() {
        let wrapped = "```json\n{\"total_analyzed\": 12}\n```";
        let json = extract_json(wrapped).unwrap();
        let summary: CommentSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(summary.total_analyzed, 12);
    }

    #[test]
    fn summary_formatting_skips_absent_fields() {
        let summary = CommentSummary {
            total_analyzed: 5,
            sentiment_distribution: None,
            audience_quality_score: None,
            audience_quality_reason: None,
            monetization_potential: None,
            monetization_reason: None,
            top_themes: Vec::new(),
            summary: None,
        };
        let text = format_comment_summary(&summary);
        assert_eq!(text, "Comments analyzed: 5");
    }
}
