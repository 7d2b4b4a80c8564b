pub mod analysis;
pub mod config;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: String,
    pub title: String,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    pub upload_date: Option<NaiveDate>,
    pub url: String,
    pub duration_seconds: Option<f64>,
}

impl PostRecord {
    pub fn engagement_rate(&self) -> Option<f64> {
        if self.view_count == 0 {
            return None;
        }
        Some(self.like_count as f64 / self.view_count as f64 * 100.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FollowerCount {
    Numeric(u64),
    RawText(String),
}

impl FollowerCount {
    pub fn as_numeric(&self) -> Option<u64> {
        match self {
            FollowerCount::Numeric(value) => Some(*value),
            FollowerCount::RawText(_) => None,
        }
    }

    pub fn display(&self) -> String {
        match self {
            FollowerCount::Numeric(value) => format_number(*value as f64),
            FollowerCount::RawText(text) => text.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountProfile {
    pub username: String,
    pub display_name: String,
    pub followers: Option<FollowerCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrichedPost {
    pub post: PostRecord,
    pub transcript: Option<String>,
    pub visual_analysis: Option<String>,
    pub comment_analysis: Option<String>,
}

impl EnrichedPost {
    pub fn new(post: PostRecord) -> Self {
        Self {
            post,
            transcript: None,
            visual_analysis: None,
            comment_analysis: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    SuccessFactors,
    Improvement,
    ConceptReview,
    Competitive,
    NewAccount,
}

impl AnalysisMode {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "1" | "success" | "success-factors" => Some(AnalysisMode::SuccessFactors),
            "2" | "improve" | "improvement" => Some(AnalysisMode::Improvement),
            "3" | "concept" | "concept-review" => Some(AnalysisMode::ConceptReview),
            "4" | "competitive" | "competitors" => Some(AnalysisMode::Competitive),
            "5" | "new" | "new-account" => Some(AnalysisMode::NewAccount),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AnalysisMode::SuccessFactors => "success factor extraction",
            AnalysisMode::Improvement => "improvement proposals",
            AnalysisMode::ConceptReview => "concept review",
            AnalysisMode::Competitive => "competitive analysis",
            AnalysisMode::NewAccount => "new account design",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankTier {
    Top,
    Middle,
    Bottom,
}

impl RankTier {
    pub fn label(self) -> &'static str {
        match self {
            RankTier::Top => "top",
            RankTier::Middle => "mid",
            RankTier::Bottom => "bottom",
        }
    }
}

pub fn rank_tier(rank: usize, total: usize) -> Option<RankTier> {
    if total < 4 || rank == 0 {
        return None;
    }
    let third = (total / 3).max(1);
    if rank <= third {
        Some(RankTier::Top)
    } else if rank > total - third {
        Some(RankTier::Bottom)
    } else {
        Some(RankTier::Middle)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostTableRow {
    pub rank: usize,
    pub title: String,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    pub upload_date: String,
    pub url: String,
}

pub fn table_rows(posts: &[PostRecord]) -> Vec<PostTableRow> {
    posts
        .iter()
        .enumerate()
        .map(|(index, post)| PostTableRow {
            rank: index + 1,
            title: truncate_chars(&post.title, 50),
            view_count: post.view_count,
            like_count: post.like_count,
            comment_count: post.comment_count,
            upload_date: post
                .upload_date
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            url: post.url.clone(),
        })
        .collect()
}

pub fn truncate_chars(value: &str, limit: usize) -> String {
    if value.chars().count() <= limit {
        return value.to_string();
    }
    value.chars().take(limit).collect()
}

pub fn format_number(value: f64) -> String {
    let rounded = value.round().max(0.0) as i64;
    let mut chars: Vec<char> = rounded.to_string().chars().collect();
    let mut result = String::new();
    let mut count = 0usize;

    while let Some(ch) = chars.pop() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(ch);
        count += 1;
    }

    result.chars().rev().collect()
}

pub fn format_float(value: f64, digits: usize) -> String {
    format!("{:.1$}", value, digits)
}

pub fn format_signed_pct(value: f64) -> String {
    format!("{:+.1}%", value)
}
