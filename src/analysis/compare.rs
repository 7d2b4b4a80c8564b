use serde::Serialize;

use crate::analysis::trends::{analyze_trends, TrendDirection};
use crate::{AccountProfile, FollowerCount, PostRecord};

#[derive(Debug, Clone, Serialize)]
pub struct AccountStats {
    pub username: String,
    pub followers: Option<FollowerCount>,
    pub total_posts: usize,
    pub avg_views: f64,
    pub avg_likes: f64,
    pub avg_comments: f64,
    pub max_views: u64,
    pub engagement_rate: f64,
    pub trend: Option<TrendDirection>,
    pub posting_frequency: Option<f64>,
}

// Aggregate metrics for one account, same shape for the primary account and
// every competitor so the comparison table can render metric rows uniformly.
pub fn account_stats(
    username: &str,
    posts: &[PostRecord],
    profile: Option<&AccountProfile>,
) -> AccountStats {
    let total_views: u64 = posts.iter().map(|post| post.view_count).sum();
    let total_likes: u64 = posts.iter().map(|post| post.like_count).sum();
    let total_comments: u64 = posts.iter().map(|post| post.comment_count).sum();
    let count = posts.len();

    let avg = |total: u64| {
        if count == 0 {
            0.0
        } else {
            total as f64 / count as f64
        }
    };

    let engagement_rate = if total_views > 0 {
        total_likes as f64 / total_views as f64 * 100.0
    } else {
        0.0
    };

    let trend_report = analyze_trends(posts);

    AccountStats {
        username: username.to_string(),
        followers: profile.and_then(|p| p.followers.clone()),
        total_posts: count,
        avg_views: avg(total_views),
        avg_likes: avg(total_likes),
        avg_comments: avg(total_comments),
        max_views: posts.iter().map(|post| post.view_count).max().unwrap_or(0),
        engagement_rate,
        trend: trend_report.as_ref().map(|report| report.direction),
        posting_frequency: trend_report.and_then(|report| report.posting_frequency),
    }
}

#[derive(Debug, Clone)]
pub struct CompetitorData {
    pub username: String,
    // None means the metadata fetch failed; the account is listed in
    // Comparison::failed instead of the table.
    pub posts: Option<Vec<PostRecord>>,
    pub profile: Option<AccountProfile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub primary: AccountStats,
    pub competitors: Vec<AccountStats>,
    pub failed: Vec<String>,
}

pub fn build_comparison(primary: AccountStats, fetched: Vec<CompetitorData>) -> Comparison {
    let mut competitors = Vec::new();
    let mut failed = Vec::new();

    for data in fetched {
        match data.posts {
            Some(posts) => {
                competitors.push(account_stats(&data.username, &posts, data.profile.as_ref()));
            }
            None => failed.push(data.username),
        }
    }

    Comparison {
        primary,
        competitors,
        failed,
    }
}
