use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

use account_insight::config::FetchConfig;
use account_insight::{AccountProfile, FollowerCount, PostRecord};

use crate::media::{head, run_command};

#[derive(Clone)]
pub struct MetadataFetcher {
    timeout: Duration,
}

impl MetadataFetcher {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub async fn fetch_profile(&self, username: &str) -> Result<AccountProfile, String> {
        let url = account_url(username);
        let output = run_command(
            "yt-dlp",
            &[
                "--flat-playlist",
                "--dump-json",
                "--playlist-end",
                "1",
                &url,
            ],
            self.timeout,
        )
        .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("profile fetch failed: {}", head(&stderr, 300)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let data: Value = match serde_json::from_str(line) {
                Ok(value) => value,
                Err(_) => continue,
            };
            return Ok(AccountProfile {
                username: username.to_string(),
                display_name: data
                    .get("uploader")
                    .and_then(Value::as_str)
                    .unwrap_or(username)
                    .to_string(),
                followers: follower_count(data.get("channel_follower_count")),
            });
        }

        Err("profile fetch returned no data".to_string())
    }

    pub async fn fetch_videos(
        &self,
        username: &str,
        max_count: usize,
    ) -> Result<Vec<PostRecord>, String> {
        let url = account_url(username);
        let playlist_end = format!("--playlist-end={}", max_count);
        let output = run_command(
            "yt-dlp",
            &["--flat-playlist", "--dump-json", &playlist_end, &url],
            self.timeout,
        )
        .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(username, "video metadata fetch failed");
            return Err(format!("video fetch failed: {}", head(&stderr, 300)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut posts: Vec<PostRecord> = stdout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| serde_json::from_str::<Value>(line.trim()).ok())
            .map(|data| parse_post(&data, username))
            .collect();

        if posts.is_empty() {
            return Err("no videos found".to_string());
        }

        posts.sort_by(|a, b| b.view_count.cmp(&a.view_count));
        Ok(posts)
    }
}

pub fn extract_username(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if let Some(index) = trimmed.find("tiktok.com/@") {
        let rest = &trimmed[index + "tiktok.com/@".len()..];
        let handle: &str = rest
            .split(|ch| ch == '/' || ch == '?')
            .next()
            .unwrap_or_default();
        let decoded = urlencoding::decode(handle)
            .map(|value| value.into_owned())
            .unwrap_or_else(|_| handle.to_string());
        if decoded.is_empty() {
            return None;
        }
        return Some(decoded);
    }

    let handle = trimmed.trim_start_matches('@').trim();
    if handle.is_empty() {
        None
    } else {
        Some(handle.to_string())
    }
}

fn account_url(username: &str) -> String {
    format!("https://www.tiktok.com/@{}", username)
}

fn parse_post(data: &Value, username: &str) -> PostRecord {
    let id = data
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let url = data
        .get("url")
        .or_else(|| data.get("webpage_url"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("https://www.tiktok.com/@{}/video/{}", username, id));

    PostRecord {
        title: data
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        view_count: count_field(data.get("view_count")),
        like_count: count_field(data.get("like_count")),
        comment_count: count_field(data.get("comment_count")),
        upload_date: parse_upload_date(data),
        duration_seconds: data.get("duration").and_then(Value::as_f64),
        id,
        url,
    }
}

// Counts arrive as numbers or null; anything unreadable normalizes to 0.
fn count_field(value: Option<&Value>) -> u64 {
    value.and_then(Value::as_u64).unwrap_or(0)
}

fn parse_upload_date(data: &Value) -> Option<NaiveDate> {
    if let Some(timestamp) = data.get("timestamp").and_then(Value::as_i64) {
        if let Some(datetime) = DateTime::from_timestamp(timestamp, 0) {
            return Some(datetime.date_naive());
        }
    }
    data.get("upload_date")
        .and_then(Value::as_str)
        .and_then(parse_date_str)
}

// Accepts the YYYYMMDD form yt-dlp emits and plain YYYY-MM-DD; anything else
// is dropped so the trend analyzer can skip the record.
pub fn parse_date_str(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.len() == 8 && raw.chars().all(|ch| ch.is_ascii_digit()) {
        return NaiveDate::parse_from_str(raw, "%Y%m%d").ok();
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

// Follower counts may be numeric or localized display text ("1.2万");
// arithmetic requires explicit normalization via FollowerCount::as_numeric.
fn follower_count(value: Option<&Value>) -> Option<FollowerCount> {
    match value {
        Some(Value::Number(number)) => number.as_u64().map(FollowerCount::Numeric),
        Some(Value::String(text)) if !text.trim().is_empty() => {
            Some(FollowerCount::RawText(text.clone()))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_from_url() {
        assert_eq!(
            extract_username("https://www.tiktok.com/@somebody?lang=en"),
            Some("somebody".to_string())
        );
        assert_eq!(
            extract_username("https://www.tiktok.com/@somebody/video/123"),
            Some("somebody".to_string())
        );
    }

    #[test]
    fn username_from_handle() {
        assert_eq!(extract_username("@handle"), Some("handle".to_string()));
        assert_eq!(extract_username("  handle "), Some("handle".to_string()));
        assert_eq!(extract_username(""), None);
    }

    #[test]
    fn date_forms() {
        assert_eq!(
            parse_date_str("20260115"),
            NaiveDate::from_ymd_opt(2026, 1, 15)
        );
        assert_eq!(
            parse_date_str("2026-01-15"),
            NaiveDate::from_ymd_opt(2026, 1, 15)
        );
        assert_eq!(parse_date_str("not-a-date"), None);
    }

    #[test]
    fn post_parse_defaults_missing_counts_to_zero() {
        let data: Value = serde_json::from_str(
            r#"{"id": "1", "title": "clip", "view_count": null, "timestamp": 1767225600}"#,
        )
        .unwrap();
        let post = parse_post(&data, "someone");
        assert_eq!(post.view_count, 0);
        assert_eq!(post.like_count, 0);
        assert!(post.upload_date.is_some());
        assert_eq!(post.url, "https://www.tiktok.com/@someone/video/1");
    }

    #[test]
    fn follower_count_variants() {
        let numeric: Value = serde_json::json!(120000);
        let text: Value = serde_json::json!("1.2万");
        assert!(matches!(
            follower_count(Some(&numeric)),
            Some(FollowerCount::Numeric(120000))
        ));
        assert!(matches!(
            follower_count(Some(&text)),
            Some(FollowerCount::RawText(_))
        ));
        assert!(follower_count(None).is_none());
    }
}
