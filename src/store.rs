use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use account_insight::config::StoreConfig;
use account_insight::{truncate_chars, EnrichedPost};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRow {
    pub recorded_at: String,
    pub rank: usize,
    pub title: String,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    pub upload_date: String,
    pub transcript: String,
    pub url: String,
}

#[derive(Clone)]
pub struct AccountStore {
    dir: PathBuf,
}

impl AccountStore {
    pub fn from_config(config: &StoreConfig) -> Self {
        Self {
            dir: PathBuf::from(&config.data_dir),
        }
    }

    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    // Each save replaces the account's row set wholesale; the file always
    // reflects the latest analysis run.
    pub async fn save_rows(&self, account: &str, rows: &[StoredRow]) -> Result<PathBuf, String> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|err| format!("failed to create data dir: {}", err))?;

        let path = self.account_path(account);
        let tmp_path = path.with_extension("json.tmp");
        let payload = serde_json::to_string_pretty(rows)
            .map_err(|err| format!("failed to serialize rows: {}", err))?;

        tokio::fs::write(&tmp_path, payload)
            .await
            .map_err(|err| format!("failed to write rows: {}", err))?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|err| format!("failed to finalize rows: {}", err))?;
        Ok(path)
    }

    pub async fn load_rows(&self, account: &str) -> Result<Vec<StoredRow>, String> {
        let path = self.account_path(account);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|err| format!("failed to read rows: {}", err))?;
        serde_json::from_str(&contents).map_err(|err| format!("failed to parse rows: {}", err))
    }

    fn account_path(&self, account: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize(account)))
    }
}

pub fn rows_from(enriched: &[EnrichedPost]) -> Vec<StoredRow> {
    let recorded_at = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
    enriched
        .iter()
        .enumerate()
        .map(|(index, entry)| StoredRow {
            recorded_at: recorded_at.clone(),
            rank: index + 1,
            title: truncate_chars(&entry.post.title, 100),
            view_count: entry.post.view_count,
            like_count: entry.post.like_count,
            comment_count: entry.post.comment_count,
            upload_date: entry
                .post
                .upload_date
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            transcript: entry.transcript.clone().unwrap_or_default(),
            url: entry.post.url.clone(),
        })
        .collect()
}

fn sanitize(account: &str) -> String {
    account
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use account_insight::PostRecord;

    fn post(id: &str, views: u64) -> PostRecord {
        PostRecord {
            id: id.to_string(),
            title: format!("clip {}", id),
            view_count: views,
            like_count: views / 10,
            comment_count: 3,
            upload_date: None,
            url: format!("https://example.com/{}", id),
            duration_seconds: None,
        }
    }

    #[tokio::test]
    async fn save_then_load_replaces_rows() {
        let dir = std::env::temp_dir().join(format!("store-test-{}", std::process::id()));
        let store = AccountStore::with_dir(&dir);

        let mut first = EnrichedPost::new(post("a", 1000));
        first.transcript = Some("hello".to_string());
        let rows = rows_from(&[first, EnrichedPost::new(post("b", 500))]);
        store.save_rows("someone", &rows).await.unwrap();

        let loaded = store.load_rows("someone").await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].rank, 1);
        assert_eq!(loaded[0].transcript, "hello");

        let replacement = rows_from(&[EnrichedPost::new(post("c", 42))]);
        store.save_rows("someone", &replacement).await.unwrap();
        let loaded = store.load_rows("someone").await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].view_count, 42);

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[test]
    fn account_names_are_sanitized() {
        let store = AccountStore::with_dir("data");
        let path = store.account_path("we/ird@name");
        assert_eq!(path, PathBuf::from("data/we_ird_name.json"));
    }
}
