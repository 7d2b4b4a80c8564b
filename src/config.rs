use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    pub target_count: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            target_count: crate::analysis::sampler::DEFAULT_SAMPLE_COUNT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    pub max_videos: usize,
    pub competitor_max_videos: usize,
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_videos: 100,
            competitor_max_videos: 50,
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscribeConfig {
    pub api_base: String,
    pub model: String,
    pub language: String,
    pub timeout_secs: u64,
}

impl Default for TranscribeConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            model: "whisper-1".to_string(),
            language: "ja".to_string(),
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    pub api_base: String,
    pub model: String,
    pub max_frames: usize,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            max_frames: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentsConfig {
    pub api_base: String,
    pub model: String,
    pub max_comments: usize,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_comments: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub api_base: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.anthropic.com".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 16000,
            temperature: 0.4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub data_dir: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: "data/accounts".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub sampling: SamplingConfig,
    pub fetch: FetchConfig,
    pub transcribe: TranscribeConfig,
    pub vision: VisionConfig,
    pub comments: CommentsConfig,
    pub report: ReportConfig,
    pub store: StoreConfig,
}

impl AnalyzerConfig {
    pub fn load(path: Option<PathBuf>) -> Result<Self, String> {
        let config_path = path.or_else(default_config_path);
        let mut config = match config_path {
            Some(ref path) if path.exists() => {
                let contents = std::fs::read_to_string(path)
                    .map_err(|err| format!("failed to read config: {}", err))?;
                toml::from_str(&contents)
                    .map_err(|err| format!("failed to parse config: {}", err))?
            }
            _ => AnalyzerConfig::default(),
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("FETCH_MAX_VIDEOS") {
            if let Ok(parsed) = value.parse::<usize>() {
                self.fetch.max_videos = parsed;
            }
        }
        if let Ok(value) = env::var("TRANSCRIBE_LANGUAGE") {
            if !value.trim().is_empty() {
                self.transcribe.language = value;
            }
        }
        if let Ok(value) = env::var("REPORT_MODEL") {
            if !value.trim().is_empty() {
                self.report.model = value;
            }
        }
        if let Ok(value) = env::var("STORE_DATA_DIR") {
            if !value.trim().is_empty() {
                self.store.data_dir = value;
            }
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    env::var("ANALYZER_CONFIG_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/analyzer.toml")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_toml() {
        let rendered = toml::to_string_pretty(&AnalyzerConfig::default()).unwrap();
        let parsed: AnalyzerConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.sampling.target_count, 5);
        assert_eq!(parsed.fetch.max_videos, 100);
        assert_eq!(parsed.comments.max_comments, 50);
        assert_eq!(parsed.store.data_dir, "data/accounts");
    }
}
