use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use std::env;
use std::time::Duration;
use tracing::info;

use account_insight::config::TranscribeConfig;

use crate::media::{
    cleanup_files, download_video, extract_audio, head, stable_media_id, temp_workdir,
};

const MAX_AUDIO_SIZE_BYTES: u64 = 25 * 1024 * 1024;

#[derive(Clone)]
pub struct Transcriber {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
    language: String,
    timeout: Duration,
}

impl Transcriber {
    pub fn from_env(config: &TranscribeConfig) -> Option<Self> {
        let api_key = env::var("OPENAI_API_KEY").ok()?;
        Some(Self {
            client: reqwest::Client::new(),
            api_key,
            api_base: config.api_base.clone(),
            model: config.model.clone(),
            language: config.language.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    // Download the post, strip the audio track, send it to the transcription
    // API. Temp files are cleaned up whether or not any step succeeds.
    pub async fn transcribe_url(&self, url: &str) -> Result<String, String> {
        let workdir = temp_workdir();
        tokio::fs::create_dir_all(&workdir)
            .await
            .map_err(|err| format!("failed to create temp dir: {}", err))?;

        let media_id = stable_media_id(url);
        let video_path = workdir.join(format!("video_{}.mp4", media_id));
        let audio_path = workdir.join(format!("audio_{}.mp3", media_id));

        let result = async {
            download_video(url, &video_path, self.timeout).await?;
            extract_audio(&video_path, &audio_path, self.timeout).await?;
            self.transcribe_file(&audio_path).await
        }
        .await;

        cleanup_files(&[video_path, audio_path]).await;
        result
    }

    async fn transcribe_file(&self, audio_path: &std::path::Path) -> Result<String, String> {
        let metadata = tokio::fs::metadata(audio_path)
            .await
            .map_err(|err| format!("failed to stat audio file: {}", err))?;
        if metadata.len() == 0 {
            return Err("audio file is empty".to_string());
        }
        if metadata.len() > MAX_AUDIO_SIZE_BYTES {
            return Err(format!(
                "audio file exceeds 25MB limit ({:.1}MB)",
                metadata.len() as f64 / 1024.0 / 1024.0
            ));
        }

        let bytes = tokio::fs::read(audio_path)
            .await
            .map_err(|err| format!("failed to read audio file: {}", err))?;

        let part = Part::bytes(bytes)
            .file_name("audio.mp3")
            .mime_str("audio/mpeg")
            .map_err(|err| format!("failed to build audio part: {}", err))?;

        let mut form = Form::new()
            .text("model", self.model.clone())
            .text("response_format", "text")
            .part("file", part);
        if !self.language.is_empty() && self.language != "auto" {
            form = form.text("language", self.language.clone());
        }

        let url = format!(
            "{}/audio/transcriptions",
            self.api_base.trim_end_matches('/')
        );
        info!(path = %audio_path.display(), "uploading audio for transcription");

        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|err| format!("transcription request failed: {}", err))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_else(|_| String::new());
            let detail = error_body.trim();
            if detail.is_empty() {
                return Err(format!("transcription API error: {}", status));
            }
            return Err(format!(
                "transcription API error: {} {}",
                status,
                head(detail, 200)
            ));
        }

        let transcript = response
            .text()
            .await
            .map_err(|err| format!("transcription response read failed: {}", err))?
            .trim()
            .to_string();

        if transcript.is_empty() {
            return Err("transcript is empty (the post may have no speech)".to_string());
        }
        Ok(transcript)
    }
}
