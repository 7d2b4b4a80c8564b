use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::info;

use account_insight::config::VisionConfig;

use crate::media::{
    cleanup_files, download_video, extract_frames, head, probe_duration, stable_media_id,
    temp_workdir,
};

#[derive(Clone)]
pub struct VisionAnalyzer {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
    max_frames: usize,
}

impl VisionAnalyzer {
    pub fn from_env(config: &VisionConfig) -> Option<Self> {
        let api_key = env::var("OPENAI_API_KEY").ok()?;
        Some(Self {
            client: reqwest::Client::new(),
            api_key,
            api_base: config.api_base.clone(),
            model: config.model.clone(),
            max_frames: config.max_frames,
        })
    }

    pub async fn describe_url(&self, url: &str) -> Result<String, String> {
        let workdir = temp_workdir();
        tokio::fs::create_dir_all(&workdir)
            .await
            .map_err(|err| format!("failed to create temp dir: {}", err))?;

        let media_id = stable_media_id(url);
        let video_path = workdir.join(format!("visual_{}.mp4", media_id));
        let frame_dir = workdir.join(format!("frames_{}", media_id));

        let result = async {
            download_video(url, &video_path, Duration::from_secs(120)).await?;
            let duration = probe_duration(&video_path).await;
            let count = frame_count_for(duration).min(self.max_frames.max(1));
            let frames =
                extract_frames(&video_path, &frame_dir, count, Duration::from_secs(30)).await?;
            info!(frames = frames.len(), "describing keyframes");
            let described = self.describe_frames(&frames).await;
            cleanup_files(&frames).await;
            let _ = tokio::fs::remove_dir(&frame_dir).await;
            described
        }
        .await;

        cleanup_files(&[video_path]).await;
        result
    }

    async fn describe_frames(&self, frames: &[std::path::PathBuf]) -> Result<String, String> {
        let mut content = vec![VisionContent::Text {
            text: vision_prompt(frames.len()),
        }];

        for frame in frames {
            let bytes = tokio::fs::read(frame)
                .await
                .map_err(|err| format!("failed to read frame: {}", err))?;
            content.push(VisionContent::ImageUrl {
                image_url: ImageUrl {
                    url: format!("data:image/jpeg;base64,{}", BASE64.encode(&bytes)),
                },
            });
        }

        let request = VisionRequest {
            model: self.model.clone(),
            max_tokens: 2000,
            messages: vec![VisionMessage {
                role: "user".to_string(),
                content,
            }],
        };

        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|err| format!("vision request failed: {}", err))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_else(|_| String::new());
            let detail = error_body.trim();
            if detail.is_empty() {
                return Err(format!("vision API error: {}", status));
            }
            return Err(format!("vision API error: {} {}", status, head(detail, 200)));
        }

        let body: VisionResponse = response
            .json()
            .await
            .map_err(|err| format!("vision response parse failed: {}", err))?;

        let description = body
            .choices
            .first()
            .ok_or_else(|| "vision response missing choices".to_string())?
            .message
            .content
            .trim()
            .to_string();

        if description.is_empty() {
            return Err("vision description is empty".to_string());
        }
        Ok(description)
    }
}

// Short clips get fewer frames; capped at 20 to keep vision costs bounded.
pub fn frame_count_for(duration: Option<f64>) -> usize {
    match duration {
        None => 5,
        Some(duration) if duration <= 0.0 => 5,
        Some(duration) if duration <= 15.0 => 5,
        Some(duration) if duration <= 30.0 => 8,
        Some(duration) if duration <= 60.0 => 12,
        Some(duration) if duration <= 90.0 => 15,
        Some(_) => 20,
    }
}

fn vision_prompt(num_frames: usize) -> String {
    format!(
        r#"You are an expert at visual analysis of short-form social video. You are given {} keyframes extracted at even intervals from one video. Analyze:
1. Overall shooting style: camera setup, lighting, image quality, tone.
2. Composition: subject placement, framing, on-camera presence, background.
3. On-screen text: captions, font style, placement, size, role of the text.
4. Editing: apparent cut frequency, transitions, effects, split screens.
5. Thumbnail/hook strength of the FIRST frame (the 0-second mark): rate its scroll-stopping power 1-10, name the visual hook elements, whether the topic reads in under half a second, and at least three concrete improvements.
6. Differentiation: what makes this visual style distinct from typical short-form video, and how consistent the frames are with each other.
Be specific and concrete in every section."#,
        num_frames
    )
}

#[derive(Serialize)]
struct VisionRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<VisionMessage>,
}

#[derive(Serialize)]
struct VisionMessage {
    role: String,
    content: Vec<VisionContent>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum VisionContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct VisionResponse {
    choices: Vec<VisionChoice>,
}

#[derive(Deserialize)]
struct VisionChoice {
    message: VisionChoiceMessage,
}

#[derive(Deserialize)]
struct VisionChoiceMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::frame_count_for;

    #[test]
    fn frame_count_scales_with_duration() {
        assert_eq!(frame_count_for(None), 5);
        assert_eq!(frame_count_for(Some(12.0)), 5);
        assert_eq!(frame_count_for(Some(30.0)), 8);
        assert_eq!(frame_count_for(Some(45.0)), 12);
        assert_eq!(frame_count_for(Some(90.0)), 15);
        assert_eq!(frame_count_for(Some(300.0)), 20);
    }
}
