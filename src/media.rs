use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

// Temp file names derive from a digest of the URL so repeated runs reuse the
// same identifiers; runtime hashes are not stable across processes.
pub fn stable_media_id(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let digest = hasher.finalize();
    digest
        .iter()
        .take(6)
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

pub fn temp_workdir() -> PathBuf {
    std::env::temp_dir().join("account-insight")
}

pub async fn run_command(
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<Output, String> {
    let future = Command::new(program).args(args).output();
    let output = tokio::time::timeout(timeout, future)
        .await
        .map_err(|_| format!("{} timed out after {}s", program, timeout.as_secs()))?
        .map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                format!("{} not found", program)
            } else {
                format!("{} failed to start: {}", program, err)
            }
        })?;
    Ok(output)
}

pub async fn download_video(url: &str, output_path: &Path, timeout: Duration) -> Result<(), String> {
    let path_str = output_path.to_string_lossy().to_string();
    let output = run_command(
        "yt-dlp",
        &["--quiet", "--no-warnings", "-o", &path_str, url],
        timeout,
    )
    .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("video download failed: {}", head(&stderr, 200)));
    }

    if !output_path.exists() {
        // yt-dlp may append its own extension.
        for ext in ["mp4", "webm", "mkv"] {
            let candidate = PathBuf::from(format!("{}.{}", path_str, ext));
            if candidate.exists() {
                tokio::fs::rename(&candidate, output_path)
                    .await
                    .map_err(|err| format!("failed to move downloaded video: {}", err))?;
                return Ok(());
            }
        }
        return Err("downloaded video file not found".to_string());
    }

    Ok(())
}

pub async fn extract_audio(
    video_path: &Path,
    audio_path: &Path,
    timeout: Duration,
) -> Result<(), String> {
    let video = video_path.to_string_lossy().to_string();
    let audio = audio_path.to_string_lossy().to_string();
    let output = run_command(
        "ffmpeg",
        &[
            "-i", &video, "-vn", "-acodec", "libmp3lame", "-b:a", "64k", "-y", &audio,
        ],
        timeout,
    )
    .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("audio extraction failed: {}", head(&stderr, 200)));
    }
    if !audio_path.exists() {
        return Err("audio file was not produced".to_string());
    }
    Ok(())
}

pub async fn probe_duration(video_path: &Path) -> Option<f64> {
    let video = video_path.to_string_lossy().to_string();
    let output = run_command(
        "ffprobe",
        &[
            "-v",
            "quiet",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
            &video,
        ],
        Duration::from_secs(30),
    )
    .await
    .ok()?;

    if !output.status.success() {
        return None;
    }
    String::from_utf8_lossy(&output.stdout)
        .trim()
        .parse::<f64>()
        .ok()
}

// Evenly spaced frames; one ffmpeg seek per frame keeps it simple and
// tolerant of variable-framerate clips.
pub async fn extract_frames(
    video_path: &Path,
    frame_dir: &Path,
    count: usize,
    timeout: Duration,
) -> Result<Vec<PathBuf>, String> {
    tokio::fs::create_dir_all(frame_dir)
        .await
        .map_err(|err| format!("failed to create frame dir: {}", err))?;

    let duration = probe_duration(video_path).await;
    let video = video_path.to_string_lossy().to_string();
    let mut frames = Vec::new();

    let count = match duration {
        Some(duration) if duration >= 1.0 => count.max(1),
        _ => 1,
    };

    for index in 0..count {
        let offset = duration
            .map(|duration| duration * (index as f64 + 0.5) / count as f64)
            .unwrap_or(0.0);
        let offset_arg = format!("{:.2}", offset);
        let frame_path = frame_dir.join(format!("frame_{:03}.jpg", index + 1));
        let frame = frame_path.to_string_lossy().to_string();

        let output = run_command(
            "ffmpeg",
            &[
                "-hide_banner",
                "-loglevel",
                "error",
                "-ss",
                &offset_arg,
                "-i",
                &video,
                "-vframes",
                "1",
                "-q:v",
                "2",
                "-y",
                &frame,
            ],
            timeout,
        )
        .await?;

        if output.status.success() && frame_path.exists() {
            frames.push(frame_path);
        }
    }

    if frames.is_empty() {
        return Err("no keyframes could be extracted".to_string());
    }
    Ok(frames)
}

pub async fn cleanup_files(paths: &[PathBuf]) {
    for path in paths {
        let _ = tokio::fs::remove_file(path).await;
    }
}

pub fn head(value: &str, limit: usize) -> String {
    value.chars().take(limit).collect()
}
