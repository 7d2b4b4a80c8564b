use std::path::PathBuf;
use tracing::{info, warn};

use account_insight::analysis::{
    account_stats, analyze_trends, build_comparison, format_comparison, format_sample_overview,
    format_trend_report, sample_posts, AccountStats, CompetitorData,
};
use account_insight::config::AnalyzerConfig;
use account_insight::{table_rows, AccountProfile, AnalysisMode, EnrichedPost, PostTableRow};

use crate::comments::CommentAnalyzer;
use crate::fetch::{extract_username, MetadataFetcher};
use crate::report::{build_system_prompt, build_user_prompt, ReportClient};
use crate::store::{rows_from, AccountStore};
use crate::transcribe::Transcriber;
use crate::vision::VisionAnalyzer;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub account: String,
    pub competitors: Vec<String>,
    pub mode: AnalysisMode,
    pub transcribe: bool,
    pub visual: bool,
    pub comments: bool,
    pub save: bool,
    pub supplement: Option<String>,
}

pub struct Clients {
    pub fetcher: MetadataFetcher,
    pub transcriber: Option<Transcriber>,
    pub vision: Option<VisionAnalyzer>,
    pub comments: Option<CommentAnalyzer>,
    pub report: Option<ReportClient>,
    pub store: AccountStore,
}

impl Clients {
    pub fn from_env(config: &AnalyzerConfig) -> Self {
        Self {
            fetcher: MetadataFetcher::from_config(&config.fetch),
            transcriber: Transcriber::from_env(&config.transcribe),
            vision: VisionAnalyzer::from_env(&config.vision),
            comments: CommentAnalyzer::from_env(&config.comments),
            report: ReportClient::from_env(&config.report),
            store: AccountStore::from_config(&config.store),
        }
    }
}

pub struct AnalysisOutcome {
    pub username: String,
    pub profile: Option<AccountProfile>,
    pub table: Vec<PostTableRow>,
    pub sample_overview: String,
    pub trend_text: String,
    pub comparison_text: String,
    pub stats: AccountStats,
    pub enriched: Vec<EnrichedPost>,
    pub report: Option<String>,
    pub saved_path: Option<PathBuf>,
    pub warnings: Vec<String>,
}

pub async fn run_analysis(
    config: &AnalyzerConfig,
    clients: &Clients,
    options: &PipelineOptions,
    progress: &(dyn Fn(&str, &str) + Send + Sync),
) -> Result<AnalysisOutcome, String> {
    let username = extract_username(&options.account)
        .ok_or_else(|| format!("could not read an account handle from '{}'", options.account))?;
    let mut warnings = Vec::new();

    progress("fetch", &format!("fetching metadata for @{}", username));
    let profile = match clients.fetcher.fetch_profile(&username).await {
        Ok(profile) => Some(profile),
        Err(err) => {
            warnings.push(format!("profile fetch failed: {}", err));
            None
        }
    };

    let posts = clients
        .fetcher
        .fetch_videos(&username, config.fetch.max_videos)
        .await?;
    info!(username = %username, posts = posts.len(), "metadata fetched");

    let table = table_rows(&posts);
    let selection = sample_posts(&posts, config.sampling.target_count);
    let sample_overview = format_sample_overview(&posts, &selection);
    progress(
        "sample",
        &format!("selected {} of {} posts for deep analysis", selection.len(), posts.len()),
    );

    let mut enriched = Vec::with_capacity(selection.len());
    for (index, post) in selection.iter().enumerate() {
        let mut entry = EnrichedPost::new(post.clone());
        let post_label = format!("post {}/{}", index + 1, selection.len());

        if options.transcribe {
            match &clients.transcriber {
                Some(transcriber) => {
                    progress("transcribe", &format!("transcribing {}", post_label));
                    match transcriber.transcribe_url(&post.url).await {
                        Ok(transcript) => entry.transcript = Some(transcript),
                        Err(err) => {
                            warnings.push(format!("transcription failed for {}: {}", post.id, err))
                        }
                    }
                }
                None => warnings.push("transcription skipped: OPENAI_API_KEY not set".to_string()),
            }
        }

        if options.visual {
            match &clients.vision {
                Some(vision) => {
                    progress("visual", &format!("analyzing visuals of {}", post_label));
                    match vision.describe_url(&post.url).await {
                        Ok(description) => entry.visual_analysis = Some(description),
                        Err(err) => {
                            warnings.push(format!("visual analysis failed for {}: {}", post.id, err))
                        }
                    }
                }
                None => {
                    warnings.push("visual analysis skipped: OPENAI_API_KEY not set".to_string())
                }
            }
        }

        if options.comments {
            match &clients.comments {
                Some(analyzer) => {
                    progress("comments", &format!("analyzing comments of {}", post_label));
                    match analyzer.analyze_url(&post.url).await {
                        Ok(summary) => entry.comment_analysis = summary,
                        Err(err) => {
                            warnings.push(format!("comment analysis failed for {}: {}", post.id, err))
                        }
                    }
                }
                None => {
                    warnings.push("comment analysis skipped: OPENAI_API_KEY not set".to_string())
                }
            }
        }

        enriched.push(entry);
    }

    progress("trends", "computing posting trends");
    let trend_text = analyze_trends(&posts)
        .map(|report| format_trend_report(&report))
        .unwrap_or_default();

    let stats = account_stats(&username, &posts, profile.as_ref());

    let comparison_text = if options.competitors.is_empty() {
        String::new()
    } else {
        let mut fetched = Vec::new();
        for competitor in &options.competitors {
            let handle = match extract_username(competitor) {
                Some(handle) => handle,
                None => {
                    warnings.push(format!("could not read a competitor handle from '{}'", competitor));
                    continue;
                }
            };
            progress("compare", &format!("fetching competitor @{}", handle));
            let competitor_profile = clients.fetcher.fetch_profile(&handle).await.ok();
            let competitor_posts = match clients
                .fetcher
                .fetch_videos(&handle, config.fetch.competitor_max_videos)
                .await
            {
                Ok(posts) => Some(posts),
                Err(err) => {
                    warn!(competitor = %handle, "competitor fetch failed");
                    warnings.push(format!("competitor @{} fetch failed: {}", handle, err));
                    None
                }
            };
            fetched.push(CompetitorData {
                username: handle,
                posts: competitor_posts,
                profile: competitor_profile,
            });
        }
        let comparison = build_comparison(stats.clone(), fetched);
        format_comparison(&comparison)
    };

    let report = match &clients.report {
        Some(client) => {
            progress("report", "generating the analysis report");
            let system = build_system_prompt(options.mode);
            let user = build_user_prompt(
                &username,
                profile.as_ref(),
                &posts,
                &enriched,
                &trend_text,
                &comparison_text,
                options.supplement.as_deref(),
            );
            match client.generate(&system, &user).await {
                Ok(report) => Some(report),
                Err(err) => {
                    warnings.push(format!("report generation failed: {}", err));
                    None
                }
            }
        }
        None => {
            warnings.push("report generation skipped: ANTHROPIC_API_KEY not set".to_string());
            None
        }
    };

    let saved_path = if options.save {
        progress("save", "saving analyzed rows");
        let rows = rows_from(&enriched);
        match clients.store.save_rows(&username, &rows).await {
            Ok(path) => Some(path),
            Err(err) => {
                warnings.push(format!("save failed: {}", err));
                None
            }
        }
    } else {
        None
    };

    progress("done", "analysis complete");
    Ok(AnalysisOutcome {
        username,
        profile,
        table,
        sample_overview,
        trend_text,
        comparison_text,
        stats,
        enriched,
        report,
        saved_path,
        warnings,
    })
}
