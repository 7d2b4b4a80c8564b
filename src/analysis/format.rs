use crate::analysis::compare::{AccountStats, Comparison};
use crate::analysis::trends::{TrendReport, ViralOutlier};
use crate::{format_float, format_number, format_signed_pct, rank_tier, PostRecord};

const MAX_OUTLIERS_SHOWN: usize = 3;

// Renders a trend report as plain text for the report-generation prompt.
// Section order is fixed; absent sub-results are simply left out.
pub fn format_trend_report(report: &TrendReport) -> String {
    let mut parts = Vec::new();

    parts.push(format!(
        "Period analyzed: {} days / posts analyzed: {}",
        report.period_days, report.posts_analyzed
    ));

    if let Some(frequency) = report.posting_frequency {
        let gap_detail = report
            .gaps
            .as_ref()
            .map(|gaps| {
                format!(
                    " (avg gap {} days / longest gap {} days)",
                    format_float(gaps.avg_days, 1),
                    gaps.max_days
                )
            })
            .unwrap_or_default();
        parts.push(format!(
            "Posting cadence: {} posts/week{}",
            format_float(frequency, 1),
            gap_detail
        ));
    }

    parts.push(format!("Performance trend: [{}]", report.direction.label()));
    parts.push(format!(
        "  first-half avg views {} -> second-half avg views {} ({})",
        format_number(report.performance.first_half_avg_views),
        format_number(report.performance.second_half_avg_views),
        format_signed_pct(report.performance.view_change_pct)
    ));
    parts.push(format!(
        "  first-half avg likes {} -> second-half avg likes {} ({})",
        format_number(report.performance.first_half_avg_likes),
        format_number(report.performance.second_half_avg_likes),
        format_signed_pct(report.performance.like_change_pct)
    ));

    if let Some(engagement) = &report.engagement {
        parts.push(format!(
            "Engagement rate trend: first half {}% -> second half {}%",
            format_float(engagement.first_half_avg_rate, 2),
            format_float(engagement.second_half_avg_rate, 2)
        ));
    }

    if let Some(best) = report.day_of_week.first() {
        parts.push(format!(
            "Best performing day: {} (avg {} views / {} posts)",
            best.day,
            format_number(best.avg_views),
            best.post_count
        ));
    }

    parts.push(format!(
        "Population average views: {}",
        format_number(report.average_views)
    ));

    if !report.viral_outliers.is_empty() {
        parts.push(format!(
            "Viral outliers (above mean + 2 sigma): {}",
            report.viral_outliers.len()
        ));
        // The report stores outliers in date order; the capped listing shows
        // the highest-view ones.
        let mut ranked: Vec<&ViralOutlier> = report.viral_outliers.iter().collect();
        ranked.sort_by(|a, b| b.views.cmp(&a.views));
        for outlier in ranked.into_iter().take(MAX_OUTLIERS_SHOWN) {
            parts.push(format!(
                "  - {} ({} views, {})",
                outlier.title,
                format_number(outlier.views as f64),
                outlier.date.format("%Y-%m-%d")
            ));
        }
    }

    parts.join("\n")
}

// Summarizes which posts the sampler picked, with their rank in the
// view-sorted population and a top/mid/bottom tier tag.
pub fn format_sample_overview(population: &[PostRecord], selection: &[PostRecord]) -> String {
    let total = population.len();
    let mut parts = vec![format!(
        "Sampled {} of {} posts for deep analysis:",
        selection.len(),
        total
    )];

    for selected in selection {
        let rank = population
            .iter()
            .position(|post| post.id == selected.id)
            .map(|index| index + 1)
            .unwrap_or(0);
        let tier = rank_tier(rank, total)
            .map(|tier| format!(" [{}]", tier.label()))
            .unwrap_or_default();
        parts.push(format!(
            "  #{}{} {} ({} views)",
            rank,
            tier,
            selected.title,
            format_number(selected.view_count as f64)
        ));
    }

    parts.join("\n")
}

// Metric rows x account columns, markdown-style. Empty when no competitor
// fetch succeeded; accounts that failed are listed under the table.
pub fn format_comparison(comparison: &Comparison) -> String {
    if comparison.competitors.is_empty() {
        return String::new();
    }

    let mut parts = Vec::new();
    parts.push("### Account comparison".to_string());
    parts.push(String::new());

    let mut header = format!("| Metric | **@{}** |", comparison.primary.username);
    let mut separator = "|---|---|".to_string();
    for competitor in &comparison.competitors {
        header.push_str(&format!(" @{} |", competitor.username));
        separator.push_str("---|");
    }
    parts.push(header);
    parts.push(separator);

    let row = |label: &str, value: fn(&AccountStats) -> String| -> String {
        let mut line = format!("| {} | {} |", label, value(&comparison.primary));
        for competitor in &comparison.competitors {
            line.push_str(&format!(" {} |", value(competitor)));
        }
        line
    };

    parts.push(row("Followers", |stats| {
        stats
            .followers
            .as_ref()
            .map(|followers| followers.display())
            .unwrap_or_else(|| "-".to_string())
    }));
    parts.push(row("Posts", |stats| stats.total_posts.to_string()));
    parts.push(row("Avg views", |stats| format_number(stats.avg_views)));
    parts.push(row("Avg likes", |stats| format_number(stats.avg_likes)));
    parts.push(row("Max views", |stats| {
        format_number(stats.max_views as f64)
    }));
    parts.push(row("Engagement rate", |stats| {
        format!("{}%", format_float(stats.engagement_rate, 2))
    }));
    parts.push(row("Trend", |stats| {
        stats
            .trend
            .map(|trend| trend.label().to_string())
            .unwrap_or_else(|| "-".to_string())
    }));
    parts.push(row("Cadence", |stats| {
        stats
            .posting_frequency
            .map(|frequency| format!("{}/week", format_float(frequency, 1)))
            .unwrap_or_else(|| "-".to_string())
    }));

    if !comparison.failed.is_empty() {
        parts.push(String::new());
        let failed: Vec<String> = comparison
            .failed
            .iter()
            .map(|username| format!("@{}", username))
            .collect();
        parts.push(format!("Fetch failed: {}", failed.join(", ")));
    }

    parts.join("\n")
}
