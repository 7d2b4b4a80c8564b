use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use crate::{truncate_chars, PostRecord};

const MIN_DATED_POSTS: usize = 3;
const GROWTH_THRESHOLD_PCT: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Growth,
    Declining,
    Stable,
}

impl TrendDirection {
    pub fn label(self) -> &'static str {
        match self {
            TrendDirection::Growth => "growth",
            TrendDirection::Declining => "declining",
            TrendDirection::Stable => "stable",
        }
    }

    fn from_view_change(change_pct: f64) -> Self {
        if change_pct > GROWTH_THRESHOLD_PCT {
            TrendDirection::Growth
        } else if change_pct < -GROWTH_THRESHOLD_PCT {
            TrendDirection::Declining
        } else {
            TrendDirection::Stable
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GapStats {
    pub avg_days: f64,
    pub max_days: i64,
    pub min_days: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceTrend {
    pub first_half_avg_views: f64,
    pub second_half_avg_views: f64,
    pub view_change_pct: f64,
    pub first_half_avg_likes: f64,
    pub second_half_avg_likes: f64,
    pub like_change_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EngagementTrend {
    pub first_half_avg_rate: f64,
    pub second_half_avg_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayOfWeekStat {
    pub day: String,
    pub avg_views: f64,
    pub post_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViralOutlier {
    pub title: String,
    pub views: u64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendReport {
    pub period_days: i64,
    pub posts_analyzed: usize,
    pub posting_frequency: Option<f64>,
    pub gaps: Option<GapStats>,
    pub performance: PerformanceTrend,
    pub direction: TrendDirection,
    pub engagement: Option<EngagementTrend>,
    pub day_of_week: Vec<DayOfWeekStat>,
    pub viral_outliers: Vec<ViralOutlier>,
    pub average_views: f64,
}

// Time-series statistics over the dated subset of a population. Returns None
// when fewer than three posts carry a resolvable date; that is the
// "no trend available" result, not an error.
pub fn analyze_trends(population: &[PostRecord]) -> Option<TrendReport> {
    let mut dated: Vec<(&PostRecord, NaiveDate)> = population
        .iter()
        .filter_map(|post| post.upload_date.map(|date| (post, date)))
        .collect();

    if dated.len() < MIN_DATED_POSTS {
        return None;
    }

    dated.sort_by_key(|(_, date)| *date);

    let first_date = dated[0].1;
    let last_date = dated[dated.len() - 1].1;
    let period_days = (last_date - first_date).num_days();

    let posting_frequency = if period_days > 0 {
        Some(dated.len() as f64 / (period_days as f64 / 7.0))
    } else {
        None
    };

    let day_gaps: Vec<i64> = dated
        .windows(2)
        .map(|pair| (pair[1].1 - pair[0].1).num_days())
        .collect();
    let gaps = if day_gaps.is_empty() {
        None
    } else {
        Some(GapStats {
            avg_days: day_gaps.iter().sum::<i64>() as f64 / day_gaps.len() as f64,
            max_days: day_gaps.iter().copied().max().unwrap_or(0),
            min_days: day_gaps.iter().copied().min().unwrap_or(0),
        })
    };

    // First half gets the smaller share when the count is odd.
    let mid = dated.len() / 2;
    let (first_half, second_half) = dated.split_at(mid);

    let first_avg_views = mean(first_half.iter().map(|(post, _)| post.view_count as f64));
    let second_avg_views = mean(second_half.iter().map(|(post, _)| post.view_count as f64));
    let first_avg_likes = mean(first_half.iter().map(|(post, _)| post.like_count as f64));
    let second_avg_likes = mean(second_half.iter().map(|(post, _)| post.like_count as f64));

    let view_change_pct = percent_change(first_avg_views, second_avg_views);
    let like_change_pct = percent_change(first_avg_likes, second_avg_likes);

    let performance = PerformanceTrend {
        first_half_avg_views: first_avg_views,
        second_half_avg_views: second_avg_views,
        view_change_pct,
        first_half_avg_likes: first_avg_likes,
        second_half_avg_likes: second_avg_likes,
        like_change_pct,
    };
    let direction = TrendDirection::from_view_change(view_change_pct);

    let engagement = engagement_trend(first_half, second_half);
    let day_of_week = day_of_week_stats(&dated);

    let all_views: Vec<f64> = dated
        .iter()
        .map(|(post, _)| post.view_count as f64)
        .collect();
    let average_views = mean(all_views.iter().copied());
    let std_dev = population_std_dev(&all_views, average_views);
    let threshold = if std_dev > 0.0 {
        average_views + 2.0 * std_dev
    } else {
        average_views * 3.0
    };

    let viral_outliers: Vec<ViralOutlier> = dated
        .iter()
        .filter(|(post, _)| threshold > 0.0 && (post.view_count as f64) > threshold)
        .map(|(post, date)| ViralOutlier {
            title: truncate_chars(&post.title, 40),
            views: post.view_count,
            date: *date,
        })
        .collect();

    Some(TrendReport {
        period_days,
        posts_analyzed: dated.len(),
        posting_frequency,
        gaps,
        performance,
        direction,
        engagement,
        day_of_week,
        viral_outliers,
        average_views,
    })
}

fn engagement_trend(
    first_half: &[(&PostRecord, NaiveDate)],
    second_half: &[(&PostRecord, NaiveDate)],
) -> Option<EngagementTrend> {
    // Posts with zero views carry no rate; they are excluded, not counted
    // as 0% engagement.
    let rates = |half: &[(&PostRecord, NaiveDate)]| -> Vec<f64> {
        half.iter()
            .filter_map(|(post, _)| post.engagement_rate())
            .collect()
    };

    let first_rates = rates(first_half);
    let second_rates = rates(second_half);
    if first_rates.is_empty() || second_rates.is_empty() {
        return None;
    }

    Some(EngagementTrend {
        first_half_avg_rate: mean(first_rates.iter().copied()),
        second_half_avg_rate: mean(second_rates.iter().copied()),
    })
}

fn day_of_week_stats(dated: &[(&PostRecord, NaiveDate)]) -> Vec<DayOfWeekStat> {
    let mut buckets: HashMap<Weekday, (f64, usize)> = HashMap::new();
    for (post, date) in dated {
        let entry = buckets.entry(date.weekday()).or_insert((0.0, 0));
        entry.0 += post.view_count as f64;
        entry.1 += 1;
    }

    let mut stats: Vec<(Weekday, DayOfWeekStat)> = buckets
        .into_iter()
        .map(|(weekday, (total_views, count))| {
            (
                weekday,
                DayOfWeekStat {
                    day: weekday_label(weekday).to_string(),
                    avg_views: total_views / count as f64,
                    post_count: count,
                },
            )
        })
        .collect();

    // Descending by mean views; weekday order breaks ties deterministically.
    stats.sort_by(|(day_a, a), (day_b, b)| {
        b.avg_views
            .partial_cmp(&a.avg_views)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                day_a
                    .num_days_from_monday()
                    .cmp(&day_b.num_days_from_monday())
            })
    });

    stats.into_iter().map(|(_, stat)| stat).collect()
}

fn weekday_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut total = 0.0;
    let mut count = 0usize;
    for value in values {
        total += value;
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

fn percent_change(first: f64, second: f64) -> f64 {
    if first > 0.0 {
        (second - first) / first * 100.0
    } else {
        0.0
    }
}

fn population_std_dev(values: &[f64], mean_value: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values
        .iter()
        .map(|value| (value - mean_value).powi(2))
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}
