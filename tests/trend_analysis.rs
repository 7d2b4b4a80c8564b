use chrono::NaiveDate;

use account_insight::analysis::{analyze_trends, format_trend_report, TrendDirection};
use account_insight::PostRecord;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn dated_post(id: &str, view_count: u64, like_count: u64, upload_date: NaiveDate) -> PostRecord {
    PostRecord {
        id: id.to_string(),
        title: format!("clip {}", id),
        view_count,
        like_count,
        comment_count: 0,
        upload_date: Some(upload_date),
        url: format!("https://example.com/{}", id),
        duration_seconds: None,
    }
}

fn undated_post(id: &str, view_count: u64) -> PostRecord {
    PostRecord {
        upload_date: None,
        ..dated_post(id, view_count, 0, date(2026, 1, 1))
    }
}

// Six posts, one every seven days, so halves and cadence are easy to reason
// about. View counts are supplied per half.
fn weekly_series(first_half_views: [u64; 3], second_half_views: [u64; 3]) -> Vec<PostRecord> {
    first_half_views
        .iter()
        .chain(second_half_views.iter())
        .enumerate()
        .map(|(index, views)| {
            dated_post(
                &format!("p{}", index + 1),
                *views,
                views / 10,
                date(2026, 3, 2) + chrono::Duration::days(7 * index as i64),
            )
        })
        .collect()
}

#[test]
fn too_few_dated_posts_yields_no_report() {
    let posts = vec![
        dated_post("a", 100, 10, date(2026, 1, 1)),
        dated_post("b", 200, 20, date(2026, 1, 8)),
    ];
    assert!(analyze_trends(&posts).is_none());
}

#[test]
fn undated_posts_do_not_count_toward_the_minimum() {
    let posts = vec![
        dated_post("a", 100, 10, date(2026, 1, 1)),
        dated_post("b", 200, 20, date(2026, 1, 8)),
        undated_post("c", 300),
        undated_post("d", 400),
    ];
    assert!(analyze_trends(&posts).is_none());
}

#[test]
fn cadence_over_a_known_span() {
    // 6 posts across 35 days is 1.2 posts per week.
    let posts = weekly_series([100, 100, 100], [100, 100, 100]);
    let report = analyze_trends(&posts).unwrap();

    assert_eq!(report.period_days, 35);
    assert_eq!(report.posts_analyzed, 6);
    let frequency = report.posting_frequency.unwrap();
    assert!((frequency - 1.2).abs() < 1e-9);

    let gaps = report.gaps.unwrap();
    assert!((gaps.avg_days - 7.0).abs() < 1e-9);
    assert_eq!(gaps.max_days, 7);
    assert_eq!(gaps.min_days, 7);
}

#[test]
fn single_day_span_has_no_cadence() {
    let posts = vec![
        dated_post("a", 100, 10, date(2026, 1, 1)),
        dated_post("b", 200, 20, date(2026, 1, 1)),
        dated_post("c", 300, 30, date(2026, 1, 1)),
    ];
    let report = analyze_trends(&posts).unwrap();
    assert_eq!(report.period_days, 0);
    assert!(report.posting_frequency.is_none());
}

#[test]
fn direction_follows_the_twenty_percent_band() {
    let growth = analyze_trends(&weekly_series([100, 100, 100], [130, 130, 130])).unwrap();
    assert_eq!(growth.direction, TrendDirection::Growth);
    assert!((growth.performance.view_change_pct - 30.0).abs() < 1e-9);

    let stable = analyze_trends(&weekly_series([100, 100, 100], [110, 110, 110])).unwrap();
    assert_eq!(stable.direction, TrendDirection::Stable);

    let exactly_on_band = analyze_trends(&weekly_series([100, 100, 100], [120, 120, 120])).unwrap();
    assert_eq!(exactly_on_band.direction, TrendDirection::Stable);

    let declining = analyze_trends(&weekly_series([100, 100, 100], [70, 70, 70])).unwrap();
    assert_eq!(declining.direction, TrendDirection::Declining);
}

#[test]
fn odd_count_puts_the_smaller_half_first() {
    let posts = vec![
        dated_post("a", 100, 0, date(2026, 1, 1)),
        dated_post("b", 200, 0, date(2026, 1, 8)),
        dated_post("c", 300, 0, date(2026, 1, 15)),
        dated_post("d", 400, 0, date(2026, 1, 22)),
        dated_post("e", 500, 0, date(2026, 1, 29)),
    ];
    let report = analyze_trends(&posts).unwrap();
    // First half is [100, 200]; second half is [300, 400, 500].
    assert!((report.performance.first_half_avg_views - 150.0).abs() < 1e-9);
    assert!((report.performance.second_half_avg_views - 400.0).abs() < 1e-9);
}

#[test]
fn engagement_excludes_zero_view_posts() {
    let posts = vec![
        dated_post("a", 100, 10, date(2026, 1, 1)),
        dated_post("b", 0, 5, date(2026, 1, 8)),
        dated_post("c", 100, 20, date(2026, 1, 15)),
        dated_post("d", 100, 20, date(2026, 1, 22)),
    ];
    let report = analyze_trends(&posts).unwrap();

    // The zero-view post in the first half contributes no rate at all.
    let engagement = report.engagement.unwrap();
    assert!((engagement.first_half_avg_rate - 10.0).abs() < 1e-9);
    assert!((engagement.second_half_avg_rate - 20.0).abs() < 1e-9);
}

#[test]
fn engagement_absent_when_a_half_has_no_rated_posts() {
    let posts = vec![
        dated_post("a", 0, 5, date(2026, 1, 1)),
        dated_post("b", 0, 5, date(2026, 1, 8)),
        dated_post("c", 100, 10, date(2026, 1, 15)),
        dated_post("d", 100, 10, date(2026, 1, 22)),
    ];
    let report = analyze_trends(&posts).unwrap();
    assert!(report.engagement.is_none());
}

#[test]
fn best_day_ranks_by_average_views() {
    // Two Mondays averaging 150, one Friday at 400.
    let posts = vec![
        dated_post("a", 100, 0, date(2026, 3, 2)),
        dated_post("b", 200, 0, date(2026, 3, 9)),
        dated_post("c", 400, 0, date(2026, 3, 13)),
    ];
    let report = analyze_trends(&posts).unwrap();

    let best = &report.day_of_week[0];
    assert_eq!(best.day, "Friday");
    assert_eq!(best.post_count, 1);
    assert!((best.avg_views - 400.0).abs() < 1e-9);

    let runner_up = &report.day_of_week[1];
    assert_eq!(runner_up.day, "Monday");
    assert_eq!(runner_up.post_count, 2);
}

#[test]
fn outlier_exactly_on_the_threshold_is_excluded() {
    // Four posts at 10 and one at 100: the big one sits exactly at
    // mean + 2 sigma, and the comparison is strictly greater-than.
    let views = [10, 10, 10, 10, 100];
    let posts: Vec<PostRecord> = views
        .iter()
        .enumerate()
        .map(|(index, value)| {
            dated_post(
                &format!("p{}", index),
                *value,
                0,
                date(2026, 1, 1) + chrono::Duration::days(index as i64),
            )
        })
        .collect();

    let report = analyze_trends(&posts).unwrap();
    assert!(report.viral_outliers.is_empty());
}

#[test]
fn outlier_above_the_threshold_is_reported() {
    let views = [10, 10, 10, 10, 10, 1000];
    let posts: Vec<PostRecord> = views
        .iter()
        .enumerate()
        .map(|(index, value)| {
            dated_post(
                &format!("p{}", index),
                *value,
                0,
                date(2026, 1, 1) + chrono::Duration::days(index as i64),
            )
        })
        .collect();

    let report = analyze_trends(&posts).unwrap();
    assert_eq!(report.viral_outliers.len(), 1);
    assert_eq!(report.viral_outliers[0].views, 1000);
    assert_eq!(report.viral_outliers[0].date, date(2026, 1, 6));
}

#[test]
fn uniform_views_produce_no_outliers() {
    // Zero variance falls back to a triple-mean threshold, which no equal
    // value can exceed.
    let posts = weekly_series([500, 500, 500], [500, 500, 500]);
    let report = analyze_trends(&posts).unwrap();
    assert!(report.viral_outliers.is_empty());

    let silent = weekly_series([0, 0, 0], [0, 0, 0]);
    let report = analyze_trends(&silent).unwrap();
    assert!(report.viral_outliers.is_empty());
}

#[test]
fn report_text_has_a_stable_section_order() {
    let posts = weekly_series([100, 100, 100], [130, 130, 130]);
    let report = analyze_trends(&posts).unwrap();
    let text = format_trend_report(&report);

    let period = text.find("Period analyzed").unwrap();
    let cadence = text.find("Posting cadence").unwrap();
    let performance = text.find("Performance trend: [growth]").unwrap();
    let average = text.find("Population average views").unwrap();
    assert!(period < cadence);
    assert!(cadence < performance);
    assert!(performance < average);
}

#[test]
fn report_text_omits_absent_sections() {
    let posts = vec![
        dated_post("a", 0, 5, date(2026, 1, 1)),
        dated_post("b", 0, 5, date(2026, 1, 8)),
        dated_post("c", 100, 10, date(2026, 1, 15)),
        dated_post("d", 100, 10, date(2026, 1, 22)),
    ];
    let report = analyze_trends(&posts).unwrap();
    let text = format_trend_report(&report);
    assert!(!text.contains("Engagement rate trend"));
}

#[test]
fn listed_outliers_are_top_three_by_views() {
    // Sixty quiet posts and four loud ones. All four clear the threshold, so
    // the count line says 4; the three listed lines are the highest by views,
    // not the first three by date, and the biggest outlier is the most recent.
    let mut posts: Vec<PostRecord> = (0..60)
        .map(|index| {
            dated_post(
                &format!("quiet{}", index),
                10,
                0,
                date(2026, 1, 1) + chrono::Duration::days(index),
            )
        })
        .collect();
    for (index, views) in [40_000u64, 42_000, 44_000, 80_000].iter().enumerate() {
        posts.push(dated_post(
            &format!("loud{}", index),
            *views,
            0,
            date(2026, 4, 1) + chrono::Duration::days(index as i64),
        ));
    }

    let report = analyze_trends(&posts).unwrap();
    assert_eq!(report.viral_outliers.len(), 4);

    let text = format_trend_report(&report);
    assert!(text.contains("Viral outliers (above mean + 2 sigma): 4"));
    let listed = text.matches("views, 2026-").count();
    assert_eq!(listed, 3);
    assert!(text.contains("80,000 views"));
    assert!(text.contains("44,000 views"));
    assert!(text.contains("42,000 views"));
    assert!(!text.contains("40,000 views"));
}
