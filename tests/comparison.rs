use chrono::NaiveDate;

use account_insight::analysis::{
    account_stats, build_comparison, format_comparison, CompetitorData,
};
use account_insight::{AccountProfile, FollowerCount, PostRecord};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn post(id: &str, view_count: u64, like_count: u64) -> PostRecord {
    PostRecord {
        id: id.to_string(),
        title: format!("clip {}", id),
        view_count,
        like_count,
        comment_count: 2,
        upload_date: Some(date(2026, 2, 1)),
        url: format!("https://example.com/{}", id),
        duration_seconds: None,
    }
}

fn profile(username: &str, followers: u64) -> AccountProfile {
    AccountProfile {
        username: username.to_string(),
        display_name: username.to_string(),
        followers: Some(FollowerCount::Numeric(followers)),
    }
}

#[test]
fn stats_aggregate_over_the_whole_population() {
    let posts = vec![
        post("a", 1000, 100),
        post("b", 3000, 150),
        post("c", 2000, 50),
    ];
    let stats = account_stats("someone", &posts, Some(&profile("someone", 5000)));

    assert_eq!(stats.total_posts, 3);
    assert!((stats.avg_views - 2000.0).abs() < 1e-9);
    assert!((stats.avg_likes - 100.0).abs() < 1e-9);
    assert_eq!(stats.max_views, 3000);
    // Aggregate rate is total likes over total views, not a mean of rates.
    assert!((stats.engagement_rate - 5.0).abs() < 1e-9);
    assert!(matches!(
        stats.followers,
        Some(FollowerCount::Numeric(5000))
    ));
}

#[test]
fn stats_with_no_views_have_zero_engagement() {
    let posts = vec![post("a", 0, 10), post("b", 0, 20)];
    let stats = account_stats("quiet", &posts, None);
    assert!((stats.engagement_rate - 0.0).abs() < 1e-9);
    assert!(stats.followers.is_none());
}

#[test]
fn failed_competitors_are_listed_not_tabulated() {
    let primary = account_stats("primary", &[post("a", 1000, 100)], None);
    let fetched = vec![
        CompetitorData {
            username: "rival_one".to_string(),
            posts: Some(vec![post("r1", 2000, 100)]),
            profile: Some(profile("rival_one", 9000)),
        },
        CompetitorData {
            username: "gone".to_string(),
            posts: None,
            profile: None,
        },
        CompetitorData {
            username: "rival_two".to_string(),
            posts: Some(vec![post("r2", 500, 25)]),
            profile: None,
        },
    ];

    let comparison = build_comparison(primary, fetched);
    assert_eq!(comparison.competitors.len(), 2);
    assert_eq!(comparison.failed, vec!["gone".to_string()]);
    assert_eq!(comparison.competitors[0].username, "rival_one");
    assert_eq!(comparison.competitors[1].username, "rival_two");
}

#[test]
fn table_renders_one_column_per_successful_account() {
    let primary = account_stats(
        "primary",
        &[post("a", 1000, 100)],
        Some(&profile("primary", 1234)),
    );
    let fetched = vec![
        CompetitorData {
            username: "rival".to_string(),
            posts: Some(vec![post("r", 2000, 100)]),
            profile: Some(profile("rival", 9999)),
        },
        CompetitorData {
            username: "gone".to_string(),
            posts: None,
            profile: None,
        },
    ];

    let text = format_comparison(&build_comparison(primary, fetched));

    assert!(text.contains("| Metric | **@primary** | @rival |"));
    assert!(text.contains("| Followers | 1,234 | 9,999 |"));
    assert!(text.contains("| Max views | 1,000 | 2,000 |"));
    assert!(text.contains("Fetch failed: @gone"));
}

#[test]
fn table_is_empty_when_every_competitor_failed() {
    let primary = account_stats("primary", &[post("a", 1000, 100)], None);
    let fetched = vec![CompetitorData {
        username: "gone".to_string(),
        posts: None,
        profile: None,
    }];

    let text = format_comparison(&build_comparison(primary, fetched));
    assert!(text.is_empty());
}

#[test]
fn only_numeric_followers_normalize_for_arithmetic() {
    assert_eq!(
        FollowerCount::Numeric(120_000).as_numeric(),
        Some(120_000)
    );
    assert_eq!(
        FollowerCount::RawText("1.2万".to_string()).as_numeric(),
        None
    );
}

#[test]
fn raw_text_followers_render_verbatim() {
    let mut primary = account_stats("primary", &[post("a", 1000, 100)], None);
    primary.followers = Some(FollowerCount::RawText("1.2万".to_string()));
    let fetched = vec![CompetitorData {
        username: "rival".to_string(),
        posts: Some(vec![post("r", 2000, 100)]),
        profile: None,
    }];

    let text = format_comparison(&build_comparison(primary, fetched));
    assert!(text.contains("| Followers | 1.2万 | - |"));
}
