use account_insight::analysis::{format_sample_overview, sample_posts};
use account_insight::PostRecord;

fn post(id: &str, view_count: u64) -> PostRecord {
    PostRecord {
        id: id.to_string(),
        title: format!("clip {}", id),
        view_count,
        like_count: view_count / 10,
        comment_count: 5,
        upload_date: None,
        url: format!("https://example.com/{}", id),
        duration_seconds: Some(30.0),
    }
}

// Ranked populations are view-sorted descending; ids follow the rank so
// assertions can name positions directly.
fn ranked_population(count: usize) -> Vec<PostRecord> {
    (0..count)
        .map(|index| post(&format!("p{}", index + 1), 10_000 - (index as u64) * 100))
        .collect()
}

fn ids(posts: &[PostRecord]) -> Vec<&str> {
    posts.iter().map(|post| post.id.as_str()).collect()
}

#[test]
fn empty_population_yields_empty_sample() {
    assert!(sample_posts(&[], 5).is_empty());
}

#[test]
fn tiny_populations_are_returned_whole() {
    let one = ranked_population(1);
    assert_eq!(ids(&sample_posts(&one, 5)), vec!["p1"]);

    let two = ranked_population(2);
    assert_eq!(ids(&sample_posts(&two, 5)), vec!["p1", "p2"]);
}

#[test]
fn small_populations_take_top_two_and_last() {
    let three = ranked_population(3);
    assert_eq!(ids(&sample_posts(&three, 5)), vec!["p1", "p2", "p3"]);

    let four = ranked_population(4);
    assert_eq!(ids(&sample_posts(&four, 5)), vec!["p1", "p2", "p4"]);
}

#[test]
fn population_of_five_collapses_the_midpoint_pair() {
    // At n = 5 the slot before the midpoint is rank 2 again; the duplicate
    // slot is dropped rather than listed twice.
    let population = ranked_population(5);
    let selection = sample_posts(&population, 5);
    assert_eq!(ids(&selection), vec!["p1", "p2", "p3", "p5"]);
}

#[test]
fn full_selection_covers_top_middle_and_bottom() {
    let population = ranked_population(10);
    let selection = sample_posts(&population, 5);
    assert_eq!(ids(&selection), vec!["p1", "p2", "p5", "p6", "p10"]);
}

#[test]
fn odd_population_straddles_the_midpoint() {
    let population = ranked_population(11);
    let selection = sample_posts(&population, 5);
    assert_eq!(ids(&selection), vec!["p1", "p2", "p5", "p6", "p11"]);
}

#[test]
fn selection_is_a_subset_of_the_population() {
    let population = ranked_population(37);
    let selection = sample_posts(&population, 5);
    assert_eq!(selection.len(), 5);
    for selected in &selection {
        assert!(population.iter().any(|post| post.id == selected.id));
    }
}

#[test]
fn sampling_is_deterministic() {
    let population = ranked_population(20);
    let first = sample_posts(&population, 5);
    let second = sample_posts(&population, 5);
    assert_eq!(ids(&first), ids(&second));
}

#[test]
fn target_count_three_truncates_fixed_selection() {
    // The five-slot selection is built first and then cut down, so a smaller
    // target keeps the first slots rather than re-spreading the coverage.
    let population = ranked_population(10);
    let selection = sample_posts(&population, 3);
    assert_eq!(ids(&selection), vec!["p1", "p2", "p5"]);
}

#[test]
fn target_count_above_five_still_yields_five() {
    let population = ranked_population(30);
    let selection = sample_posts(&population, 8);
    assert_eq!(selection.len(), 5);
}

#[test]
fn overview_tags_ranks_and_tiers() {
    let population = ranked_population(12);
    let selection = sample_posts(&population, 5);
    let overview = format_sample_overview(&population, &selection);

    assert!(overview.starts_with("Sampled 5 of 12 posts"));
    assert!(overview.contains("#1 [top]"));
    assert!(overview.contains("#12 [bottom]"));
    assert!(overview.contains("#6 [mid]"));
}

#[test]
fn overview_omits_tiers_for_tiny_populations() {
    let population = ranked_population(3);
    let selection = sample_posts(&population, 5);
    let overview = format_sample_overview(&population, &selection);

    assert!(overview.contains("#1 clip p1"));
    assert!(!overview.contains("[top]"));
}
