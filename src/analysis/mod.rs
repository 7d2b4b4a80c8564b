pub mod compare;
pub mod format;
pub mod sampler;
pub mod trends;

pub use compare::{account_stats, build_comparison, AccountStats, Comparison, CompetitorData};
pub use format::{format_comparison, format_sample_overview, format_trend_report};
pub use sampler::sample_posts;
pub use trends::{
    analyze_trends, DayOfWeekStat, EngagementTrend, GapStats, PerformanceTrend, TrendDirection,
    TrendReport, ViralOutlier,
};
