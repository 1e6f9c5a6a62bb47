use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Analytics as `get_user_analytics` returns it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsRow {
    pub total_swipes: i64,
    pub likes: i64,
    pub dislikes: i64,
    pub matches: i64,
    pub average_swipe_time: f64,
    pub session_duration: f64,
    pub most_popular_names: Vec<String>,
}

impl AnalyticsRow {
    /// Fill the timing fields from the first and last swipe of a user.
    pub fn with_timing(mut self, first: Option<DateTime<Utc>>, last: Option<DateTime<Utc>>) -> Self {
        let (average, duration) = swipe_timing(first, last, self.total_swipes);
        self.average_swipe_time = average;
        self.session_duration = duration;
        self
    }
}

/// Average seconds between swipes and the span covered by them.
pub fn swipe_timing(first: Option<DateTime<Utc>>, last: Option<DateTime<Utc>>, total_swipes: i64) -> (f64, f64) {
    match (first, last) {
        (Some(first), Some(last)) if total_swipes > 1 && last > first => {
            let span = (last - first).num_milliseconds() as f64 / 1000.0;
            (span / (total_swipes - 1) as f64, span)
        }
        _ => (0.0, 0.0),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analytics {
    pub total_swipes: u64,
    pub likes: u64,
    pub dislikes: u64,
    pub matches: u64,
    pub average_swipe_time: f64,
    pub most_popular_names: Vec<String>,
    pub session_duration: f64,
}

impl From<AnalyticsRow> for Analytics {
    fn from(row: AnalyticsRow) -> Self {
        let count = |v: i64| u64::try_from(v).unwrap_or(0);
        Self {
            total_swipes: count(row.total_swipes),
            likes: count(row.likes),
            dislikes: count(row.dislikes),
            matches: count(row.matches),
            average_swipe_time: row.average_swipe_time.max(0.0),
            most_popular_names: row.most_popular_names,
            session_duration: row.session_duration.max(0.0),
        }
    }
}
