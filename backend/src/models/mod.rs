pub mod analytics;
pub mod matches;
pub mod names;
pub mod swipes;
pub mod users;

pub use analytics::{Analytics, AnalyticsRow};
pub use matches::{Match, MatchRow, ordered_pair};
pub use names::{Gender, Name, NameDetails, NameRow, NewName};
pub use swipes::{SwipeAction, SwipeDecision, SwipeDirection, SwipeRecord, SwipeResult, SwipeRow};
pub use users::{FixedUser, SessionRow, UserProfile};
