//! Plain-text renderings of each page for the terminal.

use std::fmt::Write;
use std::time::Instant;

use super::notice::NoticeKind;
use super::route::Route;
use super::upload::UploadPage;
use crate::models::{Analytics, FixedUser, Match, Name, UserProfile};
use crate::swipe::SwipeState;

fn header(route: Route) -> String {
    let title = route.title();
    format!("{}\n{}\n", title, "=".repeat(title.len()))
}

pub fn render_placeholder() -> String {
    "Loading...\n".to_string()
}

pub fn render_login() -> String {
    let mut out = header(Route::Login);
    out.push_str("Choose Your Perfect Last Name Together\n\nWho are you?\n");
    for user in FixedUser::ALL {
        let _ = writeln!(out, "  picker login {}   ({})", user.username(), user.display_name());
    }
    out.push_str("\nYour selection will be saved and remembered for future visits\n");
    out
}

pub fn render_home(user: &UserProfile) -> String {
    let mut out = header(Route::Home);
    let _ = writeln!(out, "Welcome, {}!", user.display_name);
    out.push_str("Find Your Perfect Last Name\n\n");
    for (route, label) in [
        (Route::Swipe, "Start Swiping"),
        (Route::Upload, "Upload Names"),
        (Route::Matches, "View Matches"),
        (Route::Analytics, "Analytics"),
    ] {
        let _ = writeln!(out, "  {:<14} picker open {}", label, route.path());
    }
    out.push_str("\nTip: Swipe right to like a name, left to pass. Names you both like will appear in your matches!\n");
    out
}

pub fn render_name_card(name: &Name) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  {}", name.name);
    if let Some(origin) = &name.origin {
        let _ = writeln!(out, "  Origin: {}", origin);
    }
    if let Some(meaning) = &name.meaning {
        let _ = writeln!(out, "  Meaning: {}", meaning);
    }
    if let Some(gender) = name.gender {
        let _ = writeln!(out, "  Gender: {}", gender);
    }
    if let Some(popularity) = name.popularity {
        let _ = writeln!(out, "  Popularity: {}", popularity);
    }
    out
}

pub fn render_swipe(state: &SwipeState, swipe_count: u64) -> String {
    let mut out = header(Route::Swipe);
    let _ = writeln!(out, "Names Reviewed: {}\n", swipe_count);

    match state {
        SwipeState::Loading => out.push_str("Loading next name...\n"),
        SwipeState::Showing(name) | SwipeState::Submitting(name) => {
            out.push_str(&render_name_card(name));
            out.push_str("\n  [l] pass   [r] like   [d <offset> <velocity>] drag   [q] quit\n");
        }
        SwipeState::Celebrating(name) => {
            let _ = writeln!(out, "*** IT'S A MATCH! ***\n  {}", name.name);
        }
        SwipeState::Exhausted => {
            out.push_str("All done for now!\nYou've reviewed all available names. Check back later for more options!\n");
        }
    }
    out
}

pub fn render_matches(matches: &[Match]) -> String {
    let mut out = header(Route::Matches);
    if matches.is_empty() {
        out.push_str("No matches yet\nKeep swiping to find names you both love!\n");
        return out;
    }

    out.push_str("Your Name Matches\n\n");
    for m in matches {
        let _ = writeln!(
            out,
            "  {:<20} Matched on {}",
            m.name,
            m.matched_at.format("%b %-d, %I:%M %p")
        );
    }
    out
}

pub fn render_analytics(analytics: &Analytics) -> String {
    let mut out = header(Route::Analytics);
    out.push_str("Your Swiping Stats\n\n");
    let _ = writeln!(out, "  Total Swipes    {}", analytics.total_swipes);
    let _ = writeln!(out, "  Names Liked     {}", analytics.likes);
    let _ = writeln!(out, "  Names Passed    {}", analytics.dislikes);
    let _ = writeln!(out, "  Matches Found   {}", analytics.matches);
    if analytics.total_swipes > 1 {
        let _ = writeln!(out, "  Avg. per Swipe  {:.1}s", analytics.average_swipe_time);
        let _ = writeln!(out, "  Time Swiping    {:.0}s", analytics.session_duration);
    }
    if !analytics.most_popular_names.is_empty() {
        let _ = writeln!(out, "  Most Liked      {}", analytics.most_popular_names.join(", "));
    }
    out
}

pub fn render_upload(page: &UploadPage) -> String {
    render_upload_at(page, Instant::now())
}

pub fn render_upload_at(page: &UploadPage, now: Instant) -> String {
    let mut out = header(Route::Upload);
    if let Some(notice) = page.notices.current_at(now) {
        let tag = match notice.kind {
            NoticeKind::Success => "OK",
            NoticeKind::Error => "ERROR",
        };
        let _ = writeln!(out, "[{}] {}\n", tag, notice.message);
    }

    let (recent, hidden) = page.recent();
    if !recent.is_empty() {
        let _ = writeln!(out, "Recently Added Names ({})", page.added_count());
        let _ = writeln!(out, "  {}", recent.join(", "));
        if hidden > 0 {
            let _ = writeln!(out, "  +{} more", hidden);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    #[test]
    fn test_swipe_page_states() {
        let name = Name {
            id: Uuid::new_v4(),
            name: "Smith".into(),
            origin: Some("English".into()),
            meaning: None,
            popularity: Some(100),
            gender: None,
        };

        let showing = render_swipe(&SwipeState::Showing(name.clone()), 3);
        assert!(showing.contains("Names Reviewed: 3"));
        assert!(showing.contains("Origin: English"));

        let celebrating = render_swipe(&SwipeState::Celebrating(name), 4);
        assert!(celebrating.contains("IT'S A MATCH!"));

        let done = render_swipe(&SwipeState::Exhausted, 4);
        assert!(done.contains("All done for now!"));
    }

    #[test]
    fn test_matches_page() {
        assert!(render_matches(&[]).contains("No matches yet"));

        let m = Match {
            id: Uuid::new_v4(),
            name_id: Uuid::new_v4(),
            name: "Smith".into(),
            users: [Uuid::new_v4(), Uuid::new_v4()],
            matched_at: Utc.with_ymd_and_hms(2025, 6, 3, 14, 5, 0).unwrap(),
        };
        let page = render_matches(&[m]);
        assert!(page.contains("Smith"));
        assert!(page.contains("Matched on Jun 3, 02:05 PM"));
    }

    #[test]
    fn test_analytics_page_zeroes() {
        let page = render_analytics(&Analytics::default());
        assert!(page.contains("Total Swipes    0"));
        assert!(!page.contains("Most Liked"));
    }
}
