// =============================================================================
// Name Picker Constants
// =============================================================================
// This file contains the constants shared by the server, the client adapter
// and the terminal views so pacing and limits can be tuned in one place.

use uuid::Uuid;

// =============================================================================
// FIXED ACCOUNTS
// =============================================================================

/// Seeded profile id for Joe
pub const JOE_USER_ID: Uuid = Uuid::from_u128(0x550e8400_e29b_41d4_a716_446655440001);

/// Seeded profile id for Sam
pub const SAM_USER_ID: Uuid = Uuid::from_u128(0x550e8400_e29b_41d4_a716_446655440002);

// =============================================================================
// SEED DATA
// =============================================================================

/// (name, origin, meaning, popularity) rows loaded by the migration and by the in-memory store
pub const SEED_NAMES: &[(&str, &str, &str, i32)] = &[
    ("Smith", "English", "Metalworker", 95),
    ("Johnson", "English", "Son of John", 90),
    ("Williams", "English", "Son of William", 85),
    ("Brown", "English", "Color name", 80),
    ("Jones", "Welsh", "Son of John", 88),
    ("Garcia", "Spanish", "Bear", 75),
    ("Miller", "English", "Grain grinder", 78),
    ("Davis", "Welsh", "Son of David", 82),
];

// =============================================================================
// SWIPE PACING
// =============================================================================

/// How long the match celebration stays on screen
pub const MATCH_CELEBRATION_MS: u64 = 2000;

/// Delay before the next candidate is fetched after a plain swipe
pub const SWIPE_ADVANCE_DELAY_MS: u64 = 300;

/// Horizontal drag distance that commits a swipe
pub const DRAG_OFFSET_THRESHOLD: f64 = 100.0;

/// Horizontal fling velocity that commits a swipe
pub const DRAG_VELOCITY_THRESHOLD: f64 = 500.0;

// =============================================================================
// ANALYTICS
// =============================================================================

/// Number of names reported in `most_popular_names`
pub const MOST_POPULAR_NAMES_LIMIT: i64 = 3;

// =============================================================================
// UPLOADS
// =============================================================================

/// Only files with this extension are accepted for bulk upload
pub const NAME_LIST_EXTENSION: &str = "txt";

/// Inline notices disappear after this many seconds
pub const NOTICE_DISMISS_SECS: u64 = 5;

/// Recently added names shown on the upload page before collapsing into "+N more"
pub const RECENT_UPLOADS_SHOWN: usize = 20;

// =============================================================================
// SERVER CONFIGURATION
// =============================================================================

/// Default server port if not specified in environment
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Backend URL used by the client when none is configured outside production
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:3000";

/// Header carrying the public API key
pub const API_KEY_HEADER: &str = "apikey";

/// Access tokens older than this stop resolving and are pruned on the next login
pub const SESSION_TTL_DAYS: i64 = 30;

/// Session file used by the terminal client when none is configured
pub const DEFAULT_SESSION_FILE: &str = ".name-picker-session.json";
