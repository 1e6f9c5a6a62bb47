pub mod auth;
pub mod extract;
pub mod rest;
pub mod rpc;

pub use auth::{current_session, login, logout};
pub use extract::{AuthUser, require_api_key};
pub use rest::{create_swipe, get_name, get_user_profile};
pub use rpc::{add_user_name, get_next_unseen_name, get_user_analytics, get_user_matches};
