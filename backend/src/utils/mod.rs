pub mod config;
pub mod logging;

pub use config::{ClientConfig, Config, ConfigMode, StoreBackend};
pub use logging::init_logging;
