pub mod api;
pub mod categories;
pub mod config;
pub mod enhance;
pub mod global_config;
pub mod listings;
