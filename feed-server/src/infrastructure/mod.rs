pub mod cache;
pub mod clock;
pub mod config;
pub mod database;
pub mod logging;
pub mod security;
