pub mod ai;
pub mod config;
pub mod http_client;
pub mod logging;
pub mod output;
pub mod persistence;
