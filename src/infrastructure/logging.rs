//! Tracing initialization. Logs go to stderr so stdout stays clean for
//! rendered commands and response bodies.

use tracing_subscriber::EnvFilter;

/// Log filter used when no `-v` flag is given.
pub const ENV_REQSMITH_LOG: &str = "REQSMITH_LOG";

fn filter_directive(verbosity: u8) -> String {
    match verbosity {
        0 => std::env::var(ENV_REQSMITH_LOG).unwrap_or_else(|_| "error".to_string()),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

pub fn init_tracing(verbosity: u8) {
    let env_filter = EnvFilter::try_new(filter_directive(verbosity))
        .unwrap_or_else(|_| EnvFilter::new("error"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
