//! Spotify Top-by-Country Library
//!
//! This library collects the top tracks, artists and genres for a fixed set of
//! markets from the Spotify Web API, aggregates them per country and renders the
//! result as CSV files, Prometheus gauges and a JSON document.
//!
//! # Modules
//!
//! - `api` - HTTP handlers (OAuth redirect/callback, `/top-data`, health)
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `fetch` - Concurrent fetch pipeline with rate-limit backoff
//! - `output` - Projections of aggregated results (rows, metrics, JSON, CSV)
//! - `server` - API and metrics HTTP servers
//! - `spotify` - Spotify Web API client implementation
//! - `telemetry` - Prometheus recorder and gauge updates
//! - `types` - Data structures and type definitions

pub mod api;
pub mod cli;
pub mod config;
pub mod fetch;
pub mod output;
pub mod server;
pub mod spotify;
pub mod telemetry;
pub mod types;

/// A convenient Result type alias for operations that may fail.
///
/// Boxed dynamic error with `Send + Sync` bounds so it can cross task
/// boundaries in async contexts.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// Accepts the same arguments as `println!`.
///
/// # Example
///
/// ```
/// info!("Serving on {}", addr);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Wrote {} rows", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only for fatal errors where recovery is not possible; the process exits
/// with code 1 right after printing.
///
/// # Example
///
/// ```
/// error!("Missing required environment variable: {}", var_name);
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// # Example
///
/// ```
/// warning!("Failed to open browser, open {} manually", url);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
