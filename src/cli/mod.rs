//! # CLI Module
//!
//! Command implementations behind the `sportop` binary.
//!
//! ## Commands
//!
//! - [`serve`] - Starts the web server (OAuth flow + `/top-data`) and the
//!   separate Prometheus metrics server.
//! - [`fetch`] - Runs a single aggregation with an existing access token,
//!   prints the rows as tables and writes the CSV reports.
//!
//! ## Usage Patterns
//!
//! ```bash
//! sportop serve --open                       # authorize in the browser, then /top-data
//! sportop fetch --token BQC... --country US  # one-off fetch from the terminal
//! sportop fetch --kind track --no-write      # only tracks, print without writing
//! ```
//!
//! Output uses the crate's console macros (`info!`, `success!`, `warning!`,
//! `error!`); diagnostics from the pipeline go through `tracing`.

mod fetch;
mod serve;

pub use fetch::fetch;
pub use serve::serve;
