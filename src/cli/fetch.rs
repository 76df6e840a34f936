use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    config, error,
    fetch::FanOutAggregator,
    output::{CsvReportWriter, to_rows},
    spotify::SpotifySearch,
    success,
    types::{Country, ResourceKind},
    warning,
};

/// Runs one aggregation from the command line and prints the valid rows.
///
/// Empty `countries` or `kinds` fall back to the configured countries and all
/// three kinds.
pub async fn fetch(
    token: String,
    countries: Vec<Country>,
    kinds: Vec<ResourceKind>,
    write: bool,
) {
    let countries = if countries.is_empty() {
        config::countries()
    } else {
        countries
    };
    let kinds = if kinds.is_empty() {
        ResourceKind::ALL.to_vec()
    } else {
        kinds
    };

    let backoff = match config::backoff_policy() {
        Ok(b) => b,
        Err(e) => error!("Invalid backoff settings. Err: {}", e),
    };
    let deadline = match config::fetch_deadline() {
        Ok(d) => d,
        Err(e) => error!("Invalid deadline setting. Err: {}", e),
    };

    let aggregator = FanOutAggregator::new(Arc::new(SpotifySearch::new(config::spotify_apiurl())))
        .with_kinds(&kinds)
        .with_backoff(backoff)
        .with_deadline(deadline);

    let pb = ProgressBar::new_spinner();
    pb.set_message(format!(
        "Fetching top {} for {} countries...",
        kinds
            .iter()
            .map(|k| k.items_key())
            .collect::<Vec<_>>()
            .join(", "),
        countries.len()
    ));
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    let result = aggregator.aggregate(&countries, &token).await;
    pb.finish_and_clear();

    let rows = to_rows(&result);
    if rows.is_empty() {
        warning!("No valid items returned. Check the token and the upstream logs.");
    }

    if kinds.contains(&ResourceKind::Track) {
        println!("{}", Table::new(&rows.tracks));
    }
    if kinds.contains(&ResourceKind::Artist) {
        println!("{}", Table::new(&rows.artists));
    }
    if kinds.contains(&ResourceKind::Genre) {
        println!("{}", Table::new(&rows.genres));
    }

    if write {
        let writer = CsvReportWriter::new(config::output_dir());
        match writer.write_all(&rows).await {
            Ok(paths) => success!(
                "Wrote {} rows to {} files in {}",
                rows.len(),
                paths.len(),
                writer.dir().display()
            ),
            Err(e) => error!("Failed to write reports. Err: {}", e),
        }
    } else {
        success!("Fetched {} valid rows", rows.len());
    }
}
