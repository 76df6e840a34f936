use std::{
    fmt,
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::output::projector::ProjectedRows;

pub const TRACKS_FILE: &str = "top_tracks_by_country.csv";
pub const ARTISTS_FILE: &str = "top_artists_by_country.csv";
pub const GENRES_FILE: &str = "top_genres_by_country.csv";

const TRACK_HEADERS: [&str; 4] = ["country", "track", "artist", "popularity"];
const ARTIST_HEADERS: [&str; 3] = ["country", "artist", "popularity"];
const GENRE_HEADERS: [&str; 3] = ["country", "genre", "popularity"];

#[derive(Debug)]
pub enum ReportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::Io(e) => write!(f, "io error: {}", e),
            ReportError::Csv(e) => write!(f, "csv error: {}", e),
        }
    }
}

impl std::error::Error for ReportError {}

impl From<std::io::Error> for ReportError {
    fn from(err: std::io::Error) -> Self {
        ReportError::Io(err)
    }
}

impl From<csv::Error> for ReportError {
    fn from(err: csv::Error) -> Self {
        ReportError::Csv(err)
    }
}

/// Writes the per-kind CSV reports into one directory.
///
/// Every write replaces the previous file; nothing is appended.
#[derive(Debug, Clone)]
pub struct CsvReportWriter {
    dir: PathBuf,
}

impl CsvReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes all three reports and returns the written paths.
    pub async fn write_all(&self, rows: &ProjectedRows) -> Result<Vec<PathBuf>, ReportError> {
        async_fs::create_dir_all(&self.dir).await?;

        let written = vec![
            self.write_file(TRACKS_FILE, &TRACK_HEADERS, &rows.tracks).await?,
            self.write_file(ARTISTS_FILE, &ARTIST_HEADERS, &rows.artists).await?,
            self.write_file(GENRES_FILE, &GENRE_HEADERS, &rows.genres).await?,
        ];

        Ok(written)
    }

    async fn write_file<T: Serialize>(
        &self,
        file_name: &str,
        headers: &[&str],
        rows: &[T],
    ) -> Result<PathBuf, ReportError> {
        let path = self.dir.join(file_name);
        let bytes = encode(headers, rows)?;
        async_fs::write(&path, bytes).await?;
        tracing::info!(path = %path.display(), rows = rows.len(), "report written");
        Ok(path)
    }
}

/// Encodes rows as CSV. The header line is written even when `rows` is empty.
pub fn encode<T: Serialize>(headers: &[&str], rows: &[T]) -> Result<Vec<u8>, ReportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(headers)?;
    for row in rows {
        writer.serialize(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| ReportError::Io(e.into_error()))
}
