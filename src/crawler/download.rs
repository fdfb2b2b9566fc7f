//! Download sink
//!
//! In download mode every fetched body lands on disk, gzip-compressed,
//! under a name derived from the URL itself. The name is the hex encoding
//! of the URL plus an extension inferred from the Content-Type, so the
//! mapping back to the source URL is mechanical and case changes on a
//! case-insensitive filesystem cannot collide two URLs.

use crate::encode_url;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes fetched bodies into a download directory
pub struct DownloadSink {
    dir: PathBuf,
    /// Hex-encoded URLs already present on disk from earlier runs
    existing: HashSet<String>,
}

impl DownloadSink {
    /// Opens (creating if needed) the download directory and indexes the
    /// files already in it
    pub fn open(dir: &Path) -> std::io::Result<Self> {
        std::fs::create_dir_all(dir)?;

        let mut existing = HashSet::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            // File names are <hex><ext>.gz; the hex prefix is everything
            // before the first dot.
            let hex_part = name.split('.').next().unwrap_or("");
            if !hex_part.is_empty() && hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
                existing.insert(hex_part.to_string());
            }
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            existing,
        })
    }

    /// Returns true if a body for this URL was saved in a previous run
    pub fn already_saved(&self, url: &str) -> bool {
        self.existing.contains(&encode_url(url))
    }

    /// Compresses and writes one body, returning the path written
    pub fn save(&self, url: &str, content_type: &str, body: &[u8]) -> std::io::Result<PathBuf> {
        let name = format!("{}{}.gz", encode_url(url), extension_for(content_type));
        let path = self.dir.join(name);

        let file = std::fs::File::create(&path)?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(body)?;
        encoder.finish()?.sync_all()?;

        debug!(url = %url, path = %path.display(), "body saved");
        Ok(path)
    }
}

/// Maps a Content-Type header to a file extension
///
/// Only the media type matters; parameters like charset are ignored.
/// Unknown types fall back to `.bin`.
pub fn extension_for(content_type: &str) -> &'static str {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    match media_type.as_str() {
        "text/html" | "application/xhtml+xml" => ".html",
        "text/plain" => ".txt",
        "text/css" => ".css",
        "text/csv" => ".csv",
        "text/xml" | "application/xml" => ".xml",
        "application/json" => ".json",
        "application/javascript" | "text/javascript" => ".js",
        "application/pdf" => ".pdf",
        "image/png" => ".png",
        "image/jpeg" => ".jpg",
        "image/gif" => ".gif",
        "image/svg+xml" => ".svg",
        "" => ".bin",
        _ => ".bin",
    }
}
