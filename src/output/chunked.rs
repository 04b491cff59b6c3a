//! Size-bounded CSV output.
//!
//! Records are written in row chunks to `{base}_{n}.csv`. When a finished
//! file is over the byte limit, later chunks get fewer rows. Files already
//! on disk are never rewritten, so a single file can still end up over the
//! limit.

use crate::scrapers::error::CrawlResult;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize)]
pub struct OutputConfig {
    /// Directory the CSV files are written into
    pub dir: PathBuf,
    /// Rows in the first chunk
    pub initial_chunk_rows: usize,
    /// Size above which later chunks shrink
    pub max_file_bytes: u64,
    /// Factor applied to the chunk size after an oversized file
    pub shrink_factor: f64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            initial_chunk_rows: 10_000,
            max_file_bytes: 20 * 1024 * 1024,
            shrink_factor: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenChunk {
    pub path: PathBuf,
    pub rows: usize,
    pub bytes: u64,
}

/// Files produced for one record set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkReport {
    pub base: String,
    pub files: Vec<WrittenChunk>,
}

impl ChunkReport {
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn rows(&self) -> usize {
        self.files.iter().map(|f| f.rows).sum()
    }
}

pub struct ChunkedCsvWriter<'a> {
    config: &'a OutputConfig,
}

impl<'a> ChunkedCsvWriter<'a> {
    pub fn new(config: &'a OutputConfig) -> Self {
        Self { config }
    }

    /// Write `records` to `{dir}/{base}_1.csv`, `{base}_2.csv`, ...
    ///
    /// An empty slice writes nothing.
    pub fn write<T: Serialize>(&self, base: &str, records: &[T]) -> CrawlResult<ChunkReport> {
        let mut report = ChunkReport {
            base: base.to_string(),
            files: Vec::new(),
        };
        if records.is_empty() {
            return Ok(report);
        }

        fs::create_dir_all(&self.config.dir)?;

        let mut chunk_rows = self.config.initial_chunk_rows.max(1);
        let mut offset: usize = 0;

        loop {
            let end = offset.saturating_add(chunk_rows).min(records.len());
            let chunk = &records[offset..end];
            if chunk.is_empty() {
                break;
            }

            let path = self.config.dir.join(format!("{base}_{}.csv", report.files.len() + 1));
            let bytes = write_chunk(&path, chunk)?;
            debug!("Wrote {} rows ({} bytes) to {}", chunk.len(), bytes, path.display());

            if bytes > self.config.max_file_bytes {
                let next = shrink(chunk_rows, self.config.shrink_factor);
                info!(
                    "{} is {} bytes, over the {} byte limit; next chunks hold {} rows",
                    path.display(),
                    bytes,
                    self.config.max_file_bytes,
                    next
                );
                chunk_rows = next;
            }

            report.files.push(WrittenChunk {
                path,
                rows: chunk.len(),
                bytes,
            });
            offset = end;
        }

        info!("Saved data to {} file(s) '{}_*.csv'", report.file_count(), base);
        Ok(report)
    }
}

/// Next chunk size after an oversized file; never below one row
pub fn shrink(rows: usize, factor: f64) -> usize {
    ((rows as f64 * factor).floor() as usize).max(1)
}

fn write_chunk<T: Serialize>(path: &Path, rows: &[T]) -> CrawlResult<u64> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    drop(writer);

    Ok(fs::metadata(path)?.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListingRecord;

    fn records(n: usize) -> Vec<ListingRecord> {
        (0..n)
            .map(|i| ListingRecord {
                title: format!("Game {i}"),
                release_date: "Jan 1, 2000".to_string(),
                rating: "E".to_string(),
                description: "A game, with \"quotes\".".to_string(),
                metascore: "80".to_string(),
                link: format!("https://www.metacritic.com/game/{i}/"),
            })
            .collect()
    }

    fn config(dir: &Path, initial_chunk_rows: usize, max_file_bytes: u64) -> OutputConfig {
        OutputConfig {
            dir: dir.to_path_buf(),
            initial_chunk_rows,
            max_file_bytes,
            shrink_factor: 0.8,
        }
    }

    fn read_rows(path: &Path) -> Vec<ListingRecord> {
        csv::Reader::from_path(path)
            .unwrap()
            .deserialize()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn splits_into_fixed_chunks_under_the_limit() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), 10_000, u64::MAX);
        let data = records(25_000);
        let report = ChunkedCsvWriter::new(&config).write("listings", &data).unwrap();

        let rows: Vec<_> = report.files.iter().map(|f| f.rows).collect();
        assert_eq!(rows, [10_000, 10_000, 5_000]);
        assert_eq!(report.files[2].path, dir.path().join("listings_3.csv"));
        assert!(!dir.path().join("listings_4.csv").exists());

        let last = read_rows(&report.files[2].path);
        assert_eq!(last.len(), 5_000);
        assert_eq!(last[0], data[20_000]);
        assert_eq!(last[4_999], data[24_999]);
    }

    #[test]
    fn header_uses_display_names() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), 10, u64::MAX);
        ChunkedCsvWriter::new(&config).write("listings", &records(1)).unwrap();

        let text = fs::read_to_string(dir.path().join("listings_1.csv")).unwrap();
        assert_eq!(
            text.lines().next().unwrap(),
            "Title,Release Date,Rating,Description,Metascore,Link"
        );
    }

    #[test]
    fn oversized_files_shrink_later_chunks_only() {
        let dir = tempfile::tempdir().unwrap();
        // Every file is over the limit, so each chunk is smaller than the last.
        let config = config(dir.path(), 100, 1);
        let data = records(400);
        let report = ChunkedCsvWriter::new(&config).write("reviews", &data).unwrap();

        let rows: Vec<_> = report.files.iter().map(|f| f.rows).collect();
        assert_eq!(&rows[..4], [100, 80, 64, 51]);
        assert!(rows.windows(2).take_while(|w| w[0] > 1).all(|w| w[1] < w[0]));
        assert_eq!(report.rows(), 400);

        // Earlier files keep their original contents.
        let first = read_rows(&report.files[0].path);
        assert_eq!(first.len(), 100);
        assert_eq!(first[99], data[99]);
        assert_eq!(read_rows(&report.files[1].path)[0], data[100]);
    }

    #[test]
    fn huge_chunk_size_writes_a_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), usize::MAX, u64::MAX);
        let report = ChunkedCsvWriter::new(&config).write("listings", &records(2)).unwrap();

        assert_eq!(report.file_count(), 1);
        assert_eq!(report.files[0].rows, 2);
    }

    #[test]
    fn empty_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), 10, u64::MAX);
        let report = ChunkedCsvWriter::new(&config)
            .write::<ListingRecord>("listings", &[])
            .unwrap();

        assert_eq!(report.file_count(), 0);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn shrink_floors_and_never_reaches_zero() {
        assert_eq!(shrink(10_000, 0.8), 8_000);
        assert_eq!(shrink(51, 0.8), 40);
        assert_eq!(shrink(1, 0.8), 1);
    }
}
