pub mod chunked;

pub use chunked::{ChunkReport, ChunkedCsvWriter, OutputConfig};
