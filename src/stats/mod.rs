pub mod buckets;
pub mod counts;
pub mod log_reader;
pub mod pipeline;
pub mod snapshot;
pub mod words;

pub use buckets::{fill_buckets, TimeBucketAggregator, DEFAULT_WINDOW_DAYS};
pub use counts::{CountAggregator, CountTotals};
pub use log_reader::{read_response_times, ResponseTimeReport};
pub use pipeline::StatsPipeline;
pub use snapshot::{SnapshotWriter, StatsReader, MESSAGE_STATS_THRESHOLD, TOP_WORDS_LIMIT};
pub use words::{tokenize, WordCounter, WordFrequencyIndexer, WordIndexReport};
