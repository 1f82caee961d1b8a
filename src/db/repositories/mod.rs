mod buckets;
mod chats;
mod message_stats;
mod snapshots;
mod voices;
mod words;

pub use buckets::{BucketSource, DAY_MS};
