use chrono::{DateTime, Utc};

use crate::db::{BucketSource, Database, TimeBucket};
use crate::error::{StatsError, StatsResult};

pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Daily record counts over a trailing window, shared by every
/// `BucketSource`.
#[derive(Clone)]
pub struct TimeBucketAggregator {
    db: Database,
    window_days: u32,
}

impl TimeBucketAggregator {
    pub fn new(db: Database, window_days: u32) -> Self {
        Self { db, window_days }
    }

    pub async fn aggregate(
        &self,
        source: BucketSource,
        now: DateTime<Utc>,
    ) -> StatsResult<Vec<TimeBucket>> {
        let grouped = self
            .db
            .count_by_day_offset(source, now, self.window_days)
            .await
            .map_err(|err| StatsError::aggregation(step_name(source), err))?;
        Ok(fill_buckets(grouped, self.window_days))
    }
}

fn step_name(source: BucketSource) -> &'static str {
    match source {
        BucketSource::Voices => "voice daily buckets",
        BucketSource::Chats => "chat daily buckets",
    }
}

/// Gap-fills grouped `(offset, count)` rows to exactly `window_days` buckets
/// and orders them by descending offset. Offsets outside the window are
/// ignored.
pub fn fill_buckets<I>(grouped: I, window_days: u32) -> Vec<TimeBucket>
where
    I: IntoIterator<Item = (i64, u64)>,
{
    let mut counts = vec![0u64; window_days as usize];
    for (offset, count) in grouped {
        if let Some(slot) = usize::try_from(offset).ok().and_then(|i| counts.get_mut(i)) {
            *slot += count;
        }
    }

    let mut buckets: Vec<TimeBucket> = counts
        .into_iter()
        .enumerate()
        .map(|(offset, count)| TimeBucket {
            day_offset: offset as u32,
            count,
        })
        .collect();
    buckets.reverse();
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_still_fills_the_window() {
        let buckets = fill_buckets(Vec::new(), 30);
        assert_eq!(buckets.len(), 30);
        assert!(buckets.iter().all(|b| b.count == 0));
        assert_eq!(buckets.first().unwrap().day_offset, 29);
        assert_eq!(buckets.last().unwrap().day_offset, 0);
    }

    #[test]
    fn known_offsets_keep_their_counts() {
        let buckets = fill_buckets(vec![(0, 3), (5, 1)], 30);
        for bucket in &buckets {
            let expected = match bucket.day_offset {
                0 => 3,
                5 => 1,
                _ => 0,
            };
            assert_eq!(bucket.count, expected, "offset {}", bucket.day_offset);
        }
    }

    #[test]
    fn output_is_strictly_descending_by_offset() {
        let buckets = fill_buckets(vec![(12, 4), (3, 2), (29, 1)], 30);
        let offsets: Vec<u32> = buckets.iter().map(|b| b.day_offset).collect();
        let expected: Vec<u32> = (0..30).rev().collect();
        assert_eq!(offsets, expected);
    }

    #[test]
    fn out_of_window_rows_are_ignored() {
        let buckets = fill_buckets(vec![(-1, 9), (30, 9), (31, 9), (2, 1)], 30);
        assert_eq!(buckets.len(), 30);
        assert_eq!(buckets.iter().map(|b| b.count).sum::<u64>(), 1);
    }
}
