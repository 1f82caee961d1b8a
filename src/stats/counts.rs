use serde::{Deserialize, Serialize};

use crate::config::HistoricalOffsets;
use crate::db::Database;
use crate::error::{StatsError, StatsResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CountTotals {
    pub chat_count: u64,
    /// Stored voices plus `HistoricalOffsets::extra_voice_count`.
    pub voice_count: u64,
    /// Stored duration plus `HistoricalOffsets::extra_duration`, seconds.
    pub duration: u64,
}

#[derive(Clone)]
pub struct CountAggregator {
    db: Database,
    offsets: HistoricalOffsets,
}

impl CountAggregator {
    pub fn new(db: Database, offsets: HistoricalOffsets) -> Self {
        Self { db, offsets }
    }

    pub async fn aggregate(&self) -> StatsResult<CountTotals> {
        let (chats, voices, duration) = tokio::try_join!(
            async {
                self.db
                    .count_chats()
                    .await
                    .map_err(|err| StatsError::aggregation("chat count", err))
            },
            async {
                self.db
                    .count_voices()
                    .await
                    .map_err(|err| StatsError::aggregation("voice count", err))
            },
            async {
                self.db
                    .sum_voice_duration()
                    .await
                    .map_err(|err| StatsError::aggregation("voice duration", err))
            },
        )?;

        Ok(apply_offsets(chats, voices, duration, self.offsets))
    }
}

pub fn apply_offsets(
    chats: u64,
    voices: u64,
    duration: u64,
    offsets: HistoricalOffsets,
) -> CountTotals {
    CountTotals {
        chat_count: chats,
        voice_count: voices.saturating_add(offsets.extra_voice_count),
        duration: duration.saturating_add(offsets.extra_duration),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chats_carry_no_historical_offset() {
        let offsets = HistoricalOffsets {
            extra_voice_count: 100,
            extra_duration: 1_000,
        };
        let totals = apply_offsets(4, 10, 60, offsets);
        assert_eq!(
            totals,
            CountTotals {
                chat_count: 4,
                voice_count: 110,
                duration: 1_060,
            }
        );
    }
}
