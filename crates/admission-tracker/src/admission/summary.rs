use serde::{Deserialize, Serialize};

use super::domain::{ChanceBand, PositionResult, PositionSnapshot};

/// Aggregate over the latest snapshot of every tracked program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Programs registered, tracked or not.
    pub programs: usize,
    /// Programs with at least one snapshot.
    pub tracked: usize,
    /// Mean chance across tracked programs, 0 when nothing is tracked.
    pub average_chance: f64,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl PortfolioSummary {
    pub fn from_latest<'a, I>(programs: usize, latest: I) -> Self
    where
        I: IntoIterator<Item = &'a PositionResult>,
    {
        let mut summary = Self {
            programs,
            tracked: 0,
            average_chance: 0.0,
            high: 0,
            medium: 0,
            low: 0,
        };
        let mut total: u64 = 0;

        for result in latest {
            summary.tracked += 1;
            total += u64::from(result.admission_chance);
            match result.band() {
                ChanceBand::High => summary.high += 1,
                ChanceBand::Medium => summary.medium += 1,
                ChanceBand::Low => summary.low += 1,
            }
        }

        if summary.tracked > 0 {
            summary.average_chance = total as f64 / summary.tracked as f64;
        }
        summary
    }

    pub fn count_for(&self, band: ChanceBand) -> usize {
        match band {
            ChanceBand::High => self.high,
            ChanceBand::Medium => self.medium,
            ChanceBand::Low => self.low,
        }
    }
}

/// Percentage-point change between the two most recent snapshots.
pub fn chance_change(history: &[PositionSnapshot]) -> Option<i16> {
    match history {
        [.., previous, latest] => Some(
            i16::from(latest.result.admission_chance) - i16::from(previous.result.admission_chance),
        ),
        _ => None,
    }
}
