use std::cmp::Ordering;

use tracing::warn;

use super::domain::{AdmissionEntry, PositionResult};
use super::rules::CompetitionRules;

/// Rank `participant_id` within `entries` under the default competition rules.
///
/// Returns `None` when the participant has no competing row in the list.
pub fn calculate_position(
    entries: &[AdmissionEntry],
    participant_id: &str,
    budget_seats: u32,
) -> Option<PositionResult> {
    calculate_position_with(&CompetitionRules::default(), entries, participant_id, budget_seats)
}

pub fn calculate_position_with(
    rules: &CompetitionRules,
    entries: &[AdmissionEntry],
    participant_id: &str,
    budget_seats: u32,
) -> Option<PositionResult> {
    let competing: Vec<&AdmissionEntry> = entries
        .iter()
        .filter(|entry| rules.is_competing(&entry.status))
        .collect();

    let target_index = competing
        .iter()
        .position(|entry| entry.participant_id == participant_id)?;

    let duplicates = competing
        .iter()
        .filter(|entry| entry.participant_id == participant_id)
        .count();
    if duplicates > 1 {
        warn!(
            participant_id,
            rows = duplicates,
            "participant appears more than once in the list; ranking the first row"
        );
    }

    // Ranked rows keep their index into `competing` so the target is found by
    // identity rather than by id.
    let ranked: Vec<(usize, &AdmissionEntry)> = competing
        .iter()
        .enumerate()
        .filter(|(index, entry)| *index == target_index || rules.has_consent(entry))
        .map(|(index, entry)| (index, *entry))
        .collect();

    let mut by_score = ranked.clone();
    by_score.sort_by(|(_, a), (_, b)| descending_score(a, b));
    let general_position = rank_of(&by_score, target_index);

    let mut by_priority = ranked.clone();
    by_priority.sort_by_key(|(_, entry)| entry.priority);
    let priority_position = rank_of(&by_priority, target_index);

    Some(PositionResult {
        general_position,
        priority_position,
        admission_chance: admission_chance(budget_seats, general_position, priority_position),
        total_participants: competing.len(),
        participants_with_consent: ranked.len(),
    })
}

/// Heuristic chance in percent: seats over the mean of both ranks, saturated.
pub fn admission_chance(budget_seats: u32, general_position: usize, priority_position: usize) -> u8 {
    let average_position = (general_position + priority_position) as f64 / 2.0;
    if average_position <= 0.0 {
        return 0;
    }

    let chance = (f64::from(budget_seats) / average_position * 100.0).round();
    chance.clamp(0.0, 100.0) as u8
}

fn descending_score(a: &AdmissionEntry, b: &AdmissionEntry) -> Ordering {
    b.total_score
        .partial_cmp(&a.total_score)
        .unwrap_or(Ordering::Equal)
}

fn rank_of(sorted: &[(usize, &AdmissionEntry)], target_index: usize) -> usize {
    sorted
        .iter()
        .position(|(index, _)| *index == target_index)
        .map(|position| position + 1)
        .unwrap_or(sorted.len())
}
