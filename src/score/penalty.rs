use crate::model::{GolferResult, ROUNDS, RoundScore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenaltySummary {
    pub highest_non_cut_score: i32,
    pub cut_penalty_score: i32,
    /// Number of rounds that received the penalty value.
    pub penalty_strokes_applied: usize,
    pub cut_players_count: usize,
    /// No golfer on the team had a completed round, so the baseline fell
    /// back to 0.
    pub baseline_missing: bool,
}

fn completed_values<'a>(
    golfers: impl Iterator<Item = &'a GolferResult>,
    window: usize,
) -> impl Iterator<Item = i32> {
    golfers.flat_map(move |g| {
        g.rounds
            .iter()
            .take(window)
            .filter_map(RoundScore::completed_value)
    })
}

/// Rounds that count toward the penalty baseline: everything up to the
/// latest round any cut or withdrawn golfer actually played. The baseline is
/// therefore fixed once the cut is made.
#[must_use]
pub fn baseline_window(golfers: &[GolferResult]) -> usize {
    golfers
        .iter()
        .filter(|g| g.status.is_eliminated())
        .filter_map(GolferResult::last_played_round)
        .max()
        .unwrap_or(ROUNDS)
}

/// Worst completed round among golfers still in the tournament, falling back
/// to every golfer's completed rounds when none of them has one.
#[must_use]
pub fn highest_non_cut_score(golfers: &[GolferResult]) -> Option<i32> {
    let window = baseline_window(golfers);
    completed_values(golfers.iter().filter(|g| !g.status.is_eliminated()), window)
        .max()
        .or_else(|| completed_values(golfers.iter(), window).max())
}

/// Fill the missing post-cut rounds of every cut or withdrawn golfer with
/// `highest_non_cut_score + 1`, for rounds up to and including
/// `through_round`. Rounds before a golfer's last played round are left
/// alone even when empty.
pub fn apply_cut_penalties(golfers: &mut [GolferResult], through_round: u8) -> PenaltySummary {
    let baseline = highest_non_cut_score(golfers);
    let highest = baseline.unwrap_or(0);
    let penalty = highest.saturating_add(1);
    let through = usize::from(through_round).min(ROUNDS);

    let mut applied = 0;
    let mut cut_players = 0;
    for golfer in golfers.iter_mut().filter(|g| g.status.is_eliminated()) {
        let first_missing = golfer.last_played_round().unwrap_or(0);
        let mut substituted = 0;
        for round in golfer.rounds.iter_mut().take(through).skip(first_missing) {
            if round.value.is_none() {
                *round = RoundScore::penalty(penalty);
                substituted += 1;
            }
        }
        if substituted > 0 {
            golfer.recompute_total();
            applied += substituted;
            cut_players += 1;
        }
    }

    PenaltySummary {
        highest_non_cut_score: highest,
        cut_penalty_score: penalty,
        penalty_strokes_applied: applied,
        cut_players_count: cut_players,
        baseline_missing: baseline.is_none(),
    }
}
