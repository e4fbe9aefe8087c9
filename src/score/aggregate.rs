use std::collections::{BTreeMap, HashSet};

use serde_json::Value;

use super::normalize::{NormalizedLeaderboard, normalize_leaderboard};
use super::penalty::apply_cut_penalties;
use crate::error::{CoreError, ScoreWarning};
use crate::model::{
    GolferResult, ROUNDS, RoundDetail, ScoreComputation, Team, TeamScoreResult, Tournament,
};

/// Best-`best_of` sum for one round: the lowest values among the golfers
/// that have one. Fewer than `best_of` values are summed as they are.
///
/// # Errors
/// Returns an error if the round sum overflows.
pub fn aggregate_round(
    golfers: &[GolferResult],
    round_idx: usize,
    best_of: usize,
) -> Result<RoundDetail, CoreError> {
    let mut valid: Vec<(i32, bool)> = golfers
        .iter()
        .filter_map(|g| g.rounds.get(round_idx))
        .filter_map(|r| r.value.map(|v| (v, r.is_penalty)))
        .collect();
    // Real scores sort ahead of equal penalty scores.
    valid.sort_unstable();

    let selected = &valid[..valid.len().min(best_of)];
    let score = selected
        .iter()
        .try_fold(0i32, |acc, (v, _)| acc.checked_add(*v))
        .ok_or_else(|| CoreError::Other(format!("round {} sum overflowed", round_idx + 1)))?;

    Ok(RoundDetail {
        score,
        penalty_scores: selected.iter().filter(|(_, penalty)| *penalty).count(),
        valid_scores: valid.len(),
    })
}

struct TeamScore {
    result: TeamScoreResult,
    warnings: Vec<ScoreWarning>,
}

fn roster_warning(
    tournament: &Tournament,
    team: &Team,
    missing: Vec<String>,
    found: usize,
) -> Option<ScoreWarning> {
    let expected = tournament.team_size.max(team.golfers.len());
    (found < expected).then(|| ScoreWarning::IncompleteTeamData {
        team: team.name.clone(),
        expected,
        found,
        missing,
    })
}

fn score_team(
    tournament: &Tournament,
    team: &Team,
    board: &NormalizedLeaderboard,
) -> Result<TeamScore, CoreError> {
    // A golfer can be named by id and by name; duplicates are checked on
    // the resolved leaderboard row.
    let mut seen_rows = HashSet::new();
    let mut seen_missing = HashSet::new();
    let mut players = Vec::with_capacity(team.golfers.len());
    let mut missing = Vec::new();
    for ident in &team.golfers {
        let position = board.position(ident);
        let fresh = match position {
            Some(idx) => seen_rows.insert(idx),
            None => seen_missing.insert(ident.trim().to_lowercase()),
        };
        if !fresh {
            return Err(CoreError::Other(format!(
                "golfer {ident} is listed twice on team {}",
                team.name
            )));
        }
        match position.and_then(|idx| board.golfers.get(idx)) {
            Some(golfer) => players.push(golfer.clone()),
            None => missing.push(ident.clone()),
        }
    }

    let mut warnings = Vec::new();
    if let Some(w) = roster_warning(tournament, team, missing, players.len()) {
        warnings.push(w);
    }

    let through_round = board.round_id.unwrap_or(ROUNDS as u8);
    let penalties = apply_cut_penalties(&mut players, through_round);
    if penalties.baseline_missing && penalties.cut_players_count > 0 {
        warnings.push(ScoreWarning::NoPenaltyBaseline {
            team: team.name.clone(),
        });
    }

    let mut round_details = BTreeMap::new();
    let mut total_score = 0i32;
    let mut valid_rounds = 0;
    for round in 1..=ROUNDS as u8 {
        let detail = aggregate_round(&players, usize::from(round) - 1, tournament.best_of)?;
        if detail.valid_scores > 0 {
            valid_rounds += 1;
        }
        total_score = total_score
            .checked_add(detail.score)
            .ok_or_else(|| CoreError::Other(format!("team {} total overflowed", team.name)))?;
        round_details.insert(round, detail);
    }

    Ok(TeamScore {
        result: TeamScoreResult {
            team_name: team.name.clone(),
            total_score,
            players,
            cut_players_count: penalties.cut_players_count,
            penalty_strokes_applied: penalties.penalty_strokes_applied,
            cut_penalty_score: penalties.cut_penalty_score,
            highest_non_cut_score: penalties.highest_non_cut_score,
            valid_rounds,
            round_details,
        },
        warnings,
    })
}

/// Score every team in `tournament` against an already-normalized board.
/// A team that fails is reported in the warnings and left out; the others
/// are still scored.
#[must_use]
pub fn score_teams(tournament: &Tournament, board: &NormalizedLeaderboard) -> ScoreComputation {
    let mut computation = ScoreComputation {
        team_scores: Vec::with_capacity(tournament.teams.len()),
        round_id: board.round_id,
        is_official_complete: board.is_official_complete(),
        warnings: board.warnings.clone(),
    };

    for team in &tournament.teams {
        match score_team(tournament, team, board) {
            Ok(scored) => {
                for w in &scored.warnings {
                    log::warn!("{w}");
                }
                computation.team_scores.push(scored.result);
                computation.warnings.extend(scored.warnings);
            }
            Err(e) => {
                let warning = ScoreWarning::TeamFailed {
                    team: team.name.clone(),
                    detail: e.to_string(),
                };
                log::error!("{warning}");
                computation.warnings.push(warning);
            }
        }
    }

    computation
}

/// Normalize `raw` and score every team of the tournament.
///
/// # Errors
/// Returns `CoreError::Parse` if the leaderboard payload has no usable shape.
/// Per-golfer and per-team problems are reported as warnings instead.
pub fn compute_team_scores(
    tournament: &Tournament,
    raw: &Value,
) -> Result<ScoreComputation, CoreError> {
    let board = normalize_leaderboard(raw, tournament.par)?;
    Ok(score_teams(tournament, &board))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GolferStatus, RoundScore};

    fn golfer(name: &str, values: &[Option<i32>]) -> GolferResult {
        let mut rounds = [RoundScore::absent(); ROUNDS];
        for (slot, v) in rounds.iter_mut().zip(values) {
            if let Some(v) = v {
                *slot = RoundScore::observed(*v);
            }
        }
        GolferResult::new(name, None, GolferStatus::Active, rounds)
    }

    #[test]
    fn best_three_of_four() -> Result<(), CoreError> {
        let golfers = vec![
            golfer("A", &[Some(2)]),
            golfer("B", &[Some(0)]),
            golfer("C", &[Some(4)]),
            golfer("D", &[Some(-2)]),
        ];
        let detail = aggregate_round(&golfers, 0, 3)?;
        assert_eq!(detail.score, 0);
        assert_eq!(detail.valid_scores, 4);
        assert_eq!(detail.penalty_scores, 0);
        Ok(())
    }

    #[test]
    fn short_round_sums_what_exists() -> Result<(), CoreError> {
        let golfers = vec![golfer("A", &[None, Some(3)]), golfer("B", &[None, Some(-1)])];
        let detail = aggregate_round(&golfers, 1, 3)?;
        assert_eq!(detail.score, 2);
        assert_eq!(detail.valid_scores, 2);
        let empty = aggregate_round(&golfers, 0, 3)?;
        assert_eq!(empty, RoundDetail::default());
        Ok(())
    }

    #[test]
    fn penalty_counts_only_selected_values() -> Result<(), CoreError> {
        let mut golfers = vec![
            golfer("A", &[Some(1)]),
            golfer("B", &[Some(3)]),
            golfer("C", &[Some(0)]),
            golfer("D", &[]),
        ];
        golfers[3].rounds[0] = RoundScore::penalty(3);
        let detail = aggregate_round(&golfers, 0, 3)?;
        // the real 3 wins the tie against the penalty 3
        assert_eq!(detail.score, 4);
        assert_eq!(detail.penalty_scores, 0);

        golfers[1].rounds[0] = RoundScore::observed(5);
        let detail = aggregate_round(&golfers, 0, 3)?;
        assert_eq!(detail.score, 4);
        assert_eq!(detail.penalty_scores, 1);
        Ok(())
    }

    #[test]
    fn overflow_is_an_error() {
        let golfers = vec![golfer("A", &[Some(i32::MAX)]), golfer("B", &[Some(1)])];
        assert!(aggregate_round(&golfers, 0, 3).is_err());
    }

    #[test]
    fn duplicate_roster_entry_fails_only_that_team() {
        let board = NormalizedLeaderboard {
            golfers: vec![golfer("Ann Lee", &[Some(1)]), golfer("Bo Ng", &[Some(2)])],
            round_id: Some(1),
            ..NormalizedLeaderboard::default()
        };
        let tournament = Tournament {
            team_size: 2,
            ..Tournament::new(
                "t",
                vec![
                    Team {
                        name: "Broken".into(),
                        golfers: vec!["Ann Lee".into(), "ann lee".into()],
                    },
                    Team {
                        name: "Fine".into(),
                        golfers: vec!["Bo Ng".into(), "Ann Lee".into()],
                    },
                ],
            )
        };
        let computation = score_teams(&tournament, &board);
        assert_eq!(computation.team_scores.len(), 1);
        assert_eq!(computation.team_scores[0].team_name, "Fine");
        assert_eq!(computation.team_scores[0].total_score, 3);
        assert_eq!(computation.team_scores[0].players[0].name, "Bo Ng");
        assert!(matches!(
            &computation.warnings[..],
            [ScoreWarning::TeamFailed { team, .. }] if team == "Broken"
        ));
    }

    #[test]
    fn missing_golfer_is_reported_and_team_still_scores() {
        let board = NormalizedLeaderboard {
            golfers: vec![golfer("Ann Lee", &[Some(1), Some(2)])],
            round_id: Some(2),
            ..NormalizedLeaderboard::default()
        };
        let tournament = Tournament::new(
            "t",
            vec![Team {
                name: "Solo".into(),
                golfers: vec!["Ann Lee".into(), "Ghost".into()],
            }],
        );
        let computation = score_teams(&tournament, &board);
        let team = &computation.team_scores[0];
        assert_eq!(team.total_score, 3);
        assert_eq!(team.valid_rounds, 2);
        assert_eq!(
            computation.warnings,
            vec![ScoreWarning::IncompleteTeamData {
                team: "Solo".into(),
                expected: 4,
                found: 1,
                missing: vec!["Ghost".into()],
            }]
        );
    }

    #[test]
    fn same_golfer_by_id_and_by_name_fails_the_team() {
        let mut ann = golfer("Ann Lee", &[Some(-5)]);
        ann.player_id = Some("1".into());
        let mut bo = golfer("Bo Ng", &[Some(3)]);
        bo.player_id = Some("2".into());
        let board = NormalizedLeaderboard {
            golfers: vec![ann, bo],
            round_id: Some(1),
            ..NormalizedLeaderboard::default()
        };
        let tournament = Tournament::new(
            "t",
            vec![Team {
                name: "X".into(),
                golfers: vec!["1".into(), "Ann Lee".into(), "2".into()],
            }],
        );
        let computation = score_teams(&tournament, &board);
        assert!(computation.team_scores.is_empty());
        assert!(matches!(
            &computation.warnings[..],
            [ScoreWarning::TeamFailed { team, .. }] if team == "X"
        ));
    }

    #[test]
    fn overflowing_golfer_fails_only_that_team() -> Result<(), CoreError> {
        let raw = serde_json::json!({
            "status": "In Progress",
            "roundId": 2,
            "leaderboardRows": [
                {"playerId": "1", "status": "complete", "roundComplete": true,
                 "rounds": [
                    {"roundId": 1, "scoreToPar": i32::MAX},
                    {"roundId": 2, "scoreToPar": 1}
                 ]},
                {"playerId": "2", "status": "complete", "roundComplete": true,
                 "rounds": [{"roundId": 1, "scoreToPar": -1}]}
            ]
        });
        let tournament = Tournament::new(
            "t",
            vec![
                Team {
                    name: "Huge".into(),
                    golfers: vec!["1".into()],
                },
                Team {
                    name: "Normal".into(),
                    golfers: vec!["2".into()],
                },
            ],
        );
        let computation = compute_team_scores(&tournament, &raw)?;
        assert_eq!(computation.team_scores.len(), 1);
        assert_eq!(computation.team_scores[0].total_score, -1);
        assert!(computation.warnings.iter().any(|w| matches!(
            w,
            ScoreWarning::MalformedRoundData { round: None, .. }
        )));
        assert!(computation.warnings.iter().any(|w| matches!(
            w,
            ScoreWarning::TeamFailed { team, .. } if team == "Huge"
        )));
        Ok(())
    }
}

