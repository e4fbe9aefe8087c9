use serde_json::Value;

use super::aggregate::compute_team_scores;
use super::normalize::data_hash;
use crate::clock::Clock;
use crate::error::{CoreError, ScoreWarning};
use crate::model::{CalculationSnapshot, SnapshotResponse, StoredScores, Tournament};
use crate::storage::SnapshotStore;

#[derive(Clone, Copy)]
pub struct Deps<'a> {
    pub store: &'a dyn SnapshotStore,
    pub clock: &'a dyn Clock,
}

/// Read the stored snapshot for a tournament. Never computes anything.
///
/// # Errors
/// Returns `CoreError::Persistence` if the store cannot be read.
pub async fn get_stored_scores(
    store: &dyn SnapshotStore,
    tournament_id: &str,
) -> Result<StoredScores, CoreError> {
    match store.load_snapshot(tournament_id).await? {
        Some(snapshot) => Ok(StoredScores::Found { snapshot }),
        None => Ok(StoredScores::NoStoredScores {
            tournament_id: tournament_id.to_string(),
        }),
    }
}

/// Serve the stored snapshot when the leaderboard has not changed since it
/// was calculated, otherwise recalculate and replace it.
///
/// Store failures never cost the caller a result: a failed read is treated
/// as "nothing stored" and a failed write still returns the fresh snapshot.
/// Both are reported in [`SnapshotResponse::warnings`].
///
/// # Errors
/// Returns `CoreError::Parse` if the leaderboard cannot be scored at all.
pub async fn get_or_compute_snapshot(
    deps: Deps<'_>,
    tournament: &Tournament,
    raw: &Value,
    force_recalculate: bool,
) -> Result<SnapshotResponse, CoreError> {
    let hash = data_hash(raw);
    let mut warnings = Vec::new();

    if !force_recalculate {
        match deps.store.load_snapshot(&tournament.id).await {
            Ok(Some(stored)) if stored.data_hash == hash => {
                log::info!(
                    "leaderboard for {} unchanged ({}), serving stored scores",
                    tournament.id,
                    &hash[..12.min(hash.len())]
                );
                return Ok(SnapshotResponse {
                    snapshot: stored,
                    from_storage: true,
                    warnings,
                });
            }
            Ok(_) => {}
            Err(e) => {
                log::warn!("could not load stored scores for {}: {e}", tournament.id);
                warnings.push(ScoreWarning::Persistence {
                    detail: e.to_string(),
                });
            }
        }
    }

    log::info!(
        "calculating scores for {} (forced: {force_recalculate})",
        tournament.id
    );
    let computation = compute_team_scores(tournament, raw)?;
    let snapshot = CalculationSnapshot {
        tournament_id: tournament.id.clone(),
        team_scores: computation.team_scores,
        data_hash: hash,
        calculated_at: deps.clock.now(),
        round_id: computation.round_id,
        is_official_complete: computation.is_official_complete,
        warnings: computation.warnings,
    };

    if let Err(e) = deps.store.store_snapshot(&tournament.id, &snapshot).await {
        log::error!("could not store scores for {}: {e}", tournament.id);
        warnings.push(ScoreWarning::Persistence {
            detail: e.to_string(),
        });
    }

    Ok(SnapshotResponse {
        snapshot,
        from_storage: false,
        warnings,
    })
}

/// Score a freshly fetched leaderboard, or fall back to the stored snapshot
/// when the fetch was refused by the rate limiter or the provider was
/// unreachable.
///
/// # Errors
/// Returns the fetch error when there is nothing stored to fall back on, and
/// any error from [`get_or_compute_snapshot`] otherwise.
pub async fn snapshot_or_stored(
    deps: Deps<'_>,
    tournament: &Tournament,
    fetched: Result<Value, CoreError>,
    force_recalculate: bool,
) -> Result<SnapshotResponse, CoreError> {
    let err = match fetched {
        Ok(raw) => {
            return get_or_compute_snapshot(deps, tournament, &raw, force_recalculate).await;
        }
        Err(e) if e.is_rate_limited() || matches!(e, CoreError::Network(_)) => e,
        Err(e) => return Err(e),
    };

    match get_stored_scores(deps.store, &tournament.id).await? {
        StoredScores::Found { snapshot } => {
            log::warn!(
                "no fresh leaderboard for {} ({err}), serving scores from {}; try again later",
                tournament.id,
                snapshot.calculated_at
            );
            Ok(SnapshotResponse {
                snapshot,
                from_storage: true,
                warnings: Vec::new(),
            })
        }
        StoredScores::NoStoredScores { .. } => Err(err),
    }
}
