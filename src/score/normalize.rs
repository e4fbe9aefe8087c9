//! Turns provider leaderboard JSON into [`GolferResult`]s.
//!
//! The provider is loose about numbers: the same field can arrive as `3`,
//! `"+3"`, `"E"` or `{"$numberInt": "3"}`. All of that is handled by
//! [`decode_int`]; everything downstream sees plain `i32`s.

use crate::error::{CoreError, ScoreWarning};
use crate::model::{GolferResult, GolferStatus, OFFICIAL_STATUS, ROUNDS, RoundOutcome, RoundScore};
use serde_json::{Map, Value};
use std::fmt;

const WRAPPED_INT_KEYS: [&str; 3] = ["$numberInt", "$numberLong", "$numberDouble"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    pub raw: String,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot read {} as a score", self.raw)
    }
}

impl std::error::Error for DecodeError {}

impl DecodeError {
    fn new(value: &Value) -> Self {
        Self {
            raw: value.to_string(),
        }
    }
}

/// Decode any known integer encoding. `Ok(None)` means "no value yet".
///
/// # Errors
/// Returns `Err` for shapes that are not a known encoding, and for numbers
/// that are fractional or do not fit in an `i32`.
pub fn decode_int(value: &Value) -> Result<Option<i32>, DecodeError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i32::try_from(i).map(Some).map_err(|_| DecodeError::new(value))
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() <= f64::from(i32::MAX) => {
                        #[allow(clippy::cast_possible_truncation)]
                        let v = f as i32;
                        Ok(Some(v))
                    }
                    _ => Err(DecodeError::new(value)),
                }
            }
        }
        Value::String(s) => decode_int_str(s).map_err(|()| DecodeError::new(value)),
        Value::Object(map) => {
            let inner = WRAPPED_INT_KEYS
                .iter()
                .find_map(|key| map.get(*key))
                .filter(|_| map.len() == 1)
                .ok_or_else(|| DecodeError::new(value))?;
            match inner {
                Value::String(_) | Value::Number(_) => decode_int(inner),
                _ => Err(DecodeError::new(value)),
            }
        }
        Value::Bool(_) | Value::Array(_) => Err(DecodeError::new(value)),
    }
}

fn decode_int_str(s: &str) -> Result<Option<i32>, ()> {
    let s = s.trim();
    match s {
        "" | "-" | "--" => return Ok(None),
        "E" | "e" => return Ok(Some(0)),
        _ => {}
    }
    let unsigned = s.strip_prefix('+').unwrap_or(s);
    if let Ok(v) = unsigned.parse::<i32>() {
        return Ok(Some(v));
    }
    // "$numberDouble" payloads look like "5.0"
    match unsigned.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && f.abs() <= f64::from(i32::MAX) => {
            #[allow(clippy::cast_possible_truncation)]
            let v = f as i32;
            Ok(Some(v))
        }
        _ => Err(()),
    }
}

/// Read an identifier that may be a string, a number or a wrapped number.
#[must_use]
pub fn decode_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => WRAPPED_INT_KEYS
            .iter()
            .find_map(|key| map.get(*key))
            .and_then(decode_text),
        _ => None,
    }
}

/// Deterministic fingerprint of a raw leaderboard. `serde_json` keeps object
/// keys sorted, so key order in the payload does not change the hash.
#[must_use]
pub fn data_hash(raw: &Value) -> String {
    sha256::digest(raw.to_string())
}

#[derive(Debug, Clone)]
pub struct NormalizedGolfer {
    pub result: GolferResult,
    pub warnings: Vec<ScoreWarning>,
}

#[derive(Debug, Clone, Default)]
pub struct NormalizedLeaderboard {
    pub golfers: Vec<GolferResult>,
    pub round_id: Option<u8>,
    pub status: Option<String>,
    pub warnings: Vec<ScoreWarning>,
}

impl NormalizedLeaderboard {
    #[must_use]
    pub fn is_official_complete(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case(OFFICIAL_STATUS))
    }

    /// Index of a golfer by provider id or by full name, ignoring case.
    #[must_use]
    pub fn position(&self, ident: &str) -> Option<usize> {
        let ident = ident.trim();
        self.golfers
            .iter()
            .position(|g| g.player_id.as_deref() == Some(ident))
            .or_else(|| {
                self.golfers
                    .iter()
                    .position(|g| g.name.eq_ignore_ascii_case(ident))
            })
    }

    #[must_use]
    pub fn find(&self, ident: &str) -> Option<&GolferResult> {
        self.position(ident).and_then(|idx| self.golfers.get(idx))
    }
}

fn round_number(value: &Value) -> Result<u8, DecodeError> {
    match decode_int(value)? {
        Some(r) if (1..=ROUNDS as i32).contains(&r) => {
            u8::try_from(r).map_err(|_| DecodeError::new(value))
        }
        _ => Err(DecodeError::new(value)),
    }
}

fn golfer_name(row: &Map<String, Value>) -> String {
    let first = row.get("firstName").and_then(decode_text).unwrap_or_default();
    let last = row.get("lastName").and_then(decode_text).unwrap_or_default();
    let full = format!("{first} {last}").trim().to_string();
    if full.is_empty() {
        row.get("playerId")
            .and_then(decode_text)
            .unwrap_or_else(|| "unknown".to_string())
    } else {
        full
    }
}

fn round_in_progress(row: &Map<String, Value>) -> bool {
    match row.get("roundComplete") {
        Some(Value::Bool(done)) => !done,
        _ => !matches!(
            row.get("thru").and_then(decode_text).as_deref(),
            Some("F" | "18")
        ),
    }
}

/// Score of one `rounds[]` entry: `scoreToPar`, else `strokes - par`.
fn round_entry_value(entry: &Value, par: i32) -> Result<Option<i32>, DecodeError> {
    if let Some(to_par) = entry.get("scoreToPar").filter(|v| !v.is_null()) {
        return decode_int(to_par);
    }
    match entry.get("strokes") {
        Some(strokes) => match decode_int(strokes)? {
            Some(s) => s
                .checked_sub(par)
                .map(Some)
                .ok_or_else(|| DecodeError::new(strokes)),
            None => Ok(None),
        },
        None => Ok(None),
    }
}

/// Normalize one leaderboard row. Never fails: anything unreadable becomes
/// an absent round plus a warning.
#[must_use]
pub fn normalize_golfer(row: &Map<String, Value>, par: i32) -> NormalizedGolfer {
    normalize_row(row, par, false)
}

// Nothing is live on a finished leaderboard, whatever the row says.
fn normalize_row(row: &Map<String, Value>, par: i32, finished: bool) -> NormalizedGolfer {
    let name = golfer_name(row);
    let player_id = row.get("playerId").and_then(decode_text);
    let status = row
        .get("status")
        .and_then(Value::as_str)
        .map_or(GolferStatus::Active, GolferStatus::from_provider);
    let mut warnings = Vec::new();
    let mut outcomes = [RoundOutcome::Absent; ROUNDS];

    let malformed = |round: Option<u8>, detail: String| ScoreWarning::MalformedRoundData {
        golfer: name.clone(),
        round,
        detail,
    };

    let current_round = match row.get("currentRound").map(round_number) {
        Some(Ok(r)) => Some(r),
        Some(Err(e)) if !row.get("currentRound").is_some_and(Value::is_null) => {
            warnings.push(malformed(None, format!("currentRound: {e}")));
            None
        }
        _ => None,
    };
    let live_round = current_round
        .filter(|_| !finished && !status.is_eliminated() && round_in_progress(row));

    if let Some(rounds) = row.get("rounds").and_then(Value::as_array) {
        for entry in rounds {
            let round = match entry.get("roundId").map(round_number) {
                Some(Ok(r)) => r,
                Some(Err(e)) => {
                    warnings.push(malformed(None, format!("roundId: {e}")));
                    continue;
                }
                None => {
                    warnings.push(malformed(None, "round entry without roundId".into()));
                    continue;
                }
            };
            let idx = usize::from(round) - 1;
            match round_entry_value(entry, par) {
                Ok(Some(v)) if live_round == Some(round) => outcomes[idx] = RoundOutcome::Live(v),
                Ok(Some(v)) => outcomes[idx] = RoundOutcome::Observed(v),
                Ok(None) => {}
                Err(e) => warnings.push(malformed(Some(round), e.to_string())),
            }
        }
    }

    if let Some(round) = live_round {
        let idx = usize::from(round) - 1;
        if outcomes[idx] == RoundOutcome::Absent {
            match row.get("currentRoundScore").map(decode_int) {
                Some(Ok(Some(v))) => outcomes[idx] = RoundOutcome::Live(v),
                Some(Err(e)) => warnings.push(malformed(Some(round), e.to_string())),
                _ => {}
            }
        }
    }

    if outcomes
        .iter()
        .filter_map(|o| RoundScore::from(*o).value)
        .try_fold(0i32, i32::checked_add)
        .is_none()
    {
        warnings.push(malformed(None, "round values overflow the golfer total".into()));
    }

    for w in &warnings {
        log::warn!("{w}");
    }

    NormalizedGolfer {
        result: GolferResult::new(
            name.clone(),
            player_id,
            status,
            outcomes.map(RoundScore::from),
        ),
        warnings,
    }
}

/// Normalize a whole leaderboard payload.
///
/// # Errors
/// Returns `CoreError::Parse` when the payload is not an object with a
/// `leaderboardRows` array. Problems inside individual rows are warnings.
pub fn normalize_leaderboard(raw: &Value, par: i32) -> Result<NormalizedLeaderboard, CoreError> {
    let root = raw
        .as_object()
        .ok_or_else(|| CoreError::Parse("leaderboard payload is not an object".into()))?;
    let rows = root
        .get("leaderboardRows")
        .and_then(Value::as_array)
        .ok_or_else(|| CoreError::Parse("leaderboard payload has no leaderboardRows".into()))?;

    let mut board = NormalizedLeaderboard {
        round_id: root
            .get("roundId")
            .and_then(|v| round_number(v).ok()),
        status: root.get("status").and_then(decode_text),
        ..NormalizedLeaderboard::default()
    };

    let finished = board.is_official_complete();
    for (idx, row) in rows.iter().enumerate() {
        let Some(row) = row.as_object() else {
            let warning = ScoreWarning::MalformedRoundData {
                golfer: format!("row {idx}"),
                round: None,
                detail: "leaderboard row is not an object".into(),
            };
            log::warn!("{warning}");
            board.warnings.push(warning);
            continue;
        };
        let golfer = normalize_row(row, par, finished);
        board.golfers.push(golfer.result);
        board.warnings.extend(golfer.warnings);
    }

    Ok(board)
}
