use std::collections::HashSet;
use std::{fs, path::PathBuf};

use crate::model::Tournament;

/// # Errors
///
/// Will return `Err` if the file is not readable, is not valid json, or does
/// not describe a usable tournament.
pub fn check_readable_file_and_json(file: &str) -> Result<Tournament, String> {
    let path = PathBuf::from(file);
    if !path.is_file() {
        return Err(format!("The json file '{file}' is not readable."));
    }
    let contents =
        fs::read_to_string(&path).map_err(|e| format!("The json file '{file}': {e}"))?;
    let tournament: Tournament = serde_json::from_str(&contents)
        .map_err(|e| format!("The json file '{file}' is not a tournament: {e}"))?;
    validate_tournament(&tournament)?;
    Ok(tournament)
}

/// Expected shape:
/// `{ "id": "033", "par": 71, "bestOf": 3, "teamSize": 4,
///    "teams": [{ "name": "Alpha", "golfers": ["<playerId or name>", ...] }] }`
///
/// # Errors
///
/// Will return `Err` describing the first problem found.
pub fn validate_tournament(tournament: &Tournament) -> Result<(), String> {
    if tournament.id.trim().is_empty() {
        return Err("The tournament id is empty.".to_string());
    }
    if tournament.best_of == 0 {
        return Err("bestOf must be at least 1.".to_string());
    }
    if tournament.team_size == 0 {
        return Err("teamSize must be at least 1.".to_string());
    }
    if tournament.teams.is_empty() {
        return Err("The tournament has no teams.".to_string());
    }

    let mut names = HashSet::new();
    for team in &tournament.teams {
        if team.name.trim().is_empty() {
            return Err("Every team needs a name.".to_string());
        }
        if !names.insert(team.name.to_lowercase()) {
            return Err(format!("The team name '{}' is used twice.", team.name));
        }
        if team.golfers.is_empty() {
            return Err(format!("The team '{}' has no golfers.", team.name));
        }
    }
    Ok(())
}
