//! Raw export parsing and batch validation.
//!
//! The export is positional, not header-keyed, and is known to repeat its
//! header record partway through a file. Parsing is forgiving (skip junk
//! records, default unparsable numerics to 0); validation is strict and
//! aborts the whole run on the first bad batch.

use std::io::Read;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{MatchResult, MatchRow, TeamColor};

/// Literal value of the color column in the export's header record. A record
/// carrying it is a repeated header, not a row.
pub const HEADER_SENTINEL: &str = "Team Color";

/// Fixed column positions of the export. Additional columns are ignored.
mod col {
    pub const TEAM_COLOR: usize = 0;
    pub const PLAYER_NAME: usize = 1;
    pub const GOALS: usize = 2;
    pub const ASSISTS: usize = 3;
    pub const SAVES: usize = 4;
    pub const SHOTS: usize = 5;
    pub const DEMOS: usize = 6;
    pub const SCORE: usize = 7;
    pub const RESULT: usize = 8;
    pub const TIMESTAMP: usize = 9;
    pub const PLAYER_ID: usize = 10;
}

/// One record as parsed, before validation. Color and result are kept as
/// raw strings so validation can report what was actually in the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRow {
    pub team_color: String,
    pub player_name: String,
    pub goals: i64,
    pub assists: i64,
    pub saves: i64,
    pub shots: i64,
    pub demos: i64,
    pub score: i64,
    pub result: String,
    pub timestamp: String,
    pub player_id: String,
}

fn field(record: &csv::StringRecord, index: usize) -> String {
    record.get(index).unwrap_or("").trim().to_string()
}

fn int_field(record: &csv::StringRecord, index: usize) -> i64 {
    record
        .get(index)
        .unwrap_or("")
        .trim()
        .parse()
        .unwrap_or(0)
}

/// Parse one record into a `RawRow`, or `None` if the record is a repeated
/// header or is missing a required field. Skipped records are not errors.
pub fn parse_record(record: &csv::StringRecord) -> Option<RawRow> {
    let team_color = field(record, col::TEAM_COLOR);
    if team_color == HEADER_SENTINEL {
        return None;
    }

    let player_name = field(record, col::PLAYER_NAME);
    let result = field(record, col::RESULT);
    if player_name.is_empty() || team_color.is_empty() || result.is_empty() {
        return None;
    }

    Some(RawRow {
        team_color,
        player_name,
        goals: int_field(record, col::GOALS),
        assists: int_field(record, col::ASSISTS),
        saves: int_field(record, col::SAVES),
        shots: int_field(record, col::SHOTS),
        demos: int_field(record, col::DEMOS),
        score: int_field(record, col::SCORE),
        result,
        timestamp: field(record, col::TIMESTAMP),
        player_id: field(record, col::PLAYER_ID),
    })
}

/// Parse the whole export. Junk records are skipped; a read failure is a
/// run-level error.
pub fn parse_export<R: Read>(input: R) -> Result<Vec<RawRow>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        let record = record?;
        match parse_record(&record) {
            Some(row) => rows.push(row),
            None => skipped += 1,
        }
    }

    debug!("Parsed {} rows ({} records skipped)", rows.len(), skipped);
    Ok(rows)
}

/// Batched validation pass. Returns the typed rows plus every problem found;
/// a non-empty problem list means the caller must abort before persistence.
pub fn validate(rows: &[RawRow]) -> (Vec<MatchRow>, Vec<String>) {
    let mut valid = Vec::with_capacity(rows.len());
    let mut errors = Vec::new();

    for (index, raw) in rows.iter().enumerate() {
        let line = index + 1;
        let mut row_errors = 0usize;

        let team_color = match TeamColor::parse(&raw.team_color) {
            Some(color) => Some(color),
            None => {
                errors.push(format!(
                    "row {}: unrecognized team color '{}'",
                    line, raw.team_color
                ));
                row_errors += 1;
                None
            }
        };

        let result = match MatchResult::parse(&raw.result) {
            Some(result) => Some(result),
            None => {
                errors.push(format!(
                    "row {}: unrecognized result '{}' (expected Win or Loss)",
                    line, raw.result
                ));
                row_errors += 1;
                None
            }
        };

        let mut counting = [0u32; 5];
        for (slot, (name, value)) in counting.iter_mut().zip([
            ("goals", raw.goals),
            ("assists", raw.assists),
            ("saves", raw.saves),
            ("shots", raw.shots),
            ("demos", raw.demos),
        ]) {
            match u32::try_from(value) {
                Ok(converted) => *slot = converted,
                Err(_) if value < 0 => {
                    errors.push(format!("row {}: negative {} ({})", line, name, value));
                    row_errors += 1;
                }
                Err(_) => {
                    errors.push(format!("row {}: {} out of range ({})", line, name, value));
                    row_errors += 1;
                }
            }
        }

        if row_errors > 0 {
            continue;
        }

        let [goals, assists, saves, shots, demos] = counting;
        valid.push(MatchRow {
            player_name: raw.player_name.clone(),
            player_id: raw.player_id.clone(),
            team_color: team_color.unwrap(),
            goals,
            assists,
            saves,
            shots,
            demos,
            score: raw.score,
            result: result.unwrap(),
            timestamp: raw.timestamp.clone(),
        });
    }

    (valid, errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[&str]) -> csv::StringRecord {
        csv::StringRecord::from(fields.to_vec())
    }

    fn good_fields() -> Vec<&'static str> {
        vec![
            "Orange",
            "Calyx",
            "2",
            "1",
            "0",
            "5",
            "1",
            "390",
            "Win",
            "2025-08-12 21:04",
            "7601",
        ]
    }

    #[test]
    fn test_parse_record_ok() {
        let row = parse_record(&record(&good_fields())).unwrap();
        assert_eq!(row.player_name, "Calyx");
        assert_eq!(row.goals, 2);
        assert_eq!(row.score, 390);
        assert_eq!(row.timestamp, "2025-08-12 21:04");
        assert_eq!(row.player_id, "7601");
    }

    #[test]
    fn test_parse_record_skips_repeated_header() {
        let mut fields = good_fields();
        fields[0] = HEADER_SENTINEL;
        assert!(parse_record(&record(&fields)).is_none());
    }

    #[test]
    fn test_parse_record_skips_empty_required_fields() {
        for index in [0usize, 1, 8] {
            let mut fields = good_fields();
            fields[index] = "   ";
            assert!(parse_record(&record(&fields)).is_none());
        }
    }

    #[test]
    fn test_parse_record_defaults_bad_numerics_to_zero() {
        let mut fields = good_fields();
        fields[2] = "two";
        fields[7] = "";
        let row = parse_record(&record(&fields)).unwrap();
        assert_eq!(row.goals, 0);
        assert_eq!(row.score, 0);
    }

    #[test]
    fn test_parse_record_ignores_extra_columns() {
        let mut fields = good_fields();
        fields.push("extra");
        fields.push("columns");
        assert!(parse_record(&record(&fields)).is_some());
    }

    #[test]
    fn test_parse_export_mixed_file() {
        // Header appears twice; both copies must be skipped silently.
        let data = "\
Team Color,Player,Goals,Assists,Saves,Shots,Demos,Score,Result,Timestamp,Id
Orange,Calyx,2,1,0,5,1,390,Win,2025-08-12 21:04,7601
Team Color,Player,Goals,Assists,Saves,Shots,Demos,Score,Result,Timestamp,Id
Blue,Vex,1,0,3,2,0,200,Loss,2025-08-12 21:04,7602
";
        let rows = parse_export(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].player_name, "Calyx");
        assert_eq!(rows[1].player_name, "Vex");
    }

    #[test]
    fn test_validate_all_good() {
        let rows = vec![parse_record(&record(&good_fields())).unwrap()];
        let (valid, errors) = validate(&rows);
        assert!(errors.is_empty());
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].team_color, TeamColor::Orange);
        assert_eq!(valid[0].result, MatchResult::Win);
    }

    #[test]
    fn test_validate_bad_color_and_result() {
        let mut raw = parse_record(&record(&good_fields())).unwrap();
        raw.team_color = "Green".to_string();
        raw.result = "Draw".to_string();

        let (valid, errors) = validate(&[raw]);
        assert!(valid.is_empty());
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("Green"));
        assert!(errors[1].contains("Draw"));
    }

    #[test]
    fn test_validate_result_case_insensitive() {
        let mut raw = parse_record(&record(&good_fields())).unwrap();
        raw.result = "wIn".to_string();
        let (valid, errors) = validate(&[raw]);
        assert!(errors.is_empty());
        assert_eq!(valid[0].result, MatchResult::Win);
    }

    #[test]
    fn test_validate_negative_stat() {
        let mut raw = parse_record(&record(&good_fields())).unwrap();
        raw.saves = -1;
        let (valid, errors) = validate(&[raw]);
        assert!(valid.is_empty());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("negative saves"));
    }

    #[test]
    fn test_validate_oversized_stat_rejected() {
        // A stat above u32 range must be reported, never wrapped down.
        let mut raw = parse_record(&record(&good_fields())).unwrap();
        raw.demos = i64::from(u32::MAX) + 1;
        let (valid, errors) = validate(&[raw]);
        assert!(valid.is_empty());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("demos out of range"));
    }

    #[test]
    fn test_validate_negative_score_allowed() {
        // Score is only a tie-break key, not a counting stat.
        let mut raw = parse_record(&record(&good_fields())).unwrap();
        raw.score = -10;
        let (valid, errors) = validate(&[raw]);
        assert!(errors.is_empty());
        assert_eq!(valid[0].score, -10);
    }
}
