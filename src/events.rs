//! Agent-state event rows: CSV deserialization and typed parsing.

use std::io::Read;

use anyhow::Result;
use chrono::{NaiveDateTime, TimeDelta};
use serde::Deserialize;

use crate::config::DurationPolicy;
use crate::error::RowError;

pub const NOT_READY: &str = "Not Ready";

const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// One raw row of the agent-state export, before any value is parsed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventRow {
    #[serde(rename = "AGENT", alias = "AGENT ID")]
    pub agent: String,
    #[serde(rename = "STATE")]
    pub state: String,
    #[serde(rename = "REASON CODE", default)]
    pub reason_code: Option<String>,
    #[serde(rename = "DATE")]
    pub date: String,
    #[serde(rename = "TIME")]
    pub time: String,
    #[serde(rename = "AGENT STATE TIME", default)]
    pub agent_state_time: Option<String>,
}

impl EventRow {
    pub fn is_not_ready(&self) -> bool {
        self.state.trim() == NOT_READY
    }

    pub fn reason_code(&self) -> &str {
        self.reason_code.as_deref().map(str::trim).unwrap_or("")
    }
}

/// Reads every row of an agent-state CSV.
///
/// # Errors
///
/// Returns an error if the CSV is structurally invalid or a required column is missing.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<EventRow>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);
    let mut rows = Vec::new();

    for result in rdr.deserialize() {
        let row: EventRow = result?;
        rows.push(row);
    }

    Ok(rows)
}

/// A parsed agent-state event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateEvent {
    pub agent_id: String,
    pub state: String,
    pub reason_code: String,
    pub start: NaiveDateTime,
    pub duration_secs: u64,
    pub end: NaiveDateTime,
}

impl StateEvent {
    /// Parses the timestamp and duration of `row`, applying `policy` to bad durations.
    ///
    /// A duration whose end time falls outside chrono's range counts as malformed.
    pub fn parse(row: &EventRow, policy: DurationPolicy) -> Result<Self, RowError> {
        let start = parse_timestamp(&row.date, &row.time)?;

        let raw_duration = row.agent_state_time.as_deref().unwrap_or("");
        let (duration_secs, end) = match (span(start, raw_duration), policy) {
            (Ok(span), _) => span,
            (Err(_), DurationPolicy::ZeroDefault) => (0, start),
            (Err(e), DurationPolicy::Reject) => return Err(e),
        };

        Ok(Self {
            agent_id: row.agent.trim().to_string(),
            state: row.state.trim().to_string(),
            reason_code: row.reason_code().to_string(),
            start,
            duration_secs,
            end,
        })
    }
}

/// Duration in seconds and the resulting end time.
fn span(start: NaiveDateTime, raw: &str) -> Result<(u64, NaiveDateTime), RowError> {
    let secs = parse_duration(raw)?;
    let end = i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|delta| start.checked_add_signed(delta))
        .ok_or_else(|| RowError::MalformedDuration {
            value: raw.to_string(),
        })?;

    Ok((secs, end))
}

/// Combines `YYYY/MM/DD` and `HH:MM:SS` into a naive timestamp.
pub fn parse_timestamp(date: &str, time: &str) -> Result<NaiveDateTime, RowError> {
    let value = format!("{} {}", date.trim(), time.trim());
    NaiveDateTime::parse_from_str(&value, TIMESTAMP_FORMAT)
        .map_err(|_| RowError::MalformedTimestamp { value })
}

/// Parses an `H:MM:SS` duration into whole seconds.
///
/// Exactly three colon-separated fields of ASCII digits are required.
pub fn parse_duration(value: &str) -> Result<u64, RowError> {
    let malformed = || RowError::MalformedDuration {
        value: value.to_string(),
    };

    let fields: Vec<&str> = value.trim().split(':').collect();
    if fields.len() != 3 {
        return Err(malformed());
    }

    let mut parts = [0u64; 3];
    for (slot, field) in parts.iter_mut().zip(&fields) {
        if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        *slot = field.parse().map_err(|_| malformed())?;
    }

    let [hours, minutes, seconds] = parts;
    hours
        .checked_mul(3600)
        .and_then(|h| h.checked_add(minutes.checked_mul(60)?))
        .and_then(|hm| hm.checked_add(seconds))
        .ok_or_else(malformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: &str, time: &str, duration: Option<&str>) -> EventRow {
        EventRow {
            agent: " 1001 ".to_string(),
            state: "Not Ready".to_string(),
            reason_code: Some(" Lunch ".to_string()),
            date: date.to_string(),
            time: time.to_string(),
            agent_state_time: duration.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_duration_valid() {
        assert_eq!(parse_duration("0:05:00"), Ok(300));
        assert_eq!(parse_duration("1:00:01"), Ok(3601));
        assert_eq!(parse_duration("00:00:00"), Ok(0));
        assert_eq!(parse_duration("123:00:00"), Ok(442_800));
    }

    #[test]
    fn test_parse_duration_rejects_bad_shapes() {
        for bad in ["", "5:00", "1:2:3:4", "a:00:00", "1::00", "-1:00:00", "1:00:0x"] {
            assert!(parse_duration(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_parse_duration_overflow() {
        assert!(parse_duration("99999999999999999999:00:00").is_err());
        assert!(parse_duration("18446744073709551615:00:00").is_err());
    }

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_timestamp("2024/03/15", " 12:30:05").unwrap();
        assert_eq!(ts.to_string(), "2024-03-15 12:30:05");

        let err = parse_timestamp("2024-03-15", "12:30:05").unwrap_err();
        assert!(matches!(err, RowError::MalformedTimestamp { .. }));
    }

    #[test]
    fn test_state_event_zero_default_policy() {
        let event = StateEvent::parse(&row("2024/03/15", "12:00:00", None), DurationPolicy::ZeroDefault)
            .unwrap();
        assert_eq!(event.duration_secs, 0);
        assert_eq!(event.agent_id, "1001");
        assert_eq!(event.reason_code, "Lunch");

        let event = StateEvent::parse(
            &row("2024/03/15", "12:00:00", Some("garbage")),
            DurationPolicy::ZeroDefault,
        )
        .unwrap();
        assert_eq!(event.duration_secs, 0);
    }

    #[test]
    fn test_state_event_reject_policy() {
        let err = StateEvent::parse(&row("2024/03/15", "12:00:00", None), DurationPolicy::Reject)
            .unwrap_err();
        assert!(matches!(err, RowError::MalformedDuration { .. }));
    }

    #[test]
    fn test_state_event_end_crosses_midnight() {
        let event = StateEvent::parse(
            &row("2024/03/15", "23:50:00", Some("0:20:00")),
            DurationPolicy::Reject,
        )
        .unwrap();
        assert_eq!(event.end.to_string(), "2024-03-16 00:10:00");
    }

    #[test]
    fn test_state_event_end_out_of_range_follows_policy() {
        // parses as u64 but lands past chrono's maximum date
        for huge in ["3000000000:00:00", "5000000000000:00:00"] {
            let r = row("2024/03/15", "12:00:00", Some(huge));

            let event = StateEvent::parse(&r, DurationPolicy::ZeroDefault).unwrap();
            assert_eq!(event.duration_secs, 0);
            assert_eq!(event.end, event.start);

            let err = StateEvent::parse(&r, DurationPolicy::Reject).unwrap_err();
            assert!(matches!(err, RowError::MalformedDuration { .. }), "{huge}");
        }
    }

    #[test]
    fn test_read_rows_accepts_agent_id_alias() {
        let data = "AGENT ID,STATE,REASON CODE,DATE,TIME,AGENT STATE TIME\n\
                    7,Not Ready,Lunch,2024/03/15,12:00:00,0:30:00\n\
                    8,Ready,,2024/03/15,12:00:00,\n";
        let rows = read_rows(data.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].agent, "7");
        assert!(rows[0].is_not_ready());
        assert_eq!(rows[1].reason_code(), "");
        assert!(rows[1].agent_state_time.is_none());
        assert!(!rows[1].is_not_ready());
    }

    #[test]
    fn test_read_rows_missing_column_fails() {
        let data = "AGENT,STATE\n7,Not Ready\n";
        assert!(read_rows(data.as_bytes()).is_err());
    }
}
