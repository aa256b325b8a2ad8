//! Shared helpers for command handlers.

use chrono::{DateTime, NaiveDate, Utc};

use slotbook_core::{CallType, EntityId, GroupStatus};

use crate::cli::{CallTypeArg, GroupStatusArg};
use crate::error::CliError;

/// Parse a participant or entity id. UUID-shaped ids become UUIDs.
pub fn id(raw: &str, field: &str) -> Result<EntityId, CliError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CliError::Validation {
            field: field.into(),
            reason: "must not be empty".into(),
        });
    }
    Ok(EntityId::from(trimmed))
}

pub fn date(raw: &str, field: &str) -> Result<NaiveDate, CliError> {
    raw.parse::<NaiveDate>().map_err(|e| CliError::Validation {
        field: field.into(),
        reason: format!("expected YYYY-MM-DD ({e})"),
    })
}

pub fn datetime(raw: &str, field: &str) -> Result<DateTime<Utc>, CliError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CliError::Validation {
            field: field.into(),
            reason: format!("expected RFC 3339, e.g. 2030-05-14T18:00:00Z ({e})"),
        })
}

pub fn call_type(arg: CallTypeArg) -> CallType {
    match arg {
        CallTypeArg::Chat => CallType::Chat,
        CallTypeArg::Audio => CallType::Audio,
        CallTypeArg::Video => CallType::Video,
    }
}

pub fn group_status(arg: GroupStatusArg) -> GroupStatus {
    match arg {
        GroupStatusArg::Scheduled => GroupStatus::Scheduled,
        GroupStatusArg::Completed => GroupStatus::Completed,
        GroupStatusArg::Cancelled => GroupStatus::Cancelled,
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
/// Without a terminal the prompt cannot be shown and `--yes` is required.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_id_is_rejected() {
        assert!(matches!(
            id("  ", "consumer"),
            Err(CliError::Validation { field, .. }) if field == "consumer"
        ));
    }

    #[test]
    fn rfc3339_offsets_are_normalized_to_utc() {
        let Ok(dt) = datetime("2030-05-14T20:00:00+02:00", "at") else {
            panic!("timestamp should parse");
        };
        assert_eq!(dt.to_rfc3339(), "2030-05-14T18:00:00+00:00");
    }

    #[test]
    fn bad_date_names_the_format() {
        assert!(matches!(
            date("14/05/2030", "date"),
            Err(CliError::Validation { reason, .. }) if reason.contains("YYYY-MM-DD")
        ));
    }
}
