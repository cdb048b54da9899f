//! Shared helpers for command handlers.

use std::io::{self, IsTerminal};

use chrono::NaiveDate;

use evse_core::{AutoApprove, ConfirmGate, MutationOutcome};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// Confirmation backed by a dialoguer prompt, or `--yes`.
pub enum CliGate {
    Auto(AutoApprove),
    Prompt,
}

impl ConfirmGate for CliGate {
    fn confirm(&self, prompt: &str) -> bool {
        match self {
            Self::Auto(gate) => gate.confirm(prompt),
            Self::Prompt => dialoguer::Confirm::new()
                .with_prompt(prompt)
                .default(false)
                .interact()
                .unwrap_or(false),
        }
    }
}

/// Pick the confirmation source for a destructive `action`.
///
/// Without `--yes`, stdin must be a terminal to prompt on.
pub fn confirm_gate(global: &GlobalOpts, action: &str) -> Result<CliGate, CliError> {
    if global.yes {
        return Ok(CliGate::Auto(AutoApprove));
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    Ok(CliGate::Prompt)
}

/// Print a mutation's notice on success, or turn it into an error.
///
/// Returns the reloaded view, if any.
pub fn finish<V>(outcome: MutationOutcome<V>, global: &GlobalOpts) -> Result<Option<V>, CliError> {
    if !outcome.is_success() {
        return Err(CliError::OperationFailed {
            message: outcome.notice.text,
        });
    }
    let color = output::should_color(global.color());
    output::print_notice(&outcome.notice.text, outcome.notice.tone, color, global.quiet);
    Ok(outcome.reloaded)
}

/// Parse a `YYYY-MM-DD` expiry flag.
pub fn parse_expiry(raw: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| CliError::Validation {
        field: "expires".into(),
        reason: format!("expected YYYY-MM-DD, got '{raw}': {e}"),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn expiry_accepts_iso_dates() {
        assert_eq!(
            parse_expiry("2027-03-01").unwrap(),
            NaiveDate::from_ymd_opt(2027, 3, 1).unwrap()
        );
    }

    #[test]
    fn expiry_rejects_other_formats() {
        let err = parse_expiry("01/03/2027").unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "expires"));
    }
}
