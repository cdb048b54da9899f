// ── Confirmation gate ──
//
// Destructive actions block on an operator yes/no before any request is
// issued. The CLI answers with a dialoguer prompt (or `--yes`), the TUI with
// its modal, tests with a closure.

/// Answers a yes/no prompt. `false` cancels the action.
pub trait ConfirmGate {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Approves everything. Backs the CLI's `--yes`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApprove;

impl ConfirmGate for AutoApprove {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

impl<F> ConfirmGate for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

// ── Prompts ─────────────────────────────────────────────────────────

pub fn delete_card_prompt(id: &str) -> String {
    format!("Delete authorized card {id}?")
}

pub const CLEAR_ALARMS_PROMPT: &str = "Clear all alarm records?";

pub const RESET_SETTINGS_PROMPT: &str = "Restore default settings?";
