// ── Display tone ──

use serde::{Deserialize, Serialize};

/// Semantic color class for a rendered value.
///
/// UIs map these onto their own palettes: the CLI onto terminal colors,
/// the TUI onto theme constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Neutral,
    Success,
    Info,
    Warning,
    Danger,
}
