// ── Domain model ──
//
// Canonical, typed views of what the charging controller reports. Wire
// quirks (string numbers, numeric codes, falsey defaults) are absorbed in
// the `From` conversions here so the panel and UIs never see them.

pub mod alarm;
pub mod card;
pub mod settings;
pub mod status;
pub mod tone;

// ── Re-exports ──────────────────────────────────────────────────────

pub use alarm::{AlarmRecord, CoverState};
pub use card::{AuthorizedCard, CardId, NewCard, default_expiry};
pub use settings::{ConfigUpdate, DeviceConfig, FormField};
pub use status::{ChargeState, DeviceStatus, NetworkState};
pub use tone::Tone;
