// evse-core: panel logic between evse-api and the operator surfaces (CLI/TUI).
//
// `Panel` probes the device, loads collections, and runs the mutation
// flows; `TelemetryPoller` publishes live readings. Every device failure is
// absorbed into a render model from `view`, so consumers draw what they get.

pub mod config;
pub mod confirm;
pub mod error;
pub mod format;
pub mod model;
pub mod panel;
pub mod poller;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{DEFAULT_DEVICE_URL, PanelConfig};
pub use confirm::{AutoApprove, ConfirmGate};
pub use error::CoreError;
pub use panel::{ConnectionState, Panel};
pub use poller::{PollHandle, PollerState, TelemetryPoller};
pub use view::{
    AlarmRow, CardRow, CollectionView, ConfigView, MutationOutcome, NOTICE_TTL, Notice,
    StatusText, TelemetryView,
};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    AlarmRecord, AuthorizedCard, CardId, ChargeState, ConfigUpdate, CoverState, DeviceConfig,
    DeviceStatus, FormField, NetworkState, NewCard, Tone, default_expiry,
};
