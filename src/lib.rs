pub mod browser;
pub mod core;
pub mod inspector;
pub mod sinks;

// --- Primary exports ---
pub use crate::browser::launcher::InspectedBrowser;
pub use crate::browser::probe::DomProbe;
pub use crate::core::config::{self, InspectorConfig};
pub use crate::inspector::cache::{HistoryEntry, SelectionCache};
pub use crate::inspector::descriptor::{Dimensions, ElementDescriptor};
pub use crate::inspector::display::{Notice, Severity, Snapshot};
pub use crate::inspector::session::{InspectSession, TerminalGuard};
pub use crate::sinks::SinkError;
