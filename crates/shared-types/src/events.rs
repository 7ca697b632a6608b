//! Host chart event kinds the tooltip plugin listens to

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    /// Raw pointer movement over the chart's event holder
    PointerMove,
    /// Pointer movement with the host's hit test result
    Hover,
    /// Click with the host's hit test result
    Click,
    /// The chart is being torn down
    Shutdown,
}

impl EventKind {
    /// Name of the matching flot event
    pub fn host_event_name(&self) -> &'static str {
        match self {
            EventKind::PointerMove => "mousemove",
            EventKind::Hover => "plothover",
            EventKind::Click => "plotclick",
            EventKind::Shutdown => "shutdown",
        }
    }
}
