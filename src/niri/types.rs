//! Minimal serde structs for the niri JSON we care about.
//!
//! Only the fields nictl reads are declared; serde ignores the rest, so newer
//! niri versions adding fields keep working.

use log::warn;
use serde::Deserialize;
use serde_json::Value;

/// Subset of an entry in the `Windows` reply.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Window {
    pub id: u64,
    /// Missing for some clients (e.g. freshly mapped X11 windows).
    #[serde(default)]
    pub app_id: Option<String>,
    /// `None` while a window is not on any workspace.
    #[serde(default)]
    pub workspace_id: Option<u64>,
    #[serde(default)]
    pub layout: WindowLayout,
}

impl Window {
    /// `(column, row)` in the scrolling layout, `None` for floating windows.
    pub fn position(&self) -> Option<(usize, usize)> {
        self.layout.pos_in_scrolling_layout
    }

    /// Current width in logical pixels.
    pub fn width(&self) -> i32 {
        self.layout.window_size.0
    }
}

/// Position and size of a window, as reported in `Windows` replies and in
/// `WindowLayoutsChanged` events.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WindowLayout {
    /// 1-based `(column, row)`.
    #[serde(default)]
    pub pos_in_scrolling_layout: Option<(usize, usize)>,
    #[serde(default)]
    pub window_size: (i32, i32),
}

/// Subset of an entry in the `Workspaces` reply.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Workspace {
    pub id: u64,
    /// 1-based position on its output.
    pub idx: u32,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

/// Subset of the `FocusedOutput` reply.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Output {
    pub name: String,
    /// `None` when the output is disabled.
    #[serde(default)]
    pub logical: Option<LogicalOutput>,
}

/// Logical size of an output, after scaling.  Only the width matters for
/// fitting columns.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogicalOutput {
    pub width: u32,
}

/// A message from the event stream.
///
/// Only the layout-change notification is decoded; every other event is
/// kept by name so callers can log and skip it.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// One or more windows moved or changed size.
    WindowLayoutsChanged { changes: Vec<(u64, WindowLayout)> },
    Other { name: String },
}

#[derive(Deserialize)]
struct LayoutsChangedJson {
    changes: Vec<(u64, WindowLayout)>,
}

impl Event {
    /// Classify a decoded event object (`{"<EventName>": {...}}`).
    pub fn from_value(value: Value) -> Self {
        let Value::Object(map) = value else {
            return Event::Other {
                name: String::new(),
            };
        };
        let Some((name, body)) = map.into_iter().next() else {
            return Event::Other {
                name: String::new(),
            };
        };
        if name != "WindowLayoutsChanged" {
            return Event::Other { name };
        }
        match serde_json::from_value::<LayoutsChangedJson>(body) {
            Ok(json) => Event::WindowLayoutsChanged {
                changes: json.changes,
            },
            Err(e) => {
                warn!("undecodable {} event: {}", name, e);
                Event::Other { name }
            }
        }
    }

    /// Ids of the windows this event reports, empty for other events.
    pub fn changed_windows(&self) -> impl Iterator<Item = u64> + '_ {
        let changes: &[(u64, WindowLayout)] = match self {
            Event::WindowLayoutsChanged { changes } => changes,
            Event::Other { .. } => &[],
        };
        changes.iter().map(|(id, _)| *id)
    }
}
