//! Requests and the vocabulary used throughout nictl.
//!
//! A [`Request`] is either a named query (sent as a bare JSON string) or a
//! structured [`Action`] (sent as `{"Action": {...}}`).  The two forms unwrap
//! their replies differently, see [`Protocol::call`](crate::niri::protocol::Protocol::call).
//!
//! # Wire format
//!
//! ```json
//! "Workspaces"
//! {"Action":{"FocusWindow":{"id":12}}}
//! {"Action":{"FocusWorkspace":{"reference":{"Index":3}}}}
//! {"Action":{"SetWindowWidth":{"id":12,"change":{"SetFixed":945}}}}
//! ```

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Direction for workspace cycling.
///
/// Workspaces are stacked vertically, so `Down` moves to the next index and
/// `Up` to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Index delta for one step in this direction.
    pub fn step(self) -> i64 {
        match self {
            Direction::Up => -1,
            Direction::Down => 1,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// Error for a direction string that is neither `up` nor `down`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid direction {0:?} (expected \"up\" or \"down\")")]
pub struct ParseDirectionError(String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}

/// A query niri answers with state wrapped under the query's own name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    FocusedOutput,
    FocusedWindow,
    Windows,
    Workspaces,
    /// Turns the connection into an event feed instead of answering once.
    EventStream,
}

impl Query {
    /// The identifier sent on the wire, which is also the key of the reply.
    pub fn name(self) -> &'static str {
        match self {
            Query::FocusedOutput => "FocusedOutput",
            Query::FocusedWindow => "FocusedWindow",
            Query::Windows => "Windows",
            Query::Workspaces => "Workspaces",
            Query::EventStream => "EventStream",
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How to address a workspace in [`Action::FocusWorkspace`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum WorkspaceReference {
    /// 1-based position on the focused output.
    Index(u32),
}

/// A window size change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SizeChange {
    /// Absolute size in logical pixels.
    SetFixed(i32),
}

/// Every state-changing action nictl sends.
///
/// Serialized externally tagged, so `FocusWindowPrevious {}` goes out as
/// `{"FocusWindowPrevious":{}}`, matching what niri expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Action {
    FocusWindow { id: u64 },
    FocusWindowPrevious {},
    /// Ask niri to spawn a process; `command[0]` is the program.
    Spawn { command: Vec<String> },
    FocusWorkspace { reference: WorkspaceReference },
    SetWindowWidth { id: u64, change: SizeChange },
}

impl Action {
    /// Variant name, used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Action::FocusWindow { .. } => "FocusWindow",
            Action::FocusWindowPrevious {} => "FocusWindowPrevious",
            Action::Spawn { .. } => "Spawn",
            Action::FocusWorkspace { .. } => "FocusWorkspace",
            Action::SetWindowWidth { .. } => "SetWindowWidth",
        }
    }
}

/// One request, in exactly one of the two wire forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Bare query name; the reply payload is keyed by that name.
    Named(Query),
    /// Structured action; the reply payload is returned as is.
    Action(Action),
}

/// Envelope around a structured action: `{"Action": {...}}`.
#[derive(Serialize)]
enum ActionEnvelope<'a> {
    Action(&'a Action),
}

impl Request {
    /// Encode as a single newline-terminated JSON line.
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        let mut line = match self {
            Request::Named(query) => serde_json::to_string(query.name())?,
            Request::Action(action) => serde_json::to_string(&ActionEnvelope::Action(action))?,
        };
        line.push('\n');
        Ok(line)
    }
}

impl From<Action> for Request {
    fn from(action: Action) -> Self {
        Request::Action(action)
    }
}

impl From<Query> for Request {
    fn from(query: Query) -> Self {
        Request::Named(query)
    }
}
