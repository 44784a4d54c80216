//! The trait that decouples nictl's algorithms from the IPC transport.
//!
//! [`WorkspaceNavigator`](crate::navigator::WorkspaceNavigator),
//! [`LayoutFitter`](crate::fitter::LayoutFitter) and
//! [`spawn_or_focus`](crate::launcher::spawn_or_focus) only depend on
//! [`Compositor`].  The concrete implementation talks to niri over its socket
//! ([`NiriIpc`](crate::niri::client::NiriIpc)); tests use a recording double.

use crate::command::Action;
use crate::error::NiriError;
use crate::niri::types::{Event, Output, Window, Workspace};
use std::time::Instant;

/// Abstraction over a compositor that can report its state, perform actions
/// and stream events.
///
/// Every query returns a fresh snapshot.  Implementations must not cache:
/// windows and workspaces can change between any two calls.
pub trait Compositor {
    /// Event feed returned by [`events`](Compositor::events).
    type Events: Iterator<Item = Result<Event, NiriError>>;

    /// The focused output, or `None` if no output is focused.
    fn focused_output(&self) -> Result<Option<Output>, NiriError>;

    /// All workspaces on all outputs.
    fn workspaces(&self) -> Result<Vec<Workspace>, NiriError>;

    /// All open windows.
    fn windows(&self) -> Result<Vec<Window>, NiriError>;

    /// The focused window, or `None` if nothing has focus.
    fn focused_window(&self) -> Result<Option<Window>, NiriError>;

    /// Perform `action`, returning once the compositor has acknowledged it.
    fn perform(&self, action: Action) -> Result<(), NiriError>;

    /// Subscribe to the event stream.
    ///
    /// Reads past `deadline` fail with [`NiriError::Timeout`].
    fn events(&self, deadline: Option<Instant>) -> Result<Self::Events, NiriError>;
}
