//! [`Compositor`] implementation backed by niri IPC.
//!
//! Communicates with niri through the Unix socket named by `$NIRI_SOCKET`.
//! Every method is one short-lived connection; nothing is cached between
//! calls.

use crate::command::{Action, Query, Request};
use crate::config::SocketPath;
use crate::error::NiriError;
use crate::niri::events::EventStream;
use crate::niri::protocol::Protocol;
use crate::niri::types::{Output, Window, Workspace};
use crate::traits::Compositor;
use log::debug;
use serde::de::DeserializeOwned;
use std::time::Instant;

/// niri-backed compositor handle.
#[derive(Debug, Clone)]
pub struct NiriIpc {
    protocol: Protocol,
}

impl NiriIpc {
    /// Create a new handle.
    ///
    /// No connection is opened eagerly.
    pub fn new(socket: SocketPath) -> Self {
        Self {
            protocol: Protocol::new(socket),
        }
    }

    /// Handle for the niri instance of the current session (`$NIRI_SOCKET`).
    pub fn from_env() -> Result<Self, NiriError> {
        Ok(Self::new(SocketPath::from_env()?))
    }

    /// Run a named query and decode its result; `null` decodes as `None`.
    fn query<T: DeserializeOwned>(&self, query: Query) -> Result<Option<T>, NiriError> {
        let value = self.protocol.call(&Request::Named(query))?;
        serde_json::from_value(value)
            .map_err(|e| NiriError::Protocol(format!("decode {} reply: {}", query, e)))
    }
}

impl Compositor for NiriIpc {
    type Events = EventStream;

    fn focused_output(&self) -> Result<Option<Output>, NiriError> {
        self.query(Query::FocusedOutput)
    }

    fn workspaces(&self) -> Result<Vec<Workspace>, NiriError> {
        Ok(self.query(Query::Workspaces)?.unwrap_or_default())
    }

    fn windows(&self) -> Result<Vec<Window>, NiriError> {
        Ok(self.query(Query::Windows)?.unwrap_or_default())
    }

    fn focused_window(&self) -> Result<Option<Window>, NiriError> {
        self.query(Query::FocusedWindow)
    }

    fn perform(&self, action: Action) -> Result<(), NiriError> {
        let name = action.name();
        let reply = self.protocol.call(&Request::Action(action))?;
        debug!("{} -> {}", name, reply);
        Ok(())
    }

    fn events(&self, deadline: Option<Instant>) -> Result<EventStream, NiriError> {
        EventStream::subscribe(self.protocol.socket(), deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::niri::protocol::tests::FakeNiri;

    fn ok(body: &str) -> Vec<u8> {
        format!("{{\"Ok\":{}}}\n", body).into_bytes()
    }

    #[test]
    fn decodes_snapshots() {
        let niri = FakeNiri::serve(vec![
            ok(r#"{"FocusedOutput":{"name":"DP-1","make":"x","logical":{"x":0,"y":0,"width":1920,"height":1080,"scale":1.0,"transform":"Normal"}}}"#),
            ok(r#"{"Workspaces":[{"id":3,"idx":1,"name":null,"output":"DP-1","is_urgent":false,"is_active":true,"is_focused":true,"active_window_id":null}]}"#),
            ok(r#"{"Windows":[]}"#),
            ok(r#"{"FocusedWindow":null}"#),
        ]);
        let ipc = NiriIpc::new(niri.socket.clone());

        let output = ipc.focused_output().unwrap().unwrap();
        assert_eq!(output.name, "DP-1");
        assert_eq!(output.logical.unwrap().width, 1920);

        let workspaces = ipc.workspaces().unwrap();
        assert_eq!(workspaces.len(), 1);
        assert!(workspaces[0].is_active);

        assert!(ipc.windows().unwrap().is_empty());
        assert!(ipc.focused_window().unwrap().is_none());

        assert_eq!(
            niri.requests(),
            vec![
                "\"FocusedOutput\"\n",
                "\"Workspaces\"\n",
                "\"Windows\"\n",
                "\"FocusedWindow\"\n"
            ]
        );
    }

    #[test]
    fn missing_list_is_empty() {
        let niri = FakeNiri::serve(vec![ok("{}")]);
        assert!(NiriIpc::new(niri.socket.clone()).windows().unwrap().is_empty());
        niri.requests();
    }

    #[test]
    fn wrongly_shaped_snapshot_is_a_protocol_error() {
        let niri = FakeNiri::serve(vec![ok(r#"{"Workspaces":{"id":1}}"#)]);
        let err = NiriIpc::new(niri.socket.clone()).workspaces().unwrap_err();
        assert!(matches!(err, NiriError::Protocol(_)));
        niri.requests();
    }

    #[test]
    fn perform_propagates_daemon_errors() {
        let niri = FakeNiri::serve(vec![b"{\"Err\":\"unknown window\"}\n".to_vec()]);
        let err = NiriIpc::new(niri.socket.clone())
            .perform(Action::FocusWindow { id: 1 })
            .unwrap_err();
        assert_eq!(err, NiriError::Command("unknown window".into()));
        niri.requests();
    }
}
