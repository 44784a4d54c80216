//! niri's event stream.
//!
//! Sending the `"EventStream"` query turns a connection into a one-way feed:
//! niri acknowledges with a normal envelope and then writes one JSON event
//! per line until the connection is closed.

use crate::command::{Query, Request};
use crate::config::SocketPath;
use crate::error::NiriError;
use crate::niri::protocol::{Envelope, Protocol};
use crate::niri::transport::Transport;
use crate::niri::types::Event;
use log::{debug, trace};
use serde_json::Value;
use std::time::Instant;

/// A subscribed event feed.
///
/// Iterating blocks until the next line arrives.  The iterator ends when niri
/// closes the connection and stays ended after the first error; it cannot be
/// restarted, subscribe again instead.
#[derive(Debug)]
pub struct EventStream {
    transport: Option<Transport>,
}

impl EventStream {
    /// Connect, send the subscription and check niri's acknowledgement.
    ///
    /// `deadline` bounds every read, including the acknowledgement.
    pub fn subscribe(socket: &SocketPath, deadline: Option<Instant>) -> Result<Self, NiriError> {
        let mut transport = Protocol::new(socket.clone()).open(&Request::Named(Query::EventStream))?;
        transport.set_deadline(deadline);

        let ack = transport.read_line()?.ok_or_else(|| {
            NiriError::Protocol("connection closed before the subscription was acknowledged".into())
        })?;
        Envelope::parse(&ack)?.into_result()?;
        debug!("subscribed to event stream");

        Ok(Self {
            transport: Some(transport),
        })
    }

    fn next_event(&mut self) -> Result<Option<Event>, NiriError> {
        let Some(transport) = self.transport.as_mut() else {
            return Ok(None);
        };
        let Some(line) = transport.read_line()? else {
            debug!("event stream closed");
            return Ok(None);
        };
        trace!("event {}", line);
        let value: Value = serde_json::from_str(&line)
            .map_err(|e| NiriError::Protocol(format!("bad event {:?}: {}", line, e)))?;
        Ok(Some(Event::from_value(value)))
    }
}

impl Iterator for EventStream {
    type Item = Result<Event, NiriError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_event() {
            Ok(Some(event)) => Some(Ok(event)),
            Ok(None) => {
                self.transport = None;
                None
            }
            Err(e) => {
                self.transport = None;
                Some(Err(e))
            }
        }
    }
}

impl std::iter::FusedIterator for EventStream {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::niri::protocol::tests::FakeNiri;
    use std::time::Duration;

    #[test]
    fn yields_events_after_acknowledgement() {
        let feed = concat!(
            "{\"Ok\":\"Handled\"}\n",
            "{\"WorkspacesChanged\":{\"workspaces\":[]}}\n",
            "{\"WindowLayoutsChanged\":{\"changes\":[[5,{\"pos_in_scrolling_layout\":[1,1],\"window_size\":[945,1000]}]]}}\n",
        );
        let niri = FakeNiri::serve(vec![feed.as_bytes().to_vec()]);
        let events: Vec<Event> = EventStream::subscribe(&niri.socket, None)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            Event::Other {
                name: "WorkspacesChanged".into()
            }
        );
        assert_eq!(events[1].changed_windows().collect::<Vec<_>>(), vec![5]);
        assert_eq!(niri.requests(), vec!["\"EventStream\"\n".to_string()]);
    }

    #[test]
    fn refused_subscription_is_a_command_error() {
        let niri = FakeNiri::serve(vec![b"{\"Err\":\"busy\"}\n".to_vec()]);
        let err = EventStream::subscribe(&niri.socket, None).unwrap_err();
        assert_eq!(err, NiriError::Command("busy".into()));
        niri.requests();
    }

    #[test]
    fn bad_line_ends_the_stream() {
        let niri = FakeNiri::serve(vec![b"{\"Ok\":\"Handled\"}\ngarbage\n{\"Other\":{}}\n".to_vec()]);
        let mut stream = EventStream::subscribe(&niri.socket, None).unwrap();
        assert!(matches!(stream.next(), Some(Err(NiriError::Protocol(_)))));
        assert!(stream.next().is_none());
        niri.requests();
    }

    #[test]
    fn deadline_stops_a_silent_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("niri.sock");
        let listener = std::os::unix::net::UnixListener::bind(&path).unwrap();
        let server = std::thread::spawn(move || {
            use std::io::Write;
            let (mut stream, _) = listener.accept().unwrap();
            stream.write_all(b"{\"Ok\":\"Handled\"}\n").unwrap();
            std::thread::sleep(Duration::from_millis(300));
        });

        let deadline = Instant::now() + Duration::from_millis(100);
        let mut stream = EventStream::subscribe(&SocketPath::new(&path), Some(deadline)).unwrap();
        assert_eq!(stream.next(), Some(Err(NiriError::Timeout)));
        assert_eq!(stream.next(), None);
        server.join().unwrap();
    }
}
