//! Request/reply round trips with niri.
//!
//! niri serves one request per connection: the client writes a single JSON
//! line and reads a single JSON line back.  Every reply is wrapped in an
//! envelope, `{"Ok": payload}` or `{"Err": detail}`.

use crate::command::Request;
use crate::config::SocketPath;
use crate::error::NiriError;
use crate::niri::transport::Transport;
use log::debug;
use serde::Deserialize;
use serde_json::Value;

/// The success/failure wrapper around every reply.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub enum Envelope {
    Ok(Value),
    Err(Value),
}

impl Envelope {
    /// Parse one reply line.
    ///
    /// Anything other than an object with exactly one of `Ok`/`Err` is a
    /// protocol error, never an empty success.
    pub fn parse(line: &str) -> Result<Self, NiriError> {
        serde_json::from_str(line)
            .map_err(|e| NiriError::Protocol(format!("bad reply {:?}: {}", line, e)))
    }

    /// The success payload, or the daemon's error as [`NiriError::Command`].
    pub fn into_result(self) -> Result<Value, NiriError> {
        match self {
            Envelope::Ok(payload) => Ok(payload),
            Envelope::Err(Value::String(detail)) => Err(NiriError::Command(detail)),
            Envelope::Err(detail) => Err(NiriError::Command(detail.to_string())),
        }
    }
}

/// Sends [`Request`]s to a niri socket.
///
/// No connection is opened eagerly; each [`call`](Protocol::call) opens and
/// closes its own.
#[derive(Debug, Clone)]
pub struct Protocol {
    socket: SocketPath,
}

impl Protocol {
    pub fn new(socket: SocketPath) -> Self {
        Self { socket }
    }

    pub fn socket(&self) -> &SocketPath {
        &self.socket
    }

    /// Open a connection and write `request` on it, leaving the connection
    /// ready for reading the reply.
    pub(crate) fn open(&self, request: &Request) -> Result<Transport, NiriError> {
        let line = request
            .to_line()
            .map_err(|e| NiriError::Protocol(format!("encode request: {}", e)))?;
        debug!("-> {}", line.trim_end());
        let mut transport = Transport::connect(self.socket.as_path())?;
        transport.send(line.as_bytes())?;
        Ok(transport)
    }

    /// Perform one round trip.
    ///
    /// For a [`Request::Named`] query the value stored under the query's name
    /// is returned; a missing or `null` entry yields [`Value::Null`] to mean
    /// "nothing", e.g. no focused window.  A named reply that is not an
    /// object at all is a [`NiriError::Protocol`].  For a [`Request::Action`]
    /// the payload is returned untouched.
    pub fn call(&self, request: &Request) -> Result<Value, NiriError> {
        let mut transport = self.open(request)?;
        let line = transport.read_line()?.ok_or_else(|| {
            NiriError::Protocol("connection closed before a reply arrived".into())
        })?;
        debug!("<- {}", line);
        let payload = Envelope::parse(&line)?.into_result()?;

        match request {
            Request::Named(query) => match payload {
                Value::Object(mut map) => Ok(map.remove(query.name()).unwrap_or(Value::Null)),
                _ => Err(NiriError::Protocol(format!(
                    "{} reply is not an object: {}",
                    query, payload
                ))),
            },
            Request::Action(_) => Ok(payload),
        }
    }
}

//  Tests
