//! Byte transport over niri's Unix socket.
//!
//! [`Transport`] owns exactly one stream connection.  Writes go out in full;
//! reads are framed into newline-delimited messages by [`LineBuffer`], which
//! tolerates replies split across any number of `read` calls as well as
//! several messages arriving in one burst.

use crate::error::NiriError;
use log::trace;
use std::io::{ErrorKind, Read, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::time::Instant;

/// Size of a single `read` from the socket.
const CHUNK_SIZE: usize = 1024;

/// Growable receive buffer that splits incoming bytes into lines.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append freshly received bytes.
    pub fn extend(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Pop the next complete, non-empty line, without its terminator.
    ///
    /// Empty and whitespace-only lines are consumed and skipped.  Returns
    /// `Ok(None)` once no complete line is left in the buffer.
    pub fn next_line(&mut self) -> Result<Option<String>, NiriError> {
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            if let Some(text) = decode_segment(&line[..pos])? {
                return Ok(Some(text));
            }
        }
        Ok(None)
    }

    /// Take whatever is left after the peer closed, if it is not blank.
    pub fn finish(&mut self) -> Result<Option<String>, NiriError> {
        let rest = std::mem::take(&mut self.buf);
        decode_segment(&rest)
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

fn decode_segment(bytes: &[u8]) -> Result<Option<String>, NiriError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| NiriError::Protocol(format!("reply is not valid utf-8: {}", e)))?;
    let text = text.trim();
    if text.is_empty() {
        Ok(None)
    } else {
        Ok(Some(text.to_string()))
    }
}

/// A single connection to niri.
///
/// Dropping the transport closes the socket, so every exit path of a request
/// releases its connection.
#[derive(Debug)]
pub struct Transport {
    stream: UnixStream,
    lines: LineBuffer,
    closed: bool,
    deadline: Option<Instant>,
}

impl Transport {
    /// Open a stream connection to the socket at `path`.
    pub fn connect(path: &Path) -> Result<Self, NiriError> {
        let stream = UnixStream::connect(path)
            .map_err(|e| NiriError::Connection(format!("connect to {}: {}", path.display(), e)))?;
        Ok(Self::from_stream(stream))
    }

    /// Wrap an already connected stream.
    pub fn from_stream(stream: UnixStream) -> Self {
        Self {
            stream,
            lines: LineBuffer::new(),
            closed: false,
            deadline: None,
        }
    }

    /// Bound every subsequent read by `deadline`.  `None` blocks forever.
    pub fn set_deadline(&mut self, deadline: Option<Instant>) {
        self.deadline = deadline;
    }

    /// Write the whole buffer.
    pub fn send(&mut self, bytes: &[u8]) -> Result<(), NiriError> {
        trace!("send {} byte(s)", bytes.len());
        self.stream
            .write_all(bytes)
            .and_then(|()| self.stream.flush())
            .map_err(|e| NiriError::Connection(format!("write: {}", e)))
    }

    /// Read the next non-empty line.
    ///
    /// Returns `Ok(None)` once the peer has closed and everything it sent has
    /// been handed out.  A trailing message without a newline is still
    /// returned before that.
    pub fn read_line(&mut self) -> Result<Option<String>, NiriError> {
        loop {
            if let Some(line) = self.lines.next_line()? {
                return Ok(Some(line));
            }
            if self.closed {
                return self.lines.finish();
            }
            self.fill()?;
        }
    }

    /// Read one chunk from the socket into the line buffer.
    fn fill(&mut self) -> Result<(), NiriError> {
        if let Some(deadline) = self.deadline {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(NiriError::Timeout);
            }
            self.stream
                .set_read_timeout(Some(remaining))
                .map_err(|e| NiriError::Connection(format!("set read timeout: {}", e)))?;
        }

        let mut chunk = [0u8; CHUNK_SIZE];
        loop {
            match self.stream.read(&mut chunk) {
                Ok(0) => {
                    trace!("peer closed the connection");
                    self.closed = true;
                    return Ok(());
                }
                Ok(n) => {
                    trace!("received {} byte(s)", n);
                    self.lines.extend(&chunk[..n]);
                    return Ok(());
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    return Err(NiriError::Timeout);
                }
                Err(e) => return Err(NiriError::Connection(format!("read: {}", e))),
            }
        }
    }
}

//  Tests
