//! JSONL serving loop around the dispatcher.
//!
//! Each non-blank input line is decoded into a [`Request`], dispatched, and
//! answered with exactly one reply line. Lines that cannot be decoded or that
//! exceed the size limit are answered with an error reply rather than ending
//! the loop. Only I/O failures on the streams themselves stop serving.

use std::io::{self, BufRead, Write};

use thiserror::Error;
use tracing::{debug, warn};

use crate::dispatch::{DISPATCH_TARGET, DispatchError, Dispatcher, Reply, Request};

/// Failures that stop the serving loop.
#[derive(Debug, Error)]
pub enum ServeError {
    /// Reading requests or writing replies failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Reply serialization failed.
    #[error("failed to serialize reply: {0}")]
    SerializeReply(#[from] serde_json::Error),
}

/// Counts of replies written by [`serve_lines`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ServeSummary {
    /// Replies with `status = "ok"`.
    pub handled: usize,
    /// Replies with `status = "error"`.
    pub failed: usize,
}

impl ServeSummary {
    fn record(&mut self, reply: &Reply) {
        if reply.is_ok() {
            self.handled += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// Writer that serializes replies as JSONL.
pub struct ReplyWriter<W> {
    writer: W,
}

impl<W: Write> ReplyWriter<W> {
    /// Creates a new reply writer wrapping the given output stream.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes a reply as a single line and flushes, so request/reply
    /// clients see the answer before sending their next request.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization, writing, or flushing fails.
    pub fn write_reply(&mut self, reply: &Reply) -> Result<(), ServeError> {
        serde_json::to_writer(&mut self.writer, reply)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// One input line, or the length of a line that was over the limit.
enum Frame {
    Line(Vec<u8>),
    Oversize { size: usize },
}

/// Serves requests from `reader` until end of input.
///
/// # Errors
///
/// Returns a [`ServeError`] if reading or writing fails. Bad requests never
/// end the loop.
pub fn serve_lines<R, W>(
    mut reader: R,
    writer: W,
    dispatcher: &Dispatcher,
    max_request_bytes: usize,
) -> Result<ServeSummary, ServeError>
where
    R: BufRead,
    W: Write,
{
    let mut writer = ReplyWriter::new(writer);
    let mut summary = ServeSummary::default();

    while let Some(frame) = next_frame(&mut reader, max_request_bytes)? {
        let reply = match frame {
            Frame::Oversize { size } => {
                let error = DispatchError::request_too_large(size, max_request_bytes);
                warn!(target: DISPATCH_TARGET, %error, "rejected request");
                Reply::from_error(&error)
            }
            Frame::Line(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => continue,
            Frame::Line(bytes) => match Request::parse(&bytes) {
                Ok(request) => dispatcher.dispatch(&request),
                Err(error) => {
                    warn!(target: DISPATCH_TARGET, %error, "malformed request");
                    Reply::from_error(&error)
                }
            },
        };
        summary.record(&reply);
        writer.write_reply(&reply)?;
    }

    debug!(
        target: DISPATCH_TARGET,
        handled = summary.handled,
        failed = summary.failed,
        "input exhausted"
    );
    Ok(summary)
}

/// Reads the next newline-terminated frame, discarding the body of lines
/// longer than `max_bytes` while still consuming them up to the delimiter.
///
/// Returns `Ok(None)` at end of input. A final line without a trailing newline
/// is still returned.
fn next_frame<R: BufRead>(reader: &mut R, max_bytes: usize) -> io::Result<Option<Frame>> {
    let mut line = Vec::new();
    let mut size = 0_usize;
    let mut started = false;

    loop {
        let available = match reader.fill_buf() {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(error),
        };

        if available.is_empty() {
            return Ok(started.then(|| finish_frame(line, size, max_bytes)));
        }
        started = true;

        let (body_len, consumed, complete) = match available.iter().position(|b| *b == b'\n') {
            Some(pos) => (pos, pos + 1, true),
            None => (available.len(), available.len(), false),
        };
        size = size.saturating_add(body_len);
        if size <= max_bytes {
            line.extend_from_slice(available.get(..body_len).unwrap_or_default());
        }
        reader.consume(consumed);

        if complete {
            return Ok(Some(finish_frame(line, size, max_bytes)));
        }
    }
}

fn finish_frame(line: Vec<u8>, size: usize, max_bytes: usize) -> Frame {
    if size > max_bytes {
        Frame::Oversize { size }
    } else {
        Frame::Line(line)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufReader, Cursor};

    use rstest::{fixture, rstest};
    use serde_json::{Value, json};

    use super::*;
    use crate::builtin;
    use crate::dispatch::RequiredFields;

    #[fixture]
    fn dispatcher() -> Dispatcher {
        Dispatcher::new(
            builtin::registry().expect("builtin registry"),
            RequiredFields::default(),
        )
    }

    fn serve(dispatcher: &Dispatcher, input: &[u8], limit: usize) -> (ServeSummary, Vec<Value>) {
        let mut output = Vec::new();
        let summary =
            serve_lines(Cursor::new(input), &mut output, dispatcher, limit).expect("serve");
        let replies = String::from_utf8(output)
            .expect("utf8 output")
            .lines()
            .map(|line| serde_json::from_str(line).expect("reply line is JSON"))
            .collect();
        (summary, replies)
    }

    #[rstest]
    fn answers_each_line_in_order(dispatcher: Dispatcher) {
        let input = b"{\"type\":\"echo\",\"payload\":\"hi\"}\n{\"type\":\"ping\",\"payload\":null}\n";
        let (summary, replies) = serve(&dispatcher, input, 1024);
        assert_eq!(
            replies,
            [
                json!({"status": "ok", "payload": "hi"}),
                json!({"status": "ok", "payload": "pong"}),
            ]
        );
        assert_eq!(summary, ServeSummary { handled: 2, failed: 0 });
    }

    #[rstest]
    fn malformed_lines_get_error_replies(dispatcher: Dispatcher) {
        let input = b"not json\n{\"type\":\"echo\",\"payload\":1}\n";
        let (summary, replies) = serve(&dispatcher, input, 1024);
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0]["status"], "error");
        assert_eq!(replies[0]["payload"]["kind"], "MalformedRequest");
        assert_eq!(replies[1], json!({"status": "ok", "payload": 1}));
        assert_eq!(summary, ServeSummary { handled: 1, failed: 1 });
    }

    #[rstest]
    fn skips_blank_lines(dispatcher: Dispatcher) {
        let input = b"\n   \n{\"type\":\"ping\",\"payload\":{}}\r\n\n";
        let (summary, replies) = serve(&dispatcher, input, 1024);
        assert_eq!(replies, [json!({"status": "ok", "payload": "pong"})]);
        assert_eq!(summary.handled, 1);
    }

    #[rstest]
    fn accepts_final_line_without_newline(dispatcher: Dispatcher) {
        let (_, replies) = serve(&dispatcher, b"{\"type\":\"echo\",\"payload\":true}", 1024);
        assert_eq!(replies, [json!({"status": "ok", "payload": true})]);
    }

    #[rstest]
    fn oversize_lines_are_rejected_and_skipped(dispatcher: Dispatcher) {
        let long = format!("{{\"type\":\"echo\",\"payload\":\"{}\"}}\n", "x".repeat(64));
        let input = format!("{long}{{\"type\":\"ping\",\"payload\":0}}\n");
        // A tiny buffer forces the oversize line across several reads.
        let reader = BufReader::with_capacity(8, Cursor::new(input.into_bytes()));
        let mut output = Vec::new();
        let summary = serve_lines(reader, &mut output, &dispatcher, 40).expect("serve");

        let text = String::from_utf8(output).expect("utf8 output");
        let replies: Vec<Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).expect("reply line is JSON"))
            .collect();
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0]["payload"]["kind"], "RequestTooLarge");
        assert_eq!(replies[1], json!({"status": "ok", "payload": "pong"}));
        assert_eq!(summary, ServeSummary { handled: 1, failed: 1 });
    }

    #[test]
    fn reply_writer_terminates_lines() {
        let mut output = Vec::new();
        let mut writer = ReplyWriter::new(&mut output);
        writer
            .write_reply(&Reply::ok(json!("hi")))
            .expect("write reply");
        let text = String::from_utf8(output).expect("utf8 output");
        assert_eq!(text, "{\"status\":\"ok\",\"payload\":\"hi\"}\n");
    }
}
