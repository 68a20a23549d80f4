//! Byte stream to event sequence.
//!
//! [`EventReader`] owns the decode state (undecoded bytes and the pending
//! line) and turns chunks into [`JobEvent`]s. Every input ends in exactly
//! one terminal event; nothing is produced after it.

use std::collections::VecDeque;

use bytes::Bytes;
use futures::{Stream, StreamExt};

use crate::error::StreamError;
use crate::sse::decoder::Utf8Decoder;
use crate::sse::events::{JobEvent, JobResult};
use crate::sse::framer::{FramingError, LineFramer, DEFAULT_MAX_LINE_BYTES};
use crate::sse::parser::{classify_line, LineOutcome};
use crate::traits::HttpError;

/// Stateful reader for one progress stream.
#[derive(Debug)]
pub struct EventReader {
    decoder: Utf8Decoder,
    framer: LineFramer,
    finished: bool,
    malformed_lines: usize,
}

impl Default for EventReader {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_BYTES)
    }
}

impl EventReader {
    pub fn new(max_line_bytes: usize) -> Self {
        Self {
            decoder: Utf8Decoder::new(),
            framer: LineFramer::new(max_line_bytes),
            finished: false,
            malformed_lines: 0,
        }
    }

    /// Feed one transport chunk, returning the events it completed.
    ///
    /// Once a terminal event has been returned, further input is ignored.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<JobEvent> {
        if self.finished {
            return Vec::new();
        }
        let text = self.decoder.decode(chunk);
        self.frame(&text)
    }

    /// Signal the end of the byte stream.
    ///
    /// Flushes the decoder and the final unterminated line. If the stream
    /// never produced a terminal event, a [`StreamError::ClosedEarly`] is
    /// returned as the last event.
    pub fn finish(&mut self) -> Vec<JobEvent> {
        if self.finished {
            return Vec::new();
        }

        let tail = self.decoder.finish();
        let mut events = self.frame(&tail);
        if !self.finished {
            if let Some(line) = self.framer.finish() {
                events.extend(self.classify_lines(vec![line]));
            }
        }
        if !self.finished {
            tracing::debug!("Progress stream ended without a terminal event");
            self.finished = true;
            events.push(JobEvent::StreamError(StreamError::ClosedEarly));
        }
        events
    }

    /// Terminate the stream with a transport error.
    pub fn fail(&mut self, err: StreamError) -> Vec<JobEvent> {
        if self.finished {
            return Vec::new();
        }
        self.finished = true;
        vec![JobEvent::StreamError(err)]
    }

    /// Whether a terminal event has been produced.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Number of event lines dropped because their payload was invalid.
    pub fn malformed_lines(&self) -> usize {
        self.malformed_lines
    }

    fn frame(&mut self, text: &str) -> Vec<JobEvent> {
        let mut lines = Vec::new();
        let framed = self.framer.push(text, &mut lines);
        let mut events = self.classify_lines(lines);
        if let Err(FramingError::LineTooLong { limit }) = framed {
            if !self.finished {
                tracing::warn!(limit, "Event line exceeded limit, aborting stream");
                events.extend(self.fail(StreamError::LineTooLong { limit }));
            }
        }
        events
    }

    fn classify_lines(&mut self, lines: Vec<String>) -> Vec<JobEvent> {
        let mut events = Vec::new();
        for line in lines {
            match classify_line(&line) {
                LineOutcome::Ignored => {}
                LineOutcome::Sentinel => {
                    tracing::debug!("End-of-stream marker received");
                    self.finished = true;
                    events.push(JobEvent::Result(JobResult::stream_ended()));
                    break;
                }
                LineOutcome::Malformed { payload, reason } => {
                    self.malformed_lines += 1;
                    tracing::warn!(%reason, payload = %payload, "Dropping malformed event payload");
                }
                LineOutcome::Event(event) => {
                    let terminal = event.is_terminal();
                    events.push(event);
                    if terminal {
                        self.finished = true;
                        break;
                    }
                }
            }
        }
        events
    }
}

/// Adapt a chunked body into a stream of events.
///
/// The returned stream yields zero or more progress events followed by
/// exactly one terminal event, then ends. Events are produced lazily, one
/// chunk read at a time. It has no cancellation of its own; the session
/// selects on it against its token, and dropping it releases the body.
pub fn event_stream<S>(body: S, max_line_bytes: usize) -> impl Stream<Item = JobEvent> + Send
where
    S: Stream<Item = Result<Bytes, HttpError>> + Unpin + Send,
{
    let state = (body, EventReader::new(max_line_bytes), VecDeque::new());
    futures::stream::unfold(state, |(mut body, mut reader, mut queue)| async move {
        loop {
            if let Some(event) = queue.pop_front() {
                return Some((event, (body, reader, queue)));
            }
            if reader.is_finished() {
                return None;
            }
            match body.next().await {
                Some(Ok(chunk)) => {
                    tracing::trace!(bytes = chunk.len(), "Received chunk");
                    queue.extend(reader.feed(&chunk));
                }
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "Progress stream read failed");
                    queue.extend(reader.fail(StreamError::from_read_failure(e)));
                }
                None => {
                    if reader.malformed_lines() > 0 {
                        tracing::debug!(malformed_lines = reader.malformed_lines(), "Progress body ended");
                    }
                    queue.extend(reader.finish());
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sse::events::{ProgressEvent, ResultStatus};

    const STREAM: &str = concat!(
        ": connected\n\n",
        "data: {\"type\":\"progress\",\"stage\":\"clone\",\"message\":\"Cloning ✓\"}\n\n",
        "data: {\"type\":\"progress\",\"stage\":\"embed\",\"message\":\"Embedding 日本語\",\"progress\":5,\"total\":10}\n\n",
        "data: {\"status\":\"completed\",\"message\":\"Done\",\"filesIndexed\":7}\n\n",
    );

    fn read_all(chunks: &[&[u8]]) -> Vec<JobEvent> {
        let mut reader = EventReader::default();
        let mut events = Vec::new();
        for chunk in chunks {
            events.extend(reader.feed(chunk));
        }
        events.extend(reader.finish());
        events
    }

    #[test]
    fn test_single_progress_event_keeps_stream_open() {
        let mut reader = EventReader::default();
        let events = reader.feed(
            b"data: {\"type\":\"progress\",\"stage\":\"clone\",\"message\":\"Cloning\"}\n\n",
        );
        assert_eq!(
            events,
            vec![JobEvent::Progress(ProgressEvent::new("clone", "Cloning"))]
        );
        assert!(!reader.is_finished());
    }

    #[test]
    fn test_event_split_inside_payload() {
        let mut reader = EventReader::default();
        assert!(reader.feed(b"data: {\"type\":\"progr").is_empty());
        let events =
            reader.feed(b"ess\",\"stage\":\"embed\",\"message\":\"Embedding\"}\n\n");
        assert_eq!(
            events,
            vec![JobEvent::Progress(ProgressEvent::new("embed", "Embedding"))]
        );
    }

    #[test]
    fn test_every_two_way_split_matches_single_chunk() {
        let bytes = STREAM.as_bytes();
        let expected = read_all(&[bytes]);
        assert_eq!(expected.len(), 3);

        for split in 0..=bytes.len() {
            let (a, b) = bytes.split_at(split);
            assert_eq!(read_all(&[a, b]), expected, "split at byte {}", split);
        }
    }

    #[test]
    fn test_byte_at_a_time_matches_single_chunk() {
        let bytes = STREAM.as_bytes();
        let expected = read_all(&[bytes]);
        let singles: Vec<&[u8]> = bytes.chunks(1).collect();
        assert_eq!(read_all(&singles), expected);
    }

    #[test]
    fn test_sentinel_completes_and_stops_processing() {
        let mut reader = EventReader::default();
        let events = reader.feed(
            b"data: __EOF__\n\ndata: {\"type\":\"progress\",\"stage\":\"late\",\"message\":\"x\"}\n\n",
        );
        assert_eq!(events, vec![JobEvent::Result(JobResult::stream_ended())]);
        assert!(reader.is_finished());
        assert!(reader
            .feed(b"data: {\"status\":\"completed\",\"message\":\"m\"}\n")
            .is_empty());
        assert!(reader.finish().is_empty());
    }

    #[test]
    fn test_malformed_line_between_progress_events() {
        let events = read_all(&[concat!(
            "data: {\"type\":\"progress\",\"stage\":\"a\",\"message\":\"one\"}\n\n",
            "data: {not json\n\n",
            "data: {\"type\":\"progress\",\"stage\":\"b\",\"message\":\"two\"}\n\n",
            "data: __EOF__\n\n",
        )
        .as_bytes()]);
        assert_eq!(
            events,
            vec![
                JobEvent::Progress(ProgressEvent::new("a", "one")),
                JobEvent::Progress(ProgressEvent::new("b", "two")),
                JobEvent::Result(JobResult::stream_ended()),
            ]
        );
    }

    #[test]
    fn test_malformed_lines_are_counted() {
        let mut reader = EventReader::default();
        reader.feed(b"data: {\ndata: ]\n");
        assert_eq!(reader.malformed_lines(), 2);
        assert!(!reader.is_finished());
    }

    #[test]
    fn test_error_payload_is_terminal() {
        let events = read_all(&[
            "data: {\"type\":\"error\",\"message\":\"Repository not found\"}\n\ndata: __EOF__\n\n".as_bytes()
        ]);
        assert_eq!(
            events,
            vec![JobEvent::StreamError(StreamError::Backend {
                message: "Repository not found".to_string()
            })]
        );
    }

    #[test]
    fn test_unterminated_final_line_is_classified() {
        let events = read_all(&["data: {\"status\":\"skipped\",\"message\":\"Up to date\"}".as_bytes()]);
        match events.as_slice() {
            [JobEvent::Result(result)] => assert_eq!(result.status, ResultStatus::Skipped),
            other => panic!("Expected one result, got {:?}", other),
        }
    }

    #[test]
    fn test_end_without_terminal_event() {
        let events = read_all(&[
            "data: {\"type\":\"progress\",\"stage\":\"a\",\"message\":\"one\"}\n\n".as_bytes()
        ]);
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], JobEvent::StreamError(StreamError::ClosedEarly));
    }

    #[test]
    fn test_oversized_line_fails_stream() {
        let mut reader = EventReader::new(16);
        let events = reader.feed(b"data: {\"message\":\"this line never ends");
        assert_eq!(
            events,
            vec![JobEvent::StreamError(StreamError::LineTooLong { limit: 16 })]
        );
        assert!(reader.finish().is_empty());
    }

    #[test]
    fn test_result_before_oversized_fragment_wins() {
        let bytes = "data: {\"status\":\"completed\",\"message\":\"ok\"}\ndata: {\"message\":\"this line never ends and keeps on going".as_bytes();
        let limit = 48;
        let expected = vec![JobEvent::Result(JobResult::new(ResultStatus::Completed, "ok"))];

        let mut whole = EventReader::new(limit);
        assert_eq!(whole.feed(bytes), expected);

        let split = bytes.iter().position(|b| *b == b'\n').unwrap() + 1;
        let mut pieces = EventReader::new(limit);
        assert_eq!(pieces.feed(&bytes[..split]), expected);
        assert!(pieces.feed(&bytes[split..]).is_empty());
    }

    #[test]
    fn test_progress_before_oversized_fragment_is_delivered() {
        let mut reader = EventReader::new(64);
        let mut chunk = b"data: {\"type\":\"progress\",\"stage\":\"a\",\"message\":\"one\"}\n".to_vec();
        chunk.extend(std::iter::repeat(b'x').take(100));
        assert_eq!(
            reader.feed(&chunk),
            vec![
                JobEvent::Progress(ProgressEvent::new("a", "one")),
                JobEvent::StreamError(StreamError::LineTooLong { limit: 64 }),
            ]
        );
    }

    #[test]
    fn test_fail_after_finish_is_ignored() {
        let mut reader = EventReader::default();
        reader.feed(b"data: __EOF__\n");
        assert!(reader.fail(StreamError::ClosedEarly).is_empty());
    }

    #[tokio::test]
    async fn test_event_stream_from_chunks() {
        let chunks: Vec<Result<Bytes, HttpError>> = vec![
            Ok(Bytes::from_static(b"data: {\"type\":\"progress\",\"stage\":\"s\",")),
            Ok(Bytes::from_static(b"\"message\":\"m\"}\n\ndata: __E")),
            Ok(Bytes::from_static(b"OF__\n\n")),
        ];
        let events: Vec<JobEvent> = event_stream(futures::stream::iter(chunks), 1024)
            .collect()
            .await;
        assert_eq!(
            events,
            vec![
                JobEvent::Progress(ProgressEvent::new("s", "m")),
                JobEvent::Result(JobResult::stream_ended()),
            ]
        );
    }

    #[tokio::test]
    async fn test_event_stream_transport_error() {
        let chunks: Vec<Result<Bytes, HttpError>> = vec![
            Ok(Bytes::from_static(b"data: {\"type\":\"progress\",\"stage\":\"s\",\"message\":\"m\"}\n")),
            Err(HttpError::Read("connection reset".to_string())),
            Ok(Bytes::from_static(b"data: __EOF__\n")),
        ];
        let events: Vec<JobEvent> = event_stream(futures::stream::iter(chunks), 1024)
            .collect()
            .await;
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[1],
            JobEvent::StreamError(StreamError::Interrupted {
                message: "body read failed: connection reset".to_string()
            })
        );
    }
}
