//! Frame layout and the marker-search state machine.
//!
//! ```text
//! start | payload | [delimiter | metadata] | end
//! ```
//!
//! Raw framing drops the markers: the payload bytes are embedded as they
//! are and the reader must know their count.

use crate::error::{KeyhopError, Result};
use crate::scheme::{Markers, StartSearch};

/// Wrap `payload` (and optional `metadata`) in markers.
///
/// The delimiter is written whenever metadata is present, and always when
/// `delimiter_required` is set.
pub fn build_frame(
    payload: &[u8],
    metadata: Option<&[u8]>,
    markers: &Markers,
    delimiter_required: bool,
) -> Result<Vec<u8>> {
    let start = markers.start_bytes();
    let end = markers.end_bytes();
    let delimiter = markers.delimiter_byte();

    if let Some(d) = delimiter {
        if payload.contains(&d) {
            return Err(KeyhopError::InvalidPayload(format!(
                "payload contains the delimiter {:?}",
                d as char
            )));
        }
    }
    if contains(payload, start) || contains(payload, end) {
        return Err(KeyhopError::InvalidPayload(
            "payload contains a frame marker".into(),
        ));
    }

    let mut frame = Vec::with_capacity(
        start.len() + payload.len() + 1 + metadata.map_or(0, <[u8]>::len) + end.len(),
    );
    frame.extend_from_slice(start);
    frame.extend_from_slice(payload);
    match (metadata, delimiter) {
        (Some(_), None) => {
            return Err(KeyhopError::InvalidPayload(
                "metadata needs a delimiter".into(),
            ))
        }
        (Some(meta), Some(d)) => {
            frame.push(d);
            frame.extend_from_slice(meta);
        }
        (None, Some(d)) if delimiter_required => frame.push(d),
        (None, _) => {}
    }
    frame.extend_from_slice(end);

    // the scanner stops at the first end marker after the start marker
    let terminal = frame.len() - end.len();
    if find(&frame[start.len()..], end).map(|i| i + start.len()) != Some(terminal) {
        return Err(KeyhopError::InvalidPayload(
            "frame would end early on an embedded end marker".into(),
        ));
    }
    Ok(frame)
}

/// Unmarked frame: the payload alone
pub fn raw_frame(payload: &[u8], metadata: Option<&[u8]>) -> Result<Vec<u8>> {
    if metadata.is_some() {
        return Err(KeyhopError::InvalidPayload(
            "raw framing has no room for metadata".into(),
        ));
    }
    if payload.is_empty() {
        return Err(KeyhopError::InvalidPayload("empty raw payload".into()));
    }
    Ok(payload.to_vec())
}

/// Payload and metadata recovered from a frame body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFrame {
    pub payload: Vec<u8>,
    pub metadata: Option<Vec<u8>>,
}

impl ExtractedFrame {
    /// Split a frame body at its first delimiter; empty metadata reads as none
    pub fn from_body(mut body: Vec<u8>, delimiter: Option<u8>) -> Self {
        let split = delimiter.and_then(|d| body.iter().position(|&b| b == d));
        match split {
            Some(at) => {
                let metadata = body.split_off(at + 1);
                body.truncate(at);
                Self {
                    payload: body,
                    metadata: (!metadata.is_empty()).then_some(metadata),
                }
            }
            None => Self {
                payload: body,
                metadata: None,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    SeekingStart,
    Collecting,
    Done,
    Rejected,
}

/// Result of feeding one byte to a [`FrameScanner`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    NeedMore,
    Complete,
    /// Anchored search saw a byte that cannot start a frame
    Rejected,
}

/// Recognizes a frame in a stream of decoded bytes
#[derive(Debug, Clone)]
pub struct FrameScanner {
    start: Vec<u8>,
    end: Vec<u8>,
    delimiter: Option<u8>,
    search: StartSearch,
    phase: Phase,
    window: Vec<u8>,
    body: Vec<u8>,
}

impl FrameScanner {
    pub fn new(markers: &Markers, search: StartSearch) -> Self {
        Self {
            start: markers.start_bytes().to_vec(),
            end: markers.end_bytes().to_vec(),
            delimiter: markers.delimiter_byte(),
            search,
            phase: Phase::SeekingStart,
            window: Vec::with_capacity(markers.start.len()),
            body: Vec::new(),
        }
    }

    pub fn push(&mut self, byte: u8) -> ScanStatus {
        match self.phase {
            Phase::SeekingStart => {
                self.window.push(byte);
                match self.search {
                    StartSearch::Anchored => {
                        if self.window != self.start[..self.window.len()] {
                            self.phase = Phase::Rejected;
                            return ScanStatus::Rejected;
                        }
                    }
                    StartSearch::Scan => {
                        if self.window.len() > self.start.len() {
                            self.window.remove(0);
                        }
                    }
                }
                if self.window == self.start {
                    self.phase = Phase::Collecting;
                }
                ScanStatus::NeedMore
            }
            Phase::Collecting => {
                self.body.push(byte);
                if self.body.ends_with(&self.end) {
                    self.body.truncate(self.body.len() - self.end.len());
                    self.phase = Phase::Done;
                    ScanStatus::Complete
                } else {
                    ScanStatus::NeedMore
                }
            }
            Phase::Done => ScanStatus::Complete,
            Phase::Rejected => ScanStatus::Rejected,
        }
    }

    pub fn is_collecting(&self) -> bool {
        self.phase == Phase::Collecting
    }

    pub fn into_frame(self) -> Result<ExtractedFrame> {
        if self.phase != Phase::Done {
            return Err(KeyhopError::MarkerNotFound);
        }
        Ok(ExtractedFrame::from_body(self.body, self.delimiter))
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    find(haystack, needle).is_some()
}
