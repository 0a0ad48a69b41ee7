//! ICY (SHOUTcast/Icecast) in-band metadata.
//!
//! With `Icy-MetaData: 1` the server interleaves a metadata block after
//! every `icy-metaint` audio bytes:
//!
//! ```text
//! [metaint audio bytes][len][len * 16 bytes of metadata][metaint audio bytes]...
//! ```
//!
//! The metadata text looks like `StreamTitle='Artist - Title';StreamUrl='...';`
//! and is NUL-padded to a multiple of 16 bytes. A zero length byte means
//! "unchanged".

use bridge_traits::StreamMetadata;
use bytes::{Bytes, BytesMut};

/// Output of [`IcyDemuxer::push`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IcyChunk {
    Audio(Bytes),
    Metadata(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Audio bytes left before the next length byte.
    Audio(usize),
    /// Waiting for the length byte.
    Length,
    /// Metadata bytes left to collect.
    Metadata(usize),
}

/// Splits an ICY response body into audio and metadata.
#[derive(Debug)]
pub struct IcyDemuxer {
    metaint: usize,
    phase: Phase,
    pending: BytesMut,
}

impl IcyDemuxer {
    /// `metaint` must be non-zero; use pass-through handling when the server
    /// did not announce one.
    pub fn new(metaint: usize) -> Self {
        Self {
            metaint,
            phase: Phase::Audio(metaint),
            pending: BytesMut::new(),
        }
    }

    pub fn push(&mut self, mut chunk: Bytes) -> Vec<IcyChunk> {
        let mut out = Vec::new();

        while !chunk.is_empty() {
            match self.phase {
                Phase::Audio(remaining) => {
                    let take = remaining.min(chunk.len());
                    out.push(IcyChunk::Audio(chunk.split_to(take)));
                    self.phase = if take == remaining {
                        Phase::Length
                    } else {
                        Phase::Audio(remaining - take)
                    };
                }
                Phase::Length => {
                    let length = chunk.split_to(1)[0] as usize * 16;
                    self.phase = if length == 0 {
                        Phase::Audio(self.metaint)
                    } else {
                        Phase::Metadata(length)
                    };
                }
                Phase::Metadata(remaining) => {
                    let take = remaining.min(chunk.len());
                    self.pending.extend_from_slice(&chunk.split_to(take));
                    if take == remaining {
                        let block = self.pending.split();
                        let text = String::from_utf8_lossy(&block)
                            .trim_end_matches('\0')
                            .to_string();
                        if !text.is_empty() {
                            out.push(IcyChunk::Metadata(text));
                        }
                        self.phase = Phase::Audio(self.metaint);
                    } else {
                        self.phase = Phase::Metadata(remaining - take);
                    }
                }
            }
        }

        out
    }
}

/// Value of `StreamTitle='...'` in a metadata block.
pub fn stream_title(block: &str) -> Option<&str> {
    const KEY: &str = "StreamTitle='";
    let start = block.find(KEY)? + KEY.len();
    let rest = &block[start..];
    // Titles may contain quotes; the field ends at the first `';`.
    let end = rest.find("';").unwrap_or_else(|| rest.trim_end_matches('\'').len());
    Some(&rest[..end])
}

/// Interpret a raw stream title. `Artist - Title` is split on the first
/// ` - `; anything else is a bare title.
///
/// `StreamTitle` carries the track, never the station, so no display title
/// is reported. Station identity comes from the `icy-name` header.
pub fn parse_stream_title(raw: &str) -> StreamMetadata {
    let raw = raw.trim();
    let (artist, title) = match raw.split_once(" - ") {
        Some((artist, title)) => (non_blank(artist), non_blank(title)),
        None => (None, non_blank(raw)),
    };

    StreamMetadata {
        artist,
        title,
        station: None,
        display_title: None,
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
