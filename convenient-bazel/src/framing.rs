//! Length-delimited frame decoding for streamed query output
//!
//! `bazel query --output streamed_proto` writes each record as a LEB128
//! varint length prefix followed by exactly that many payload bytes.
//! [`FrameDecoder`] splits such a byte stream back into discrete frames
//! without any knowledge of the payload structure.

use crate::error::{QueryError, QueryResult};
use bytes::Bytes;
use std::io::{self, Read};

/// Decodes a byte stream into an ordered sequence of length-delimited frames
///
/// The decoder is lazy, finite, and non-restartable: it yields one frame
/// per `next()` call and terminates cleanly when end-of-stream is reached
/// at a frame boundary. A frame whose declared length cannot be satisfied
/// before stream exhaustion yields [`QueryError::MalformedStream`] and
/// fuses the iterator. At most one frame is buffered at a time, so
/// arbitrarily long streams decode in constant memory.
pub struct FrameDecoder<R> {
    reader: R,
    offset: u64,
    fused: bool,
}

impl<R: Read> FrameDecoder<R> {
    /// Wrap a readable byte stream
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            offset: 0,
            fused: false,
        }
    }

    /// Byte offset of the next unread position in the stream
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read one byte, or `None` on end-of-stream
    fn read_byte(&mut self) -> QueryResult<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.offset += 1;
                    return Ok(Some(byte[0]));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(QueryError::process("reading query stream", e)),
            }
        }
    }

    /// Decode the remainder of a LEB128 length prefix whose first byte is `first`
    fn read_length_prefix(&mut self, first: u8, frame_start: u64) -> QueryResult<u64> {
        let mut value = u64::from(first & 0x7f);
        let mut shift = 7u32;
        let mut byte = first;
        while byte & 0x80 != 0 {
            if shift > 63 {
                return Err(QueryError::MalformedStream { offset: frame_start });
            }
            byte = match self.read_byte()? {
                Some(b) => b,
                None => return Err(QueryError::MalformedStream { offset: frame_start }),
            };
            // A u64 length fits in ten LEB128 bytes; the tenth may only carry one bit.
            if shift == 63 && byte & 0x7f > 1 {
                return Err(QueryError::MalformedStream { offset: frame_start });
            }
            value |= u64::from(byte & 0x7f) << shift;
            shift += 7;
        }
        Ok(value)
    }

    fn read_frame(&mut self) -> QueryResult<Option<Bytes>> {
        let frame_start = self.offset;
        let first = match self.read_byte()? {
            Some(b) => b,
            // End-of-stream at a frame boundary terminates the sequence cleanly.
            None => return Ok(None),
        };
        let declared = self.read_length_prefix(first, frame_start)?;
        let len = usize::try_from(declared)
            .map_err(|_| QueryError::MalformedStream { offset: frame_start })?;

        let mut payload = vec![0u8; len];
        match self.reader.read_exact(&mut payload) {
            Ok(()) => {
                self.offset += declared;
                Ok(Some(Bytes::from(payload)))
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                Err(QueryError::MalformedStream { offset: frame_start })
            }
            Err(e) => Err(QueryError::process("reading query stream", e)),
        }
    }
}

impl<R: Read> Iterator for FrameDecoder<R> {
    type Item = QueryResult<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.fused {
            return None;
        }
        match self.read_frame() {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                self.fused = true;
                None
            }
            Err(e) => {
                self.fused = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Frame a sequence of payloads the way `streamed_proto` does
    fn frame(payloads: &[&[u8]]) -> Vec<u8> {
        let mut buf = Vec::new();
        for payload in payloads {
            prost::encoding::encode_varint(payload.len() as u64, &mut buf);
            buf.extend_from_slice(payload);
        }
        buf
    }

    #[test]
    fn round_trips_framed_payloads_in_order() {
        let big = vec![0xabu8; 300];
        let payloads: Vec<&[u8]> = vec![b"first", b"", b"third", &big];
        let stream = frame(&payloads);

        let decoded: Vec<Bytes> = FrameDecoder::new(stream.as_slice())
            .collect::<QueryResult<_>>()
            .unwrap();

        assert_eq!(decoded.len(), payloads.len());
        for (got, want) in decoded.iter().zip(&payloads) {
            assert_eq!(got.as_ref(), *want);
        }
    }

    #[test]
    fn empty_stream_yields_no_frames() {
        let mut decoder = FrameDecoder::new([].as_slice());
        assert!(decoder.next().is_none());
    }

    #[test]
    fn truncated_payload_is_malformed_not_a_short_read() {
        // Declares 10 payload bytes but the stream ends after 4.
        let stream = [10u8, b'a', b'b', b'c', b'd'];
        let mut decoder = FrameDecoder::new(stream.as_slice());

        match decoder.next() {
            Some(Err(QueryError::MalformedStream { offset })) => assert_eq!(offset, 0),
            other => panic!("expected MalformedStream, got {other:?}"),
        }
        // The iterator fuses after a framing violation.
        assert!(decoder.next().is_none());
    }

    #[test]
    fn stream_ending_inside_length_prefix_is_malformed() {
        let good = frame(&[b"ok"]);
        let mut stream = good.clone();
        stream.push(0x80); // continuation bit set, then EOF

        let mut decoder = FrameDecoder::new(stream.as_slice());
        assert_eq!(decoder.next().unwrap().unwrap().as_ref(), b"ok");
        match decoder.next() {
            Some(Err(QueryError::MalformedStream { offset })) => {
                assert_eq!(offset, good.len() as u64);
            }
            other => panic!("expected MalformedStream, got {other:?}"),
        }
    }

    #[test]
    fn oversized_length_prefix_is_malformed() {
        // Eleven continuation bytes cannot be a u64 length.
        let stream = [0xffu8; 11];
        let mut decoder = FrameDecoder::new(stream.as_slice());
        assert!(matches!(
            decoder.next(),
            Some(Err(QueryError::MalformedStream { offset: 0 }))
        ));
    }

    #[test]
    fn tracks_stream_offset_across_frames() {
        let stream = frame(&[b"abc", b"defgh"]);
        let mut decoder = FrameDecoder::new(stream.as_slice());
        let _ = decoder.next().unwrap().unwrap();
        assert_eq!(decoder.offset(), 4); // 1-byte prefix + 3 payload bytes
        let _ = decoder.next().unwrap().unwrap();
        assert_eq!(decoder.offset(), 10);
    }
}
