use bytes::{Buf, BytesMut};
use std::str;
use tokio_util::codec::{Decoder, Encoder};

use crate::frame::Frame;

static CRLF: &[u8; 2] = b"\r\n";

// Check if the frame size exceeds a certain limit to prevent DoS attacks.
const MAX_FRAME_SIZE: usize = 512 * 1024 * 1024;

/// One decoded unit of client input.
///
/// Structurally broken input decodes to `Invalid` instead of an error so the
/// connection can answer with an `ERR` reply and keep reading. A decoder
/// error would tear the framed stream down, which is exactly what a
/// malformed frame must not do.
#[derive(Debug, PartialEq)]
pub enum Request {
    /// Command name plus arguments, in order.
    Command(Vec<String>),
    Invalid,
}

/// Decodes client commands (inline and array form) and encodes [`Frame`]
/// replies. Knows nothing about command semantics.
pub struct FrameCodec;

impl Decoder for FrameCodec {
    type Item = Request;
    type Error = crate::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() > MAX_FRAME_SIZE {
            return Err("frame size exceeds limit".into());
        }

        loop {
            let Some(line_end) = find_crlf(src, 0) else {
                // Mid-line: wait for more input.
                return Ok(None);
            };

            if src[0] == b'*' {
                return decode_array(src);
            }

            // Inline mode: one whitespace-separated line is one command.
            let line = src.split_to(line_end + CRLF.len());
            let Ok(line) = str::from_utf8(&line[..line.len() - CRLF.len()]) else {
                src.clear();
                return Ok(Some(Request::Invalid));
            };

            let tokens: Vec<String> = line.split_whitespace().map(str::to_string).collect();
            if tokens.is_empty() {
                continue;
            }
            return Ok(Some(Request::Command(tokens)));
        }
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = crate::Error;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.extend_from_slice(&frame.serialize());
        Ok(())
    }
}

/// Decode `*<count>\r\n` followed by `<count>` bulk elements of the form
/// `$<len>\r\n<text>\r\n`.
///
/// Lines with a malformed `$` header are tolerated and skipped. The buffered
/// input on hand is taken as the frame: once the complete lines run out with
/// elements still owed, the frame is structurally invalid and the whole
/// buffer is discarded. A frame cut mid-line keeps waiting for input.
fn decode_array(src: &mut BytesMut) -> Result<Option<Request>, crate::Error> {
    let mut pos = 0;

    // The caller verified the header line is complete.
    let header = next_line(src, &mut pos).expect("array header line");
    let Ok(count) = str::from_utf8(&header[1..]).unwrap_or("").trim().parse::<usize>() else {
        src.clear();
        return Ok(Some(Request::Invalid));
    };

    // The count is client input; sizing the buffer from it would let one
    // bogus header allocate gigabytes.
    let mut args = Vec::new();
    while args.len() < count {
        let Some(line) = next_line(src, &mut pos) else {
            if pos < src.len() {
                // Trailing partial line: the rest of the frame may still
                // be in flight.
                return Ok(None);
            }
            src.clear();
            return Ok(Some(Request::Invalid));
        };

        let is_bulk_header = line.first() == Some(&b'$')
            && str::from_utf8(&line[1..])
                .ok()
                .and_then(|len| len.parse::<usize>().ok())
                .is_some();
        if !is_bulk_header {
            continue;
        }

        let Some(data) = next_line(src, &mut pos) else {
            if pos < src.len() {
                return Ok(None);
            }
            src.clear();
            return Ok(Some(Request::Invalid));
        };
        match str::from_utf8(data) {
            Ok(data) => args.push(data.to_string()),
            Err(_) => {
                src.clear();
                return Ok(Some(Request::Invalid));
            }
        }
    }

    src.advance(pos);
    Ok(Some(Request::Command(args)))
}

fn next_line<'a>(src: &'a BytesMut, pos: &mut usize) -> Option<&'a [u8]> {
    let start = *pos;
    let end = find_crlf(src, start)?;
    *pos = end + CRLF.len();
    Some(&src[start..end])
}

fn find_crlf(src: &[u8], from: usize) -> Option<usize> {
    src[from..]
        .windows(CRLF.len())
        .position(|window| window == CRLF)
        .map(|index| from + index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(input: &[u8]) -> (Option<Request>, BytesMut) {
        let mut buf = BytesMut::from(input);
        let decoded = FrameCodec.decode(&mut buf).unwrap();
        (decoded, buf)
    }

    fn command(parts: &[&str]) -> Request {
        Request::Command(parts.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn decode_array_command() {
        let (decoded, rest) = decode(b"*3\r\n$3\r\nSET\r\n$3\r\nfoo\r\n$3\r\nbar\r\n");
        assert_eq!(decoded, Some(command(&["SET", "foo", "bar"])));
        assert!(rest.is_empty());
    }

    #[test]
    fn decode_inline_command() {
        let (decoded, rest) = decode(b"SET foo bar\r\n");
        assert_eq!(decoded, Some(command(&["SET", "foo", "bar"])));
        assert!(rest.is_empty());
    }

    #[test]
    fn decode_inline_collapses_extra_whitespace() {
        let (decoded, _) = decode(b"  GET   foo \r\n");
        assert_eq!(decoded, Some(command(&["GET", "foo"])));
    }

    #[test]
    fn decode_skips_blank_inline_lines() {
        let (decoded, _) = decode(b"\r\nPING\r\n");
        assert_eq!(decoded, Some(command(&["PING"])));
    }

    #[test]
    fn decode_waits_for_a_complete_line() {
        let (decoded, rest) = decode(b"GET fo");
        assert_eq!(decoded, None);
        assert_eq!(&rest[..], b"GET fo");
    }

    #[test]
    fn decode_waits_for_an_array_cut_mid_line() {
        let (decoded, rest) = decode(b"*2\r\n$3\r\nfoo\r\n$3\r\nba");
        assert_eq!(decoded, None);
        assert!(!rest.is_empty());
    }

    #[test]
    fn decode_resumes_once_the_rest_arrives() {
        let mut buf = BytesMut::from(&b"*2\r\n$4\r\nECHO\r\n$2\r\nhi"[..]);
        assert_eq!(FrameCodec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"\r\n");
        assert_eq!(
            FrameCodec.decode(&mut buf).unwrap(),
            Some(command(&["ECHO", "hi"]))
        );
    }

    #[test]
    fn truncated_array_is_invalid_not_a_hang() {
        // Count says 3, one element present, input ends at a line boundary.
        let (decoded, rest) = decode(b"*3\r\n$3\r\nfoo\r\n");
        assert_eq!(decoded, Some(Request::Invalid));
        assert!(rest.is_empty());
    }

    #[test]
    fn malformed_count_header_is_invalid() {
        let (decoded, _) = decode(b"*x\r\n$3\r\nfoo\r\n");
        assert_eq!(decoded, Some(Request::Invalid));
    }

    #[test]
    fn malformed_length_headers_are_skipped() {
        let (decoded, _) = decode(b"*1\r\n$abc\r\n$3\r\nfoo\r\n");
        assert_eq!(decoded, Some(command(&["foo"])));
    }

    #[test]
    fn decode_pipelined_commands_one_at_a_time() {
        let mut buf = BytesMut::from(&b"*1\r\n$4\r\nPING\r\n*2\r\n$4\r\nECHO\r\n$2\r\nhi\r\n"[..]);

        assert_eq!(FrameCodec.decode(&mut buf).unwrap(), Some(command(&["PING"])));
        assert_eq!(
            FrameCodec.decode(&mut buf).unwrap(),
            Some(command(&["ECHO", "hi"]))
        );
        assert_eq!(FrameCodec.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn encode_writes_serialized_frame() {
        let mut dst = BytesMut::new();
        FrameCodec
            .encode(Frame::Simple("OK".to_string()), &mut dst)
            .unwrap();
        assert_eq!(&dst[..], b"+OK\r\n");
    }
}
