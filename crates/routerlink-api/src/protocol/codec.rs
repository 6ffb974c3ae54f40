//! Length-prefixed word framing for the RouterOS API.
//!
//! A word is a variable-width length prefix followed by that many bytes.
//! A sentence is a run of words closed by a zero-length word. [`ApiCodec`]
//! turns a byte stream into [`Sentence`]s and back, for use with
//! [`tokio_util::codec::Framed`].

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use super::Sentence;
use crate::error::Error;

/// Largest word accepted from the wire.
pub const MAX_WORD_LEN: usize = 16 * 1024 * 1024;

/// Stateless sentence codec.
#[derive(Debug, Default, Clone, Copy)]
pub struct ApiCodec;

impl ApiCodec {
    pub fn new() -> Self {
        Self
    }
}

/// Append the length prefix for a word of `len` bytes.
#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
pub fn encode_length(len: usize, dst: &mut BytesMut) -> Result<(), Error> {
    match len {
        0..0x80 => dst.put_u8(len as u8),
        0x80..0x4000 => dst.put_u16(len as u16 | 0x8000),
        0x4000..0x20_0000 => {
            let v = len as u32 | 0x00C0_0000;
            dst.put_u8((v >> 16) as u8);
            dst.put_u16(v as u16);
        }
        0x20_0000..0x1000_0000 => dst.put_u32(len as u32 | 0xE000_0000),
        _ => {
            let len = u32::try_from(len)
                .map_err(|_| Error::Protocol(format!("word of {len} bytes is too long")))?;
            dst.put_u8(0xF0);
            dst.put_u32(len);
        }
    }
    Ok(())
}

/// Decode a length prefix at the start of `buf`.
///
/// Returns `(word_len, prefix_len)`, or `None` if the prefix is incomplete.
pub fn decode_length(buf: &[u8]) -> Result<Option<(usize, usize)>, Error> {
    let Some(&first) = buf.first() else {
        return Ok(None);
    };

    let (extra, mask) = match first {
        0x00..=0x7F => (0, 0x7F),
        0x80..=0xBF => (1, 0x3F),
        0xC0..=0xDF => (2, 0x1F),
        0xE0..=0xEF => (3, 0x0F),
        0xF0 => (4, 0x00),
        control => {
            return Err(Error::Protocol(format!(
                "unexpected control byte 0x{control:02X}"
            )));
        }
    };

    if buf.len() < 1 + extra {
        return Ok(None);
    }

    let len = buf
        .iter()
        .skip(1)
        .take(extra)
        .fold(usize::from(first & mask), |acc, &b| (acc << 8) | usize::from(b));

    Ok(Some((len, 1 + extra)))
}

impl Decoder for ApiCodec {
    type Item = Sentence;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Sentence>, Error> {
        let mut offset = 0;
        let mut words = Vec::new();

        loop {
            let Some((len, prefix)) = decode_length(&src[offset..])? else {
                return Ok(None);
            };
            if len > MAX_WORD_LEN {
                return Err(Error::Protocol(format!(
                    "word of {len} bytes exceeds the {MAX_WORD_LEN} byte limit"
                )));
            }

            let start = offset + prefix;
            let end = start + len;
            if src.len() < end {
                src.reserve(end - src.len());
                return Ok(None);
            }

            if len == 0 {
                src.advance(start);
                return Ok(Some(Sentence::from_words(words)));
            }

            words.push(String::from_utf8_lossy(&src[start..end]).into_owned());
            offset = end;
        }
    }
}

impl Encoder<Sentence> for ApiCodec {
    type Error = Error;

    fn encode(&mut self, item: Sentence, dst: &mut BytesMut) -> Result<(), Error> {
        for word in item.words() {
            encode_length(word.len(), dst)?;
            dst.put_slice(word.as_bytes());
        }
        dst.put_u8(0);
        Ok(())
    }
}
