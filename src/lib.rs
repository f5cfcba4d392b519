//! # Fixed width LZW decoder and encoder
//!
//! This crate provides an [`encode::Encoder`] and a [`decode::Decoder`] for LZW streams made of fixed 16-bit code
//! words. Codes `0..=255` stand for the single bytes, every further code up to `65535` is assigned
//! in order while the data is processed. The dictionary is never transmitted: both sides rebuild
//! it from the data already seen and stop growing it once all 65536 codes are taken.
//!
//! The wire format is the bare sequence of code words, two bytes each, without header or end
//! marker. The byte order of a word is chosen with [`ByteOrder`] and defaults to little endian.
//!
//! Examplary use of the code level functions:
//!
//! ```
//! let codes = lzw16::encode::encode(b"AAAA");
//! assert_eq!(codes, [65, 256, 65]);
//!
//! let data = lzw16::decode::decode(&codes).unwrap();
//! assert_eq!(data, b"AAAA");
//! ```
//!
//! And of the stream interface:
//!
//! ```
//! use lzw16::{decode::Decoder, encode::Encoder};
//! let data = b"TOBEORNOTTOBEORTOBEORNOT";
//! let mut compressed = vec![];
//!
//! let result = Encoder::new().into_stream(&mut compressed).encode_all(&data[..]);
//! result.status.unwrap();
//!
//! let mut decompressed = vec![];
//! let result = Decoder::new().into_stream(&mut decompressed).decode_all(&compressed[..]);
//! result.status.unwrap();
//! assert_eq!(decompressed, data);
//! ```
#![forbid(unsafe_code)]

/// The number of entries a dictionary can hold, one for each 16-bit code.
pub const MAX_ENTRIES: usize = 1 << 16;

/// The first code that is not a single byte and gets assigned during coding.
pub const FIRST_FREE_CODE: Code = 256;

/// Alias for a LZW code point.
pub type Code = u16;

/// The order of the two bytes of a code word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ByteOrder {
    /// The least significant byte is written first.
    #[default]
    Little,
    /// The most significant byte is written first.
    Big,
}

/// The state of a streaming coder after a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LzwStatus {
    /// Some input was consumed or some output produced.
    Ok,
    /// Neither input could be consumed nor output produced.
    NoProgress,
    /// The stream is complete and all output has been produced.
    Done,
}

/// The result of a single call of `encode_bytes` or `decode_bytes`.
#[derive(Debug)]
pub struct StreamResult {
    /// The number of bytes consumed from the input buffer.
    pub consumed_in: usize,
    /// The number of bytes written into the output buffer.
    pub consumed_out: usize,
    /// The status after returning from the call.
    pub status: Result<LzwStatus, LzwError>,
}

/// The result of coding a whole reader into a writer.
#[derive(Debug)]
pub struct AllResult {
    /// The total number of bytes consumed from the reader.
    pub bytes_read: usize,
    /// The total number of bytes written into the writer.
    pub bytes_written: usize,
    /// The overall status of the operation.
    pub status: Result<(), Error>,
}

impl ByteOrder {
    /// The two bytes of a code word.
    pub fn code_to_bytes(self, code: Code) -> [u8; 2] {
        match self {
            ByteOrder::Little => code.to_le_bytes(),
            ByteOrder::Big => code.to_be_bytes(),
        }
    }

    /// The code of a two byte word.
    pub fn code_from_bytes(self, word: [u8; 2]) -> Code {
        match self {
            ByteOrder::Little => Code::from_le_bytes(word),
            ByteOrder::Big => Code::from_be_bytes(word),
        }
    }

    /// Serialize a code sequence into its wire form.
    pub fn write_codes(self, codes: &[Code]) -> Vec<u8> {
        codes
            .iter()
            .flat_map(|&code| self.code_to_bytes(code))
            .collect()
    }

    /// Split wire bytes into code words.
    ///
    /// A stream of odd length ends inside a code word and is rejected as a whole.
    pub fn read_codes(self, bytes: &[u8]) -> Result<Vec<Code>, LzwError> {
        let words = bytes.chunks_exact(2);
        if !words.remainder().is_empty() {
            return Err(LzwError::TrailingByte);
        }

        Ok(words
            .map(|word| self.code_from_bytes([word[0], word[1]]))
            .collect())
    }
}

mod error;

pub mod decode;
pub mod encode;
pub mod file;

pub use crate::error::{Error, LzwError};
