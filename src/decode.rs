//! A module for all decoding needs.
use crate::{AllResult, ByteOrder, Code, Error, LzwError, LzwStatus, StreamResult, MAX_ENTRIES};

use std::io::{BufRead, Write};

/// Decode a whole code sequence into the original bytes.
///
/// Fails on the first code that is neither defined nor the code about to be defined.
pub fn decode(codes: &[Code]) -> Result<Vec<u8>, LzwError> {
    let mut state = DecodeState::new();
    let mut data = Vec::with_capacity(codes.len() * 2);
    for &code in codes {
        data.extend_from_slice(state.advance(code)?);
    }
    Ok(data)
}

/// An incremental decoder reading code words from bytes.
pub struct Decoder {
    state: DecodeState,
    /// The byte order of incoming code words.
    order: ByteOrder,
    /// The first byte of a code word split across input buffers.
    partial: Option<u8>,
    /// If the input has been marked complete.
    has_ended: bool,
    /// If the end of the stream has been reported.
    is_done: bool,
    /// The error that stopped decoding, reported again by every later call.
    failed: Option<LzwError>,
}

/// A decoding stream sink.
///
/// See [`Decoder::into_stream`] on how to create this type and more information.
pub struct IntoStream<'d, W> {
    decoder: &'d mut Decoder,
    writer: W,
}

struct DecodeState {
    /// The table of decoded codes.
    table: Table,
    /// The string of the last code, not yet fully handed out.
    buffer: Buffer,
    /// The last code, the prefix of the next table entry.
    last: Option<Code>,
}

#[derive(Clone, Copy)]
struct Link {
    prefix: Code,
    byte: u8,
}

struct Table {
    inner: Vec<Link>,
    depths: Vec<u16>,
}

struct Buffer {
    bytes: Vec<u8>,
    read_mark: usize,
}

impl Decoder {
    /// Create a decoder reading little endian code words.
    pub fn new() -> Self {
        Self::with_byte_order(ByteOrder::Little)
    }

    /// Create a decoder reading code words in the given byte order.
    pub fn with_byte_order(order: ByteOrder) -> Self {
        Decoder {
            state: DecodeState::new(),
            order,
            partial: None,
            has_ended: false,
            is_done: false,
            failed: None,
        }
    }

    /// Decode some bytes from `inp` into `out`.
    ///
    /// All of `inp` can be consumed, half a code word is kept for the next call. Decoded strings
    /// that do not fit into `out` are handed out by the next calls before any further input is
    /// consumed. See [`into_stream`] for the high-level interface.
    ///
    /// Both the end of the stream and an error are final: later calls consume nothing and
    /// report the same status again.
    ///
    /// [`into_stream`]: #method.into_stream
    pub fn decode_bytes(&mut self, mut inp: &[u8], mut out: &mut [u8]) -> StreamResult {
        if let Some(err) = self.failed {
            return StreamResult {
                consumed_in: 0,
                consumed_out: 0,
                status: Err(err),
            };
        }

        if self.is_done {
            return StreamResult {
                consumed_in: 0,
                consumed_out: 0,
                status: Ok(LzwStatus::Done),
            };
        }

        let c_in = inp.len();
        let c_out = out.len();
        let mut status = Ok(LzwStatus::Ok);

        loop {
            let remain = self.state.buffer.buffer();
            let count = remain.len().min(out.len());
            let (into, tail) = core::mem::take(&mut out).split_at_mut(count);
            into.copy_from_slice(&remain[..count]);
            out = tail;
            self.state.buffer.consume(count);

            if !self.state.buffer.buffer().is_empty() {
                break;
            }

            let code = match self.next_word(&mut inp) {
                Some(code) => code,
                None => break,
            };

            if let Err(err) = self.state.advance(code) {
                status = Err(err);
                break;
            }
        }

        let drained = inp.is_empty() && self.state.buffer.buffer().is_empty();
        if status.is_ok() && self.has_ended && drained {
            status = match self.partial {
                Some(_) => Err(LzwError::TrailingByte),
                None => Ok(LzwStatus::Done),
            };
        }

        let consumed_in = c_in - inp.len();
        let consumed_out = c_out - out.len();
        match status {
            Ok(LzwStatus::Done) => self.is_done = true,
            Err(err) => self.failed = Some(err),
            Ok(_) => {}
        }
        if status == Ok(LzwStatus::Ok) && consumed_in == 0 && consumed_out == 0 && !drained {
            status = Ok(LzwStatus::NoProgress);
        }

        StreamResult {
            consumed_in,
            consumed_out,
            status,
        }
    }

    /// Construct a decoder into a writer.
    pub fn into_stream<W: Write>(&mut self, writer: W) -> IntoStream<'_, W> {
        IntoStream {
            decoder: self,
            writer,
        }
    }

    /// Mark the end of the code stream.
    ///
    /// Once all pending output is handed out, `decode_bytes` reports `Done`, or fails if the
    /// stream stopped in the middle of a code word.
    pub fn finish(&mut self) {
        self.has_ended = true;
    }

    /// If the end of the stream has been reported.
    pub fn is_done(&self) -> bool {
        self.is_done
    }

    fn next_word(&mut self, inp: &mut &[u8]) -> Option<Code> {
        let word = match (self.partial.take(), *inp) {
            (Some(first), [second, rest @ ..]) => {
                *inp = rest;
                [first, *second]
            }
            (None, [first, second, rest @ ..]) => {
                *inp = rest;
                [*first, *second]
            }
            (None, [first]) => {
                self.partial = Some(*first);
                *inp = &[];
                return None;
            }
            (partial, _) => {
                self.partial = partial;
                return None;
            }
        };

        Some(self.order.code_from_bytes(word))
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Decoder::new()
    }
}

impl<W: Write> IntoStream<'_, W> {
    /// Decode all code words of a reader.
    ///
    /// The end of the reader is the end of the code stream.
    pub fn decode_all(self, mut read: impl BufRead) -> AllResult {
        let IntoStream {
            decoder,
            mut writer,
        } = self;

        enum Progress {
            Ok,
            Done,
        }

        let mut bytes_read = 0;
        let mut bytes_written = 0;

        let read_bytes = &mut bytes_read;
        let write_bytes = &mut bytes_written;

        let mut outbuf = vec![0; 1 << 16];
        let once = move || -> Result<Progress, Error> {
            let data = read.fill_buf()?;

            if data.is_empty() {
                decoder.finish();
            }

            let result = decoder.decode_bytes(data, &mut outbuf[..]);
            *read_bytes += result.consumed_in;
            *write_bytes += result.consumed_out;
            read.consume(result.consumed_in);

            // Whatever was decoded before an error is dropped with the error.
            let done = result.status?;
            writer.write_all(&outbuf[..result.consumed_out])?;

            match done {
                LzwStatus::Done => Ok(Progress::Done),
                LzwStatus::Ok | LzwStatus::NoProgress => Ok(Progress::Ok),
            }
        };

        let status = core::iter::repeat_with(once)
            .map_while(|result| match result {
                Ok(Progress::Ok) => Some(Ok(())),
                Err(err) => Some(Err(err)),
                Ok(Progress::Done) => None,
            })
            .collect();

        AllResult {
            bytes_read,
            bytes_written,
            status,
        }
    }
}

impl DecodeState {
    fn new() -> Self {
        DecodeState {
            table: Table::new(),
            buffer: Buffer::new(),
            last: None,
        }
    }

    /// Decode one code, returning its complete string.
    fn advance(&mut self, code: Code) -> Result<&[u8], LzwError> {
        let last = match self.last {
            Some(last) => last,
            None => {
                if !self.table.contains(code) {
                    return Err(self.table.invalid(code));
                }
                self.buffer.reconstruct(&self.table, code);
                self.last = Some(code);
                return Ok(self.buffer.buffer());
            }
        };

        let first = if self.table.contains(code) {
            self.buffer.reconstruct(&self.table, code)
        } else if u32::from(code) == self.table.next_code() {
            // The encoder defined this code in the very step that emitted `last`, so its string
            // is the one of `last` followed by its own first byte.
            let first = self.buffer.reconstruct(&self.table, last);
            self.buffer.bytes.push(first);
            first
        } else {
            return Err(self.table.invalid(code));
        };

        if !self.table.is_full() {
            self.table.derive(last, first);
        }

        self.last = Some(code);
        Ok(self.buffer.buffer())
    }
}

impl Buffer {
    fn new() -> Self {
        Buffer {
            bytes: Vec::with_capacity(MAX_ENTRIES),
            read_mark: 0,
        }
    }

    /// Write the string of `code` into the buffer, returning its first byte.
    fn reconstruct(&mut self, table: &Table, code: Code) -> u8 {
        let depth = usize::from(table.depths[usize::from(code)]);
        self.bytes.clear();
        self.bytes.resize(depth, 0);
        self.read_mark = 0;

        let mut code_iter = code;
        for ch in self.bytes.iter_mut().rev() {
            let entry = table.inner[usize::from(code_iter)];
            *ch = entry.byte;
            code_iter = entry.prefix;
        }
        self.bytes[0]
    }

    fn buffer(&self) -> &[u8] {
        &self.bytes[self.read_mark..]
    }

    fn consume(&mut self, amt: usize) {
        self.read_mark += amt;
    }
}

impl Table {
    fn new() -> Self {
        let mut inner = Vec::with_capacity(MAX_ENTRIES);
        let mut depths = Vec::with_capacity(MAX_ENTRIES);
        for i in 0..=255u8 {
            inner.push(Link::base(i));
            depths.push(1);
        }
        Table { inner, depths }
    }

    fn contains(&self, code: Code) -> bool {
        usize::from(code) < self.inner.len()
    }

    fn next_code(&self) -> u32 {
        self.inner.len() as u32
    }

    fn is_full(&self) -> bool {
        self.inner.len() >= MAX_ENTRIES
    }

    fn invalid(&self, code: Code) -> LzwError {
        LzwError::InvalidCode {
            code,
            next_code: self.next_code(),
        }
    }

    fn derive(&mut self, prefix: Code, byte: u8) {
        let depth = self.depths[usize::from(prefix)] + 1;
        self.inner.push(Link { prefix, byte });
        self.depths.push(depth);

        if self.is_full() {
            tracing::debug!(entries = self.inner.len(), "decoder dictionary is full");
        }
    }
}

impl Link {
    fn base(byte: u8) -> Self {
        Link {
            prefix: Code::from(byte),
            byte,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{decode, DecodeState, Decoder};
    use crate::{encode::encode, ByteOrder, Code, LzwError, LzwStatus, MAX_ENTRIES};

    #[test]
    fn empty_input() {
        assert_eq!(decode(&[]), Ok(vec![]));

        let mut decoder = Decoder::new();
        decoder.finish();
        let result = decoder.decode_bytes(&[], &mut [0; 4]);
        assert_eq!(result.consumed_out, 0);
        assert!(matches!(result.status, Ok(LzwStatus::Done)));
    }

    #[test]
    fn base_codes_are_single_bytes() {
        for byte in 0..=255u8 {
            assert_eq!(decode(&[Code::from(byte)]), Ok(vec![byte]));
        }
    }

    #[test]
    fn code_before_its_definition() {
        assert_eq!(decode(&[65, 256, 65]), Ok(b"AAAA".to_vec()));
        assert_eq!(decode(&[65, 256, 257]), Ok(b"AAAAAA".to_vec()));
    }

    #[test]
    fn corrupt_codes_rejected() {
        assert_eq!(
            decode(&[65, 257]),
            Err(LzwError::InvalidCode {
                code: 257,
                next_code: 256
            })
        );
        assert_eq!(
            decode(&[256]),
            Err(LzwError::InvalidCode {
                code: 256,
                next_code: 256
            })
        );
        assert_eq!(
            decode(&[65, 66, 67, 300]),
            Err(LzwError::InvalidCode {
                code: 300,
                next_code: 258
            })
        );
    }

    #[test]
    fn table_stops_at_capacity() {
        let mut state = DecodeState::new();
        state.advance(0).unwrap();
        for _ in 0..MAX_ENTRIES {
            state.advance(1).unwrap();
            assert!(state.table.inner.len() <= MAX_ENTRIES);
        }
        assert_eq!(state.table.inner.len(), MAX_ENTRIES);
        assert_eq!(state.advance(u16::MAX).unwrap(), [1, 1]);
    }

    #[test]
    fn stream_with_tiny_buffers() {
        let data = b"TOBEORNOTTOBEORTOBEORNOT#TOBEORNOTTOBEORTOBEORNOT";
        let wire = ByteOrder::Little.write_codes(&encode(data));

        let mut decoder = Decoder::new();
        let mut decoded = vec![];
        let mut out = [0; 3];
        for chunk in wire.chunks(3) {
            let mut inp = chunk;
            loop {
                let result = decoder.decode_bytes(inp, &mut out);
                inp = &inp[result.consumed_in..];
                decoded.extend_from_slice(&out[..result.consumed_out]);
                assert!(result.status.is_ok());
                if inp.is_empty() && result.consumed_out < out.len() {
                    break;
                }
            }
        }

        decoder.finish();
        loop {
            let result = decoder.decode_bytes(&[], &mut out);
            decoded.extend_from_slice(&out[..result.consumed_out]);
            if let Ok(LzwStatus::Done) = result.status {
                break;
            }
        }
        assert_eq!(decoded, data);
    }

    #[test]
    fn nothing_accepted_after_end() {
        let mut decoder = Decoder::new();
        decoder.finish();
        let mut out = [0; 16];
        let result = decoder.decode_bytes(&[65, 0], &mut out);
        assert_eq!(result.consumed_out, 1);
        assert_eq!(result.status, Ok(LzwStatus::Done));
        assert!(decoder.is_done());

        let result = decoder.decode_bytes(&[66, 0, 67, 0], &mut out);
        assert_eq!(result.consumed_in, 0);
        assert_eq!(result.consumed_out, 0);
        assert_eq!(result.status, Ok(LzwStatus::Done));
    }

    #[test]
    fn errors_are_final() {
        let mut decoder = Decoder::new();
        let mut out = [0; 16];
        let invalid = LzwError::InvalidCode {
            code: 999,
            next_code: 256,
        };
        let result = decoder.decode_bytes(&[65, 0, 0xe7, 0x03], &mut out);
        assert_eq!(result.status, Err(invalid));

        // Code 256 would otherwise be taken as the string of the stale last code.
        let result = decoder.decode_bytes(&[66, 0, 0, 1], &mut out);
        assert_eq!(result.consumed_in, 0);
        assert_eq!(result.consumed_out, 0);
        assert_eq!(result.status, Err(invalid));

        decoder.finish();
        assert_eq!(decoder.decode_bytes(&[], &mut out).status, Err(invalid));
    }

    #[test]
    fn trailing_byte_rejected() {
        let mut decoder = Decoder::new();
        decoder.finish();
        let result = decoder.decode_bytes(&[65, 0, 66], &mut [0; 16]);
        assert_eq!(result.consumed_in, 3);
        assert_eq!(result.status, Err(LzwError::TrailingByte));
    }
}
