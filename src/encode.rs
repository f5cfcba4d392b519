//! A module for all encoding needs.
use crate::{
    AllResult, ByteOrder, Code, Error, LzwStatus, StreamResult, FIRST_FREE_CODE, MAX_ENTRIES,
};

use std::io::{self, BufRead, Write};

/// Encode a whole byte sequence into its code sequence.
///
/// Empty input produces no codes at all.
pub fn encode(data: &[u8]) -> Vec<Code> {
    let mut state = EncodeState::new();
    let mut codes: Vec<Code> = data.iter().filter_map(|&byte| state.push(byte)).collect();
    codes.extend(state.flush());
    codes
}

/// An incremental encoder writing code words as bytes.
pub struct Encoder {
    state: EncodeState,
    /// The byte order of emitted code words.
    order: ByteOrder,
    /// If the input has been marked complete.
    has_ended: bool,
    /// If the final code has been written.
    is_done: bool,
}

/// A encoding stream sink.
///
/// See [`Encoder::into_stream`] on how to create this type and more information.
pub struct IntoStream<'d, W> {
    encoder: &'d mut Encoder,
    writer: W,
}

struct EncodeState {
    /// The current encoding symbol tree.
    tree: Tree,
    /// The code corresponding to the currently matched characters.
    current_code: Option<Code>,
}

/// One tree node for at most each code.
/// To avoid using too much memory we keep nodes with few successors in optimized form. This form
/// doesn't offer lookup by indexing but instead does a linear search.
#[derive(Default)]
struct Tree {
    simples: Vec<Simple>,
    complex: Vec<Full>,
    keys: Vec<FullKey>,
}

#[derive(Clone, Copy)]
enum FullKey {
    NoSuccessor,
    Simple(u16),
    Full(u16),
}

const SHORT: usize = 16;

/// Successors are always assigned codes and never single bytes, so this marks an empty slot.
const NO_CODE: Code = 0;

#[derive(Clone, Copy)]
struct Simple {
    codes: [Code; SHORT],
    chars: [u8; SHORT],
    count: u8,
}

#[derive(Clone, Copy)]
struct Full {
    char_continuation: [Code; 256],
}

impl Encoder {
    /// Create an encoder writing little endian code words.
    pub fn new() -> Self {
        Self::with_byte_order(ByteOrder::Little)
    }

    /// Create an encoder writing code words in the given byte order.
    pub fn with_byte_order(order: ByteOrder) -> Self {
        Encoder {
            state: EncodeState::new(),
            order,
            has_ended: false,
            is_done: false,
        }
    }

    /// Encode some bytes from `inp` into `out`.
    ///
    /// Only whole code words are written, a byte is consumed only while there is room for the
    /// code it may complete. See [`into_stream`] for the high-level interface and [`finish`] for
    /// marking the input data as complete.
    ///
    /// [`into_stream`]: #method.into_stream
    /// [`finish`]: #method.finish
    pub fn encode_bytes(&mut self, mut inp: &[u8], mut out: &mut [u8]) -> StreamResult {
        let c_in = inp.len();
        let c_out = out.len();

        if self.is_done {
            return StreamResult {
                consumed_in: 0,
                consumed_out: 0,
                status: Ok(LzwStatus::Done),
            };
        }

        while out.len() >= 2 {
            let (&byte, rest) = match inp.split_first() {
                Some(split) => split,
                None => break,
            };
            inp = rest;

            if let Some(code) = self.state.push(byte) {
                self.write_code(code, &mut out);
            }
        }

        if inp.is_empty() && self.has_ended && out.len() >= 2 {
            if let Some(code) = self.state.flush() {
                self.write_code(code, &mut out);
            }
            self.is_done = true;
        }

        let consumed_in = c_in - inp.len();
        let consumed_out = c_out - out.len();
        let status = if self.is_done {
            LzwStatus::Done
        } else if consumed_in == 0 && consumed_out == 0 && (!inp.is_empty() || self.has_ended) {
            LzwStatus::NoProgress
        } else {
            LzwStatus::Ok
        };

        StreamResult {
            consumed_in,
            consumed_out,
            status: Ok(status),
        }
    }

    /// Construct an encoder into a writer.
    pub fn into_stream<W: Write>(&mut self, writer: W) -> IntoStream<'_, W> {
        IntoStream {
            encoder: self,
            writer,
        }
    }

    /// Mark the encoding as finished.
    ///
    /// In following calls to `encode_bytes` the encoder will emit the code of the last pending
    /// match after encoding all of `inp`. Once that code is written the encoder is done and
    /// accepts no further input.
    pub fn finish(&mut self) {
        self.has_ended = true;
    }

    /// If the final code has been written.
    pub fn is_done(&self) -> bool {
        self.is_done
    }

    fn write_code(&self, code: Code, out: &mut &mut [u8]) {
        let (word, tail) = core::mem::take(out).split_at_mut(2);
        word.copy_from_slice(&self.order.code_to_bytes(code));
        *out = tail;
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Encoder::new()
    }
}

impl<W: Write> IntoStream<'_, W> {
    /// Encode all data from a reader, including the final pending code.
    pub fn encode_all(self, mut read: impl BufRead) -> AllResult {
        let IntoStream {
            encoder,
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
                encoder.finish();
            }

            let result = encoder.encode_bytes(data, &mut outbuf[..]);
            *read_bytes += result.consumed_in;
            *write_bytes += result.consumed_out;
            read.consume(result.consumed_in);

            let done = result.status?;
            writer.write_all(&outbuf[..result.consumed_out])?;

            match done {
                LzwStatus::Done => Ok(Progress::Done),
                LzwStatus::Ok => Ok(Progress::Ok),
                LzwStatus::NoProgress => Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "encoder made no progress",
                )
                .into()),
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

impl EncodeState {
    fn new() -> Self {
        let mut tree = Tree::default();
        tree.init();
        EncodeState {
            tree,
            current_code: None,
        }
    }

    /// Extend the current match by one byte, returning the code of a completed match.
    fn push(&mut self, byte: u8) -> Option<Code> {
        let current = match self.current_code {
            Some(code) => code,
            None => {
                self.current_code = Some(Code::from(byte));
                return None;
            }
        };

        if let Some(next) = self.tree.at_key(current, byte) {
            self.current_code = Some(next);
            return None;
        }

        if !self.tree.is_full() {
            self.tree.append(current, byte);
        }

        self.current_code = Some(Code::from(byte));
        Some(current)
    }

    /// Take the code of the match still pending at the end of input.
    fn flush(&mut self) -> Option<Code> {
        self.current_code.take()
    }
}

impl Tree {
    fn init(&mut self) {
        self.keys.resize(usize::from(FIRST_FREE_CODE), FullKey::NoSuccessor);
    }

    fn len(&self) -> usize {
        self.keys.len()
    }

    fn is_full(&self) -> bool {
        self.len() >= MAX_ENTRIES
    }

    fn at_key(&self, code: Code, ch: u8) -> Option<Code> {
        match self.keys[usize::from(code)] {
            FullKey::NoSuccessor => None,
            FullKey::Simple(idx) => {
                let nexts = &self.simples[usize::from(idx)];
                let successors = nexts
                    .codes
                    .iter()
                    .zip(nexts.chars.iter())
                    .take(usize::from(nexts.count));
                for (&scode, &sch) in successors {
                    if sch == ch {
                        return Some(scode);
                    }
                }

                None
            }
            FullKey::Full(idx) => {
                let full = &self.complex[usize::from(idx)];
                match full.char_continuation[usize::from(ch)] {
                    NO_CODE => None,
                    code => Some(code),
                }
            }
        }
    }

    /// Assign the next code to the string of `code` followed by `ch`.
    ///
    /// Must only be called while the tree is not full and the string is not yet present.
    fn append(&mut self, code: Code, ch: u8) -> Code {
        debug_assert!(!self.is_full());
        debug_assert!(self.at_key(code, ch).is_none());
        let next = self.keys.len() as Code;
        let key = self.keys[usize::from(code)];
        match key {
            FullKey::NoSuccessor => {
                let new_key = FullKey::Simple(self.simples.len() as u16);
                let mut simple = Simple::default();
                simple.codes[0] = next;
                simple.chars[0] = ch;
                simple.count = 1;
                self.simples.push(simple);
                self.keys[usize::from(code)] = new_key;
            }
            FullKey::Simple(idx) if usize::from(self.simples[usize::from(idx)].count) < SHORT => {
                let nexts = &mut self.simples[usize::from(idx)];
                let nidx = usize::from(nexts.count);
                nexts.chars[nidx] = ch;
                nexts.codes[nidx] = next;
                nexts.count += 1;
            }
            FullKey::Simple(idx) => {
                let new_key = FullKey::Full(self.complex.len() as u16);
                let simples = &self.simples[usize::from(idx)];
                let mut full = Full {
                    char_continuation: [NO_CODE; 256],
                };
                for (&pch, &pcont) in simples.chars.iter().zip(simples.codes.iter()) {
                    full.char_continuation[usize::from(pch)] = pcont;
                }
                full.char_continuation[usize::from(ch)] = next;
                self.complex.push(full);
                self.keys[usize::from(code)] = new_key;
            }
            FullKey::Full(idx) => {
                let full = &mut self.complex[usize::from(idx)];
                full.char_continuation[usize::from(ch)] = next;
            }
        }
        self.keys.push(FullKey::NoSuccessor);

        if self.is_full() {
            tracing::debug!(entries = self.keys.len(), "encoder dictionary is full");
        }

        next
    }
}

impl Default for Simple {
    fn default() -> Self {
        Simple {
            codes: [0; SHORT],
            chars: [0; SHORT],
            count: 0,
        }
    }
}
