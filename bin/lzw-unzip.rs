#![forbid(unsafe_code)]
//! Decompresses `<file>.zip` back into `<file>`.
mod common;

use std::env;

use common::CodingResult;
use lzw16::{file, ByteOrder};

fn main() -> CodingResult {
    CodingResult::catch_panic(|| {
        common::init_logging();
        let input = common::input_file(
            "lzw-unzip",
            "Decompress a file of 16-bit LZW codes, writing it without its .zip suffix",
            env::args_os(),
        )?;
        let summary = file::decompress_file(&input, ByteOrder::Little)?;
        tracing::info!(
            output = %summary.output.display(),
            bytes_read = summary.bytes_read,
            bytes_written = summary.bytes_written,
            "decompressed"
        );
        Ok(())
    })
}
