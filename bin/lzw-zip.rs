#![forbid(unsafe_code)]
//! Compresses a file into `<file>.zip`.
mod common;

use std::env;

use common::CodingResult;
use lzw16::{file, ByteOrder};

fn main() -> CodingResult {
    CodingResult::catch_panic(|| {
        common::init_logging();
        let input = common::input_file(
            "lzw-zip",
            "Compress a file into 16-bit LZW codes, writing <file>.zip",
            env::args_os(),
        )?;
        let summary = file::compress_file(&input, ByteOrder::Little)?;
        tracing::info!(
            output = %summary.output.display(),
            bytes_read = summary.bytes_read,
            bytes_written = summary.bytes_written,
            "compressed"
        );
        Ok(())
    })
}
