//! Compressing and decompressing whole files.
//!
//! A compressed file carries the name of its source with [`COMPRESSED_SUFFIX`] appended, and
//! decompression restores the source name by stripping it again.
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::decode::Decoder;
use crate::encode::Encoder;
use crate::error::Result;
use crate::{AllResult, ByteOrder, Error};

pub const COMPRESSED_SUFFIX: &str = ".zip";

/// What a completed run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// The file that was written.
    pub output: PathBuf,
    /// The number of bytes read from the input file.
    pub bytes_read: usize,
    /// The number of bytes written to the output file.
    pub bytes_written: usize,
}

#[derive(Clone, Copy, Debug)]
enum Operation {
    Compress,
    Decompress,
}

/// The name of the compressed form of `input`.
pub fn compressed_path(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(COMPRESSED_SUFFIX);
    PathBuf::from(name)
}

/// The name of the decompressed form of `input`.
///
/// Works on the raw file name, so names that are not valid UTF-8 are fine.
pub fn decompressed_path(input: &Path) -> Result<PathBuf> {
    let extension = COMPRESSED_SUFFIX.trim_start_matches('.');
    match input.extension() {
        Some(ext) if ext == extension => Ok(input.with_extension("")),
        _ => Err(Error::Usage(format!(
            "{} does not name a file ending in {}",
            input.display(),
            COMPRESSED_SUFFIX
        ))),
    }
}

/// Compress `input` into a file named by [`compressed_path`].
pub fn compress_file(input: &Path, order: ByteOrder) -> Result<Summary> {
    run(Operation::Compress, input, compressed_path(input), order)
}

/// Decompress `input` into a file named by [`decompressed_path`].
pub fn decompress_file(input: &Path, order: ByteOrder) -> Result<Summary> {
    let output = decompressed_path(input)?;
    run(Operation::Decompress, input, output, order)
}

fn run(operation: Operation, input: &Path, output: PathBuf, order: ByteOrder) -> Result<Summary> {
    tracing::debug!(?operation, input = %input.display(), output = %output.display(), "starting");

    let source = open(input, File::open(input))?;
    let target = open(&output, File::create(&output))?;

    match transfer(operation, source, target, order) {
        Ok((bytes_read, bytes_written)) => {
            tracing::debug!(?operation, bytes_read, bytes_written, "finished");
            Ok(Summary {
                output,
                bytes_read,
                bytes_written,
            })
        }
        Err(err) => {
            // Both handles are closed by now, do not leave a partial result behind.
            if let Err(remove) = fs::remove_file(&output) {
                tracing::warn!(output = %output.display(), %remove, "cannot remove partial output");
            }
            Err(err)
        }
    }
}

fn open(path: &Path, file: std::io::Result<File>) -> Result<File> {
    file.map_err(|source| Error::Open {
        path: path.to_owned(),
        source,
    })
}

fn transfer(
    operation: Operation,
    source: File,
    target: File,
    order: ByteOrder,
) -> Result<(usize, usize)> {
    let reader = BufReader::new(source);
    let mut writer = BufWriter::new(target);

    let AllResult {
        bytes_read,
        bytes_written,
        status,
    } = match operation {
        Operation::Compress => Encoder::with_byte_order(order)
            .into_stream(&mut writer)
            .encode_all(reader),
        Operation::Decompress => Decoder::with_byte_order(order)
            .into_stream(&mut writer)
            .decode_all(reader),
    };

    status?;
    writer.flush()?;
    Ok((bytes_read, bytes_written))
}
