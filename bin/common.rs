//! Plumbing shared by the `lzw-zip` and `lzw-unzip` binaries.
use std::ffi::OsString;
use std::path::PathBuf;

use lzw16::Error;
use tracing_subscriber::EnvFilter;

pub enum CodingResult {
    Ok,
    Err(Error),
    Panic,
}

impl CodingResult {
    pub fn catch_panic(op: fn() -> Result<(), Error>) -> Self {
        std::panic::catch_unwind(|| match op() {
            Ok(()) => CodingResult::Ok,
            Err(err) => CodingResult::Err(err),
        })
        .unwrap_or(CodingResult::Panic)
    }
}

impl std::process::Termination for CodingResult {
    fn report(self) -> std::process::ExitCode {
        match self {
            CodingResult::Ok => std::process::ExitCode::SUCCESS,
            CodingResult::Err(err) => {
                eprintln!("{}", err);
                std::process::ExitCode::FAILURE
            }
            CodingResult::Panic => {
                eprintln!(
                    "The process failed irrecoverably! This should never happen and is a bug."
                );
                std::process::ExitCode::from(128)
            }
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG` and showing only warnings by default.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Parse the single input file argument.
pub fn input_file(
    name: &'static str,
    about: &'static str,
    args: impl IntoIterator<Item = OsString>,
) -> Result<PathBuf, Error> {
    let command = clap::Command::new(name)
        .version(env!("CARGO_PKG_VERSION"))
        .about(about)
        .arg(
            clap::Arg::new("file")
                .required(true)
                .value_parser(clap::builder::ValueParser::path_buf()),
        );

    let matches = match command.try_get_matches_from(args) {
        Ok(matches) => matches,
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                err.exit()
            }
            _ => return Err(Error::Usage(err.to_string().trim_end().to_owned())),
        },
    };

    match matches.get_one::<PathBuf>("file") {
        Some(path) => Ok(path.clone()),
        None => Err(Error::Usage(format!("Usage: {} <file>", name))),
    }
}
