use std::fs;

use lzw16::file::{compress_file, compressed_path, decompress_file};
use lzw16::{ByteOrder, Error};

#[test]
fn compress_then_decompress() {
    let dir = tempfile::tempdir().unwrap();
    let original = dir.path().join("lorem.txt");
    let data = b"Lorem ipsum dolor sit amet, lorem ipsum dolor sit amet. ".repeat(200);
    fs::write(&original, &data).unwrap();

    let summary = compress_file(&original, ByteOrder::Little).unwrap();
    assert_eq!(summary.output, compressed_path(&original));
    assert_eq!(summary.bytes_read, data.len());
    assert!(summary.bytes_written < data.len());
    assert_eq!(fs::metadata(&summary.output).unwrap().len() as usize, summary.bytes_written);

    fs::remove_file(&original).unwrap();
    let summary = decompress_file(&summary.output, ByteOrder::Little).unwrap();
    assert_eq!(summary.output, original);
    assert_eq!(fs::read(&original).unwrap(), data);
}

#[test]
fn empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let original = dir.path().join("empty");
    fs::write(&original, b"").unwrap();

    let summary = compress_file(&original, ByteOrder::Little).unwrap();
    assert_eq!(fs::read(&summary.output).unwrap(), b"");

    let summary = decompress_file(&summary.output, ByteOrder::Little).unwrap();
    assert_eq!(fs::read(summary.output).unwrap(), b"");
}

#[test]
fn missing_input_names_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.zip");
    match decompress_file(&missing, ByteOrder::Little) {
        Err(Error::Open { path, .. }) => assert_eq!(path, missing),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn corrupt_input_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.zip");
    fs::write(&input, ByteOrder::Little.write_codes(&[65, 66, 999])).unwrap();

    let err = decompress_file(&input, ByteOrder::Little).unwrap_err();
    assert!(matches!(err, Error::Corrupt { code: 999, .. }));
    assert!(!dir.path().join("broken").exists());
}

#[test]
fn wrong_suffix_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("plain.txt");
    fs::write(&input, b"AB").unwrap();
    assert!(matches!(
        decompress_file(&input, ByteOrder::Little),
        Err(Error::Usage(_))
    ));
}
