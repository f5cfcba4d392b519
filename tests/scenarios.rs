use lzw16::decode::{decode, Decoder};
use lzw16::encode::encode;
use lzw16::{ByteOrder, Error, LzwError};

#[test]
fn empty() {
    assert!(encode(b"").is_empty());
    assert_eq!(decode(&[]).unwrap(), b"");
}

#[test]
fn single_byte() {
    let codes = encode(b"A");
    assert_eq!(codes, [0x0041]);
    assert_eq!(ByteOrder::Little.write_codes(&codes), [0x41, 0x00]);
}

#[test]
fn run_of_four() {
    let codes = encode(b"AAAA");
    assert_eq!(codes, [65, 256, 65]);
    assert_eq!(decode(&codes).unwrap(), b"AAAA");
}

#[test]
fn cycling_bytes() {
    let data: Vec<u8> = (0..70_000u32).map(|i| i as u8).collect();
    let codes = encode(&data);
    assert!(codes.len() < data.len());
    assert_eq!(decode(&codes).unwrap(), data);
}

#[test]
fn saturated_dictionary() {
    let mut seed = 0x9e37_79b9_u32;
    let data: Vec<u8> = (0..400_000)
        .map(|_| {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            seed as u8
        })
        .collect();

    let codes = encode(&data);
    assert!(codes.iter().any(|&code| code > 65_000));
    assert_eq!(decode(&codes).unwrap(), data);
}

#[test]
fn runs_compress_sublinearly() {
    let mut last_ratio = f64::MAX;
    for &len in &[100usize, 1_000, 10_000, 100_000] {
        let codes = encode(&vec![b'x'; len]);
        let ratio = codes.len() as f64 / len as f64;
        assert!(ratio < last_ratio, "{} codes for {} bytes", codes.len(), len);
        last_ratio = ratio;
    }
    assert!(encode(&vec![b'x'; 100_000]).len() < 500);
}

#[test]
fn undefined_code_is_corruption() {
    let err = decode(&[65, 66, 300]).unwrap_err();
    assert_eq!(
        err,
        LzwError::InvalidCode {
            code: 300,
            next_code: 257
        }
    );
    assert!(matches!(
        Error::from(err),
        Error::Corrupt {
            code: 300,
            next_code: 257
        }
    ));
}

#[test]
fn odd_length_stream_is_short_read() {
    let mut out = vec![];
    let result = Decoder::new()
        .into_stream(&mut out)
        .decode_all(&[65u8, 0, 65][..]);
    assert!(matches!(result.status, Err(Error::ShortRead)));
}

#[test]
fn corrupt_stream_fails() {
    let wire = ByteOrder::Little.write_codes(&[65, 0x1234]);
    let mut out = vec![];
    let result = Decoder::new().into_stream(&mut out).decode_all(wire.as_slice());
    assert!(matches!(result.status, Err(Error::Corrupt { code: 0x1234, .. })));
}
