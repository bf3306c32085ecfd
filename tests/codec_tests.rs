mod common;

use common::test_utils::TestFile;
use packed_bloom_rs::{
    BloomFilter, DelimitedChunks, FilterBuilder, FormatField,
    codec::{self, Header},
};
use std::{fs, fs::File, io::Read};

fn build_filter(items: &[&str], probability: f64) -> BloomFilter {
    let mut builder = FilterBuilder::new(probability, items.len() as u64)
        .expect("Failed to create test builder");
    builder.insert_all(items);
    builder.finalize()
}

fn expect_format_error(input: &[u8], field: FormatField) {
    match codec::decode(input) {
        Err(err) => {
            assert!(err.is_format(), "expected a format error, got {err}");
            assert_eq!(
                err.format_field(),
                Some(field),
                "wrong field for {:?}: {err}",
                String::from_utf8_lossy(input)
            );
        }
        Ok(filter) => panic!(
            "decoding {:?} should fail, got {filter}",
            String::from_utf8_lossy(input)
        ),
    }
}

#[cfg(test)]
mod encode_tests {
    use super::*;

    #[test]
    fn test_bloom_filter_serialization() {
        let filter = build_filter(&["saphal"], 99.0);
        let serialized = filter.to_bytes();

        let mut expected = Vec::new();
        // File type
        expected.extend_from_slice(b"BF");
        // Version
        expected.extend_from_slice(b"01");
        // # of hash functions
        expected.extend_from_slice(b"02");
        // Length of bit array
        expected.extend_from_slice(b"00000009");
        // Delimiter
        expected.extend_from_slice(b"\r\n");
        // Bits 4 and 6 set
        expected.extend_from_slice(&[0x0A, 0x00]);

        assert_eq!(serialized, expected);
    }

    #[test]
    fn test_encoded_length_matches_layout() {
        for items in [1u64, 7, 100, 12_345] {
            let filter = FilterBuilder::new(95.0, items).unwrap().finalize();
            let m = filter.size();
            assert_eq!(
                filter.to_bytes().len() as u64,
                16 + m.div_ceil(8),
                "m={m}"
            );
        }
    }

    #[test]
    fn test_length_field_is_zero_padded_decimal() {
        let filter = FilterBuilder::new(99.0, 1_000).unwrap().finalize();
        let bytes = filter.to_bytes();
        assert_eq!(&bytes[6..14], b"00009585");
    }
}

#[cfg(test)]
mod decode_tests {
    use super::*;

    #[test]
    fn test_decode_ten_bit_filter() {
        let mut input = b"BF01020000000010\r\n".to_vec();
        input.extend_from_slice(&[0b1010_0000, 0b0100_0000]);

        let filter = codec::decode(&input).expect("valid input");
        assert_eq!(filter.size(), 10);
        assert_eq!(filter.hash_count(), 2);
        assert_eq!(filter.set_indices(), vec![0, 2, 9]);
        // re-encoded with the canonical eight-digit length field
        assert_eq!(&filter.to_bytes()[..16], b"BF010200000010\r\n");
    }

    #[test]
    fn test_bad_magic() {
        expect_format_error(b"XX01020000000010\r\n\x00\x00", FormatField::Magic);
        // both bytes must match
        expect_format_error(b"BX01020000000010\r\n\x00\x00", FormatField::Magic);
        expect_format_error(b"XF01020000000010\r\n\x00\x00", FormatField::Magic);
        expect_format_error(b"", FormatField::Magic);
        expect_format_error(b"B", FormatField::Magic);
    }

    #[test]
    fn test_bad_version() {
        expect_format_error(b"BF", FormatField::Version);
        expect_format_error(b"BF0", FormatField::Version);
        expect_format_error(b"BFxx020000000010\r\n\x00\x00", FormatField::Version);
        expect_format_error(b"BF02020000000010\r\n\x00\x00", FormatField::Version);
    }

    #[test]
    fn test_bad_hash_count() {
        expect_format_error(b"BF01", FormatField::HashCount);
        expect_format_error(b"BF01?20000000010\r\n\x00\x00", FormatField::HashCount);
        expect_format_error(b"BF01000000000010\r\n\x00\x00", FormatField::HashCount);
        expect_format_error(b"BF01030000000010\r\n\x00\x00", FormatField::HashCount);
    }

    #[test]
    fn test_bad_bit_length() {
        expect_format_error(b"BF0102", FormatField::BitLength);
        expect_format_error(b"BF01020000001", FormatField::BitLength);
        expect_format_error(b"BF0102000000x0\r\n\x00\x00", FormatField::BitLength);
        expect_format_error(b"BF010200000000\r\n", FormatField::BitLength);
    }

    #[test]
    fn test_missing_delimiter() {
        expect_format_error(b"BF010200000010", FormatField::Delimiter);
        expect_format_error(b"BF010200000010\n\x00\x00", FormatField::Delimiter);
    }

    #[test]
    fn test_truncated_payload() {
        expect_format_error(b"BF010200000010\r\n\x00", FormatField::Payload);
        expect_format_error(b"BF010200000010\r\n", FormatField::Payload);
    }

    #[test]
    fn test_single_hash_filter_uses_one_function() {
        let mut input = b"BF01010000000009\r\n".to_vec();
        input.extend_from_slice(&[0x08, 0x00]);

        let filter = codec::decode(&input).unwrap();
        assert_eq!(filter.hash_count(), 1);
        // FNV-1 of "saphal" lands on bit 4
        assert!(filter.may_contain(b"saphal"));
        assert_eq!(&filter.to_bytes()[4..6], b"01");
    }

    #[test]
    fn test_header_parse_does_not_need_delimiter() {
        let header = Header::parse(b"BF010200000009").unwrap();
        assert_eq!(header.bit_len, 9);
        assert_eq!(header.hash_count, 2);
    }
}

#[cfg(test)]
mod roundtrip_tests {
    use super::*;

    #[test]
    fn test_roundtrip_preserves_membership() {
        let items = ["saphal", "patro", "engineer", "student", "software"];
        let original = build_filter(&items, 95.0);
        let restored = codec::decode(&codec::encode(&original)).unwrap();

        assert_eq!(restored, original);
        for item in items {
            assert!(restored.may_contain(item.as_bytes()));
        }
    }

    #[test]
    fn test_roundtrip_various_sizes() {
        for n in [1u64, 2, 5, 13, 64, 1_000] {
            let mut builder = FilterBuilder::new(99.0, n).unwrap();
            builder.insert_all((0..n).map(|i| format!("item-{i}")));
            let original = builder.finalize();

            let restored = codec::decode(&original.to_bytes()).unwrap();
            assert_eq!(restored, original, "n={n}");
            assert_eq!(restored.set_indices(), original.set_indices());
        }
    }

    #[test]
    fn test_stream_roundtrip_with_small_chunks() {
        let original = build_filter(&["alpha", "beta", "gamma", "delta"], 99.0);
        let bytes = original.to_bytes();

        let restored = codec::decode_stream(bytes.as_slice()).unwrap();
        assert_eq!(restored, original);

        // Header line plus payload chunks reassemble the same filter
        let chunks: Vec<Vec<u8>> = DelimitedChunks::new(bytes.as_slice())
            .with_chunk_size(1)
            .collect::<Result<_, _>>()
            .unwrap();
        let header = Header::parse(&chunks[0]).unwrap();
        let restored = codec::decode_parts(&header, &chunks[1..].concat()).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_payload_containing_delimiter_bytes() {
        // 0x0D 0x0A in the packed bits must not be treated as a delimiter
        let mut input = b"BF010200000024\r\n".to_vec();
        input.extend_from_slice(&[0x0D, 0x0A, 0xFF]);

        let from_buffer = codec::decode(&input).unwrap();
        let from_stream = codec::decode_stream(input.as_slice()).unwrap();
        assert_eq!(from_buffer, from_stream);
        assert_eq!(from_stream.size(), 24);
        assert_eq!(from_stream.to_bytes(), input);
    }

    #[test]
    fn test_stream_rejects_long_header_line() {
        let err = codec::decode_stream(&b"BF010200000009XX\r\n\x0A\x00"[..]).unwrap_err();
        assert_eq!(err.format_field(), Some(FormatField::Delimiter));
    }

    #[test]
    fn test_stream_without_delimiter_reports_delimiter() {
        for input in [
            &b"BF010200000009"[..],
            b"BF010200000009\r",
            b"BF010200000009\n\x0A\x00",
        ] {
            let from_buffer = codec::decode(input).unwrap_err();
            let from_stream = codec::decode_stream(input).unwrap_err();
            assert_eq!(from_buffer.format_field(), Some(FormatField::Delimiter));
            assert_eq!(
                from_stream.format_field(),
                from_buffer.format_field(),
                "{:?}",
                String::from_utf8_lossy(input)
            );
        }
    }

    #[test]
    fn test_stream_without_delimiter_reports_earlier_field() {
        let err = codec::decode_stream(&b"XX010200000009"[..]).unwrap_err();
        assert_eq!(err.format_field(), Some(FormatField::Magic));

        let err = codec::decode_stream(&b""[..]).unwrap_err();
        assert_eq!(err.format_field(), Some(FormatField::Magic));
    }

    #[test]
    fn test_stream_decodes_ten_digit_length_field() {
        let mut input = b"BF01020000000010\r\n".to_vec();
        input.extend_from_slice(&[0b1010_0000, 0b0100_0000]);

        let from_stream = codec::decode_stream(input.as_slice()).expect("valid stream");
        assert_eq!(from_stream.size(), 10);
        assert_eq!(from_stream.set_indices(), vec![0, 2, 9]);

        let read = BloomFilter::read_from(input.as_slice()).expect("valid stream");
        assert_eq!(read, from_stream);
        assert_eq!(read, codec::decode(&input).unwrap());
    }

    #[test]
    fn test_stream_rejects_missing_magic() {
        let err = codec::decode_stream(&b"XX010200000009\r\n\x0A\x00"[..]).unwrap_err();
        assert_eq!(err.format_field(), Some(FormatField::Magic));
    }
}

#[cfg(test)]
mod file_tests {
    use super::*;

    #[test]
    fn test_bloom_filter_deserialization_from_file() {
        let test_file = TestFile::new("deserialization");
        let original = build_filter(&["saphal"], 99.0);

        let mut file = File::create(test_file.path()).expect("create temp file");
        original.write_to(&mut file).expect("write filter");
        drop(file);

        let file = File::open(test_file.path()).expect("open temp file");
        let mut bytes = Vec::new();
        for chunk in DelimitedChunks::new(file) {
            bytes.extend_from_slice(&chunk.expect("read chunk"));
        }
        // The reader drops the delimiter, leaving header + payload
        assert_eq!(bytes.len(), 14 + 2);

        let file = File::open(test_file.path()).expect("open temp file");
        let reconstructed = BloomFilter::read_from(file).expect("reconstruct");
        assert_eq!(reconstructed, original);
    }

    #[test]
    fn test_written_file_matches_to_bytes() {
        let test_file = TestFile::new("written_bytes");
        let filter = build_filter(&["one", "two", "three"], 95.0);

        fs::write(test_file.path(), filter.to_bytes()).unwrap();
        let mut on_disk = Vec::new();
        File::open(test_file.path())
            .unwrap()
            .read_to_end(&mut on_disk)
            .unwrap();

        assert_eq!(BloomFilter::from_bytes(&on_disk).unwrap(), filter);
    }
}
