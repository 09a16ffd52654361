//! Test fixtures: in-memory encoder for the binary model format.

use std::io::Cursor;

use super::{EmbeddingModel, ModelParser};

/// Encode records whose words are raw bytes
pub(crate) fn encode_raw(dim: usize, records: &[(&[u8], &[f32])]) -> Vec<u8> {
    let mut data = format!("{} {}\n", records.len(), dim).into_bytes();
    for (word, vector) in records {
        assert_eq!(vector.len(), dim, "fixture vector has wrong dimensionality");
        data.extend_from_slice(word);
        data.push(b' ');
        for value in vector.iter() {
            data.extend_from_slice(&value.to_le_bytes());
        }
        data.push(b'\n');
    }
    data
}

pub(crate) fn encode(dim: usize, records: &[(&str, &[f32])]) -> Vec<u8> {
    let raw: Vec<(&[u8], &[f32])> = records
        .iter()
        .map(|(word, vector)| (word.as_bytes(), *vector))
        .collect();
    encode_raw(dim, &raw)
}

/// Encode and parse with the default configuration
pub(crate) fn load(dim: usize, records: &[(&str, &[f32])]) -> EmbeddingModel {
    ModelParser::default()
        .parse(Cursor::new(encode(dim, records)))
        .expect("fixture should parse")
}
