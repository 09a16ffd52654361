//! Binary Model Parser
//!
//! Reads the word2vec binary format:
//!
//! ```text
//! <vocabulary_length> <vector_dimensionality>\n
//! <word_1> <f32 x dim, little-endian>\n
//! <word_2> <f32 x dim, little-endian>\n
//! ...
//! ```
//!
//! Words run up to the next space byte and are kept as raw bytes. Every
//! vector is normalized to unit length as it is read. Bytes following the
//! last record are left unread.

use bytes::{Buf, Bytes};
use std::io::{self, BufRead, Read};
use std::time::Instant;
use tracing::{debug, info};

use super::config::ParseConfig;
use super::embedding::EmbeddingModel;
use crate::error::ParseError;
use crate::vector::normalize;

/// Upper bound on the header line, newline included
const MAX_HEADER_LEN: u64 = 64;

/// Cap on up-front allocation; tables beyond it grow as records arrive
const PREALLOCATE_LIMIT: usize = 1 << 16;

const SIZE_OF_FLOAT: usize = std::mem::size_of::<f32>();

/// Deserializes one [`EmbeddingModel`] from a forward-only byte stream.
///
/// The stream stays owned by the caller; the parser neither seeks nor
/// closes it. On failure every partially-built table is dropped before the
/// error is returned.
#[derive(Debug, Clone, Default)]
pub struct ModelParser {
    config: ParseConfig,
}

impl ModelParser {
    pub fn new(config: ParseConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParseConfig {
        &self.config
    }

    /// Parse a model from `reader`, positioned at the start of the header
    pub fn parse<R: BufRead>(&self, mut reader: R) -> Result<EmbeddingModel, ParseError> {
        let start = Instant::now();

        match self.parse_model(&mut reader) {
            Ok(model) => {
                info!(
                    vocabulary_length = model.vocabulary_length(),
                    vector_dimensionality = model.vector_dimensionality(),
                    elapsed = ?start.elapsed(),
                    "Model loaded"
                );
                Ok(model)
            }
            Err(e) => {
                debug!(error = %e, "Model parse failed");
                Err(e)
            }
        }
    }

    fn parse_model<R: BufRead>(&self, reader: &mut R) -> Result<EmbeddingModel, ParseError> {
        let (vocabulary_length, vector_dimensionality) = read_header(reader)?;

        let total = vocabulary_length
            .checked_mul(vector_dimensionality)
            .filter(|total| total.checked_mul(SIZE_OF_FLOAT).is_some())
            .ok_or(ParseError::TooLarge {
                vocabulary_length,
                vector_dimensionality,
            })?;

        let mut vocabulary = Vec::with_capacity(vocabulary_length.min(PREALLOCATE_LIMIT));
        let mut vectors = Vec::with_capacity(total.min(PREALLOCATE_LIMIT));

        let mut word_buf = Vec::new();
        let vector_len = vector_dimensionality * SIZE_OF_FLOAT;
        let mut raw = Vec::with_capacity(vector_len.min(PREALLOCATE_LIMIT));

        for index in 0..vocabulary_length {
            let word = read_word(reader, &mut word_buf, index)?;
            if self.config.validate_utf8 && std::str::from_utf8(&word).is_err() {
                return Err(ParseError::InvalidEncoding { index });
            }

            // The buffer only grows with bytes actually present in the stream.
            raw.clear();
            let read = reader
                .by_ref()
                .take(vector_len as u64)
                .read_to_end(&mut raw)?;
            if read != vector_len {
                return Err(ParseError::TruncatedVector { index });
            }

            let mut terminator = [0u8; 1];
            reader
                .read_exact(&mut terminator)
                .map_err(|e| short_read(e, ParseError::MissingTerminator { index }))?;
            if terminator[0] != b'\n' {
                return Err(ParseError::MissingTerminator { index });
            }

            let offset = vectors.len();
            let mut buf = &raw[..];
            while buf.has_remaining() {
                vectors.push(buf.get_f32_le());
            }
            if !normalize(&mut vectors[offset..]) {
                return Err(ParseError::DegenerateVector { index });
            }

            vocabulary.push(word);
        }

        Ok(EmbeddingModel::from_parts(
            vocabulary,
            vector_dimensionality,
            vectors,
        ))
    }
}

/// Read and validate `<vocabulary_length> <vector_dimensionality>\n`
fn read_header<R: BufRead>(reader: &mut R) -> Result<(usize, usize), ParseError> {
    let mut line = Vec::new();
    reader.by_ref().take(MAX_HEADER_LEN).read_until(b'\n', &mut line)?;
    parse_header(&line)
}

/// The header must be the very first line: unlike a scanf-style reader,
/// blank lines before it are not skipped and fail as malformed.
fn parse_header(line: &[u8]) -> Result<(usize, usize), ParseError> {
    let malformed = |reason: &str| ParseError::MalformedHeader(reason.to_string());

    let body = line
        .strip_suffix(b"\n")
        .ok_or_else(|| malformed("missing newline terminator"))?;
    let text = std::str::from_utf8(body).map_err(|_| malformed("not ASCII text"))?;

    // The newline must directly follow the second field.
    if text.ends_with(|c: char| c.is_ascii_whitespace()) {
        return Err(malformed("unexpected bytes before newline"));
    }

    let mut fields = text.split_ascii_whitespace();
    let (Some(first), Some(second), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(malformed("expected two fields"));
    };

    let vocabulary_length: i64 = first
        .parse()
        .map_err(|_| malformed("vocabulary length is not an integer"))?;
    let vector_dimensionality: i64 = second
        .parse()
        .map_err(|_| malformed("vector dimensionality is not an integer"))?;

    if vocabulary_length <= 0 || vector_dimensionality <= 0 {
        return Err(ParseError::NonPositiveDimensions {
            vocabulary_length,
            vector_dimensionality,
        });
    }

    let too_large = || ParseError::TooLarge {
        vocabulary_length: usize::MAX,
        vector_dimensionality: usize::MAX,
    };
    Ok((
        usize::try_from(vocabulary_length).map_err(|_| too_large())?,
        usize::try_from(vector_dimensionality).map_err(|_| too_large())?,
    ))
}

/// Read a space-terminated token with at least one content byte
fn read_word<R: BufRead>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    index: usize,
) -> Result<Bytes, ParseError> {
    buf.clear();
    let read = reader.read_until(b' ', buf)?;
    if read < 2 || buf.last() != Some(&b' ') {
        return Err(ParseError::TruncatedWord { index });
    }
    buf.pop();
    Ok(Bytes::copy_from_slice(buf))
}

/// End of stream is a framing error for the step in progress
fn short_read(err: io::Error, structural: ParseError) -> ParseError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        structural
    } else {
        ParseError::Io(err)
    }
}
