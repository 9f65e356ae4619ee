// Copyright (C) 2023 gigablaster

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

use lz4_flex::block::{compress_into, decompress_into, get_maximum_output_size};

/// Thin wrapper over `lz4_flex`'s block API, shaped after the original engine's
/// `Compression::{estimate_lz4, compress_lz4, decompress_lz4}` trio.
#[derive(Debug, thiserror::Error)]
pub enum Lz4Error {
    #[error("lz4 compression failed: {0}")]
    Compress(#[from] lz4_flex::block::CompressError),
    #[error("lz4 decompression failed: {0}")]
    Decompress(#[from] lz4_flex::block::DecompressError),
    #[error("decompressed size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// Upper bound on the compressed size of a buffer of `in_size` bytes.
pub fn estimate(in_size: usize) -> usize {
    get_maximum_output_size(in_size)
}

/// Compresses `input` into `out` (which is resized as needed), returning the
/// number of bytes actually written.
pub fn compress(input: &[u8], out: &mut Vec<u8>) -> Result<usize, Lz4Error> {
    out.clear();
    out.resize(estimate(input.len()), 0);
    let written = compress_into(input, out)?;
    out.truncate(written);
    Ok(written)
}

/// Decompresses `input` into `out`. `out` must already be sized to
/// `expected_decompressed_size`; a produced size that doesn't match is
/// `SizeMismatch`, mirroring the source's `FailedDecompress`.
pub fn decompress(
    input: &[u8],
    out: &mut [u8],
    expected_decompressed_size: usize,
) -> Result<(), Lz4Error> {
    if out.len() != expected_decompressed_size {
        return Err(Lz4Error::SizeMismatch {
            expected: expected_decompressed_size,
            actual: out.len(),
        });
    }
    let written = decompress_into(input, out)?;
    if written != expected_decompressed_size {
        return Err(Lz4Error::SizeMismatch {
            expected: expected_decompressed_size,
            actual: written,
        });
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trip_random_buffer() {
        // Deterministic "random" buffer: no external RNG crate is pulled in just
        // for a test fixture; a xorshift is plenty for compressibility variance.
        let mut state = 0x2545F4914F6CDD1Du64;
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        };
        let input: Vec<u8> = (0..1 << 20).map(|_| (next() & 0xff) as u8).collect();

        let mut compressed = Vec::new();
        compress(&input, &mut compressed).unwrap();

        let mut decompressed = vec![0u8; input.len()];
        decompress(&compressed, &mut decompressed, input.len()).unwrap();
        assert_eq!(input, decompressed);
    }

    #[test]
    fn decompress_into_wrong_size_buffer_fails() {
        let input = b"hello hello hello hello hello hello".to_vec();
        let mut compressed = Vec::new();
        compress(&input, &mut compressed).unwrap();

        let mut too_small = vec![0u8; input.len() - 1];
        assert!(matches!(
            decompress(&compressed, &mut too_small, input.len()),
            Err(Lz4Error::SizeMismatch { .. })
        ));
    }
}
