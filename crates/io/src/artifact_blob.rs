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

use std::io::{self, Read, Write};

use byteorder::{ReadBytesExt, WriteBytesExt, LE};

use crate::lz4;

const MAGIC: &[u8; 4] = b"FIOB";
const VERSION: u8 = 1;
const COMPRESS_THRESHOLD: usize = 256;

/// Writes an opaque artifact blob with the same magic/version/compressed-flag
/// framing the binary tree backend uses, without going through the `Node`
/// tree — importers produce raw bytes (a compiled mip chain, PCM samples,
/// shader bytecode), not a structured value, so this is the format they
/// write through per spec.md §6's "artifact blob" shape.
pub fn write_artifact_blob(bytes: &[u8], out: &mut impl Write) -> io::Result<()> {
    out.write_all(MAGIC)?;
    out.write_u8(VERSION)?;

    if bytes.len() < COMPRESS_THRESHOLD {
        out.write_u8(0)?;
        out.write_u32::<LE>(bytes.len() as u32)?;
        out.write_all(bytes)
    } else {
        let mut compressed = Vec::new();
        lz4::compress(bytes, &mut compressed)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        out.write_u8(1)?;
        out.write_u32::<LE>(bytes.len() as u32)?;
        out.write_all(&compressed)
    }
}

pub fn read_artifact_blob(bytes: &[u8]) -> io::Result<Vec<u8>> {
    let mut r = bytes;
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "bad artifact magic"));
    }
    let version = r.read_u8()?;
    if version != VERSION {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("unsupported artifact blob version {version}"),
        ));
    }
    let compressed = r.read_u8()? != 0;
    let uncompressed_len = r.read_u32::<LE>()? as usize;

    if compressed {
        let mut buf = vec![0u8; uncompressed_len];
        lz4::decompress(r, &mut buf, uncompressed_len)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(buf)
    } else {
        let mut buf = vec![0u8; uncompressed_len];
        r.read_exact(&mut buf)?;
        Ok(buf)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trips_small_uncompressed_blob() {
        let bytes = b"hello artifact";
        let mut out = Vec::new();
        write_artifact_blob(bytes, &mut out).unwrap();
        assert_eq!(bytes.to_vec(), read_artifact_blob(&out).unwrap());
    }

    #[test]
    fn round_trips_large_compressed_blob() {
        let bytes: Vec<u8> = (0..5000).map(|i| (i % 251) as u8).collect();
        let mut out = Vec::new();
        write_artifact_blob(&bytes, &mut out).unwrap();
        assert_eq!(bytes, read_artifact_blob(&out).unwrap());
    }

    #[test]
    fn rejects_bad_magic() {
        assert!(read_artifact_blob(&[0u8; 16]).is_err());
    }
}
