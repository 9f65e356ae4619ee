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

use crate::{lz4, node::Node, tree::TreeBackend, value::Value};

const MAGIC: &[u8; 4] = b"FIOT";
const VERSION: u8 = 1;
/// Payloads smaller than this aren't worth LZ4's framing overhead.
const COMPRESS_THRESHOLD: usize = 64;

const TAG_EMPTY: u8 = 0;
const TAG_BOOL: u8 = 1;
const TAG_INT16: u8 = 2;
const TAG_INT32: u8 = 3;
const TAG_UINT32: u8 = 4;
const TAG_USIZE: u8 = 5;
const TAG_FLOAT: u8 = 6;
const TAG_STRING: u8 = 7;
const TAG_INTERNED: u8 = 8;
const TAG_MAP: u8 = 9;
const TAG_LIST: u8 = 10;

fn write_str(out: &mut impl Write, s: &str) -> io::Result<()> {
    out.write_u32::<LE>(s.len() as u32)?;
    out.write_all(s.as_bytes())
}

fn read_str(r: &mut impl Read) -> io::Result<String> {
    let len = r.read_u32::<LE>()? as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn encode_node(node: &Node, out: &mut impl Write) -> io::Result<()> {
    match node {
        Node::Empty => out.write_u8(TAG_EMPTY),
        Node::Value(Value::Bool(v)) => {
            out.write_u8(TAG_BOOL)?;
            out.write_u8(*v as u8)
        }
        Node::Value(Value::Int16(v)) => {
            out.write_u8(TAG_INT16)?;
            out.write_i16::<LE>(*v)
        }
        Node::Value(Value::Int32(v)) => {
            out.write_u8(TAG_INT32)?;
            out.write_i32::<LE>(*v)
        }
        Node::Value(Value::Uint32(v)) => {
            out.write_u8(TAG_UINT32)?;
            out.write_u32::<LE>(*v)
        }
        Node::Value(Value::Usize(v)) => {
            out.write_u8(TAG_USIZE)?;
            out.write_u64::<LE>(*v as u64)
        }
        Node::Value(Value::Float(v)) => {
            out.write_u8(TAG_FLOAT)?;
            out.write_f32::<LE>(*v)
        }
        Node::Value(Value::String(v)) => {
            out.write_u8(TAG_STRING)?;
            write_str(out, v)
        }
        Node::Value(Value::InternedString(v)) => {
            out.write_u8(TAG_INTERNED)?;
            write_str(out, v)
        }
        Node::Map(entries) => {
            out.write_u8(TAG_MAP)?;
            out.write_u32::<LE>(entries.len() as u32)?;
            for (key, child) in entries {
                write_str(out, key)?;
                encode_node(child, out)?;
            }
            Ok(())
        }
        Node::List(items) => {
            out.write_u8(TAG_LIST)?;
            out.write_u32::<LE>(items.len() as u32)?;
            for item in items {
                encode_node(item, out)?;
            }
            Ok(())
        }
    }
}

fn decode_node(r: &mut impl Read) -> io::Result<Node> {
    let tag = r.read_u8()?;
    Ok(match tag {
        TAG_EMPTY => Node::Empty,
        TAG_BOOL => Node::Value(Value::Bool(r.read_u8()? != 0)),
        TAG_INT16 => Node::Value(Value::Int16(r.read_i16::<LE>()?)),
        TAG_INT32 => Node::Value(Value::Int32(r.read_i32::<LE>()?)),
        TAG_UINT32 => Node::Value(Value::Uint32(r.read_u32::<LE>()?)),
        TAG_USIZE => Node::Value(Value::Usize(r.read_u64::<LE>()? as usize)),
        TAG_FLOAT => Node::Value(Value::Float(r.read_f32::<LE>()?)),
        TAG_STRING => Node::Value(Value::String(read_str(r)?)),
        TAG_INTERNED => Node::Value(Value::InternedString(read_str(r)?)),
        TAG_MAP => {
            let len = r.read_u32::<LE>()? as usize;
            let mut entries = Vec::with_capacity(len.min(1 << 16));
            for _ in 0..len {
                let key = read_str(r)?;
                let child = decode_node(r)?;
                entries.push((key, child));
            }
            Node::Map(entries)
        }
        TAG_LIST => {
            let len = r.read_u32::<LE>()? as usize;
            let mut items = Vec::with_capacity(len.min(1 << 16));
            for _ in 0..len {
                items.push(decode_node(r)?);
            }
            Node::List(items)
        }
        other => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unknown node tag {other}"),
            ))
        }
    })
}

/// Artifact blob framing: 4-byte magic, version, a raw/LZ4 flag, the
/// uncompressed payload length, then the payload — grounded in the original
/// pipeline disk cache's magic + version + payload header shape.
pub struct BinaryBackend;

impl TreeBackend for BinaryBackend {
    fn parse(bytes: &[u8]) -> io::Result<Node> {
        let mut r = bytes;
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "bad magic"));
        }
        let version = r.read_u8()?;
        if version != VERSION {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unsupported binary tree version {version}"),
            ));
        }
        let compressed = r.read_u8()? != 0;
        let uncompressed_len = r.read_u32::<LE>()? as usize;

        let decoded_bytes;
        let payload: &[u8] = if compressed {
            let mut buf = vec![0u8; uncompressed_len];
            lz4::decompress(r, &mut buf, uncompressed_len)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            decoded_bytes = buf;
            &decoded_bytes
        } else {
            r
        };

        decode_node(&mut &payload[..])
    }

    fn write(node: &Node, out: &mut impl Write) -> io::Result<()> {
        let mut encoded = Vec::new();
        encode_node(node, &mut encoded)?;

        out.write_all(MAGIC)?;
        out.write_u8(VERSION)?;

        if encoded.len() < COMPRESS_THRESHOLD {
            out.write_u8(0)?;
            out.write_u32::<LE>(encoded.len() as u32)?;
            out.write_all(&encoded)?;
        } else {
            let mut compressed = Vec::new();
            lz4::compress(&encoded, &mut compressed)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            out.write_u8(1)?;
            out.write_u32::<LE>(encoded.len() as u32)?;
            out.write_all(&compressed)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trips_small_uncompressed_payload() {
        let node = Node::Map(vec![("a".into(), Node::Value(Value::Int32(1)))]);
        let mut bytes = Vec::new();
        BinaryBackend::write(&node, &mut bytes).unwrap();
        assert_eq!(node, BinaryBackend::parse(&bytes).unwrap());
    }

    #[test]
    fn round_trips_large_compressed_payload() {
        let node = Node::List((0..200).map(|i| Node::Value(Value::Int32(i))).collect());
        let mut bytes = Vec::new();
        BinaryBackend::write(&node, &mut bytes).unwrap();
        assert_eq!(node, BinaryBackend::parse(&bytes).unwrap());
    }

    #[test]
    fn rejects_bad_magic() {
        let bytes = vec![0u8; 16];
        assert!(BinaryBackend::parse(&bytes).is_err());
    }
}
