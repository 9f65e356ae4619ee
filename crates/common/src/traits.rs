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

/// Binary (de)serialization for the artifact/metadata formats (C2). Implemented by
/// hand for primitives and collections rather than derived, matching the teacher's
/// `dess_common::traits` split between the trait and per-type impls.
pub trait BinarySerialization {
    fn serialize(&self, w: &mut impl Write) -> io::Result<()>;
}

pub trait BinaryDeserialization: Sized {
    fn deserialize(r: &mut impl Read) -> io::Result<Self>;
}

impl BinarySerialization for u8 {
    fn serialize(&self, w: &mut impl Write) -> io::Result<()> {
        w.write_u8(*self)
    }
}
impl BinaryDeserialization for u8 {
    fn deserialize(r: &mut impl Read) -> io::Result<Self> {
        r.read_u8()
    }
}

impl BinarySerialization for u16 {
    fn serialize(&self, w: &mut impl Write) -> io::Result<()> {
        w.write_u16::<LE>(*self)
    }
}
impl BinaryDeserialization for u16 {
    fn deserialize(r: &mut impl Read) -> io::Result<Self> {
        r.read_u16::<LE>()
    }
}

impl BinarySerialization for u32 {
    fn serialize(&self, w: &mut impl Write) -> io::Result<()> {
        w.write_u32::<LE>(*self)
    }
}
impl BinaryDeserialization for u32 {
    fn deserialize(r: &mut impl Read) -> io::Result<Self> {
        r.read_u32::<LE>()
    }
}

impl BinarySerialization for u64 {
    fn serialize(&self, w: &mut impl Write) -> io::Result<()> {
        w.write_u64::<LE>(*self)
    }
}
impl BinaryDeserialization for u64 {
    fn deserialize(r: &mut impl Read) -> io::Result<Self> {
        r.read_u64::<LE>()
    }
}

impl BinarySerialization for i32 {
    fn serialize(&self, w: &mut impl Write) -> io::Result<()> {
        w.write_i32::<LE>(*self)
    }
}
impl BinaryDeserialization for i32 {
    fn deserialize(r: &mut impl Read) -> io::Result<Self> {
        r.read_i32::<LE>()
    }
}

impl BinarySerialization for f32 {
    fn serialize(&self, w: &mut impl Write) -> io::Result<()> {
        w.write_f32::<LE>(*self)
    }
}
impl BinaryDeserialization for f32 {
    fn deserialize(r: &mut impl Read) -> io::Result<Self> {
        r.read_f32::<LE>()
    }
}

impl BinarySerialization for bool {
    fn serialize(&self, w: &mut impl Write) -> io::Result<()> {
        w.write_u8(*self as u8)
    }
}
impl BinaryDeserialization for bool {
    fn deserialize(r: &mut impl Read) -> io::Result<Self> {
        Ok(r.read_u8()? != 0)
    }
}

impl BinarySerialization for usize {
    fn serialize(&self, w: &mut impl Write) -> io::Result<()> {
        w.write_u64::<LE>(*self as u64)
    }
}
impl BinaryDeserialization for usize {
    fn deserialize(r: &mut impl Read) -> io::Result<Self> {
        Ok(r.read_u64::<LE>()? as usize)
    }
}

impl BinarySerialization for String {
    fn serialize(&self, w: &mut impl Write) -> io::Result<()> {
        self.as_bytes().to_vec().serialize(w)
    }
}
impl BinaryDeserialization for String {
    fn deserialize(r: &mut impl Read) -> io::Result<Self> {
        let bytes = Vec::<u8>::deserialize(r)?;
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

impl<T: BinarySerialization> BinarySerialization for Option<T> {
    fn serialize(&self, w: &mut impl Write) -> io::Result<()> {
        match self {
            Some(v) => {
                w.write_u8(1)?;
                v.serialize(w)
            }
            None => w.write_u8(0),
        }
    }
}
impl<T: BinaryDeserialization> BinaryDeserialization for Option<T> {
    fn deserialize(r: &mut impl Read) -> io::Result<Self> {
        Ok(match r.read_u8()? {
            0 => None,
            _ => Some(T::deserialize(r)?),
        })
    }
}

impl<T: BinarySerialization> BinarySerialization for Vec<T> {
    fn serialize(&self, w: &mut impl Write) -> io::Result<()> {
        w.write_u32::<LE>(self.len() as u32)?;
        for item in self {
            item.serialize(w)?;
        }
        Ok(())
    }
}
impl<T: BinaryDeserialization> BinaryDeserialization for Vec<T> {
    fn deserialize(r: &mut impl Read) -> io::Result<Self> {
        let len = r.read_u32::<LE>()? as usize;
        let mut out = Vec::with_capacity(len.min(1 << 20));
        for _ in 0..len {
            out.push(T::deserialize(r)?);
        }
        Ok(out)
    }
}

impl<K, V> BinarySerialization for std::collections::HashMap<K, V>
where
    K: BinarySerialization,
    V: BinarySerialization,
{
    fn serialize(&self, w: &mut impl Write) -> io::Result<()> {
        w.write_u32::<LE>(self.len() as u32)?;
        for (k, v) in self {
            k.serialize(w)?;
            v.serialize(w)?;
        }
        Ok(())
    }
}
impl<K, V> BinaryDeserialization for std::collections::HashMap<K, V>
where
    K: BinaryDeserialization + std::hash::Hash + Eq,
    V: BinaryDeserialization,
{
    fn deserialize(r: &mut impl Read) -> io::Result<Self> {
        let len = r.read_u32::<LE>()? as usize;
        let mut out = std::collections::HashMap::with_capacity(len.min(1 << 20));
        for _ in 0..len {
            let k = K::deserialize(r)?;
            let v = V::deserialize(r)?;
            out.insert(k, v);
        }
        Ok(out)
    }
}

impl<T> BinarySerialization for std::collections::HashSet<T>
where
    T: BinarySerialization,
{
    fn serialize(&self, w: &mut impl Write) -> io::Result<()> {
        w.write_u32::<LE>(self.len() as u32)?;
        for item in self {
            item.serialize(w)?;
        }
        Ok(())
    }
}
impl<T> BinaryDeserialization for std::collections::HashSet<T>
where
    T: BinaryDeserialization + std::hash::Hash + Eq,
{
    fn deserialize(r: &mut impl Read) -> io::Result<Self> {
        let len = r.read_u32::<LE>()? as usize;
        let mut out = std::collections::HashSet::with_capacity(len.min(1 << 20));
        for _ in 0..len {
            out.insert(T::deserialize(r)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn roundtrip_primitives() {
        let mut buf = Vec::new();
        42u32.serialize(&mut buf).unwrap();
        "hello".to_string().serialize(&mut buf).unwrap();
        true.serialize(&mut buf).unwrap();

        let mut r = buf.as_slice();
        assert_eq!(42u32, u32::deserialize(&mut r).unwrap());
        assert_eq!("hello".to_string(), String::deserialize(&mut r).unwrap());
        assert!(bool::deserialize(&mut r).unwrap());
    }

    #[test]
    fn roundtrip_option() {
        let mut buf = Vec::new();
        Some(5u32).serialize(&mut buf).unwrap();
        None::<u32>.serialize(&mut buf).unwrap();
        let mut r = buf.as_slice();
        assert_eq!(Some(5u32), Option::<u32>::deserialize(&mut r).unwrap());
        assert_eq!(None, Option::<u32>::deserialize(&mut r).unwrap());
    }

    #[test]
    fn roundtrip_vec() {
        let data = vec![1u32, 2, 3, 4];
        let mut buf = Vec::new();
        data.serialize(&mut buf).unwrap();
        let mut r = buf.as_slice();
        assert_eq!(data, Vec::<u32>::deserialize(&mut r).unwrap());
    }
}
