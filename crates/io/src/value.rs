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

/// The primitive value set `IoTree` leaves can hold. `InternedString` is kept
/// distinct from `String` on the wire even though both carry a `String` payload
/// here — `forge-reflect::Strid` round-trips through it without this crate
/// depending on the interner.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int16(i16),
    Int32(i32),
    Uint32(u32),
    Usize(usize),
    Float(f32),
    String(String),
    InternedString(String),
}

pub trait ToValue {
    fn to_value(self) -> Value;
}

pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! value_scalar {
    ($ty:ty, $variant:ident) => {
        impl ToValue for $ty {
            fn to_value(self) -> Value {
                Value::$variant(self)
            }
        }
        impl FromValue for $ty {
            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(*v),
                    _ => None,
                }
            }
        }
    };
}

value_scalar!(bool, Bool);
value_scalar!(i16, Int16);
value_scalar!(i32, Int32);
value_scalar!(u32, Uint32);
value_scalar!(usize, Usize);
value_scalar!(f32, Float);

impl ToValue for String {
    fn to_value(self) -> Value {
        Value::String(self)
    }
}
impl ToValue for &str {
    fn to_value(self) -> Value {
        Value::String(self.to_string())
    }
}
impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) | Value::InternedString(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl ToValue for Value {
    fn to_value(self) -> Value {
        self
    }
}
impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

/// Marker wrapper so callers can write an interned string distinctly from a
/// plain one without this crate knowing about `Strid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternedString(pub String);

impl ToValue for InternedString {
    fn to_value(self) -> Value {
        Value::InternedString(self.0)
    }
}
impl FromValue for InternedString {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::InternedString(s) => Some(InternedString(s.clone())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn scalar_round_trip() {
        let v = 42i32.to_value();
        assert_eq!(Some(42i32), i32::from_value(&v));
        assert_eq!(None::<bool>, bool::from_value(&v));
    }

    #[test]
    fn string_vs_interned_string_distinct_on_wire() {
        let plain = "x".to_string().to_value();
        let interned = InternedString("x".to_string()).to_value();
        assert_ne!(plain, interned);
        assert_eq!(Some("x".to_string()), String::from_value(&plain));
        assert_eq!(Some("x".to_string()), String::from_value(&interned));
    }
}
