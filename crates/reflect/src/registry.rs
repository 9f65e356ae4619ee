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

use std::{any::Any, fmt, sync::Arc};

use bitflags::bitflags;
use forge_io::{IoTree, TreeBackend, Value};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::{
    status::{Status, StatusCode, StatusResult},
    strid::Strid,
};

bitflags! {
    /// Per-field metadata flags. `OPTIONAL` fields may be absent on read;
    /// `NO_SAVE_LOAD` fields are runtime-only and skipped on write; `UI_HINT`
    /// marks a field as editor-facing metadata rather than load-bearing state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FieldFlags: u32 {
        const OPTIONAL = 1 << 0;
        const NO_SAVE_LOAD = 1 << 1;
        const UI_HINT = 1 << 2;
    }
}

#[derive(Debug, Clone)]
pub struct FieldInfo {
    pub name: Strid,
    pub flags: FieldFlags,
}

impl FieldInfo {
    pub fn new(name: impl Into<Strid>, flags: FieldFlags) -> Self {
        Self {
            name: name.into(),
            flags,
        }
    }
}

/// A type implementing dynamic, self-describing field access — the Rust stand-in
/// for the original's byte-offset-driven RTTI, which has no safe equivalent here.
/// A registered type exposes its fields by name as [`forge_io::Value`]s instead.
pub trait Reflected: Any + Send + Sync + fmt::Debug {
    fn class_tag(&self) -> Strid;
    fn get_field(&self, name: &str) -> Option<Value>;
    fn set_field(&mut self, name: &str, value: Value) -> bool;
}

type Factory = fn() -> Box<dyn Reflected>;

/// One registered class/struct: its tag, optional parent, ordered field list,
/// and a factory producing a default instance.
pub struct ClassInfo {
    pub tag: Strid,
    pub parent: Option<Strid>,
    pub fields: Vec<FieldInfo>,
    pub factory: Factory,
}

impl fmt::Debug for ClassInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassInfo")
            .field("tag", &self.tag)
            .field("parent", &self.parent)
            .field("fields", &self.fields)
            .finish()
    }
}

impl ClassInfo {
    pub fn instantiate(&self) -> Box<dyn Reflected> {
        (self.factory)()
    }
}

/// Process-wide registry of [`ClassInfo`]s. Types register once at process
/// init (from the CLI's `main`); after that the registry is read-only in
/// practice even though nothing enforces it structurally.
pub struct ClassRegistry {
    classes: Mutex<FxHashMap<Strid, Arc<ClassInfo>>>,
}

static REGISTRY: Lazy<ClassRegistry> = Lazy::new(ClassRegistry::new);

impl ClassRegistry {
    fn new() -> Self {
        Self {
            classes: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn global() -> &'static ClassRegistry {
        &REGISTRY
    }

    pub fn register(&self, info: ClassInfo) {
        let tag = info.tag.clone();
        log::debug!("registering class {tag}");
        self.classes.lock().insert(tag, Arc::new(info));
    }

    pub fn get(&self, tag: &Strid) -> Option<Arc<ClassInfo>> {
        self.classes.lock().get(tag).cloned()
    }

    pub fn is_registered(&self, tag: &Strid) -> bool {
        self.classes.lock().contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.classes.lock().len()
    }
}

/// Walks `info.fields` against `tree`'s current map node, filling `obj`.
/// A missing `OPTIONAL` field is skipped; anything else missing is
/// `FailedParse`, per the type registry's read contract.
pub fn read_fields<B: TreeBackend>(
    obj: &mut dyn Reflected,
    info: &ClassInfo,
    tree: &mut IoTree<B>,
) -> StatusResult<()> {
    for field in &info.fields {
        if !tree.find_child(field.name.as_str()) {
            if field.flags.contains(FieldFlags::OPTIONAL) {
                continue;
            }
            return Err(Status::new(
                StatusCode::FailedParse,
                format!("missing required field '{}'", field.name),
            ));
        }
        let value = tree.read_value::<Value>();
        tree.pop();
        match value {
            Some(value) => {
                obj.set_field(field.name.as_str(), value);
            }
            None => {
                return Err(Status::new(
                    StatusCode::FailedParse,
                    format!("field '{}' is not a leaf value", field.name),
                ))
            }
        }
    }
    Ok(())
}

/// Writes `obj`'s fields into `tree`'s current node (stamped as a map),
/// skipping `NO_SAVE_LOAD` fields.
pub fn write_fields<B: TreeBackend>(obj: &dyn Reflected, info: &ClassInfo, tree: &mut IoTree<B>) {
    tree.as_map();
    for field in &info.fields {
        if field.flags.contains(FieldFlags::NO_SAVE_LOAD) {
            continue;
        }
        if let Some(value) = obj.get_field(field.name.as_str()) {
            tree.append_child(field.name.as_str());
            tree.write_value(value);
            tree.pop();
        }
    }
}

#[cfg(test)]
mod test {
    use forge_io::BinaryBackend;

    use super::*;

    #[derive(Debug, Default)]
    struct Point {
        x: i32,
        y: i32,
    }

    impl Reflected for Point {
        fn class_tag(&self) -> Strid {
            Strid::new("Point")
        }

        fn get_field(&self, name: &str) -> Option<Value> {
            match name {
                "x" => Some(Value::Int32(self.x)),
                "y" => Some(Value::Int32(self.y)),
                _ => None,
            }
        }

        fn set_field(&mut self, name: &str, value: Value) -> bool {
            match (name, value) {
                ("x", Value::Int32(v)) => {
                    self.x = v;
                    true
                }
                ("y", Value::Int32(v)) => {
                    self.y = v;
                    true
                }
                _ => false,
            }
        }
    }

    fn point_class() -> ClassInfo {
        ClassInfo {
            tag: Strid::new("Point"),
            parent: None,
            fields: vec![
                FieldInfo::new("x", FieldFlags::empty()),
                FieldInfo::new("y", FieldFlags::empty()),
            ],
            factory: || Box::new(Point::default()),
        }
    }

    #[test]
    fn register_and_lookup() {
        let registry = ClassRegistry::new();
        registry.register(point_class());
        assert!(registry.is_registered(&Strid::new("Point")));
        assert_eq!(1, registry.len());
    }

    #[test]
    fn write_then_read_round_trips_fields() {
        let info = point_class();
        let point = Point { x: 3, y: 4 };

        let mut tree = IoTree::<BinaryBackend>::create_tree();
        write_fields(&point, &info, &mut tree);

        let mut back = Point::default();
        read_fields(&mut back, &info, &mut tree).unwrap();
        assert_eq!(3, back.x);
        assert_eq!(4, back.y);
    }

    #[test]
    fn missing_optional_field_is_not_an_error() {
        let info = ClassInfo {
            tag: Strid::new("PointOpt"),
            parent: None,
            fields: vec![
                FieldInfo::new("x", FieldFlags::empty()),
                FieldInfo::new("z", FieldFlags::OPTIONAL),
            ],
            factory: || Box::new(Point::default()),
        };
        let point = Point { x: 1, y: 0 };
        let mut tree = IoTree::<BinaryBackend>::create_tree();
        tree.as_map();
        tree.append_child("x");
        tree.write_value(point.x);
        tree.pop();

        let mut back = Point::default();
        assert!(read_fields(&mut back, &info, &mut tree).is_ok());
        assert_eq!(1, back.x);
    }

    #[test]
    fn missing_required_field_is_failed_parse() {
        let info = point_class();
        let mut tree = IoTree::<BinaryBackend>::create_tree();
        tree.as_map();
        let mut back = Point::default();
        let err = read_fields(&mut back, &info, &mut tree).unwrap_err();
        assert_eq!(StatusCode::FailedParse, err.code());
    }
}
