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

use forge_assets::{AssetId, AssetMeta};
use forge_io::{IoTree, YamlBackend};
use forge_reflect::Strid;
use uuid::Uuid;

use crate::error::VfsError;

/// Parses a `.res` metadata file: `{ version, uuid, class, loader, deps,
/// description, path_on_disk? }`. `description` is author-facing only and
/// isn't part of the runtime `AssetMeta`, so it's read and discarded.
pub fn parse_res(bytes: &[u8]) -> Result<AssetMeta, VfsError> {
    let mut tree = IoTree::<YamlBackend>::parse_data(bytes)
        .map_err(|e| VfsError::Parse(e.to_string()))?;

    let version = read_required_i32(&mut tree, "version")? as u32;
    let uuid_str = read_required_string(&mut tree, "uuid")?;
    let uuid = Uuid::parse_str(&uuid_str).map_err(|e| VfsError::Parse(e.to_string()))?;
    let class = read_required_string(&mut tree, "class")?;
    let loader = read_required_string(&mut tree, "loader")?;

    let mut meta = AssetMeta::new(Strid::new(class), Strid::new(loader), uuid);
    meta.version = version;

    if tree.find_child("deps") {
        if tree.first_child() {
            loop {
                if let Some(dep) = tree.read_value::<String>() {
                    meta.deps.insert(AssetId::new(dep));
                }
                if !tree.next_sibling() {
                    break;
                }
            }
            tree.pop();
        }
        tree.pop();
    }

    if tree.find_child("path_on_disk") {
        if let Some(path) = tree.read_value::<String>() {
            meta.path_on_disk = Some(path.into());
        }
        tree.pop();
    }

    Ok(meta)
}

/// Writes a `.res` metadata file from an `AssetMeta`.
pub fn write_res(meta: &AssetMeta) -> Vec<u8> {
    let mut tree = IoTree::<YamlBackend>::create_tree();
    tree.as_map();

    tree.append_child("version");
    tree.write_value(meta.version as i32);
    tree.pop();

    tree.append_child("uuid");
    tree.write_value(meta.uuid.to_string());
    tree.pop();

    tree.append_child("class");
    tree.write_value(meta.class_tag.as_str().to_string());
    tree.pop();

    tree.append_child("loader");
    tree.write_value(meta.loader_tag.as_str().to_string());
    tree.pop();

    tree.append_child("deps");
    tree.as_list();
    for dep in &meta.deps {
        tree.append_list_item();
        tree.write_value(dep.name().to_string());
        tree.pop();
    }
    tree.pop();

    if let Some(path) = &meta.path_on_disk {
        tree.append_child("path_on_disk");
        tree.write_value(path.to_string_lossy().to_string());
        tree.pop();
    }

    let mut out = Vec::new();
    tree.save_tree(&mut out).expect("yaml encoding is infallible for this shape");
    out
}

fn read_required_string(tree: &mut IoTree<YamlBackend>, name: &str) -> Result<String, VfsError> {
    if !tree.find_child(name) {
        return Err(VfsError::Parse(format!("missing required field '{name}'")));
    }
    let value = tree.read_value::<String>();
    tree.pop();
    value.ok_or_else(|| VfsError::Parse(format!("field '{name}' is not a string")))
}

fn read_required_i32(tree: &mut IoTree<YamlBackend>, name: &str) -> Result<i32, VfsError> {
    if !tree.find_child(name) {
        return Err(VfsError::Parse(format!("missing required field '{name}'")));
    }
    let value = tree.read_value::<i32>();
    tree.pop();
    value.ok_or_else(|| VfsError::Parse(format!("field '{name}' is not an int")))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trips_through_yaml() {
        let mut meta = AssetMeta::new(Strid::new("Texture"), Strid::new("texture-loader"), Uuid::nil());
        meta.deps.insert(AssetId::new("a"));
        meta.deps.insert(AssetId::new("b"));
        meta.path_on_disk = Some("textures/x.png".into());

        let bytes = write_res(&meta);
        let back = parse_res(&bytes).unwrap();

        assert_eq!(meta.version, back.version);
        assert_eq!(meta.uuid, back.uuid);
        assert_eq!(meta.class_tag, back.class_tag);
        assert_eq!(meta.loader_tag, back.loader_tag);
        assert_eq!(meta.deps, back.deps);
        assert_eq!(meta.path_on_disk, back.path_on_disk);
    }

    #[test]
    fn missing_required_field_is_parse_error() {
        assert!(parse_res(b"class: Texture\n").is_err());
    }
}
