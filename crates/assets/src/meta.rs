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

use std::{
    collections::HashSet,
    io::{self, Read, Write},
    path::PathBuf,
};

use forge_common::{BinaryDeserialization, BinarySerialization};
use forge_reflect::Strid;
use uuid::Uuid;

use crate::asset_id::AssetId;

/// The per-asset on-disk record. Written by the importer alongside the
/// artifact bytes, read by the loader to discover dependencies and locate the
/// right loader plugin — never retained past the load that consumes it.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetMeta {
    pub version: u32,
    pub uuid: Uuid,
    pub class_tag: Strid,
    pub loader_tag: Strid,
    pub deps: HashSet<AssetId>,
    pub import_data_blob: Vec<u8>,
    pub path_on_disk: Option<PathBuf>,
}

impl AssetMeta {
    pub fn new(class_tag: Strid, loader_tag: Strid, uuid: Uuid) -> Self {
        Self {
            version: 1,
            uuid,
            class_tag,
            loader_tag,
            deps: HashSet::new(),
            import_data_blob: Vec::new(),
            path_on_disk: None,
        }
    }
}

impl BinarySerialization for AssetMeta {
    fn serialize(&self, w: &mut impl Write) -> io::Result<()> {
        self.version.serialize(w)?;
        self.uuid.as_bytes().to_vec().serialize(w)?;
        self.class_tag.as_str().to_string().serialize(w)?;
        self.loader_tag.as_str().to_string().serialize(w)?;
        self.deps.iter().cloned().collect::<Vec<_>>().serialize(w)?;
        self.import_data_blob.serialize(w)?;
        self.path_on_disk
            .as_ref()
            .map(|p| p.to_string_lossy().to_string())
            .serialize(w)
    }
}

impl BinaryDeserialization for AssetMeta {
    fn deserialize(r: &mut impl Read) -> io::Result<Self> {
        let version = u32::deserialize(r)?;
        let uuid_bytes = Vec::<u8>::deserialize(r)?;
        let uuid = Uuid::from_slice(&uuid_bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let class_tag = Strid::new(String::deserialize(r)?);
        let loader_tag = Strid::new(String::deserialize(r)?);
        let deps = Vec::<AssetId>::deserialize(r)?.into_iter().collect();
        let import_data_blob = Vec::<u8>::deserialize(r)?;
        let path_on_disk = Option::<String>::deserialize(r)?.map(PathBuf::from);
        Ok(Self {
            version,
            uuid,
            class_tag,
            loader_tag,
            deps,
            import_data_blob,
            path_on_disk,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trips_through_binary_encoding() {
        let mut meta = AssetMeta::new(Strid::new("Texture"), Strid::new("texture-loader"), Uuid::nil());
        meta.deps.insert(AssetId::new("dep-a"));
        meta.import_data_blob = vec![1, 2, 3];
        meta.path_on_disk = Some(PathBuf::from("textures/a.png"));

        let mut buf = Vec::new();
        meta.serialize(&mut buf).unwrap();
        let back = AssetMeta::deserialize(&mut buf.as_slice()).unwrap();
        assert_eq!(meta, back);
    }

    #[test]
    fn path_on_disk_none_round_trips() {
        let meta = AssetMeta::new(Strid::new("Texture"), Strid::new("texture-loader"), Uuid::nil());
        let mut buf = Vec::new();
        meta.serialize(&mut buf).unwrap();
        let back = AssetMeta::deserialize(&mut buf.as_slice()).unwrap();
        assert!(back.path_on_disk.is_none());
    }
}
