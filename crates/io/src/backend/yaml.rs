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

use std::io::{self, Write};

use serde_yaml::Value as Yaml;

use crate::{node::Node, tree::TreeBackend, value::Value};

/// Human-editable backend for `.res`/`.shader` authoring files. Plain strings
/// and interned strings are indistinguishable on this wire — YAML has no slot
/// for that distinction, so round-tripping through it always yields `String`.
pub struct YamlBackend;

fn node_to_yaml(node: &Node) -> Yaml {
    match node {
        Node::Empty => Yaml::Null,
        Node::Value(Value::Bool(v)) => Yaml::Bool(*v),
        Node::Value(Value::Int16(v)) => Yaml::Number((*v as i64).into()),
        Node::Value(Value::Int32(v)) => Yaml::Number((*v as i64).into()),
        Node::Value(Value::Uint32(v)) => Yaml::Number((*v as i64).into()),
        Node::Value(Value::Usize(v)) => Yaml::Number((*v as u64).into()),
        Node::Value(Value::Float(v)) => Yaml::Number((*v as f64).into()),
        Node::Value(Value::String(v) | Value::InternedString(v)) => Yaml::String(v.clone()),
        Node::Map(entries) => Yaml::Mapping(
            entries
                .iter()
                .map(|(k, v)| (Yaml::String(k.clone()), node_to_yaml(v)))
                .collect(),
        ),
        Node::List(items) => Yaml::Sequence(items.iter().map(node_to_yaml).collect()),
    }
}

fn yaml_to_node(yaml: &Yaml) -> Node {
    match yaml {
        Yaml::Null => Node::Empty,
        Yaml::Bool(v) => Node::Value(Value::Bool(*v)),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Node::Value(Value::Int32(i as i32))
            } else {
                Node::Value(Value::Float(n.as_f64().unwrap_or_default() as f32))
            }
        }
        Yaml::String(s) => Node::Value(Value::String(s.clone())),
        Yaml::Sequence(items) => Node::List(items.iter().map(yaml_to_node).collect()),
        Yaml::Mapping(entries) => Node::Map(
            entries
                .iter()
                .map(|(k, v)| {
                    let key = match k {
                        Yaml::String(s) => s.clone(),
                        other => serde_yaml::to_string(other).unwrap_or_default(),
                    };
                    (key, yaml_to_node(v))
                })
                .collect(),
        ),
        Yaml::Tagged(tagged) => yaml_to_node(&tagged.value),
    }
}

impl TreeBackend for YamlBackend {
    fn parse(bytes: &[u8]) -> io::Result<Node> {
        let yaml: Yaml = serde_yaml::from_slice(bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(yaml_to_node(&yaml))
    }

    fn write(node: &Node, out: &mut impl Write) -> io::Result<()> {
        let yaml = node_to_yaml(node);
        let text =
            serde_yaml::to_string(&yaml).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        out.write_all(text.as_bytes())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tree::IoTree;

    #[test]
    fn round_trips_nested_structure() {
        let mut tree = IoTree::<YamlBackend>::create_tree();
        tree.as_map();
        tree.append_child("version");
        tree.write_value(3i32);
        tree.pop();
        tree.append_child("tags");
        tree.as_list();
        tree.append_list_item();
        tree.write_value("a".to_string());
        tree.pop();
        tree.append_list_item();
        tree.write_value("b".to_string());
        tree.pop();
        tree.pop();

        let mut bytes = Vec::new();
        tree.save_tree(&mut bytes).unwrap();

        let parsed = IoTree::<YamlBackend>::parse_data(&bytes).unwrap();
        let mut cursor = parsed;
        assert!(cursor.find_child("version"));
        assert_eq!(Some(3i32), cursor.read_value());
        cursor.pop();
        assert!(cursor.find_child("tags"));
        assert_eq!(2, cursor.num_children());
    }
}
