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

use std::{io, marker::PhantomData};

use crate::{
    node::Node,
    value::{FromValue, ToValue},
};

/// A wire format for `Node` trees. The YAML and binary backends each implement
/// this; `IoTree` itself carries all the cursor/navigation logic once, shared
/// across both — mirrors how `dess-vfs::directory` layers a tree format over a
/// single underlying writer rather than duplicating traversal per format.
pub trait TreeBackend {
    fn parse(bytes: &[u8]) -> io::Result<Node>;
    fn write(node: &Node, out: &mut impl io::Write) -> io::Result<()>;
}

#[derive(Debug, Clone)]
enum Step {
    Key(String),
    Index(usize),
}

/// Cursor-based reader/writer over a [`Node`] tree. The cursor starts at the
/// root; `find_child`/`append_child`/`first_child`/`next_sibling` move it,
/// `pop` moves it back up. `read_value`/`write_value` act on whatever node the
/// cursor currently sits on.
pub struct IoTree<B> {
    root: Node,
    path: Vec<Step>,
    _backend: PhantomData<B>,
}

impl<B: TreeBackend> IoTree<B> {
    pub fn create_tree() -> Self {
        Self {
            root: Node::Empty,
            path: Vec::new(),
            _backend: PhantomData,
        }
    }

    pub fn parse_data(bytes: &[u8]) -> io::Result<Self> {
        Ok(Self {
            root: B::parse(bytes)?,
            path: Vec::new(),
            _backend: PhantomData,
        })
    }

    pub fn save_tree(&self, out: &mut impl io::Write) -> io::Result<()> {
        B::write(&self.root, out)
    }

    fn current(&self) -> Option<&Node> {
        let mut node = &self.root;
        for step in &self.path {
            node = match (step, node) {
                (Step::Key(k), Node::Map(entries)) => {
                    &entries.iter().find(|(key, _)| key == k)?.1
                }
                (Step::Index(i), Node::List(items)) => items.get(*i)?,
                _ => return None,
            };
        }
        Some(node)
    }

    fn current_mut(&mut self) -> Option<&mut Node> {
        let mut node = &mut self.root;
        for step in &self.path {
            node = match (step, node) {
                (Step::Key(k), Node::Map(entries)) => {
                    &mut entries.iter_mut().find(|(key, _)| key == k)?.1
                }
                (Step::Index(i), Node::List(items)) => items.get_mut(*i)?,
                _ => return None,
            };
        }
        Some(node)
    }

    pub fn is_valid(&self) -> bool {
        self.current().is_some()
    }

    pub fn num_children(&self) -> usize {
        self.current().map(Node::num_children).unwrap_or(0)
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.current().and_then(|n| n.get(name)).is_some()
    }

    /// Moves the cursor into the named child of a map node. Returns `false`
    /// (cursor unchanged) if there is no such child.
    pub fn find_child(&mut self, name: &str) -> bool {
        if !self.has_child(name) {
            return false;
        }
        self.path.push(Step::Key(name.to_string()));
        true
    }

    /// Moves the cursor into a newly appended map entry, creating it (and
    /// converting the current node to a map, if it was `Empty`) as needed. If
    /// `name` already exists its existing child is reused rather than
    /// duplicated.
    pub fn append_child(&mut self, name: &str) {
        self.as_map();
        let node = self.current_mut().expect("append_child on invalid cursor");
        if let Node::Map(entries) = node {
            if !entries.iter().any(|(k, _)| k == name) {
                entries.push((name.to_string(), Node::Empty));
            }
        }
        self.path.push(Step::Key(name.to_string()));
    }

    /// Moves the cursor into a newly appended list item, converting the
    /// current node to a list if it was `Empty`.
    pub fn append_list_item(&mut self) {
        self.as_list();
        let node = self
            .current_mut()
            .expect("append_list_item on invalid cursor");
        let index = if let Node::List(items) = node {
            items.push(Node::Empty);
            items.len() - 1
        } else {
            0
        };
        self.path.push(Step::Index(index));
    }

    /// Moves the cursor to the first child of the current map/list node.
    pub fn first_child(&mut self) -> bool {
        let step = match self.current() {
            Some(Node::Map(entries)) if !entries.is_empty() => Some(Step::Key(entries[0].0.clone())),
            Some(Node::List(items)) if !items.is_empty() => Some(Step::Index(0)),
            _ => None,
        };
        match step {
            Some(step) => {
                self.path.push(step);
                true
            }
            None => false,
        }
    }

    /// Moves the cursor from its current position to the next sibling under
    /// the same parent. Returns `false` (cursor unchanged) if there is none.
    pub fn next_sibling(&mut self) -> bool {
        let Some(last) = self.path.last().cloned() else {
            return false;
        };
        let parent_path = &self.path[..self.path.len() - 1];
        let parent = {
            let mut node = &self.root;
            let mut ok = true;
            for step in parent_path {
                node = match (step, node) {
                    (Step::Key(k), Node::Map(entries)) => {
                        match entries.iter().find(|(key, _)| key == k) {
                            Some((_, v)) => v,
                            None => {
                                ok = false;
                                node
                            }
                        }
                    }
                    (Step::Index(i), Node::List(items)) => match items.get(*i) {
                        Some(v) => v,
                        None => {
                            ok = false;
                            node
                        }
                    },
                    _ => {
                        ok = false;
                        node
                    }
                };
            }
            if !ok {
                return false;
            }
            node
        };

        let next_step = match (&last, parent) {
            (Step::Key(k), Node::Map(entries)) => entries
                .iter()
                .position(|(key, _)| key == k)
                .and_then(|i| entries.get(i + 1))
                .map(|(key, _)| Step::Key(key.clone())),
            (Step::Index(i), Node::List(items)) => {
                (i + 1 < items.len()).then_some(Step::Index(i + 1))
            }
            _ => None,
        };

        match next_step {
            Some(step) => {
                self.path.pop();
                self.path.push(step);
                true
            }
            None => false,
        }
    }

    /// Moves the cursor up to its parent. Returns `false` if already at root.
    pub fn pop(&mut self) -> bool {
        self.path.pop().is_some()
    }

    /// Stamps the current node as a map, if it isn't already one.
    pub fn as_map(&mut self) {
        if let Some(node) = self.current_mut() {
            if !matches!(node, Node::Map(_)) {
                *node = Node::Map(Vec::new());
            }
        }
    }

    /// Stamps the current node as a list, if it isn't already one.
    pub fn as_list(&mut self) {
        if let Some(node) = self.current_mut() {
            if !matches!(node, Node::List(_)) {
                *node = Node::List(Vec::new());
            }
        }
    }

    pub fn read_value<T: FromValue>(&self) -> Option<T> {
        match self.current()? {
            Node::Value(v) => T::from_value(v),
            _ => None,
        }
    }

    pub fn write_value<T: ToValue>(&mut self, value: T) {
        if let Some(node) = self.current_mut() {
            *node = Node::Value(value.to_value());
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::backend::BinaryBackend;

    #[test]
    fn build_and_navigate_a_map() {
        let mut tree = IoTree::<BinaryBackend>::create_tree();
        tree.as_map();
        tree.append_child("width");
        tree.write_value(1920i32);
        tree.pop();
        tree.append_child("height");
        tree.write_value(1080i32);
        tree.pop();

        assert_eq!(2, tree.num_children());
        assert!(tree.find_child("width"));
        assert_eq!(Some(1920i32), tree.read_value());
        tree.pop();
        assert!(tree.find_child("height"));
        assert_eq!(Some(1080i32), tree.read_value());
    }

    #[test]
    fn list_append_and_iterate() {
        let mut tree = IoTree::<BinaryBackend>::create_tree();
        tree.as_list();
        for i in 0..3 {
            tree.append_list_item();
            tree.write_value(i as i32);
            tree.pop();
        }
        assert_eq!(3, tree.num_children());

        assert!(tree.first_child());
        assert_eq!(Some(0i32), tree.read_value());
        assert!(tree.next_sibling());
        assert_eq!(Some(1i32), tree.read_value());
        assert!(tree.next_sibling());
        assert_eq!(Some(2i32), tree.read_value());
        assert!(!tree.next_sibling());
    }

    #[test]
    fn find_child_missing_returns_false_and_leaves_cursor() {
        let mut tree = IoTree::<BinaryBackend>::create_tree();
        tree.as_map();
        assert!(!tree.find_child("nope"));
        assert!(tree.is_valid());
    }
}
