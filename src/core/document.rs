//! Arena-backed element tree.
//!
//! A `Document` is the host-side stand-in for a page's DOM: elements with
//! attributes, text nodes, parent links, and the live value of form controls.
//! Nodes are never freed; detached nodes simply stay unreachable from the
//! root. The one exception is text created by [`Document::set_text_content`]:
//! it is overwritten in place or recycled, so a label that is rewritten on
//! every drag tick does not grow the arena.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::DocumentError;

/// Synthetic tag of the root node.
pub const ROOT_TAG: &str = "#document";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct ElementData {
    tag: String,
    attrs: Vec<(String, String)>,
    // Dirty form-control value. `None` means "follow the `value` attribute".
    value: Option<String>,
}

#[derive(Debug, Clone)]
enum NodeData {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
    // Created by `set_text_content`; recyclable once detached.
    scratch: bool,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    revision: u64,
    free_text: Vec<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            data: NodeData::Element(ElementData {
                tag: ROOT_TAG.to_string(),
                attrs: Vec::new(),
                value: None,
            }),
            scratch: false,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            revision: 0,
            free_text: Vec::new(),
        }
    }

    /// Build a document whose root holds the given tree.
    pub fn from_tree(tree: &NodeTree) -> Result<Self, DocumentError> {
        let mut doc = Self::new();
        let root = doc.root();
        doc.append_tree(root, tree)?;
        Ok(doc)
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Mutation counter. Bumped by every change visible through the tree.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        // The root always exists.
        false
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    fn node(&self, id: NodeId) -> Result<&Node, DocumentError> {
        self.nodes
            .get(id.index())
            .ok_or(DocumentError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DocumentError> {
        self.nodes
            .get_mut(id.index())
            .ok_or(DocumentError::UnknownNode(id))
    }

    fn element(&self, id: NodeId) -> Result<&ElementData, DocumentError> {
        match &self.node(id)?.data {
            NodeData::Element(e) => Ok(e),
            NodeData::Text(_) => Err(DocumentError::NotAnElement(id)),
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, DocumentError> {
        match &mut self.node_mut(id)?.data {
            NodeData::Element(e) => Ok(e),
            NodeData::Text(_) => Err(DocumentError::NotAnElement(id)),
        }
    }

    fn push(&mut self, data: NodeData, scratch: bool) -> Result<NodeId, DocumentError> {
        let id = u32::try_from(self.nodes.len())
            .map(NodeId)
            .map_err(|_| DocumentError::Full)?;
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
            scratch,
        });
        Ok(id)
    }

    /// Create a detached element. Tag names are stored lowercase.
    pub fn create_element(&mut self, tag: &str) -> Result<NodeId, DocumentError> {
        self.push(
            NodeData::Element(ElementData {
                tag: tag.to_ascii_lowercase(),
                attrs: Vec::new(),
                value: None,
            }),
            false,
        )
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> Result<NodeId, DocumentError> {
        self.push(NodeData::Text(text.to_string()), false)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DocumentError> {
        self.element(parent)?;
        let child_node = self.node(child)?;
        if child == self.root || child_node.parent.is_some() {
            return Err(DocumentError::AlreadyAttached(child));
        }
        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == child {
                return Err(DocumentError::Cycle { parent, child });
            }
            cursor = self.node(id)?.parent;
        }

        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        self.revision += 1;
        Ok(())
    }

    /// Materialize `tree` and append it under `parent`. Returns the new node.
    pub fn append_tree(&mut self, parent: NodeId, tree: &NodeTree) -> Result<NodeId, DocumentError> {
        let id = match tree {
            NodeTree::Text { text } => self.create_text(text)?,
            NodeTree::Element(el) => {
                let id = self.create_element(&el.tag)?;
                for (k, v) in &el.attrs {
                    self.element_mut(id)?.attrs.push((k.to_ascii_lowercase(), v.clone()));
                }
                for child in &el.children {
                    self.append_tree(id, child)?;
                }
                id
            }
        };
        self.append_child(parent, id)?;
        Ok(id)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.index()).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.index())
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_ok()
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).ok().map(|e| e.tag.as_str())
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        let e = self.element(id).ok()?;
        e.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DocumentError> {
        let e = self.element_mut(id)?;
        match e.attrs.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some((_, v)) => *v = value.to_string(),
            None => e.attrs.push((name.to_ascii_lowercase(), value.to_string())),
        }
        self.revision += 1;
        Ok(())
    }

    /// True when the whitespace-separated `class` attribute contains `class`.
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attribute(id, "class")
            .map(|c| c.split_ascii_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Concatenated text of all descendant text nodes, in document order.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(Node {
            data: NodeData::Text(t),
            ..
        }) = self.nodes.get(id.index())
        {
            out.push_str(t);
            return out;
        }
        for d in self.descendants(id) {
            if let NodeData::Text(t) = &self.nodes[d.index()].data {
                out.push_str(t);
            }
        }
        out
    }

    /// Replace every child of `id` with a single text node (none if `text`
    /// is empty). On a text node, replaces its data.
    ///
    /// An element whose only child is already a text node keeps that node
    /// and has its data overwritten.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> Result<(), DocumentError> {
        if let NodeData::Text(t) = &mut self.node_mut(id)?.data {
            *t = text.to_string();
            self.revision += 1;
            return Ok(());
        }

        let only_child = match self.node(id)?.children[..] {
            [only] => Some(only),
            _ => None,
        };
        if !text.is_empty() {
            if let Some(only) = only_child {
                if let NodeData::Text(t) = &mut self.nodes[only.index()].data {
                    *t = text.to_string();
                    self.revision += 1;
                    return Ok(());
                }
            }
        }

        let old = std::mem::take(&mut self.node_mut(id)?.children);
        for c in old {
            let node = &mut self.nodes[c.index()];
            node.parent = None;
            if node.scratch {
                self.free_text.push(c);
            }
        }
        if !text.is_empty() {
            let t = match self.free_text.pop() {
                Some(t) => {
                    self.nodes[t.index()].data = NodeData::Text(text.to_string());
                    t
                }
                None => self.push(NodeData::Text(text.to_string()), true)?,
            };
            self.nodes[t.index()].parent = Some(id);
            self.node_mut(id)?.children.push(t);
        }
        self.revision += 1;
        Ok(())
    }

    /// Current value of a form control. Falls back to the `value` attribute,
    /// then to the empty string. The string is returned exactly as stored.
    pub fn value(&self, id: NodeId) -> Option<&str> {
        let e = self.element(id).ok()?;
        Some(match &e.value {
            Some(v) => v.as_str(),
            None => self.attribute(id, "value").unwrap_or(""),
        })
    }

    pub fn set_value(&mut self, id: NodeId, value: &str) -> Result<(), DocumentError> {
        self.element_mut(id)?.value = Some(value.to_string());
        self.revision += 1;
        Ok(())
    }

    /// Pre-order traversal of everything under `id`, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { doc: self, stack }
    }

    /// Export the subtree rooted at `id`. Dirty form values are written back
    /// into the `value` attribute so the output reflects what a user sees.
    pub fn to_tree(&self, id: NodeId) -> Option<NodeTree> {
        let node = self.nodes.get(id.index())?;
        Some(match &node.data {
            NodeData::Text(t) => NodeTree::Text { text: t.clone() },
            NodeData::Element(e) => {
                let mut attrs: BTreeMap<String, String> = e.attrs.iter().cloned().collect();
                if let Some(v) = &e.value {
                    attrs.insert("value".to_string(), v.clone());
                }
                NodeTree::Element(ElementBuilder {
                    tag: e.tag.clone(),
                    attrs,
                    children: node.children.iter().filter_map(|c| self.to_tree(*c)).collect(),
                })
            }
        })
    }
}

pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(id).iter().rev().copied());
        Some(id)
    }
}

/// Declarative subtree, used by builders and JSON page fixtures.
///
/// JSON shape: `{"tag": "div", "attrs": {"class": "x"}, "children": [..]}`
/// for elements and `{"text": ".."}` for text nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(untagged))]
pub enum NodeTree {
    Element(ElementBuilder),
    Text { text: String },
}

impl From<ElementBuilder> for NodeTree {
    fn from(el: ElementBuilder) -> Self {
        NodeTree::Element(el)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ElementBuilder {
    pub tag: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "BTreeMap::is_empty"))]
    pub attrs: BTreeMap<String, String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub children: Vec<NodeTree>,
}

impl ElementBuilder {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    /// `<input type="range" value="..">`.
    pub fn range(value: &str) -> Self {
        Self::new("input").attr("type", "range").attr("value", value)
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    /// Add a class to the `class` attribute.
    pub fn class(mut self, class: &str) -> Self {
        let entry = self.attrs.entry("class".to_string()).or_default();
        if !entry.is_empty() {
            entry.push(' ');
        }
        entry.push_str(class);
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.children.push(NodeTree::Text {
            text: text.to_string(),
        });
        self
    }

    pub fn child(mut self, child: ElementBuilder) -> Self {
        self.children.push(NodeTree::Element(child));
        self
    }
}
