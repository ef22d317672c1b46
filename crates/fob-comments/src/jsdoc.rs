//! Tree of JSDoc constructs nested inside comment blocks.
//!
//! Hosts that understand JSDoc structure (enum, typedef, callback and template
//! tags and the entities they declare) describe it with a [`JsDocTree`]. Every
//! declaration node hangs, possibly through intermediate nodes, below the
//! [`JsDocNodeKind::Comment`] node spanning the whole raw block it came from.

use std::sync::Arc;

use crate::source::{SourceLocation, SourceUnit};

/// Index of a node inside its [`JsDocTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JsDocNodeId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsDocNodeKind {
    /// The whole `/** ... */` block.
    Comment,
    EnumTag,
    TemplateTag,
    /// One type parameter listed by a template tag.
    TypeParameter,
    ParameterTag,
    PropertyTag,
    CallbackTag,
    TypedefTag,
    /// Structure between a tag and the comment, e.g. a typedef's type literal.
    TypeLiteral,
}

impl JsDocNodeKind {
    fn default_tag_name(self) -> Option<&'static str> {
        match self {
            JsDocNodeKind::EnumTag => Some("@enum"),
            JsDocNodeKind::TemplateTag | JsDocNodeKind::TypeParameter => Some("@template"),
            JsDocNodeKind::ParameterTag => Some("@param"),
            JsDocNodeKind::PropertyTag => Some("@property"),
            JsDocNodeKind::CallbackTag => Some("@callback"),
            JsDocNodeKind::TypedefTag => Some("@typedef"),
            JsDocNodeKind::Comment | JsDocNodeKind::TypeLiteral => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct JsDocNode {
    pub kind: JsDocNodeKind,
    pub start: u32,
    pub end: u32,
    /// Tag token as written, e.g. `@prop` for a property tag spelled that way.
    pub tag_name: Option<String>,
    /// Declared name, e.g. the parameter or typedef name.
    pub name: Option<String>,
    /// Names listed by a template tag, in order.
    pub type_parameters: Vec<String>,
    /// Inline comment text carried by the tag itself.
    pub comment: Option<String>,
    parent: Option<JsDocNodeId>,
}

impl JsDocNode {
    pub fn new(kind: JsDocNodeKind, start: u32, end: u32) -> Self {
        Self {
            kind,
            start,
            end,
            tag_name: None,
            name: None,
            type_parameters: Vec::new(),
            comment: None,
            parent: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the tag token; a missing `@` is added.
    pub fn with_tag_name(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        self.tag_name = Some(if tag.starts_with('@') {
            tag
        } else {
            format!("@{tag}")
        });
        self
    }

    pub fn with_type_parameters<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.type_parameters = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn parent(&self) -> Option<JsDocNodeId> {
        self.parent
    }
}

/// Arena of JSDoc nodes belonging to one source unit.
#[derive(Debug)]
pub struct JsDocTree {
    unit: Arc<SourceUnit>,
    nodes: Vec<JsDocNode>,
}

impl JsDocTree {
    pub fn builder(unit: Arc<SourceUnit>) -> JsDocTreeBuilder {
        JsDocTreeBuilder {
            unit,
            nodes: Vec::new(),
        }
    }

    pub fn unit(&self) -> &Arc<SourceUnit> {
        &self.unit
    }

    /// # Panics
    ///
    /// Panics if `id` was issued by a different tree.
    pub fn node(&self, id: JsDocNodeId) -> &JsDocNode {
        &self.nodes[id.0 as usize]
    }

    /// # Panics
    ///
    /// Panics if `id` was issued by a different tree. Use
    /// [`get_declaration`](Self::get_declaration) for ids of unknown origin.
    pub fn declaration(&self, id: JsDocNodeId) -> JsDocDeclaration<'_> {
        assert!(
            (id.0 as usize) < self.nodes.len(),
            "JSDoc node {} does not belong to this tree",
            id.0
        );
        JsDocDeclaration { tree: self, id }
    }

    pub fn get_declaration(&self, id: JsDocNodeId) -> Option<JsDocDeclaration<'_>> {
        self.nodes
            .get(id.0 as usize)
            .map(|_| JsDocDeclaration { tree: self, id })
    }

    /// Ids of all nodes, in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = JsDocNodeId> + '_ {
        (0..self.nodes.len() as u32).map(JsDocNodeId)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

pub struct JsDocTreeBuilder {
    unit: Arc<SourceUnit>,
    nodes: Vec<JsDocNode>,
}

impl JsDocTreeBuilder {
    /// Adds a comment block node spanning `start..end`.
    pub fn comment(&mut self, start: u32, end: u32) -> JsDocNodeId {
        self.push(None, JsDocNode::new(JsDocNodeKind::Comment, start, end))
    }

    pub fn child(&mut self, parent: JsDocNodeId, node: JsDocNode) -> JsDocNodeId {
        self.push(Some(parent), node)
    }

    fn push(&mut self, parent: Option<JsDocNodeId>, mut node: JsDocNode) -> JsDocNodeId {
        let id = JsDocNodeId(self.nodes.len() as u32);
        node.parent = parent;
        self.nodes.push(node);
        id
    }

    pub fn build(self) -> JsDocTree {
        JsDocTree {
            unit: self.unit,
            nodes: self.nodes,
        }
    }
}

/// A node viewed as the declaration of a documented sub-entity.
#[derive(Debug, Clone, Copy)]
pub struct JsDocDeclaration<'a> {
    tree: &'a JsDocTree,
    id: JsDocNodeId,
}

impl<'a> JsDocDeclaration<'a> {
    pub fn tree(&self) -> &'a JsDocTree {
        self.tree
    }

    pub fn id(&self) -> JsDocNodeId {
        self.id
    }

    pub fn node(&self) -> &'a JsDocNode {
        self.tree.node(self.id)
    }

    pub fn kind(&self) -> JsDocNodeKind {
        self.node().kind
    }

    pub fn parent(&self) -> Option<JsDocDeclaration<'a>> {
        self.node().parent.map(|id| self.tree.declaration(id))
    }

    /// Tag token naming this construct, e.g. `@param`.
    pub fn tag_name(&self) -> Option<&'a str> {
        let node = self.node();
        node.tag_name
            .as_deref()
            .or_else(|| node.kind.default_tag_name())
    }

    /// Nearest ancestor that spans the whole comment block.
    pub fn enclosing_comment(&self) -> Option<JsDocDeclaration<'a>> {
        let mut current = self.parent();
        while let Some(node) = current {
            if node.kind() == JsDocNodeKind::Comment {
                return Some(node);
            }
            current = node.parent();
        }
        None
    }

    pub fn location(&self) -> SourceLocation {
        self.tree.unit.location(self.node().start)
    }
}
