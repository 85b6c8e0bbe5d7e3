use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum AttrKind {
    Static,    // class="app"
    Bind,      // :value="count"
    On,        // @click="increment"
    Directive, // v-if="cond"
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateAttr {
    pub name: String,
    pub value: Option<String>,
    pub kind: AttrKind,
}

/// One `v-else-if` / `v-else` block chained onto a `v-if` element. The
/// primary branch is the element itself (its test lives in `if_expr`);
/// `exp` is `None` for a trailing `v-else`.
#[derive(Debug, Clone, PartialEq)]
pub struct IfBranch {
    pub exp: Option<String>,
    pub block: Node,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementNode {
    pub tag: String,
    pub attrs: Vec<TemplateAttr>,
    pub attrs_map: HashMap<String, String>,
    pub children: Vec<Node>,
    pub if_expr: Option<String>,
    pub if_conditions: Vec<IfBranch>,
    pub for_expr: Option<String>,
    /// `v-once`: render once, then treat as static.
    pub once: bool,
    /// `v-pre`: skip directive processing for this subtree entirely.
    pub pre: bool,
    pub has_bindings: bool,
    /// Names of directive metadata the parser attached beyond the baseline
    /// element shape (e.g. "key", "ref", "staticClass"). Checked against
    /// `CompileOptions::static_keys` by the optimizer.
    pub extra_keys: Vec<String>,
    /// Source offsets for diagnostics; filled by the parser in dev builds.
    pub start: Option<usize>,
    pub end: Option<usize>,
    // Annotations written by the optimizer, read-only afterwards.
    pub is_static: bool,
    pub static_root: bool,
    pub static_in_for: bool,
}

impl ElementNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            attrs_map: HashMap::new(),
            children: Vec::new(),
            if_expr: None,
            if_conditions: Vec::new(),
            for_expr: None,
            once: false,
            pre: false,
            has_bindings: false,
            extra_keys: Vec::new(),
            start: None,
            end: None,
            is_static: false,
            static_root: false,
            static_in_for: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(ElementNode),
    /// Text with an embedded reactive expression (`{{ expr }}`).
    Expression(String),
    Text(String),
}

impl Node {
    pub fn element(tag: impl Into<String>) -> Node {
        Node::Element(ElementNode::new(tag))
    }

    pub fn text(t: impl Into<String>) -> Node {
        Node::Text(t.into())
    }

    pub fn expression(expr: impl Into<String>) -> Node {
        Node::Expression(expr.into())
    }

    /// Whether this node's rendered output can ever change. Expression text
    /// is never static, plain text always is; elements carry the answer the
    /// optimizer computed for their whole subtree.
    pub fn is_static(&self) -> bool {
        match self {
            Node::Element(el) => el.is_static,
            Node::Expression(_) => false,
            Node::Text(_) => true,
        }
    }

    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }
}
