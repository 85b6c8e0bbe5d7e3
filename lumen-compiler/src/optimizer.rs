use std::collections::HashSet;

use crate::template_ast::{ElementNode, Node};

/// Compiler configuration, threaded explicitly through every pass instead of
/// living in module-level state.
#[derive(Default)]
pub struct CompileOptions {
    /// Extra AST metadata keys allowed on an element without disqualifying
    /// it from static status (the structural fields are always allowed).
    pub static_keys: Vec<String>,
    /// Platform predicate: is this tag a built-in element rather than a
    /// user component? Unset means "reject everything".
    pub is_reserved_tag: Option<Box<dyn Fn(&str) -> bool>>,
}

impl CompileOptions {
    fn reserved(&self, tag: &str) -> bool {
        match &self.is_reserved_tag {
            Some(f) => f(tag),
            None => false,
        }
    }
}

/// `slot` and `component` get special codegen and are never static.
fn is_built_in_tag(tag: &str) -> bool {
    matches!(tag, "slot" | "component")
}

/// Walk the parsed template tree and flag sub-trees that never change.
///
/// Detected sub-trees can be hoisted into constants (no fresh nodes per
/// re-render) and skipped entirely during patching. Two passes: mark every
/// non-static node, then pick the roots worth hoisting.
pub fn optimize(root: Option<&mut Node>, options: &CompileOptions) {
    let Some(root) = root else { return };
    let static_keys: HashSet<&str> = options.static_keys.iter().map(|k| k.as_str()).collect();
    mark_static(root, &static_keys, options, false);
    mark_static_roots(root, false);
}

/// Post-order staticness: an element is static only if it qualifies on its
/// own AND every rendered child and conditional branch is static.
/// `in_template_for` is true when this node sits directly under a chain of
/// `<template>` ancestors of which one carries `v-for`.
fn mark_static(
    node: &mut Node,
    static_keys: &HashSet<&str>,
    options: &CompileOptions,
    in_template_for: bool,
) {
    let Node::Element(el) = node else {
        // Text and expression staticness is inherent to the variant.
        return;
    };

    el.is_static = is_static_element(el, static_keys, options, in_template_for);

    // Do not descend into component slot content: the parent component must
    // be able to mutate injected slot nodes, and static slot content breaks
    // hot reload. Reserved tags, `slot` itself and inline-template hosts
    // still propagate normally.
    if !options.reserved(&el.tag)
        && el.tag != "slot"
        && !el.attrs_map.contains_key("inline-template")
    {
        return;
    }

    // Children of a looping <template> must be re-evaluated each iteration.
    let child_in_for = el.tag == "template" && (el.for_expr.is_some() || in_template_for);
    for child in &mut el.children {
        mark_static(child, static_keys, options, child_in_for);
        if !child.is_static() {
            el.is_static = false;
        }
    }

    // v-else-if / v-else blocks occupy the same tree position as this node,
    // so they inherit this node's template-for status, not its children's.
    for branch in &mut el.if_conditions {
        mark_static(&mut branch.block, static_keys, options, in_template_for);
        if !branch.block.is_static() {
            el.is_static = false;
        }
    }
}

fn is_static_element(
    el: &ElementNode,
    static_keys: &HashSet<&str>,
    options: &CompileOptions,
    in_template_for: bool,
) -> bool {
    if el.pre {
        // v-pre opts the element out of directive processing altogether.
        return true;
    }
    !el.has_bindings
        && el.if_expr.is_none()
        && el.for_expr.is_none()
        && !is_built_in_tag(&el.tag)
        && options.reserved(&el.tag)
        && !in_template_for
        && el
            .extra_keys
            .iter()
            .all(|k| static_keys.contains(k.as_str()))
}

/// Pre-order hoisting pass. `is_in_for` turns true once any ancestor carries
/// `v-for`; downstream codegen uses it for static-key reuse decisions.
fn mark_static_roots(node: &mut Node, is_in_for: bool) {
    let Node::Element(el) = node else { return };

    if el.is_static || el.once {
        el.static_in_for = is_in_for;
    }

    // A root must have children beyond a single text node; hoisting a lone
    // text child costs more bookkeeping than rendering it fresh.
    if el.is_static
        && !el.children.is_empty()
        && !(el.children.len() == 1 && matches!(el.children[0], Node::Text(_)))
    {
        el.static_root = true;
        // The whole subtree hoists as one unit; nothing below needs marking.
        return;
    }
    el.static_root = false;

    let child_in_for = is_in_for || el.for_expr.is_some();
    for child in &mut el.children {
        mark_static_roots(child, child_in_for);
    }
    for branch in &mut el.if_conditions {
        // Branch blocks sit at this node's position in the tree, so this
        // node's own v-for does not put them "in" a loop.
        mark_static_roots(&mut branch.block, is_in_for);
    }
}
