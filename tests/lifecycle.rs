//! Wrapper lifecycle: pairing of wrappers with native nodes, recursive
//! teardown and double-destroy rejection.
//!
//! Run with: cargo test --test lifecycle

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use spark_layout::{BridgeError, HostContext, Node};

fn setup() -> HostContext {
    common::init_tracing();
    HostContext::new()
}

/// Build a tree of `depth` levels with `fanout` children per node, naming
/// each node by its path.
fn build_tree(ctx: &HostContext, depth: usize, fanout: usize, name: String, all: &mut Vec<(String, Node)>) -> Node {
    let node = Node::create(ctx).unwrap();
    all.push((name.clone(), node.clone()));
    if depth > 0 {
        for i in 0..fanout {
            let child = build_tree(ctx, depth - 1, fanout, format!("{name}.{i}"), all);
            node.insert_child(&child, i).unwrap();
        }
    }
    node
}

// =============================================================================
// PAIRING
// =============================================================================

#[test]
fn test_wrappers_pair_with_live_nodes() {
    let ctx = setup();
    let root = Node::create(&ctx).unwrap();
    let mut live: Vec<Node> = Vec::new();

    for round in 0..20 {
        let node = Node::create(&ctx).unwrap();
        live.push(node);

        // Every third round destroys the oldest survivor
        if round % 3 == 2 {
            let victim = live.remove(0);
            victim.free().unwrap();
        }

        assert_eq!(ctx.wrapper_count(), live.len() + 1);
        assert_eq!(ctx.node_count().unwrap(), live.len() + 1);
    }

    // Every surviving node resolves to exactly its own wrapper
    for (index, node) in live.iter().enumerate() {
        root.insert_child(node, index).unwrap();
    }
    for (index, node) in live.iter().enumerate() {
        assert_eq!(root.get_child(index).unwrap().as_ref(), Some(node));
    }
}

#[test]
fn test_freed_wrapper_no_longer_resolves() {
    let ctx = setup();
    let parent = Node::create(&ctx).unwrap();
    let child = Node::create(&ctx).unwrap();
    parent.insert_child(&child, 0).unwrap();

    child.free().unwrap();

    assert_eq!(parent.get_child_count().unwrap(), 0);
    assert_eq!(parent.get_child(0).unwrap(), None);
    assert!(child.get_parent().unwrap_err().is_invariant_violation());
}

#[test]
fn test_free_orphans_children_without_freeing_them() {
    let ctx = setup();
    let parent = Node::create(&ctx).unwrap();
    let child = Node::create(&ctx).unwrap();
    parent.insert_child(&child, 0).unwrap();

    parent.free().unwrap();

    assert_eq!(child.get_parent().unwrap(), None);
    assert_eq!(ctx.wrapper_count(), 1);
    child.free().unwrap();
    assert_eq!(ctx.wrapper_count(), 0);
}

// =============================================================================
// RECURSIVE TEARDOWN
// =============================================================================

#[test]
fn test_recursive_free_destroys_whole_subtree_children_first() {
    let ctx = setup();
    let mut all = Vec::new();
    let root = build_tree(&ctx, 3, 3, "r".to_string(), &mut all);
    assert_eq!(all.len(), 1 + 3 + 9 + 27);

    let order = Rc::new(RefCell::new(Vec::new()));
    for (name, node) in &all {
        let order = order.clone();
        let name = name.clone();
        node.on_destroy(move || order.borrow_mut().push(name));
    }

    root.free_recursive().unwrap();

    assert_eq!(ctx.wrapper_count(), 0);
    assert_eq!(ctx.node_count().unwrap(), 0);

    // Post-order: every node is destroyed after all of its descendants
    let order = order.borrow();
    assert_eq!(order.len(), all.len());
    for (position, name) in order.iter().enumerate() {
        let prefix = format!("{name}.");
        assert!(
            order[position + 1..].iter().all(|later| !later.starts_with(&prefix)),
            "{name} destroyed before one of its descendants"
        );
    }
    assert_eq!(order.last().map(String::as_str), Some("r"));
}

#[test]
fn test_recursive_free_of_subtree_leaves_rest_intact() {
    let ctx = setup();
    let root = Node::create(&ctx).unwrap();
    let left = Node::create(&ctx).unwrap();
    let right = Node::create(&ctx).unwrap();
    let leaf = Node::create(&ctx).unwrap();
    root.insert_child(&left, 0).unwrap();
    root.insert_child(&right, 1).unwrap();
    left.insert_child(&leaf, 0).unwrap();

    left.free_recursive().unwrap();

    assert_eq!(root.get_child_count().unwrap(), 1);
    assert_eq!(root.get_child(0).unwrap(), Some(right));
    assert_eq!(ctx.wrapper_count(), 2);
}

// =============================================================================
// DOUBLE DESTROY
// =============================================================================

#[test]
fn test_double_free_is_invariant_violation() {
    let ctx = setup();
    let node = Node::create(&ctx).unwrap();

    node.free().unwrap();
    let err = node.free().unwrap_err();

    assert!(matches!(err, BridgeError::InvariantViolation(_)));
    assert_eq!(ctx.wrapper_count(), 0);
}

#[test]
fn test_double_recursive_free_is_invariant_violation() {
    let ctx = setup();
    let root = Node::create(&ctx).unwrap();
    root.insert_child(&Node::create(&ctx).unwrap(), 0).unwrap();

    root.free_recursive().unwrap();
    assert!(root.free_recursive().unwrap_err().is_invariant_violation());
}

// =============================================================================
// A/B SCENARIO
// =============================================================================

#[test]
fn test_insert_navigate_then_free_recursive() {
    let ctx = setup();
    let a = Node::create(&ctx).unwrap();
    let b = Node::create(&ctx).unwrap();

    a.insert_child(&b, 0).unwrap();

    assert_eq!(a.get_child_count().unwrap(), 1);
    assert_eq!(a.get_child(0).unwrap(), Some(b.clone()));
    assert_eq!(b.get_parent().unwrap(), Some(a.clone()));

    a.free_recursive().unwrap();

    assert!(a.get_child_count().unwrap_err().is_invariant_violation());
    assert!(b.get_parent().unwrap_err().is_invariant_violation());
    assert_eq!(ctx.wrapper_count(), 0);
}
