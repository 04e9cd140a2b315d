//! Tree navigation and context isolation.

mod common;

use spark_layout::{HostContext, Node};

fn setup() -> HostContext {
    common::init_tracing();
    HostContext::new()
}

#[test]
fn test_parent_and_child_are_symmetric() {
    let ctx = setup();
    let parent = Node::create(&ctx).unwrap();
    let children: Vec<Node> = (0..4).map(|_| Node::create(&ctx).unwrap()).collect();
    for (index, child) in children.iter().enumerate() {
        parent.insert_child(child, index).unwrap();
    }

    for (index, child) in children.iter().enumerate() {
        assert_eq!(parent.get_child(index).unwrap().as_ref(), Some(child));
        assert_eq!(child.get_parent().unwrap(), Some(parent.clone()));
    }
}

#[test]
fn test_insert_at_index_shifts_later_children() {
    let ctx = setup();
    let parent = Node::create(&ctx).unwrap();
    let first = Node::create(&ctx).unwrap();
    let last = Node::create(&ctx).unwrap();
    let middle = Node::create(&ctx).unwrap();

    parent.insert_child(&first, 0).unwrap();
    parent.insert_child(&last, 1).unwrap();
    parent.insert_child(&middle, 1).unwrap();

    assert_eq!(parent.get_child(0).unwrap(), Some(first));
    assert_eq!(parent.get_child(1).unwrap(), Some(middle));
    assert_eq!(parent.get_child(2).unwrap(), Some(last));
}

#[test]
fn test_out_of_range_child_is_absent() {
    let ctx = setup();
    let parent = Node::create(&ctx).unwrap();
    parent.insert_child(&Node::create(&ctx).unwrap(), 0).unwrap();

    assert_eq!(parent.get_child(1).unwrap(), None);
    assert_eq!(parent.get_child(usize::MAX).unwrap(), None);
    assert_eq!(parent.get_parent().unwrap(), None);
}

#[test]
fn test_removed_child_loses_its_parent() {
    let ctx = setup();
    let parent = Node::create(&ctx).unwrap();
    let child = Node::create(&ctx).unwrap();
    parent.insert_child(&child, 0).unwrap();

    parent.remove_child(&child).unwrap();

    assert_eq!(child.get_parent().unwrap(), None);
    assert_eq!(parent.get_child_count().unwrap(), 0);

    // Detached nodes can be attached elsewhere
    let other = Node::create(&ctx).unwrap();
    other.insert_child(&child, 0).unwrap();
    assert_eq!(child.get_parent().unwrap(), Some(other));
}

#[test]
fn test_removing_a_non_child_is_a_no_op() {
    let ctx = setup();
    let parent = Node::create(&ctx).unwrap();
    let stranger = Node::create(&ctx).unwrap();

    parent.remove_child(&stranger).unwrap();
    assert_eq!(parent.get_child_count().unwrap(), 0);
}

#[test]
fn test_attached_child_cannot_be_inserted_twice() {
    let ctx = setup();
    let first = Node::create(&ctx).unwrap();
    let second = Node::create(&ctx).unwrap();
    let child = Node::create(&ctx).unwrap();
    first.insert_child(&child, 0).unwrap();

    assert!(second.insert_child(&child, 0).unwrap_err().is_invariant_violation());
    assert_eq!(child.get_parent().unwrap(), Some(first));
}

// =============================================================================
// CONTEXT ISOLATION
// =============================================================================

#[test]
fn test_independent_nodes_never_resolve_to_each_other() {
    let ctx = setup();
    let a = Node::create(&ctx).unwrap();
    let b = Node::create(&ctx).unwrap();
    assert_ne!(a, b);

    let root = Node::create(&ctx).unwrap();
    root.insert_child(&a, 0).unwrap();
    root.insert_child(&b, 1).unwrap();

    assert_eq!(root.get_child(0).unwrap(), Some(a.clone()));
    assert_eq!(root.get_child(1).unwrap(), Some(b.clone()));
    assert_ne!(root.get_child(0).unwrap(), Some(b));
}

#[test]
fn test_trees_cannot_span_host_contexts() {
    let ctx_a = setup();
    let ctx_b = HostContext::new();
    let a = Node::create(&ctx_a).unwrap();
    let b = Node::create(&ctx_b).unwrap();

    assert!(a.insert_child(&b, 0).unwrap_err().is_invariant_violation());
    assert!(a.remove_child(&b).unwrap_err().is_invariant_violation());
    assert_eq!(a.get_child_count().unwrap(), 0);
    assert_eq!(b.get_parent().unwrap(), None);
}
