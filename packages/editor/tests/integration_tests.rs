//! Integration tests for the editor crate

use proptest::prelude::*;
use reshaper_editor::{EditorError, Node, NodeData, Workspace};
use reshaper_syntax::{
    parse, print, ElementCollector, Fragment, Location, NodeKind, SyntaxKind, SyntaxNode,
    SyntaxTree,
};
use std::sync::Arc;

const LIST: &str = "const x = <ul><li>a</li><li>b</li><li>c</li><li>d</li></ul>;";

const APP: &str = r#"import React from "react";

export default function App({ user, items }) {
  const header = <h1 className="title">Hi {user.name}</h1>;

  return (
    <main className="app">
      {header}
      <ul>
        {items.map((item) => (
          <li key={item.id} className={item.done ? "done" : "todo"}>
            {item.label}
          </li>
        ))}
      </ul>
      <Button icon={<Icon />} onClick={() => alert("<nope>")}>Go</Button>
    </main>
  );
}
"#;

fn load<'w>(workspace: &'w Workspace, path: &str, source: &str) -> Node<'w> {
    workspace
        .load_file_ast(path, parse(source).unwrap())
        .unwrap()
}

fn printed(workspace: &Workspace, path: &str) -> String {
    print(&workspace.to_modified_syntax_tree(path).unwrap())
}

/// The `<ul>` of `LIST` and its items
fn list<'w>(root: &Node<'w>) -> (Node<'w>, Vec<Node<'w>>) {
    let ul = root.descendant_at(&[0, 0]).unwrap();
    let items = ul.children();
    (ul, items)
}

/// Bare markup container, free to take any children
fn placeholder() -> NodeData {
    NodeData::syntax_node(Arc::new(SyntaxNode::new(
        Location::default(),
        NodeKind::Fragment(Fragment::default()),
    )))
}

#[test]
fn test_insert_before_scenario() {
    let workspace = Workspace::new();
    let store = workspace.store();
    store.set("a", placeholder());
    store.set("b", placeholder().with_position("a", "B".to_string()));
    store.set("c", placeholder().with_position("a", "C".to_string()));

    let a = workspace.node("a").unwrap();
    let b = workspace.node("b").unwrap();
    let c = workspace.node("c").unwrap();

    let moved = a.insert_before(&[c.clone()], Some(&b));

    assert_eq!(moved, vec![c]);
    assert_eq!(workspace.parenting().get_children("a").items, vec!["c", "b"]);
    assert_eq!(store.get("b").unwrap().order.as_deref(), Some("B"));
}

#[test]
fn test_insert_between_leaves_siblings_untouched() {
    let workspace = Workspace::new();
    let store = workspace.store();
    store.set("p", placeholder());
    for id in ["x", "y", "n1", "n2", "n3"] {
        store.set(id, placeholder());
    }

    let p = workspace.node("p").unwrap();
    let node = |id: &str| workspace.node(id).unwrap();
    p.append(&[node("x"), node("y")]);
    let x_key = store.get("x").unwrap().order.clone();
    let y_key = store.get("y").unwrap().order.clone();

    p.insert_before(&[node("n1"), node("n2"), node("n3")], Some(&node("y")));

    assert_eq!(
        workspace.parenting().get_children("p").items,
        vec!["x", "n1", "n2", "n3", "y"]
    );
    assert_eq!(store.get("x").unwrap().order, x_key);
    assert_eq!(store.get("y").unwrap().order, y_key);
}

#[test]
fn test_cycle_prevention() {
    let workspace = Workspace::new();
    let root = load(&workspace, "t.jsx", LIST);
    let (ul, items) = list(&root);
    let statement = ul.parent().unwrap();

    assert!(ul.insert_before(&[ul.clone()], Some(&items[0])).is_empty());
    assert!(ul.insert_before(&[statement.clone(), root.clone()], None).is_empty());
    assert_eq!(ul.parent(), Some(statement));
    assert!(root.parent().is_none());
    assert_eq!(ul.children(), items);
}

#[test]
fn test_insert_before_foreign_next_appends() {
    let workspace = Workspace::new();
    let root = load(&workspace, "t.jsx", LIST);
    let (ul, items) = list(&root);
    let text = items[0].child_at(0).unwrap();

    ul.insert_before(&[items[1].clone()], Some(&text));

    assert_eq!(ul.children().len(), 4);
    assert_eq!(ul.children().last(), Some(&items[1]));
    assert_eq!(text.parent(), Some(items[0].clone()));
}

#[test]
fn test_index_paths_follow_structure() {
    let workspace = Workspace::new();
    let root = load(&workspace, "src/App.jsx", APP);

    assert!(root.index_path().is_empty());
    assert_eq!(root.index(), None);

    for node in root.descendants() {
        let parent = node.parent().unwrap();
        let mut expected = parent.index_path();
        expected.push(node.index().unwrap());
        assert_eq!(node.index_path(), expected);
        assert_eq!(root.descendant_at(&expected), Some(node.clone()));
        assert!(node.siblings().contains(&node));
        assert_eq!(node.root(), root);
        assert_eq!(node.ancestors().first(), Some(&root));
    }
}

#[test]
fn test_siblings_and_tree_view_neighbours() {
    let workspace = Workspace::new();
    let root = load(&workspace, "t.jsx", LIST);
    let (ul, items) = list(&root);

    assert_eq!(items[1].previous_sibling(), Some(items[0].clone()));
    assert_eq!(items[1].next_sibling(), Some(items[2].clone()));
    assert_eq!(items[0].previous_sibling(), None);
    assert_eq!(items[3].next_sibling(), None);

    // Collapsed items step over their text
    assert_eq!(items[0].next_in_tree_view(), Some(items[1].clone()));
    assert_eq!(items[0].prev_in_tree_view(), Some(ul.clone()));

    items[0].set_expanded(true);
    let text = items[0].child_at(0).unwrap();
    assert_eq!(items[0].next_in_tree_view(), Some(text.clone()));
    assert_eq!(text.next_in_tree_view(), Some(items[1].clone()));
    assert_eq!(items[1].prev_in_tree_view(), Some(text));

    assert_eq!(items[3].next_in_tree_view(), None);
}

#[test]
fn test_selection_exclusivity() {
    let workspace = Workspace::new();
    let root = load(&workspace, "t.jsx", "x = <div><p><b>t</b></p></div>;");
    let div = root.descendant_at(&[0, 0]).unwrap();
    let p = div.child_at(0).unwrap();
    let b = p.child_at(0).unwrap();

    b.select();
    p.select();
    div.select();

    assert!(div.selected());
    assert!(!p.selected());
    assert!(!b.selected());
    for node in div.descendants() {
        assert!(node.ancestor_selected());
    }
    assert!(!root.ancestor_selected());
    assert_eq!(workspace.selected_nodes(), vec![div.clone()]);

    div.deselect();
    assert!(workspace.selection().is_empty());
}

#[test]
fn test_deselect_cascades() {
    let workspace = Workspace::new();
    let root = load(&workspace, "t.jsx", LIST);
    let (ul, items) = list(&root);

    workspace.selection().insert(items[2].id());
    ul.deselect();
    assert!(!items[2].selected());
}

#[test]
fn test_select_between_walks_visible_rows() {
    let workspace = Workspace::new();
    let root = load(&workspace, "t.jsx", LIST);
    let (_, items) = list(&root);
    items[0].select();

    Node::select_between(&[items[3].clone(), items[1].clone()]);

    assert_eq!(
        workspace.selected_nodes(),
        vec![items[1].clone(), items[2].clone(), items[3].clone()]
    );
    assert!(!items[0].selected());
}

#[test]
fn test_select_between_enters_expanded_nodes() {
    let workspace = Workspace::new();
    let root = load(&workspace, "t.jsx", LIST);
    let (_, items) = list(&root);
    items[1].set_expanded(true);
    let text = items[1].child_at(0).unwrap();

    workspace.select_between(&[items[1].clone(), items[2].clone()]);

    let selected = workspace.selected_nodes();
    assert_eq!(selected.len(), 3);
    assert!(selected.contains(&text));
    assert!(items[2].selected());
}

#[test]
fn test_delete_removes_subtree_and_selection() {
    let workspace = Workspace::new();
    let root = load(&workspace, "t.jsx", LIST);
    let (ul, items) = list(&root);
    let text = items[1].child_at(0).unwrap();
    text.select();
    workspace.set_hovered(Some(text.id()));

    items[1].delete();

    assert!(!items[1].exists());
    assert!(!text.exists());
    assert!(workspace.selection().is_empty());
    assert!(workspace.hovered().is_none());
    assert_eq!(ul.children().len(), 3);
    assert!(matches!(
        workspace.node(text.id()),
        Err(EditorError::NotFound { .. })
    ));
    assert_eq!(
        printed(&workspace, "t.jsx"),
        "const x = <ul><li>a</li><li>c</li><li>d</li></ul>;"
    );
}

#[test]
fn test_undo_redo_coalesces_edits() {
    let workspace = Workspace::new();
    let root = load(&workspace, "t.jsx", LIST);
    let (ul, items) = list(&root);
    assert!(!workspace.undo().can_undo());

    items[0].set_class_name("first");
    ul.insert_before(&[items[3].clone()], Some(&items[0]));
    items[1].delete();
    let edited = printed(&workspace, "t.jsx");
    assert_eq!(
        edited,
        "const x = <ul><li>d</li><li className=\"first\">a</li><li>c</li></ul>;"
    );
    assert_eq!(workspace.undo().undo_levels(), 1);

    assert!(workspace.undo().undo());
    assert_eq!(printed(&workspace, "t.jsx"), LIST);

    for _ in 0..3 {
        assert!(workspace.undo().redo());
        assert!(workspace.undo().undo());
    }
    assert_eq!(printed(&workspace, "t.jsx"), LIST);

    assert!(workspace.undo().redo());
    assert_eq!(printed(&workspace, "t.jsx"), edited);
}

#[test]
fn test_reconstruction_is_identity_without_edits() {
    let workspace = Workspace::new();
    load(&workspace, "src/App.jsx", APP);

    let once = printed(&workspace, "src/App.jsx");
    assert_eq!(once, APP);
    assert_eq!(printed(&workspace, "src/App.jsx"), once);
}

#[test]
fn test_overlays_reach_source() {
    let source = "x = <div className=\"a b\"><p>hi</p>{label}</div>;";
    let workspace = Workspace::new();
    let root = load(&workspace, "t.jsx", source);
    let div = root.descendant_at(&[0, 0]).unwrap();
    let p = div.child_at(0).unwrap();
    let text = p.child_at(0).unwrap();

    assert_eq!(div.class_name().as_deref(), Some("a b"));
    assert_eq!(text.text().as_deref(), Some("hi"));

    div.set_class_name("c");
    text.set_text("bye");
    p.set_class_name("para");
    // Overlays only apply to the matching kind
    text.set_class_name("ignored");
    div.set_text("ignored");

    assert_eq!(
        printed(&workspace, "t.jsx"),
        "x = <div className=\"c\"><p className=\"para\">bye</p>{label}</div>;"
    );
}

#[test]
fn test_edited_values_survive_reparse() {
    let workspace = Workspace::new();
    let root = load(&workspace, "t.jsx", "x = <p className=\"a\">hi</p>;");
    let p = root.descendant_at(&[0, 0]).unwrap();

    p.child_at(0).unwrap().set_text("a {b} <c");
    p.set_class_name("it's \"q\"");
    let edited = printed(&workspace, "t.jsx");
    assert_eq!(
        edited,
        "x = <p className={\"it's \\\"q\\\"\"}>a {\"{\"}b{\"}\"} {\"<\"}c</p>;"
    );

    let reparsed = Workspace::new();
    load(&reparsed, "t.jsx", &edited);
    assert_eq!(printed(&reparsed, "t.jsx"), edited);
}

#[test]
fn test_reorder_inside_expression_container() {
    let source = "x = <ul>{cond && <><b>1</b><i>2</i></>}</ul>;";
    let workspace = Workspace::new();
    let root = load(&workspace, "t.jsx", source);
    let ul = root.descendant_at(&[0, 0]).unwrap();
    let wrapper = ul.child_at(0).unwrap();
    assert_eq!(wrapper.kind(), Some(SyntaxKind::Wrapper));

    let fragment = wrapper.child_at(0).unwrap();
    let children = fragment.children();
    fragment.insert_before(&[children[1].clone()], Some(&children[0]));

    assert_eq!(
        printed(&workspace, "t.jsx"),
        "x = <ul>{cond && <><i>2</i><b>1</b></>}</ul>;"
    );
}

#[test]
fn test_move_between_parents() {
    let source = "x = <div><p>a</p><section></section></div>;";
    let workspace = Workspace::new();
    let root = load(&workspace, "t.jsx", source);
    let div = root.descendant_at(&[0, 0]).unwrap();
    let p = div.child_at(0).unwrap();
    let section = div.child_at(1).unwrap();

    assert!(p.draggable());
    assert!(section.droppable());
    assert!(!p.child_at(0).unwrap().droppable());

    section.append(&[p.clone()]);

    assert_eq!(p.parent(), Some(section));
    assert_eq!(
        printed(&workspace, "t.jsx"),
        "x = <div><section><p>a</p></section></div>;"
    );
}

#[test]
fn test_nodes_inside_code_stay_put() {
    let source = "x = <div>{ok && <a />}<b /></div>;";
    let workspace = Workspace::new();
    let root = load(&workspace, "t.jsx", source);
    let statement = root.child_at(0).unwrap();
    let div = statement.child_at(0).unwrap();
    let wrapper = div.child_at(0).unwrap();
    let a = wrapper.child_at(0).unwrap();
    let b = div.child_at(1).unwrap();

    assert!(!a.movable());
    assert!(!div.movable());
    assert!(wrapper.movable());

    assert!(!a.delete());
    assert!(a.exists());
    assert_eq!(wrapper.children(), vec![a.clone()]);

    assert!(div.insert_before(&[a.clone()], Some(&b)).is_empty());
    assert_eq!(a.parent(), Some(wrapper.clone()));

    // Nothing goes into a node whose children are spliced into code
    assert!(wrapper.append(&[b.clone()]).is_empty());
    assert!(statement.append(&[b.clone()]).is_empty());
    assert_eq!(b.parent(), Some(div.clone()));

    assert!(!div.delete());
    assert_eq!(printed(&workspace, "t.jsx"), source);
}

#[test]
fn test_tree_and_printed_source_agree_after_edits() {
    let source = "x = <div>{ok && <a />}<b /><i /></div>;";
    let workspace = Workspace::new();
    let root = load(&workspace, "t.jsx", source);
    let div = root.descendant_at(&[0, 0]).unwrap();
    let children = div.children();
    let (wrapper, b, i) = (&children[0], &children[1], &children[2]);

    div.insert_before(&[i.clone()], Some(wrapper));
    assert!(b.delete());
    let edited = printed(&workspace, "t.jsx");
    assert_eq!(edited, "x = <div><i />{ok && <a />}</div>;");

    let reparsed = Workspace::new();
    let reparsed_root = load(&reparsed, "t.jsx", &edited);
    assert_eq!(
        reparsed_root.to_outline().render(),
        root.to_outline().render()
    );

    workspace.update_correlation_indices("t.jsx").unwrap();
    let a = wrapper.child_at(0).unwrap();
    assert_eq!(workspace.correlation_index(i), Some(1));
    assert_eq!(workspace.correlation_index(&a), Some(2));
    assert_eq!(workspace.file("t.jsx").unwrap().correlated_len(), 3);
}

#[test]
fn test_code_only_statements_have_no_nodes() {
    let source = "import a from \"a\";\nconst b = 1;\nconst c = <span />;\n";
    let workspace = Workspace::new();
    let root = load(&workspace, "t.jsx", source);

    let statements = root.children();
    assert_eq!(statements.len(), 1);
    assert_eq!(statements[0].kind(), Some(SyntaxKind::Other));
    assert_eq!(statements[0].child_at(0).unwrap().name().as_deref(), Some("span"));
    assert_eq!(printed(&workspace, "t.jsx"), source);
}

#[test]
fn test_correlation_matches_element_order() {
    let workspace = Workspace::new();
    load(&workspace, "src/App.jsx", APP);
    let tree = parse(APP).unwrap();
    let elements = ElementCollector::collect(&tree);
    let names: Vec<_> = elements
        .iter()
        .filter_map(|node| node.as_element().map(|e| e.name.as_str()))
        .collect();
    assert_eq!(names, vec!["h1", "main", "ul", "li", "Button", "Icon"]);

    for (index, element) in elements.iter().enumerate() {
        let tag = format!("src/App.jsx:{}", index);
        if element.as_element().map(|e| e.name.as_str()) == Some("Icon") {
            // Elements inside attributes are numbered but have no node
            assert!(matches!(
                workspace.node_for_tag(&tag),
                Err(EditorError::NotFound { id }) if id == tag
            ));
            continue;
        }

        let node = workspace.node_for_tag(&tag).unwrap();
        assert!(node.syntax().unwrap().same_source(element));
        assert_eq!(node.tag(), Some(tag.clone()));
        assert_eq!(workspace.tag_for_node(&node), Some(tag));
    }
}

#[test]
fn test_correlation_follows_reorder() {
    let workspace = Workspace::new();
    let root = load(&workspace, "t.jsx", LIST);
    let (ul, items) = list(&root);

    ul.insert_before(&[items[2].clone()], Some(&items[0]));
    // Stale until renumbered
    assert_eq!(workspace.node_for_location("t.jsx", 1).unwrap(), items[0]);

    workspace.update_correlation_indices("t.jsx").unwrap();
    assert_eq!(workspace.node_for_location("t.jsx", 1).unwrap(), items[2]);
    assert_eq!(workspace.correlation_index(&items[0]), Some(2));
    assert_eq!(workspace.correlation_index(&ul), Some(0));
    assert_eq!(workspace.correlation_index(&root), None);
}

#[test]
fn test_tag_lookup_errors() {
    let workspace = Workspace::new();
    load(&workspace, "c:/work/t.jsx", LIST);

    assert_eq!(workspace.node_for_tag("c:/work/t.jsx:0").unwrap().name().as_deref(), Some("ul"));
    assert_eq!(
        workspace.node_for_tag("nonsense").unwrap_err(),
        EditorError::InvalidTag {
            tag: "nonsense".to_string()
        }
    );
    assert_eq!(
        workspace.node_for_tag("other.jsx:0").unwrap_err(),
        EditorError::FileNotLoaded {
            path: "other.jsx".to_string()
        }
    );
    assert_eq!(
        workspace.node_for_location("c:/work/t.jsx", 99).unwrap_err(),
        EditorError::NotFound {
            id: "c:/work/t.jsx:99".to_string()
        }
    );
}

#[test]
fn test_reload_restores_view_state_by_index_path() {
    let workspace = Workspace::new();
    let root = load(&workspace, "t.jsx", LIST);
    let (ul, items) = list(&root);
    items[2].select();
    ul.set_expanded(true);
    root.set_expanded(true);

    let reloaded = workspace
        .reload_file_ast("t.jsx", parse(LIST).unwrap())
        .unwrap();
    assert_eq!(reloaded, root);
    assert_eq!(workspace.file("t.jsx").unwrap().generation(), 1);

    assert!(!items[2].exists());
    let selected = workspace.selected_nodes();
    assert_eq!(selected.len(), 1);
    assert_ne!(selected[0].id(), items[2].id());
    assert_eq!(selected[0].index_path(), vec![0, 0, 2]);

    let (new_ul, _) = list(&root);
    assert!(new_ul.expanded());
    assert!(root.expanded());
    assert!(!workspace.undo().can_undo());
}

#[test]
fn test_reload_drops_unmatched_paths() {
    let workspace = Workspace::new();
    let root = load(&workspace, "t.jsx", LIST);
    let (_, items) = list(&root);
    items[3].select();

    workspace
        .reload_file_ast("t.jsx", parse("const x = <ul><li>a</li></ul>;").unwrap())
        .unwrap();

    assert!(workspace.selection().is_empty());
}

#[test]
fn test_loading_open_file_reparses() {
    let workspace = Workspace::new();
    load(&workspace, "t.jsx", LIST);
    let root = load(&workspace, "t.jsx", "const x = <p />;");

    assert_eq!(workspace.files(), vec!["t.jsx"]);
    assert_eq!(root.descendant_at(&[0, 0]).unwrap().name().as_deref(), Some("p"));
    assert_eq!(
        workspace.reload_file_ast("missing.jsx", SyntaxTree::default()).unwrap_err(),
        EditorError::FileNotLoaded {
            path: "missing.jsx".to_string()
        }
    );
}

#[test]
fn test_files_are_independent_roots() {
    let workspace = Workspace::new();
    let a = load(&workspace, "a.jsx", LIST);
    let b = load(&workspace, "b.jsx", "y = <p>b</p>;");

    assert_eq!(workspace.roots(), vec![a.clone(), b.clone()]);
    assert_eq!(workspace.file_root("b.jsx"), Some(b.clone()));
    let p = b.descendant_at(&[0, 0]).unwrap();
    assert_eq!(p.file_path().as_deref(), Some("b.jsx"));
    assert!(workspace.is_loaded("a.jsx"));

    workspace.close_file("a.jsx").unwrap();
    assert!(!a.exists());
    assert_eq!(workspace.files(), vec!["b.jsx"]);
    assert_eq!(workspace.roots(), vec![b]);
    assert!(workspace.to_modified_syntax_tree("a.jsx").is_err());
}

#[test]
fn test_outline_snapshot() {
    let workspace = Workspace::new();
    let root = load(&workspace, "t.jsx", "x = <div className=\"a b\"><p>hi</p></div>;");
    let outline = root.to_outline();

    assert_eq!(
        outline.render(),
        "t.jsx\n  statement\n    div.a.b\n      p\n        \"hi\"\n"
    );

    let json = serde_json::to_value(&outline).unwrap();
    let text = &json["children"][0]["children"][0]["children"][0]["children"][0];
    assert_eq!(text["label"], "\"hi\"");
    assert!(text.get("children").is_none());

    let back: reshaper_editor::OutlineNode = serde_json::from_value(json).unwrap();
    assert_eq!(back, outline);
}

proptest! {
    #[test]
    fn prop_children_follow_requested_order(
        moves in prop::collection::vec((0usize..6, 0usize..6), 1..40)
    ) {
        let workspace = Workspace::new();
        let store = workspace.store();
        store.set("root", placeholder());
        let mut model: Vec<String> = (0..6).map(|i| format!("n{}", i)).collect();
        for id in &model {
            store.set(id.clone(), placeholder());
        }

        let root = workspace.node("root").unwrap();
        let nodes: Vec<_> = model.iter().map(|id| workspace.node(id).unwrap()).collect();
        root.append(&nodes);

        for (from, to) in moves {
            let moving = model[from].clone();
            let target = model[to].clone();
            root.insert_before(
                &[workspace.node(&moving).unwrap()],
                Some(&workspace.node(&target).unwrap()),
            );

            if moving != target {
                model.retain(|id| *id != moving);
                let position = model.iter().position(|id| *id == target).unwrap();
                model.insert(position, moving);
            }

            prop_assert_eq!(&workspace.parenting().get_children("root").items, &model);
        }
    }
}
