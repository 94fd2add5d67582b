use diagram_engine::{
    Color, CornerStyle, Document, EditRequest, EngineError, Node, NodeId, NodeKind, Point, Rect, Style, Vec2,
};
use proptest::prelude::*;

fn style() -> Style {
    Style::stroke(Color::WHITE, 4.0)
}

fn add_line(doc: &mut Document, x: f64) -> NodeId {
    let id = doc.alloc_id();
    doc.add_root(Node::line(id, Point::new(x, 0.0), Point::new(x + 10.0, 10.0), style()));
    id
}

fn add_rect(doc: &mut Document, x: f64) -> NodeId {
    let id = doc.alloc_id();
    doc.add_root(Node::rect(id, Rect::new(x, 0.0, x + 10.0, 5.0), style(), CornerStyle::Sharp));
    id
}

#[test]
fn group_needs_two_nodes() {
    let mut doc = Document::new();
    let a = add_line(&mut doc, 0.0);
    add_rect(&mut doc, 20.0);
    doc.mark_clean();

    for selection in [vec![], vec![a]] {
        doc.select(&selection);
        let before = doc.clone();
        assert!(matches!(doc.group_selected(), Err(EngineError::InvalidOperation(_))));
        assert_eq!(doc.roots(), before.roots());
        assert_eq!(doc.node_count(), 2);
        assert!(!doc.is_dirty());
    }
}

#[test]
fn ungroup_restores_grouped_nodes() {
    let mut doc = Document::new();
    let a = add_line(&mut doc, 0.0);
    let b = add_rect(&mut doc, 20.0);
    doc.find_mut(b).unwrap().position = Vec2::new(3.0, 4.0);
    let before: Vec<Node> = doc.roots().to_vec();

    doc.select(&[a, b]);
    let group = doc.group_selected().unwrap();
    assert!(doc.find(a).map(|n| !n.movable && !n.selectable).unwrap());
    doc.find_mut(group).unwrap().position = Vec2::new(100.0, 0.0);
    doc.select(&[group]);
    let freed = doc.ungroup_selected().unwrap();
    assert_eq!(freed, vec![a, b]);

    let roots = doc.roots();
    assert_eq!(roots.len(), 2);
    for (now, was) in roots.iter().zip(&before) {
        assert!(now.structurally_eq(was));
        assert!(now.movable && now.selectable);
        assert_eq!(now.position, was.position + Vec2::new(100.0, 0.0));
    }
    assert!(doc.check_invariants().is_ok());
}

#[test]
fn ungroup_all_flattens_every_level() {
    let mut doc = Document::new();
    let ids: Vec<NodeId> = (0..4).map(|i| add_line(&mut doc, i as f64 * 10.0)).collect();
    doc.select(&ids[..2]);
    let inner = doc.group_selected().unwrap();
    doc.find_mut(inner).unwrap().position = Vec2::new(1.0, 1.0);
    doc.select(&[inner, ids[2]]);
    let outer = doc.group_selected().unwrap();
    doc.find_mut(outer).unwrap().position = Vec2::new(10.0, 0.0);

    doc.select(&[outer]);
    let before_count = doc.node_count();
    doc.ungroup_all_selected().unwrap();
    assert_eq!(doc.node_count(), before_count - 2);
    assert!(doc.roots().iter().all(|n| !n.is_group() && n.movable && n.selectable));
    assert_eq!(doc.find(ids[0]).unwrap().position, Vec2::new(11.0, 1.0));
    assert_eq!(doc.find(ids[2]).unwrap().position, Vec2::new(10.0, 0.0));
    assert_eq!(doc.find(ids[3]).unwrap().position, Vec2::ZERO);
}

#[test]
fn ungroup_without_group_is_rejected() {
    let mut doc = Document::new();
    let a = add_line(&mut doc, 0.0);
    doc.select(&[a]);
    assert!(doc.ungroup_selected().is_err());
    assert!(doc.ungroup_all_selected().is_err());
    assert_eq!(doc.roots().len(), 1);
}

#[test]
fn copy_leaves_original_alone() {
    let mut doc = Document::new();
    let a = add_rect(&mut doc, 0.0);
    doc.find_mut(a).unwrap().position = Vec2::new(5.0, 5.0);
    doc.select(&[a]);
    let original = doc.find(a).unwrap().clone();

    let copies = doc.copy_selected(Vec2::new(20.0, 20.0));
    assert_eq!(copies.len(), 1);
    let copy = doc.find(copies[0]).unwrap();
    assert_ne!(copy.id, a);
    assert_eq!(copy.position, Vec2::new(25.0, 25.0));
    assert!(copy.structurally_eq(&original));
    assert_eq!(doc.find(a).unwrap(), &original);
    assert_eq!(doc.selected_ids(), &[a]);
}

#[test]
fn copy_of_group_renumbers_subtree() {
    let mut doc = Document::new();
    let a = add_line(&mut doc, 0.0);
    let b = add_line(&mut doc, 10.0);
    doc.select(&[a, b]);
    let group = doc.group_selected().unwrap();
    doc.select(&[group]);
    doc.copy_selected(Vec2::new(20.0, 20.0));
    assert_eq!(doc.node_count(), 6);
    assert!(doc.check_invariants().is_ok());
}

#[test]
fn delete_removes_subtree_and_selection() {
    let mut doc = Document::new();
    let a = add_line(&mut doc, 0.0);
    let b = add_line(&mut doc, 10.0);
    let c = add_rect(&mut doc, 20.0);
    doc.select(&[a, b]);
    let group = doc.group_selected().unwrap();
    doc.select(&[group, c]);
    assert_eq!(doc.delete_selected(), 2);
    assert!(doc.is_empty());
    assert!(doc.selected_ids().is_empty());
    assert!(doc.find(a).is_none());
}

#[test]
fn corner_edit_preserves_everything_else() {
    let mut doc = Document::new();
    let r = add_rect(&mut doc, 0.0);
    {
        let node = doc.find_mut(r).unwrap();
        node.position = Vec2::new(7.0, 8.0);
        node.z_order = 3;
        node.rotation = 30.0;
    }
    doc.select(&[r]);
    let before = doc.find(r).unwrap().clone();
    doc.edit(EditRequest { color: None, corner: Some(CornerStyle::Curved) }).unwrap();

    let after = doc.find(r).unwrap();
    assert_eq!(after.corner(), Some(CornerStyle::Curved));
    assert_eq!(after.id, before.id);
    assert_eq!(after.position, before.position);
    assert_eq!(after.z_order, before.z_order);
    assert_eq!(after.rotation, before.rotation);
    match (&after.kind, &before.kind) {
        (NodeKind::Rect { rect, style, .. }, NodeKind::Rect { rect: r0, style: s0, .. }) => {
            assert_eq!(rect, r0);
            assert_eq!(style, s0);
        }
        _ => panic!("rectangle changed kind"),
    }
    assert!(doc.is_selected(r));
}

#[test]
fn edit_refuses_group_selection() {
    let mut doc = Document::new();
    let a = add_line(&mut doc, 0.0);
    let b = add_rect(&mut doc, 10.0);
    doc.select(&[a, b]);
    let group = doc.group_selected().unwrap();
    doc.select(&[group]);
    let before = doc.clone();
    let request = EditRequest { color: Some(Color::BLACK), corner: Some(CornerStyle::Curved) };
    assert!(doc.edit(request).is_err());
    assert_eq!(doc.roots(), before.roots());

    doc.clear_selection();
    assert!(doc.edit(request).is_err());
}

#[test]
fn z_order_and_rotation() {
    let mut doc = Document::new();
    let a = add_line(&mut doc, 0.0);
    assert!(!doc.bring_to_front());
    doc.select(&[a]);
    assert!(doc.bring_to_front());
    assert!(doc.bring_to_front());
    assert!(doc.send_to_back());
    assert_eq!(doc.find(a).unwrap().z_order, 1);

    doc.rotate(90.0);
    doc.rotate(45.0);
    assert_eq!(doc.find(a).unwrap().rotation, 45.0);
    doc.rotate(400.0);
    assert_eq!(doc.find(a).unwrap().rotation, 360.0);
}

#[test]
fn loading_rejects_broken_trees() {
    let dup = vec![
        Node::line(1, Point::ZERO, Point::ZERO, style()),
        Node::line(1, Point::ZERO, Point::ZERO, style()),
    ];
    assert!(matches!(Document::from_save_set(dup), Err(EngineError::Invariant(_))));
    assert!(Document::from_save_set(vec![Node::group(1, Vec::new())]).is_err());

    let doc = Document::from_save_set(vec![Node::line(7, Point::ZERO, Point::ZERO, style())]).unwrap();
    assert!(!doc.is_dirty());
    let mut doc = doc;
    assert_eq!(doc.alloc_id(), 8);
}

#[derive(Clone, Debug)]
enum Op {
    Select(Vec<usize>),
    Group,
    Ungroup,
    UngroupAll,
    Copy,
    Delete,
    Front,
    Back,
    Rotate(f64),
    Translate(f64, f64),
    Recolor(u8),
    Corner(bool),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => prop::collection::vec(0usize..8, 0..4).prop_map(Op::Select),
        2 => Just(Op::Group),
        1 => Just(Op::Ungroup),
        1 => Just(Op::UngroupAll),
        1 => Just(Op::Copy),
        1 => Just(Op::Delete),
        1 => Just(Op::Front),
        1 => Just(Op::Back),
        1 => (0.0..360.0f64).prop_map(Op::Rotate),
        1 => (-50.0..50.0f64, -50.0..50.0f64).prop_map(|(x, y)| Op::Translate(x, y)),
        1 => any::<u8>().prop_map(Op::Recolor),
        1 => any::<bool>().prop_map(Op::Corner),
    ]
}

fn apply(doc: &mut Document, op: &Op) -> Result<(), EngineError> {
    match op {
        Op::Select(picks) => {
            let ids: Vec<NodeId> = picks
                .iter()
                .filter_map(|&i| doc.roots().get(i))
                .map(|n| n.id)
                .collect();
            doc.select(&ids);
        }
        Op::Group => {
            doc.group_selected()?;
        }
        Op::Ungroup => {
            doc.ungroup_selected()?;
        }
        Op::UngroupAll => {
            doc.ungroup_all_selected()?;
        }
        Op::Copy => {
            doc.copy_selected(Vec2::new(20.0, 20.0));
        }
        Op::Delete => {
            doc.delete_selected();
        }
        Op::Front => {
            doc.bring_to_front();
        }
        Op::Back => {
            doc.send_to_back();
        }
        Op::Rotate(angle) => {
            doc.rotate(*angle);
        }
        Op::Translate(dx, dy) => {
            doc.translate_selected(Vec2::new(*dx, *dy))?;
        }
        Op::Recolor(v) => {
            doc.set_stroke_color(Color::rgb(*v, *v, *v))?;
        }
        Op::Corner(curved) => {
            let corner = if *curved { CornerStyle::Curved } else { CornerStyle::Sharp };
            doc.set_corner_style(corner)?;
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn invariants_hold_under_random_edits(ops in prop::collection::vec(op(), 1..40)) {
        let mut doc = Document::new();
        for i in 0..4 {
            if i % 2 == 0 {
                add_line(&mut doc, i as f64 * 15.0);
            } else {
                add_rect(&mut doc, i as f64 * 15.0);
            }
        }

        for op in &ops {
            let before = doc.clone();
            if apply(&mut doc, op).is_err() {
                prop_assert_eq!(doc.roots(), before.roots());
                prop_assert_eq!(doc.selected_ids(), before.selected_ids());
            }
            prop_assert_eq!(doc.check_invariants(), Ok(()));
        }
    }
}
