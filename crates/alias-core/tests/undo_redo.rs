use plate_alias_core::{
    Alias, ApplyError, Document, HostSurface, MemorySurface, Node, Op, Point, Range, Selection,
    SurfaceConfig, TokenInsertionEngine, Transaction,
};

fn surface_with_text(text: &str) -> MemorySurface {
    let mut surface = MemorySurface::new(Document::new(vec![Node::paragraph(text)]));
    surface.set_caret(Point::new(vec![0, 0], 0));
    surface
}

#[test]
fn undo_redo_handles_multi_op_insert_order() {
    let mut surface = surface_with_text("");

    let tx = Transaction::new(vec![
        Op::InsertText {
            path: vec![0, 0],
            offset: 0,
            text: "a".to_string(),
        },
        Op::InsertText {
            path: vec![0, 0],
            offset: 1,
            text: "b".to_string(),
        },
    ])
    .selection_after(Selection::collapsed(Point::new(vec![0, 0], 2)))
    .source("test:multi_insert");

    surface.apply(tx).unwrap();
    assert_eq!(surface.document().children, vec![Node::paragraph("ab")]);
    assert_eq!(surface.selection().unwrap().focus.offset, 2);

    assert!(surface.undo());
    assert_eq!(surface.document().children, vec![Node::paragraph("")]);
    assert_eq!(surface.selection().unwrap().focus.offset, 0);

    assert!(surface.redo());
    assert_eq!(surface.document().children, vec![Node::paragraph("ab")]);
    assert_eq!(surface.selection().unwrap().focus.offset, 2);
}

#[test]
fn undo_redo_handles_multi_op_paste_newline_shape() {
    let mut surface = surface_with_text("XYZ");
    let selection_before = surface.selection().cloned();

    let tx = Transaction::new(vec![
        Op::RemoveText {
            path: vec![0, 0],
            range: 0..3,
        },
        Op::InsertText {
            path: vec![0, 0],
            offset: 0,
            text: "a".to_string(),
        },
        Op::InsertNode {
            path: vec![1],
            node: Node::paragraph("bXYZ"),
        },
    ])
    .selection_after(Selection::collapsed(Point::new(vec![1, 0], 1)))
    .source("test:paste_newline");

    surface.apply(tx).unwrap();
    let doc_after = surface.document().clone();
    let selection_after = surface.selection().cloned();

    assert_eq!(doc_after.children.len(), 2);
    assert_eq!(
        selection_after,
        Some(Selection::collapsed(Point::new(vec![1, 0], 1)))
    );

    assert!(surface.undo());
    assert_eq!(surface.document().children, vec![Node::paragraph("XYZ")]);
    assert_eq!(surface.selection().cloned(), selection_before);

    assert!(surface.redo());
    assert_eq!(surface.document(), &doc_after);
    assert_eq!(surface.selection().cloned(), selection_after);
}

#[test]
fn token_insertion_is_a_single_history_step() {
    let mut surface = surface_with_text("hello world");
    let engine = TokenInsertionEngine::default();
    let alias = Alias::new("name", "name", "이름");

    let path = engine
        .insert_at_range(
            &mut surface,
            &Range::collapsed(Point::new(vec![0, 0], 5)),
            &alias,
        )
        .unwrap();
    assert_eq!(path, vec![0, 1]);
    let doc_after = surface.document().clone();

    assert!(surface.undo());
    assert_eq!(surface.document().children, vec![Node::paragraph("hello world")]);
    assert_eq!(
        surface.selection(),
        Some(&Selection::collapsed(Point::new(vec![0, 0], 5)))
    );
    assert!(!surface.can_undo());

    assert!(surface.redo());
    assert_eq!(surface.document(), &doc_after);
    assert_eq!(
        surface.selection(),
        Some(&Selection::collapsed(Point::new(vec![0], 2)))
    );
}

#[test]
fn failing_transaction_leaves_document_untouched() {
    let mut surface = surface_with_text("abc");

    let tx = Transaction::new(vec![
        Op::InsertText {
            path: vec![0, 0],
            offset: 3,
            text: "d".to_string(),
        },
        Op::RemoveNode { path: vec![5] },
    ]);
    let err = surface.apply(tx).unwrap_err();
    assert!(matches!(err, ApplyError::InvalidPath(_)));
    assert_eq!(surface.document().children, vec![Node::paragraph("abc")]);
    assert_eq!(
        surface.selection(),
        Some(&Selection::collapsed(Point::new(vec![0, 0], 0)))
    );
    assert!(!surface.can_undo());
}

#[test]
fn unresolvable_selection_after_rolls_back() {
    let mut surface = surface_with_text("abc");

    let tx = Transaction::new(vec![Op::InsertText {
        path: vec![0, 0],
        offset: 0,
        text: "x".to_string(),
    }])
    .selection_after(Selection::collapsed(Point::new(vec![3], 0)));

    assert_eq!(surface.apply(tx), Err(ApplyError::InvalidSelection));
    assert_eq!(surface.document().children, vec![Node::paragraph("abc")]);
    assert!(!surface.can_undo());
}

#[test]
fn history_is_capped_at_max_undo() {
    let mut surface = surface_with_text("").with_config(SurfaceConfig {
        max_undo: 2,
        ..SurfaceConfig::default()
    });

    for (ix, ch) in ["a", "b", "c"].into_iter().enumerate() {
        let tx = Transaction::new(vec![Op::InsertText {
            path: vec![0, 0],
            offset: ix,
            text: ch.to_string(),
        }]);
        surface.apply(tx).unwrap();
    }

    assert!(surface.undo());
    assert!(surface.undo());
    assert!(!surface.undo());
    assert_eq!(surface.document().children, vec![Node::paragraph("a")]);
}

#[test]
fn empty_transaction_moves_the_selection_without_a_history_step() {
    let mut surface = surface_with_text("abc");

    let tx = Transaction::new(Vec::new())
        .selection_after(Selection::collapsed(Point::new(vec![0, 0], 2)));
    surface.apply(tx).unwrap();

    assert_eq!(surface.selection().unwrap().focus.offset, 2);
    assert!(!surface.can_undo());

    let tx = Transaction::new(Vec::new())
        .selection_after(Selection::collapsed(Point::new(vec![4], 0)));
    assert_eq!(surface.apply(tx), Err(ApplyError::InvalidSelection));
    assert_eq!(surface.selection().unwrap().focus.offset, 2);
}
