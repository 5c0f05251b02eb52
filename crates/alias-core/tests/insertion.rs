use plate_alias_core::{
    Alias, AliasWidgetFactory, Document, HostSurface, MemorySurface, Node, Path, Point, Range,
    Selection, TokenInsertionEngine, is_token,
};

fn name_alias() -> Alias {
    Alias::new("name", "name", "이름")
}

fn token_paths(doc: &Document) -> Vec<Path> {
    fn walk(nodes: &[Node], path: &mut Path, out: &mut Vec<Path>) {
        for (ix, node) in nodes.iter().enumerate() {
            path.push(ix);
            if is_token(node) {
                out.push(path.clone());
            } else if let Node::Element(el) = node {
                walk(&el.children, path, out);
            }
            path.pop();
        }
    }
    let mut out = Vec::new();
    walk(&doc.children, &mut Vec::new(), &mut out);
    out
}

fn paragraph_children(surface: &MemorySurface) -> Vec<Node> {
    match &surface.document().children[0] {
        Node::Element(el) => el.children.clone(),
        Node::Text(_) => panic!("expected a paragraph"),
    }
}

fn collapsed(path: Vec<usize>, offset: usize) -> Option<Selection> {
    Some(Selection::collapsed(Point::new(path, offset)))
}

#[test]
fn insert_splits_text_around_the_token() {
    let mut surface = MemorySurface::from_markup("<p>hello world</p>").unwrap();
    let engine = TokenInsertionEngine::default();
    let token = engine.factory().node(&name_alias());

    let path = engine.insert_at_range(
        &mut surface,
        &Range::collapsed(Point::new(vec![0, 0], 5)),
        &name_alias(),
    );

    assert_eq!(path, Some(vec![0, 1]));
    assert_eq!(
        paragraph_children(&surface),
        vec![Node::text("hello"), token, Node::text(" world")]
    );
    assert_eq!(surface.selection().cloned(), collapsed(vec![0], 2));
    assert_eq!(token_paths(surface.document()), vec![vec![0, 1]]);
}

#[test]
fn insert_at_text_edges_creates_no_empty_text() {
    let engine = TokenInsertionEngine::default();
    let token = engine.factory().node(&name_alias());

    let mut surface = MemorySurface::from_markup("<p>hello</p>").unwrap();
    let path = engine.insert_at_range(
        &mut surface,
        &Range::collapsed(Point::new(vec![0, 0], 0)),
        &name_alias(),
    );
    assert_eq!(path, Some(vec![0, 0]));
    assert_eq!(paragraph_children(&surface), vec![token.clone(), Node::text("hello")]);
    assert_eq!(surface.selection().cloned(), collapsed(vec![0], 1));

    let mut surface = MemorySurface::from_markup("<p>hello</p>").unwrap();
    let path = engine.insert_at_range(
        &mut surface,
        &Range::collapsed(Point::new(vec![0, 0], 5)),
        &name_alias(),
    );
    assert_eq!(path, Some(vec![0, 1]));
    assert_eq!(paragraph_children(&surface), vec![Node::text("hello"), token]);
    assert_eq!(surface.selection().cloned(), collapsed(vec![0], 2));
}

#[test]
fn insert_at_container_point_uses_child_index() {
    let mut surface = MemorySurface::from_markup("<p>a<br></p>").unwrap();
    let engine = TokenInsertionEngine::default();

    let path = engine.insert_at_range(
        &mut surface,
        &Range::collapsed(Point::new(vec![0], 2)),
        &name_alias(),
    );

    assert_eq!(path, Some(vec![0, 2]));
    assert_eq!(surface.selection().cloned(), collapsed(vec![0], 3));
    assert_eq!(token_paths(surface.document()), vec![vec![0, 2]]);
}

#[test]
fn unresolvable_range_is_a_no_op() {
    let mut surface = MemorySurface::from_markup("<p>hello</p>").unwrap();
    let engine = TokenInsertionEngine::default();

    for point in [
        Point::new(vec![0, 0], 99),
        Point::new(vec![4], 0),
        Point::new(vec![0], 3),
    ] {
        let path = engine.insert_at_range(&mut surface, &Range::collapsed(point), &name_alias());
        assert_eq!(path, None);
    }
    assert_eq!(surface.markup(), "<p>hello</p>");
    assert!(!surface.can_undo());
}

#[test]
fn insert_inside_a_token_is_refused() {
    let mut surface = MemorySurface::from_markup("<p>hello</p>").unwrap();
    let engine = TokenInsertionEngine::default();
    engine
        .insert_at_range(
            &mut surface,
            &Range::collapsed(Point::new(vec![0, 0], 5)),
            &name_alias(),
        )
        .unwrap();
    let markup = surface.markup();

    let inside = Point::new(vec![0, 1, 0, 0], 3);
    let path = engine.insert_at_range(&mut surface, &Range::collapsed(inside), &name_alias());

    assert_eq!(path, None);
    assert_eq!(surface.markup(), markup);
}

#[test]
fn inserted_markup_matches_rendered_token() {
    let mut surface = MemorySurface::from_markup("<p>ab</p>").unwrap();
    let engine = TokenInsertionEngine::default();
    engine.insert_at_range(
        &mut surface,
        &Range::collapsed(Point::new(vec![0, 0], 1)),
        &name_alias(),
    );

    let token = AliasWidgetFactory::default().render(&name_alias());
    assert_eq!(surface.markup(), format!("<p>a{token}b</p>"));
}

#[test]
fn replace_query_deletes_mention_text_in_the_same_step() {
    let mut surface = MemorySurface::from_markup("<p>hi @na</p>").unwrap();
    surface.set_caret(Point::new(vec![0, 0], 6));
    let engine = TokenInsertionEngine::default();
    let token = engine.factory().node(&name_alias());

    let path = engine.replace_query_and_insert(
        &mut surface,
        &Point::new(vec![0, 0], 6),
        "na",
        &name_alias(),
    );

    assert_eq!(path, Some(vec![0, 1]));
    assert_eq!(paragraph_children(&surface), vec![Node::text("hi "), token]);
    assert_eq!(surface.selection().cloned(), collapsed(vec![0], 2));

    assert!(surface.undo());
    assert_eq!(surface.markup(), "<p>hi @na</p>");
    assert!(!surface.can_undo());
}

#[test]
fn replace_query_keeps_text_after_the_mention() {
    let mut surface = MemorySurface::from_markup("<p>@이 님</p>").unwrap();
    surface.set_caret(Point::new(vec![0, 0], 4));
    let engine = TokenInsertionEngine::default();
    let token = engine.factory().node(&name_alias());

    let path = engine.replace_query_and_insert(
        &mut surface,
        &Point::new(vec![0, 0], 4),
        "이",
        &name_alias(),
    );

    assert_eq!(path, Some(vec![0, 0]));
    assert_eq!(paragraph_children(&surface), vec![token, Node::text(" 님")]);
    assert_eq!(surface.selection().cloned(), collapsed(vec![0], 1));
}

#[test]
fn stale_query_falls_back_to_caret() {
    let mut surface = MemorySurface::from_markup("<p>hi there</p>").unwrap();
    surface.set_caret(Point::new(vec![0, 0], 2));
    let engine = TokenInsertionEngine::default();
    let token = engine.factory().node(&name_alias());

    let path = engine.replace_query_and_insert(
        &mut surface,
        &Point::new(vec![0, 0], 8),
        "na",
        &name_alias(),
    );

    assert_eq!(path, Some(vec![0, 1]));
    assert_eq!(
        paragraph_children(&surface),
        vec![Node::text("hi"), token, Node::text(" there")]
    );
}

#[test]
fn stale_query_without_caret_falls_back_to_anchor() {
    let mut surface = MemorySurface::from_markup("<p>hi there</p>").unwrap();
    surface.set_selection(None);
    let engine = TokenInsertionEngine::default();

    let path = engine.replace_query_and_insert(
        &mut surface,
        &Point::new(vec![0, 0], 8),
        "na",
        &name_alias(),
    );

    assert_eq!(path, Some(vec![0, 1]));
    assert_eq!(surface.document().text_content(), "hi there이름삭제");
    assert_eq!(surface.selection().cloned(), collapsed(vec![0], 2));
}
