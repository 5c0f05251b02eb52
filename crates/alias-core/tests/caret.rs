use plate_alias_core::{
    Alias, AliasWidgetFactory, CaretLocator, Document, MemorySurface, Node, Point, Position, Range,
    match_query,
};
use proptest::prelude::*;

fn surface_at(markup: &str, caret: Point) -> MemorySurface {
    let mut surface = MemorySurface::from_markup(markup).unwrap();
    surface.set_caret(caret);
    surface
}

#[test]
fn match_query_reads_trailing_mention() {
    assert_eq!(match_query("hello @팀"), Some("팀".to_string()));
    assert_eq!(match_query("@"), Some(String::new()));
    assert_eq!(match_query("mail a@b-c_d"), Some("b-c_d".to_string()));
    assert_eq!(match_query("@abc def"), None);
    assert_eq!(match_query("no mention"), None);
    assert_eq!(match_query("@a.b"), None);
    assert_eq!(match_query(&format!("@{}", "a".repeat(30))), Some("a".repeat(30)));
    assert_eq!(match_query(&format!("@{}", "a".repeat(31))), None);
}

#[test]
fn extract_query_uses_text_before_anchor() {
    let surface = surface_at("<p>hi @na and more</p>", Point::new(vec![0, 0], 6));
    assert_eq!(CaretLocator::extract_query(&surface), Some("na".to_string()));

    let surface = surface_at("<p>hi @na</p>", Point::new(vec![0, 0], 2));
    assert_eq!(CaretLocator::extract_query(&surface), None);
}

#[test]
fn extract_query_stringifies_children_before_container_anchor() {
    let token = AliasWidgetFactory::default().render(&Alias::new("name", "name", "이름"));
    let markup = format!("<p>@ab<br>{token}</p>");

    let surface = surface_at(&markup, Point::new(vec![0], 1));
    assert_eq!(CaretLocator::extract_query(&surface), Some("ab".to_string()));

    let surface = surface_at(&markup, Point::new(vec![0], 0));
    assert_eq!(CaretLocator::extract_query(&surface), None);
}

#[test]
fn extract_query_does_not_reach_across_a_token() {
    let token = AliasWidgetFactory::default().render(&Alias::new("name", "name", "이름"));

    let surface = surface_at(&format!("<p>a@{token}</p>"), Point::new(vec![0], 2));
    assert_eq!(CaretLocator::extract_query(&surface), None);

    let surface = surface_at(&format!("<p>{token}@na</p>"), Point::new(vec![0], 2));
    assert_eq!(CaretLocator::extract_query(&surface), Some("na".to_string()));
}

#[test]
fn extract_query_without_selection_is_none() {
    let surface = MemorySurface::from_markup("<p>@na</p>").unwrap();
    assert_eq!(CaretLocator::extract_query(&surface), None);
}

#[test]
fn locate_returns_page_position_below_caret() {
    let mut surface = surface_at("<p>abc</p><p>de</p>", Point::new(vec![1, 0], 1));
    assert_eq!(
        CaretLocator::locate(&surface),
        Position {
            top: 40.0,
            left: 8.0
        }
    );

    surface.set_scroll_offset(5.0, 10.0);
    assert_eq!(
        CaretLocator::locate(&surface),
        Position {
            top: 40.0,
            left: 8.0
        }
    );
}

#[test]
fn locate_without_caret_is_origin() {
    let surface = MemorySurface::from_markup("<p>abc</p>").unwrap();
    assert_eq!(CaretLocator::locate(&surface), Position::default());
}

#[test]
fn locate_from_pointer_hit_tests_client_coordinates() {
    let mut surface = MemorySurface::from_markup("<p>abc</p><p>de</p>").unwrap();

    assert_eq!(
        CaretLocator::locate_from_pointer(&surface, 16.0, 25.0),
        Some(Range::collapsed(Point::new(vec![1, 0], 2)))
    );
    assert_eq!(CaretLocator::locate_from_pointer(&surface, 16.0, 500.0), None);
    assert_eq!(CaretLocator::locate_from_pointer(&surface, -1.0, 5.0), None);

    surface.set_scroll_offset(0.0, 20.0);
    assert_eq!(
        CaretLocator::locate_from_pointer(&surface, 8.0, 5.0),
        Some(Range::collapsed(Point::new(vec![1, 0], 1)))
    );
}

proptest! {
    #[test]
    fn extract_query_returns_the_typed_query(
        prefix in "[a-z ]{0,10}",
        query in "[a-zA-Z0-9_가-힣-]{0,30}",
    ) {
        let text = format!("{prefix}@{query}");
        let mut surface = MemorySurface::new(Document::new(vec![Node::paragraph(text.clone())]));
        surface.set_caret(Point::new(vec![0, 0], text.len()));

        prop_assert_eq!(CaretLocator::extract_query(&surface), Some(query));
    }

    #[test]
    fn text_without_mention_has_no_query(text in "[a-z가-힣 .,]{0,40}") {
        let mut surface = MemorySurface::new(Document::new(vec![Node::paragraph(text.clone())]));
        surface.set_caret(Point::new(vec![0, 0], text.len()));

        prop_assert_eq!(CaretLocator::extract_query(&surface), None);
    }
}
