use std::collections::HashMap;

use plate_alias_core::{Alias, AliasWidgetFactory, substitute};

fn values() -> HashMap<String, String> {
    HashMap::from([
        ("part".to_string(), "개발팀".to_string()),
        ("position".to_string(), "팀장".to_string()),
        ("name".to_string(), "홍길동".to_string()),
    ])
}

#[test]
fn marker_is_replaced_by_its_value() {
    let markup = r#"<span data-alias-value="name">이름</span>"#;
    assert_eq!(substitute(markup, &values()), "홍길동");
}

#[test]
fn missing_values_leave_markup_unchanged() {
    let markup = r#"<span data-alias-value="name">이름</span>"#;
    assert_eq!(substitute(markup, &HashMap::new()), markup);
}

#[test]
fn blank_input_is_returned_as_is() {
    assert_eq!(substitute("", &values()), "");
    assert_eq!(substitute("  \n", &values()), "  \n");
}

#[test]
fn rendered_tokens_resolve_inside_a_document() {
    let factory = AliasWidgetFactory::default();
    let part = factory.render(&Alias::new("part", "part", "부서명"));
    let position = factory.render(&Alias::new("position", "position", "직급"));
    let markup = format!("<p>{part} 소속 {position}님께</p><p>감사합니다.</p>");

    assert_eq!(
        substitute(&markup, &values()),
        "<p>개발팀 소속 팀장님께</p><p>감사합니다.</p>"
    );
}

#[test]
fn unknown_markers_pass_through_next_to_resolved_ones() {
    let markup = r#"<p><span data-alias-value="name">이름</span>, <span data-alias-value="age">나이</span></p>"#;
    assert_eq!(
        substitute(markup, &values()),
        r#"<p>홍길동, <span data-alias-value="age">나이</span></p>"#
    );
}

#[test]
fn resolved_values_are_escaped() {
    let values = HashMap::from([("name".to_string(), "<b>&</b>".to_string())]);
    let markup = r#"<p><span data-alias-value="name">x</span></p>"#;
    assert_eq!(substitute(markup, &values), "<p>&lt;b&gt;&amp;&lt;/b&gt;</p>");
}

#[test]
fn unparseable_markup_is_returned_unchanged() {
    let markup = r#"<p><span data-alias-value="name">이름</span></p><span"#;
    assert_eq!(substitute(markup, &values()), markup);
}

#[test]
fn unclosed_elements_still_resolve_their_markers() {
    let markup = r#"<div>Hi <span data-alias-value="name">x</span>"#;
    assert_eq!(substitute(markup, &values()), "<div>Hi 홍길동</div>");

    let markup = r#"<p><span data-alias-value="part">x</span></b></p>"#;
    assert_eq!(substitute(markup, &values()), "<p>개발팀</p>");
}

#[test]
fn named_entities_survive_substitution() {
    let markup = r#"<p>&copy; 2024 &middot; <span data-alias-value="name">x</span></p>"#;
    assert_eq!(substitute(markup, &values()), "<p>\u{a9} 2024 \u{b7} 홍길동</p>");
}

#[test]
fn paragraphs_without_end_tags_stay_siblings() {
    let markup = r#"<p><span data-alias-value="name">x</span><p>next"#;
    assert_eq!(substitute(markup, &values()), "<p>홍길동</p><p>next</p>");
}

#[test]
fn attribute_order_is_preserved_around_resolved_markers() {
    let markup = r#"<p style="x" class="y"><span data-alias-value="name">x</span></p>"#;
    assert_eq!(
        substitute(markup, &values()),
        r#"<p style="x" class="y">홍길동</p>"#
    );
}
