use std::sync::OnceLock;

use regex::Regex;
use tracing::trace;

use crate::core::Range;
use crate::surface::{HostSurface, Position};

/// Longest label fragment a mention query may carry.
pub const MAX_QUERY_CHARS: usize = 30;

static MENTION_QUERY: OnceLock<Regex> = OnceLock::new();

fn mention_query_regex() -> &'static Regex {
    MENTION_QUERY.get_or_init(|| {
        let pattern = format!(r"@([\p{{L}}\w-]{{0,{MAX_QUERY_CHARS}}})$");
        Regex::new(&pattern).expect("mention query regex should compile")
    })
}

/// The query of a trailing `@mention` in `text`, or `None` when `text`
/// does not end in one.
pub fn match_query(text: &str) -> Option<String> {
    mention_query_regex()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Caret geometry and the text around it.
pub struct CaretLocator;

impl CaretLocator {
    /// Page coordinates just below the caret, where a suggestion panel
    /// anchors. `{0, 0}` when there is no caret to measure.
    pub fn locate<S: HostSurface + ?Sized>(surface: &S) -> Position {
        let Some(selection) = surface.selection() else {
            return Position::default();
        };
        let point = selection.first_range().end;
        let Some(rect) = surface.caret_rect(&point) else {
            return Position::default();
        };
        let (scroll_x, scroll_y) = surface.scroll_offset();
        Position {
            top: rect.bottom + scroll_y,
            left: rect.left + scroll_x,
        }
    }

    pub fn extract_query<S: HostSurface + ?Sized>(surface: &S) -> Option<String> {
        let anchor = &surface.selection()?.anchor;
        let before = surface.document().text_before(anchor)?;
        let query = match_query(&before);
        trace!(?query, "extracted mention query");
        query
    }

    /// Hit-tests client coordinates. A miss is not an error.
    pub fn locate_from_pointer<S: HostSurface + ?Sized>(surface: &S, x: f32, y: f32) -> Option<Range> {
        let range = surface.range_from_point(x, y);
        if range.is_none() {
            trace!(x, y, "no caret under pointer");
        }
        range
    }
}
