use crate::core::{Document, Node, Point};
use crate::ops::Path;

const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "div",
    "dl",
    "figure",
    "footer",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "li",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "ul",
];

fn is_block(node: &Node) -> bool {
    matches!(node, Node::Element(el) if BLOCK_TAGS.contains(&el.tag.as_str()))
}

/// A caret position laid out on a monospace grid.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CaretStop {
    pub point: Point,
    pub line: usize,
    pub col: usize,
}

/// Every caret position of the document in document order. Each top-level
/// block gets its own line, consecutive inline top-level nodes share one,
/// and `<br>` starts a new line.
pub(crate) fn caret_stops(doc: &Document) -> Vec<CaretStop> {
    let mut walker = Walker::default();
    let mut inline_run = false;

    for (ix, node) in doc.children.iter().enumerate() {
        let block = is_block(node);
        if ix > 0 && (block || !inline_run) {
            walker.new_line();
        }
        walker.stop(Vec::new(), ix);
        walker.walk(node, &mut vec![ix]);
        inline_run = !block;
    }
    walker.stop(Vec::new(), doc.children.len());

    walker.stops
}

#[derive(Default)]
struct Walker {
    line: usize,
    col: usize,
    stops: Vec<CaretStop>,
}

impl Walker {
    fn new_line(&mut self) {
        self.line += 1;
        self.col = 0;
    }

    fn stop(&mut self, path: Path, offset: usize) {
        self.stops.push(CaretStop {
            point: Point::new(path, offset),
            line: self.line,
            col: self.col,
        });
    }

    fn walk(&mut self, node: &Node, path: &mut Path) {
        match node {
            Node::Text(t) => {
                for (byte, _) in t.text.char_indices() {
                    self.stop(path.clone(), byte);
                    self.col += 1;
                }
                self.stop(path.clone(), t.text.len());
            }
            Node::Element(el) if el.tag == "br" => self.new_line(),
            Node::Element(el) => {
                for (ix, child) in el.children.iter().enumerate() {
                    self.stop(path.clone(), ix);
                    path.push(ix);
                    self.walk(child, path);
                    path.pop();
                }
                self.stop(path.clone(), el.children.len());
            }
        }
    }
}
