//! Wadler-Lindig document IR.
//!
//! Lowered Core Erlang is turned into a `Doc` tree that records layout
//! intent (groups, indentation, optional line breaks) without committing to
//! a layout. The printer decides at each `Group` whether it fits flat.

/// A document node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Doc {
    /// Literal text, never broken.
    Text(String),
    /// A space when flat; a newline plus indentation when broken.
    Space,
    /// Nothing when flat; a newline plus indentation when broken.
    Softline,
    /// Always a newline plus the current indentation.
    Hardline,
    /// Increase indentation for the child.
    Indent(Box<Doc>),
    /// Set the child's indentation to the column it starts at.
    Align(Box<Doc>),
    /// Render the child flat if it fits in the remaining width, broken
    /// otherwise.
    Group(Box<Doc>),
    Concat(Vec<Doc>),
    Empty,
}

pub fn text(s: impl Into<String>) -> Doc {
    Doc::Text(s.into())
}

pub fn space() -> Doc {
    Doc::Space
}

pub fn softline() -> Doc {
    Doc::Softline
}

pub fn hardline() -> Doc {
    Doc::Hardline
}

pub fn indent(doc: Doc) -> Doc {
    Doc::Indent(Box::new(doc))
}

pub fn align(doc: Doc) -> Doc {
    Doc::Align(Box::new(doc))
}

pub fn group(doc: Doc) -> Doc {
    Doc::Group(Box::new(doc))
}

pub fn concat(parts: Vec<Doc>) -> Doc {
    Doc::Concat(parts)
}

/// Interleave `docs` with `sep`.
pub fn join(docs: Vec<Doc>, sep: impl Fn() -> Doc) -> Doc {
    let mut parts = Vec::with_capacity(docs.len() * 2);
    for (i, doc) in docs.into_iter().enumerate() {
        if i > 0 {
            parts.push(sep());
        }
        parts.push(doc);
    }
    Doc::Concat(parts)
}

/// `(a, b, c)`, breaking after each comma when the group does not fit.
pub fn arg_list(args: Vec<Doc>) -> Doc {
    group(concat(vec![
        text("("),
        indent(concat(vec![
            softline(),
            join(args, || concat(vec![text(","), space()])),
        ])),
        softline(),
        text(")"),
    ]))
}
