//! Wadler-Lindig printer for [`Doc`] trees.
//!
//! At each `Group` the printer measures the flat width of the group's
//! contents; if it fits on the remaining line the group is rendered flat,
//! otherwise its `Space`/`Softline` nodes become line breaks.

use crate::doc::Doc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintConfig {
    /// Spaces per indentation level. Default: 2.
    pub indent_size: usize,
    /// Line width before groups break. Default: 80.
    pub max_width: usize,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            indent_size: 2,
            max_width: 80,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Flat,
    Break,
}

#[derive(Debug)]
struct PrintCmd<'a> {
    indent: usize,
    mode: Mode,
    doc: &'a Doc,
}

/// Render `doc`. The output always ends with a newline unless empty.
pub fn print(doc: &Doc, config: &PrintConfig) -> String {
    let mut out = String::new();
    let mut col: usize = 0;
    let mut stack: Vec<PrintCmd> = vec![PrintCmd {
        indent: 0,
        mode: Mode::Break,
        doc,
    }];

    while let Some(cmd) = stack.pop() {
        match cmd.doc {
            Doc::Empty => {}

            Doc::Text(s) => {
                out.push_str(s);
                col += s.chars().count();
            }

            Doc::Space | Doc::Softline if cmd.mode == Mode::Flat => {
                if matches!(cmd.doc, Doc::Space) {
                    out.push(' ');
                    col += 1;
                }
            }

            Doc::Space | Doc::Softline | Doc::Hardline => {
                newline(&mut out, cmd.indent);
                col = cmd.indent;
            }

            Doc::Indent(child) => stack.push(PrintCmd {
                indent: cmd.indent + config.indent_size,
                mode: cmd.mode,
                doc: child,
            }),

            Doc::Align(child) => stack.push(PrintCmd {
                indent: col,
                mode: cmd.mode,
                doc: child,
            }),

            Doc::Group(child) => {
                let fits = col.saturating_add(measure_flat(child)) <= config.max_width;
                stack.push(PrintCmd {
                    indent: cmd.indent,
                    mode: if fits { Mode::Flat } else { Mode::Break },
                    doc: child,
                });
            }

            Doc::Concat(parts) => {
                for part in parts.iter().rev() {
                    stack.push(PrintCmd {
                        indent: cmd.indent,
                        mode: cmd.mode,
                        doc: part,
                    });
                }
            }
        }
    }

    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

fn newline(out: &mut String, indent: usize) {
    // No trailing whitespace on the line being closed.
    while out.ends_with(' ') {
        out.pop();
    }
    out.push('\n');
    out.extend(std::iter::repeat(' ').take(indent));
}

/// Flat width of `doc`; `usize::MAX` if it contains a `Hardline`.
fn measure_flat(doc: &Doc) -> usize {
    match doc {
        Doc::Empty | Doc::Softline => 0,
        Doc::Text(s) => s.chars().count(),
        Doc::Space => 1,
        Doc::Hardline => usize::MAX,
        Doc::Indent(child) | Doc::Align(child) | Doc::Group(child) => measure_flat(child),
        Doc::Concat(parts) => {
            let mut total: usize = 0;
            for part in parts {
                let width = measure_flat(part);
                if width == usize::MAX {
                    return usize::MAX;
                }
                total = total.saturating_add(width);
            }
            total
        }
    }
}
