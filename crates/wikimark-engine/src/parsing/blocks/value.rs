use crate::models::variables::{Value, VariableScope};
use crate::parsing::format::{FmtOpt, Formatter};
use crate::parsing::position::Position;

use super::{Block, BlockItem, BlockKind, strip_escapes};

/// One `;`-terminated entry of a `map` or `list` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<'b> {
    /// The entry's text. For an entry holding a nested block, the text
    /// before the block.
    pub text: String,
    /// Position of the first non-whitespace character.
    pub pos: Position,
    pub block: Option<&'b Block>,
}

impl Entry<'_> {
    fn is_empty(&self) -> bool {
        self.block.is_none() && self.text.trim().is_empty()
    }
}

/// Splits a block body on unescaped `;`. Escapes are kept in the text.
pub fn entries(block: &Block) -> Vec<Entry<'_>> {
    let mut out = Vec::new();
    let mut current = Entry {
        text: String::new(),
        pos: block.pos,
        block: None,
    };
    let mut started = false;
    let mut escaped = false;

    for item in &block.items {
        match item {
            BlockItem::Text(text) => {
                let mut pos = text.pos;
                for ch in text.content.chars() {
                    let here = pos;
                    if ch == '\n' {
                        pos = Position::new(pos.line + 1, 1);
                    } else {
                        pos.column += 1;
                    }

                    if ch == ';' && !escaped {
                        let done = std::mem::replace(
                            &mut current,
                            Entry {
                                text: String::new(),
                                pos: here,
                                block: None,
                            },
                        );
                        if !done.is_empty() {
                            out.push(done);
                        }
                        started = false;
                        continue;
                    }
                    escaped = ch == '\\' && !escaped;

                    // text after a nested block is not part of the entry
                    if current.block.is_some() {
                        continue;
                    }
                    if !started && !ch.is_whitespace() {
                        started = true;
                        current.pos = here;
                    }
                    current.text.push(ch);
                }
            }
            BlockItem::Child(child) => current.block = Some(child),
        }
    }

    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Converts a `map` or `list` block into a variable value.
///
/// Text values are formatted like `@name: text;` assignments. Other block
/// types cannot be values; they produce a warning and `None`.
pub fn block_value(block: &Block, fmt: &mut Formatter<'_>) -> Option<Value> {
    match block.kind {
        BlockKind::Map => Some(Value::Map(map_value(block, fmt))),
        BlockKind::List => Some(Value::List(
            entries(block)
                .into_iter()
                .filter_map(|entry| match entry.block {
                    Some(child) => block_value(child, fmt),
                    None => Some(Value::Html(fmt.format(entry.text.trim(), FmtOpt::at(entry.pos)))),
                })
                .collect(),
        )),
        _ => {
            fmt.warn(
                block.pos,
                format!("{} block cannot be used as a value", block.block_type),
            );
            None
        }
    }
}

fn map_value(block: &Block, fmt: &mut Formatter<'_>) -> VariableScope {
    let mut scope = VariableScope::new();
    for entry in entries(block) {
        let (key, value) = match entry.block {
            Some(child) => {
                let key = entry.text.trim().trim_end_matches([':', '=']).trim_end();
                let Some(value) = block_value(child, fmt) else {
                    continue;
                };
                (key.to_string(), value)
            }
            None => match entry.text.split_once([':', '=']) {
                Some((key, text)) => {
                    let value = fmt.format(text.trim(), FmtOpt::at(entry.pos));
                    (key.trim().to_string(), Value::Html(value))
                }
                None => (entry.text.trim().to_string(), Value::Bool(true)),
            },
        };

        let key = strip_escapes(&key);
        if key.is_empty() {
            fmt.warn(entry.pos, "map entry has no key");
            continue;
        }
        scope.set(&key, value);
    }
    scope
}
