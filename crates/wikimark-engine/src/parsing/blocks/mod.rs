//! # Blocks
//!
//! Typed blocks built from the catch tree once scanning has finished.
//!
//! ## Modules
//!
//! - **`render`**: turns a block into elements of an [`ElementTree`](crate::elements::ElementTree)
//! - **`value`**: turns `map` and `list` blocks into variable values
//!
//! ## Block types
//!
//! | type   | renders as                                   |
//! |--------|----------------------------------------------|
//! | `main` | `div.q-main`, loose text split into `p.q-p`  |
//! | `sec`  | `div.q-sec` with an optional heading         |
//! | `p`    | one `p.q-p`                                  |
//! | `code` | `pre.q-code`, escaped but not formatted      |
//! | `list` | `ul.q-list` of `li.q-list-item`              |
//! | `html` | raw HTML                                     |
//! | `map`  | nothing                                      |

pub mod render;
pub mod value;

pub use render::render;
pub use value::block_value;

use crate::parsing::catch::{Catch, CatchId, CatchItem, CatchTree};
use crate::parsing::position::{PosContent, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Main,
    Sec,
    Paragraph,
    Code,
    List,
    Html,
    Map,
    Unknown,
}

impl BlockKind {
    pub fn from_type(block_type: &str) -> Self {
        match block_type {
            "main" => BlockKind::Main,
            "sec" => BlockKind::Sec,
            "p" => BlockKind::Paragraph,
            "code" => BlockKind::Code,
            "list" => BlockKind::List,
            "html" => BlockKind::Html,
            "map" => BlockKind::Map,
            _ => BlockKind::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockItem {
    Text(PosContent),
    Child(Block),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub block_type: String,
    pub name: Option<String>,
    pub pos: Position,
    pub items: Vec<BlockItem>,
}

impl Block {
    /// Builds the block at `id` and its descendants. `None` if the catch at
    /// `id` is not a block.
    pub fn parse(tree: &CatchTree, id: CatchId) -> Option<Block> {
        let catch = tree.block(id)?;
        let items = catch
            .generic()
            .content
            .iter()
            .filter_map(|item| match item {
                CatchItem::Text(text) => Some(BlockItem::Text(text.clone())),
                CatchItem::Child(child) => Block::parse(tree, *child).map(BlockItem::Child),
            })
            .collect();

        Some(Block {
            kind: BlockKind::from_type(&catch.block_type),
            block_type: catch.block_type.clone(),
            name: catch.name.clone(),
            pos: catch.pos(),
            items,
        })
    }

    /// All text content joined, ignoring child blocks.
    pub fn text(&self) -> String {
        self.items
            .iter()
            .filter_map(|item| match item {
                BlockItem::Text(text) => Some(text.content.as_str()),
                BlockItem::Child(_) => None,
            })
            .collect()
    }

    pub fn children(&self) -> impl Iterator<Item = &Block> {
        self.items.iter().filter_map(|item| match item {
            BlockItem::Child(child) => Some(child),
            BlockItem::Text(_) => None,
        })
    }
}

/// Removes structural backslash escapes: `\x` becomes `x`.
pub fn strip_escapes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut escaped = false;
    for ch in text.chars() {
        if ch == '\\' && !escaped {
            escaped = true;
            continue;
        }
        escaped = false;
        out.push(ch);
    }
    out
}

/// Splits text into paragraphs on blank lines. Each paragraph's position is
/// that of its first non-whitespace character.
pub fn paragraphs(text: &PosContent) -> Vec<PosContent> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut start: Option<Position> = None;
    let mut line = text.pos.line;
    let mut column = text.pos.column;

    for raw in text.content.split_inclusive('\n') {
        if raw.trim().is_empty() {
            if let Some(pos) = start.take() {
                out.push(PosContent::new(std::mem::take(&mut current), pos));
            }
        } else {
            if start.is_none() {
                let indent = raw.chars().take_while(|c| c.is_whitespace()).count();
                start = Some(Position::new(line, column + indent));
            }
            current.push_str(raw);
        }
        line += 1;
        column = 1;
    }

    if let Some(pos) = start {
        out.push(PosContent::new(current, pos));
    }
    out
}
