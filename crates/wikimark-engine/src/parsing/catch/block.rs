use crate::parsing::position::Position;

use super::{Catch, CatchId, CatchType, GenericCatch};

/// The body of a block: `type [name] { ... }`.
///
/// Accepts every character; structure inside a body (child blocks,
/// variables) is recognized by the scanner before the character gets here.
#[derive(Debug, Clone)]
pub struct BlockCatch {
    pub block_type: String,
    pub name: Option<String>,
    parent: Option<CatchId>,
    generic: GenericCatch,
}

impl BlockCatch {
    pub const OPEN: char = '{';
    pub const CLOSE: char = '}';
    pub const NAME_OPEN: char = '[';
    pub const NAME_CLOSE: char = ']';

    pub fn new(
        block_type: impl Into<String>,
        name: Option<String>,
        parent: Option<CatchId>,
        pos: Position,
    ) -> Self {
        Self {
            block_type: block_type.into(),
            name,
            parent,
            generic: GenericCatch::new(pos),
        }
    }

    /// The implicit root block of a page.
    pub fn main() -> Self {
        Self::new("main", None, None, Position::new(1, 0))
    }

    /// Characters allowed in a block type.
    pub fn is_type_char(ch: char) -> bool {
        ch.is_alphanumeric() || matches!(ch, '_' | '-' | '$' | '.')
    }

    /// Splits a block header off the end of `text`, which holds everything
    /// captured before the opening brace.
    ///
    /// Returns `(type, name)` and truncates `text` to whatever precedes the
    /// header. The name may contain balanced brackets. The type is empty when
    /// none was written.
    pub fn take_header(text: &mut String) -> (String, Option<String>) {
        let mut end = text.trim_end().len();
        let mut name = None;

        if text[..end].ends_with(Self::NAME_CLOSE) {
            let mut depth = 0usize;
            let mut open = None;
            for (i, ch) in text[..end].char_indices().rev() {
                match ch {
                    Self::NAME_CLOSE => depth += 1,
                    Self::NAME_OPEN => {
                        depth -= 1;
                        if depth == 0 {
                            open = Some(i);
                            break;
                        }
                    }
                    _ => {}
                }
            }
            if let Some(open) = open {
                name = Some(text[open + 1..end - 1].trim().to_string());
                end = text[..open].trim_end().len();
            }
        }

        let start = text[..end]
            .char_indices()
            .rev()
            .take_while(|&(_, ch)| Self::is_type_char(ch))
            .last()
            .map_or(end, |(i, _)| i);

        let block_type = text[start..end].to_string();
        text.truncate(start);
        (block_type, name)
    }
}

impl Catch for BlockCatch {
    fn catch_type(&self) -> CatchType {
        CatchType::Block
    }

    fn parent(&self) -> Option<CatchId> {
        self.parent
    }

    fn char_ok(&self, _ch: char) -> bool {
        true
    }

    fn generic(&self) -> &GenericCatch {
        &self.generic
    }

    fn generic_mut(&mut self) -> &mut GenericCatch {
        &mut self.generic
    }
}
