use crate::error::PageError;
use crate::parsing::catch::{
    AnyCatch, BlockCatch, Catch, CatchId, CatchItem, CatchTree, CatchType, Sigil, VariableName,
    VariableValue,
};
use crate::parsing::position::{PosContent, Position};

/// A completed variable statement, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub name: String,
    pub sigil: Sigil,
    pub value: AssignedValue,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignedValue {
    /// `@name;`
    Flag,
    Text(PosContent),
    /// A block catch written as the value.
    Block(CatchId),
}

/// Incremental scanner that feeds page source into catches.
///
/// Call [`Parser::parse_line`] for each line, drain completed variable
/// statements with [`Parser::take_assignments`], then [`Parser::finish`].
pub struct Parser {
    tree: CatchTree,
    current: CatchId,
    pos: Position,
    escaped: bool,
    /// Nothing but whitespace consumed on this line so far.
    line_blank: bool,
    assignments: Vec<Assignment>,
}

impl Parser {
    pub const ESCAPE: char = '\\';

    pub fn new() -> Self {
        Self {
            tree: CatchTree::new(),
            current: CatchTree::MAIN,
            pos: Position::new(0, 0),
            escaped: false,
            line_blank: true,
            assignments: Vec::new(),
        }
    }

    /// Position of the last consumed character.
    pub fn pos(&self) -> Position {
        self.pos
    }

    pub fn tree(&self) -> &CatchTree {
        &self.tree
    }

    /// Feeds one line. The line should not include its terminator; a newline
    /// is fed after it.
    pub fn parse_line(&mut self, line: &str) -> Result<(), PageError> {
        self.pos = Position::new(self.pos.line + 1, 0);
        self.line_blank = true;
        for ch in line.chars().chain(std::iter::once('\n')) {
            self.pos.column += 1;
            self.feed(ch)?;
        }
        Ok(())
    }

    /// Returns variable statements completed since the last call.
    pub fn take_assignments(&mut self) -> Vec<Assignment> {
        std::mem::take(&mut self.assignments)
    }

    /// Ends the scan, failing if a block or variable is still open.
    pub fn finish(self) -> Result<CatchTree, PageError> {
        if self.current != CatchTree::MAIN {
            let open = self.tree.get(self.current);
            let what = match open.catch_type() {
                CatchType::Block => match open.as_block() {
                    Some(b) => format!("unterminated {} block", b.block_type),
                    None => "unterminated block".to_string(),
                },
                CatchType::VariableName => "unterminated variable name".to_string(),
                CatchType::VariableValue => "unterminated variable value".to_string(),
            };
            return Err(PageError::syntax(open.pos(), what));
        }
        Ok(self.tree)
    }

    fn feed(&mut self, ch: char) -> Result<(), PageError> {
        let escaped = std::mem::take(&mut self.escaped);
        match self.tree.get(self.current).catch_type() {
            CatchType::VariableName => self.feed_name(ch),
            CatchType::VariableValue => self.feed_value(ch, escaped),
            CatchType::Block => self.feed_block(ch, escaped),
        }
    }

    fn feed_name(&mut self, ch: char) -> Result<(), PageError> {
        let pos = self.pos;
        let AnyCatch::Name(name) = self.tree.get_mut(self.current) else {
            unreachable!("current catch is a variable name");
        };

        if name.should_skip_char(ch) {
            return Ok(());
        }

        if ch == VariableName::TERMINATOR || VariableName::ASSIGN.contains(&ch) {
            let var = name.name();
            if var.is_empty() {
                return Err(PageError::syntax(pos, "variable has no name"));
            }
            let (sigil, start, parent) = (name.sigil, name.pos(), name.parent().unwrap_or(0));

            if ch == VariableName::TERMINATOR {
                self.assignments.push(Assignment {
                    name: var,
                    sigil,
                    value: AssignedValue::Flag,
                    pos: start,
                });
                self.current = parent;
                self.line_blank = true;
            } else {
                let value = VariableValue::new(var, sigil, start, parent);
                self.current = self.tree.push(AnyCatch::Value(value));
            }
            return Ok(());
        }

        if !name.append(ch, pos) {
            return Err(PageError::syntax(
                pos,
                format!("unexpected {ch:?} in variable name"),
            ));
        }
        Ok(())
    }

    fn feed_value(&mut self, ch: char, escaped: bool) -> Result<(), PageError> {
        let pos = self.pos;
        let id = self.current;
        let AnyCatch::Value(value) = self.tree.get_mut(id) else {
            unreachable!("current catch is a variable value");
        };

        if escaped {
            value.append(ch, pos);
            return Ok(());
        }

        match ch {
            Self::ESCAPE => {
                self.escaped = true;
                value.append(ch, pos);
            }
            BlockCatch::OPEN => {
                if value.block.is_some() {
                    return Err(PageError::syntax(pos, "variable value has two blocks"));
                }
                let mut text = value.generic().text();
                let (block_type, name) = BlockCatch::take_header(&mut text);
                if block_type.is_empty() {
                    return Err(PageError::syntax(pos, "block has no type"));
                }
                if !text.trim().is_empty() {
                    return Err(PageError::syntax(
                        pos,
                        format!("unexpected text before {block_type} block in variable value"),
                    ));
                }
                value.generic_mut().content.clear();
                let block = BlockCatch::new(block_type, name, Some(id), pos);
                let block_id = self.tree.push(AnyCatch::Block(block));
                if let AnyCatch::Value(value) = self.tree.get_mut(id) {
                    value.block = Some(block_id);
                }
                self.current = block_id;
            }
            VariableValue::TERMINATOR => {
                let assignment = Assignment {
                    name: value.name.clone(),
                    sigil: value.sigil,
                    value: match value.block {
                        Some(block) => AssignedValue::Block(block),
                        None => AssignedValue::Text(PosContent::new(
                            value.generic().text(),
                            value
                                .generic()
                                .content
                                .first()
                                .map_or(value.pos(), |item| match item {
                                    CatchItem::Text(t) => t.pos,
                                    CatchItem::Child(_) => value.pos(),
                                }),
                        )),
                    },
                    pos: value.pos(),
                };
                self.current = value.parent().unwrap_or(CatchTree::MAIN);
                self.assignments.push(assignment);
                self.line_blank = true;
            }
            _ if value.block.is_some() => {
                if !ch.is_whitespace() {
                    return Err(PageError::syntax(
                        pos,
                        format!("expected ';' after block value, found {ch:?}"),
                    ));
                }
            }
            _ => {
                value.append(ch, pos);
            }
        }
        Ok(())
    }

    fn feed_block(&mut self, ch: char, escaped: bool) -> Result<(), PageError> {
        let pos = self.pos;
        let id = self.current;
        let line_blank = self.line_blank;
        if !ch.is_whitespace() {
            self.line_blank = false;
        }

        let AnyCatch::Block(block) = self.tree.get_mut(id) else {
            unreachable!("current catch is a block");
        };

        if escaped {
            block.append(ch, pos);
            return Ok(());
        }

        match ch {
            Self::ESCAPE => {
                self.escaped = true;
                block.append(ch, pos);
            }
            BlockCatch::OPEN => {
                let (block_type, name) = match block.generic_mut().trailing_text_mut() {
                    Some(text) => BlockCatch::take_header(&mut text.content),
                    None => (String::new(), None),
                };
                if block_type.is_empty() {
                    return Err(PageError::syntax(pos, "block has no type"));
                }
                let empty_tail = matches!(
                    block.generic().content.last(),
                    Some(CatchItem::Text(t)) if t.content.is_empty()
                );
                if empty_tail {
                    block.generic_mut().content.pop();
                }
                let child = BlockCatch::new(block_type, name, Some(id), pos);
                let child_id = self.tree.push(AnyCatch::Block(child));
                if let AnyCatch::Block(block) = self.tree.get_mut(id) {
                    block.generic_mut().content.push(CatchItem::Child(child_id));
                }
                self.current = child_id;
            }
            BlockCatch::CLOSE => {
                let Some(parent) = block.parent() else {
                    return Err(PageError::syntax(pos, "unexpected '}' outside of any block"));
                };
                self.current = parent;
            }
            _ if line_blank && Sigil::from_char(ch).is_some() => {
                let sigil = Sigil::from_char(ch).unwrap_or(Sigil::At);
                let name = VariableName::new(sigil, pos, id);
                self.current = self.tree.push(AnyCatch::Name(name));
            }
            _ => {
                block.append(ch, pos);
            }
        }
        Ok(())
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}
