use crate::parsing::position::{PosContent, Position};

use super::{Catch, CatchId, CatchType, GenericCatch};

/// How a variable's value is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sigil {
    /// `@name: text;` stores formatted HTML.
    At,
    /// `%name: text;` stores the raw string.
    Percent,
}

impl Sigil {
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '@' => Some(Sigil::At),
            '%' => Some(Sigil::Percent),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Sigil::At => '@',
            Sigil::Percent => '%',
        }
    }
}

/// The name part of a variable assignment, after the sigil.
#[derive(Debug, Clone)]
pub struct VariableName {
    pub sigil: Sigil,
    parent: CatchId,
    generic: GenericCatch,
}

impl VariableName {
    pub const ASSIGN: [char; 2] = [':', '='];
    pub const TERMINATOR: char = ';';

    pub fn new(sigil: Sigil, pos: Position, parent: CatchId) -> Self {
        let prefix = PosContent::new(sigil.as_char().to_string(), pos);
        Self {
            sigil,
            parent,
            generic: GenericCatch::with_prefix(prefix),
        }
    }

    pub fn name(&self) -> String {
        self.generic.text()
    }
}

impl Catch for VariableName {
    fn catch_type(&self) -> CatchType {
        CatchType::VariableName
    }

    fn parent(&self) -> Option<CatchId> {
        Some(self.parent)
    }

    // word characters, dots and path separators
    fn char_ok(&self, ch: char) -> bool {
        ch.is_alphanumeric() || matches!(ch, '_' | '.' | '/')
    }

    fn should_skip_char(&self, ch: char) -> bool {
        ch.is_whitespace()
    }

    fn generic(&self) -> &GenericCatch {
        &self.generic
    }

    fn generic_mut(&mut self) -> &mut GenericCatch {
        &mut self.generic
    }
}

/// The value part of a variable assignment. Accepts any character,
/// newlines included, until an unescaped `;`.
#[derive(Debug, Clone)]
pub struct VariableValue {
    pub name: String,
    pub sigil: Sigil,
    /// A block written as the value (`@x: map { ... };`).
    pub block: Option<CatchId>,
    parent: CatchId,
    generic: GenericCatch,
}

impl VariableValue {
    pub const TERMINATOR: char = ';';

    pub fn new(name: String, sigil: Sigil, pos: Position, parent: CatchId) -> Self {
        Self {
            name,
            sigil,
            block: None,
            parent,
            generic: GenericCatch::new(pos),
        }
    }
}

impl Catch for VariableValue {
    fn catch_type(&self) -> CatchType {
        CatchType::VariableValue
    }

    fn parent(&self) -> Option<CatchId> {
        Some(self.parent)
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
