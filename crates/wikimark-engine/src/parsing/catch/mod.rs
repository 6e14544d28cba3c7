//! # Catches
//!
//! A catch is an accumulating capture region: a block body, a variable name
//! or a variable value. The scanner feeds characters into the innermost open
//! catch, which decides per character whether to accept it
//! ([`Catch::char_ok`]) or silently drop it ([`Catch::should_skip_char`]).
//!
//! Catches live in an arena ([`CatchTree`]) and refer to their parent by
//! [`CatchId`], so a closed catch can hand control back to the surrounding
//! one without an ownership cycle.
//!
//! ## Modules
//!
//! - **`block`**: [`BlockCatch`], the body of `type [name] { ... }`
//! - **`variable`**: [`VariableName`] and [`VariableValue`]

pub mod block;
pub mod variable;

pub use block::BlockCatch;
pub use variable::{Sigil, VariableName, VariableValue};

use crate::parsing::position::{PosContent, Position};

/// Index of a catch in its [`CatchTree`].
pub type CatchId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatchType {
    Block,
    VariableName,
    VariableValue,
}

/// One piece of a catch's content: captured text or a nested catch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatchItem {
    Text(PosContent),
    Child(CatchId),
}

/// Storage shared by every catch kind.
#[derive(Debug, Clone, Default)]
pub struct GenericCatch {
    /// Characters seeded before any content, e.g. the `@` of a variable name.
    pub prefix: Option<PosContent>,
    pub content: Vec<CatchItem>,
    /// Where the catch opened.
    pub pos: Position,
}

impl GenericCatch {
    pub fn new(pos: Position) -> Self {
        Self {
            pos,
            ..Default::default()
        }
    }

    pub fn with_prefix(prefix: PosContent) -> Self {
        let pos = prefix.pos;
        Self {
            prefix: Some(prefix),
            content: Vec::new(),
            pos,
        }
    }

    fn push_char(&mut self, ch: char, pos: Position) {
        if let Some(CatchItem::Text(last)) = self.content.last_mut() {
            last.content.push(ch);
        } else {
            self.content
                .push(CatchItem::Text(PosContent::new(ch.to_string(), pos)));
        }
    }

    /// The text run being appended to, if the last item is text.
    pub fn trailing_text_mut(&mut self) -> Option<&mut PosContent> {
        match self.content.last_mut() {
            Some(CatchItem::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// All text content joined, ignoring nested catches.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|item| match item {
                CatchItem::Text(t) => Some(t.content.as_str()),
                CatchItem::Child(_) => None,
            })
            .collect()
    }
}

/// The capability every catch kind shares.
pub trait Catch {
    fn catch_type(&self) -> CatchType;

    fn parent(&self) -> Option<CatchId>;

    /// Whether `ch` may be appended to this catch.
    fn char_ok(&self, ch: char) -> bool;

    /// Whether `ch` should be dropped without error.
    fn should_skip_char(&self, _ch: char) -> bool {
        false
    }

    fn generic(&self) -> &GenericCatch;

    fn generic_mut(&mut self) -> &mut GenericCatch;

    /// Appends `ch` unless this catch rejects it. Returns false on rejection.
    fn append(&mut self, ch: char, pos: Position) -> bool {
        if !self.char_ok(ch) {
            return false;
        }
        self.generic_mut().push_char(ch, pos);
        true
    }

    fn pos(&self) -> Position {
        self.generic().pos
    }
}

/// Any catch stored in a [`CatchTree`].
#[derive(Debug, Clone)]
pub enum AnyCatch {
    Block(BlockCatch),
    Name(VariableName),
    Value(VariableValue),
}

impl AnyCatch {
    fn inner(&self) -> &dyn Catch {
        match self {
            AnyCatch::Block(c) => c,
            AnyCatch::Name(c) => c,
            AnyCatch::Value(c) => c,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Catch {
        match self {
            AnyCatch::Block(c) => c,
            AnyCatch::Name(c) => c,
            AnyCatch::Value(c) => c,
        }
    }

    pub fn as_block(&self) -> Option<&BlockCatch> {
        match self {
            AnyCatch::Block(b) => Some(b),
            _ => None,
        }
    }
}

impl Catch for AnyCatch {
    fn catch_type(&self) -> CatchType {
        self.inner().catch_type()
    }

    fn parent(&self) -> Option<CatchId> {
        self.inner().parent()
    }

    fn char_ok(&self, ch: char) -> bool {
        self.inner().char_ok(ch)
    }

    fn should_skip_char(&self, ch: char) -> bool {
        self.inner().should_skip_char(ch)
    }

    fn generic(&self) -> &GenericCatch {
        self.inner().generic()
    }

    fn generic_mut(&mut self) -> &mut GenericCatch {
        self.inner_mut().generic_mut()
    }
}

/// Arena of every catch opened while scanning a page. The main block is
/// always [`CatchTree::MAIN`].
#[derive(Debug, Clone)]
pub struct CatchTree {
    catches: Vec<AnyCatch>,
}

impl CatchTree {
    pub const MAIN: CatchId = 0;

    pub fn new() -> Self {
        Self {
            catches: vec![AnyCatch::Block(BlockCatch::main())],
        }
    }

    pub fn push(&mut self, catch: AnyCatch) -> CatchId {
        self.catches.push(catch);
        self.catches.len() - 1
    }

    pub fn get(&self, id: CatchId) -> &AnyCatch {
        &self.catches[id]
    }

    pub fn get_mut(&mut self, id: CatchId) -> &mut AnyCatch {
        &mut self.catches[id]
    }

    /// The block catch at `id`, if that catch is a block.
    pub fn block(&self, id: CatchId) -> Option<&BlockCatch> {
        self.catches.get(id).and_then(AnyCatch::as_block)
    }

    pub fn main(&self) -> &BlockCatch {
        match &self.catches[Self::MAIN] {
            AnyCatch::Block(b) => b,
            _ => unreachable!("catch 0 is always the main block"),
        }
    }

    pub fn len(&self) -> usize {
        self.catches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catches.is_empty()
    }
}

impl Default for CatchTree {
    fn default() -> Self {
        Self::new()
    }
}
