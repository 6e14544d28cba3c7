//! # Parsing
//!
//! Source text goes through three stages:
//!
//! 1. **`parser`** scans lines into a [`CatchTree`](catch::CatchTree) of
//!    blocks and variable statements
//! 2. **`blocks`** turns the catch tree into typed blocks, then renders them
//!    into an [`ElementTree`](crate::elements::ElementTree)
//! 3. **`format`** expands inline format codes in each text run, calling
//!    **`link`** for `[[ ... ]]` targets

pub mod blocks;
pub mod catch;
pub mod format;
pub mod link;
pub mod parser;
pub mod position;

pub use format::{FmtOpt, Formatter};
pub use link::{Link, LinkState, LinkType};
pub use parser::Parser;
pub use position::{PosContent, Position};
