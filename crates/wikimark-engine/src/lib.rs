pub mod elements;
pub mod error;
pub mod html;
pub mod io;
pub mod models;
pub mod parsing;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use error::{PageError, Warning};
pub use html::Html;
pub use io::*;
pub use models::{ExternalType, ExternalWiki, LinkHandler, Page, PageInfo, PageOpt, Value, VariableScope};
pub use parsing::{Link, LinkState, LinkType, Position};
