pub mod names;
pub mod options;
pub mod page;
pub mod variables;

pub use names::*;
pub use options::*;
pub use page::{Page, PageInfo};
pub use variables::{Value, VarError, VariableScope};
