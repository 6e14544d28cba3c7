//! Page and category name normalization.

use std::sync::OnceLock;

use regex::Regex;

const PAGE_EXTENSIONS: [&str; 3] = ["page", "model", "conf"];

fn non_word_regex() -> &'static Regex {
    static NON_WORD: OnceLock<Regex> = OnceLock::new();
    NON_WORD.get_or_init(|| Regex::new(r"[^\w.\-/]+").expect("Invalid name regex"))
}

/// Ensures a page name carries a page extension (`.page`, `.model` or `.conf`).
pub fn page_name(name: &str) -> String {
    let has_ext = name
        .rsplit_once('.')
        .is_some_and(|(_, ext)| PAGE_EXTENSIONS.contains(&ext));
    if has_ext {
        name.to_string()
    } else {
        format!("{name}.page")
    }
}

/// Page name with No Extension.
pub fn page_name_ne(name: &str) -> String {
    let name = page_name(name);
    name.strip_suffix(".page").unwrap_or(&name).to_string()
}

/// Normalizes a page name for use in a URL: runs of characters other than
/// word characters, `.`, `-` and `/` become a single `_`. Case is preserved.
pub fn page_name_link(name: &str) -> String {
    non_word_regex()
        .replace_all(name.trim(), "_")
        .into_owned()
}

/// Ensures a category name carries the `.cat` extension.
pub fn category_name(name: &str) -> String {
    let name = page_name_link(name);
    if name.ends_with(".cat") {
        name
    } else {
        format!("{name}.cat")
    }
}

/// Category name with No Extension, normalized for links.
pub fn category_name_ne(name: &str) -> String {
    let name = category_name(name);
    name.strip_suffix(".cat").unwrap_or(&name).to_string()
}
