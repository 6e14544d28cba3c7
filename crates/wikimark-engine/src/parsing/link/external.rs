//! The built-in handler for `wiki:page` links.

use std::sync::Arc;

use crate::models::names::page_name_link;
use crate::models::options::{ExternalType, LinkHandler};
use crate::models::page::Page;

use super::LinkState;

pub fn default_handler() -> LinkHandler {
    Arc::new(external_link)
}

/// Resolves an external wiki link against the page's external wiki registry.
///
/// On entry the wiki identifier is in `state.tooltip` and the page name in
/// `state.target`. Targets are normalized according to the wiki's type;
/// HTML escaping is left to anchor rendering.
pub fn external_link(page: &Page, state: &mut LinkState) {
    let Some(ext) = page.opt.external.get(&state.tooltip) else {
        state.invalidate(format!("external wiki '{}' does not exist", state.tooltip));
        return;
    };

    let (target, section) = match state.target.split_once('#') {
        Some((target, section)) => (target.trim().to_string(), Some(section.trim().to_string())),
        None => (state.target.clone(), None),
    };

    state.tooltip = match &section {
        Some(section) => format!("{}: {target} # {section}", ext.name),
        None => format!("{}: {target}", ext.name),
    };

    let normalize = |s: &str| match ext.kind {
        ExternalType::Quiki => page_name_link(s),
        ExternalType::MediaWiki => s.replace(' ', "_"),
        ExternalType::None => s.to_string(),
    };

    state.target = format!("{}/{}", ext.root, normalize(&target));
    if let Some(section) = section.filter(|s| !s.is_empty()) {
        state.target.push('#');
        state.target.push_str(&normalize(&section));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::options::ExternalWiki;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn state(wiki: &str, target: &str) -> LinkState {
        let mut state = LinkState::new(target);
        state.tooltip = wiki.to_string();
        state
    }

    fn page() -> Page {
        let mut page = Page::from_source("");
        page.opt.external.insert(
            "q".to_string(),
            ExternalWiki::new("Quiki", "https://q.example/page", ExternalType::Quiki),
        );
        page.opt.external.insert(
            "raw".to_string(),
            ExternalWiki::new("Raw", "https://raw.example", ExternalType::None),
        );
        page
    }

    #[rstest]
    #[case("wp", "Dog", "https://en.wikipedia.org/wiki/Dog", "Wikipedia: Dog")]
    #[case(
        "wp",
        "Big Dog#Early life",
        "https://en.wikipedia.org/wiki/Big_Dog#Early_life",
        "Wikipedia: Big Dog # Early life"
    )]
    #[case("q", "Some Page!", "https://q.example/page/Some_Page_", "Quiki: Some Page!")]
    #[case("raw", "a b#c d", "https://raw.example/a b#c d", "Raw: a b # c d")]
    fn normalizes_by_wiki_type(
        #[case] wiki: &str,
        #[case] target: &str,
        #[case] expected_target: &str,
        #[case] expected_tooltip: &str,
    ) {
        let mut state = state(wiki, target);
        external_link(&page(), &mut state);
        assert!(state.ok);
        assert_eq!(state.target, expected_target);
        assert_eq!(state.tooltip, expected_tooltip);
    }

    #[test]
    fn unregistered_wiki_invalidates() {
        let mut state = state("nope", "Dog");
        external_link(&page(), &mut state);
        assert!(!state.ok);
        assert_eq!(state.target, "Dog");
        assert_eq!(
            state.warning.as_deref(),
            Some("external wiki 'nope' does not exist")
        );
    }
}
