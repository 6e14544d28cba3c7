use pretty_assertions::assert_eq;
use wikimark_engine::elements::{ElementError, ElementTree};
use wikimark_engine::{Page, PageError, Position};

fn compile(src: &str) -> (String, Page) {
    let mut page = Page::from_source(src);
    page.parse().expect("page should parse");
    let html = page.html().into_string();
    (html, page)
}

#[test]
fn full_page_renders_sections_variables_and_links() {
    let src = "\
@page.title: Demo;
@site: [i]Wiki[/i];

Welcome to [@site].

sec [Links] {
    See [[wp:Dog]] and [[~Cats]].
}
";
    let (html, page) = compile(src);
    insta::assert_snapshot!(
        html,
        @r#"<div class="q-main"><p class="q-p">Welcome to <span style="font-style: italic;">Wiki</span>.</p><div class="q-sec"><h2 class="q-sec-title" id="qa-Links">Links</h2><p class="q-p">See <a class="q-link-external" href="https://en.wikipedia.org/wiki/Dog" title="Wikipedia: Dog">Dog</a> and <a class="q-link-category" href="/topic/Cats" title="Cats">Cats</a>.</p></div></div>"#
    );
    assert!(page.warnings().is_empty());
    assert_eq!(page.title(), "Demo");
}

#[test]
fn title_round_trip_strips_tags() {
    let (_, page) = compile("@page.title: [b]Hi[/b];");
    assert_eq!(page.title(), "Hi");
    assert_eq!(
        page.fmt_title().as_str(),
        r#"<span style="font-weight: bold;">Hi</span>"#
    );
}

#[test]
fn bad_links_and_variables_warn_but_render() {
    let (html, page) = compile("[[nowiki:Thing]] [@missing]");
    assert_eq!(
        html,
        r#"<div class="q-main"><p class="q-p"><a class="q-link-external invalid" href="Thing" title="nowiki">Thing</a> (null)</p></div>"#
    );
    let warnings: Vec<_> = page.warnings().iter().map(|w| w.to_string()).collect();
    assert_eq!(
        warnings,
        vec![
            format!("{}: external wiki 'nowiki' does not exist", Position::new(1, 1)),
            format!("{}: undefined variable @missing", Position::new(1, 18)),
        ]
    );
}

#[test]
fn colors_by_name_and_hex() {
    let (html, _) = compile("[red]a[/c] [#ff0000]b[/c]");
    assert_eq!(
        html,
        r#"<div class="q-main"><p class="q-p"><span style="color: #ff0000;">a</span> <span style="color: #ff0000;">b</span></p></div>"#
    );
}

#[test]
fn parse_without_source_is_a_configuration_error() {
    let err = Page::default().parse().unwrap_err();
    assert!(matches!(err, PageError::NoSource));
}

#[test]
fn vars_only_file_renders_nothing() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("wiki.conf");
    std::fs::write(&path, "@name: My Wiki;\n@root.page: /w;\n").unwrap();

    let mut page = Page::new(&path);
    page.vars_only = true;
    page.parse().unwrap();

    assert_eq!(page.vars().get_str("name").unwrap().as_deref(), Some("My Wiki"));
    assert_eq!(page.opt.root.page, "/w");
    assert!(page.html().is_empty());
}

#[test]
fn parse_is_repeatable() {
    let mut page = Page::from_source("@x: 1;\ntext [@x]");
    page.parse().unwrap();
    let first = page.html();
    page.parse().unwrap();
    assert_eq!(page.html(), first);
}

#[test]
fn collection_accessors_are_unsupported() {
    let mut tree = ElementTree::new();
    let items = tree.create_collection();
    let a = tree.create("li", "item");
    let b = tree.create("li", "item");
    tree.add_child(items, a).unwrap();
    tree.add_child(items, b).unwrap();

    assert!(matches!(tree.attr(items, "id"), Err(ElementError::Unsupported { .. })));
    assert!(matches!(tree.style(items, "color"), Err(ElementError::Unsupported { .. })));

    tree.add_class(items, "x").unwrap();
    let first = tree.generate(items).unwrap();
    assert_eq!(
        first.as_str(),
        r#"<li class="q-item x"></li><li class="q-item x"></li>"#
    );
    assert_eq!(tree.generate(items).unwrap(), first);
}
