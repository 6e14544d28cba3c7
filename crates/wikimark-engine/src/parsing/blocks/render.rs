use crate::elements::{ElementError, ElementId, ElementTree};
use crate::html::Html;
use crate::models::names::page_name_link;
use crate::parsing::format::{FmtOpt, Formatter};
use crate::parsing::position::PosContent;

use super::value::entries;
use super::{Block, BlockItem, BlockKind, paragraphs, strip_escapes};

/// Deepest heading level a section title uses.
const MAX_HEADING: usize = 6;

/// Renders a block and its descendants into `tree`.
///
/// Returns `None` for blocks that produce no output (`map`, unknown types).
pub fn render(
    block: &Block,
    fmt: &mut Formatter<'_>,
    tree: &mut ElementTree,
) -> Result<Option<ElementId>, ElementError> {
    render_at(block, fmt, tree, 0)
}

fn render_at(
    block: &Block,
    fmt: &mut Formatter<'_>,
    tree: &mut ElementTree,
    depth: usize,
) -> Result<Option<ElementId>, ElementError> {
    let el = match block.kind {
        BlockKind::Main => {
            let el = tree.create("div", "main");
            render_body(block, fmt, tree, el, depth)?;
            el
        }
        BlockKind::Sec => {
            let el = tree.create("div", "sec");
            if let Some(name) = block.name.as_deref().filter(|n| !n.is_empty()) {
                let level = (2 + depth).min(MAX_HEADING);
                let heading = tree.create_child(el, &format!("h{level}"), "sec-title")?;
                tree.element_mut(heading)?
                    .set_id(format!("qa-{}", page_name_link(name)));
                let title = fmt.format(name, FmtOpt::at(block.pos));
                tree.add_html(heading, title)?;
            }
            render_body(block, fmt, tree, el, depth + 1)?;
            el
        }
        BlockKind::Paragraph => {
            let el = tree.create("p", "p");
            for item in &block.items {
                match item {
                    BlockItem::Text(text) => {
                        let html = format_trimmed(fmt, text);
                        tree.add_html(el, html)?;
                    }
                    BlockItem::Child(child) => add_rendered(child, fmt, tree, el, depth)?,
                }
            }
            el
        }
        BlockKind::Code => {
            let el = tree.create("pre", "code");
            let text = strip_escapes(&block.text());
            tree.add_text(el, text.trim_matches('\n').trim_end())?;
            el
        }
        BlockKind::List => {
            let el = tree.create("ul", "list");
            let items = tree.create_collection();
            for entry in entries(block) {
                let li = tree.create("li", "list-item");
                let html = fmt.format(entry.text.trim(), FmtOpt::at(entry.pos));
                tree.add_html(li, html)?;
                if let Some(child) = entry.block {
                    add_rendered(child, fmt, tree, li, depth)?;
                }
                tree.add_child(items, li)?;
            }
            tree.add_child(el, items)?;
            el
        }
        BlockKind::Html => {
            let el = tree.create("div", "html");
            tree.add_html(el, Html::new(strip_escapes(&block.text())))?;
            el
        }
        BlockKind::Map => return Ok(None),
        BlockKind::Unknown => {
            fmt.warn(block.pos, format!("unknown block type '{}'", block.block_type));
            return Ok(None);
        }
    };

    if let Some(name) = &block.name
        && block.kind != BlockKind::Sec
    {
        tree.set_attr(el, "data-name", name)?;
    }
    Ok(Some(el))
}

/// Loose text becomes paragraphs; child blocks are rendered in place.
fn render_body(
    block: &Block,
    fmt: &mut Formatter<'_>,
    tree: &mut ElementTree,
    parent: ElementId,
    depth: usize,
) -> Result<(), ElementError> {
    for item in &block.items {
        match item {
            BlockItem::Text(text) => {
                for para in paragraphs(text) {
                    let p = tree.create_child(parent, "p", "p")?;
                    let html = format_trimmed(fmt, &para);
                    tree.add_html(p, html)?;
                }
            }
            BlockItem::Child(child) => add_rendered(child, fmt, tree, parent, depth)?,
        }
    }
    Ok(())
}

fn add_rendered(
    block: &Block,
    fmt: &mut Formatter<'_>,
    tree: &mut ElementTree,
    parent: ElementId,
    depth: usize,
) -> Result<(), ElementError> {
    if let Some(child) = render_at(block, fmt, tree, depth)? {
        tree.add_child(parent, child)?;
    }
    Ok(())
}

/// Formats text with surrounding whitespace removed, keeping the position
/// of the first character accurate.
fn format_trimmed(fmt: &mut Formatter<'_>, text: &PosContent) -> Html {
    let trimmed = text.content.trim_start();
    let skipped = &text.content[..text.content.len() - trimmed.len()];
    let mut pos = text.pos;
    for ch in skipped.chars() {
        if ch == '\n' {
            pos.line += 1;
            pos.column = 1;
        } else {
            pos.column += 1;
        }
    }
    fmt.format(trimmed.trim_end(), FmtOpt::at(pos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::page::Page;
    use crate::parsing::catch::CatchTree;
    use crate::parsing::parser::Parser;
    use pretty_assertions::assert_eq;

    fn render_src(src: &str) -> (String, Vec<String>) {
        let mut parser = Parser::new();
        for line in src.lines() {
            parser.parse_line(line).unwrap();
        }
        let catches = parser.finish().unwrap();
        let main = Block::parse(&catches, CatchTree::MAIN).unwrap();

        let page = Page::from_source("");
        let mut fmt = Formatter::new(&page);
        let mut tree = ElementTree::new();
        let root = render(&main, &mut fmt, &mut tree).unwrap().unwrap();
        let html = tree.generate(root).unwrap().into_string();
        let warnings = fmt.into_warnings().into_iter().map(|w| w.message).collect();
        (html, warnings)
    }

    #[test]
    fn loose_text_becomes_paragraphs() {
        let (html, _) = render_src("Hello [b]there[/b]\n\nSecond");
        assert_eq!(
            html,
            r#"<div class="q-main"><p class="q-p">Hello <span style="font-weight: bold;">there</span></p><p class="q-p">Second</p></div>"#
        );
    }

    #[test]
    fn sections_nest_headings() {
        let (html, _) = render_src("sec [Top] {\n  sec [Inner] {\n    x\n  }\n}");
        insta::assert_snapshot!(
            html,
            @r#"<div class="q-main"><div class="q-sec"><h2 class="q-sec-title" id="qa-Top">Top</h2><div class="q-sec"><h3 class="q-sec-title" id="qa-Inner">Inner</h3><p class="q-p">x</p></div></div></div>"#
        );
    }

    #[test]
    fn code_is_escaped_not_formatted() {
        let (html, _) = render_src("code {\n[b]<x>\\}\n}");
        assert_eq!(
            html,
            r#"<div class="q-main"><pre class="q-code">[b]&lt;x&gt;}</pre></div>"#
        );
    }

    #[test]
    fn list_items_use_a_collection() {
        let (html, _) = render_src("list {\n  one;\n  [i]two[/i];\n}");
        assert_eq!(
            html,
            r#"<div class="q-main"><ul class="q-list"><li class="q-list-item">one</li><li class="q-list-item"><span style="font-style: italic;">two</span></li></ul></div>"#
        );
    }

    #[test]
    fn html_passes_through() {
        let (html, _) = render_src("html { <hr /> }");
        assert_eq!(
            html,
            r#"<div class="q-main"><div class="q-html"> <hr /> </div></div>"#
        );
    }

    #[test]
    fn unknown_block_warns_and_renders_nothing() {
        let (html, warnings) = render_src("a\nmystery { b }\nc");
        assert_eq!(
            html,
            r#"<div class="q-main"><p class="q-p">a</p><p class="q-p">c</p></div>"#
        );
        assert_eq!(warnings, vec!["unknown block type 'mystery'".to_string()]);
    }

    #[test]
    fn standalone_map_renders_nothing() {
        let (html, warnings) = render_src("map { a: b; }");
        assert_eq!(html, r#"<div class="q-main"></div>"#);
        assert!(warnings.is_empty());
    }
}
