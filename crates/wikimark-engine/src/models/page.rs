use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{DateTime, TimeZone, Utc};
use regex::Regex;
use relative_path::RelativePathBuf;
use serde::Serialize;

use crate::elements::{ElementId, ElementTree};
use crate::error::{PageError, Warning};
use crate::html::{Html, unescape};
use crate::models::names::page_name_ne;
use crate::models::options::{PageOpt, inject_page_opt};
use crate::models::variables::{Value, VariableScope};
use crate::parsing::blocks::{self, Block};
use crate::parsing::catch::{CatchTree, Sigil};
use crate::parsing::format::{FmtOpt, Formatter};
use crate::parsing::link::{self, Link};
use crate::parsing::parser::{AssignedValue, Assignment, Parser};
use crate::parsing::position::Position;

fn tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"<[^>]*>").expect("Invalid tag regex"))
}

/// The rendered element tree and its root.
#[derive(Debug, Clone)]
struct Rendered {
    tree: ElementTree,
    root: Option<ElementId>,
}

/// A single page, backed by a `.page` file or by in-memory source.
///
/// [`Page::parse`] scans the source, assigns variables and builds the block
/// tree; [`Page::html`] renders it. Parsing again starts over from the
/// variables seeded with [`Page::set_var`] and the options in effect at the
/// first parse, so a re-parse sees nothing from the previous one.
#[derive(Debug, Clone, Default)]
pub struct Page {
    source: Option<String>,
    file_path: Option<PathBuf>,
    /// Only extract variables; skip building the block tree.
    pub vars_only: bool,
    pub opt: PageOpt,
    vars: VariableScope,
    seeded: VariableScope,
    base_opt: Option<PageOpt>,
    warnings: Vec<Warning>,
    main: Option<Block>,
    rendered: Option<Rendered>,
}

/// Summary of a page's metadata, with empty fields omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageInfo {
    #[serde(
        rename = "mod_unix",
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub modified: Option<DateTime<Utc>>,
    #[serde(
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub draft: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub generated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fmt_title: Option<Html>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl Page {
    /// A page read from `path` when parsed.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: Some(path.into()),
            ..Default::default()
        }
    }

    /// A page compiled from in-memory source.
    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            ..Default::default()
        }
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn set_source(&mut self, source: Option<String>) {
        self.source = source;
    }

    pub fn set_file_path(&mut self, path: Option<PathBuf>) {
        self.file_path = path;
    }

    pub fn vars(&self) -> &VariableScope {
        &self.vars
    }

    /// Sets a variable, e.g. to seed `dir.wiki` before parsing a config.
    pub fn set_var(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        self.seeded.set(name, value.clone());
        self.vars.set(name, value);
    }

    /// Warnings from the last parse and render.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn main_block(&self) -> Option<&Block> {
        self.main.as_ref()
    }

    pub fn is_parsed(&self) -> bool {
        self.main.is_some()
    }

    /// Parses the page source.
    ///
    /// Variables set with [`Page::set_var`] are kept; state from any
    /// previous parse is discarded. On error the page is left unparsed,
    /// holding only the seeded variables.
    pub fn parse(&mut self) -> Result<(), PageError> {
        self.reset_parse_state();
        let result = self.parse_source();
        if result.is_err() {
            self.reset_parse_state();
        }
        result
    }

    fn parse_source(&mut self) -> Result<(), PageError> {
        let mut parser = Parser::new();

        if let Some(source) = self.source.clone() {
            log::debug!("parsing page source ({} bytes)", source.len());
            self.scan(&mut parser, source.as_bytes())?;
        } else if let Some(path) = self.file_path.clone() {
            log::debug!("parsing {}", path.display());
            let file = File::open(&path).map_err(|source| PageError::Open { path, source })?;
            self.scan(&mut parser, BufReader::new(file))?;
        } else {
            return Err(PageError::NoSource);
        }

        let catches = parser.finish()?;
        let main = Block::parse(&catches, CatchTree::MAIN);
        if self.vars_only {
            log::debug!("{}: variables only, block tree skipped", self.log_name());
        } else {
            self.main = main;
        }

        inject_page_opt(&self.vars, &mut self.opt)
    }

    fn reset_parse_state(&mut self) {
        let base = self.base_opt.get_or_insert_with(|| self.opt.clone());
        self.opt = base.clone();
        self.vars = self.seeded.clone();
        self.warnings.clear();
        self.main = None;
        self.rendered = None;
    }

    fn scan(&mut self, parser: &mut Parser, reader: impl BufRead) -> Result<(), PageError> {
        for line in reader.lines() {
            parser.parse_line(&line?)?;
            for assignment in parser.take_assignments() {
                self.assign(assignment, parser.tree());
            }
        }
        Ok(())
    }

    fn assign(&mut self, assignment: Assignment, catches: &CatchTree) {
        let mut fmt = Formatter::new(self);
        let value = match assignment.value {
            AssignedValue::Flag => Some(Value::Bool(true)),
            AssignedValue::Text(text) => match assignment.sigil {
                Sigil::Percent => Some(Value::Str(text.content.trim().to_string())),
                Sigil::At => Some(Value::Html(format_value(&mut fmt, &text.content, text.pos))),
            },
            AssignedValue::Block(id) => {
                Block::parse(catches, id).and_then(|block| blocks::block_value(&block, &mut fmt))
            }
        };
        let warnings = fmt.into_warnings();

        self.warnings.extend(warnings);
        if let Some(value) = value {
            self.vars.set(&assignment.name, value);
        }
    }

    /// Renders the page. Empty until [`Page::parse`] has built a block tree.
    ///
    /// The first call renders; later calls return the HTML cached in the
    /// element tree.
    pub fn html(&mut self) -> Html {
        if self.rendered.is_none() {
            let Some(main) = &self.main else {
                return Html::default();
            };
            let mut fmt = Formatter::new(self);
            let mut tree = ElementTree::new();
            let root = match blocks::render(main, &mut fmt, &mut tree) {
                Ok(root) => root,
                Err(err) => {
                    log::error!("{}: {err}", self.log_name());
                    None
                }
            };
            let warnings = fmt.into_warnings();
            self.warnings.extend(warnings);
            self.rendered = Some(Rendered { tree, root });
        }

        let Some(Rendered {
            tree,
            root: Some(root),
        }) = &mut self.rendered
        else {
            return Html::default();
        };
        match tree.generate(*root) {
            Ok(html) => html,
            Err(err) => {
                log::error!("failed to generate HTML: {err}");
                Html::default()
            }
        }
    }

    /// Formats text in the context of this page.
    pub fn format_text(&mut self, text: &str) -> Html {
        let mut fmt = Formatter::new(self);
        let html = fmt.format_text(text);
        let warnings = fmt.into_warnings();
        self.warnings.extend(warnings);
        html
    }

    /// Resolves link text (the inside of `[[ ... ]]`) in the context of this page.
    pub fn parse_link(&self, text: &str) -> Link {
        link::parse_link(&mut Formatter::new(self), text, FmtOpt::default())
    }

    /// True if the page has source or its file exists.
    pub fn exists(&self) -> bool {
        self.source.is_some() || self.file_path.as_ref().is_some_and(|p| p.exists())
    }

    /// The page directory, resolved against `dir.wiki`.
    pub fn page_dir(&self) -> PathBuf {
        self.opt.dir.wiki.join(&self.opt.dir.page)
    }

    fn cache_dir(&self) -> PathBuf {
        self.opt.dir.wiki.join(&self.opt.dir.cache)
    }

    /// The file path as given. May be relative and need not exist.
    pub fn rel_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// The absolute file path, without resolving symbolic links.
    pub fn path(&self) -> Option<PathBuf> {
        self.file_path
            .as_deref()
            .and_then(|p| std::path::absolute(p).ok())
    }

    /// The unresolved page name: the file path relative to the page
    /// directory, or the file name if the page lives elsewhere.
    pub fn rel_name(&self) -> String {
        let Some(path) = self.path() else {
            return String::new();
        };
        std::path::absolute(self.page_dir())
            .ok()
            .and_then(|dir| relative_name(&path, &dir))
            .unwrap_or_else(|| file_name(&path))
    }

    pub fn rel_name_ne(&self) -> String {
        page_name_ne(&self.rel_name())
    }

    /// The page name, following a symbolic link to the page it points at.
    pub fn name(&self) -> String {
        if self.is_symlink()
            && let Some(real) = self.file_path.as_deref().and_then(|p| fs::canonicalize(p).ok())
        {
            return fs::canonicalize(self.page_dir())
                .ok()
                .and_then(|dir| relative_name(&real, &dir))
                .unwrap_or_else(|| file_name(&real));
        }
        self.rel_name()
    }

    pub fn name_ne(&self) -> String {
        page_name_ne(&self.name())
    }

    /// The directory part of the page name: `a` for `a/b.page`, empty for `b.page`.
    pub fn prefix(&self) -> String {
        let name = self.name();
        name.rsplit_once('/')
            .map(|(dir, _)| dir.to_string())
            .unwrap_or_default()
    }

    /// True if the page file is a symbolic link inside the page directory.
    /// Links that live elsewhere are treated as normal pages.
    pub fn is_symlink(&self) -> bool {
        let (Some(path), Ok(dir)) = (self.path(), std::path::absolute(self.page_dir())) else {
            return false;
        };
        path.starts_with(&dir)
            && fs::symlink_metadata(&path).is_ok_and(|meta| meta.file_type().is_symlink())
    }

    /// Where the page redirects to, if anywhere: a symlinked page redirects
    /// to the page it points at, otherwise `@page.redirect` is resolved as a
    /// link.
    pub fn redirect(&self) -> Option<String> {
        if self.is_symlink() {
            return Some(format!("{}/{}", self.opt.root.page, self.name_ne()));
        }

        let target = match self.vars.get_str("page.redirect") {
            Ok(target) => target?,
            Err(err) => {
                log::warn!("{}: {err}", self.log_name());
                return None;
            }
        };
        let link = self.parse_link(&target);
        link.ok.then_some(link.target)
    }

    pub fn cache_path(&self) -> PathBuf {
        self.cache_file("cache")
    }

    pub fn search_path(&self) -> PathBuf {
        self.cache_file("txt")
    }

    fn cache_file(&self, ext: &str) -> PathBuf {
        let path = self
            .cache_dir()
            .join("page")
            .join(format!("{}.{ext}", self.name()));
        std::path::absolute(&path).unwrap_or(path)
    }

    pub fn cache_modified(&self) -> Option<DateTime<Utc>> {
        modified_time(&self.cache_path())
    }

    pub fn draft(&self) -> bool {
        self.flag("page.draft")
    }

    /// True if the page was generated from other source content.
    pub fn generated(&self) -> bool {
        self.flag("page.generated")
    }

    fn flag(&self, name: &str) -> bool {
        self.vars.get_bool(name).unwrap_or_else(|err| {
            log::warn!("{}: {err}", self.log_name());
            false
        })
    }

    pub fn author(&self) -> Option<String> {
        self.vars.get_str("page.author").ok().flatten()
    }

    /// The title with its formatting preserved.
    pub fn fmt_title(&self) -> Html {
        match self.vars.get("page.title") {
            Ok(Some(Value::Html(html))) => html.clone(),
            Ok(Some(Value::Str(text))) => {
                let opt = FmtOpt {
                    no_warnings: true,
                    ..Default::default()
                };
                Formatter::new(self).format(text, opt)
            }
            _ => Html::default(),
        }
    }

    /// The title with formatting tags stripped.
    pub fn title(&self) -> String {
        let title = self.fmt_title();
        unescape(&tag_regex().replace_all(title.as_str(), ""))
    }

    pub fn title_or_name(&self) -> String {
        let title = self.title();
        if title.is_empty() { self.name() } else { title }
    }

    /// `@page.created`, as Unix seconds or an HTTP date.
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.time_var("page.created")
    }

    /// The file's modification time.
    pub fn modified(&self) -> Option<DateTime<Utc>> {
        self.path().and_then(|p| modified_time(&p))
    }

    fn time_var(&self, name: &str) -> Option<DateTime<Utc>> {
        let text = self.vars.get_str(name).ok().flatten()?;
        let parsed = parse_time(text.trim());
        if parsed.is_none() {
            log::warn!("{}: @{name}: unrecognized time '{text}'", self.log_name());
        }
        parsed
    }

    pub fn info(&self) -> PageInfo {
        let fmt_title = self.fmt_title();
        let title = self.title();
        PageInfo {
            modified: self.modified(),
            created: self.created(),
            draft: self.draft(),
            generated: self.generated(),
            redirect: self.redirect(),
            fmt_title: (!fmt_title.is_empty()).then_some(fmt_title),
            title: (!title.is_empty()).then_some(title),
            author: self.author().filter(|a| !a.is_empty()),
        }
    }

    /// A name for log messages.
    pub(crate) fn log_name(&self) -> String {
        match &self.file_path {
            Some(path) => path.display().to_string(),
            None => "(source)".to_string(),
        }
    }
}

/// Formats an `@name: value;` value, skipping leading whitespace so the
/// position stays accurate.
fn format_value(fmt: &mut Formatter<'_>, text: &str, pos: Position) -> Html {
    let trimmed = text.trim_start();
    let mut pos = pos;
    for ch in text[..text.len() - trimmed.len()].chars() {
        if ch == '\n' {
            pos = Position::new(pos.line + 1, 1);
        } else {
            pos.column += 1;
        }
    }
    fmt.format(trimmed.trim_end(), FmtOpt::at(pos))
}

fn relative_name(path: &Path, dir: &Path) -> Option<String> {
    let rel = path.strip_prefix(dir).ok()?;
    RelativePathBuf::from_path(rel).ok().map(RelativePathBuf::into_string)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn modified_time(path: &Path) -> Option<DateTime<Utc>> {
    let modified = fs::symlink_metadata(path).ok()?.modified().ok()?;
    Some(DateTime::<Utc>::from(modified))
}

/// Unix seconds or an RFC 2822 (HTTP) date.
fn parse_time(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(secs) = text.parse::<i64>() {
        return Utc.timestamp_opt(secs, 0).single();
    }
    DateTime::parse_from_rfc2822(text)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{create_test_file, create_test_wiki_dir};
    use pretty_assertions::assert_eq;

    fn parsed(src: &str) -> Page {
        let mut page = Page::from_source(src);
        page.parse().unwrap();
        page
    }

    #[test]
    fn parse_without_source_or_path_fails() {
        let err = Page::default().parse().unwrap_err();
        assert!(matches!(err, PageError::NoSource));
        assert!(err.is_configuration());
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let err = Page::new("/no/such/dir/x.page").parse().unwrap_err();
        assert!(matches!(err, PageError::Open { .. }));
    }

    #[test]
    fn html_before_parse_is_empty() {
        assert!(Page::from_source("hi").html().is_empty());
    }

    #[test]
    fn variables_by_sigil() {
        let page = parsed("@a: [b]x[/b];\n%b: [b]x[/b];\n@c;\n@d.e: y;");
        assert_eq!(
            page.vars().get("a").unwrap(),
            Some(&Value::Html(Html::from(r#"<span style="font-weight: bold;">x</span>"#)))
        );
        assert_eq!(page.vars().get("b").unwrap(), Some(&Value::from("[b]x[/b]")));
        assert_eq!(page.vars().get("c").unwrap(), Some(&Value::Bool(true)));
        assert_eq!(page.vars().get_str("d.e").unwrap().as_deref(), Some("y"));
    }

    #[test]
    fn later_variables_see_earlier_ones() {
        let page = parsed("@name: World;\n@greeting: Hello [@name];");
        assert_eq!(page.vars().get_str("greeting").unwrap().as_deref(), Some("Hello World"));
    }

    #[test]
    fn html_is_rendered_once_and_cached() {
        let mut page = parsed("Hello [@who]\n");
        let first = page.html();
        let second = page.html();
        assert_eq!(first, second);
        assert_eq!(
            first.as_str(),
            r#"<div class="q-main"><p class="q-p">Hello (null)</p></div>"#
        );
        // rendered once, so the warning is recorded once
        assert_eq!(page.warnings().len(), 1);
        assert_eq!(page.warnings()[0].pos, Position::new(1, 7));
    }

    #[test]
    fn reparse_discards_previous_state() {
        let mut page = parsed("[@nope]");
        page.html();
        assert_eq!(page.warnings().len(), 1);

        page.set_source(Some("fine".to_string()));
        page.parse().unwrap();
        assert!(page.warnings().is_empty());
        assert_eq!(
            page.html().as_str(),
            r#"<div class="q-main"><p class="q-p">fine</p></div>"#
        );
    }

    #[test]
    fn vars_only_skips_blocks() {
        let mut page = Page::from_source("@x: 1;\nsec { text }");
        page.vars_only = true;
        page.parse().unwrap();
        assert_eq!(page.vars().get_str("x").unwrap().as_deref(), Some("1"));
        assert!(!page.is_parsed());
        assert!(page.html().is_empty());
    }

    #[test]
    fn syntax_errors_abort_parse() {
        let err = Page::from_source("sec {\nnever closed").parse().unwrap_err();
        assert!(matches!(err, PageError::Syntax { pos, .. } if pos == Position::new(1, 5)));
    }

    #[test]
    fn reparse_starts_from_a_clean_scope() {
        let mut page = parsed("@a: [@a]x;");
        assert_eq!(page.vars().get_str("a").unwrap().as_deref(), Some("(null)x"));

        page.parse().unwrap();
        assert_eq!(page.vars().get_str("a").unwrap().as_deref(), Some("(null)x"));
    }

    #[test]
    fn reparse_after_new_source_drops_old_variables_and_options() {
        let mut page = parsed("@page.draft;\n@root.page: /old;");
        assert!(page.draft());
        assert_eq!(page.opt.root.page, "/old");

        page.set_source(Some("fresh".to_string()));
        page.parse().unwrap();

        assert!(!page.draft());
        assert_eq!(page.opt.root.page, "/page");
        assert_eq!(page.vars(), &VariableScope::default());
        assert_eq!(
            page.html().as_str(),
            r#"<div class="q-main"><p class="q-p">fresh</p></div>"#
        );
    }

    #[test]
    fn seeded_variables_survive_reparse() {
        let mut page = Page::from_source("@greeting: Hi [@who];\n@who: Moon;");
        page.set_var("who", "World");

        page.parse().unwrap();
        assert_eq!(page.vars().get_str("greeting").unwrap().as_deref(), Some("Hi World"));
        assert_eq!(page.vars().get_str("who").unwrap().as_deref(), Some("Moon"));

        page.parse().unwrap();
        assert_eq!(page.vars().get_str("greeting").unwrap().as_deref(), Some("Hi World"));
    }

    #[test]
    fn failed_parse_keeps_only_seeded_state() {
        let mut page = Page::from_source("@x: 1;\n@root.page: /x;\nsec {");
        page.set_var("seed", "s");

        assert!(page.parse().is_err());
        assert_eq!(page.vars().get("x").unwrap(), None);
        assert_eq!(page.vars().get_str("seed").unwrap().as_deref(), Some("s"));
        assert_eq!(page.opt.root.page, "/page");
        assert!(!page.is_parsed());
    }

    #[test]
    fn options_are_injected_from_variables() {
        let page = parsed("@root.page: /wiki;\n@category.per_page: 10;");
        assert_eq!(page.opt.root.page, "/wiki");
        assert_eq!(page.opt.category.per_page, 10);
    }

    #[test]
    fn option_type_mismatch_fails_parse() {
        let err = Page::from_source("@category.per_page: many;").parse().unwrap_err();
        assert!(matches!(err, PageError::OptionType { .. }));
    }

    #[test]
    fn title_strips_tags() {
        let page = parsed("@page.title: [b]Hi[/b] & bye;");
        assert_eq!(
            page.fmt_title().as_str(),
            r#"<span style="font-weight: bold;">Hi</span> &amp; bye"#
        );
        assert_eq!(page.title(), "Hi & bye");
    }

    #[test]
    fn title_or_name_falls_back_to_name() {
        let dir = create_test_wiki_dir();
        let path = create_test_file(&dir, "pages/notes/todo.page", "no title here");
        let mut page = Page::new(&path);
        page.opt.dir.wiki = dir.path().to_path_buf();
        page.parse().unwrap();

        assert_eq!(page.title_or_name(), "notes/todo.page");
        assert_eq!(page.name_ne(), "notes/todo");
        assert_eq!(page.prefix(), "notes");
        assert!(page.exists());
    }

    #[test]
    fn page_outside_page_dir_uses_file_name() {
        let dir = create_test_wiki_dir();
        let path = create_test_file(&dir, "elsewhere/loose.page", "x");
        let mut page = Page::new(&path);
        page.opt.dir.wiki = dir.path().to_path_buf();
        assert_eq!(page.rel_name(), "loose.page");
        assert_eq!(page.prefix(), "");
    }

    #[test]
    fn cache_and_search_paths() {
        let dir = create_test_wiki_dir();
        let path = create_test_file(&dir, "pages/a.page", "x");
        let mut page = Page::new(&path);
        page.opt.dir.wiki = dir.path().to_path_buf();
        assert_eq!(page.cache_path(), dir.path().join("cache/page/a.page.cache"));
        assert_eq!(page.search_path(), dir.path().join("cache/page/a.page.txt"));
        assert_eq!(page.cache_modified(), None);
    }

    #[test]
    fn created_accepts_unix_and_http_dates() {
        let page = parsed("@page.created: 1700000000;");
        assert_eq!(page.created().map(|t| t.timestamp()), Some(1_700_000_000));

        let page = parsed("@page.created: Tue, 14 Nov 2023 22:13:20 GMT;");
        assert_eq!(page.created().map(|t| t.timestamp()), Some(1_700_000_000));

        let page = parsed("@page.created: someday;");
        assert_eq!(page.created(), None);
    }

    #[test]
    fn modified_is_the_file_time() {
        let dir = create_test_wiki_dir();
        let path = create_test_file(&dir, "pages/a.page", "@page.modified: 0;");
        let mut page = Page::new(&path);
        page.parse().unwrap();
        let expected = modified_time(&path);
        assert!(expected.is_some());
        assert_eq!(page.modified(), expected);

        assert_eq!(parsed("@page.modified: 0;").modified(), None);
    }

    #[test]
    fn redirect_variable_is_resolved_as_link() {
        let page = parsed("@page.redirect: Other Page;");
        assert_eq!(page.redirect().as_deref(), Some("/page/Other_Page"));

        let page = parsed("@page.redirect: nowiki:Thing;");
        assert_eq!(page.redirect(), None);
    }

    #[cfg(unix)]
    #[test]
    fn symlink_in_page_dir_redirects() {
        let dir = create_test_wiki_dir();
        let target = create_test_file(&dir, "pages/real.page", "x");
        let link = dir.path().join("pages/alias.page");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let mut page = Page::new(&link);
        page.opt.dir.wiki = dir.path().to_path_buf();
        assert!(page.is_symlink());
        assert_eq!(page.rel_name(), "alias.page");
        assert_eq!(page.name(), "real.page");
        assert_eq!(page.redirect().as_deref(), Some("/page/real"));
    }

    #[test]
    fn flags_and_author() {
        let page = parsed("@page.draft;\n@page.author: Ann;");
        assert!(page.draft());
        assert!(!page.generated());
        assert_eq!(page.author().as_deref(), Some("Ann"));
    }

    #[test]
    fn info_omits_empty_fields() {
        let page = parsed("@page.title: Hi;\n@page.draft;");
        let json = serde_json::to_value(page.info()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "draft": true,
                "fmt_title": "Hi",
                "title": "Hi",
            })
        );
    }
}
