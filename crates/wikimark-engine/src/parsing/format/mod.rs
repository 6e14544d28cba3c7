//! # Inline Formatting
//!
//! Turns one text run into HTML, expanding bracketed format codes in place:
//! `[b]bold[/b]`, `[@var]`, `[[Page|text]]`, `[red]`, `[&amp]` and so on.
//!
//! ## Scan
//!
//! A single left-to-right pass tracks the bracket depth. Only the outermost
//! `[` ... `]` pair is dispatched; nested brackets stay in the format code
//! verbatim, which is how `[[Page]]` reaches the link resolver as `[Page]`.
//! A backslash escapes the next character; outside a format code the
//! backslash itself is dropped. An unterminated format code at the end of
//! input is discarded.
//!
//! ## Dispatch
//!
//! First match wins: static spans, variables, entities, legacy links
//! (`[!x!]`, `[~x~]`, `[$x$]`), links, colour names, hex colours. Anything
//! else renders as nothing.
//!
//! Plain text is escaped exactly once when it is flushed; dispatched codes
//! produce [`Html`] that is inserted verbatim.

mod tables;

use std::sync::OnceLock;

use regex::Regex;

use crate::error::Warning;
use crate::html::{Html, escape};
use crate::models::page::Page;
use crate::models::variables::Value;
use crate::parsing::link::{self, Link};
use crate::parsing::position::Position;

fn variable_regex() -> &'static Regex {
    static VARIABLE: OnceLock<Regex> = OnceLock::new();
    VARIABLE.get_or_init(|| Regex::new(r"^([@%])([\w.]+)$").expect("Invalid variable regex"))
}

fn color_regex() -> &'static Regex {
    static COLOR: OnceLock<Regex> = OnceLock::new();
    COLOR.get_or_init(|| Regex::new(r"(?i)^#[\da-f]+$").expect("Invalid colour regex"))
}

fn legacy_link_regex() -> &'static Regex {
    static LEGACY: OnceLock<Regex> = OnceLock::new();
    LEGACY.get_or_init(|| Regex::new(r"^([!$~]+?)(.+)([!$~]+?)$").expect("Invalid link regex"))
}

/// Per-call formatting options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FmtOpt {
    /// Insert plain text without entity escaping.
    pub no_entities: bool,
    /// Leave `[@var]` and `[%var]` uninterpreted.
    pub no_variables: bool,
    /// Do not record warnings for undefined variables.
    pub no_warnings: bool,
    /// Source position of the first character, if known.
    pub pos: Position,
}

impl FmtOpt {
    pub fn at(pos: Position) -> Self {
        Self {
            pos,
            ..Default::default()
        }
    }
}

/// Formats text in the context of one page, collecting warnings.
pub struct Formatter<'p> {
    page: &'p Page,
    warnings: Vec<Warning>,
}

impl<'p> Formatter<'p> {
    pub fn new(page: &'p Page) -> Self {
        Self {
            page,
            warnings: Vec::new(),
        }
    }

    pub fn page(&self) -> &'p Page {
        self.page
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }

    /// Records a warning and logs it.
    pub fn warn(&mut self, pos: Position, message: impl Into<String>) {
        let warning = Warning::new(pos, message);
        log::warn!("{}: {warning}", self.page.log_name());
        self.warnings.push(warning);
    }

    /// Formats with default options.
    pub fn format_text(&mut self, text: &str) -> Html {
        self.format(text, FmtOpt::default())
    }

    pub fn format(&mut self, text: &str, opt: FmtOpt) -> Html {
        let mut out = Html::default();
        if text.is_empty() {
            return out;
        }

        let positioned = !opt.pos.is_none();
        let mut pos = opt.pos;
        let mut start_pos = Position::default();
        let mut literal = String::new();
        let mut format_type = String::new();
        let mut depth = 0usize;
        let mut escaped = false;

        for ch in text.chars() {
            let here = if positioned { pos } else { Position::default() };
            if ch == '\n' {
                pos = Position::new(pos.line + 1, 1);
            } else {
                pos.column += 1;
            }

            if ch == '[' && !escaped {
                depth += 1;
                if depth == 1 {
                    start_pos = here;
                    format_type.clear();
                    flush(&mut out, &mut literal, opt);
                    continue;
                }
            } else if ch == ']' && !escaped && depth != 0 {
                depth -= 1;
                if depth == 0 {
                    let html = self.parse_format_type(&format_type, opt, start_pos);
                    out.push_html(&html);
                    continue;
                }
            }

            escaped = ch == '\\' && !escaped;
            if escaped && depth == 0 {
                continue;
            }

            if depth == 0 {
                literal.push(ch);
            } else {
                format_type.push(ch);
            }
        }

        if depth != 0 {
            log::debug!("unterminated format code at {start_pos} dropped");
        }
        flush(&mut out, &mut literal, opt);
        out
    }

    fn parse_format_type(&mut self, format_type: &str, opt: FmtOpt, pos: Position) -> Html {
        if format_type.is_empty() {
            return Html::default();
        }

        if let Some(html) = tables::static_format(&format_type.to_lowercase()) {
            return Html::from(html);
        }

        if !opt.no_variables
            && let Some(caps) = variable_regex().captures(format_type)
        {
            return self.interpolate(&caps[1], &caps[2], opt, pos);
        }

        if let Some(entity) = format_type.strip_prefix('&') {
            return Html::new(format!("&{};", escape(entity)));
        }

        let mut format_type = format_type.to_string();
        if !format_type.starts_with('[')
            && let Some(rewritten) = rewrite_legacy_link(&format_type)
        {
            format_type = rewritten;
        }

        if format_type.len() >= 2 && format_type.starts_with('[') && format_type.ends_with(']') {
            let text = &format_type[1..format_type.len() - 1];
            if text.trim().is_empty() {
                return Html::default();
            }
            let link = link::parse_link(self, text, opt);
            if !link.ok && !opt.no_warnings {
                let message = link
                    .warning
                    .clone()
                    .unwrap_or_else(|| format!("invalid {} link to '{}'", link.link_type, link.target));
                self.warn(pos, message);
            }
            return anchor(&link);
        }

        if let Some(hex) = tables::color(&format_type.to_lowercase()) {
            return color_span(hex);
        }
        if color_regex().is_match(&format_type) {
            return color_span(&format_type);
        }

        log::debug!("unknown format code [{format_type}] at {pos}");
        Html::default()
    }

    fn interpolate(&mut self, sigil: &str, name: &str, opt: FmtOpt, pos: Position) -> Html {
        let page = self.page;
        let value = match page.vars().get(name) {
            Ok(value) => value,
            Err(err) => {
                self.warn(pos, err.to_string());
                return Html::from("(error)");
            }
        };

        let Some(value) = value else {
            if !opt.no_warnings {
                self.warn(pos, format!("undefined variable {sigil}{name}"));
            }
            return Html::from("(null)");
        };

        if sigil == "%" {
            return match value {
                Value::Str(s) => self.format(
                    s,
                    FmtOpt {
                        no_variables: true,
                        ..Default::default()
                    },
                ),
                other => {
                    self.warn(
                        pos,
                        format!("attempted to interpolate non-string %{name} ({})", other.type_name()),
                    );
                    Html::from("(error)")
                }
            };
        }

        match value {
            Value::Str(s) => Html::escape(s),
            Value::Html(html) => html.clone(),
            other => Html::escape(&other.human_readable()),
        }
    }
}

fn flush(out: &mut Html, literal: &mut String, opt: FmtOpt) {
    if literal.is_empty() {
        return;
    }
    if opt.no_entities {
        out.push_html(&Html::new(std::mem::take(literal)));
    } else {
        out.push_text(literal);
        literal.clear();
    }
}

/// Rewrites `!text|target!`, `~text|target~` and `$text|target$` into the
/// bracketed link form.
fn rewrite_legacy_link(format_type: &str) -> Option<String> {
    let caps = legacy_link_regex().captures(format_type)?;
    let inner = &caps[2];
    let (text, target) = inner.rsplit_once('|').unwrap_or((inner, inner));
    let rewritten = match caps[1].chars().next()? {
        '!' => format!("{text}|wp:{target}"),
        '~' => format!("{text}|~{target}"),
        _ => format!("{text}|{target}"),
    };
    Some(format!("[{rewritten}]"))
}

fn anchor(link: &Link) -> Html {
    let invalid = if link.ok { "" } else { " invalid" };
    let title = if link.tooltip.is_empty() {
        String::new()
    } else {
        format!(r#" title="{}""#, escape(&link.tooltip))
    };
    Html::new(format!(
        r#"<a class="q-link-{}{invalid}" href="{}"{title}>{}</a>"#,
        link.link_type,
        escape(&link.target),
        link.display
    ))
}

fn color_span(color: &str) -> Html {
    Html::new(format!(r#"<span style="color: {};">"#, escape(color)))
}
