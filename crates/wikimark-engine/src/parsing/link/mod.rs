//! # Link Resolution
//!
//! Classifies the text inside `[[ ... ]]` and computes its final target,
//! tooltip and display text.
//!
//! The text is `target` or `display|target`, split on the last `|`. Targets
//! are classified in order:
//!
//! 1. `scheme://...` or `$...`: [`LinkType::Other`]
//! 2. `mailto:...`: [`LinkType::Contact`]
//! 3. a bare email address: [`LinkType::Contact`], target becomes `mailto:`
//! 4. `wiki:page` with a registered or unregistered wiki identifier:
//!    [`LinkType::External`]
//! 5. `~category`: [`LinkType::Category`]
//! 6. anything else: [`LinkType::Internal`]
//!
//! External, category and internal links are then passed to the handler
//! configured in [`LinkOpt`](crate::models::options::LinkOpt), which may
//! invalidate the link or rewrite it.

pub mod external;

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::html::Html;
use crate::models::names::{category_name_ne, page_name_link, page_name_ne};
use crate::models::options::LinkHandler;
use crate::parsing::format::{FmtOpt, Formatter};

fn scheme_regex() -> &'static Regex {
    static SCHEME: OnceLock<Regex> = OnceLock::new();
    SCHEME.get_or_init(|| Regex::new(r"^(\w+://|\$)").expect("Invalid scheme regex"))
}

fn mail_regex() -> &'static Regex {
    static MAIL: OnceLock<Regex> = OnceLock::new();
    MAIL.get_or_init(|| {
        Regex::new(r"(?i)^[A-Z0-9._%+-]+@(?:[A-Z0-9-]+\.)+[A-Z]{2,63}$")
            .expect("Invalid email regex")
    })
}

fn wiki_regex() -> &'static Regex {
    static WIKI: OnceLock<Regex> = OnceLock::new();
    WIKI.get_or_init(|| Regex::new(r"^(\w+):(.*)$").expect("Invalid wiki regex"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Internal,
    Category,
    External,
    Contact,
    Other,
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LinkType::Internal => "internal",
            LinkType::Category => "category",
            LinkType::External => "external",
            LinkType::Contact => "contact",
            LinkType::Other => "other",
        })
    }
}

/// The mutable state a [`LinkHandler`] works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkState {
    pub ok: bool,
    pub target: String,
    pub tooltip: String,
    /// Display text used when the link has no explicit `display|` part.
    pub display_default: String,
    /// Why the link is invalid, reported as a warning.
    pub warning: Option<String>,
}

impl LinkState {
    pub fn new(target: impl Into<String>) -> Self {
        let target = target.into();
        Self {
            ok: true,
            tooltip: target.clone(),
            display_default: target.clone(),
            target,
            warning: None,
        }
    }

    /// Marks the link invalid with a reason.
    pub fn invalidate(&mut self, reason: impl Into<String>) {
        self.ok = false;
        self.warning = Some(reason.into());
    }
}

/// A resolved link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub ok: bool,
    pub target: String,
    pub link_type: LinkType,
    pub tooltip: String,
    pub display: Html,
    #[serde(skip)]
    pub warning: Option<String>,
}

/// Resolves the inside of a `[[ ... ]]` link.
///
/// An explicit display part is formatted with `fmt`, keeping the caller's
/// `no_variables` and `no_warnings`; otherwise the default display text is
/// escaped. Empty text resolves to an empty link.
pub fn parse_link(fmt: &mut Formatter<'_>, text: &str, fmt_opt: FmtOpt) -> Link {
    let page = fmt.page();
    let opt = &page.opt;

    if text.trim().is_empty() {
        return Link {
            ok: true,
            target: String::new(),
            link_type: LinkType::Internal,
            tooltip: String::new(),
            display: Html::default(),
            warning: None,
        };
    }

    let display_opt = FmtOpt {
        no_variables: fmt_opt.no_variables,
        no_warnings: fmt_opt.no_warnings,
        ..Default::default()
    };
    let (display, target) = match text.rsplit_once('|') {
        Some((display, target)) => (Some(fmt.format(display.trim(), display_opt)), target.trim()),
        None => (None, text.trim()),
    };

    let mut state = LinkState::new(target);
    let handler: Option<LinkHandler>;
    let link_type;

    if let Some(scheme) = scheme_regex().find(target) {
        link_type = LinkType::Other;
        state.display_default = target[scheme.end()..].to_string();
        if target.starts_with('$') {
            state.target = state.display_default.clone();
        }
        handler = None;
    } else if let Some(email) = target.strip_prefix("mailto:") {
        link_type = LinkType::Contact;
        state.tooltip = format!("Email {email}");
        state.display_default = email.to_string();
        handler = None;
    } else if mail_regex().is_match(target) {
        link_type = LinkType::Contact;
        state.tooltip = format!("Email {target}");
        state.target = format!("mailto:{target}");
        handler = None;
    } else if let Some(caps) = wiki_regex().captures(target) {
        link_type = LinkType::External;
        // the handler finds the wiki identifier in the tooltip
        state.tooltip = caps[1].trim().to_string();
        state.target = caps[2].trim().to_string();
        state.display_default = state.target.clone();
        handler = Some(
            opt.link
                .parse_external
                .clone()
                .unwrap_or_else(external::default_handler),
        );
    } else if let Some(category) = target.strip_prefix('~') {
        link_type = LinkType::Category;
        let category = category.trim();
        state.tooltip = category.to_string();
        state.display_default = category.to_string();
        state.target = format!("{}/{}", opt.root.category, category_name_ne(category));
        handler = opt.link.parse_category.clone();
    } else {
        link_type = LinkType::Internal;
        state.target = format!("{}/{}", opt.root.page, page_name_link(&page_name_ne(target)));
        handler = opt.link.parse_internal.clone();
    }

    if let Some(handler) = handler {
        handler(page, &mut state);
    }

    Link {
        ok: state.ok,
        target: state.target.trim().to_string(),
        link_type,
        tooltip: state.tooltip.trim().to_string(),
        display: display.unwrap_or_else(|| Html::escape(&state.display_default)),
        warning: state.warning,
    }
}
