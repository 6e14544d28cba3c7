use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::PageError;
use crate::models::page::Page;
use crate::models::variables::{Value, VariableScope};
use crate::parsing::link::LinkState;

/// A link handler may invalidate a link or rewrite its target, tooltip and
/// default display text.
pub type LinkHandler = Arc<dyn Fn(&Page, &mut LinkState) + Send + Sync>;

/// Options a page is compiled with. Pages may override them with variables
/// (see [`inject_page_opt`]).
#[derive(Debug, Clone)]
pub struct PageOpt {
    pub page: PageFeatures,
    pub dir: DirOpt,
    pub root: RootOpt,
    pub image: ImageOpt,
    pub category: CategoryOpt,
    pub search: SearchOpt,
    pub link: LinkOpt,
    /// Registered external wikis by identifier (`wp` in `[[wp:Dog]]`).
    pub external: BTreeMap<String, ExternalWiki>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFeatures {
    pub enable_title: bool,
    pub enable_cache: bool,
}

/// Filesystem roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirOpt {
    pub wiki: PathBuf,
    pub page: PathBuf,
    pub image: PathBuf,
    pub model: PathBuf,
    pub cache: PathBuf,
}

/// URL prefixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootOpt {
    pub wiki: String,
    pub image: String,
    pub category: String,
    pub page: String,
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageOpt {
    /// Pixel-density multipliers to generate sized images for.
    pub retina: Vec<u32>,
    /// `server` sizes images on request; anything else leaves it to the client.
    pub size_method: String,
    pub rounding: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryOpt {
    pub per_page: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOpt {
    pub enable: bool,
}

#[derive(Clone, Default)]
pub struct LinkOpt {
    pub parse_internal: Option<LinkHandler>,
    pub parse_category: Option<LinkHandler>,
    /// Replaces the built-in external wiki handler when set.
    pub parse_external: Option<LinkHandler>,
}

impl fmt::Debug for LinkOpt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkOpt")
            .field("parse_internal", &self.parse_internal.is_some())
            .field("parse_category", &self.parse_category.is_some())
            .field("parse_external", &self.parse_external.is_some())
            .finish()
    }
}

/// How targets on an external wiki are normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExternalType {
    /// Another wiki running this engine: page-name normalization.
    #[serde(alias = "wikifier")]
    Quiki,
    /// Spaces become underscores.
    MediaWiki,
    /// Targets are used as written.
    None,
}

impl ExternalType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quiki" | "wikifier" => Some(ExternalType::Quiki),
            "mediawiki" => Some(ExternalType::MediaWiki),
            "none" | "" => Some(ExternalType::None),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalWiki {
    pub name: String,
    pub root: String,
    #[serde(rename = "type", default = "default_external_type")]
    pub kind: ExternalType,
}

fn default_external_type() -> ExternalType {
    ExternalType::None
}

impl ExternalWiki {
    pub fn new(name: impl Into<String>, root: impl Into<String>, kind: ExternalType) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            kind,
        }
    }
}

impl Default for PageOpt {
    fn default() -> Self {
        let mut external = BTreeMap::new();
        external.insert(
            "wp".to_string(),
            ExternalWiki::new(
                "Wikipedia",
                "https://en.wikipedia.org/wiki",
                ExternalType::MediaWiki,
            ),
        );
        Self {
            page: PageFeatures {
                enable_title: true,
                enable_cache: true,
            },
            dir: DirOpt {
                wiki: PathBuf::new(),
                page: PathBuf::from("pages"),
                image: PathBuf::from("images"),
                model: PathBuf::from("models"),
                cache: PathBuf::from("cache"),
            },
            root: RootOpt {
                wiki: String::new(),
                image: "/images".to_string(),
                category: "/topic".to_string(),
                page: "/page".to_string(),
                file: String::new(),
            },
            image: ImageOpt {
                retina: vec![2, 3],
                size_method: "server".to_string(),
                rounding: "normal".to_string(),
            },
            category: CategoryOpt { per_page: 5 },
            search: SearchOpt { enable: true },
            link: LinkOpt::default(),
            external,
        }
    }
}

/// Copies option overrides set as page variables into `opt`.
///
/// Only variables that are present are applied; a present variable of the
/// wrong type is an error.
pub fn inject_page_opt(vars: &VariableScope, opt: &mut PageOpt) -> Result<(), PageError> {
    let dirs: [(&str, &mut PathBuf); 5] = [
        ("dir.wiki", &mut opt.dir.wiki),
        ("dir.page", &mut opt.dir.page),
        ("dir.image", &mut opt.dir.image),
        ("dir.model", &mut opt.dir.model),
        ("dir.cache", &mut opt.dir.cache),
    ];
    for (key, dir) in dirs {
        if let Some(s) = text_opt(vars, key)? {
            *dir = PathBuf::from(s);
        }
    }

    let roots: [(&str, &mut String); 5] = [
        ("root.wiki", &mut opt.root.wiki),
        ("root.image", &mut opt.root.image),
        ("root.category", &mut opt.root.category),
        ("root.page", &mut opt.root.page),
        ("root.file", &mut opt.root.file),
    ];
    for (key, root) in roots {
        if let Some(s) = text_opt(vars, key)? {
            *root = s;
        }
    }

    if let Some(s) = text_opt(vars, "image.size_method")? {
        opt.image.size_method = s;
    }
    if let Some(s) = text_opt(vars, "image.rounding")? {
        opt.image.rounding = s;
    }
    if let Some(retina) = retina_opt(vars)? {
        opt.image.retina = retina;
    }

    if let Some(s) = text_opt(vars, "category.per_page")? {
        opt.category.per_page = s.trim().parse().map_err(|_| PageError::OptionType {
            key: "category.per_page".to_string(),
            expected: "integer",
        })?;
    }

    let flags: [(&str, &mut bool); 3] = [
        ("search.enable", &mut opt.search.enable),
        ("page.enable.title", &mut opt.page.enable_title),
        ("page.enable.cache", &mut opt.page.enable_cache),
    ];
    for (key, flag) in flags {
        if let Some(b) = bool_opt(vars, key)? {
            *flag = b;
        }
    }

    if let Some(externals) = map_opt(vars, "external")? {
        for (id, value) in externals.iter() {
            let key = format!("external.{id}");
            let Value::Map(ext) = value else {
                return Err(PageError::OptionType {
                    key,
                    expected: "map",
                });
            };
            let name = text_opt(ext, "name")?.unwrap_or_else(|| id.clone());
            let root = text_opt(ext, "root")?.ok_or(PageError::OptionType {
                key: format!("{key}.root"),
                expected: "string",
            })?;
            let kind = match text_opt(ext, "type")? {
                None => ExternalType::None,
                Some(t) => ExternalType::parse(&t).ok_or(PageError::OptionType {
                    key: format!("{key}.type"),
                    expected: "one of quiki, mediawiki, none",
                })?,
            };
            opt.external
                .insert(id.clone(), ExternalWiki::new(name, root, kind));
        }
    }

    Ok(())
}

fn text_opt(vars: &VariableScope, key: &str) -> Result<Option<String>, PageError> {
    match vars.get(key)? {
        None => Ok(None),
        Some(value) => value.as_text().map(Some).ok_or(PageError::OptionType {
            key: key.to_string(),
            expected: "string",
        }),
    }
}

fn bool_opt(vars: &VariableScope, key: &str) -> Result<Option<bool>, PageError> {
    match vars.get(key)? {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => match other.as_text().as_deref().map(str::trim) {
            Some("true" | "yes" | "1") => Ok(Some(true)),
            Some("false" | "no" | "0") => Ok(Some(false)),
            _ => Err(PageError::OptionType {
                key: key.to_string(),
                expected: "boolean",
            }),
        },
    }
}

fn map_opt<'a>(vars: &'a VariableScope, key: &str) -> Result<Option<&'a VariableScope>, PageError> {
    match vars.get(key)? {
        None => Ok(None),
        Some(Value::Map(map)) => Ok(Some(map)),
        Some(_) => Err(PageError::OptionType {
            key: key.to_string(),
            expected: "map",
        }),
    }
}

/// `image.retina` is either a list or a comma-separated string of integers.
fn retina_opt(vars: &VariableScope) -> Result<Option<Vec<u32>>, PageError> {
    let bad = || PageError::OptionType {
        key: "image.retina".to_string(),
        expected: "list of integers",
    };
    let items: Vec<String> = match vars.get("image.retina")? {
        None => return Ok(None),
        Some(Value::List(items)) => items
            .iter()
            .map(|item| item.as_text().ok_or_else(bad))
            .collect::<Result<_, _>>()?,
        Some(other) => other
            .as_text()
            .ok_or_else(bad)?
            .split(',')
            .map(str::to_string)
            .collect(),
    };
    items
        .iter()
        .map(|s| s.trim().parse::<u32>().map_err(|_| bad()))
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}
