use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use wikimark_engine::models::{category_name, page_name, page_name_link, page_name_ne};
use wikimark_engine::{ExternalWiki, LinkState, Page, PageError, PageOpt};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to load wiki configuration from {conf_path}: {source}")]
    WikiConfError {
        conf_path: PathBuf,
        source: PageError,
    },
}

/// Settings for compiling the pages of one wiki.
///
/// Directory paths may use `~` and `$VAR`. Anything left unset keeps the
/// engine default.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WikiConfig {
    /// Wiki root; `dir.*` options are resolved against it.
    pub wiki_dir: PathBuf,
    /// A wiki `.conf` page whose variables set further options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conf_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_root: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_root: Option<String>,
    /// Mark links to missing pages and categories as invalid.
    pub check_links: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub external: BTreeMap<String, ExternalWiki>,
}

impl WikiConfig {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: WikiConfig =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the loaded paths
        config.wiki_dir = Self::expand_path(&config.wiki_dir).unwrap_or(config.wiki_dir);
        for path in [&mut config.conf_file, &mut config.page_dir, &mut config.cache_dir]
            .into_iter()
            .flatten()
        {
            if let Some(expanded) = Self::expand_path(path) {
                *path = expanded;
            }
        }

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/wikimark");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }

    /// Page options for this wiki, including those set by `conf_file`.
    pub fn to_page_opt(&self) -> Result<PageOpt, ConfigError> {
        let mut opt = if self.check_links {
            default_wiki_opt(&self.wiki_dir)
        } else {
            let mut opt = PageOpt::default();
            opt.dir.wiki = self.wiki_dir.clone();
            opt
        };

        if let Some(dir) = &self.page_dir {
            opt.dir.page = dir.clone();
        }
        if let Some(dir) = &self.cache_dir {
            opt.dir.cache = dir.clone();
        }
        if let Some(root) = &self.page_root {
            opt.root.page = root.clone();
        }
        if let Some(root) = &self.category_root {
            opt.root.category = root.clone();
        }
        opt.external
            .extend(self.external.iter().map(|(id, ext)| (id.clone(), ext.clone())));

        if let Some(conf) = &self.conf_file {
            load_conf_file(&self.wiki_dir.join(conf), &mut opt)?;
        }
        Ok(opt)
    }
}

/// Default options for the wiki at `wiki_dir`, with link handlers that check
/// pages and categories exist.
pub fn default_wiki_opt(wiki_dir: &Path) -> PageOpt {
    let mut opt = PageOpt::default();
    opt.dir.wiki = wiki_dir.to_path_buf();
    opt.link.parse_internal = Some(Arc::new(link_page_exists));
    opt.link.parse_category = Some(Arc::new(link_category_exists));
    opt
}

/// Internal links are valid if `<dir.page>/<name>.page` exists.
pub fn link_page_exists(page: &Page, state: &mut LinkState) {
    let name = page_name(&page_name_link(&page_name_ne(&state.display_default)));
    if !page.page_dir().join(&name).exists() {
        state.invalidate(format!("page '{name}' does not exist"));
    }
}

/// Category links are valid if `<dir.cache>/category/<name>.cat` exists.
pub fn link_category_exists(page: &Page, state: &mut LinkState) {
    let name = category_name(&state.display_default);
    let path = page
        .opt
        .dir
        .wiki
        .join(&page.opt.dir.cache)
        .join("category")
        .join(&name);
    if !path.exists() {
        state.invalidate(format!("category '{name}' does not exist"));
    }
}

/// Loads a wiki `.conf` page and applies its variables to `opt`.
///
/// The page is parsed for variables only, with `dir.wiki` seeded from
/// `opt` so the file can refer to it. Returns the parsed page for access to
/// the remaining variables.
pub fn load_conf_file(path: &Path, opt: &mut PageOpt) -> Result<Page, ConfigError> {
    let mut page = Page::new(path);
    page.vars_only = true;
    page.opt = opt.clone();
    page.set_var("dir.wiki", opt.dir.wiki.to_string_lossy().into_owned());

    page.parse().map_err(|source| ConfigError::WikiConfError {
        conf_path: path.to_path_buf(),
        source,
    })?;

    *opt = page.opt.clone();
    log::debug!("loaded wiki configuration from {}", path.display());
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::env;
    use tempfile::TempDir;
    use wikimark_engine::{ExternalType, LinkType};

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_config_path() {
        let config_path = WikiConfig::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/wikimark/config.toml"));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let result = WikiConfig::load_from_path(temp_dir.path().join("nope.toml")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_invalid_toml_is_a_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = write(&temp_dir, "config.toml", "wiki_dir = [");
        let result = WikiConfig::load_from_path(&path);
        assert!(matches!(result, Err(ConfigError::ConfigParseError { .. })));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested/config.toml");
        let mut config = WikiConfig {
            wiki_dir: PathBuf::from("/srv/wiki"),
            page_root: Some("/w".to_string()),
            check_links: true,
            ..Default::default()
        };
        config.external.insert(
            "mw".to_string(),
            ExternalWiki::new("MediaWiki", "https://www.mediawiki.org/wiki", ExternalType::MediaWiki),
        );

        config.save_to_path(&config_file).unwrap();
        let loaded = WikiConfig::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_with_env_var_in_toml() {
        unsafe {
            env::set_var("WIKIMARK_TEST_ROOT", "/custom/wiki");
        }

        let temp_dir = TempDir::new().unwrap();
        let path = write(&temp_dir, "config.toml", "wiki_dir = \"$WIKIMARK_TEST_ROOT/main\"\n");
        let config = WikiConfig::load_from_path(&path).unwrap().unwrap();

        assert_eq!(config.wiki_dir, PathBuf::from("/custom/wiki/main"));

        unsafe {
            env::remove_var("WIKIMARK_TEST_ROOT");
        }
    }

    #[test]
    fn test_config_with_tilde_in_toml() {
        let config: WikiConfig = toml::from_str("wiki_dir = \"~/wiki\"").unwrap();
        let expanded = WikiConfig::expand_path(&config.wiki_dir).unwrap();
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().ends_with("wiki"));
    }

    #[test]
    fn test_to_page_opt_applies_overrides() {
        let config = WikiConfig {
            wiki_dir: PathBuf::from("/srv/wiki"),
            page_dir: Some(PathBuf::from("src")),
            category_root: Some("/cat".to_string()),
            ..Default::default()
        };
        let opt = config.to_page_opt().unwrap();

        assert_eq!(opt.dir.wiki, PathBuf::from("/srv/wiki"));
        assert_eq!(opt.dir.page, PathBuf::from("src"));
        assert_eq!(opt.dir.cache, PathBuf::from("cache"));
        assert_eq!(opt.root.category, "/cat");
        assert_eq!(opt.root.page, "/page");
        assert!(opt.link.parse_internal.is_none());
        assert!(opt.external.contains_key("wp"));
    }

    #[test]
    fn test_conf_file_sets_options() {
        let wiki = TempDir::new().unwrap();
        write(
            &wiki,
            "wiki.conf",
            "@name: My Wiki;\n@root.page: /w;\n@category.per_page: 20;\n\
             @external.mw: map {\n  name: MediaWiki;\n  root: https://www.mediawiki.org/wiki;\n  type: mediawiki;\n};\n",
        );
        let config = WikiConfig {
            wiki_dir: wiki.path().to_path_buf(),
            conf_file: Some(PathBuf::from("wiki.conf")),
            ..Default::default()
        };

        let opt = config.to_page_opt().unwrap();

        assert_eq!(opt.dir.wiki, wiki.path());
        assert_eq!(opt.root.page, "/w");
        assert_eq!(opt.category.per_page, 20);
        assert_eq!(
            opt.external.get("mw"),
            Some(&ExternalWiki::new(
                "MediaWiki",
                "https://www.mediawiki.org/wiki",
                ExternalType::MediaWiki
            ))
        );
    }

    #[test]
    fn test_load_conf_file_exposes_variables() {
        let wiki = TempDir::new().unwrap();
        let path = write(&wiki, "wiki.conf", "@name: My Wiki;\n@logo: [b]x[/b];\n");
        let mut opt = PageOpt::default();
        opt.dir.wiki = wiki.path().to_path_buf();

        let page = load_conf_file(&path, &mut opt).unwrap();

        assert_eq!(page.vars().get_str("name").unwrap().as_deref(), Some("My Wiki"));
        assert_eq!(
            page.vars().get_str("dir.wiki").unwrap(),
            Some(wiki.path().to_string_lossy().into_owned())
        );
        assert_eq!(opt.dir.wiki, wiki.path());
    }

    #[test]
    fn test_bad_conf_file_is_an_error() {
        let wiki = TempDir::new().unwrap();
        let path = write(&wiki, "wiki.conf", "@category.per_page: lots;\n");
        let mut opt = PageOpt::default();

        let result = load_conf_file(&path, &mut opt);

        assert!(matches!(
            result,
            Err(ConfigError::WikiConfError {
                source: PageError::OptionType { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_link_handlers_check_existence() {
        let wiki = TempDir::new().unwrap();
        write(&wiki, "pages/Real_Page.page", "hi");
        write(&wiki, "cache/category/Cats.cat", "{}");

        let mut page = Page::from_source("");
        page.opt = default_wiki_opt(wiki.path());

        let link = page.parse_link("Real Page");
        assert_eq!(link.link_type, LinkType::Internal);
        assert!(link.ok);
        assert_eq!(link.target, "/page/Real_Page");

        let link = page.parse_link("Missing Page");
        assert!(!link.ok);
        assert_eq!(
            link.warning.as_deref(),
            Some("page 'Missing_Page.page' does not exist")
        );

        assert!(page.parse_link("~Cats").ok);
        assert!(!page.parse_link("~Dogs").ok);
    }
}
