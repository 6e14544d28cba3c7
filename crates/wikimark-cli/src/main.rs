use anyhow::{Context, Result};
use clap::Parser;
use relative_path::RelativePathBuf;
use std::path::{Path, PathBuf};
use std::process;
use wikimark_config::WikiConfig;
use wikimark_engine::{Page, PageOpt, io};

#[derive(Parser)]
#[command(name = "wikimark", version, about = "Compile wiki pages to HTML")]
struct Cli {
    /// Page files, or directories to search for `.page` files
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Wiki configuration file (TOML). Defaults to ~/.config/wikimark/config.toml if present
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only extract variables and print them as JSON
    #[arg(long)]
    vars_only: bool,

    /// Print page metadata as JSON instead of HTML
    #[arg(long, conflicts_with = "vars_only")]
    info: bool,

    /// Print formatting and link warnings to stderr
    #[arg(short, long)]
    warnings: bool,

    /// Write one `.html` file per page into this directory instead of stdout
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Html,
    Vars,
    Info,
}

impl Cli {
    fn output(&self) -> Output {
        if self.vars_only {
            Output::Vars
        } else if self.info {
            Output::Info
        } else {
            Output::Html
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let opt = load_page_opt(cli.config.as_deref())?;
    let pages = collect_pages(&cli.paths)?;
    log::info!("compiling {} pages", pages.len());

    let mut failed = 0;
    for path in &pages {
        match compile_page(path, &opt, cli.output()) {
            Ok((page, output)) => {
                if cli.warnings {
                    for warning in page.warnings() {
                        eprintln!("{}: {warning}", path.display());
                    }
                }
                match &cli.out {
                    Some(out_dir) => {
                        let ext = if cli.output() == Output::Html { "html" } else { "json" };
                        let name = RelativePathBuf::from(format!("{}.{ext}", page.name_ne()));
                        io::write_output(&name, out_dir, &output)?;
                    }
                    None => println!("{output}"),
                }
            }
            Err(e) => {
                eprintln!("{}: {e:#}", path.display());
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} pages failed", pages.len());
    }
    Ok(())
}

fn load_page_opt(config: Option<&Path>) -> Result<PageOpt> {
    let loaded = match config {
        Some(path) => Some(
            WikiConfig::load_from_path(path)?
                .with_context(|| format!("config file {} not found", path.display()))?,
        ),
        None => WikiConfig::load()?,
    };

    match loaded {
        Some(config) => {
            log::info!("using wiki at {}", config.wiki_dir.display());
            Ok(config.to_page_opt()?)
        }
        None => Ok(PageOpt::default()),
    }
}

/// Expands directories into the `.page` files under them.
fn collect_pages(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut pages = Vec::new();
    for path in paths {
        if path.is_dir() {
            pages.extend(io::scan_pages(path)?);
        } else {
            pages.push(path.clone());
        }
    }
    Ok(pages)
}

fn compile_page(path: &Path, opt: &PageOpt, output: Output) -> Result<(Page, String)> {
    let mut page = Page::new(path);
    page.opt = opt.clone();
    page.vars_only = output == Output::Vars;
    page.parse()?;

    let text = match output {
        Output::Html => page.html().into_string(),
        Output::Vars => serde_json::to_string_pretty(page.vars())?,
        Output::Info => serde_json::to_string_pretty(&page.info())?,
    };
    Ok((page, text))
}
