mod album;
mod check;
mod config;
mod content;
mod controller;
mod error;
mod filter;
mod i18n;
mod language;
mod lightbox;
mod prefs;
mod render;
mod serve;
mod site;
mod thumb;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::{Overrides, SiteConfig};
use crate::filter::FilterSelection;
use crate::i18n::Lang;
use crate::language::LanguageState;
use crate::prefs::{LANG_KEY, Preferences};

#[derive(Parser)]
#[command(name = "club-site", about = "Bilingual gallery and achievements pages for a club website")]
struct Cli {
    /// Config file (default: <site>/site.json when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the static pages for both languages
    Build {
        /// Site directory containing data/ and assets/
        site: PathBuf,
        /// Output directory (default: the site directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Do not generate thumbnails
        #[arg(long)]
        no_thumbs: bool,
    },
    /// Serve the site over HTTP, rendering pages on request
    Serve {
        /// Site directory containing data/ and assets/
        site: PathBuf,
        /// Server port (default: 8080)
        #[arg(short, long)]
        port: Option<u16>,
        /// Listen on 127.0.0.1 only
        #[arg(long)]
        localhost: bool,
    },
    /// Validate content files and media references
    Check {
        /// Site directory containing data/ and assets/
        site: PathBuf,
    },
    /// List albums matching a filter
    Albums {
        /// Site directory containing data/ and assets/
        site: PathBuf,
        /// Category id, or "all"
        #[arg(long)]
        category: Option<String>,
        /// Year, or "all"
        #[arg(long)]
        year: Option<String>,
        /// Display language (bn or en)
        #[arg(long)]
        lang: Option<Lang>,
    },
    /// Show or set the stored display language
    #[command(name = "lang")]
    Language {
        /// Site directory holding the preferences file
        site: PathBuf,
        /// New language (bn or en)
        lang: Option<Lang>,
        /// Switch to the other language
        #[arg(long, conflicts_with = "lang")]
        toggle: bool,
    },
}

/// Read the config file if any and merge it with command-line settings.
/// A stored language preference stands in for a missing `--lang`.
fn load_site_config(site: &Path, explicit: Option<&Path>, mut overrides: Overrides) -> Result<SiteConfig> {
    if !site.is_dir() {
        anyhow::bail!("{} is not a directory", site.display());
    }

    let file_config = match config::find_config_file(explicit, site) {
        Some(path) => {
            let loaded = config::load_config(&path)
                .with_context(|| format!("Cannot load config {}", path.display()))?;
            tracing::debug!(path = %path.display(), "config loaded");
            Some(loaded)
        }
        None => None,
    };

    if overrides.lang.is_none() {
        let prefs = Preferences::load(site);
        overrides.lang = prefs.get(LANG_KEY).and_then(Lang::parse);
    }

    Ok(SiteConfig::resolve(site, file_config, &overrides))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("club_site=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let explicit = cli.config.as_deref();

    match cli.command {
        Commands::Build {
            site,
            output,
            no_thumbs,
        } => {
            let config = load_site_config(&site, explicit, Overrides::default())?;
            site::run_build(&config, output, !no_thumbs)
        }
        Commands::Serve {
            site,
            port,
            localhost,
        } => {
            let overrides = Overrides {
                port,
                localhost,
                lang: None,
            };
            let config = load_site_config(&site, explicit, overrides)?;
            serve::run_serve(config)
        }
        Commands::Check { site } => {
            let config = load_site_config(&site, explicit, Overrides::default())?;
            check::run_check(&config)
        }
        Commands::Albums {
            site,
            category,
            year,
            lang,
        } => {
            let overrides = Overrides {
                lang,
                ..Overrides::default()
            };
            let config = load_site_config(&site, explicit, overrides)?;
            let selection = FilterSelection::from_params(category.as_deref(), year.as_deref());
            site::run_albums(&config, &selection, config.default_lang)
        }
        Commands::Language { site, lang, toggle } => {
            let mut state = LanguageState::from_prefs(Preferences::load(&site));
            match lang {
                None if toggle => {
                    let lang = state.toggle()?;
                    println!("Language set to {} ({})", lang.native_name(), lang.code());
                }
                None => {
                    let current = state.current();
                    println!("{} ({})", current.native_name(), current.code());
                }
                Some(lang) => {
                    if state.set_language(lang)? {
                        println!("Language set to {} ({})", lang.native_name(), lang.code());
                    } else {
                        println!("Language already {} ({})", lang.native_name(), lang.code());
                    }
                }
            }
            Ok(())
        }
    }
}
