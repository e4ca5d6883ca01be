//! CLI command implementations

use std::sync::Arc;

use anyhow::Context;
use clap::{Subcommand, ValueEnum};
use reelcast_catalog::{CatalogOrdering, CatalogSource, CatalogSourceParts, ListingEntry, Page};
use reelcast_core::{
    HttpTransport, PreferenceConfig, RankingStrategy, ReelcastConfig, ReqwestTransport,
    StaticPreferences, VideoCandidate,
};
use reelcast_extract::{
    EmbedDiscovery, HostRegistry, LinkEncoding, ResolutionPipeline, SecondaryFetch, SiteProfile,
};
use tracing::debug;
use url::Url;

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the videos of an HTML episode page
    Resolve {
        /// Episode page URL
        url: String,
        /// How embed links are laid out on the page
        #[arg(long, value_enum, default_value_t = DiscoveryKind::List)]
        discovery: DiscoveryKind,
        /// Selector matching one row per server (list discovery)
        #[arg(long, default_value = "select.mirror > option")]
        row_selector: String,
        /// Row attribute holding the embed link (list discovery)
        #[arg(long, default_value = "value")]
        link_attribute: String,
        /// Row links are base64 encoded iframe tags (list discovery)
        #[arg(long)]
        encoded_links: bool,
        /// Text identifying the script holding the player array (array discovery)
        #[arg(long, default_value = "var tabsArray")]
        script_marker: String,
        /// Separator between array entries (array discovery)
        #[arg(long, default_value = "tabsArray")]
        delimiter: String,
        /// Extra round trip needed to reach the real embed URL
        #[arg(long, value_enum, default_value_t = SecondaryKind::None)]
        secondary: SecondaryKind,
        /// Only dispatch rows mentioning one of these languages
        #[arg(long = "allow")]
        allowed_languages: Vec<String>,
        /// Preferred quality token, e.g. "1080p" or "Okru:720p"
        #[arg(long, default_value = "")]
        quality: String,
        /// Preferred language token
        #[arg(long, default_value = "")]
        language: String,
        /// Ranking strategy: match or provider
        #[arg(long, default_value = "match")]
        strategy: RankingStrategy,
        /// Prefix labels with the row's language tag
        #[arg(long)]
        prefix_language: bool,
    },
    /// Browse an API-backed catalog
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
        /// Preferred quality token used when ranking videos
        #[arg(long, global = true, default_value = "")]
        quality: String,
    },
}

/// Catalog subcommands
#[derive(Subcommand)]
pub enum CatalogCommands {
    /// List one page of the catalog
    List {
        /// popular or latest
        #[arg(long, default_value = "popular")]
        order: CatalogOrdering,
        #[arg(short, long, default_value = "1")]
        page: usize,
    },
    /// Search titles and slugs
    Search {
        query: String,
        #[arg(short, long, default_value = "1")]
        page: usize,
    },
    /// List the playable episodes of a listing URL
    Episodes {
        /// e.g. /anime/oshi-no-ko?lang=vo&s=1
        listing_url: String,
    },
    /// Resolve the videos of an episode URL
    Videos {
        /// e.g. /anime/oshi-no-ko?lang=vo&s=1&ep=3
        episode_url: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DiscoveryKind {
    /// One element per server row
    List,
    /// A script variable holding a delimited player array
    Array,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SecondaryKind {
    None,
    /// First script of the linked page holds `src="..."`
    Script,
    /// Linked page wraps the player in an iframe
    Iframe,
}

impl From<SecondaryKind> for SecondaryFetch {
    fn from(kind: SecondaryKind) -> Self {
        match kind {
            SecondaryKind::None => SecondaryFetch::None,
            SecondaryKind::Script => SecondaryFetch::ScriptSrc,
            SecondaryKind::Iframe => SecondaryFetch::IframeSrc,
        }
    }
}

/// Handle the CLI command
///
/// # Errors
/// Returns appropriate error based on the command that fails
pub async fn handle_command(command: Commands) -> anyhow::Result<()> {
    let config = ReelcastConfig::from_env();
    debug!("Using configuration: {:?}", config);
    let transport: Arc<dyn HttpTransport> = Arc::new(
        ReqwestTransport::new(&config.network).context("Failed to build HTTP client")?,
    );
    let registry = Arc::new(HostRegistry::with_defaults());

    match command {
        Commands::Resolve {
            url,
            discovery,
            row_selector,
            link_attribute,
            encoded_links,
            script_marker,
            delimiter,
            secondary,
            allowed_languages,
            quality,
            language,
            strategy,
            prefix_language,
        } => {
            let discovery = match discovery {
                DiscoveryKind::List if encoded_links => {
                    EmbedDiscovery::server_list(&row_selector, &link_attribute)
                        .with_link_encoding(LinkEncoding::Base64Iframe)
                }
                DiscoveryKind::List => EmbedDiscovery::server_list(&row_selector, &link_attribute),
                DiscoveryKind::Array => EmbedDiscovery::ScriptArray {
                    script_marker,
                    delimiter,
                    start_marker: "src='".to_string(),
                    end_marker: "'".to_string(),
                    secondary: SecondaryFetch::None,
                },
            }
            .with_secondary(secondary.into());

            let mut profile = SiteProfile::new("cli", &site_origin(&url)?, discovery)
                .with_ranking(strategy);
            if prefix_language {
                profile = profile.with_language_prefix();
            }

            let preferences = PreferenceConfig::new()
                .with_quality(quality)
                .with_language(language)
                .with_allowed_languages(allowed_languages);
            let pipeline = ResolutionPipeline::new(
                transport,
                registry,
                Arc::new(StaticPreferences::new(preferences)),
                config.resolution,
            );

            let videos = pipeline.resolve_page(&profile, &url).await?;
            print_videos(&videos);
        }
        Commands::Catalog { command, quality } => {
            let source = CatalogSource::new(CatalogSourceParts {
                transport,
                registry,
                preferences: Arc::new(StaticPreferences::new(
                    PreferenceConfig::new().with_quality(quality),
                )),
                catalog: config.catalog,
                resolution: config.resolution,
            });
            run_catalog(&source, command).await?;
        }
    }

    Ok(())
}

async fn run_catalog(source: &CatalogSource, command: CatalogCommands) -> anyhow::Result<()> {
    match command {
        CatalogCommands::List { order, page } => {
            print_entries(&source.list_catalog(order, page).await?);
        }
        CatalogCommands::Search { query, page } => {
            print_entries(&source.search_catalog(&query, page).await?);
        }
        CatalogCommands::Episodes { listing_url } => {
            for episode in source.episodes_for(&listing_url).await? {
                println!(
                    "{:>4}  {}  {}",
                    episode.number,
                    episode.name,
                    episode.reference.to_path()
                );
            }
        }
        CatalogCommands::Videos { episode_url } => {
            print_videos(&source.resolve_videos(&episode_url).await?);
        }
    }
    Ok(())
}

fn site_origin(episode_url: &str) -> anyhow::Result<String> {
    let url = Url::parse(episode_url).with_context(|| format!("Invalid URL: {episode_url}"))?;
    Ok(url.origin().ascii_serialization())
}

fn print_entries(page: &Page<ListingEntry>) {
    for entry in &page.items {
        println!("{}  [{}]  {}", entry.title, entry.status, entry.url());
    }
    if page.has_next_page {
        println!("(more results on the next page)");
    }
}

fn print_videos(videos: &[VideoCandidate]) {
    if videos.is_empty() {
        println!("No playable video found");
        return;
    }
    for video in videos {
        println!("{video}");
    }
}
