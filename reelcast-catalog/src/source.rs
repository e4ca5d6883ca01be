//! API-backed catalog source: listing, search, episode lists and video
//! resolution over the in-memory catalog.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use reelcast_core::transport::headers;
use reelcast_core::{
    CatalogConfig, HttpTransport, PreferenceRanker, PreferenceSource, RankingStrategy,
    RequestHeaders, ResolutionConfig, VideoCandidate,
};
use reelcast_extract::{ExtractContext, HostRegistry};
use tracing::{debug, info, warn};

use crate::episodes::{EpisodeEntry, EpisodeRef, ListingRef, episode_at, episodes_for};
use crate::errors::CatalogError;
use crate::expander::{ListingEntry, SeasonExpander};
use crate::store::{CatalogStore, HttpCatalogLoader, Page, paginate};
use crate::types::{CatalogOrdering, CatalogRecord};

/// Catalog-backed source exposing the caller-facing operations.
#[derive(Debug)]
pub struct CatalogSource {
    store: CatalogStore,
    expander: SeasonExpander,
    transport: Arc<dyn HttpTransport>,
    registry: Arc<HostRegistry>,
    preferences: Arc<dyn PreferenceSource>,
    ranker: PreferenceRanker,
    api_base_url: String,
    headers: RequestHeaders,
    resolution: ResolutionConfig,
}

/// Parts a `CatalogSource` is assembled from.
pub struct CatalogSourceParts {
    pub transport: Arc<dyn HttpTransport>,
    pub registry: Arc<HostRegistry>,
    pub preferences: Arc<dyn PreferenceSource>,
    pub catalog: CatalogConfig,
    pub resolution: ResolutionConfig,
}

impl CatalogSource {
    /// Builds a source that loads its catalog from the API.
    pub fn new(parts: CatalogSourceParts) -> Self {
        let site_url = parts.catalog.site_url.trim_end_matches('/').to_string();
        let headers = headers([
            ("Referer", format!("{site_url}/")),
            ("Origin", site_url.clone()),
        ]);
        let loader = HttpCatalogLoader::new(
            Arc::clone(&parts.transport),
            &parts.catalog.api_base_url,
            headers.clone(),
        );

        Self {
            store: CatalogStore::new(Box::new(loader), parts.catalog.page_size),
            expander: SeasonExpander::new(&parts.catalog),
            transport: parts.transport,
            registry: parts.registry,
            preferences: parts.preferences,
            ranker: PreferenceRanker::new(RankingStrategy::PreferenceMatch),
            api_base_url: parts.catalog.api_base_url.trim_end_matches('/').to_string(),
            headers,
            resolution: parts.resolution,
        }
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    /// Lists one page of the catalog, expanded into listing entries.
    ///
    /// Pages are windows over records; a record contributes all of its
    /// (season, track) entries to the page it falls on.
    ///
    /// # Errors
    /// - `CatalogError::LoadFailed` - The catalog could not be loaded
    pub async fn list_catalog(
        &self,
        ordering: CatalogOrdering,
        page: usize,
    ) -> Result<Page<ListingEntry>, CatalogError> {
        let records = self.store.list(ordering, page).await?;
        Ok(self.expand_page(records))
    }

    /// Searches the catalog and returns one page of matching entries.
    ///
    /// # Errors
    /// - `CatalogError::LoadFailed` - The catalog could not be loaded
    pub async fn search_catalog(
        &self,
        query: &str,
        page: usize,
    ) -> Result<Page<ListingEntry>, CatalogError> {
        let matches = self.store.search(query).await?;
        Ok(self.expand_page(paginate(matches, page, self.store.page_size())))
    }

    /// Lists the playable episodes of a listing URL, newest first.
    ///
    /// # Errors
    /// - `CatalogError::MalformedReference` - The URL is not a listing reference
    /// - `CatalogError::SlugNotFound` - No record has the referenced slug
    /// - `CatalogError::SeasonOutOfRange` - The record has no such season
    pub async fn episodes_for(&self, listing_url: &str) -> Result<Vec<EpisodeEntry>, CatalogError> {
        let listing = ListingRef::parse(listing_url)?;
        let record = self.store.find_by_slug(&listing.slug).await?;
        episodes_for(record, &listing)
    }

    /// Resolves the videos of an episode URL, ranked by preference.
    ///
    /// Each player of the episode's track is looked up through the video
    /// API and dispatched by player name. Failing players contribute
    /// nothing, so the result may be empty.
    ///
    /// # Errors
    /// - `CatalogError::MalformedReference` - The URL is not an episode reference
    /// - `CatalogError::SlugNotFound` - No record has the referenced slug
    /// - `CatalogError::SeasonOutOfRange` / `CatalogError::EpisodeOutOfRange` -
    ///   The reference points past the record's content
    pub async fn resolve_videos(&self, episode_url: &str) -> Result<Vec<VideoCandidate>, CatalogError> {
        let reference = EpisodeRef::parse(episode_url)?;
        let record = self.store.find_by_slug(&reference.listing.slug).await?;
        let players = episode_at(record, &reference)?.players(reference.listing.track);
        let preferences = self.preferences.snapshot();

        info!(
            "Resolving {} player(s) for {}",
            players.len(),
            reference.to_path()
        );

        let limit = self.resolution.fanout_limit(players.len());
        let batches: Vec<Vec<VideoCandidate>> = stream::iter(players.iter().enumerate())
            .map(|(index, player)| self.resolve_player(record, &reference, index, player))
            .buffered(limit)
            .collect()
            .await;

        let videos: Vec<VideoCandidate> = batches.into_iter().flatten().collect();
        Ok(self.ranker.rank(videos, &preferences))
    }

    /// Video API URL answering with the player URL of one player slot.
    pub fn player_api_url(&self, record: &CatalogRecord, reference: &EpisodeRef, index: usize) -> String {
        format!(
            "{}/anime/{}/{}/{}/{}/{}",
            self.api_base_url,
            record.id,
            reference.listing.season.saturating_sub(1),
            reference.episode.saturating_sub(1),
            reference.listing.track.code(),
            index
        )
    }

    async fn resolve_player(
        &self,
        record: &CatalogRecord,
        reference: &EpisodeRef,
        index: usize,
        player: &str,
    ) -> Vec<VideoCandidate> {
        let api_url = self.player_api_url(record, reference, index);
        let player_url = match self.transport.fetch_text(&api_url, &self.headers).await {
            Ok(body) => body.trim().to_string(),
            Err(e) => {
                warn!("Player lookup {} failed: {}", api_url, e);
                return Vec::new();
            }
        };
        debug!("Player {} #{} -> {}", player, index, player_url);

        let context = ExtractContext {
            headers: self.headers.clone(),
            ..Default::default()
        };
        self.registry
            .resolve_player(player, &player_url, self.transport.as_ref(), &context)
            .await
    }

    fn expand_page(&self, records: Page<&CatalogRecord>) -> Page<ListingEntry> {
        Page {
            items: records
                .items
                .into_iter()
                .flat_map(|record| self.expander.expand(record))
                .collect(),
            has_next_page: records.has_next_page,
        }
    }
}
