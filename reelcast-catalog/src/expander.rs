//! Season/Language Expander: one listing entry per playable
//! (season, track) pair of a catalog record.

use reelcast_core::{CatalogConfig, StatusToken};

use crate::episodes::ListingRef;
use crate::slug::title_to_slug;
use crate::types::{CatalogRecord, ReleaseStatus, Track};

/// A user-facing listing entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingEntry {
    pub title: String,
    pub thumbnail: Option<String>,
    /// Genres joined by ", "
    pub genres: String,
    pub description: Option<String>,
    pub status: ReleaseStatus,
    pub listing: ListingRef,
}

impl ListingEntry {
    /// Site-relative listing URL, e.g. `/anime/oshi-no-ko?lang=vo&s=1`.
    pub fn url(&self) -> String {
        self.listing.to_path()
    }
}

#[derive(Debug, Clone)]
pub struct SeasonExpander {
    status_tokens: Vec<(String, StatusToken)>,
}

impl Default for SeasonExpander {
    fn default() -> Self {
        Self::new(&CatalogConfig::default())
    }
}

impl SeasonExpander {
    pub fn new(config: &CatalogConfig) -> Self {
        Self {
            status_tokens: config.status_tokens.clone(),
        }
    }

    /// Expands a record into its listing entries, seasons in order and the
    /// original-language track before the dub.
    pub fn expand(&self, record: &CatalogRecord) -> Vec<ListingEntry> {
        let slug = title_to_slug(&record.original_title);
        let season_count = record.seasons.len();
        let genres = record.genres.join(", ");

        record
            .seasons
            .iter()
            .enumerate()
            .flat_map(|(index, season)| {
                let number = index + 1;
                let playable: Vec<Track> = Track::ALL
                    .into_iter()
                    .filter(|&track| season.has_track(track))
                    .collect();
                let annotate = playable.len() > 1;

                let mut base_title = record.title.clone();
                if season_count > 1 {
                    base_title.push_str(&format!(" S{number}"));
                }
                let status = self.status_for(record, number);

                playable
                    .into_iter()
                    .map(|track| ListingEntry {
                        title: if annotate {
                            format!("{base_title} ({})", track.label())
                        } else {
                            base_title.clone()
                        },
                        thumbnail: record.poster.clone(),
                        genres: genres.clone(),
                        description: record.description.clone(),
                        status,
                        listing: ListingRef {
                            slug: slug.clone(),
                            track,
                            season: number,
                        },
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Status of a 1-based season.
    ///
    /// Every season but the last is completed. The last season takes the
    /// record's status when it exactly matches a known token (surrounding
    /// whitespace ignored), and `Unknown` otherwise.
    pub fn status_for(&self, record: &CatalogRecord, season: usize) -> ReleaseStatus {
        if season < record.seasons.len() {
            return ReleaseStatus::Completed;
        }

        let Some(raw) = record.status.as_deref().map(str::trim) else {
            return ReleaseStatus::Unknown;
        };

        self.status_tokens
            .iter()
            .find(|(token, _)| token == raw)
            .map(|(_, status)| match status {
                StatusToken::Ongoing => ReleaseStatus::Ongoing,
                StatusToken::Completed => ReleaseStatus::Completed,
                StatusToken::Upcoming => ReleaseStatus::Upcoming,
            })
            .unwrap_or(ReleaseStatus::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Episode, EpisodeLanguages, Season, TrackPlayers};

    fn episode(vo: &[&str], vf: &[&str]) -> Episode {
        let players = |names: &[&str]| TrackPlayers {
            players: names.iter().map(|n| n.to_string()).collect(),
        };
        Episode {
            title: "Episode".to_string(),
            languages: EpisodeLanguages {
                vo: players(vo),
                vf: players(vf),
            },
        }
    }

    fn record(seasons: Vec<Season>, status: Option<&str>) -> CatalogRecord {
        CatalogRecord {
            id: 3,
            title: "Oshi no Ko".to_string(),
            original_title: "Oshi no Ko".to_string(),
            alternate_titles: Default::default(),
            poster: Some("https://img.example/3.jpg".to_string()),
            description: None,
            note: 8.0,
            status: status.map(str::to_string),
            genres: vec!["Drame".to_string(), "Mystère".to_string()],
            seasons,
        }
    }

    fn season(episodes: Vec<Episode>) -> Season {
        Season {
            title: None,
            episodes,
        }
    }

    #[test]
    fn test_both_tracks_expand_to_two_annotated_entries() {
        let record = record(
            vec![season(vec![episode(&["sibnet"], &[]), episode(&[], &["myvi"])])],
            Some("EN COURS"),
        );

        let entries = SeasonExpander::default().expand(&record);

        let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Oshi no Ko (VOSTFR)", "Oshi no Ko (VF)"]);
        assert_eq!(entries[0].url(), "/anime/oshi-no-ko?lang=vo&s=1");
        assert_eq!(entries[1].url(), "/anime/oshi-no-ko?lang=vf&s=1");
        assert_eq!(entries[0].status, ReleaseStatus::Ongoing);
        assert_eq!(entries[0].genres, "Drame, Mystère");
    }

    #[test]
    fn test_single_track_is_unannotated_and_empty_seasons_skipped() {
        let record = record(
            vec![
                season(vec![episode(&["sibnet"], &[])]),
                season(vec![episode(&[], &[])]),
                season(vec![episode(&[], &["sendvid"])]),
            ],
            Some("TERMINÉ"),
        );

        let entries = SeasonExpander::default().expand(&record);

        let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Oshi no Ko S1", "Oshi no Ko S3"]);
        assert_eq!(entries[1].url(), "/anime/oshi-no-ko?lang=vf&s=3");
    }

    #[test]
    fn test_status_rules() {
        let expander = SeasonExpander::default();
        let two_seasons = |status: Option<&str>| {
            record(
                vec![season(vec![episode(&["a"], &[])]), season(vec![episode(&["b"], &[])])],
                status,
            )
        };

        assert_eq!(expander.status_for(&two_seasons(Some("EN COURS")), 1), ReleaseStatus::Completed);
        assert_eq!(expander.status_for(&two_seasons(Some(" EN COURS ")), 2), ReleaseStatus::Ongoing);
        assert_eq!(expander.status_for(&two_seasons(Some("À VENIR")), 2), ReleaseStatus::Upcoming);
        assert_eq!(expander.status_for(&two_seasons(Some("en cours")), 2), ReleaseStatus::Unknown);
        assert_eq!(expander.status_for(&two_seasons(None), 2), ReleaseStatus::Unknown);
    }
}
