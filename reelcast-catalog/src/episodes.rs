//! Listing and episode references, and episode lists per (season, track).
//!
//! Numbers in references are 1-based; the 0-based indices used against
//! the record and the video API never appear in a URL.

use url::Url;

use crate::errors::CatalogError;
use crate::types::{CatalogRecord, Episode, Track};

/// Base used to parse site-relative references.
const RELATIVE_BASE: &str = "https://catalog.invalid";

/// Points at one (season, track) listing of a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListingRef {
    pub slug: String,
    pub track: Track,
    pub season: usize,
}

/// Points at one episode of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EpisodeRef {
    pub listing: ListingRef,
    pub episode: usize,
}

/// One row of an episode list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeEntry {
    pub name: String,
    pub number: usize,
    pub reference: EpisodeRef,
}

fn parse_reference(reference: &str) -> Result<Url, CatalogError> {
    Url::parse(reference)
        .or_else(|_| Url::parse(RELATIVE_BASE).and_then(|base| base.join(reference)))
        .map_err(|e| CatalogError::malformed(reference, e.to_string()))
}

fn query_value(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Reads a 1-based number from the query, defaulting to 1 when absent.
fn query_number(url: &Url, name: &str, reference: &str) -> Result<usize, CatalogError> {
    match query_value(url, name) {
        None => Ok(1),
        Some(raw) => match raw.parse::<usize>() {
            Ok(0) | Err(_) => Err(CatalogError::malformed(
                reference,
                format!("'{name}' must be a positive number, got '{raw}'"),
            )),
            Ok(number) => Ok(number),
        },
    }
}

impl ListingRef {
    /// Parses `/anime/<slug>?lang=<vo|vf>&s=<season>`, relative or absolute.
    ///
    /// A missing `lang` means `vo` and a missing `s` means season 1.
    ///
    /// # Errors
    /// - `CatalogError::MalformedReference` - No slug, unknown track or a
    ///   non-positive season
    pub fn parse(reference: &str) -> Result<Self, CatalogError> {
        let url = parse_reference(reference)?;
        Self::from_url(&url, reference)
    }

    fn from_url(url: &Url, reference: &str) -> Result<Self, CatalogError> {
        let slug = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|segment| !segment.is_empty())
            .ok_or_else(|| CatalogError::malformed(reference, "missing slug"))?
            .to_string();

        let track = match query_value(url, "lang") {
            None => Track::Vo,
            Some(code) => code
                .parse::<Track>()
                .map_err(|e| CatalogError::malformed(reference, e))?,
        };

        Ok(Self {
            slug,
            track,
            season: query_number(url, "s", reference)?,
        })
    }

    /// Site-relative URL of this listing.
    pub fn to_path(&self) -> String {
        format!(
            "/anime/{}?lang={}&s={}",
            self.slug,
            self.track.code(),
            self.season
        )
    }

    pub fn episode(&self, number: usize) -> EpisodeRef {
        EpisodeRef {
            listing: self.clone(),
            episode: number,
        }
    }
}

impl EpisodeRef {
    /// Parses a listing reference carrying an `ep=<episode>` parameter.
    ///
    /// A missing `ep` means episode 1.
    ///
    /// # Errors
    /// - `CatalogError::MalformedReference` - As for `ListingRef::parse`, or
    ///   a non-positive episode
    pub fn parse(reference: &str) -> Result<Self, CatalogError> {
        let url = parse_reference(reference)?;
        Ok(Self {
            listing: ListingRef::from_url(&url, reference)?,
            episode: query_number(&url, "ep", reference)?,
        })
    }

    pub fn to_path(&self) -> String {
        format!("{}&ep={}", self.listing.to_path(), self.episode)
    }
}

/// Lists the episodes of a listing that have players on its track, newest first.
///
/// # Errors
/// - `CatalogError::SeasonOutOfRange` - The record has no such season
pub fn episodes_for(
    record: &CatalogRecord,
    listing: &ListingRef,
) -> Result<Vec<EpisodeEntry>, CatalogError> {
    let season = record
        .seasons
        .get(listing.season.wrapping_sub(1))
        .ok_or_else(|| CatalogError::SeasonOutOfRange {
            slug: listing.slug.clone(),
            season: listing.season,
        })?;

    Ok(season
        .episodes
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, episode)| !episode.players(listing.track).is_empty())
        .map(|(index, episode)| EpisodeEntry {
            name: episode.title.clone(),
            number: index + 1,
            reference: listing.episode(index + 1),
        })
        .collect())
}

/// Looks up the episode an episode reference points at.
///
/// # Errors
/// - `CatalogError::SeasonOutOfRange` - The record has no such season
/// - `CatalogError::EpisodeOutOfRange` - The season has no such episode
pub fn episode_at<'a>(
    record: &'a CatalogRecord,
    reference: &EpisodeRef,
) -> Result<&'a Episode, CatalogError> {
    let listing = &reference.listing;
    let season = record
        .seasons
        .get(listing.season.wrapping_sub(1))
        .ok_or_else(|| CatalogError::SeasonOutOfRange {
            slug: listing.slug.clone(),
            season: listing.season,
        })?;

    season
        .episodes
        .get(reference.episode.wrapping_sub(1))
        .ok_or_else(|| CatalogError::EpisodeOutOfRange {
            slug: listing.slug.clone(),
            season: listing.season,
            episode: reference.episode,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EpisodeLanguages, Season, TrackPlayers};

    fn record_with_episodes(vo_players: &[usize]) -> CatalogRecord {
        let episodes = vo_players
            .iter()
            .enumerate()
            .map(|(index, &count)| Episode {
                title: format!("Episode {}", index + 1),
                languages: EpisodeLanguages {
                    vo: TrackPlayers {
                        players: vec!["sibnet".to_string(); count],
                    },
                    vf: TrackPlayers::default(),
                },
            })
            .collect();

        CatalogRecord {
            id: 9,
            title: "Test".to_string(),
            original_title: "Test".to_string(),
            alternate_titles: Default::default(),
            poster: None,
            description: None,
            note: 0.0,
            status: None,
            genres: Vec::new(),
            seasons: vec![Season {
                title: None,
                episodes,
            }],
        }
    }

    #[test]
    fn test_listing_ref_parse_and_defaults() {
        let full = ListingRef::parse("https://franime.fr/anime/oshi-no-ko?lang=vf&s=2").unwrap();
        assert_eq!(
            full,
            ListingRef {
                slug: "oshi-no-ko".to_string(),
                track: Track::Vf,
                season: 2
            }
        );
        assert_eq!(full.to_path(), "/anime/oshi-no-ko?lang=vf&s=2");

        let bare = ListingRef::parse("/anime/oshi-no-ko").unwrap();
        assert_eq!(bare.track, Track::Vo);
        assert_eq!(bare.season, 1);
    }

    #[test]
    fn test_malformed_references() {
        for reference in [
            "/anime/x?lang=de&s=1",
            "/anime/x?lang=vo&s=0",
            "/anime/x?lang=vo&s=two",
            "/anime/?lang=vo&s=1",
        ] {
            assert!(
                matches!(
                    ListingRef::parse(reference),
                    Err(CatalogError::MalformedReference { .. })
                ),
                "{reference} should be rejected"
            );
        }
        assert!(EpisodeRef::parse("/anime/x?lang=vo&s=1&ep=0").is_err());
    }

    #[test]
    fn test_episode_ref_round_trip() {
        let reference = EpisodeRef::parse("/anime/oshi-no-ko?lang=vo&s=1&ep=12").unwrap();
        assert_eq!(reference.episode, 12);
        assert_eq!(reference.to_path(), "/anime/oshi-no-ko?lang=vo&s=1&ep=12");
        assert_eq!(EpisodeRef::parse(&reference.to_path()).unwrap(), reference);
    }

    #[test]
    fn test_episodes_descending_and_skip_unplayable() {
        let record = record_with_episodes(&[1, 0, 2]);
        let listing = ListingRef::parse("/anime/test?lang=vo&s=1").unwrap();

        let entries = episodes_for(&record, &listing).unwrap();

        let numbers: Vec<usize> = entries.iter().map(|e| e.number).collect();
        assert_eq!(numbers, vec![3, 1]);
        assert_eq!(entries[0].reference.to_path(), "/anime/test?lang=vo&s=1&ep=3");
        assert_eq!(episode_at(&record, &entries[0].reference).unwrap().title, "Episode 3");
    }

    #[test]
    fn test_out_of_range_lookups() {
        let record = record_with_episodes(&[1]);

        let season_two = ListingRef::parse("/anime/test?s=2").unwrap();
        assert!(matches!(
            episodes_for(&record, &season_two),
            Err(CatalogError::SeasonOutOfRange { season: 2, .. })
        ));

        let episode_five = EpisodeRef::parse("/anime/test?s=1&ep=5").unwrap();
        assert!(matches!(
            episode_at(&record, &episode_five),
            Err(CatalogError::EpisodeOutOfRange { episode: 5, .. })
        ));
    }
}
