//! Catalog Record model as served by the catalog API.

use serde::{Deserialize, Serialize};

/// One media title with its seasons and per-track players.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub id: u64,
    pub title: String,
    #[serde(rename = "titleO")]
    pub original_title: String,
    #[serde(rename = "titles", default)]
    pub alternate_titles: AlternateTitles,
    #[serde(rename = "affiche", default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Community rating, used for popularity ordering
    #[serde(default)]
    pub note: f64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "themes", default)]
    pub genres: Vec<String>,
    #[serde(rename = "saisons", default)]
    pub seasons: Vec<Season>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternateTitles {
    #[serde(default)]
    pub en: Option<String>,
    #[serde(rename = "en_jp", default)]
    pub en_jp: Option<String>,
    #[serde(rename = "ja_jp", default)]
    pub ja_jp: Option<String>,
}

impl AlternateTitles {
    /// Titles that are present, in a fixed order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        [&self.en, &self.en_jp, &self.ja_jp]
            .into_iter()
            .filter_map(|title| title.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub episodes: Vec<Episode>,
}

impl Season {
    /// Checks whether any episode has at least one player on `track`.
    pub fn has_track(&self, track: Track) -> bool {
        self.episodes
            .iter()
            .any(|episode| !episode.players(track).is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "lang", default)]
    pub languages: EpisodeLanguages,
}

impl Episode {
    /// Player names available on a track, in API order.
    pub fn players(&self, track: Track) -> &[String] {
        match track {
            Track::Vo => &self.languages.vo.players,
            Track::Vf => &self.languages.vf.players,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeLanguages {
    #[serde(default)]
    pub vo: TrackPlayers,
    #[serde(default)]
    pub vf: TrackPlayers,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackPlayers {
    #[serde(default)]
    pub players: Vec<String>,
}

/// Language variant of an episode's players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Track {
    /// Original audio with French subtitles
    Vo,
    /// French dub
    Vf,
}

impl Track {
    pub const ALL: [Track; 2] = [Track::Vo, Track::Vf];

    /// Code used in listing URLs and the video API path.
    pub fn code(self) -> &'static str {
        match self {
            Track::Vo => "vo",
            Track::Vf => "vf",
        }
    }

    /// Label appended to titles when a season has both tracks.
    pub fn label(self) -> &'static str {
        match self {
            Track::Vo => "VOSTFR",
            Track::Vf => "VF",
        }
    }
}

impl std::str::FromStr for Track {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vo" => Ok(Track::Vo),
            "vf" => Ok(Track::Vf),
            _ => Err(format!("Invalid track: {s}")),
        }
    }
}

impl std::fmt::Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Release status of one listing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseStatus {
    Ongoing,
    Completed,
    Upcoming,
    Unknown,
}

impl std::fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReleaseStatus::Ongoing => write!(f, "ongoing"),
            ReleaseStatus::Completed => write!(f, "completed"),
            ReleaseStatus::Upcoming => write!(f, "upcoming"),
            ReleaseStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Orderings the full catalog can be listed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogOrdering {
    /// Rating descending, ties in catalog order
    #[default]
    Popular,
    /// Most recently added first
    Latest,
}

impl std::str::FromStr for CatalogOrdering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "popular" => Ok(CatalogOrdering::Popular),
            "latest" => Ok(CatalogOrdering::Latest),
            _ => Err(format!("Invalid catalog ordering: {s}")),
        }
    }
}
