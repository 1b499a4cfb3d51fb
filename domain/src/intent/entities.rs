//! Intent domain entities

use serde::{Deserialize, Serialize};

/// Kind of music catalog entity a search targets.
///
/// This is the fixed enumeration the downstream search accepts; anything the
/// classifier produces outside it is coerced with [`SearchType::coerce`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Track,
    Artist,
    Album,
    Playlist,
}

impl SearchType {
    pub const ALL: [SearchType; 4] = [
        SearchType::Track,
        SearchType::Artist,
        SearchType::Album,
        SearchType::Playlist,
    ];

    /// Type used when classification yields nothing usable
    pub const FALLBACK: SearchType = SearchType::Track;

    /// Type substituted for an unrecognised classifier type
    pub const COERCION_DEFAULT: SearchType = SearchType::Playlist;

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Track => "track",
            SearchType::Artist => "artist",
            SearchType::Album => "album",
            SearchType::Playlist => "playlist",
        }
    }

    /// Key of the result collection in a catalog search response (`tracks`, ...)
    pub fn collection_key(&self) -> &'static str {
        match self {
            SearchType::Track => "tracks",
            SearchType::Artist => "artists",
            SearchType::Album => "albums",
            SearchType::Playlist => "playlists",
        }
    }

    /// Parse a type name, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
    }

    /// Parse a type name, substituting [`Self::COERCION_DEFAULT`] when unknown
    pub fn coerce(s: &str) -> Self {
        Self::parse(s).unwrap_or(Self::COERCION_DEFAULT)
    }
}

impl std::fmt::Display for SearchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifier output before type validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawIntent {
    pub type_name: String,
    pub keyword: String,
}

impl RawIntent {
    pub fn new(type_name: impl Into<String>, keyword: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            keyword: keyword.into(),
        }
    }

    /// Whether the type name is outside the accepted enumeration
    pub fn needs_coercion(&self) -> bool {
        SearchType::parse(&self.type_name).is_none()
    }

    pub fn validate(self) -> Intent {
        Intent {
            search_type: SearchType::coerce(&self.type_name),
            keyword: self.keyword,
        }
    }
}

/// A classified `{type, keyword}` pair, ready for search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    #[serde(rename = "type")]
    pub search_type: SearchType,
    pub keyword: String,
}

impl Intent {
    pub fn new(search_type: SearchType, keyword: impl Into<String>) -> Self {
        Self {
            search_type,
            keyword: keyword.into(),
        }
    }

    /// The intent synthesized when classification fails: search the whole
    /// query as a track
    pub fn fallback(query: &str) -> Self {
        Self::new(SearchType::FALLBACK, query.trim())
    }

    /// Render this intent's results as a single line.
    ///
    /// An empty result set renders a "not found" placeholder so every
    /// intent always contributes exactly one line.
    pub fn render_line(&self, items: &[MusicItem]) -> String {
        if items.is_empty() {
            return format!("[{}] {}: not found", self.search_type, self.keyword);
        }
        let summaries: Vec<String> = items.iter().map(MusicItem::summary).collect();
        format!(
            "[{}] {}: {}",
            self.search_type,
            self.keyword,
            summaries.join(" | ")
        )
    }
}

/// One entry returned by the music catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicItem {
    pub kind: SearchType,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl MusicItem {
    pub fn new(kind: SearchType, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            artists: Vec::new(),
            url: None,
        }
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artists.push(artist.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn summary(&self) -> String {
        let artists = self.artists.join(", ");
        let head = match self.kind {
            SearchType::Track if artists.is_empty() => self.name.clone(),
            SearchType::Track => format!("{} - {}", self.name, artists),
            SearchType::Artist => format!("Artist: {}", self.name),
            SearchType::Album if artists.is_empty() => format!("Album: {}", self.name),
            SearchType::Album => format!("Album: {} - {}", self.name, artists),
            SearchType::Playlist => format!("Playlist: {}", self.name),
        };
        match &self.url {
            Some(url) => format!("{} ({})", head, url),
            None => head,
        }
    }
}
