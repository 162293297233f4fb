#![forbid(unsafe_code)]

//! Media and headline model for the expansion hero.
//!
//! Everything here is derived from configuration and is independent of
//! progress: which element to render for the media, how the title splits
//! for the parallax effect, and what identifies the media for resets.

use serde::{Deserialize, Serialize};

/// Query appended to hosted-embed video URLs so they behave like a muted
/// background loop.
const EMBED_QUERY: &str =
    "autoplay=1&mute=1&loop=1&controls=0&showinfo=0&rel=0&modestbranding=1&playsinline=1";

/// Hosts whose video URLs must be rendered as an embed frame.
const EMBED_HOSTS: &[&str] = &["youtube.com", "youtube-nocookie.com"];

const DEFAULT_ALT: &str = "Media content";

/// Kind of media shown in the expanding card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Video,
    Image,
}

impl MediaKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Image => "image",
        }
    }

    /// Tint over the media at `progress`; video sits lighter than images.
    #[must_use]
    pub fn overlay_opacity(self, progress: f64) -> f64 {
        let base = match self {
            Self::Video => 0.5,
            Self::Image => 0.7,
        };
        let p = if progress.is_finite() {
            progress.clamp(0.0, 1.0)
        } else {
            0.0
        };
        (base - p * 0.3).clamp(0.0, 1.0)
    }

    /// Parse the host-facing label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "video" => Some(Self::Video),
            "image" => Some(Self::Image),
            _ => None,
        }
    }
}

/// What the controller considers "the same media".
///
/// Changing either field forces a full progress reset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaIdentity {
    pub kind: MediaKind,
    pub source: String,
}

impl MediaIdentity {
    #[must_use]
    pub fn new(kind: MediaKind, source: impl Into<String>) -> Self {
        Self {
            kind,
            source: source.into(),
        }
    }
}

/// Concrete element the host should create for the media slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaElement {
    /// Native video: always autoplays, loops, muted, inline, no controls.
    Video {
        src: String,
        poster: Option<String>,
    },
    /// Hosted video rendered through an embed frame.
    Embed { url: String },
    Image { src: String, alt: String },
}

impl MediaElement {
    /// Pick the element for a media kind and source.
    #[must_use]
    pub fn resolve(
        kind: MediaKind,
        source: &str,
        poster: Option<&str>,
        title: Option<&str>,
    ) -> Self {
        match kind {
            MediaKind::Video if is_embed_source(source) => Self::Embed {
                url: embed_url(source),
            },
            MediaKind::Video => Self::Video {
                src: source.to_owned(),
                poster: poster.filter(|p| !p.is_empty()).map(str::to_owned),
            },
            MediaKind::Image => Self::Image {
                src: source.to_owned(),
                alt: title
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or(DEFAULT_ALT)
                    .to_owned(),
            },
        }
    }
}

/// Whether a video source must be embedded instead of played natively.
#[must_use]
pub fn is_embed_source(source: &str) -> bool {
    EMBED_HOSTS.iter().any(|host| source.contains(host))
}

/// Append the background-loop query to a hosted video URL.
#[must_use]
pub fn embed_url(source: &str) -> String {
    let sep = if source.contains('?') { '&' } else { '?' };
    format!("{source}{sep}{EMBED_QUERY}")
}

/// Title split for the two-sided parallax headline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleSplit {
    /// First word; moves left as the media expands.
    pub lead: String,
    /// Everything after the first space; moves right.
    pub rest: String,
}

impl TitleSplit {
    /// Split on the first space. Missing titles produce two empty halves.
    #[must_use]
    pub fn from_title(title: Option<&str>) -> Self {
        let Some(title) = title else {
            return Self::default();
        };
        match title.split_once(' ') {
            Some((lead, rest)) => Self {
                lead: lead.to_owned(),
                rest: rest.to_owned(),
            },
            None => Self {
                lead: title.to_owned(),
                rest: String::new(),
            },
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lead.is_empty() && self.rest.is_empty()
    }
}
