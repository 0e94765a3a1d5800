//! Turns session state into transport-neutral display payloads.

use std::fmt::Display;
use std::str::FromStr;

use crate::{
    models::{ContentId, MediaKind, ResultItem},
    services::pagination::{BrowseKind, BrowseSession},
};

/// Everything a button can ask the bot to do
///
/// The string form is the opaque identifier carried by chat buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Search,
    RandomMenu,
    Random(MediaKind),
    Favorites,
    Recommendations,
    Popular(MediaKind),
    Similar(ContentId),
    Next,
    Prev,
    Root,
    AddFavorite(MediaKind, ContentId),
    RemoveFavorite(ContentId),
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Search => write!(f, "search"),
            Action::RandomMenu => write!(f, "random"),
            Action::Random(kind) => write!(f, "random:{}", kind),
            Action::Favorites => write!(f, "favorites"),
            Action::Recommendations => write!(f, "recommendations"),
            Action::Popular(kind) => write!(f, "popular:{}", kind),
            Action::Similar(id) => write!(f, "similar:{}", id),
            Action::Next => write!(f, "next"),
            Action::Prev => write!(f, "prev"),
            Action::Root => write!(f, "root"),
            Action::AddFavorite(kind, id) => write!(f, "fav_add:{}:{}", kind, id),
            Action::RemoveFavorite(id) => write!(f, "fav_rm:{}", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown button identifier: {0}")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownAction(s.to_string());
        let parts: Vec<&str> = s.split(':').collect();
        let kind = |segment: &str| MediaKind::from_path(segment).ok_or_else(unknown);
        let id = |segment: &str| segment.parse::<ContentId>().map_err(|_| unknown());

        match parts.as_slice() {
            ["search"] => Ok(Action::Search),
            ["random"] => Ok(Action::RandomMenu),
            ["random", k] => Ok(Action::Random(kind(k)?)),
            ["favorites"] => Ok(Action::Favorites),
            ["recommendations"] => Ok(Action::Recommendations),
            ["popular", k] => Ok(Action::Popular(kind(k)?)),
            ["similar", i] => Ok(Action::Similar(id(i)?)),
            ["next"] => Ok(Action::Next),
            ["prev"] => Ok(Action::Prev),
            ["root"] => Ok(Action::Root),
            ["fav_add", k, i] => Ok(Action::AddFavorite(kind(k)?, id(i)?)),
            ["fav_rm", i] => Ok(Action::RemoveFavorite(id(i)?)),
            _ => Err(unknown()),
        }
    }
}

/// A labelled button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub label: String,
    pub action: Action,
}

impl Control {
    pub fn new(label: &str, action: Action) -> Self {
        Self {
            label: label.to_string(),
            action,
        }
    }
}

/// Text (or photo caption) plus a grid of controls, one inner vec per row
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayPayload {
    pub text: String,
    pub photo_url: Option<String>,
    pub controls: Vec<Vec<Control>>,
}

impl DisplayPayload {
    pub fn text(text: impl Into<String>, controls: Vec<Vec<Control>>) -> Self {
        Self {
            text: text.into(),
            photo_url: None,
            controls,
        }
    }

    /// Flattened view of every control, for lookups
    pub fn actions(&self) -> Vec<Action> {
        self.controls.iter().flatten().map(|c| c.action).collect()
    }
}

/// Builds item views; owns the image host prefix for poster URLs
#[derive(Debug, Clone)]
pub struct Renderer {
    image_base_url: String,
}

impl Renderer {
    pub fn new(image_base_url: impl Into<String>) -> Self {
        Self {
            image_base_url: image_base_url.into(),
        }
    }

    pub fn poster_url(&self, poster_path: Option<&str>) -> Option<String> {
        poster_path.map(|path| format!("{}{}", self.image_base_url.trim_end_matches('/'), path))
    }

    /// Current item of a session with its "i of n" header and navigation row
    pub fn session_page(&self, session: &BrowseSession) -> DisplayPayload {
        let item = session.current();
        let header = format!(
            "{} ({} of {}):",
            session.kind().label(),
            session.cursor() + 1,
            session.len()
        );

        let mut controls = item_actions(session.kind(), item);

        let mut nav = Vec::new();
        if session.has_prev() {
            nav.push(Control::new("◀️ Previous", Action::Prev));
        }
        if session.has_next() {
            nav.push(Control::new("Next ▶️", Action::Next));
        }
        nav.push(Control::new("🏠 Main menu", Action::Root));
        controls.push(nav);

        DisplayPayload {
            text: format!("{}\n\n{}", header, describe(item)),
            photo_url: self.poster_url(item.poster_path.as_deref()),
            controls,
        }
    }

    /// Stand-alone random pick with "another one" and "back" controls
    pub fn random_pick(&self, item: &ResultItem) -> DisplayPayload {
        let header = match item.media_kind {
            MediaKind::Movie => "🎲 Random movie:",
            MediaKind::Tv => "🎲 Random TV show:",
        };
        let another = match item.media_kind {
            MediaKind::Movie => "🎲 Another movie",
            MediaKind::Tv => "🎲 Another TV show",
        };

        DisplayPayload {
            text: format!("{}\n\n{}", header, describe(item)),
            photo_url: self.poster_url(item.poster_path.as_deref()),
            controls: vec![
                vec![Control::new(
                    "⭐ Add to favorites",
                    Action::AddFavorite(item.media_kind, item.content_id),
                )],
                vec![Control::new(another, Action::Random(item.media_kind))],
                vec![Control::new("◀️ Back", Action::RandomMenu)],
            ],
        }
    }
}

/// Content-specific controls, keyed by the item's id
fn item_actions(kind: BrowseKind, item: &ResultItem) -> Vec<Vec<Control>> {
    let add = Control::new(
        "⭐ Add to favorites",
        Action::AddFavorite(item.media_kind, item.content_id),
    );

    match kind {
        BrowseKind::Favorites => vec![vec![Control::new(
            "❌ Remove from favorites",
            Action::RemoveFavorite(item.content_id),
        )]],
        // similar lists only exist for movies
        BrowseKind::Search if item.media_kind == MediaKind::Movie => vec![
            vec![add],
            vec![Control::new("📺 Similar movies", Action::Similar(item.content_id))],
        ],
        _ => vec![vec![add]],
    }
}

fn describe(item: &ResultItem) -> String {
    let year = item
        .release_year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let rating = item
        .rating
        .map(|r| format!("{:.1}/10", r))
        .unwrap_or_else(|| "none".to_string());
    let synopsis = item.synopsis.as_deref().unwrap_or("No description");

    format!(
        "🎬 {}\n📅 Year: {}\n⭐ Rating: {}\n📝 {}",
        item.title, year, rating, synopsis
    )
}
