//! Fixed screens and notices that do not depend on fetched content.

use crate::{
    models::MediaKind,
    services::render::{Action, Control, DisplayPayload},
};

pub const WELCOME: &str = "👋 Hi! I can help you find movies and TV shows.\n\nChoose an option:";
pub const MAIN_MENU: &str = "Choose an option:";
pub const HELP: &str = "Use the menu below, or send /start to begin again.";
pub const SEARCH_PROMPT: &str = "🔍 Enter a movie or TV show title:";
pub const NOTHING_FOUND: &str = "😔 Nothing found.";
pub const TRY_AGAIN_LATER: &str = "⚠️ The movie database is not responding. Please try again later.";
pub const NO_FAVORITES: &str = "⭐ You have no favorites yet.";
pub const OPERATION_FAILED: &str = "❌ Operation failed. Please try again.";

pub const ADDED: &str = "⭐ Added to favorites!";
pub const ALREADY_IN_FAVORITES: &str = "Already in favorites";
pub const REMOVED: &str = "Removed from favorites";
pub const ADD_FAILED: &str = "Could not add to favorites";
pub const REMOVE_FAILED: &str = "Could not remove from favorites";

fn back(to: Action) -> Vec<Control> {
    vec![Control::new("◀️ Back", to)]
}

pub fn root(text: &str) -> DisplayPayload {
    DisplayPayload::text(
        text,
        vec![
            vec![Control::new("🔍 Search", Action::Search)],
            vec![Control::new("🎲 Random pick", Action::RandomMenu)],
            vec![Control::new("⭐ Favorites", Action::Favorites)],
            vec![Control::new("📺 Recommendations", Action::Recommendations)],
        ],
    )
}

pub fn random_menu() -> DisplayPayload {
    DisplayPayload::text(
        "🎲 What should I pick?",
        vec![
            vec![Control::new("🎬 Movie", Action::Random(MediaKind::Movie))],
            vec![Control::new("📺 TV show", Action::Random(MediaKind::Tv))],
            back(Action::Root),
        ],
    )
}

pub fn recommendations_menu() -> DisplayPayload {
    DisplayPayload::text(
        "📺 Recommendations:",
        vec![
            vec![Control::new("🎬 Popular movies", Action::Popular(MediaKind::Movie))],
            vec![Control::new("📺 Popular TV shows", Action::Popular(MediaKind::Tv))],
            back(Action::Root),
        ],
    )
}

pub fn search_prompt() -> DisplayPayload {
    DisplayPayload::text(SEARCH_PROMPT, vec![back(Action::Root)])
}

/// A notice with a single back control, used for empty and failed views
pub fn notice(text: &str, back_to: Action) -> DisplayPayload {
    DisplayPayload::text(text, vec![back(back_to)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_menu_entries() {
        assert_eq!(
            root(WELCOME).actions(),
            vec![
                Action::Search,
                Action::RandomMenu,
                Action::Favorites,
                Action::Recommendations
            ]
        );
    }

    #[test]
    fn test_submenus_lead_back_to_root() {
        assert_eq!(random_menu().actions().last(), Some(&Action::Root));
        assert_eq!(recommendations_menu().actions().last(), Some(&Action::Root));
        assert_eq!(search_prompt().actions(), vec![Action::Root]);
    }

    #[test]
    fn test_notice_has_no_paging_controls() {
        let payload = notice(NO_FAVORITES, Action::Root);
        assert_eq!(payload.text, NO_FAVORITES);
        assert_eq!(payload.photo_url, None);
        assert_eq!(payload.actions(), vec![Action::Root]);
    }
}
