//! Dispatches inbound events to the catalog, the favorites store and the
//! pagination engine, and renders the outcome.
//!
//! Every conversation has its own [`ChatState`] lock. Network fetches run
//! without holding it; a fetch only commits if no newer request started in the
//! meantime.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    bot::{
        events::{Command, EventKind, InboundEvent},
        menus,
        sessions::{ChatState, Mode, SessionRegistry},
        transport::{ChatId, ChatTransport},
    },
    db::{AddOutcome, DuplicatePolicy, FavoritesStore},
    error::{AppError, AppResult, FetchError},
    models::{ContentId, MediaKind, ResultItem},
    services::{
        pagination::{BrowseKind, BrowseSession, BROWSE_LIMIT},
        providers::MetadataProvider,
        render::{Action, DisplayPayload, Renderer},
    },
};

/// Where the items of a new browse session come from
#[derive(Debug, Clone, PartialEq, Eq)]
enum BrowseRequest {
    Search(String),
    Popular(MediaKind),
    Similar(ContentId),
    Favorites,
}

impl BrowseRequest {
    fn kind(&self) -> BrowseKind {
        match self {
            BrowseRequest::Search(_) => BrowseKind::Search,
            BrowseRequest::Popular(kind) => BrowseKind::Popular(*kind),
            BrowseRequest::Similar(_) => BrowseKind::Similar,
            BrowseRequest::Favorites => BrowseKind::Favorites,
        }
    }

    /// Screen the "back" control of an empty or failed view leads to
    fn back_to(&self) -> Action {
        match self {
            BrowseRequest::Popular(_) => Action::Recommendations,
            _ => Action::Root,
        }
    }
}

pub struct Controller {
    provider: Arc<dyn MetadataProvider>,
    favorites: FavoritesStore,
    transport: Arc<dyn ChatTransport>,
    renderer: Renderer,
    duplicate_policy: DuplicatePolicy,
    sessions: SessionRegistry,
}

impl Controller {
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        favorites: FavoritesStore,
        transport: Arc<dyn ChatTransport>,
        renderer: Renderer,
        duplicate_policy: DuplicatePolicy,
    ) -> Self {
        Self {
            provider,
            favorites,
            transport,
            renderer,
            duplicate_policy,
            sessions: SessionRegistry::new(),
        }
    }

    /// Handles one event to completion; every failure ends in a rendered
    /// notice or a log line
    pub async fn handle(&self, event: InboundEvent) {
        let InboundEvent {
            chat_id,
            user_id,
            kind,
        } = event;

        if let EventKind::DetachedButton { callback_id } = &kind {
            tracing::debug!(user_id, callback_id = %callback_id, "Button without a chat message");
            self.acknowledge(callback_id, None).await;
            return;
        }

        let chat = self.sessions.get(chat_id).await;

        match kind {
            EventKind::Command(Command::Start) => {
                tracing::info!(chat_id, user_id, "Conversation started");
                let mut state = chat.lock().await;
                state.reset();
                self.render(chat_id, &mut state, menus::root(menus::WELCOME))
                    .await;
            }
            EventKind::Command(command) => {
                tracing::debug!(chat_id, ?command, "Unsupported command");
                self.show_help(chat_id, &chat).await;
            }
            EventKind::Text(text) => {
                let mode = chat.lock().await.mode;
                match mode {
                    Mode::AwaitingSearch if !text.trim().is_empty() => {
                        let query = text.trim().to_string();
                        self.start_browse(chat_id, user_id, &chat, BrowseRequest::Search(query))
                            .await;
                    }
                    Mode::AwaitingSearch => {
                        let mut state = chat.lock().await;
                        self.render(chat_id, &mut state, menus::search_prompt()).await;
                    }
                    Mode::Idle => self.show_help(chat_id, &chat).await,
                }
            }
            EventKind::Button {
                callback_id,
                action: Some(Action::AddFavorite(kind, content_id)),
            } => {
                let toast = self.add_favorite(user_id, kind, content_id).await;
                self.acknowledge(&callback_id, Some(toast)).await;
            }
            EventKind::Button {
                callback_id,
                action: Some(Action::RemoveFavorite(content_id)),
            } => {
                let toast = self.remove_favorite(chat_id, user_id, &chat, content_id).await;
                self.acknowledge(&callback_id, Some(toast)).await;
            }
            EventKind::Button {
                callback_id,
                action: Some(action),
            } => {
                // Ack before any slow fetch so the client stops its spinner
                self.acknowledge(&callback_id, None).await;
                self.on_action(chat_id, user_id, &chat, action).await;
            }
            EventKind::Button {
                callback_id,
                action: None,
            } => {
                tracing::debug!(chat_id, callback_id = %callback_id, "Ignoring unknown button");
                self.acknowledge(&callback_id, None).await;
            }
            EventKind::DetachedButton { .. } => {}
        }
    }

    async fn on_action(
        &self,
        chat_id: ChatId,
        user_id: i64,
        chat: &Mutex<ChatState>,
        action: Action,
    ) {
        match action {
            Action::Search => {
                let mut state = chat.lock().await;
                state.reset();
                state.mode = Mode::AwaitingSearch;
                self.render(chat_id, &mut state, menus::search_prompt()).await;
            }
            Action::RandomMenu => {
                let mut state = chat.lock().await;
                state.begin_request();
                state.mode = Mode::Idle;
                self.render(chat_id, &mut state, menus::random_menu()).await;
            }
            Action::Recommendations => {
                let mut state = chat.lock().await;
                state.begin_request();
                state.mode = Mode::Idle;
                self.render(chat_id, &mut state, menus::recommendations_menu())
                    .await;
            }
            Action::Root => {
                let mut state = chat.lock().await;
                state.reset();
                self.render(chat_id, &mut state, menus::root(menus::MAIN_MENU))
                    .await;
            }
            Action::Favorites => {
                self.start_browse(chat_id, user_id, chat, BrowseRequest::Favorites)
                    .await
            }
            Action::Popular(kind) => {
                self.start_browse(chat_id, user_id, chat, BrowseRequest::Popular(kind))
                    .await
            }
            Action::Similar(content_id) => {
                self.start_browse(chat_id, user_id, chat, BrowseRequest::Similar(content_id))
                    .await
            }
            Action::Next | Action::Prev => {
                let mut state = chat.lock().await;
                let payload = match state.browse.as_mut() {
                    Some(session) => {
                        let moved = match action {
                            Action::Next => session.advance(),
                            _ => session.retreat(),
                        };
                        if moved {
                            Some(self.renderer.session_page(session))
                        } else {
                            None
                        }
                    }
                    None => None,
                };
                // Out-of-range presses leave the current message alone
                if let Some(payload) = payload {
                    self.render(chat_id, &mut state, payload).await;
                }
            }
            Action::Random(kind) => self.random_pick(chat_id, chat, kind).await,
            // answered with a toast in `handle`
            Action::AddFavorite(..) | Action::RemoveFavorite(_) => {}
        }
    }

    async fn show_help(&self, chat_id: ChatId, chat: &Mutex<ChatState>) {
        let mut state = chat.lock().await;
        self.render(chat_id, &mut state, menus::root(menus::HELP)).await;
    }

    /// Fetches a result set and replaces the conversation's browse session
    async fn start_browse(
        &self,
        chat_id: ChatId,
        user_id: i64,
        chat: &Mutex<ChatState>,
        request: BrowseRequest,
    ) {
        let ticket = chat.lock().await.begin_request();

        let fetched = self.fetch_items(user_id, &request).await;

        let mut state = chat.lock().await;
        if !state.is_current(ticket) {
            tracing::debug!(chat_id, ?request, "Discarding superseded result set");
            return;
        }

        if !matches!(request, BrowseRequest::Search(_)) {
            state.mode = Mode::Idle;
        }

        let items = match fetched {
            Ok(items) => items,
            Err(AppError::MalformedResponse(_)) | Err(AppError::Fetch(FetchError::Malformed(_))) => {
                tracing::warn!(chat_id, ?request, "Unreadable provider response, showing no results");
                Vec::new()
            }
            Err(e) => {
                tracing::error!(chat_id, ?request, error = %e, "Failed to load result set");
                state.browse = None;
                let text = match e {
                    AppError::Storage(_) => menus::OPERATION_FAILED,
                    _ => menus::TRY_AGAIN_LATER,
                };
                self.render(chat_id, &mut state, menus::notice(text, request.back_to()))
                    .await;
                return;
            }
        };

        tracing::info!(chat_id, ?request, count = items.len(), "Starting browse session");
        state.browse = BrowseSession::start(user_id, request.kind(), items);

        let payload = match &state.browse {
            Some(session) => self.renderer.session_page(session),
            None if request == BrowseRequest::Favorites => {
                menus::notice(menus::NO_FAVORITES, request.back_to())
            }
            None => menus::notice(menus::NOTHING_FOUND, request.back_to()),
        };
        self.render(chat_id, &mut state, payload).await;
    }

    async fn fetch_items(&self, user_id: i64, request: &BrowseRequest) -> AppResult<Vec<ResultItem>> {
        let mut items = match request {
            BrowseRequest::Search(query) => return self.provider.search(query).await,
            BrowseRequest::Favorites => {
                let entries = self.favorites.list(user_id).await?;
                return Ok(entries.into_iter().map(ResultItem::from).collect());
            }
            BrowseRequest::Popular(kind) => self.provider.popular(*kind).await?,
            BrowseRequest::Similar(content_id) => self.provider.similar(*content_id).await?,
        };
        items.truncate(BROWSE_LIMIT);
        Ok(items)
    }

    async fn random_pick(&self, chat_id: ChatId, chat: &Mutex<ChatState>, kind: MediaKind) {
        let ticket = chat.lock().await.begin_request();

        let picked = self.provider.random(kind).await;

        let mut state = chat.lock().await;
        if !state.is_current(ticket) {
            tracing::debug!(chat_id, %kind, "Discarding superseded random pick");
            return;
        }
        state.mode = Mode::Idle;

        let payload = match picked {
            Ok(Some(item)) => self.renderer.random_pick(&item),
            Ok(None) => menus::notice(menus::NOTHING_FOUND, Action::RandomMenu),
            Err(e) => {
                tracing::error!(chat_id, %kind, error = %e, "Random pick failed");
                menus::notice(menus::TRY_AGAIN_LATER, Action::RandomMenu)
            }
        };
        self.render(chat_id, &mut state, payload).await;
    }

    /// Looks up title and poster, then saves them; returns the toast text
    async fn add_favorite(&self, user_id: i64, kind: MediaKind, content_id: ContentId) -> &'static str {
        let detail = match self.provider.detail(kind, content_id).await {
            Ok(detail) => detail,
            Err(e) => {
                tracing::error!(user_id, content_id, %kind, error = %e, "Detail lookup failed");
                return menus::ADD_FAILED;
            }
        };

        let outcome = self
            .favorites
            .add(
                user_id,
                detail.content_id,
                &detail.title,
                detail.poster_path.as_deref(),
                self.duplicate_policy,
            )
            .await;

        match outcome {
            Ok(AddOutcome::Added) => {
                tracing::info!(user_id, content_id, "Favorite added");
                menus::ADDED
            }
            Ok(AddOutcome::AlreadyPresent) => menus::ALREADY_IN_FAVORITES,
            Err(_) => menus::ADD_FAILED,
        }
    }

    /// Deletes from the store, then from the open favorites view if it shows
    /// this user's list
    async fn remove_favorite(
        &self,
        chat_id: ChatId,
        user_id: i64,
        chat: &Mutex<ChatState>,
        content_id: ContentId,
    ) -> &'static str {
        let mut state = chat.lock().await;

        if self.favorites.remove(user_id, content_id).await.is_err() {
            return menus::REMOVE_FAILED;
        }
        tracing::info!(user_id, content_id, "Favorite removed");

        let payload = match state.browse.take() {
            Some(session)
                if session.kind() == BrowseKind::Favorites && session.owner_user_id() == user_id =>
            {
                match session.remove(content_id) {
                    Some(session) => {
                        let payload = self.renderer.session_page(&session);
                        state.browse = Some(session);
                        payload
                    }
                    None => menus::notice(menus::NO_FAVORITES, Action::Root),
                }
            }
            other => {
                state.browse = other;
                return menus::REMOVED;
            }
        };
        self.render(chat_id, &mut state, payload).await;
        menus::REMOVED
    }

    /// Replaces the conversation's last message with `payload`
    async fn render(&self, chat_id: ChatId, state: &mut ChatState, payload: DisplayPayload) {
        if let Some(previous) = state.last_message.take() {
            if let Err(e) = self.transport.delete(chat_id, previous).await {
                tracing::warn!(chat_id, message_id = previous, error = %e, "Failed to delete previous message");
            }
        }

        match self.transport.send(chat_id, &payload).await {
            Ok(message_id) => state.last_message = Some(message_id),
            Err(e) => tracing::error!(chat_id, error = %e, "Failed to send message"),
        }
    }

    async fn acknowledge(&self, callback_id: &str, text: Option<&str>) {
        if let Err(e) = self.transport.notify(callback_id, text).await {
            tracing::warn!(callback_id = %callback_id, error = %e, "Failed to answer button press");
        }
    }
}
