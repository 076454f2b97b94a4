use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::link;
use crate::message_store::{ChatMessage, MessageStore, Sender};
use crate::questionnaire::IntakeForm;
use crate::roadmap::{RoadmapData, RoadmapView};
use crate::transport::TransportError;

pub const NO_SESSION_TEXT: &str = "Error: No valid session ID found.";
pub const HISTORY_FAILED_TEXT: &str = "Failed to load message history.";
pub const SEND_FAILED_TEXT: &str = "I'm sorry, an error occurred. Please try again.";
pub const UPLOAD_FAILED_TEXT: &str =
    "Sorry, there was a problem uploading your file. Please try again.";
pub const ROADMAP_FAILED_TEXT: &str =
    "Could not load your career roadmap. Please try again later.";
pub const NO_SESSION_ROADMAP_TEXT: &str = "No session data found.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Questionnaire,
    Loading,
    Chat,
    Roadmap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAttachment {
    pub path: PathBuf,
    pub name: String,
}

/// What the next send round trip carries, decided at submit time. A pending
/// attachment and composed text are mutually exclusive; the attachment wins.
#[derive(Debug, PartialEq, Eq)]
pub enum ComposeAction {
    Text(String),
    Attachment(PendingAttachment),
}

#[derive(Debug, PartialEq, Eq)]
pub struct HistoryRequest {
    pub session_id: String,
    pub generation: u64,
}

/// Top-level state machine: stage sequencing (questionnaire → loading → chat
/// → roadmap), the active session, and the chat exchange state. Methods
/// mutate state and hand request descriptors back to the event loop; no I/O
/// happens here.
#[derive(Debug)]
pub struct App {
    pub running: bool,
    ticks: u64,
    stage: Stage,
    session: Option<SessionData>,
    intake: IntakeForm,
    loading_deadline: Option<Instant>,
    store: MessageStore,
    compose: String,
    compose_cursor: usize,
    pending_attachment: Option<PendingAttachment>,
    in_flight: bool,
    history_loading: bool,
    history_generation: u64,
    turn_generation: u64,
    chat_scroll: u16,
    roadmap: RoadmapView,
    roadmap_scroll: u16,
}

impl Default for App {
    fn default() -> Self {
        Self {
            running: true,
            ticks: 0,
            stage: Stage::Questionnaire,
            session: None,
            intake: IntakeForm::default(),
            loading_deadline: None,
            store: MessageStore::default(),
            compose: String::new(),
            compose_cursor: 0,
            pending_attachment: None,
            in_flight: false,
            history_loading: false,
            history_generation: 0,
            turn_generation: 0,
            chat_scroll: 0,
            roadmap: RoadmapView::default(),
            roadmap_scroll: 0,
        }
    }
}

impl App {
    pub fn on_tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session.as_ref().map(|session| session.session_id.as_str())
    }

    pub fn intake(&self) -> &IntakeForm {
        &self.intake
    }

    pub fn intake_mut(&mut self) -> &mut IntakeForm {
        &mut self.intake
    }

    // --- stage transitions ---

    /// Questionnaire → Loading, carrying the server-assigned session. Arms
    /// the fixed loading deadline; any transition out of Loading clears it,
    /// so a torn-down loading stage leaves no dangling effect.
    pub fn complete_intake(&mut self, session_id: String, delay: Duration, now: Instant) {
        if self.stage != Stage::Questionnaire {
            return;
        }
        tracing::info!("intake accepted, session {session_id}");
        self.session = Some(SessionData { session_id });
        self.stage = Stage::Loading;
        self.loading_deadline = Some(now + delay);
        self.store.clear();
        self.reset_compose();
        self.pending_attachment = None;
        self.in_flight = false;
        self.roadmap = RoadmapView::default();
    }

    /// Loading → Chat once the deadline elapses; fires at most once per entry
    /// and immediately requests the history load.
    pub fn advance_loading_if_elapsed(&mut self, now: Instant) -> Option<HistoryRequest> {
        if self.stage != Stage::Loading {
            return None;
        }
        let deadline = self.loading_deadline?;
        if now < deadline {
            return None;
        }
        self.loading_deadline = None;
        self.stage = Stage::Chat;
        self.begin_history_load()
    }

    /// Chat → Roadmap when the user activates the roadmap affordance. No
    /// network call for the transition itself; returns the session id the
    /// roadmap view should fetch with.
    pub fn open_roadmap(&mut self) -> Option<String> {
        if self.stage != Stage::Chat {
            return None;
        }
        self.stage = Stage::Roadmap;
        self.roadmap_scroll = 0;
        match &self.session {
            Some(session) => {
                self.roadmap = RoadmapView::Loading;
                Some(session.session_id.clone())
            }
            None => {
                self.roadmap = RoadmapView::Failed(NO_SESSION_ROADMAP_TEXT.to_string());
                None
            }
        }
    }

    /// Roadmap → Questionnaire, discarding the session and everything scoped
    /// to it. Bumping both generations orphans any still-outstanding history
    /// load, send, or upload.
    pub fn start_new_session(&mut self) {
        if self.stage != Stage::Roadmap {
            return;
        }
        tracing::info!("starting a new session");
        self.stage = Stage::Questionnaire;
        self.session = None;
        self.intake = IntakeForm::default();
        self.loading_deadline = None;
        self.store.clear();
        self.reset_compose();
        self.pending_attachment = None;
        self.in_flight = false;
        self.history_loading = false;
        self.history_generation += 1;
        self.turn_generation += 1;
        self.chat_scroll = 0;
        self.roadmap = RoadmapView::default();
        self.roadmap_scroll = 0;
    }

    // --- history ---

    /// With no session this fails fast with a local placeholder; otherwise it
    /// tags the request with a fresh generation so a result that arrives
    /// after a session change is recognizably stale.
    pub fn begin_history_load(&mut self) -> Option<HistoryRequest> {
        self.history_generation += 1;
        let Some(session) = &self.session else {
            self.store.replace_all(vec![ChatMessage {
                message_id: "error".to_string(),
                sender: Sender::Ai,
                text: NO_SESSION_TEXT.to_string(),
                timestamp: None,
            }]);
            self.history_loading = false;
            return None;
        };
        self.history_loading = true;
        Some(HistoryRequest {
            session_id: session.session_id.clone(),
            generation: self.history_generation,
        })
    }

    pub fn apply_history_result(
        &mut self,
        generation: u64,
        result: Result<Vec<ChatMessage>, TransportError>,
    ) {
        if generation != self.history_generation {
            tracing::debug!("dropping stale history result (generation {generation})");
            return;
        }
        self.history_loading = false;
        match result {
            Ok(messages) => self.store.replace_all(messages),
            Err(_) => self.store.replace_all(vec![ChatMessage {
                message_id: "error_fetch".to_string(),
                sender: Sender::Ai,
                text: HISTORY_FAILED_TEXT.to_string(),
                timestamp: None,
            }]),
        }
    }

    // --- compose / send ---

    pub fn compose(&self) -> &str {
        &self.compose
    }

    pub fn compose_cursor(&self) -> usize {
        self.compose_cursor
    }

    // Compose editing is closed while a round trip or the history load is
    // outstanding, same as attachment selection and submit.
    pub fn input_char(&mut self, c: char) {
        if self.in_flight || self.history_loading {
            return;
        }
        let byte_idx = char_to_byte_idx(&self.compose, self.compose_cursor);
        self.compose.insert(byte_idx, c);
        self.compose_cursor = self.compose_cursor.saturating_add(1);
    }

    pub fn backspace_input(&mut self) {
        if self.in_flight || self.history_loading || self.compose_cursor == 0 {
            return;
        }
        let start = char_to_byte_idx(&self.compose, self.compose_cursor.saturating_sub(1));
        let end = char_to_byte_idx(&self.compose, self.compose_cursor);
        self.compose.drain(start..end);
        self.compose_cursor = self.compose_cursor.saturating_sub(1);
    }

    pub fn move_cursor_left(&mut self) {
        self.compose_cursor = self.compose_cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        let char_len = self.compose.chars().count();
        self.compose_cursor = (self.compose_cursor + 1).min(char_len);
    }

    fn reset_compose(&mut self) {
        self.compose.clear();
        self.compose_cursor = 0;
    }

    fn set_compose(&mut self, text: String) {
        self.compose_cursor = text.chars().count();
        self.compose = text;
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn is_history_loading(&self) -> bool {
        self.history_loading
    }

    pub fn pending_attachment(&self) -> Option<&PendingAttachment> {
        self.pending_attachment.as_ref()
    }

    /// Records the attachment and mirrors the file name into the compose
    /// buffer for confirmation; the upload happens on the next submit.
    pub fn select_attachment(&mut self, path: PathBuf) {
        if self.in_flight || self.history_loading {
            return;
        }
        let name = path
            .file_name()
            .map(|value| value.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.set_compose(format!("File selected: {name}"));
        self.pending_attachment = Some(PendingAttachment { path, name });
    }

    /// Generation the current turn was dispatched with. Each submit stamps a
    /// fresh one; starting a new session bumps it, so a reply that crosses a
    /// session boundary is recognizably stale.
    pub fn turn_generation(&self) -> u64 {
        self.turn_generation
    }

    /// Gate and dispatch the next turn. No-op while a round trip is
    /// outstanding, while history is loading, without a session, or with
    /// nothing to send. The text path appends the optimistic local echo
    /// before any network activity.
    pub fn submit_compose(&mut self) -> Option<ComposeAction> {
        if self.in_flight || self.history_loading || self.session.is_none() {
            return None;
        }
        if let Some(attachment) = self.pending_attachment.clone() {
            self.set_compose(format!("Uploading: {}", attachment.name));
            self.in_flight = true;
            self.turn_generation += 1;
            return Some(ComposeAction::Attachment(attachment));
        }
        let text = self.compose.trim().to_string();
        if text.is_empty() {
            return None;
        }
        self.store.append(ChatMessage::local_user("user", text.clone()));
        self.reset_compose();
        self.in_flight = true;
        self.turn_generation += 1;
        Some(ComposeAction::Text(text))
    }

    pub fn apply_send_result(
        &mut self,
        generation: u64,
        result: Result<ChatMessage, TransportError>,
    ) {
        if generation != self.turn_generation {
            tracing::debug!("dropping stale send result (generation {generation})");
            return;
        }
        match result {
            Ok(reply) => self.store.append(reply),
            Err(_) => self.store.append(ChatMessage::local_ai_error(SEND_FAILED_TEXT)),
        }
        self.in_flight = false;
    }

    /// The conversation log records what was attempted, not just what
    /// succeeded: both outcomes append a user-sender entry for the file.
    pub fn apply_upload_result(
        &mut self,
        file_name: &str,
        generation: u64,
        result: Result<ChatMessage, TransportError>,
    ) {
        if generation != self.turn_generation {
            tracing::debug!("dropping stale upload result (generation {generation})");
            return;
        }
        match result {
            Ok(reply) => {
                self.store
                    .append(ChatMessage::local_user("user_file", format!("You sent a file: {file_name}")));
                self.store.append(reply);
            }
            Err(_) => {
                self.store.append(ChatMessage::local_user(
                    "user_file",
                    format!("Failed to send file: {file_name}"),
                ));
                self.store.append(ChatMessage::local_ai_error(UPLOAD_FAILED_TEXT));
            }
        }
        self.pending_attachment = None;
        self.reset_compose();
        self.in_flight = false;
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.store.messages()
    }

    #[cfg(test)]
    pub fn message_count(&self) -> usize {
        self.store.len()
    }

    /// True when any AI reply in the log carries the roadmap sentinel.
    /// User-sender messages are never scanned.
    pub fn has_roadmap_link(&self) -> bool {
        self.store
            .messages()
            .iter()
            .any(|message| message.sender == Sender::Ai && link::contains_roadmap_link(&message.text))
    }

    // --- roadmap ---

    pub fn roadmap_view(&self) -> &RoadmapView {
        &self.roadmap
    }

    pub fn apply_roadmap_result(&mut self, result: Result<RoadmapData, TransportError>) {
        if self.stage != Stage::Roadmap {
            return;
        }
        self.roadmap = match result {
            Ok(data) => RoadmapView::Ready(data),
            Err(_) => RoadmapView::Failed(ROADMAP_FAILED_TEXT.to_string()),
        };
    }

    // --- scrolling ---

    pub fn chat_scroll(&self) -> u16 {
        self.chat_scroll
    }

    pub fn set_chat_scroll(&mut self, scroll: u16) {
        self.chat_scroll = scroll;
    }

    pub fn scroll_chat_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_chat_down(&mut self, max_scroll: u16) {
        self.chat_scroll = (self.chat_scroll + 1).min(max_scroll);
    }

    pub fn roadmap_scroll(&self) -> u16 {
        self.roadmap_scroll
    }

    pub fn scroll_roadmap_up(&mut self) {
        self.roadmap_scroll = self.roadmap_scroll.saturating_sub(1);
    }

    pub fn scroll_roadmap_down(&mut self, max_scroll: u16) {
        self.roadmap_scroll = (self.roadmap_scroll + 1).min(max_scroll);
    }
}

fn char_to_byte_idx(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(byte_idx, _)| byte_idx)
        .unwrap_or(s.len())
}

#[cfg(test)]
#[path = "../tests/unit/app_tests.rs"]
mod tests;
