use std::path::PathBuf;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::clipboard::Clipboard;
use crate::error::{Error, Result};
use crate::export;
use crate::gemini::GeminiClient;

/// Prompt length cap, in characters, enforced at the edit boundary.
pub const MAX_PROMPT_CHARS: usize = 500;

/// How long the copy confirmation stays visible.
pub const COPY_FLASH: Duration = Duration::from_millis(2000);

/// How long a footer notice stays visible.
const NOTICE_TTL: Duration = Duration::from_secs(4);

/// Generation lifecycle. `Failed` keeps any previous result visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
    Ready,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Input,
    Result,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Validation,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    raised_at: Instant,
}

impl Notice {
    fn new(kind: NoticeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            raised_at: Instant::now(),
        }
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,

    // Prompt editing
    pub prompt: String,
    pub prompt_cursor: usize, // cursor position in chars

    // Generation lifecycle
    pub phase: Phase,
    pub result: Option<String>,
    pub generation_task: Option<JoinHandle<Result<String>>>,

    // Result panel scrolling
    pub result_scroll: u16,
    pub result_height: u16,      // viewport height, updated during render
    pub total_result_lines: u16, // updated during render

    // Copy confirmation
    pub has_copied: bool,
    copied_at: Option<Instant>,

    // Footer notice
    pub notice: Option<Notice>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    client: GeminiClient,
    clipboard: Clipboard,
}

impl App {
    pub fn new(client: GeminiClient) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            focus: FocusPane::Input,

            prompt: String::new(),
            prompt_cursor: 0,

            phase: Phase::Idle,
            result: None,
            generation_task: None,

            result_scroll: 0,
            result_height: 0,
            total_result_lines: 0,

            has_copied: false,
            copied_at: None,

            notice: None,

            animation_frame: 0,

            client,
            clipboard: Clipboard::new(),
        }
    }

    pub fn is_generating(&self) -> bool {
        self.phase == Phase::Submitting
    }

    pub fn prompt_char_count(&self) -> usize {
        self.prompt.chars().count()
    }

    // ─────────────────────── Prompt editing ───────────────────────

    pub fn insert_char(&mut self, c: char) {
        if self.prompt_char_count() >= MAX_PROMPT_CHARS {
            return;
        }
        let idx = char_to_byte_index(&self.prompt, self.prompt_cursor);
        self.prompt.insert(idx, c);
        self.prompt_cursor += 1;
    }

    /// Insert pasted text at the cursor. Line breaks become spaces (the
    /// input is a single line, Enter submits) and anything past the limit
    /// is dropped.
    pub fn insert_str(&mut self, text: &str) {
        let remaining = MAX_PROMPT_CHARS.saturating_sub(self.prompt_char_count());
        if remaining == 0 {
            return;
        }

        let cleaned: String = text
            .chars()
            .map(|c| if c.is_whitespace() { ' ' } else { c })
            .filter(|c| !c.is_control())
            .take(remaining)
            .collect();
        if cleaned.is_empty() {
            return;
        }

        let idx = char_to_byte_index(&self.prompt, self.prompt_cursor);
        self.prompt.insert_str(idx, &cleaned);
        self.prompt_cursor += cleaned.chars().count();
    }

    pub fn delete_char(&mut self) {
        if self.prompt_cursor == 0 {
            return;
        }
        let idx = char_to_byte_index(&self.prompt, self.prompt_cursor - 1);
        self.prompt.remove(idx);
        self.prompt_cursor -= 1;
    }

    pub fn delete_char_forward(&mut self) {
        if self.prompt_cursor >= self.prompt_char_count() {
            return;
        }
        let idx = char_to_byte_index(&self.prompt, self.prompt_cursor);
        self.prompt.remove(idx);
    }

    pub fn move_cursor_left(&mut self) {
        self.prompt_cursor = self.prompt_cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        self.prompt_cursor = (self.prompt_cursor + 1).min(self.prompt_char_count());
    }

    pub fn move_cursor_home(&mut self) {
        self.prompt_cursor = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.prompt_cursor = self.prompt_char_count();
    }

    // ─────────────────── Generation lifecycle ────────────────────

    /// Start a generation for the current prompt. Rejected with a notice
    /// when the prompt is blank or another generation is in flight.
    pub fn submit(&mut self) {
        if self.generation_task.is_some() {
            self.notify(NoticeKind::Validation, "Generation already in progress");
            return;
        }
        if self.prompt.trim().is_empty() {
            self.notify(NoticeKind::Validation, "Describe your product first");
            return;
        }

        let client = self.client.clone();
        let prompt = self.prompt.clone();
        info!(chars = prompt.chars().count(), "submitting prompt");

        self.generation_task =
            Some(tokio::spawn(async move { client.generate_prd(&prompt, &[]).await }));
        self.phase = Phase::Submitting;
        self.animation_frame = 0;
    }

    /// Drain a finished generation task, if any. Non-blocking; called once
    /// per event-loop iteration.
    pub async fn poll_generation(&mut self) {
        let finished = self
            .generation_task
            .as_ref()
            .is_some_and(|task| task.is_finished());
        if !finished {
            return;
        }
        let Some(task) = self.generation_task.take() else {
            return;
        };

        match task.await {
            Ok(Ok(text)) => {
                self.result = Some(text);
                self.result_scroll = 0;
                self.phase = Phase::Ready;
                self.notify(NoticeKind::Success, "PRD generated");
            }
            Ok(Err(err)) => {
                warn!(error = %err, "generation failed");
                // Previous result stays untouched.
                self.phase = Phase::Failed;
                self.notify_error(&err);
            }
            Err(join_err) => {
                if join_err.is_cancelled() {
                    return;
                }
                warn!(error = %join_err, "generation task panicked");
                self.phase = Phase::Failed;
                self.notify(NoticeKind::Error, format!("Generation failed: {join_err}"));
            }
        }
    }

    /// Abort the in-flight generation and drop its handle. The request
    /// itself is torn down with the task, so no late response can land.
    pub fn cancel_generation(&mut self) {
        if let Some(task) = self.generation_task.take() {
            task.abort();
            self.phase = if self.result.is_some() {
                Phase::Ready
            } else {
                Phase::Idle
            };
            info!("generation cancelled");
            self.notify(NoticeKind::Validation, "Generation cancelled");
        }
    }

    // ──────────────────────── Side effects ────────────────────────

    pub fn copy_result(&mut self) {
        let Some(text) = self.result.clone() else {
            return;
        };
        match self.clipboard.copy(&text) {
            Ok(()) => {
                self.mark_copied();
                self.notify(NoticeKind::Success, "Copied to clipboard");
            }
            Err(err) => {
                warn!(error = %err, "clipboard copy failed");
                self.notify_error(&err);
            }
        }
    }

    pub fn save_result(&mut self) {
        let Some(text) = self.result.clone() else {
            return;
        };
        let dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        match export::write_prd(&dir, &text) {
            Ok(path) => {
                info!(path = %path.display(), "PRD saved");
                self.notify(NoticeKind::Success, format!("Saved {}", path.display()));
            }
            Err(err) => {
                warn!(error = %err, "PRD save failed");
                self.notify_error(&err);
            }
        }
    }

    fn mark_copied(&mut self) {
        self.has_copied = true;
        self.copied_at = Some(Instant::now());
    }

    fn notify(&mut self, kind: NoticeKind, text: impl Into<String>) {
        self.notice = Some(Notice::new(kind, text));
    }

    fn notify_error(&mut self, err: &Error) {
        let kind = if err.is_validation() {
            NoticeKind::Validation
        } else {
            NoticeKind::Error
        };
        self.notify(kind, err.to_string());
    }

    // ─────────────────────────── Ticking ──────────────────────────

    /// Advance time-driven state (called by the Tick event).
    pub fn tick(&mut self) {
        if self.is_generating() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }

        if let Some(at) = self.copied_at {
            if at.elapsed() >= COPY_FLASH {
                self.has_copied = false;
                self.copied_at = None;
            }
        }

        if let Some(notice) = &self.notice {
            if notice.raised_at.elapsed() >= NOTICE_TTL {
                self.notice = None;
            }
        }
    }

    // ─────────────────────── Result scrolling ─────────────────────

    pub fn scroll_result_up(&mut self, lines: u16) {
        self.result_scroll = self.result_scroll.saturating_sub(lines);
    }

    pub fn scroll_result_down(&mut self, lines: u16) {
        let max = self.total_result_lines.saturating_sub(self.result_height);
        self.result_scroll = (self.result_scroll + lines).min(max);
    }

    pub fn scroll_result_top(&mut self) {
        self.result_scroll = 0;
    }

    pub fn scroll_result_bottom(&mut self) {
        self.result_scroll = self.total_result_lines.saturating_sub(self.result_height);
    }
}

/// Convert a char index into a byte index for string mutation.
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .map(|(i, _)| i)
        .nth(char_idx)
        .unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> App {
        App::new(GeminiClient::new("test-key"))
    }

    #[test]
    fn test_typed_input_clamps_at_limit() {
        let mut app = test_app();
        for _ in 0..600 {
            app.insert_char('a');
        }
        assert_eq!(app.prompt_char_count(), MAX_PROMPT_CHARS);
    }

    #[test]
    fn test_pasted_input_clamps_at_limit() {
        let mut app = test_app();
        app.insert_str(&"x".repeat(300));
        app.insert_str(&"y".repeat(300));
        assert_eq!(app.prompt_char_count(), MAX_PROMPT_CHARS);
        assert!(app.prompt.starts_with("xxx"));
        assert!(app.prompt.ends_with("yyy"));
    }

    #[test]
    fn test_paste_normalizes_line_breaks() {
        let mut app = test_app();
        app.insert_str("a todo\nlist\r\napp");
        assert_eq!(app.prompt, "a todo list  app");
    }

    #[test]
    fn test_multibyte_cursor_editing() {
        let mut app = test_app();
        for c in "héllo".chars() {
            app.insert_char(c);
        }
        app.move_cursor_left();
        app.move_cursor_left();
        app.delete_char(); // removes the first 'l'
        assert_eq!(app.prompt, "hélo");
        app.insert_char('L');
        assert_eq!(app.prompt, "héLlo");
        assert_eq!(app.prompt_cursor, 3);
    }

    #[test]
    fn test_limit_counts_chars_not_bytes() {
        let mut app = test_app();
        app.insert_str(&"é".repeat(600));
        assert_eq!(app.prompt_char_count(), MAX_PROMPT_CHARS);
        assert!(app.prompt.len() > MAX_PROMPT_CHARS); // two bytes per char
    }

    #[test]
    fn test_empty_submit_is_rejected_without_task() {
        let mut app = test_app();
        app.submit();
        assert!(app.generation_task.is_none());
        assert_eq!(app.phase, Phase::Idle);
        let notice = app.notice.as_ref().expect("validation notice");
        assert_eq!(notice.kind, NoticeKind::Validation);
    }

    #[test]
    fn test_whitespace_submit_is_rejected_without_task() {
        let mut app = test_app();
        app.insert_str("   ");
        app.submit();
        assert!(app.generation_task.is_none());
        assert_eq!(app.phase, Phase::Idle);
    }

    #[tokio::test]
    async fn test_submit_is_single_flight() {
        let mut app = test_app();
        app.generation_task = Some(tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(String::new())
        }));
        app.phase = Phase::Submitting;

        app.insert_str("a todo list app");
        app.submit();

        let notice = app.notice.as_ref().expect("rejection notice");
        assert_eq!(notice.kind, NoticeKind::Validation);
        assert_eq!(app.phase, Phase::Submitting);

        app.cancel_generation();
    }

    #[tokio::test]
    async fn test_success_stores_result_verbatim() {
        let mut app = test_app();
        let document = "# Product Overview\n\nA todo list app.\n";
        app.generation_task = Some(tokio::spawn(async move { Ok(document.to_string()) }));
        app.phase = Phase::Submitting;

        wait_for_task(&app).await;
        app.poll_generation().await;

        assert_eq!(app.result.as_deref(), Some(document));
        assert_eq!(app.phase, Phase::Ready);
        assert!(!app.is_generating());
        let notice = app.notice.as_ref().expect("success notice");
        assert_eq!(notice.kind, NoticeKind::Success);
    }

    #[tokio::test]
    async fn test_failure_preserves_previous_result() {
        let mut app = test_app();
        app.result = Some("previous document".to_string());
        app.generation_task =
            Some(tokio::spawn(async { Err(Error::generation("transport down")) }));
        app.phase = Phase::Submitting;

        wait_for_task(&app).await;
        app.poll_generation().await;

        assert_eq!(app.result.as_deref(), Some("previous document"));
        assert_eq!(app.phase, Phase::Failed);
        assert!(!app.is_generating());
        let notice = app.notice.as_ref().expect("error notice");
        assert_eq!(notice.kind, NoticeKind::Error);
    }

    #[tokio::test]
    async fn test_failure_in_fresh_session_leaves_no_result() {
        let mut app = test_app();
        app.generation_task =
            Some(tokio::spawn(async { Err(Error::generation("transport down")) }));
        app.phase = Phase::Submitting;

        wait_for_task(&app).await;
        app.poll_generation().await;

        assert!(app.result.is_none());
        assert_eq!(app.phase, Phase::Failed);
    }

    #[tokio::test]
    async fn test_cancel_aborts_and_restores_phase() {
        let mut app = test_app();
        app.generation_task = Some(tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(String::new())
        }));
        app.phase = Phase::Submitting;

        app.cancel_generation();
        assert!(app.generation_task.is_none());
        assert_eq!(app.phase, Phase::Idle);

        // With an earlier result present, cancel falls back to Ready.
        app.result = Some("kept".to_string());
        app.generation_task = Some(tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(String::new())
        }));
        app.phase = Phase::Submitting;

        app.cancel_generation();
        assert_eq!(app.phase, Phase::Ready);
        assert_eq!(app.result.as_deref(), Some("kept"));
    }

    #[test]
    fn test_copy_flash_expires_after_window() {
        let mut app = test_app();
        app.has_copied = true;
        app.copied_at = Some(Instant::now() - Duration::from_millis(2500));
        app.tick();
        assert!(!app.has_copied);
        assert!(app.copied_at.is_none());
    }

    #[test]
    fn test_copy_flash_survives_within_window() {
        let mut app = test_app();
        app.has_copied = true;
        app.copied_at = Some(Instant::now() - Duration::from_millis(500));
        app.tick();
        assert!(app.has_copied);
    }

    #[test]
    fn test_recopy_resets_flash_window() {
        let mut app = test_app();
        app.has_copied = true;
        app.copied_at = Some(Instant::now() - Duration::from_millis(1900));
        app.mark_copied();
        app.tick();
        assert!(app.has_copied);
    }

    #[test]
    fn test_notice_expires() {
        let mut app = test_app();
        app.notice = Some(Notice::new(NoticeKind::Success, "PRD generated"));
        if let Some(notice) = app.notice.as_mut() {
            notice.raised_at = Instant::now() - Duration::from_secs(5);
        }
        app.tick();
        assert!(app.notice.is_none());
    }

    #[test]
    fn test_tick_animates_only_while_submitting() {
        let mut app = test_app();
        app.tick();
        assert_eq!(app.animation_frame, 0);

        app.phase = Phase::Submitting;
        app.tick();
        app.tick();
        assert_eq!(app.animation_frame, 2);
        app.tick();
        assert_eq!(app.animation_frame, 0);
    }

    #[test]
    fn test_scroll_clamps_to_content() {
        let mut app = test_app();
        app.total_result_lines = 40;
        app.result_height = 10;
        app.scroll_result_down(100);
        assert_eq!(app.result_scroll, 30);
        app.scroll_result_up(5);
        assert_eq!(app.result_scroll, 25);
        app.scroll_result_top();
        assert_eq!(app.result_scroll, 0);
        app.scroll_result_bottom();
        assert_eq!(app.result_scroll, 30);
    }

    #[test]
    fn test_char_to_byte_index() {
        assert_eq!(char_to_byte_index("héllo", 0), 0);
        assert_eq!(char_to_byte_index("héllo", 1), 1);
        assert_eq!(char_to_byte_index("héllo", 2), 3);
        assert_eq!(char_to_byte_index("héllo", 10), 6);
    }

    async fn wait_for_task(app: &App) {
        for _ in 0..1000 {
            let done = app
                .generation_task
                .as_ref()
                .is_some_and(|task| task.is_finished());
            if done {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("generation task never finished");
    }
}
