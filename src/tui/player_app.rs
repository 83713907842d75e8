//! Player TUI application
//!
//! Shows the active subtitle, the log of subtitles displayed so far and a
//! seek bar. All transport commands go through the [`Session`]; render
//! events are drained from it once per tick, in order.

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::app::App;
use super::footer::{render_footer, render_status_line};
use super::progress::{click_to_percent, render_progress};
use super::theme::{current_theme, Theme};
use super::ui::{centered_rect, player_layout};
use crate::player::{HistoryEntry, RenderEvent, Session, SessionError, SessionEvent, SessionState};

/// Sync offset change per `+`/`-` press, in seconds.
pub const OFFSET_STEP: f64 = 0.05;

/// Result of processing an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputResult {
    /// Keep running
    Continue,
    /// Exit the player
    Quit,
}

/// Display options for the player.
#[derive(Debug, Clone)]
pub struct ScreenOptions {
    /// Redraw/input tick
    pub tick_rate: Duration,
    /// Seconds moved by the arrow keys
    pub seek_step: f64,
    /// Start with the history view following new entries
    pub autoscroll: bool,
}

impl Default for ScreenOptions {
    fn default() -> Self {
        Self {
            tick_rate: Duration::from_millis(50),
            seek_step: 5.0,
            autoscroll: true,
        }
    }
}

/// Player state and input handling, independent of the real terminal.
pub struct PlayerScreen {
    session: Session,
    seek_step: f64,
    autoscroll: bool,
    /// First visible history line
    scroll: usize,
    show_help: bool,
    current_text: String,
    history: Vec<HistoryEntry>,
    last: RenderEvent,
    message: Option<(String, bool)>,
    /// Where the seek bar was last drawn, for mouse hit testing
    progress_area: Rect,
}

impl PlayerScreen {
    pub fn new(session: Session, options: &ScreenOptions) -> Self {
        let last = session.snapshot();
        Self {
            session,
            seek_step: options.seek_step,
            autoscroll: options.autoscroll,
            scroll: 0,
            show_help: false,
            current_text: String::new(),
            history: Vec::new(),
            last,
            message: None,
            progress_area: Rect::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn current_text(&self) -> &str {
        &self.current_text
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn autoscroll(&self) -> bool {
        self.autoscroll
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_ref().map(|(text, _)| text.as_str())
    }

    /// Apply every pending session event, in order.
    pub fn apply_events(&mut self) {
        for event in self.session.drain_events() {
            self.apply(event);
        }
    }

    fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Render(render) => {
                if let Some(transition) = &render.transition {
                    self.current_text = transition.text.clone();
                    if let Some(logged) = &transition.appended {
                        self.history.push(logged.clone());
                    }
                }
                self.last = render;
            }
            SessionEvent::EndOfMedia => {
                self.reset_view();
                self.set_message("Finished", false);
            }
            SessionEvent::PollFailed { reason } => {
                self.reset_view();
                self.set_message(&format!("Playback stopped: {}", reason), true);
            }
        }
    }

    /// Handle a key press.
    pub fn handle_key(&mut self, key: KeyEvent) -> InputResult {
        // If help is showing, any key closes it
        if self.show_help {
            self.show_help = false;
            return InputResult::Continue;
        }

        match key.code {
            // === Quit ===
            KeyCode::Char('q') | KeyCode::Esc => return InputResult::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return InputResult::Quit
            }

            KeyCode::Char('?') => self.show_help = true,

            // === Transport ===
            KeyCode::Char(' ') => {
                let result = self.session.toggle_pause();
                if self.report(result) {
                    self.message = None;
                }
                self.last = self.session.snapshot();
            }
            KeyCode::Char('s') => {
                let result = self.session.stop();
                if self.report(result) {
                    self.reset_view();
                    self.set_message("Stopped", false);
                }
            }

            // === Seeking ===
            KeyCode::Left if key.modifiers.contains(KeyModifiers::SHIFT) => {
                let step = self.session.total_duration() * 0.05;
                self.seek_with(|session| session.seek_by(-step));
            }
            KeyCode::Right if key.modifiers.contains(KeyModifiers::SHIFT) => {
                let step = self.session.total_duration() * 0.05;
                self.seek_with(|session| session.seek_by(step));
            }
            KeyCode::Left => {
                let step = self.seek_step;
                self.seek_with(|session| session.seek_by(-step));
            }
            KeyCode::Right => {
                let step = self.seek_step;
                self.seek_with(|session| session.seek_by(step));
            }
            KeyCode::Home => self.seek_with(|session| session.seek(0.0)),

            // === Sync offset ===
            KeyCode::Char('+') | KeyCode::Char('=') => self.adjust_offset(OFFSET_STEP),
            KeyCode::Char('-') | KeyCode::Char('_') => self.adjust_offset(-OFFSET_STEP),

            // === History view ===
            KeyCode::Char('a') => {
                self.autoscroll = !self.autoscroll;
                let state = if self.autoscroll { "on" } else { "off" };
                self.set_message(&format!("Autoscroll {}", state), false);
            }
            KeyCode::Up => {
                self.autoscroll = false;
                self.scroll = self.scroll.saturating_sub(1);
            }
            KeyCode::Down => {
                self.autoscroll = false;
                self.scroll += 1;
            }
            KeyCode::PageUp => {
                self.autoscroll = false;
                self.scroll = self.scroll.saturating_sub(10);
            }
            KeyCode::PageDown => {
                self.autoscroll = false;
                self.scroll += 10;
            }
            _ => {}
        }
        InputResult::Continue
    }

    /// Handle a mouse event: left click on the seek bar seeks there.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
            if !matches!(
                self.session.state(),
                SessionState::Playing | SessionState::Paused
            ) {
                return;
            }
            let label_len = self.last.duration_label.len();
            if let Some(percent) =
                click_to_percent(self.progress_area, label_len, mouse.column, mouse.row)
            {
                self.seek_with(|session| session.seek_percent(percent));
            }
        }
    }

    fn seek_with<F>(&mut self, seek: F)
    where
        F: FnOnce(&mut Session) -> Result<f64, SessionError>,
    {
        let result = seek(&mut self.session);
        if self.report(result) {
            // The session forgot what was shown; the next event repaints
            self.history.clear();
            self.current_text.clear();
            self.scroll = 0;
        }
        self.last = self.session.snapshot();
    }

    fn adjust_offset(&mut self, delta: f64) {
        let offset = self.session.sync_offset() + delta;
        // Keep the displayed value free of float noise
        let offset = (offset * 1000.0).round() / 1000.0;
        self.session.set_sync_offset(offset);
        self.set_message(&format!("Sync offset {:+.2}s", offset), false);
    }

    fn reset_view(&mut self) {
        self.history.clear();
        self.current_text.clear();
        self.scroll = 0;
        self.last = self.session.snapshot();
    }

    fn set_message(&mut self, text: &str, is_error: bool) {
        self.message = Some((text.to_string(), is_error));
    }

    /// Show a command error in the status line. Returns whether it succeeded.
    fn report<T>(&mut self, result: Result<T, SessionError>) -> bool {
        match result {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(error = %e, "Command rejected");
                self.set_message(&e.to_string(), true);
                false
            }
        }
    }

    /// Render the whole screen.
    pub fn render(&mut self, frame: &mut Frame) {
        let theme = current_theme();
        let area = frame.area();
        let layout = player_layout(area);
        self.progress_area = layout.progress;

        frame.render_widget(Paragraph::new(self.header_line(&theme)), layout.header);

        let current = Paragraph::new(self.current_text.clone())
            .style(theme.subtitle_style())
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme.text_secondary_style())
                    .title(format!(" {} ", self.last.time)),
            );
        frame.render_widget(current, layout.current);

        self.render_history(frame, layout.history, &theme);

        render_progress(
            frame,
            layout.progress,
            self.last.seek_percent,
            &self.last.duration_label,
        );

        let (status, is_error) = self.status_text();
        render_status_line(frame, layout.status, &status, is_error);
        render_footer(frame, layout.footer, FOOTER_KEYS);

        if self.show_help {
            render_help_modal(frame, area);
        }
    }

    fn header_line(&self, theme: &Theme) -> Line<'static> {
        let name = |path: Option<&std::path::Path>| {
            path.and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "-".to_string())
        };
        Line::from(vec![
            Span::styled(" srtp ", theme.accent_bold_style()),
            Span::styled("audio: ", theme.text_secondary_style()),
            Span::styled(name(self.session.audio_path()), theme.text_style()),
            Span::styled("  subtitles: ", theme.text_secondary_style()),
            Span::styled(
                format!(
                    "{} ({})",
                    name(self.session.subtitle_path()),
                    self.session.entry_count()
                ),
                theme.text_style(),
            ),
            Span::styled("  offset: ", theme.text_secondary_style()),
            Span::styled(
                format!("{:+.2}s", self.session.sync_offset()),
                theme.text_style(),
            ),
        ])
    }

    fn render_history(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let lines = history_lines(&self.history, theme);
        let visible = area.height.saturating_sub(2) as usize;
        let max_scroll = lines.len().saturating_sub(visible);
        self.scroll = if self.autoscroll {
            max_scroll
        } else {
            self.scroll.min(max_scroll)
        };

        let title = if self.autoscroll {
            " History (autoscroll) "
        } else {
            " History "
        };
        let history = Paragraph::new(lines)
            .scroll((self.scroll as u16, 0))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme.text_secondary_style())
                    .title(title),
            );
        frame.render_widget(history, area);
    }

    fn status_text(&self) -> (String, bool) {
        let state = match self.session.state() {
            SessionState::Idle => "Idle: pass --audio and --srt to load files",
            SessionState::Ready => "\u{25A0} Ready",
            SessionState::Playing => "\u{25B6} Playing",
            SessionState::Paused => "\u{23F8} Paused",
        };
        match &self.message {
            Some((message, is_error)) => (format!(" {} | {}", state, message), *is_error),
            None => (format!(" {}", state), false),
        }
    }
}

const FOOTER_KEYS: &[(&str, &str)] = &[
    ("space", "play/pause"),
    ("s", "stop"),
    ("\u{2190}/\u{2192}", "seek"),
    ("+/-", "offset"),
    ("a", "autoscroll"),
    ("?", "help"),
    ("q", "quit"),
];

/// Timecode line, text lines, blank line per entry.
fn history_lines(history: &[HistoryEntry], theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::with_capacity(history.len() * 3);
    for entry in history {
        lines.push(Line::from(Span::styled(
            entry.timecode.clone(),
            theme.text_secondary_style(),
        )));
        for text in entry.text.lines() {
            lines.push(Line::from(Span::styled(text.to_string(), theme.text_style())));
        }
        lines.push(Line::from(""));
    }
    lines
}

/// Render the help modal overlay.
pub fn render_help_modal(frame: &mut Frame, area: Rect) {
    let theme = current_theme();
    let modal_area = centered_rect(60, 80, area);

    // Clear the area behind the modal
    frame.render_widget(Clear, modal_area);

    let help = Paragraph::new(build_help_text(&theme))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.accent_style())
                .title(" Help "),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(help, modal_area);
}

/// Build the help text lines for the help modal.
fn build_help_text(theme: &Theme) -> Vec<Line<'static>> {
    let key = |k: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<12}", k), theme.accent_style()),
            Span::raw(desc),
        ])
    };
    vec![
        Line::from(Span::styled("Keyboard Shortcuts", theme.accent_bold_style())),
        Line::from(""),
        Line::from(Span::styled("Playback", theme.text_secondary_style())),
        key("space", "Play / pause / resume"),
        key("s", "Stop"),
        key("\u{2190}/\u{2192}", "Seek 5s back/forward"),
        key("Shift+\u{2190}/\u{2192}", "Seek 5% back/forward"),
        key("Home", "Seek to start"),
        key("click bar", "Seek to position"),
        Line::from(""),
        Line::from(Span::styled("Subtitles", theme.text_secondary_style())),
        key("+/-", "Sync offset +/-0.05s"),
        key("a", "Toggle autoscroll"),
        key("\u{2191}/\u{2193} PgUp/Dn", "Scroll history"),
        Line::from(""),
        key("?", "This help"),
        key("q/Esc", "Quit"),
        Line::from(""),
        Line::from(Span::styled("Press any key to close", theme.text_secondary_style())),
    ]
}

/// Full-screen player: terminal plus [`PlayerScreen`].
pub struct PlayerApp {
    app: App,
    screen: PlayerScreen,
}

impl PlayerApp {
    /// Take over the terminal for `session`.
    pub fn new(session: Session, options: &ScreenOptions) -> Result<Self> {
        let app = App::new(options.tick_rate)?;
        Ok(Self {
            app,
            screen: PlayerScreen::new(session, options),
        })
    }

    /// Run until the user quits. Returns the subtitles displayed in the last
    /// playback session.
    #[cfg(not(tarpaulin_include))]
    pub fn run(mut self) -> Result<Vec<HistoryEntry>> {
        loop {
            self.screen.apply_events();

            let screen = &mut self.screen;
            self.app.draw(|frame| screen.render(frame))?;

            match self.app.next_event()? {
                Some(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if self.screen.handle_key(key) == InputResult::Quit {
                        break;
                    }
                }
                Some(Event::Mouse(mouse)) => self.screen.handle_mouse(mouse),
                _ => {}
            }
        }
        Ok(self.screen.history().to_vec())
    }
}
