//! Main Application
//!
//! The App owns both screens of a reading:
//! - **Select**: a circular wheel over the shuffled deck; Space places the
//!   centered card into the next spread position
//! - **Read**: a clamped reviewer over the ten chosen cards beside the live
//!   interpretation of the card being read
//!
//! Carousels are driven directly from terminal events. Frames are ticked at
//! display rate only while something moves or streams; at rest the loop
//! sleeps until the next event.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use futures::{FutureExt, StreamExt};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::backend::Backend;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::{Frame, Terminal};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use arcana_core::{
    ArcanaConfig, BoundaryPolicy, CarouselController, CarouselEvent, Category, Circular, Clamped,
    Deck, Direction, InterpretationBackend, InterpretationRequest, LiveSession, Reading,
    Selection, SelectionError, SpreadPosition, Toggle, TransformBuffer, MAX_SELECTION,
};

use crate::theme;
use crate::widgets::card_strip::{column_to_px, CARD_HEIGHT};
use crate::widgets::{CardFace, CardStrip, PlacedCard, TextBlock, TextBlockState};

/// Frame interval while animating or streaming (~60 Hz)
const ACTIVE_FRAME: Duration = Duration::from_millis(16);

/// Wait between redraws when nothing moves
const IDLE_WAIT: Duration = Duration::from_millis(500);

/// Rows for the card strip, including room for the outer cards' drop
const STRIP_HEIGHT: u16 = CARD_HEIGHT + 3;

/// Lines moved per scroll step in the reading pane
const SCROLL_STEP: i32 = 3;

/// Which screen is showing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Picking cards from the wheel
    Select,
    /// Walking the spread
    Read,
}

/// Reading parameters chosen before the table opens
#[derive(Clone, Debug, Default)]
pub struct AppSettings {
    /// Reading topic
    pub category: Option<Category>,
    /// Querent's situation
    pub situation: String,
    /// Fixed RNG seed for the shuffle and orientation draws
    pub seed: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SessionKind {
    Card,
    Summary,
}

/// A request still waiting for its response headers
struct PendingSession {
    kind: SessionKind,
    task: JoinHandle<LiveSession>,
}

/// Main application state
pub struct App {
    // === Core State ===
    /// Is the app still running?
    running: bool,
    mode: Mode,
    backend: Arc<dyn InterpretationBackend>,
    settings: AppSettings,
    rng: StdRng,

    // === Selection ===
    deck: Deck,
    selection: Selection,
    wheel: CarouselController<Circular>,
    wheel_frame: TransformBuffer,

    // === Reading ===
    reading: Option<Reading>,
    reviewer: CarouselController<Clamped>,
    reviewer_frame: TransformBuffer,
    pending: Option<PendingSession>,
    /// Rendered interpretations of cards already read
    transcripts: Vec<String>,
    pane: TextBlockState,

    // === Misc State ===
    /// Where the strip was last drawn, for pointer hit-testing
    strip_area: Rect,
    status: String,
    epoch: Instant,
}

impl App {
    /// Create an App over `deck`, shuffled once for this table
    pub fn new(
        backend: Arc<dyn InterpretationBackend>,
        deck: &Deck,
        config: &ArcanaConfig,
        settings: AppSettings,
    ) -> Self {
        let mut rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let deck = deck.shuffled(&mut rng);

        let wheel = CarouselController::new(Circular, config.wheel.clone(), deck.len());
        let reviewer = CarouselController::new(Clamped::default(), config.reviewer.clone(), 0);

        let mut app = Self {
            running: true,
            mode: Mode::Select,
            backend,
            settings,
            rng,
            deck,
            selection: Selection::new(),
            wheel,
            wheel_frame: TransformBuffer::new(),
            reading: None,
            reviewer,
            reviewer_frame: TransformBuffer::new(),
            pending: None,
            transcripts: Vec::new(),
            pane: TextBlockState::default(),
            strip_area: Rect::default(),
            status: "Drag or use ←/→ to browse, Space to pick a card".to_string(),
            epoch: Instant::now(),
        };
        refresh(&app.wheel, &mut app.wheel_frame);
        app
    }

    /// Current screen
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether the event loop should keep going
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The shuffled deck on the wheel
    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    /// Cards picked so far
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The reading, once started
    pub fn reading(&self) -> Option<&Reading> {
        self.reading.as_ref()
    }

    /// The selection wheel
    pub fn wheel(&self) -> &CarouselController<Circular> {
        &self.wheel
    }

    /// The spread reviewer
    pub fn reviewer(&self) -> &CarouselController<Clamped> {
        &self.reviewer
    }

    /// Latest status line
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Whether a session request is still waiting for the server
    pub fn is_waiting(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether anything needs per-frame ticks
    pub fn is_active(&self) -> bool {
        let moving = |s: &arcana_core::CarouselState| s.is_animating || s.is_dragging;
        let streaming = self.reading.as_ref().is_some_and(|r| {
            r.interpretation().is_some_and(|l| !l.is_finished())
                || r.summary().is_some_and(|l| !l.is_finished())
        });
        moving(self.wheel.state())
            || moving(self.reviewer.state())
            || self.pending.is_some()
            || streaming
    }

    fn now_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }

    // ========================================================================
    // Event Loop
    // ========================================================================

    /// Main event loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        let mut events = EventStream::new();
        terminal.draw(|frame| self.draw(frame))?;

        while self.running {
            let wait = if self.is_active() {
                ACTIVE_FRAME
            } else {
                IDLE_WAIT
            };

            tokio::select! {
                biased;

                maybe_event = events.next() => match maybe_event {
                    Some(Ok(event)) => {
                        let now = self.now_ms();
                        self.handle_event(event, now);
                    }
                    Some(Err(e)) => warn!(error = %e, "Terminal event error"),
                    None => self.running = false,
                },

                () = tokio::time::sleep(wait) => {}
            }

            let now = self.now_ms();
            self.tick(now);
            terminal.draw(|frame| self.draw(frame))?;
        }

        Ok(())
    }

    /// Dispatch one terminal event
    pub fn handle_event(&mut self, event: Event, now_ms: f64) {
        match event {
            // Only handle Press events (not Release or Repeat)
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse, now_ms),
            _ => {}
        }
    }

    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.quit(),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => self.quit(),
            _ => match self.mode {
                Mode::Select => self.handle_select_key(key.code),
                Mode::Read => self.handle_read_key(key.code),
            },
        }
    }

    fn handle_select_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Left => self.step_wheel(Direction::Previous),
            KeyCode::Right => self.step_wheel(Direction::Next),
            KeyCode::Char(' ') => self.toggle_current(),
            KeyCode::Enter => self.start_reading(),
            _ => {}
        }
    }

    fn handle_read_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Left => self.step_reviewer(Direction::Previous),
            KeyCode::Right => self.step_reviewer(Direction::Next),
            KeyCode::Enter => self.primary_action(),
            KeyCode::Char('s') => self.request_summary(),
            KeyCode::Up => self.pane.scroll(-1),
            KeyCode::Down => self.pane.scroll(1),
            KeyCode::PageUp => self.pane.scroll(-SCROLL_STEP * 3),
            KeyCode::PageDown => self.pane.scroll(SCROLL_STEP * 3),
            _ => {}
        }
    }

    /// Handle mouse input; drags on the card strip move the active carousel
    pub fn handle_mouse(&mut self, mouse: MouseEvent, now_ms: f64) {
        let x = column_to_px(mouse.column);
        let in_strip = mouse.row >= self.strip_area.top() && mouse.row < self.strip_area.bottom();

        match (self.mode, mouse.kind) {
            (Mode::Select, MouseEventKind::Down(MouseButton::Left)) if in_strip => {
                if let Some(event) = self.wheel.on_drag_start(x, now_ms) {
                    self.on_wheel_settled(event);
                }
            }
            (Mode::Select, MouseEventKind::Drag(MouseButton::Left)) => {
                self.wheel.on_drag_move(x, now_ms, &mut self.wheel_frame);
            }
            (Mode::Select, MouseEventKind::Up(MouseButton::Left)) => {
                self.wheel.on_drag_end(now_ms);
            }
            (Mode::Read, MouseEventKind::Down(MouseButton::Left)) if in_strip => {
                if let Some(event) = self.reviewer.on_drag_start(x, now_ms) {
                    self.on_reviewer_settled(event);
                }
            }
            (Mode::Read, MouseEventKind::Drag(MouseButton::Left)) => {
                self.reviewer
                    .on_drag_move(x, now_ms, &mut self.reviewer_frame);
            }
            (Mode::Read, MouseEventKind::Up(MouseButton::Left)) => {
                self.reviewer.on_drag_end(now_ms);
            }
            (Mode::Read, MouseEventKind::ScrollUp) => self.pane.scroll(-SCROLL_STEP),
            (Mode::Read, MouseEventKind::ScrollDown) => self.pane.scroll(SCROLL_STEP),
            _ => {}
        }
    }

    /// Advance animations and drain streams; returns whether a redraw is due
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let mut changed = self.wheel.state().is_animating || self.reviewer.state().is_animating;

        if let Some(event) = self.wheel.tick(now_ms, &mut self.wheel_frame) {
            self.on_wheel_settled(event);
        }
        if let Some(event) = self.reviewer.tick(now_ms, &mut self.reviewer_frame) {
            self.on_reviewer_settled(event);
        }

        changed |= self.poll_pending();
        if let Some(reading) = self.reading.as_mut() {
            changed |= reading.poll();
        }
        changed
    }

    fn quit(&mut self) {
        info!("Leaving the table");
        self.running = false;
    }

    // ========================================================================
    // Select Mode
    // ========================================================================

    fn step_wheel(&mut self, direction: Direction) {
        if let Some(event) = self.wheel.step(direction) {
            self.on_wheel_settled(event);
        }
    }

    fn on_wheel_settled(&mut self, event: CarouselEvent) {
        let CarouselEvent::Settled { index } = event;
        debug!(index, "Wheel settled");
        refresh(&self.wheel, &mut self.wheel_frame);
    }

    fn toggle_current(&mut self) {
        let result = self
            .wheel
            .select_current(self.deck.as_slice(), &mut self.selection, &mut self.rng);

        self.status = match result {
            Ok(Toggle::Added { position, .. }) => {
                let left = self.selection.remaining();
                if left == 0 {
                    format!(
                        "Card placed at {}. {} - the spread is complete, press Enter",
                        position.number(),
                        position.title()
                    )
                } else {
                    format!(
                        "Card placed at {}. {} - {left} to go",
                        position.number(),
                        position.title()
                    )
                }
            }
            Ok(Toggle::Removed { position }) => {
                format!("Card taken back from {}. {}", position.number(), position.title())
            }
            Err(SelectionError::Full { max }) => {
                format!("All {max} cards are chosen - press Enter to begin")
            }
            Err(SelectionError::Busy) => "Let the wheel settle first".to_string(),
            Err(e @ SelectionError::NoCard(_)) => e.to_string(),
        };
    }

    fn start_reading(&mut self) {
        if !self.selection.is_complete() {
            self.status = format!("Pick {} more cards", self.selection.remaining());
            return;
        }

        match Reading::from_selection(
            &self.selection,
            self.settings.category.clone(),
            self.settings.situation.clone(),
        ) {
            Ok(reading) => {
                info!(cards = reading.cards().len(), "Reading started");
                self.transcripts = vec![String::new(); reading.cards().len()];
                self.reviewer.set_len(reading.cards().len());
                self.reviewer.jump_to(0);
                refresh(&self.reviewer, &mut self.reviewer_frame);
                self.reading = Some(reading);
                self.mode = Mode::Read;
                self.pane.reset();
                self.status = "Press Enter to reveal the first card".to_string();
            }
            Err(e) => self.status = e.to_string(),
        }
    }

    // ========================================================================
    // Read Mode
    // ========================================================================

    fn step_reviewer(&mut self, direction: Direction) {
        if let Some(event) = self.reviewer.step(direction) {
            self.on_reviewer_settled(event);
        }
    }

    fn on_reviewer_settled(&mut self, event: CarouselEvent) {
        let CarouselEvent::Settled { index } = event;
        debug!(index, "Reviewer settled");
        refresh(&self.reviewer, &mut self.reviewer_frame);
        self.pane.reset();
    }

    fn show_card(&mut self, index: usize) {
        if self.reviewer.current_index() != index {
            self.reviewer.jump_to(index);
            refresh(&self.reviewer, &mut self.reviewer_frame);
        }
    }

    /// Enter: reveal the current card, move on, or ask for the summary
    fn primary_action(&mut self) {
        if self.pending.is_some() {
            self.status = "Waiting for the reader...".to_string();
            return;
        }
        let Some(reading) = self.reading.as_ref() else {
            return;
        };

        if !reading.is_revealed() {
            self.reveal();
        } else if reading.can_advance() {
            self.advance();
        } else if reading.can_request_summary() && reading.summary().is_none() {
            self.request_summary();
        } else if !reading.interpretation_finished() {
            self.status = "The cards are still speaking...".to_string();
        }
    }

    fn reveal(&mut self) {
        let Some(reading) = self.reading.as_mut() else {
            return;
        };
        let index = reading.current_index();
        let request = match reading.begin_reveal() {
            Ok(request) => request,
            Err(e) => {
                self.status = e.to_string();
                return;
            }
        };
        let name = reading.current_card().card.name.clone();
        let title = reading.position().map_or("", SpreadPosition::title);

        self.status = format!("{}. {title}: {name}", index + 1);
        self.show_card(index);
        self.pane.scroll_to_bottom();
        self.spawn_session(SessionKind::Card, request);
    }

    fn advance(&mut self) {
        let Some(reading) = self.reading.as_mut() else {
            return;
        };
        let index = reading.current_index();
        let html = reading
            .interpretation_mut()
            .map(|live| live.html().to_string())
            .unwrap_or_default();

        match reading.advance() {
            Ok(next) => {
                if let Some(slot) = self.transcripts.get_mut(index) {
                    *slot = html;
                }
                self.status = format!("Press Enter to reveal card {}", next + 1);
                self.show_card(next);
                self.pane.reset();
            }
            Err(e) => self.status = e.to_string(),
        }
    }

    fn request_summary(&mut self) {
        if self.pending.is_some() {
            return;
        }
        let Some(reading) = self.reading.as_mut() else {
            return;
        };
        match reading.begin_summary() {
            Ok(request) => {
                self.status = "Drawing the threads together...".to_string();
                self.pane.scroll_to_bottom();
                self.spawn_session(SessionKind::Summary, request);
            }
            Err(e) => self.status = e.to_string(),
        }
    }

    fn spawn_session(&mut self, kind: SessionKind, request: InterpretationRequest) {
        info!(
            backend = self.backend.name(),
            card_index = request.card_index,
            ?kind,
            "Opening session"
        );
        let backend = Arc::clone(&self.backend);
        let task = tokio::spawn(async move { backend.open_session(&request).await });
        self.pending = Some(PendingSession { kind, task });
    }

    /// Attach a session whose request has been answered
    fn poll_pending(&mut self) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };
        let Some(result) = (&mut pending.task).now_or_never() else {
            return false;
        };
        let kind = pending.kind;
        self.pending = None;

        let live = result.unwrap_or_else(|e| LiveSession::failed(e.to_string()));
        if let Some(reading) = self.reading.as_mut() {
            match kind {
                SessionKind::Card => reading.attach_interpretation(live),
                SessionKind::Summary => reading.attach_summary(live),
            }
        }
        true
    }

    /// HTML for the reading pane and what to show when it is empty
    fn pane_html(&mut self) -> (String, &'static str) {
        let Some(reading) = self.reading.as_mut() else {
            return (String::new(), "");
        };
        if let Some(summary) = reading.summary_mut() {
            return (summary.html().to_string(), "Drawing the threads together...");
        }

        let shown = self.reviewer.current_index();
        let current = reading.current_index();
        if shown < current {
            let html = self.transcripts.get(shown).cloned().unwrap_or_default();
            return (html, "");
        }
        if shown > current {
            return (String::new(), "This card has not been revealed yet");
        }
        if !reading.is_revealed() {
            return (String::new(), "Press Enter to reveal this card");
        }
        match reading.interpretation_mut() {
            Some(live) => (live.html().to_string(), "Listening to the cards..."),
            None => (String::new(), "Listening to the cards..."),
        }
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Render the UI
    pub fn draw(&mut self, frame: &mut Frame) {
        let [title, strip, body, status] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(STRIP_HEIGHT),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(frame.area());
        self.strip_area = strip;

        frame.render_widget(Paragraph::new(self.title_line()), title);

        let cards = match self.mode {
            Mode::Select => self.wheel_cards(),
            Mode::Read => self.reviewer_cards(),
        };
        frame.render_widget(CardStrip::new(cards), strip);

        match self.mode {
            Mode::Select => {
                frame.render_widget(Paragraph::new(self.selection_lines()), body);
            }
            Mode::Read => {
                let (html, placeholder) = self.pane_html();
                frame.render_stateful_widget(
                    TextBlock::new(&html).placeholder(placeholder),
                    body,
                    &mut self.pane,
                );
            }
        }

        frame.render_widget(
            Paragraph::new(Line::styled(self.status.clone(), theme::status())),
            status,
        );
    }

    fn title_line(&self) -> Line<'static> {
        let heading = Span::styled("✦ Arcana ✦  ", theme::heading());
        let detail = match (self.mode, self.reading.as_ref()) {
            (Mode::Read, Some(reading)) => {
                let shown = self.reviewer.current_index();
                let name = SpreadPosition::from_index(shown).map_or("", SpreadPosition::title);
                let total = reading.cards().len();
                format!("{}/{total} {name}", shown + 1)
            }
            _ => format!("Choose your cards {}/{MAX_SELECTION}", self.selection.len()),
        };
        Line::from(vec![heading, Span::styled(detail, Style::default().fg(theme::TEXT))])
    }

    fn wheel_cards(&self) -> Vec<PlacedCard> {
        self.wheel
            .mounted_slots()
            .into_iter()
            .filter_map(|mounted| {
                let transform = *self.wheel_frame.get(mounted.slot)?;
                let card = self.deck.get(mounted.item)?;
                let face = match self.selection.position_of(card.id) {
                    Some(position) => CardFace {
                        title: format!("{}. {}", position.number(), position.title()),
                        chosen: true,
                        ..CardFace::default()
                    },
                    None => CardFace {
                        hidden: true,
                        ..CardFace::default()
                    },
                };
                Some(PlacedCard { transform, face })
            })
            .collect()
    }

    fn reviewer_cards(&self) -> Vec<PlacedCard> {
        let Some(reading) = self.reading.as_ref() else {
            return Vec::new();
        };
        let current = reading.current_index();

        self.reviewer
            .mounted_slots()
            .into_iter()
            .filter_map(|mounted| {
                let transform = *self.reviewer_frame.get(mounted.slot)?;
                let picked = reading.cards().get(mounted.item)?;
                let shown = mounted.item < current
                    || (mounted.item == current && reading.is_revealed());
                let caption = SpreadPosition::from_index(mounted.item)
                    .map(|p| format!("{}. {}", p.number(), p.title()));
                let face = CardFace {
                    title: if shown {
                        picked.card.name.clone()
                    } else {
                        String::new()
                    },
                    caption,
                    chosen: mounted.item == current,
                    reversed: shown && picked.is_reversed(),
                    hidden: !shown,
                };
                Some(PlacedCard { transform, face })
            })
            .collect()
    }

    fn selection_lines(&self) -> Vec<Line<'static>> {
        SpreadPosition::ALL
            .iter()
            .map(|position| {
                let label = format!("{:>2}. {}", position.number(), position.title());
                match self.selection.get(position.index()) {
                    Some(_) => Line::from(vec![
                        Span::styled(label, Style::default().fg(theme::TEXT)),
                        Span::styled("  ✦", Style::default().fg(theme::GOLD)),
                    ]),
                    None => Line::styled(label, Style::default().fg(theme::DIM_GRAY)),
                }
            })
            .collect()
    }
}

/// Re-project a carousel at rest so the buffer holds exactly its mounted slots
fn refresh<B: BoundaryPolicy>(controller: &CarouselController<B>, frame: &mut TransformBuffer) {
    frame.clear();
    controller.project(frame);
}
