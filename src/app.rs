use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};
use tracing::{error, info};

use crate::config::GlobeConfig;
use crate::data::{spawn_loader, DataError, DataResult, GeoPoint};
use crate::globe::{Camera, DisplaySettings, GlobeScene, ScenePicker};
use crate::interaction::{Command, Controller};
use crate::ui;

/// Two presses closer than this on the same cell count as a double-click
const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(400);

/// Where the record load stands
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Loaded(usize),
    Failed,
}

/// Turns a stream of presses into single or double clicks
#[derive(Default)]
struct ClickTracker {
    last: Option<(u16, u16, Instant)>,
}

impl ClickTracker {
    /// Record a press; true when it completes a double-click
    fn press(&mut self, col: u16, row: u16, now: Instant) -> bool {
        let double = matches!(
            self.last,
            Some((c, r, at)) if c == col && r == row
                && now.saturating_duration_since(at) <= DOUBLE_CLICK_WINDOW
        );
        self.last = if double { None } else { Some((col, row, now)) };
        double
    }
}

/// Application state
pub struct App {
    pub controller: Controller,
    pub scene: GlobeScene,
    pub camera: Camera,
    pub display: DisplaySettings,
    pub load_state: LoadState,
    pub should_quit: bool,
    /// Terminal size in cells
    pub width: u16,
    pub height: u16,
    loader: Option<Receiver<DataResult<Vec<GeoPoint>>>>,
    pending: Vec<Command>,
    clicks: ClickTracker,
}

impl App {
    /// Start with an empty globe and kick off the background record load
    pub fn new(width: u16, height: u16, config: &GlobeConfig) -> Self {
        let mut app = Self::empty(width, height, config);
        app.loader = Some(spawn_loader(config.data.clone()));
        app
    }

    /// Globe with no records and no pending load
    pub fn empty(width: u16, height: u16, config: &GlobeConfig) -> Self {
        Self {
            controller: Controller::new(config.interaction.clone()),
            scene: GlobeScene::new(config.scene.clone()),
            camera: Camera::default(),
            display: DisplaySettings::default(),
            load_state: LoadState::Loading,
            should_quit: false,
            width,
            height,
            loader: None,
            pending: Vec::new(),
            clicks: ClickTracker::default(),
        }
    }

    /// Update size when terminal resizes
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Queue a command for the next update
    pub fn push(&mut self, command: Command) {
        self.pending.push(command);
    }

    /// Inner rect of the globe pane for the current terminal size
    pub fn globe_area(&self) -> Rect {
        let area = Rect::new(0, 0, self.width, self.height);
        ui::globe_inner(ui::split(area, self.display.show_legend).globe)
    }

    /// Braille pixel size of the globe canvas
    pub fn canvas_size(&self) -> (usize, usize) {
        let inner = self.globe_area();
        (inner.width as usize * 2, inner.height as usize * 4)
    }

    /// Terminal cell to braille pixel (cell centre), relative to the globe canvas.
    /// The second value says whether the cell lies inside the canvas.
    fn cell_to_pixel(&self, col: u16, row: u16) -> (f64, f64, bool) {
        let inner = self.globe_area();
        let inside = col >= inner.x
            && col < inner.x + inner.width
            && row >= inner.y
            && row < inner.y + inner.height;
        let px = (col as f64 - inner.x as f64) * 2.0 + 1.0;
        let py = (row as f64 - inner.y as f64) * 4.0 + 2.0;
        (px, py, inside)
    }

    /// Translate a mouse event into queued commands
    pub fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        let (x, y, inside) = self.cell_to_pixel(mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::Moved => {
                self.push(if inside {
                    Command::PointerMove { x, y }
                } else {
                    Command::PointerLeave
                });
            }
            // Drags keep rotating even past the pane edge
            MouseEventKind::Drag(MouseButton::Left) => self.push(Command::PointerMove { x, y }),
            MouseEventKind::Down(MouseButton::Left) if inside => {
                if self.clicks.press(mouse.column, mouse.row, now) {
                    self.push(Command::DoubleClick { x, y });
                } else {
                    self.push(Command::PointerDown { x, y });
                }
            }
            MouseEventKind::Up(MouseButton::Left) => self.push(Command::PointerUp),
            MouseEventKind::ScrollDown => self.push(Command::Wheel { notches: 1 }),
            MouseEventKind::ScrollUp => self.push(Command::Wheel { notches: -1 }),
            _ => {}
        }
    }

    /// Add loaded records to the scene
    pub fn load_points(&mut self, points: &[GeoPoint]) {
        self.scene.populate(points);
        self.load_state = LoadState::Loaded(self.scene.markers().len());
    }

    /// Check the background loader without blocking
    fn poll_loader(&mut self) {
        let Some(rx) = &self.loader else {
            return;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => Err(DataError::LoaderGone),
        };
        self.loader = None;

        match result {
            Ok(points) => {
                info!(records = points.len(), "records loaded");
                self.load_points(&points);
            }
            Err(e) => {
                // Keep going with an empty globe
                error!(error = %e, "failed to load records");
                self.load_state = LoadState::Failed;
            }
        }
    }

    /// One frame of state: pick up loaded data, apply queued input, advance animation
    pub fn update(&mut self, now: Instant) {
        self.poll_loader();

        let (width, height) = self.canvas_size();
        let commands = std::mem::take(&mut self.pending);
        let picker = ScenePicker {
            scene: &self.scene,
            camera: &self.camera,
            width,
            height,
        };
        self.controller.process(commands, now, &picker);
        self.controller.tick(now);
    }

    /// Heading in degrees for the status bar
    pub fn heading_deg(&self) -> f64 {
        self.controller.orientation().heading.to_degrees()
    }

    /// Tilt in degrees for the status bar
    pub fn tilt_deg(&self) -> f64 {
        self.controller.orientation().tilt.to_degrees()
    }

    /// Short mode label for the status bar
    pub fn mode_label(&self) -> &'static str {
        if self.controller.is_animating() {
            "flying"
        } else if self.controller.is_dragging() {
            "dragging"
        } else {
            "idle"
        }
    }

    /// Data state label for the status bar
    pub fn data_label(&self) -> String {
        match self.load_state {
            LoadState::Loading => "loading…".to_string(),
            LoadState::Loaded(n) => format!("{n} countries"),
            LoadState::Failed => "no data".to_string(),
        }
    }
}
