use std::time::{Duration, Instant};
use tracing::debug;

use crate::globe::camera::Orientation;
use crate::globe::projection::normalize_angle;
use crate::interaction::animation::{FlyTo, FLY_DURATION};

/// Input, already translated to globe-pane pixel coordinates.
/// Queued by the event loop and applied once per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp,
    /// Pointer left the globe pane
    PointerLeave,
    DoubleClick { x: f64, y: f64 },
    /// Wheel notches; positive is scrolling down
    Wheel { notches: i32 },
    /// Keyboard heading nudge
    Rotate { steps: i32 },
    /// Keyboard tilt nudge
    Tilt { steps: i32 },
    ResetView,
}

/// What a pick under the pointer found
#[derive(Clone, Debug, PartialEq)]
pub struct Pick {
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

/// Finds the nearest marker under a pointer for a given globe orientation
pub trait MarkerPicker {
    fn pick(&self, orientation: Orientation, x: f64, y: f64) -> Option<Pick>;
}

/// Hover label anchored at a pointer position (pane pixels)
#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

impl Tooltip {
    fn for_pick(pick: &Pick, x: f64, y: f64) -> Self {
        Self {
            text: format!("{}\n<{:.2},{:.2}>", pick.country, pick.lat, pick.lon),
            x,
            y,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Mode {
    Idle,
    Animating(FlyTo),
}

/// Tunables for pointer and keyboard input
#[derive(Clone, Debug)]
pub struct InteractionSettings {
    /// Radians of heading per pixel of horizontal drag
    pub drag_sensitivity: f64,
    /// Radians of tilt per wheel notch
    pub tilt_step: f64,
    /// Radians of heading per arrow key press
    pub key_rotate_step: f64,
    pub fly_duration: Duration,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            drag_sensitivity: 0.02,
            tilt_step: 10f64.to_radians(),
            key_rotate_step: 10f64.to_radians(),
            fly_duration: FLY_DURATION,
        }
    }
}

/// Everything pointer input can change
#[derive(Clone, Debug)]
pub struct InteractionState {
    pub orientation: Orientation,
    /// Last pointer x while dragging
    pub drag_anchor: Option<f64>,
    pub mode: Mode,
    pub tooltip: Option<Tooltip>,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self {
            orientation: Orientation::default(),
            drag_anchor: None,
            mode: Mode::Idle,
            tooltip: None,
        }
    }
}

/// Applies queued commands to the interaction state.
///
/// While a fly-to is running every command is dropped except pointer-up,
/// which only ends a drag. The animation always runs to completion.
pub struct Controller {
    state: InteractionState,
    settings: InteractionSettings,
}

impl Controller {
    pub fn new(settings: InteractionSettings) -> Self {
        Self {
            state: InteractionState::default(),
            settings,
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn orientation(&self) -> Orientation {
        self.state.orientation
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.state.tooltip.as_ref()
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.state.mode, Mode::Animating(_))
    }

    pub fn is_dragging(&self) -> bool {
        self.state.drag_anchor.is_some()
    }

    /// Apply every queued command in order
    pub fn process<P: MarkerPicker>(
        &mut self,
        commands: impl IntoIterator<Item = Command>,
        now: Instant,
        picker: &P,
    ) {
        for command in commands {
            self.apply(command, now, picker);
        }
    }

    pub fn apply<P: MarkerPicker>(&mut self, command: Command, now: Instant, picker: &P) {
        if self.is_animating() {
            // Releasing the button cannot write the heading; let it end the drag
            if command == Command::PointerUp {
                self.state.drag_anchor = None;
            }
            return;
        }

        match command {
            Command::PointerDown { x, .. } => {
                self.state.drag_anchor = Some(x);
            }
            Command::PointerMove { x, y } => {
                if let Some(last_x) = self.state.drag_anchor {
                    let heading = self.state.orientation.heading + (x - last_x) * self.settings.drag_sensitivity;
                    self.state.orientation.heading = normalize_angle(heading);
                    self.state.drag_anchor = Some(x);
                }
                self.hover(x, y, picker);
            }
            Command::PointerUp => {
                self.state.drag_anchor = None;
            }
            Command::PointerLeave => {
                self.state.tooltip = None;
            }
            Command::DoubleClick { x, y } => {
                if let Some(pick) = picker.pick(self.state.orientation, x, y) {
                    self.start_fly_to(&pick, now);
                }
            }
            Command::Wheel { notches } => {
                if notches != 0 {
                    let tilt = self.state.orientation.tilt - self.settings.tilt_step * notches.signum() as f64;
                    self.state.orientation.tilt = normalize_angle(tilt);
                }
            }
            Command::Rotate { steps } => {
                let heading = self.state.orientation.heading + self.settings.key_rotate_step * steps as f64;
                self.state.orientation.heading = normalize_angle(heading);
            }
            Command::Tilt { steps } => {
                let tilt = self.state.orientation.tilt + self.settings.tilt_step * steps as f64;
                self.state.orientation.tilt = normalize_angle(tilt);
            }
            Command::ResetView => {
                self.state.orientation = Orientation::default();
            }
        }
    }

    /// Advance a running fly-to. Returns true while animating.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Mode::Animating(fly) = &self.state.mode else {
            return false;
        };
        let (heading, finished) = fly.sample(now);
        self.state.orientation.heading = heading;
        if finished {
            debug!(heading, "fly-to finished");
            self.state.mode = Mode::Idle;
        }
        !finished
    }

    fn hover<P: MarkerPicker>(&mut self, x: f64, y: f64, picker: &P) {
        self.state.tooltip = picker
            .pick(self.state.orientation, x, y)
            .map(|pick| Tooltip::for_pick(&pick, x, y));
    }

    fn start_fly_to(&mut self, pick: &Pick, now: Instant) {
        let fly = FlyTo::toward(self.state.orientation.heading, pick.lon, now, self.settings.fly_duration);
        debug!(
            country = %pick.country,
            from = fly.start(),
            to = fly.target(),
            "fly-to started"
        );
        self.state.drag_anchor = None;
        self.state.tooltip = None;
        self.state.mode = Mode::Animating(fly);
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(InteractionSettings::default())
    }
}
