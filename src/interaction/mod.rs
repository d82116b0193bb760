mod animation;
mod controller;

pub use animation::{FlyTo, FLY_DURATION};
pub use controller::{
    Command, Controller, InteractionSettings, InteractionState, MarkerPicker, Mode, Pick, Tooltip,
};
