pub mod app;
pub mod braille;
pub mod config;
pub mod data;
pub mod globe;
pub mod interaction;
pub mod ui;
