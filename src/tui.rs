mod app;
mod events;
mod models;
mod rendering;

pub use events::run_tui;
