//! View-state synchronization: coordinator, history and the page runtime

pub mod app;
pub mod coordinator;
pub mod history;

pub use app::{App, Notice, Routes, ViewSettings};
pub use coordinator::{Event, GridView, PageMode, PlayerView, Screen, ViewState};
