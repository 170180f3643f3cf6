//! Interactive terminal browser

pub mod interactive;

pub use interactive::run_browser;
