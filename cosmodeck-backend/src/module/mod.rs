pub mod binder;
pub mod fallbacks;
pub mod loader;
pub mod scheduled;
pub mod screens;
pub mod sim;
pub mod sources;
pub mod views;
