//! HTTP API handlers for mcg-api

pub mod generate;
pub mod health;
pub mod mochi;
pub mod ui;

pub use generate::generate_routes;
pub use health::health_routes;
pub use mochi::mochi_routes;
pub use ui::ui_routes;
