pub mod browse;
pub mod rates;
pub mod session;
pub mod setup;
pub mod show;
pub mod ui;
