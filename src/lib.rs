pub mod calendar;
pub mod config;
pub mod error;
pub mod events;
pub mod export;
pub mod holidays;
pub mod i18n;
pub mod layout;
pub mod pagination;
pub mod paper;
pub mod render;
pub mod store;
pub mod ui;
