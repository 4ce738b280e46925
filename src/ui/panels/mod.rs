//! Builders turning one snapshot into one [`Panel`].

pub mod activity;
pub mod host;
pub mod packages;
pub mod ports;
pub mod repository;

pub use crate::ui::panel::Panel;
