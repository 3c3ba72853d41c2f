//! Data models

pub mod user;
pub mod feature;
pub mod event;

pub use user::*;
pub use feature::*;
pub use event::*;
