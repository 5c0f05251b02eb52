mod caret;
mod config;
mod core;
mod drag;
mod error;
mod event;
mod insert;
mod listener;
pub mod markup;
mod mention;
mod ops;
mod remove;
mod session;
mod substitute;
mod surface;
mod widget;

pub use crate::caret::*;
pub use crate::config::*;
pub use crate::core::*;
pub use crate::drag::*;
pub use crate::error::*;
pub use crate::event::*;
pub use crate::insert::*;
pub use crate::listener::*;
pub use crate::mention::*;
pub use crate::ops::*;
pub use crate::remove::*;
pub use crate::session::*;
pub use crate::substitute::*;
pub use crate::surface::*;
pub use crate::widget::*;
