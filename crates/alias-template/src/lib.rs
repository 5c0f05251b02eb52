mod error;
mod page;
mod preview;
mod store;

pub use crate::error::*;
pub use crate::page::*;
pub use crate::preview::*;
pub use crate::store::*;
