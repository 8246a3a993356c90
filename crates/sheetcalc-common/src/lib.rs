pub mod date;
pub mod error;
pub mod reference;

pub use date::*;
pub use error::*;
pub use reference::*;
