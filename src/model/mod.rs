pub mod item;
pub mod document;
pub mod layout;
pub mod field;
pub mod config;

pub use item::*;
pub use document::*;
pub use layout::*;
pub use field::*;
pub use config::*;
