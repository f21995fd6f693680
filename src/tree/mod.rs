pub mod path;
pub mod renumber;

pub use path::*;
pub use renumber::*;
