pub mod list_sections;
pub mod search;

pub use list_sections::*;
pub use search::*;
