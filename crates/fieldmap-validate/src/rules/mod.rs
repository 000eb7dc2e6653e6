//! Issue classification.

mod category;

pub use category::Category;
