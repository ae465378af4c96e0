pub mod description;
pub mod duration;

pub use description::ContentExtractor;
pub use duration::{is_long_form, parse_iso_duration};
