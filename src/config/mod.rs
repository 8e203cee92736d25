pub mod load;
pub mod types;

pub use types::{Config, DEFAULT_PART_MARKERS, DEFAULT_VIDEO_EXTENSIONS, JoinerSettings};
