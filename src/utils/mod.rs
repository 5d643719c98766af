pub mod color_scale;
pub mod format;
pub mod logger;
