pub mod image_search;
pub mod media_resolver;
pub mod result_writer;
pub mod session_controller;

pub use image_search::{HttpImageFetcher, ImageFetcher, ImageSearch, SerpApiSearch};
pub use media_resolver::{ImageAsset, ImageResolver, MediaResolver};
pub use result_writer::ResultWriter;
pub use session_controller::{AuthState, SessionController};
