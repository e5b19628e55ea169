pub mod api;
pub mod images;
pub mod upload;

pub use api::{SavedPhoto, UploadServer, UploadedPhoto, WallApi};
pub use images::{ImageFetcher, ImageSource};
pub use upload::WallUploader;
