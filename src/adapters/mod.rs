// Adapters layer: concrete implementations of the domain ports (token storage, camera, QR decoding).

pub mod camera;
pub mod decoder;
pub mod token_store;

pub use camera::ImageFileSource;
pub use decoder::RqrrDecoder;
pub use token_store::{FileTokenStore, MemoryTokenStore};
