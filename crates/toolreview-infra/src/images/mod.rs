//! Cover image storage.

mod webp;

pub use webp::{ImageStoreConfig, WebpImageStore};
