pub mod decode;
pub mod library;
pub mod loader;
pub mod media;
pub mod memory;
