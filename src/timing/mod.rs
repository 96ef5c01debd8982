pub mod fps;
pub mod frame_index;
pub mod timeline;
