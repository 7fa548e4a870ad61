// src/services/mod.rs
pub mod clipboard;
pub mod generation;
pub mod image_loader;
pub mod prompt;

pub use clipboard::{Clipboard, CommandClipboard, MemoryClipboard};
pub use generation::{ContentGenerator, OpenAIGenerator};
pub use image_loader::ImageLoader;
