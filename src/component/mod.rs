//! 功能元件模組

pub mod slideshow_renderer;

pub use slideshow_renderer::SlideshowRenderer;
