pub mod load;
pub mod types;

pub use types::{
    AUDIO_FILE, Config, IMAGES_DIR, INTERMEDIATE_FILE, MANIFEST_FILE, OUTPUT_FILE, RenderPaths,
    RenderSettings,
};
