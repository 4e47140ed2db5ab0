mod ffprobe_info;
mod image_manifest;
mod image_scanner;
mod path_validator;
mod process_runner;

pub use ffprobe_info::get_audio_duration;
pub use image_manifest::ImageManifest;
pub use image_scanner::{enumerate_images, scan_images};
pub use path_validator::{remove_file_if_exists, validate_directory_exists};
pub use process_runner::{ProcessError, ProcessOutput, ProcessRunner};
