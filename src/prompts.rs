/// Prompt sent alongside an image when the user typed no text.
pub const IMAGE_ONLY: &str = "What do you see in this image?";
