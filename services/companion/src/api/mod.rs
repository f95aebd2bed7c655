pub mod client;
pub mod decoder;
pub mod image;
pub mod transport;
mod wire;

pub use client::ApiClient;
pub use decoder::decode;
pub use image::{encode_image_base64, strip_data_url_prefix};
pub use transport::Transport;
