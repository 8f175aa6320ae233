pub mod article;
pub mod config;
pub mod error;
pub mod http;
pub mod image;

pub use article::Article;
pub use config::{ConfigError, ResolverConfig};
pub use image::{ImageResolver, ImageSource, Resolution};
