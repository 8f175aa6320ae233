pub mod cache;
pub mod cors;
pub mod error;
pub mod mock;
pub mod placeholder;
pub mod probe;
pub mod resolver;
pub mod select;

pub use cache::ProxyUrlCache;
pub use cors::CorsPolicy;
pub use error::ProbeError;
pub use placeholder::{CategoryStyle, Placeholder};
pub use probe::{HttpProber, ImageProber};
pub use resolver::{best_guess, debug_article_images, ImageResolver, ImageSource, Resolution};
pub use select::{is_valid_image_url, select_candidate};
