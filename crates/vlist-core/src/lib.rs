pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod window;

pub use config::ListConfig;
pub use error::VirtualListError;
pub use result::ListResult;
pub use traits::{ContentRegion, ElementTemplate, PageSource, Translate};
pub use window::PageWindow;
