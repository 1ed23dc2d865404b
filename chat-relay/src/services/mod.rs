pub mod formatter;
pub mod providers;

pub use formatter::{format_response, render_format_fallback, FormatError};
pub use providers::{Generation, ProviderError, TextProvider};
