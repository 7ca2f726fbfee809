// CV document rendering.
// Implements: markdown renderer, date-range formatting, markdown reader, RenderCV YAML export.
// Everything here is pure and synchronous; handlers only wrap it for HTTP.

pub mod dates;
pub mod handlers;
pub mod markdown;
pub mod parser;
pub mod rendercv;

pub use markdown::render_markdown;
pub use parser::parse_markdown;
pub use rendercv::to_rendercv_yaml;
