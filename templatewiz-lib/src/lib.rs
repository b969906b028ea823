pub mod chunker;
pub mod config;
pub mod dom;
pub mod error;
pub mod extract;
pub mod favicon;
pub mod llm;
pub mod net;
pub mod palette;
pub mod parser;
pub mod pipeline;
pub mod retry;
pub mod style;
pub mod tokenizer;
pub mod writing_style;

pub use config::ExtractorConfig;
pub use error::{ConfigError, ExtractError, FaviconError, FetchError, LlmError};
pub use palette::{Palette, PaletteAttribute, PartialPalette};
pub use pipeline::ExtractionPipeline;
