//! Prompt Template System
//!
//! Loads and renders `.pmt` (prompt template) files for the planning stages
//! and the photo query translator.
//!
//! Template loading chain:
//! 1. `<prompts-dir>/{name}.pmt` (configured override, default `.wayfarer/prompts/`)
//! 2. Embedded fallback compiled from `wf/prompts/`
//!
//! Templates use Handlebars syntax for variable substitution.

pub mod embedded;
mod loader;

pub use loader::PromptLoader;
