mod javascript;

pub use javascript::JavaScriptParser;

use crate::models::Language;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("Failed to initialize parser: {0}")]
    InitError(String),
}

/// Create a reference parser for the given language
pub fn create_parser(language: &Language) -> Result<JavaScriptParser, ParserError> {
    JavaScriptParser::new(matches!(language, Language::TypeScript))
}
