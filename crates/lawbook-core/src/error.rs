/// Errors raised by the document library.
///
/// Parsing and rendering never fail: malformed input has a defined fallback.
/// The only fallible step is building the highlight pattern for a keyword.
/// Binary crates wrap `CoreError` in their own error type via `#[from]`.

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid search pattern: {0}")]
    Pattern(#[from] regex::Error),
}
