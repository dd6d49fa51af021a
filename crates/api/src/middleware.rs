/// Password hashing and session resolution
pub mod auth;
/// Domain error to HTTP response mapping
pub mod error_handling;
/// JSON extractor reporting failures as field errors
pub mod json;
