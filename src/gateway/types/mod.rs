//! Gateway types module
//!
//! - [`ApiResponse<T>`]: Unified API response wrapper
//! - [`JsonBody`]: JSON body extractor whose rejections are validation errors
//! - [`QueryParams`]: Query string extractor with the same rejection envelope
//! - [`PathId`]: Integer path id extractor; a non-integer id does not resolve

pub mod extract;
pub mod response;

pub use extract::{JsonBody, PathId, QueryParams};
pub use response::{ApiResponse, ApiResult, created, error_codes, ok};
