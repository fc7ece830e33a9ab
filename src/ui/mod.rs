//! Server-rendered HTML for the single page, built with `maud`.
pub mod page;
pub mod result;
pub mod upload;
