//! Extract structured problem records (title, formatted description, solution
//! code, images) from saved LeetCode problem pages.

pub mod batch;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod parser;
pub mod problem;

pub use batch::{parse_directory, BatchPolicy, BatchReport};
pub use diagnostics::{Diagnostics, Silent, Stage, Traced};
pub use error::{FetchError, ParseError};
pub use parser::images::{HttpFetcher, ImageFetcher, Offline};
pub use parser::Extractor;
pub use problem::{Image, Problem};
