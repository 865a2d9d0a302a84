pub mod error;
pub mod match_file;
pub mod paths;
pub mod snippet;
