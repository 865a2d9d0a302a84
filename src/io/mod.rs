pub mod opener;
pub mod prompt;
