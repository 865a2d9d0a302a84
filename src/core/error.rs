use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatchError {
    #[error("unable to resolve home directory from environment")]
    HomeDirUnavailable,
    #[error("no triggers provided")]
    NoTriggers,
}
