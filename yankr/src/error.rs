use std::path::PathBuf;
use thiserror::Error;

pub type YankResult<T> = Result<T, YankError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum YankError {
    #[error("Clipboard slot is empty")]
    EmptySlot,

    #[error("Yanked path has no file name component: {0:?}")]
    NoFileName(PathBuf),
}
