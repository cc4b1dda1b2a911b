//! Domain errors raised while inspecting level objects

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum LevelError {
    #[error("object {index}: missing `{field}` field")]
    MissingField { index: usize, field: &'static str },

    #[error("object {index}: `{field}` must be an array of 3 numbers")]
    InvalidVector { index: usize, field: &'static str },

    #[error("object {index}: expected a JSON object")]
    InvalidObject { index: usize },

    #[error("level is missing the `{0}` array")]
    MissingLevelField(&'static str),

    #[error("expected a JSON object at the top level")]
    NotAnObject,
}
