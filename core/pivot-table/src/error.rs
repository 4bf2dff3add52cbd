//! FILENAME: core/pivot-table/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("not a table look: root element is `{0}`")]
    NotTableLook(String),

    #[error("`{value}` is not a valid value for attribute `{attribute}`")]
    InvalidAttribute { attribute: String, value: String },
}

impl From<quick_xml::events::attributes::AttrError> for LookError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        LookError::Xml(e.into())
    }
}
