use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("no .kml document found in {}", .0.display())]
    MissingDocument(PathBuf),

    #[error("failed to read archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("malformed KML document: {0}")]
    MalformedDocument(#[from] quick_xml::Error),

    #[error("invalid selection: {0}")]
    Selection(String),

    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write {}: {}", path.display(), source)]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
