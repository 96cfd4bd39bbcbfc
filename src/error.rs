use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A source table is empty, has a short row, or holds an unparseable number.
    #[error("malformed data in {source_name} at row {row}: {reason}")]
    MalformedData {
        source_name: String,
        row: usize,
        reason: String,
    },

    #[error("data for attribute '{label}' is not found")]
    AttributeNotFound { label: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn malformed(source_name: &str, row: usize, reason: impl Into<String>) -> Self {
        Error::MalformedData {
            source_name: source_name.to_string(),
            row,
            reason: reason.into(),
        }
    }

    /// Invalid UTF-8 in a source is malformed data; other csv errors pass through.
    pub(crate) fn from_csv(err: csv::Error, source_name: &str, row: usize) -> Self {
        let utf8 = match err.kind() {
            csv::ErrorKind::Utf8 { pos, err } => Some((
                pos.as_ref().map_or(row, |p| p.line() as usize),
                err.field() + 1,
            )),
            _ => None,
        };
        match utf8 {
            Some((line, field)) => Error::malformed(
                source_name,
                line,
                format!("field {} is not valid UTF-8", field),
            ),
            None => Error::Csv(err),
        }
    }
}

/// 1-based physical line of a record, counting blank lines the reader skipped.
pub(crate) fn line_of(record: &csv::StringRecord, fallback: usize) -> usize {
    record.position().map_or(fallback, |p| p.line() as usize)
}

pub type Result<T> = std::result::Result<T, Error>;
