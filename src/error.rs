use std::fmt::{self, Display, Formatter};
use std::io;
use std::path::PathBuf;

/// Errors raised while building a ward network or stepping it through a day.
///
/// The fatal variants (`Io`, `Parse`, `ZeroId`, `CapacityExceeded`) abort a
/// build outright; the consistency variants (`TooManyGapFills`,
/// `DanglingLink`, `InvalidResize`) signal structurally broken input or a
/// misuse of a table. Anomalies that do not stop processing (negative pools,
/// over-moves) are reported through the logger instead of this type.
#[derive(Debug)]
pub enum MetapopError {
    /// The file could not be read at all.
    Io { path: PathBuf, source: io::Error },
    /// A line (or document) that could not be parsed as a record.
    Parse { path: PathBuf, context: String },
    /// A link record with a zero endpoint. The input must be renumbered.
    ZeroId { path: PathBuf, from: usize, to: usize },
    /// A size/position record naming ward 0.
    ZeroWard { path: PathBuf },
    /// A record references an index beyond the table's allocated capacity.
    CapacityExceeded { path: PathBuf, id: usize, capacity: usize },
    /// Gap-filling inserted too many implicit wards during a single build.
    TooManyGapFills { added: usize },
    /// A link endpoint is still unoccupied after gap-filling.
    DanglingLink { link: usize, ward: usize },
    /// A table resize that would drop populated entries.
    InvalidResize { requested: usize, minimum: usize },
    /// A mover/mixer name with no entry in the registry.
    UnknownStrategy { name: String },
    /// An adjustable-variable name this model does not recognize.
    UnknownVariable { name: String },
}

impl Display for MetapopError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            MetapopError::Io { path, source } => {
                write!(f, "{} is unreadable: {source}", path.display())
            }
            MetapopError::Parse { path, context } => {
                write!(f, "{} is corrupted: {context}", path.display())
            }
            MetapopError::ZeroId { path, from, to } => {
                write!(
                    f,
                    "zero in link list {from}-{to} in {}: renumber the input and start again",
                    path.display()
                )
            }
            MetapopError::ZeroWard { path } => {
                write!(
                    f,
                    "ward 0 in {}: renumber the input and start again",
                    path.display()
                )
            }
            MetapopError::CapacityExceeded { path, id, capacity } => {
                write!(
                    f,
                    "index {id} in {} exceeds the table capacity {capacity}",
                    path.display()
                )
            }
            MetapopError::TooManyGapFills { added } => {
                write!(
                    f,
                    "gap-filling added {added} implicit wards in one build: the input is malformed"
                )
            }
            MetapopError::DanglingLink { link, ward } => {
                write!(f, "link {link} references unoccupied ward {ward} after gap-filling")
            }
            MetapopError::InvalidResize { requested, minimum } => {
                write!(f, "cannot resize a table to {requested} slots: {minimum} are in use")
            }
            MetapopError::UnknownStrategy { name } => {
                write!(f, "no strategy named '{name}' is registered")
            }
            MetapopError::UnknownVariable { name } => {
                write!(f, "'{name}' is not an adjustable variable")
            }
        }
    }
}

impl std::error::Error for MetapopError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MetapopError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_id_names_the_file_and_pair() {
        let err = MetapopError::ZeroId {
            path: PathBuf::from("work.dat"),
            from: 0,
            to: 7,
        };
        let msg = err.to_string();
        assert!(msg.contains("work.dat"));
        assert!(msg.contains("0-7"));
    }

    #[test]
    fn io_error_keeps_its_source() {
        use std::error::Error;
        let err = MetapopError::Io {
            path: PathBuf::from("missing.dat"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.source().is_some());
    }
}
