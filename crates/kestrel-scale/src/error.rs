use crate::scale::ScaleKind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("{kind} scales are not invertible")]
    NotInvertible { kind: ScaleKind },

    #[error("{expected} scale cannot map a {found} value")]
    DomainKindMismatch {
        expected: ScaleKind,
        found: &'static str,
    },

    #[error("unknown category: {key}")]
    UnknownCategory { key: String },
}
