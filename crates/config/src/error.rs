use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// A source could not be read or parsed, or a value has the wrong type.
    #[display("could not load configuration")]
    Load,
    #[display("invalid configuration: {field}: {reason}")]
    Invalid {
        #[error(not(source))]
        field: &'static str,
        #[error(not(source))]
        reason: String,
    },
}
