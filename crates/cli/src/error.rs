use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("configuration error")]
    Config,
    #[display("could not open the library database")]
    Database,
    #[display("could not load metadata providers")]
    Providers,
    #[display("invalid argument: {_0}")]
    Argument(#[error(not(source))] String),
    #[display("command failed")]
    Command,
}
