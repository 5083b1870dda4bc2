use thiserror::Error;

/// Failures reported by sealing and opening.
///
/// Wrong passwords and tampered data both surface as
/// [`Error::AuthenticationFailure`]; the two cases are indistinguishable.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Input ended before a complete header or fragment could be read.
    #[error("malformed input: {0}")]
    MalformedInput(&'static str),

    /// The algorithm id byte is outside the recognized set.
    #[error("unsupported algorithm id: {0:#04x}")]
    UnsupportedAlgorithm(u8),

    /// A fragment failed tag verification.
    #[error("invalid password or corrupted data")]
    AuthenticationFailure,

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("cipher initialization failed")]
    CipherInit,

    #[error("encryption failed")]
    Encryption,

    /// The fragment sequence number would wrap around.
    #[error("stream exceeds the maximum number of fragments")]
    StreamLimit,

    #[error("OS random generator unavailable")]
    Randomness,

    /// Armored text is not valid base64.
    #[error("invalid text encoding")]
    Encoding(#[from] base64::DecodeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Recovers a typed error that travelled through an `io::Error`.
    pub(crate) fn from_io(err: std::io::Error) -> Self {
        if !err.get_ref().is_some_and(|inner| inner.is::<Error>()) {
            return Error::Io(err);
        }

        let kind = err.kind();
        match err.into_inner().map(|inner| inner.downcast::<Error>()) {
            Some(Ok(typed)) => *typed,
            Some(Err(other)) => Error::Io(std::io::Error::new(kind, other)),
            None => Error::Io(kind.into()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
