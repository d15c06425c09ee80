//! Failure taxonomy of the asset stack.
//!
//! Nothing below the `ResourceManager` facade lets one of these cross a module
//! boundary as a panic; callers observe "absent" values and the error is
//! logged at the point of that conversion. The archive admission gate is the
//! one place that reports errors directly, and it distinguishes a corrupt or
//! missing file (`ArchiveOpenFailed`) from a wrong-game archive
//! (`VersionRejected`) so operators can tell the two apart.

use std::io;
use std::path::PathBuf;

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "{}", _0)]
    Io(#[cause] io::Error),
    #[fail(display = "{}", _0)]
    Zip(#[cause] ::zip::result::ZipError),
    #[fail(display = "{}", _0)]
    Serialization(String),
    #[fail(display = "Failed to open archive at {:?}.", _0)]
    ArchiveOpenFailed(PathBuf),
    #[fail(
        display = "Archive at {:?} carries game version {:?}, outside the accepted set.",
        _0, _1
    )]
    VersionRejected(PathBuf, Option<u32>),
    #[fail(display = "Entry '{}' could not be found.", _0)]
    EntryNotFound(String),
    #[fail(display = "No decoder registered for type tag {:#010X}.", _0)]
    DecodeUnsupportedType(u32),
    #[fail(
        display = "Decoder for type tag {:#010X} does not understand version {}.",
        _0, _1
    )]
    DecodeUnsupportedVersion(u32, u32),
    #[fail(display = "Malformed resource record: {}.", _0)]
    DecodeMalformed(String),
}

pub type Result<T> = ::std::result::Result<T, Error>;

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<::zip::result::ZipError> for Error {
    fn from(err: ::zip::result::ZipError) -> Self {
        Error::Zip(err)
    }
}

impl From<::bincode::Error> for Error {
    fn from(err: ::bincode::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<::serde_json::Error> for Error {
    fn from(err: ::serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
