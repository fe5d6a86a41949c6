use std::convert::From;
use std::error;
use std::fmt;
use std::io;

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: Option<String>,
}

#[derive(Debug)]
pub enum ErrorKind {
    ConfigParse,
    Storage,
    HolidayData,
    DateParse,
    InvalidArgument,
    Render,
    ExportBusy,
    IOError(io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn new(kind: ErrorKind, msg: &str) -> Self {
        Error {
            kind,
            message: Some(msg.to_owned()),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            kind,
            message: None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(io_error: io::Error) -> Error {
        Error::from(ErrorKind::IOError(io_error))
    }
}

impl From<chrono::ParseError> for Error {
    fn from(parse_error: chrono::ParseError) -> Error {
        Error::new(
            ErrorKind::DateParse,
            &format!("Could not parse date: {}", parse_error),
        )
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Error {
        Error::new(ErrorKind::ConfigParse, &error.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(error: toml::ser::Error) -> Error {
        Error::new(ErrorKind::Storage, &error.to_string())
    }
}

impl From<printpdf::Error> for Error {
    fn from(error: printpdf::Error) -> Error {
        Error::new(ErrorKind::Render, &error.to_string())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(msg) => write!(f, "{}: {}", self.kind.as_str(), msg),
            None => write!(f, "{}", self.kind.as_str()),
        }
    }
}

impl error::Error for Error {}

impl ErrorKind {
    pub fn as_str(&self) -> String {
        match self {
            ErrorKind::ConfigParse => "invalid configuration".to_owned(),
            ErrorKind::Storage => "storage failure".to_owned(),
            ErrorKind::HolidayData => "invalid holiday data".to_owned(),
            ErrorKind::DateParse => "invalid date format".to_owned(),
            ErrorKind::InvalidArgument => "invalid argument".to_owned(),
            ErrorKind::Render => "document rendering failed".to_owned(),
            ErrorKind::ExportBusy => "export already in progress".to_owned(),
            ErrorKind::IOError(err) => err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_message() {
        let err = Error::new(ErrorKind::InvalidArgument, "year 0 is out of range");
        assert_eq!(
            err.to_string(),
            "invalid argument: year 0 is out of range"
        );
    }

    #[test]
    fn io_errors_display_their_own_message() {
        let err = Error::from(io::Error::new(io::ErrorKind::NotFound, "store.toml"));
        assert!(matches!(err.kind, ErrorKind::IOError(_)));
        assert_eq!(err.to_string(), "store.toml");
    }
}
