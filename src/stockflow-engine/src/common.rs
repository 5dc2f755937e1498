// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;
use std::{error, result};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Generic,
    JsonDeserialization,
    XmlSerialization,
    EmptyResponse,
    NoJsonInResponse,
    MalformedResponse,
    EmptyImage,
    MissingApiKey,
    UnknownProvider,
    ReadFailed,
    WriteFailed,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ErrorCode::*;
        let name = match self {
            Generic => "generic",
            JsonDeserialization => "json_deserialization",
            XmlSerialization => "xml_serialization",
            EmptyResponse => "empty_response",
            NoJsonInResponse => "no_json_in_response",
            MalformedResponse => "malformed_response",
            EmptyImage => "empty_image",
            MissingApiKey => "missing_api_key",
            UnknownProvider => "unknown_provider",
            ReadFailed => "read_failed",
            WriteFailed => "write_failed",
        };

        write!(f, "{name}")
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Import,
    Export,
    Provider,
    Io,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub code: ErrorCode,
    pub details: Option<String>,
}

impl Error {
    pub fn new(kind: ErrorKind, code: ErrorCode, details: Option<String>) -> Self {
        Error {
            kind,
            code,
            details,
        }
    }

    pub fn get_details(&self) -> Option<String> {
        self.details.clone()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self.kind {
            ErrorKind::Import => "ImportError",
            ErrorKind::Export => "ExportError",
            ErrorKind::Provider => "ProviderError",
            ErrorKind::Io => "IoError",
        };
        match self.details {
            Some(ref details) => write!(f, "{}{{{}: {}}}", kind, self.code, details),
            None => write!(f, "{}{{{}}}", kind, self.code),
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = result::Result<T, Error>;

#[macro_export]
macro_rules! import_err(
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Import, ErrorCode::$code, Some($str)))
    }}
);

#[macro_export]
macro_rules! export_err(
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Export, ErrorCode::$code, Some($str)))
    }}
);

#[macro_export]
macro_rules! provider_err {
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Provider, ErrorCode::$code, Some($str)))
    }};
    ($code:tt) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Provider, ErrorCode::$code, None))
    }};
}

pub(crate) fn io_error(code: ErrorCode, path: &std::path::Path, err: std::io::Error) -> Error {
    Error::new(
        ErrorKind::Io,
        code,
        Some(format!("{}: {}", path.display(), err)),
    )
}

#[test]
fn test_error_display() {
    let err = Error::new(
        ErrorKind::Import,
        ErrorCode::JsonDeserialization,
        Some("expected value at line 1 column 1".to_owned()),
    );
    assert_eq!(
        "ImportError{json_deserialization: expected value at line 1 column 1}",
        format!("{err}")
    );

    let err = Error::new(ErrorKind::Provider, ErrorCode::EmptyResponse, None);
    assert_eq!("ProviderError{empty_response}", format!("{err}"));
}

#[test]
fn test_error_macros() {
    let result: Result<()> = provider_err!(MissingApiKey);
    let err = result.unwrap_err();
    assert_eq!(ErrorKind::Provider, err.kind);
    assert_eq!(ErrorCode::MissingApiKey, err.code);
    assert!(err.get_details().is_none());

    let result: Result<()> = import_err!(JsonDeserialization, "trailing comma".to_owned());
    let err = result.unwrap_err();
    assert_eq!(ErrorKind::Import, err.kind);
    assert_eq!(ErrorCode::JsonDeserialization, err.code);

    let result: Result<()> = export_err!(XmlSerialization, "bad utf-8".to_owned());
    let err = result.unwrap_err();
    assert_eq!(ErrorKind::Export, err.kind);
    assert_eq!(Some("bad utf-8".to_owned()), err.get_details());
}
