//! The response envelope every backend command returns, and the classification of failures.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};

/// The status codes a backend may place in an envelope. Anything at or above 400 is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum Status {
    Ok = 200,
    Created = 201,
    Accepted = 202,
    Found = 302,
    BadRequest = 400,
    Unauthorized = 401,
    Forbidden = 403,
    NotFound = 404,
    MethodNotAllowed = 405,
    RequestTimeout = 408,
    Conflict = 409,
    Error = 500,
    InsufficientStorage = 507,
}

impl Status {
    pub const fn code(self) -> u16 {
        self as u16
    }

    pub const fn is_error(self) -> bool {
        self.code() >= 400
    }
}

impl From<Status> for u16 {
    fn from(value: Status) -> Self {
        value.code()
    }
}

/// `{ status, header, message }`. `header` is a human readable summary of the outcome and
/// `message` is the payload, which may be `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    status: u16,
    #[serde(default)]
    header: String,
    message: Option<T>,
}

impl<T> Envelope<T> {
    pub fn new(status: Status, header: impl Into<String>, message: Option<T>) -> Self {
        Self {
            status: status.code(),
            header: header.into(),
            message,
        }
    }

    pub fn ok(header: impl Into<String>, message: T) -> Self {
        Self::new(Status::Ok, header, Some(message))
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn message(&self) -> Option<&T> {
        self.message.as_ref()
    }

    pub fn is_error(&self) -> bool {
        self.status >= 400
    }
}

impl Envelope<Value> {
    /// An envelope with no payload.
    pub fn empty(status: Status, header: impl Into<String>) -> Self {
        Self::new(status, header, None)
    }

    /// Treats an error status as an application failure, then returns the payload if there is
    /// one. A `null` payload is returned as `None`.
    pub fn into_optional<T>(self) -> Result<Option<T>, Failure>
    where
        T: DeserializeOwned,
    {
        if self.is_error() {
            return Err(Failure::Application {
                status: self.status,
                header: self.header,
            });
        }
        match self.message {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| Failure::Malformed {
                    header: self.header,
                    reason: e.to_string(),
                }),
        }
    }

    /// Like `into_optional`, but a missing payload is a malformed response.
    pub fn into_payload<T>(self) -> Result<T, Failure>
    where
        T: DeserializeOwned,
    {
        let header = self.header.clone();
        self.into_optional()?.ok_or(Failure::Malformed {
            header,
            reason: "the response carried no message".to_string(),
        })
    }

    /// Succeeds when the status is not an error, ignoring any payload.
    pub fn into_unit(self) -> Result<(), Failure> {
        if self.is_error() {
            return Err(Failure::Application {
                status: self.status,
                header: self.header,
            });
        }
        Ok(())
    }
}

/// The ways a backend command can fail.
pub enum Failure {
    /// The command never produced an envelope.
    Transport(anyhow::Error),
    /// The envelope carried a status of 400 or above.
    Application { status: u16, header: String },
    /// The envelope was successful but its payload was missing or of the wrong shape.
    Malformed { header: String, reason: String },
}

impl Failure {
    /// The status code of an application failure. Malformed payloads report 500.
    pub fn status(&self) -> Option<u16> {
        match self {
            Failure::Transport(_) => None,
            Failure::Application { status, .. } => Some(*status),
            Failure::Malformed { .. } => Some(Status::Error.code()),
        }
    }
}

impl Debug for Failure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Transport(e) => f.debug_tuple("Transport").field(e).finish(),
            Failure::Application { status, header } => f
                .debug_struct("Application")
                .field("status", status)
                .field("header", header)
                .finish(),
            Failure::Malformed { header, reason } => f
                .debug_struct("Malformed")
                .field("header", header)
                .field("reason", reason)
                .finish(),
        }
    }
}

impl Display for Failure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Transport(e) => write!(f, "The backend could not be reached: {e}"),
            Failure::Application { status, header } => write!(f, "{header} (status {status})"),
            Failure::Malformed { header, reason } => {
                write!(f, "Malformed response '{header}': {reason}")
            }
        }
    }
}

impl Error for Failure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Failure::Transport(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_threshold() {
        let e: Envelope = Envelope::empty(Status::BadRequest, "nope");
        assert!(e.is_error());
        let e: Envelope = Envelope::empty(Status::Found, "moved");
        assert!(!e.is_error());
        assert!(Status::InsufficientStorage.is_error());
    }

    #[test]
    fn test_application_failure_keeps_header() {
        let e: Envelope = Envelope::empty(Status::Conflict, "Expense already exists");
        let failure = e.into_unit().unwrap_err();
        assert_eq!(failure.status(), Some(409));
        assert!(failure.to_string().contains("Expense already exists"));
    }

    #[test]
    fn test_null_payload_is_malformed() {
        let e: Envelope = serde_json::from_value(json!({
            "status": 200, "header": "ok", "message": null
        }))
        .unwrap();
        assert!(matches!(
            e.clone().into_payload::<Vec<i64>>(),
            Err(Failure::Malformed { .. })
        ));
        assert_eq!(e.into_optional::<Vec<i64>>().unwrap(), None);
    }

    #[test]
    fn test_wrong_shape_is_malformed() {
        let e = Envelope::ok("ok", json!("not a pair"));
        assert!(matches!(
            e.into_payload::<(i64, i64)>(),
            Err(Failure::Malformed { .. })
        ));
    }

    #[test]
    fn test_payload_decodes() {
        let e = Envelope::ok("ok", json!([1, 2]));
        assert_eq!(e.into_payload::<(i64, i64)>().unwrap(), (1, 2));
    }
}
