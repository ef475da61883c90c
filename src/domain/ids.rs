//! Domain identifier types with validation
//!
//! Newtype wrappers keep job and session identifiers from being mixed up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Export job identifier
///
/// Caller-supplied and unique within a batch.
///
/// # Examples
///
/// ```
/// use lectern::domain::ids::JobId;
/// use std::str::FromStr;
///
/// let job_id = JobId::from_str("week-01").unwrap();
/// assert_eq!(job_id.as_str(), "week-01");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobId(String);

impl JobId {
    /// Creates a new JobId, rejecting blank identifiers
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Job ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the job ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Content session identifier
///
/// # Examples
///
/// ```
/// use lectern::domain::ids::SessionId;
///
/// let session = SessionId::new("lecture-3").unwrap();
/// assert_eq!(session.to_string(), "lecture-3");
/// assert!(SessionId::new("  ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Creates a new SessionId, rejecting blank identifiers
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Session ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the session ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! impl_id_traits {
    ($ty:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $ty {
            type Error = String;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.0
            }
        }
    };
}

impl_id_traits!(JobId);
impl_id_traits!(SessionId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_id_valid() {
        let id = JobId::new("job-1").unwrap();
        assert_eq!(id.as_str(), "job-1");
        assert_eq!(id.to_string(), "job-1");
    }

    #[test]
    fn test_job_id_empty() {
        assert!(JobId::new("").is_err());
        assert!(JobId::new("   ").is_err());
    }

    #[test]
    fn test_session_id_from_str() {
        let id = SessionId::from_str("s1").unwrap();
        assert_eq!(id.as_ref(), "s1");
    }

    #[test]
    fn test_ids_deserialize_with_validation() {
        let id: SessionId = serde_json::from_str("\"s1\"").unwrap();
        assert_eq!(id.as_str(), "s1");
        assert!(serde_json::from_str::<JobId>("\"\"").is_err());
    }

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let id = JobId::new("week-02").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"week-02\"");
    }
}
