// models/src/status.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Review status of a driver registration.
///
/// The permitted transitions form the review lattice: a pending driver may be
/// approved or rejected, and a decided driver may be re-reviewed in either
/// direction. No state is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverStatus {
    Pending,
    Approved,
    Rejected,
}

impl DriverStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverStatus::Pending => "pending",
            DriverStatus::Approved => "approved",
            DriverStatus::Rejected => "rejected",
        }
    }

    /// Whether the review lattice permits moving from `self` to `next`.
    pub fn permits(self, next: DriverStatus) -> bool {
        use DriverStatus::*;
        matches!(
            (self, next),
            (Pending, Approved) | (Pending, Rejected) | (Approved, Rejected) | (Rejected, Approved)
        )
    }

    /// Lenient parse: unknown or absent strings fall back to `Pending`.
    pub fn parse_or_default(value: Option<&str>) -> DriverStatus {
        value.and_then(|s| s.parse().ok()).unwrap_or(DriverStatus::Pending)
    }
}

impl fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DriverStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(DriverStatus::Pending),
            "approved" => Ok(DriverStatus::Approved),
            "rejected" => Ok(DriverStatus::Rejected),
            other => Err(ValidationError::InvalidStatus(other.to_string())),
        }
    }
}

/// Lifecycle status of an emergency request or ambulance booking.
///
/// `completed` and `cancelled` are terminal. Legacy documents carry
/// `"active"` / `"in_progress"` where newer ones write `"accepted"`; both
/// spellings decode to [`RequestStatus::Accepted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Completed,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Completed => "completed",
            RequestStatus::Cancelled => "cancelled",
        }
    }

    pub fn permits(self, next: RequestStatus) -> bool {
        use RequestStatus::*;
        matches!(
            (self, next),
            (Pending, Accepted) | (Accepted, Completed) | (Pending, Cancelled) | (Accepted, Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Cancelled)
    }

    /// An open request still occupies an ambulance slot.
    pub fn is_active(self) -> bool {
        matches!(self, RequestStatus::Pending | RequestStatus::Accepted)
    }

    pub fn parse_or_default(value: Option<&str>) -> RequestStatus {
        value.and_then(|s| s.parse().ok()).unwrap_or(RequestStatus::Pending)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(RequestStatus::Pending),
            "accepted" | "active" | "in_progress" => Ok(RequestStatus::Accepted),
            "completed" => Ok(RequestStatus::Completed),
            "cancelled" | "canceled" => Ok(RequestStatus::Cancelled),
            other => Err(ValidationError::InvalidStatus(other.to_string())),
        }
    }
}

/// Triage priority of an emergency request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    pub fn parse_or_default(value: Option<&str>) -> Priority {
        value.and_then(|s| s.parse().ok()).unwrap_or(Priority::Medium)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(ValidationError::InvalidPriority(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_lattice_allows_re_review() {
        use DriverStatus::*;
        assert!(Pending.permits(Approved));
        assert!(Pending.permits(Rejected));
        assert!(Approved.permits(Rejected));
        assert!(Rejected.permits(Approved));
        assert!(!Approved.permits(Approved));
        assert!(!Approved.permits(Pending));
        assert!(!Rejected.permits(Pending));
    }

    #[test]
    fn request_lattice_is_one_way_with_cancel_arms() {
        use RequestStatus::*;
        assert!(Pending.permits(Accepted));
        assert!(Accepted.permits(Completed));
        assert!(Pending.permits(Cancelled));
        assert!(Accepted.permits(Cancelled));
        assert!(!Completed.permits(Cancelled));
        assert!(!Cancelled.permits(Accepted));
        assert!(!Completed.permits(Pending));
        assert!(Completed.is_terminal());
        assert!(Cancelled.is_terminal());
        assert!(!Accepted.is_terminal());
    }

    #[test]
    fn legacy_status_spellings_decode_as_accepted() {
        assert_eq!("active".parse::<RequestStatus>().unwrap(), RequestStatus::Accepted);
        assert_eq!(
            "in_progress".parse::<RequestStatus>().unwrap(),
            RequestStatus::Accepted
        );
    }

    #[test]
    fn unknown_statuses_default_to_pending_leniently() {
        assert_eq!(
            RequestStatus::parse_or_default(Some("dispatched")),
            RequestStatus::Pending
        );
        assert_eq!(DriverStatus::parse_or_default(None), DriverStatus::Pending);
        assert!(matches!(
            "dispatched".parse::<RequestStatus>(),
            Err(ValidationError::InvalidStatus(_))
        ));
    }
}
