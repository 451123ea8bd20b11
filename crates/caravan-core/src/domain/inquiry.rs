//! Inquiry entity
//!
//! Inquiry status is monotonic: pending -> responded -> closed, and closed
//! is terminal. Approval status is a separate admin-driven field; approving
//! marks the inquiry responded, rejecting closes it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::Oid;
use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InquiryStatus {
    Pending,
    Responded,
    Closed,
}

impl InquiryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InquiryStatus::Pending => "pending",
            InquiryStatus::Responded => "responded",
            InquiryStatus::Closed => "closed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(InquiryStatus::Pending),
            "responded" => Some(InquiryStatus::Responded),
            "closed" => Some(InquiryStatus::Closed),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            InquiryStatus::Pending => 0,
            InquiryStatus::Responded => 1,
            InquiryStatus::Closed => 2,
        }
    }
}

impl Default for InquiryStatus {
    fn default() -> Self {
        InquiryStatus::Pending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

/// Admin ratification status of an inquiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ApprovalStatus::Pending),
            "approved" => Some(ApprovalStatus::Approved),
            "rejected" => Some(ApprovalStatus::Rejected),
            _ => None,
        }
    }
}

impl Default for ApprovalStatus {
    fn default() -> Self {
        ApprovalStatus::Pending
    }
}

/// One response in an inquiry's append-only thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InquiryResponse {
    pub responder: Oid,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Inquiry {
    pub id: Oid,

    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    pub phone: Option<String>,

    #[validate(length(min = 1, message = "must not be empty"))]
    pub subject: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub message: String,

    pub priority: Priority,
    pub status: InquiryStatus,
    pub approval_status: ApprovalStatus,

    pub assigned_agent: Option<Oid>,
    pub related_booking: Option<Oid>,

    /// Append-only, insertion order preserved.
    pub responses: Vec<InquiryResponse>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Inquiry {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: String,
        email: String,
        phone: Option<String>,
        subject: String,
        message: String,
        priority: Priority,
        related_booking: Option<Oid>,
    ) -> Result<Self, DomainError> {
        let inquiry = Self {
            id: Oid::new(),
            name: name.trim().to_string(),
            email: email.trim().to_lowercase(),
            phone,
            subject: subject.trim().to_string(),
            message,
            priority,
            status: InquiryStatus::Pending,
            approval_status: ApprovalStatus::Pending,
            assigned_agent: None,
            related_booking,
            responses: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        inquiry.validate()?;
        Ok(inquiry)
    }

    /// Advance the status. Monotonic only; closed is terminal.
    pub fn set_status(&mut self, target: InquiryStatus) -> Result<(), DomainError> {
        if self.status == InquiryStatus::Closed {
            return Err(DomainError::IllegalTransition {
                from: "closed",
                action: "set status",
            });
        }
        if target.rank() < self.status.rank() {
            return Err(DomainError::IllegalTransition {
                from: self.status.as_str(),
                action: "regress status",
            });
        }
        self.status = target;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Admin ratification: approved inquiries are considered responded.
    /// Illegal once closed, since it would pull status back out of the
    /// terminal state.
    pub fn approve(&mut self) -> Result<(), DomainError> {
        if self.status == InquiryStatus::Closed {
            return Err(DomainError::IllegalTransition {
                from: "closed",
                action: "approve",
            });
        }
        self.approval_status = ApprovalStatus::Approved;
        self.status = InquiryStatus::Responded;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Admin rejection closes the inquiry.
    pub fn reject(&mut self) {
        self.approval_status = ApprovalStatus::Rejected;
        self.status = InquiryStatus::Closed;
        self.updated_at = Utc::now();
    }

    /// Append a response in arrival order. The first response while still
    /// pending advances the status to responded; repeats while already
    /// responded only append.
    pub fn record_response(&mut self, responder: Oid, message: String) -> &InquiryResponse {
        self.responses.push(InquiryResponse {
            responder,
            message,
            created_at: Utc::now(),
        });
        if self.status == InquiryStatus::Pending {
            self.status = InquiryStatus::Responded;
        }
        self.updated_at = Utc::now();
        // Just pushed, the vec cannot be empty.
        self.responses.last().unwrap_or_else(|| unreachable!())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inquiry() -> Inquiry {
        Inquiry::new(
            "Fatima Noor".into(),
            "fatima@example.com".into(),
            None,
            "Visa processing time".into(),
            "How long does the visa usually take?".into(),
            Priority::High,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_new_inquiry_is_pending() {
        let inq = inquiry();
        assert_eq!(inq.status, InquiryStatus::Pending);
        assert_eq!(inq.approval_status, ApprovalStatus::Pending);
        assert!(inq.responses.is_empty());
    }

    #[test]
    fn test_status_is_monotonic() {
        let mut inq = inquiry();
        inq.set_status(InquiryStatus::Responded).unwrap();
        assert!(matches!(
            inq.set_status(InquiryStatus::Pending),
            Err(DomainError::IllegalTransition { .. })
        ));
        inq.set_status(InquiryStatus::Closed).unwrap();
        assert!(matches!(
            inq.set_status(InquiryStatus::Responded),
            Err(DomainError::IllegalTransition { .. })
        ));
    }

    #[test]
    fn test_closed_is_terminal() {
        let mut inq = inquiry();
        inq.set_status(InquiryStatus::Closed).unwrap();
        assert!(inq.set_status(InquiryStatus::Closed).is_err());
        assert!(inq.approve().is_err());
        assert_eq!(inq.status, InquiryStatus::Closed);
    }

    #[test]
    fn test_approve_marks_responded() {
        let mut inq = inquiry();
        inq.approve().unwrap();
        assert_eq!(inq.approval_status, ApprovalStatus::Approved);
        assert_eq!(inq.status, InquiryStatus::Responded);
    }

    #[test]
    fn test_reject_closes() {
        let mut inq = inquiry();
        inq.reject();
        assert_eq!(inq.approval_status, ApprovalStatus::Rejected);
        assert_eq!(inq.status, InquiryStatus::Closed);
    }

    #[test]
    fn test_first_response_advances_once() {
        let mut inq = inquiry();
        let agent = Oid::new();
        inq.record_response(agent.clone(), "We will confirm shortly.".into());
        assert_eq!(inq.status, InquiryStatus::Responded);
        inq.record_response(agent.clone(), "Usually 5 working days.".into());
        // Second response appends without re-triggering a transition.
        assert_eq!(inq.status, InquiryStatus::Responded);
        assert_eq!(inq.responses.len(), 2);
        assert_eq!(inq.responses[0].message, "We will confirm shortly.");
        assert_eq!(inq.responses[1].message, "Usually 5 working days.");
    }

    #[test]
    fn test_responses_keep_arrival_order() {
        let mut inq = inquiry();
        let agent = Oid::new();
        for i in 0..5 {
            inq.record_response(agent.clone(), format!("message {i}"));
        }
        let messages: Vec<_> = inq.responses.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(
            messages,
            ["message 0", "message 1", "message 2", "message 3", "message 4"]
        );
    }
}
