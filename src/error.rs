use thiserror::Error;

/// Failures of a store transition. Each maps onto an IPC error code.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("invalid month: {0} (expected YYYY-MM)")]
    InvalidMonth(String),
    #[error("unknown weekday: {0}")]
    UnknownWeekday(String),
    #[error("slot {slot_id} is not scheduled on {day}")]
    UnknownSlot { slot_id: String, day: String },
    #[error("student not found: {0}")]
    StudentNotFound(String),
    #[error("instructor not found: {0}")]
    InstructorNotFound(String),
    #[error("skill not found: {0}")]
    SkillNotFound(String),
    #[error("student already exists: {0}")]
    DuplicateStudent(String),
    #[error("instructor already exists: {0}")]
    DuplicateInstructor(String),
    #[error("student {student_id} is not in slot {slot_id}")]
    NotInSlot { student_id: String, slot_id: String },
    #[error("slot {0} is full")]
    SlotFull(String),
    #[error("{0}")]
    Invalid(String),
}

impl DomainError {
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::InvalidDate(_)
            | DomainError::InvalidMonth(_)
            | DomainError::UnknownWeekday(_)
            | DomainError::UnknownSlot { .. }
            | DomainError::NotInSlot { .. }
            | DomainError::Invalid(_) => "bad_params",
            DomainError::StudentNotFound(_)
            | DomainError::InstructorNotFound(_)
            | DomainError::SkillNotFound(_) => "not_found",
            DomainError::DuplicateStudent(_)
            | DomainError::DuplicateInstructor(_)
            | DomainError::SlotFull(_) => "conflict",
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
