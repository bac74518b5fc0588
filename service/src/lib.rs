use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

pub mod appointment;
pub mod availability;
pub mod buffer;
pub mod cache;
pub mod clock;
pub mod conflict;
pub mod config;
pub mod dependency;
pub mod notification;
pub mod package;
pub mod prediction;
pub mod resource;
pub mod scheduler;
pub mod shop;
pub mod specialist;
pub mod svc;
pub mod uuid_service;

pub use conflict::{ConflictDiagnosis, ConflictKind};

/// Which side of a buffer pair a violation or adjustment applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferSide {
    Before,
    After,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("repository error: {0}")]
    Repository(#[from] dao::DaoError),

    #[error("{kind} {id} not found")]
    NotFound { kind: dao::EntityKind, id: Uuid },

    #[error("malformed date")]
    InvalidDate,

    #[error("candidate window has zero or negative duration")]
    InvalidWindow,

    #[error("service is not active")]
    ServiceNotActive,

    #[error("cannot transition appointment from {from:?} to {to:?}")]
    InvalidStatusTransition {
        from: appointment::AppointmentStatus,
        to: appointment::AppointmentStatus,
    },

    #[error("booking conflict")]
    Conflict(ConflictDiagnosis),

    #[error("insufficient buffer {side:?}, short by {deficit_minutes} minutes")]
    InsufficientBuffer {
        side: BufferSide,
        deficit_minutes: i32,
    },

    #[error("adjustment would shorten the appointment below the minimum duration")]
    TooShort,

    #[error("transient repository failure, retry the request")]
    Retryable,

    #[error("fatal error, transaction rolled back: {0}")]
    Fatal(Arc<str>),
}
