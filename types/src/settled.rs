use std::fmt;

use serde::{Deserialize, Serialize};

/// Tag of a [`Settled`] outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettleStatus {
    Fulfilled,
    Rejected,
}

impl SettleStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SettleStatus::Fulfilled => "fulfilled",
            SettleStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for SettleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of exactly one executor invocation.
///
/// Serializes as `{"status": "fulfilled", "value": ..}` or
/// `{"status": "rejected", "reason": ..}`. A sum type rather than a record
/// with optional fields: a value and a reason can never coexist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Settled<V, E> {
    Fulfilled { value: V },
    Rejected { reason: E },
}

impl<V, E> Settled<V, E> {
    #[must_use]
    pub const fn fulfilled(value: V) -> Self {
        Settled::Fulfilled { value }
    }

    #[must_use]
    pub const fn rejected(reason: E) -> Self {
        Settled::Rejected { reason }
    }

    #[must_use]
    pub const fn status(&self) -> SettleStatus {
        match self {
            Settled::Fulfilled { .. } => SettleStatus::Fulfilled,
            Settled::Rejected { .. } => SettleStatus::Rejected,
        }
    }

    #[must_use]
    pub const fn is_fulfilled(&self) -> bool {
        matches!(self, Settled::Fulfilled { .. })
    }

    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Settled::Rejected { .. })
    }

    #[must_use]
    pub const fn value(&self) -> Option<&V> {
        match self {
            Settled::Fulfilled { value } => Some(value),
            Settled::Rejected { .. } => None,
        }
    }

    #[must_use]
    pub const fn reason(&self) -> Option<&E> {
        match self {
            Settled::Fulfilled { .. } => None,
            Settled::Rejected { reason } => Some(reason),
        }
    }

    pub fn into_result(self) -> Result<V, E> {
        match self {
            Settled::Fulfilled { value } => Ok(value),
            Settled::Rejected { reason } => Err(reason),
        }
    }

    /// Maps the fulfilled value, leaving a rejection untouched.
    pub fn map<U>(self, f: impl FnOnce(V) -> U) -> Settled<U, E> {
        match self {
            Settled::Fulfilled { value } => Settled::Fulfilled { value: f(value) },
            Settled::Rejected { reason } => Settled::Rejected { reason },
        }
    }

    pub fn map_reason<R>(self, f: impl FnOnce(E) -> R) -> Settled<V, R> {
        match self {
            Settled::Fulfilled { value } => Settled::Fulfilled { value },
            Settled::Rejected { reason } => Settled::Rejected { reason: f(reason) },
        }
    }
}

impl<V, E> From<Result<V, E>> for Settled<V, E> {
    fn from(result: Result<V, E>) -> Self {
        match result {
            Ok(value) => Settled::Fulfilled { value },
            Err(reason) => Settled::Rejected { reason },
        }
    }
}

impl<V, E> From<Settled<V, E>> for Result<V, E> {
    fn from(settled: Settled<V, E>) -> Self {
        settled.into_result()
    }
}
