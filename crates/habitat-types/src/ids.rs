//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every entity the task engine touches has a strongly-typed ID so that a
//! station can never be confused with a computing node at compile time.
//! All IDs use UUID v7 (time-ordered), which keeps `BTreeMap` iteration in
//! creation order.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a colonist.
    AgentId
}

define_id! {
    /// Unique identifier for a seated work station (office desk, console).
    StationId
}

define_id! {
    /// Unique identifier for a piece of equipment that needs maintenance.
    TargetId
}

define_id! {
    /// Unique identifier for a computing node.
    NodeId
}

define_id! {
    /// Unique identifier for a vehicle.
    VehicleId
}

define_id! {
    /// Unique identifier for a task instance.
    TaskId
}
