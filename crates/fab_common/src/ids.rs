//! Opaque ID newtypes for placement-engine entities.
//!
//! [`SlotId`], [`InstanceId`], [`NetId`], and [`PinId`] are thin `u32`
//! wrappers used as arena indices into the fabric, netlist, and placement
//! state. They are `Copy`, `Hash`, `Ord`, and `Serialize`/`Deserialize`.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Opaque, copyable ID for a slot (physical site) on the fabric.
    SlotId
);

define_id!(
    /// Opaque, copyable ID for a logical instance in the netlist.
    InstanceId
);

define_id!(
    /// Opaque, copyable ID for a net (hyperedge) in the netlist.
    NetId
);

define_id!(
    /// Opaque, copyable ID for a pin occurrence on an instance.
    PinId
);
