//! Typed integer handles into the network's flat arrays.
//!
//! Ids are `Copy + Ord + Hash`.  The inner `u32` is `pub` so hot loops can
//! index directly, but `.index()` reads better at call sites.

use std::fmt;

/// Generate a `u32` handle type.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub u32);

        impl $name {
            /// Sentinel for "no such element" (`u32::MAX`).
            pub const INVALID: $name = $name(u32::MAX);

            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// Handle for slot `i` of a flat array.
            ///
            /// # Panics
            /// Panics if `i` does not fit in a `u32` (more than ~4.3 billion
            /// elements).
            #[inline]
            pub fn from_index(i: usize) -> Self {
                $name(u32::try_from(i).expect(concat!(stringify!($name), " overflow")))
            }

            #[inline(always)]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl Default for $name {
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

typed_id! {
    /// A road-network node.  Ids at or past the base network's node count
    /// belong to a query's working overlay (snapped split points).
    pub struct NodeId;
}

typed_id! {
    /// A directed road-network edge.  Ids at or past the base network's
    /// edge count belong to a query's working overlay.
    pub struct EdgeId;
}
