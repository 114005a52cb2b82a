//! Deterministic naming for SSA values, blocks, and regions.
//!
//! Mirrors abstraps's `Var` newtype (`core::ir::Var`), generalized into three
//! distinct identifier kinds so printing/serialization never has to guess
//! which namespace an index belongs to.

use std::fmt;

macro_rules! ident {
    ($name:ident, $sigil:expr) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(usize);

        impl $name {
            pub fn new(id: usize) -> Self {
                $name(id)
            }

            pub fn index(&self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}{}", $sigil, self.0)
            }
        }
    };
}

ident!(BlockId, "^bb");
ident!(RegionId, "#r");

/// Monotonically-increasing counter handed out by a [`Region`](crate::core::ir::RegionData)
/// so printers can assign stable `%N` names to SSA values without re-deriving
/// them from the use-def graph on every print.
#[derive(Debug, Default)]
pub struct IdentTable {
    next: usize,
}

impl IdentTable {
    pub fn new() -> Self {
        IdentTable { next: 0 }
    }

    pub fn fresh(&mut self) -> usize {
        let id = self.next;
        self.next += 1;
        id
    }
}
