//! The abstract bounded-lattice contract that parameterizes the forward
//! dataflow engine (see [`crate::analysis::forward`]).
//!
//! Abstraps's `absint.rs` hard-codes its own ad hoc `LatticeJoin` trait
//! with only a `join` method and no `top`/`bottom`/`meet`/`leq`; this module
//! generalizes that into a full lattice contract,
//! in the same spirit as abstraps's `LatticeJoin`/`LatticeSemantics` split.

use std::fmt::Debug;

/// A bounded lattice: has a greatest element (`top`), a least element
/// (`bottom`), and commutative, associative, idempotent `join`/`meet`.
///
/// Implementers must guarantee a finite-depth ascending chain from `bottom`
/// to `top` — the forward dataflow driver's termination argument
/// depends on it.
pub trait Lattice: Clone + Debug + PartialEq {
    fn top() -> Self;
    fn bottom() -> Self;
    fn join(&self, other: &Self) -> Self;
    fn meet(&self, other: &Self) -> Self;

    /// `self ⊑ other`. Has a default derived from `join`, since `a ⊑ b` iff
    /// `a ⊔ b == b` for any join-semilattice; override when a direct
    /// comparison is cheaper.
    fn leq(&self, other: &Self) -> bool {
        &self.join(other) == other
    }
}

/// Lifts any `Lattice` into the flat two-point-plus-payload lattice:
/// `Bottom ⊏ Singleton(v) ⊏ Top`, with all distinct payloads incomparable.
/// This is the singleton machinery the lattice kernel calls for:
/// most concrete analyses (a literal `i64`, a resolved symbol name, …) only
/// need exactly this shape and would otherwise hand-roll it per use site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Flat<T> {
    Bottom,
    Value(T),
    Top,
}

impl<T: Clone + Debug + PartialEq> Lattice for Flat<T> {
    fn top() -> Self {
        Flat::Top
    }

    fn bottom() -> Self {
        Flat::Bottom
    }

    fn join(&self, other: &Self) -> Self {
        match (self, other) {
            (Flat::Bottom, x) | (x, Flat::Bottom) => x.clone(),
            (Flat::Top, _) | (_, Flat::Top) => Flat::Top,
            (Flat::Value(a), Flat::Value(b)) if a == b => Flat::Value(a.clone()),
            _ => Flat::Top,
        }
    }

    fn meet(&self, other: &Self) -> Self {
        match (self, other) {
            (Flat::Top, x) | (x, Flat::Top) => x.clone(),
            (Flat::Bottom, _) | (_, Flat::Bottom) => Flat::Bottom,
            (Flat::Value(a), Flat::Value(b)) if a == b => Flat::Value(a.clone()),
            _ => Flat::Bottom,
        }
    }
}

/// The pointwise product of two lattices — the mechanism behind
/// `analysis::joint`'s `(type, const, purity)` combination.
#[derive(Clone, Debug, PartialEq)]
pub struct Product<A, B>(pub A, pub B);

impl<A: Lattice, B: Lattice> Lattice for Product<A, B> {
    fn top() -> Self {
        Product(A::top(), B::top())
    }

    fn bottom() -> Self {
        Product(A::bottom(), B::bottom())
    }

    fn join(&self, other: &Self) -> Self {
        Product(self.0.join(&other.0), self.1.join(&other.1))
    }

    fn meet(&self, other: &Self) -> Self {
        Product(self.0.meet(&other.0), self.1.meet(&other.1))
    }

    fn leq(&self, other: &Self) -> bool {
        self.0.leq(&other.0) && self.1.leq(&other.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_join_same_value_is_identity() {
        let a = Flat::Value(3);
        let b = Flat::Value(3);
        assert_eq!(a.join(&b), Flat::Value(3));
    }

    #[test]
    fn flat_join_different_values_widens_to_top() {
        let a = Flat::Value(3);
        let b = Flat::Value(4);
        assert_eq!(a.join(&b), Flat::<i64>::Top);
    }

    #[test]
    fn flat_bottom_is_identity_for_join() {
        let a = Flat::Value(3);
        assert_eq!(Flat::Bottom.join(&a), a);
    }

    #[test]
    fn product_leq_is_pointwise() {
        let a = Product(Flat::Value(1), Flat::<i64>::Bottom);
        let b = Product(Flat::Value(1), Flat::Value(2));
        assert!(a.leq(&b));
        assert!(!b.leq(&a));
    }
}
