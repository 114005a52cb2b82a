//! The kernel's core data model:
//! identifiers, attributes (including the type lattice), the IR graph,
//! dialects/registries, the statement trait system, the builder, `Method`,
//! and error types. `analysis` and `rewrite` build on top of this module;
//! nothing in here depends on them.

pub mod attribute;
pub mod builder;
pub mod diagnostics;
pub mod dialect;
pub mod ident;
pub mod ir;
pub mod lattice;
pub mod method;
pub mod traits;
pub mod value;

pub use attribute::{Attribute, Literal, LiteralAttr, SymbolAttr, TypeAttribute};
pub use builder::{GlobalBinding, IrBuilder};
pub use diagnostics::{KernelError, LocationInfo, Result};
pub use dialect::{Dialect, DialectGroup, Registry, Signature, Table};
pub use ident::{BlockId, IdentTable, RegionId};
pub use ir::{BlockData, RegionData, StatementData, StatementKind, StatementView, StructuralEqContext};
pub use lattice::{Flat, Lattice, Product};
pub use method::Method;
pub use traits::{verify_traits, CallableStmtInterface, SymbolOpInterface, Trait};
pub use value::{SSAValue, StmtId, Use};
