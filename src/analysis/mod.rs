//! Analysis engines built on top of `core`:
//! the concrete interpreter, the generic forward dataflow driver and its
//! constant-propagation/type-inference/joint instantiations, CFG/dominator
//! extraction, and the call graph.

pub mod callgraph;
pub mod cfg;
pub mod const_prop;
pub mod forward;
pub mod interp;
pub mod joint;
pub mod typeinfer;

pub use callgraph::CallGraph;
pub use cfg::Cfg;
pub use const_prop::ConstLattice;
pub use forward::{AbstractOutcome, ForwardDriver, ForwardResult};
pub use interp::{Interpreter, Program};
pub use joint::JointResult;
pub use typeinfer::infer;
