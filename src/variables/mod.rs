//! Variable spaces: declaration, composition across inheritance, and
//! injection onto target types.

mod inject;
mod layout;
mod local;
mod space;
mod var;

pub use layout::{Instance, SlotError, SlotId, TypeLayout};
pub use local::LocalVarSpace;
pub use space::{DigestError, VarSpace, VariableSnapshot};
pub use var::{Action, Declaration, DefaultValue, Variable};
