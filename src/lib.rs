//! varspace - composable variable namespaces
//!
//! Definitions declare typed variables with optional default values. A
//! definition's namespace is composed from its parents' namespaces and its
//! own declarations, checked against the members of the target type, and
//! injected onto new instances as validated slot values.

pub mod config;
pub mod error;
pub mod registry;
pub mod report;
pub mod snapshot;
pub mod variables;

pub use config::{ConfigError, EffectiveSettings, LoadedDefinitions, Settings};
pub use error::VarSpaceError;
pub use registry::{Definition, DefinitionRegistry};
pub use report::{BufferSink, LogSink, ReportSink};
pub use snapshot::{ComposeSummary, InstanceSummary, SlotSummary, SummaryError};
pub use variables::{
    Action, DefaultValue, Instance, LocalVarSpace, TypeLayout, VarSpace, Variable,
};
pub use varspace_fields::{Field, FieldArgs, FieldError, FieldFactory, FieldRegistry};
