//! Runtime execution for Lumen programs: values, scoping, evaluation

mod builtins;
mod environment;
mod evaluator;
mod value;

pub use builtins::Builtin;
pub use environment::{Environment, FrameId};
pub use evaluator::Evaluator;
pub use value::{Function, Value, ValueKind};
