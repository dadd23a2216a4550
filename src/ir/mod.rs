pub mod types;

pub use types::{DeclaredTask, PipelineRunTask, RunState, TaskKind, push_unique};
