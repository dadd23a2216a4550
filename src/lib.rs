pub mod config;
pub mod error;
pub mod graph;
pub mod ir;
pub mod lower;
pub mod model;
pub mod parse;
pub mod preview;
pub mod tekton;
pub mod wasm;
