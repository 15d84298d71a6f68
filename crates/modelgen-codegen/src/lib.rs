//! TypeScript model generation
//!
//! Turns catalog metadata into `tsooq` table classes. Everything here is pure
//! except [`writer::emit`], which writes the rendered module to disk.

pub mod naming;
pub mod render;
pub mod writer;

pub use naming::{to_constant_name, to_output_type, to_type_name};
pub use render::render_module;
pub use writer::{emit, output_path, EmitError, OUTPUT_EXTENSION};
