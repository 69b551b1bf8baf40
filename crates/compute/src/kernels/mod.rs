// This module re-exports handlers for each kernel operation.

// Rendering
pub mod sphere_trace_op;
pub use sphere_trace_op::handle_sphere_trace;
