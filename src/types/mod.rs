//! Core type definitions using newtype patterns for type safety.
//!
//! Template ids, port lists and targets are validated once at the edge so the
//! dispatch layer never sees malformed input.

mod port;
mod target;
mod template_id;

pub use port::{Port, PortError, PortRange, PortSpec};
pub use target::{TargetError, TargetSpec};
pub use template_id::{TemplateId, TemplateIdError};
