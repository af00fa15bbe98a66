//! Bounded external-call dispatcher shared by every server profile.
//!
//! registry -> dispatch -> invoker -> render

pub mod dispatch;
pub mod invoker;
pub mod model;
pub mod registry;
pub mod render;

#[cfg(test)]
pub mod test_support;

pub use dispatch::Dispatcher;
pub use invoker::{ExternalInvoker, Invoker};
pub use model::{CommandRequest, ExternalRequest, HttpGetRequest, ResponseEnvelope};
pub use registry::{ArgumentError, Operation, OperationSpec, Plan, Registry, RegistryError};
pub use render::{GitHubScope, TemplateKind};
