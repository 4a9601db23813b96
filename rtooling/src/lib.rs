//! Capability layer for describing, validating and executing tools.
//!
//! A [`ToolRegistry`] is the model-facing catalog; a [`ToolSet`] pairs that
//! catalog with the [`ToolAdapter`] implementations behind each entry.

pub mod adapters;
mod adapter;
mod args;
mod descriptor;
mod dispatcher;
mod envelope;
mod error;
mod hooks;
mod registry;
mod timeout;
mod toolset;
mod types;

pub mod prelude {
    pub use crate::{
        Envelope, ErrorDetail, FunctionAdapter, ParameterSpec, ParameterType, Parameters,
        ToolAdapter, ToolCallRequest, ToolDescriptor, ToolDispatcher, ToolError, ToolErrorKind,
        ToolExecutionContext, ToolFuture, ToolRegistry, ToolResult, ToolSet, ValidationResult,
    };
}

pub use adapter::{FunctionAdapter, ToolAdapter, ToolFuture};
pub use args::{parse_json_object, parse_json_value, required_string};
pub use descriptor::{
    ParameterSpec, ParameterType, ParameterViolation, Parameters, ToolDescriptor,
    ValidationResult,
};
pub use dispatcher::ToolDispatcher;
pub use envelope::{Envelope, ErrorDetail};
pub use error::{RegistryError, RegistryErrorKind, ToolError, ToolErrorKind};
pub use hooks::{NoopToolRuntimeHooks, ToolRuntimeHooks};
pub use registry::ToolRegistry;
pub use timeout::execute_with_timeout;
pub use toolset::ToolSet;
pub use types::{ToolCallRequest, ToolExecutionContext, ToolResult};
