//! Observability for toolrelay: structured logs and metrics for dispatch,
//! provider and orchestration events.
//!
//! Each concern implements the hook traits from `rtooling`, `rprovider` and
//! `rchat`. [`standard_hooks`] fans events out to both the tracing and the
//! metrics implementation; wrap it in [`Guarded`] so a panicking recorder
//! cannot take a request down with it.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use robserve::{Guarded, standard_hooks};
//! use rtooling::ToolRuntimeHooks;
//!
//! let hooks: Arc<dyn ToolRuntimeHooks> = Arc::new(Guarded::new(standard_hooks()));
//! # let _ = hooks;
//! ```

mod fanout;
mod guarded;
mod metrics_hooks;
mod tracing_hooks;

pub use fanout::{Fanout, StandardHooks, standard_hooks};
pub use guarded::Guarded;
pub use metrics_hooks::MetricsObservabilityHooks;
pub use tracing_hooks::TracingObservabilityHooks;

pub mod prelude {
    pub use crate::{
        Fanout, Guarded, MetricsObservabilityHooks, StandardHooks, TracingObservabilityHooks,
        standard_hooks,
    };
}
