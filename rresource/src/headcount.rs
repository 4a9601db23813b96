use crate::{ResourceError, ResourceFuture};

/// Source of the organisation's employee count.
pub trait HeadcountSource: Send + Sync {
    fn employee_count<'a>(&'a self) -> ResourceFuture<'a, Result<u64, ResourceError>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticHeadcount(pub u64);

impl HeadcountSource for StaticHeadcount {
    fn employee_count<'a>(&'a self) -> ResourceFuture<'a, Result<u64, ResourceError>> {
        let count = self.0;
        Box::pin(async move { Ok(count) })
    }
}
