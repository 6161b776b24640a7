use revcast_core::TenantId;

use crate::job::{AnalyticsJob, JobError};

/// Tenant scope for execution.
///
/// - `Any`: run jobs for any tenant (shared workers).
/// - `Tenant`: only accept jobs for the specified tenant.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TenantScope {
    Any,
    Tenant(TenantId),
}

impl TenantScope {
    pub fn allows(&self, tenant_id: TenantId) -> bool {
        match self {
            TenantScope::Any => true,
            TenantScope::Tenant(t) => *t == tenant_id,
        }
    }
}

/// Executor for analytics jobs.
pub trait JobScheduler: Send + Sync + 'static {
    fn scope(&self) -> TenantScope;

    fn run<J: AnalyticsJob>(&self, job: J) -> Result<J::Output, JobError> {
        if !self.scope().allows(job.tenant_id()) {
            return Err(JobError::InvalidInput(
                "tenant scope violation (job tenant not allowed by scheduler)".to_string(),
            ));
        }
        job.run()
    }
}

/// Synchronous scheduler that runs jobs immediately in-process.
#[derive(Debug, Copy, Clone)]
pub struct LocalScheduler {
    scope: TenantScope,
}

impl LocalScheduler {
    pub fn new(scope: TenantScope) -> Self {
        Self { scope }
    }

    pub fn for_tenant(tenant_id: TenantId) -> Self {
        Self::new(TenantScope::Tenant(tenant_id))
    }
}

impl JobScheduler for LocalScheduler {
    fn scope(&self) -> TenantScope {
        self.scope
    }
}
