//! Seam between the HTTP handlers and the lookup toolbox.

use async_trait::async_trait;
use netcheck_toolbox::{DomainLookupResult, LookupOptions, ToolboxResult, ToolboxService};

#[async_trait]
pub trait LookupGateway: Send + Sync {
    async fn domain_lookup(
        &self,
        domain: &str,
        options: &LookupOptions,
    ) -> ToolboxResult<DomainLookupResult>;
}

/// Forwards to [`ToolboxService`].
pub struct DefaultLookupGateway;

#[async_trait]
impl LookupGateway for DefaultLookupGateway {
    async fn domain_lookup(
        &self,
        domain: &str,
        options: &LookupOptions,
    ) -> ToolboxResult<DomainLookupResult> {
        ToolboxService::domain_lookup(domain, options).await
    }
}
