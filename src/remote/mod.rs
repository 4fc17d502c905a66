//! HeadHunter web frontend collaborator.
//!
//! [`HhClient`] is both the [`ItemSource`] (resume list scrape, with a login
//! handshake on 403) and the [`RefreshAction`] (resume "touch").

mod auth;
mod boost;
mod client;
mod resumes;

use async_trait::async_trait;

pub use client::HhClient;

use crate::discovery::ItemSource;
use crate::domain::Item;
use crate::error::Result;
use crate::scheduler::RefreshAction;

#[async_trait]
impl ItemSource for HhClient {
    async fn poll(&self) -> Result<Vec<Item>> {
        self.fetch_resumes().await
    }
}

#[async_trait]
impl RefreshAction for HhClient {
    async fn refresh(&self, item: &Item) -> Result<()> {
        self.boost(item).await?;
        tracing::info!(title = %item.title, "Boosted resume");
        Ok(())
    }
}
