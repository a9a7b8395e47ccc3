use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::catalog::pipeline::ProductQuery;
use crate::catalog::Catalog;
use crate::domain::category::Category;
use crate::domain::product::Product;
use crate::gateway::{CatalogReader, GatewayError};
use crate::search::RequestSequence;

/// Shared holder of the current catalog snapshot.
///
/// Readers clone the `Arc` and never block a refresh. A failed refresh keeps
/// the previous snapshot. Every write takes a ticket, so a refresh that was
/// overtaken by a newer refresh or replacement is not published.
pub struct CatalogStore {
    tx: watch::Sender<Arc<Catalog>>,
    sequence: RequestSequence,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new(Catalog::default())
    }
}

impl CatalogStore {
    pub fn new(catalog: Catalog) -> Self {
        let (tx, _) = watch::channel(Arc::new(catalog));
        Self { tx, sequence: RequestSequence::default() }
    }

    pub fn snapshot(&self) -> Arc<Catalog> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Catalog>> {
        self.tx.subscribe()
    }

    pub fn replace_products(&self, products: Vec<Product>) -> Arc<Catalog> {
        self.publish(|current| current.with_products(products))
    }

    pub fn replace_categories(&self, categories: Vec<Category>) -> Arc<Catalog> {
        self.publish(|current| current.with_categories(categories))
    }

    pub fn view(&self, query: &ProductQuery) -> Vec<Product> {
        self.snapshot().view(query)
    }

    /// Reloads products and categories together.
    ///
    /// When a newer refresh or replacement lands first, the fetched data is
    /// dropped and the snapshot current at that point is returned.
    pub async fn refresh(&self, gateway: &dyn CatalogReader) -> Result<Arc<Catalog>, GatewayError> {
        let ticket = self.sequence.issue();
        let fetched = async {
            let products = gateway.list_products(None, None).await?;
            let categories = gateway.list_categories().await?;
            Ok::<_, GatewayError>((products, categories))
        }
        .await;

        match fetched {
            Ok((products, categories)) => {
                let next = Arc::new(Catalog::new(products, categories));
                let published = self.tx.send_if_modified(|current| {
                    if !self.sequence.is_current(ticket) {
                        return false;
                    }
                    *current = Arc::clone(&next);
                    true
                });

                if !published {
                    debug!(
                        event_name = "catalog.store.refresh_superseded",
                        "discarding refresh overtaken by a newer write"
                    );
                    return Ok(self.snapshot());
                }

                info!(
                    event_name = "catalog.store.refreshed",
                    products = next.products().len(),
                    categories = next.categories().len(),
                    "catalog snapshot replaced"
                );
                Ok(next)
            }
            Err(error) => {
                warn!(
                    event_name = "catalog.store.refresh_failed",
                    error_class = error.class(),
                    error = %error,
                    "keeping previous catalog snapshot"
                );
                Err(error)
            }
        }
    }

    // The read-modify-write runs under the channel's write lock.
    fn publish(&self, update: impl FnOnce(&Catalog) -> Catalog) -> Arc<Catalog> {
        self.sequence.issue();
        let mut published = None;
        self.tx.send_modify(|current| {
            let next = Arc::new(update(current));
            *current = Arc::clone(&next);
            published = Some(next);
        });
        published.unwrap_or_else(|| self.snapshot())
    }
}
