//! Wishlist: a per-shopper set of products.

use tracing::instrument;

use ironmonger_core::{ProductId, UserId};

use super::CommerceError;
use crate::db::{CatalogStore, WishlistStore};
use crate::models::WishlistView;

pub struct WishlistService<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> WishlistService<'a, S>
where
    S: CatalogStore + WishlistStore + ?Sized,
{
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// # Errors
    ///
    /// Returns `CommerceError::Repository` on storage failure.
    #[instrument(skip(self), fields(shopper_id = %shopper))]
    pub async fn get(&self, shopper: UserId) -> Result<WishlistView, CommerceError> {
        let ids = self.store.wishlist_products(shopper).await?;
        let products = self.store.find_products(&ids).await?;
        Ok(WishlistView::build(shopper, &ids, &products))
    }

    /// # Errors
    ///
    /// Returns `CommerceError::NotFound` if the product does not exist and
    /// `CommerceError::AlreadyExists` if it is already listed.
    #[instrument(skip(self), fields(shopper_id = %shopper))]
    pub async fn add(
        &self,
        shopper: UserId,
        product: ProductId,
    ) -> Result<WishlistView, CommerceError> {
        if self.store.find_product(product).await?.is_none() {
            return Err(CommerceError::not_found("Product not found"));
        }
        if !self.store.add_wishlist_product(shopper, product).await? {
            return Err(CommerceError::AlreadyExists(
                "Product already in wishlist".to_owned(),
            ));
        }
        self.get(shopper).await
    }

    /// # Errors
    ///
    /// Returns `CommerceError::NotFound` if the product is not listed.
    #[instrument(skip(self), fields(shopper_id = %shopper))]
    pub async fn remove(
        &self,
        shopper: UserId,
        product: ProductId,
    ) -> Result<WishlistView, CommerceError> {
        if !self.store.remove_wishlist_product(shopper, product).await? {
            return Err(CommerceError::not_found("Product not found in wishlist"));
        }
        self.get(shopper).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::services::test_support::{product, shopper};

    #[tokio::test]
    async fn test_add_twice_is_rejected() {
        let store = MemoryStore::new();
        let user = shopper(&store).await;
        let p1 = store.insert_product(product("Vise", 40, 1)).await;
        let service = WishlistService::new(&store);

        service.add(user, p1).await.unwrap();
        let err = service.add(user, p1).await.unwrap_err();

        assert!(matches!(err, CommerceError::AlreadyExists(_)));
        assert_eq!(service.get(user).await.unwrap().products.len(), 1);
    }

    #[tokio::test]
    async fn test_add_missing_product() {
        let store = MemoryStore::new();
        let user = shopper(&store).await;

        let err = WishlistService::new(&store)
            .add(user, ProductId::new(77))
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_remove() {
        let store = MemoryStore::new();
        let user = shopper(&store).await;
        let p1 = store.insert_product(product("Vise", 40, 1)).await;
        let p2 = store.insert_product(product("Clamp", 12, 1)).await;
        let service = WishlistService::new(&store);

        assert!(matches!(
            service.remove(user, p1).await.unwrap_err(),
            CommerceError::NotFound(_)
        ));

        service.add(user, p1).await.unwrap();
        service.add(user, p2).await.unwrap();
        let view = service.remove(user, p1).await.unwrap();
        assert_eq!(view.products.len(), 1);
        assert_eq!(view.products[0].id, p2);

        assert!(matches!(
            service.remove(user, p1).await.unwrap_err(),
            CommerceError::NotFound(_)
        ));
    }
}
