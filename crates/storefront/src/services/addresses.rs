//! Address book.
//!
//! A shopper with at least one address always has exactly one default.

use tracing::{debug, instrument};

use ironmonger_core::{AddressId, UserId};

use super::CommerceError;
use crate::db::AddressStore;
use crate::models::{Address, AddressInput};

pub struct AddressService<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> AddressService<'a, S>
where
    S: AddressStore + ?Sized,
{
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// # Errors
    ///
    /// Returns `CommerceError::Repository` on storage failure.
    #[instrument(skip(self), fields(shopper_id = %shopper))]
    pub async fn list(&self, shopper: UserId) -> Result<Vec<Address>, CommerceError> {
        Ok(self.store.list_addresses(shopper).await?)
    }

    /// # Errors
    ///
    /// Returns `CommerceError::NotFound` if the address is not the shopper's.
    #[instrument(skip(self), fields(shopper_id = %shopper))]
    pub async fn get(&self, shopper: UserId, id: AddressId) -> Result<Address, CommerceError> {
        self.find(shopper, id).await
    }

    /// Add an address. The first address, or one flagged `isDefault`, becomes
    /// the default.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::InvalidInput` listing any missing required field.
    #[instrument(skip(self, input), fields(shopper_id = %shopper))]
    pub async fn add(&self, shopper: UserId, input: AddressInput) -> Result<Address, CommerceError> {
        let requested_default = input.is_default == Some(true);
        let fields = input.into_fields().map_err(|missing| {
            CommerceError::invalid(format!(
                "Name, phone, addressLine1, city, state, and postalCode are required (missing: {})",
                missing.join(", ")
            ))
        })?;

        let make_default = requested_default || self.store.count_addresses(shopper).await? == 0;
        let address = self.store.insert_address(shopper, &fields, make_default).await?;

        debug!(address_id = %address.id, is_default = address.is_default, "Address added");
        Ok(address)
    }

    /// Partially update an address.
    ///
    /// `isDefault: true` makes it the default. `isDefault: false` never
    /// demotes the current default, since the shopper would be left without one.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::NotFound` if the address is not the shopper's.
    #[instrument(skip(self, input), fields(shopper_id = %shopper))]
    pub async fn update(
        &self,
        shopper: UserId,
        id: AddressId,
        input: &AddressInput,
    ) -> Result<Address, CommerceError> {
        let mut address = self.find(shopper, id).await?;
        input.apply_to(&mut address);
        if input.is_default == Some(true) {
            address.is_default = true;
        }
        self.store.save_address(&address).await?;
        Ok(address)
    }

    /// Delete an address, promoting another one if the default was removed.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::NotFound` if the address is not the shopper's.
    #[instrument(skip(self), fields(shopper_id = %shopper))]
    pub async fn remove(&self, shopper: UserId, id: AddressId) -> Result<Address, CommerceError> {
        let removed = self
            .store
            .delete_address(shopper, id)
            .await?
            .ok_or_else(|| CommerceError::not_found("Address not found"))?;

        if removed.is_default
            && let Some(next) = self.store.list_addresses(shopper).await?.first()
        {
            self.store.set_default_address(shopper, next.id).await?;
            debug!(address_id = %next.id, "Promoted address to default");
        }

        Ok(removed)
    }

    /// Make an address the default, demoting every other one.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::NotFound` if the address is not the shopper's.
    #[instrument(skip(self), fields(shopper_id = %shopper))]
    pub async fn set_default(
        &self,
        shopper: UserId,
        id: AddressId,
    ) -> Result<Address, CommerceError> {
        if !self.store.set_default_address(shopper, id).await? {
            return Err(CommerceError::not_found("Address not found"));
        }
        self.find(shopper, id).await
    }

    async fn find(&self, shopper: UserId, id: AddressId) -> Result<Address, CommerceError> {
        self.store
            .find_address(shopper, id)
            .await?
            .ok_or_else(|| CommerceError::not_found("Address not found"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ironmonger_core::Role;

    use super::*;
    use crate::db::MemoryStore;
    use crate::services::test_support::shopper;

    fn input(city: &str) -> AddressInput {
        AddressInput {
            name: Some("Ravi".to_owned()),
            phone: Some("5550100".to_owned()),
            address_line1: Some("7 Bellows St".to_owned()),
            address_line2: None,
            city: Some(city.to_owned()),
            state: Some("KA".to_owned()),
            postal_code: Some("560001".to_owned()),
            is_default: None,
        }
    }

    async fn assert_one_default(store: &MemoryStore, user: UserId) {
        let addresses = store.list_addresses(user).await.unwrap();
        if !addresses.is_empty() {
            assert_eq!(addresses.iter().filter(|a| a.is_default).count(), 1);
            assert!(addresses[0].is_default);
        }
    }

    #[tokio::test]
    async fn test_first_address_is_default() {
        let store = MemoryStore::new();
        let user = shopper(&store).await;
        let service = AddressService::new(&store);

        let first = service.add(user, input("Mysuru")).await.unwrap();
        let second = service.add(user, input("Hubli")).await.unwrap();

        assert!(first.is_default);
        assert!(!second.is_default);
        assert_one_default(&store, user).await;
    }

    #[tokio::test]
    async fn test_missing_fields() {
        let store = MemoryStore::new();
        let user = shopper(&store).await;
        let bad = AddressInput {
            phone: None,
            ..input("Mysuru")
        };

        let err = AddressService::new(&store).add(user, bad).await.unwrap_err();
        assert!(matches!(err, CommerceError::InvalidInput(ref m) if m.contains("phone")));
        assert!(store.list_addresses(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_with_default_demotes_others() {
        let store = MemoryStore::new();
        let user = shopper(&store).await;
        let service = AddressService::new(&store);
        let first = service.add(user, input("Mysuru")).await.unwrap();

        let second = service
            .add(
                user,
                AddressInput {
                    is_default: Some(true),
                    ..input("Hubli")
                },
            )
            .await
            .unwrap();

        assert!(second.is_default);
        assert!(!service.get(user, first.id).await.unwrap().is_default);
        assert_one_default(&store, user).await;
    }

    #[tokio::test]
    async fn test_update_is_partial() {
        let store = MemoryStore::new();
        let user = shopper(&store).await;
        let service = AddressService::new(&store);
        let address = service.add(user, input("Mysuru")).await.unwrap();

        let patch = AddressInput {
            city: Some("Udupi".to_owned()),
            ..AddressInput::default()
        };
        let updated = service.update(user, address.id, &patch).await.unwrap();

        assert_eq!(updated.city, "Udupi");
        assert_eq!(updated.name, "Ravi");
        assert!(updated.is_default);
    }

    #[tokio::test]
    async fn test_update_default_flag() {
        let store = MemoryStore::new();
        let user = shopper(&store).await;
        let service = AddressService::new(&store);
        let first = service.add(user, input("Mysuru")).await.unwrap();
        let second = service.add(user, input("Hubli")).await.unwrap();

        let make_default = AddressInput {
            is_default: Some(true),
            ..AddressInput::default()
        };
        service.update(user, second.id, &make_default).await.unwrap();
        assert!(!service.get(user, first.id).await.unwrap().is_default);
        assert_one_default(&store, user).await;

        let undefault = AddressInput {
            is_default: Some(false),
            ..AddressInput::default()
        };
        let kept = service.update(user, second.id, &undefault).await.unwrap();
        assert!(kept.is_default);
        assert_one_default(&store, user).await;
    }

    #[tokio::test]
    async fn test_remove_default_promotes_another() {
        let store = MemoryStore::new();
        let user = shopper(&store).await;
        let service = AddressService::new(&store);
        let first = service.add(user, input("Mysuru")).await.unwrap();
        service.add(user, input("Hubli")).await.unwrap();
        service.add(user, input("Belagavi")).await.unwrap();

        service.remove(user, first.id).await.unwrap();
        assert_eq!(store.list_addresses(user).await.unwrap().len(), 2);
        assert_one_default(&store, user).await;
    }

    #[tokio::test]
    async fn test_scoped_to_owner() {
        let store = MemoryStore::new();
        let user = shopper(&store).await;
        let other = store
            .insert_shopper("Other", "other@example.com", Role::Customer)
            .await;
        let service = AddressService::new(&store);
        let address = service.add(user, input("Mysuru")).await.unwrap();

        assert!(matches!(
            service.get(other, address.id).await.unwrap_err(),
            CommerceError::NotFound(_)
        ));
        assert!(matches!(
            service.remove(other, address.id).await.unwrap_err(),
            CommerceError::NotFound(_)
        ));
        assert!(matches!(
            service.set_default(other, address.id).await.unwrap_err(),
            CommerceError::NotFound(_)
        ));
        assert!(matches!(
            service
                .update(other, address.id, &AddressInput::default())
                .await
                .unwrap_err(),
            CommerceError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_set_default_is_unconditional() {
        let store = MemoryStore::new();
        let user = shopper(&store).await;
        let service = AddressService::new(&store);
        let first = service.add(user, input("Mysuru")).await.unwrap();
        let second = service.add(user, input("Hubli")).await.unwrap();

        assert!(service.set_default(user, first.id).await.unwrap().is_default);
        assert!(service.set_default(user, second.id).await.unwrap().is_default);
        assert!(!service.get(user, first.id).await.unwrap().is_default);
        assert_one_default(&store, user).await;
    }

    #[tokio::test]
    async fn test_invariant_over_mixed_sequence() {
        let store = MemoryStore::new();
        let user = shopper(&store).await;
        let service = AddressService::new(&store);

        let a = service.add(user, input("A")).await.unwrap();
        assert_one_default(&store, user).await;
        let b = service
            .add(
                user,
                AddressInput {
                    is_default: Some(true),
                    ..input("B")
                },
            )
            .await
            .unwrap();
        assert_one_default(&store, user).await;
        let c = service.add(user, input("C")).await.unwrap();
        assert_one_default(&store, user).await;
        service.set_default(user, c.id).await.unwrap();
        assert_one_default(&store, user).await;
        service.remove(user, c.id).await.unwrap();
        assert_one_default(&store, user).await;
        service.remove(user, a.id).await.unwrap();
        assert_one_default(&store, user).await;
        service.remove(user, b.id).await.unwrap();
        assert!(store.list_addresses(user).await.unwrap().is_empty());

        let again = service.add(user, input("D")).await.unwrap();
        assert!(again.is_default);
    }
}
