//! In-process storage for users, products and orders.
//!
//! All tables live behind one async `RwLock`, so a batch insert is either
//! fully visible or not at all. Constraints (unique usernames, order owner
//! must exist, field lengths) are checked before anything is written.

use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::models::{NewEntity, NewOrder, NewProduct, Order, Product, User};

const USERNAME_MAX: usize = 150;
const PRODUCT_NAME_MAX: usize = 100;
const PROMOCODE_MAX: usize = 20;

#[derive(Default)]
struct Tables {
    next_user: u64,
    next_product: u64,
    next_order: u64,
    users: BTreeMap<u64, User>,
    products: BTreeMap<u64, Product>,
    orders: BTreeMap<u64, Order>,
}

impl Tables {
    fn validate(&self, entity: &NewEntity) -> Result<(), StoreError> {
        match entity {
            NewEntity::Product(product) => validate_product(product),
            NewEntity::Order(order) => {
                if !self.users.contains_key(&order.user_id) {
                    return Err(StoreError::UnknownUser(order.user_id));
                }
                validate_order(order)
            }
        }
    }

    // Caller must have validated the entity
    fn apply(&mut self, entity: NewEntity) -> u64 {
        let created_at = Utc::now();
        match entity {
            NewEntity::Product(new) => {
                self.next_product += 1;
                let id = self.next_product;
                self.products.insert(
                    id,
                    Product {
                        id,
                        name: new.name,
                        description: new.description,
                        price: new.price,
                        discount: new.discount,
                        archived: new.archived,
                        created_by: new.created_by,
                        created_at,
                    },
                );
                id
            }
            NewEntity::Order(new) => {
                self.next_order += 1;
                let id = self.next_order;
                self.orders.insert(
                    id,
                    Order {
                        id,
                        user_id: new.user_id,
                        products: Vec::new(),
                        promocode: new.promocode,
                        delivery_address: new.delivery_address,
                        created_at,
                    },
                );
                id
            }
        }
    }
}

fn validate_product(product: &NewProduct) -> Result<(), StoreError> {
    if product.name.trim().is_empty() {
        return Err(StoreError::Empty("product name"));
    }
    if product.name.chars().count() > PRODUCT_NAME_MAX {
        return Err(StoreError::TooLong {
            field: "product name",
            max: PRODUCT_NAME_MAX,
        });
    }
    Ok(())
}

fn validate_order(order: &NewOrder) -> Result<(), StoreError> {
    if order.delivery_address.trim().is_empty() {
        return Err(StoreError::Empty("delivery address"));
    }
    if order.promocode.chars().count() > PROMOCODE_MAX {
        return Err(StoreError::TooLong {
            field: "promocode",
            max: PROMOCODE_MAX,
        });
    }
    Ok(())
}

// Consistent copy of every table
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub users: BTreeMap<u64, User>,
    pub products: BTreeMap<u64, Product>,
    pub orders: BTreeMap<u64, Order>,
}

#[derive(Default)]
pub struct Store {
    tables: RwLock<Tables>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create_user(&self, username: &str) -> Result<User, StoreError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(StoreError::Empty("username"));
        }
        if username.chars().count() > USERNAME_MAX {
            return Err(StoreError::TooLong {
                field: "username",
                max: USERNAME_MAX,
            });
        }

        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == username) {
            return Err(StoreError::DuplicateUsername(username.to_string()));
        }

        tables.next_user += 1;
        let user = User {
            id: tables.next_user,
            username: username.to_string(),
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    pub async fn user_by_username(&self, username: &str) -> Option<User> {
        let tables = self.tables.read().await;
        tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned()
    }

    pub async fn users(&self) -> Vec<User> {
        self.tables.read().await.users.values().cloned().collect()
    }

    pub async fn insert(&self, entity: NewEntity) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        tables.validate(&entity)?;
        Ok(tables.apply(entity))
    }

    /// Inserts every entity or none of them.
    pub async fn insert_batch(&self, entities: Vec<NewEntity>) -> Result<Vec<u64>, StoreError> {
        let mut tables = self.tables.write().await;
        for entity in &entities {
            tables.validate(entity)?;
        }
        Ok(entities.into_iter().map(|e| tables.apply(e)).collect())
    }

    /// Links an order to products looked up by name.
    ///
    /// Every name must match at least one product; all products carrying a
    /// matching name are linked. Nothing is linked if any name is unknown.
    pub async fn attach_products(
        &self,
        order_id: u64,
        names: &[String],
    ) -> Result<Vec<u64>, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.orders.contains_key(&order_id) {
            return Err(StoreError::UnknownOrder(order_id));
        }

        let mut product_ids = Vec::new();
        for name in names {
            let before = product_ids.len();
            product_ids.extend(
                tables
                    .products
                    .values()
                    .filter(|p| p.name == *name)
                    .map(|p| p.id),
            );
            if product_ids.len() == before {
                return Err(StoreError::ProductNotFound(name.clone()));
            }
        }

        let order = tables
            .orders
            .get_mut(&order_id)
            .ok_or(StoreError::UnknownOrder(order_id))?;
        for id in product_ids {
            if !order.products.contains(&id) {
                order.products.push(id);
            }
        }
        Ok(order.products.clone())
    }

    pub async fn products(&self) -> Vec<Product> {
        self.tables.read().await.products.values().cloned().collect()
    }

    pub async fn products_by_ids(&self, ids: &[u64]) -> Vec<Product> {
        let tables = self.tables.read().await;
        ids.iter()
            .filter_map(|id| tables.products.get(id).cloned())
            .collect()
    }

    pub async fn orders(&self) -> Vec<Order> {
        self.tables.read().await.orders.values().cloned().collect()
    }

    pub async fn snapshot(&self) -> Snapshot {
        let tables = self.tables.read().await;
        Snapshot {
            users: tables.users.clone(),
            products: tables.products.clone(),
            orders: tables.orders.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Price;

    fn product(name: &str) -> NewEntity {
        NewEntity::Product(NewProduct {
            name: name.to_string(),
            description: String::new(),
            price: Price::from_cents(100),
            discount: 0,
            archived: false,
            created_by: None,
        })
    }

    fn order(user_id: u64) -> NewEntity {
        NewEntity::Order(NewOrder {
            user_id,
            promocode: String::new(),
            delivery_address: "1 Main St".to_string(),
        })
    }

    #[tokio::test]
    async fn usernames_are_unique() {
        let store = Store::new();
        store.create_user("alice").await.unwrap();

        let err = store.create_user("alice").await.unwrap_err();
        assert_eq!(err, StoreError::DuplicateUsername("alice".into()));
        assert_eq!(store.users().await.len(), 1);
    }

    #[tokio::test]
    async fn batch_insert_is_all_or_nothing() {
        let store = Store::new();
        let alice = store.create_user("alice").await.unwrap();

        let err = store
            .insert_batch(vec![order(alice.id), order(alice.id + 41)])
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::UnknownUser(alice.id + 41));
        assert!(store.orders().await.is_empty());

        let ids = store
            .insert_batch(vec![order(alice.id), order(alice.id)])
            .await
            .unwrap();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn rejects_overlong_fields() {
        let store = Store::new();
        let err = store.insert(product(&"x".repeat(101))).await.unwrap_err();
        assert_eq!(
            err,
            StoreError::TooLong {
                field: "product name",
                max: 100
            }
        );
    }

    #[tokio::test]
    async fn attach_products_by_name() {
        let store = Store::new();
        let alice = store.create_user("alice").await.unwrap();
        let pen = store.insert(product("Pen")).await.unwrap();
        let ink = store.insert(product("Ink")).await.unwrap();
        let order_id = store.insert(order(alice.id)).await.unwrap();

        let linked = store
            .attach_products(order_id, &["Pen".into(), "Ink".into(), "Pen".into()])
            .await
            .unwrap();
        assert_eq!(linked, vec![pen, ink]);
    }

    #[tokio::test]
    async fn attach_unknown_product_links_nothing() {
        let store = Store::new();
        let alice = store.create_user("alice").await.unwrap();
        store.insert(product("Pen")).await.unwrap();
        let order_id = store.insert(order(alice.id)).await.unwrap();

        let err = store
            .attach_products(order_id, &["Pen".into(), "Quill".into()])
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::ProductNotFound("Quill".into()));
        let orders = store.orders().await;
        assert_eq!(orders[0].id, order_id);
        assert!(orders[0].products.is_empty());
    }
}
