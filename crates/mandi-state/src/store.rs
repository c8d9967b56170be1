//! # The Market Store
//!
//! DashMap-backed storage shared by every request handler. Uniqueness
//! indexes (email, category name) are kept in side maps so duplicate
//! checks are O(1) and atomic via the entry API.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use thiserror::Error;

use mandi_core::{CategoryId, OrderId, ProductId, UserId};

use crate::records::{Category, Order, Product, User};

/// Storage-level failures. The API layer maps these onto HTTP statuses
/// (conflict for uniqueness/protection violations, not-found otherwise).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Another account already uses this normalized email.
    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    /// Another category already uses this name.
    #[error("category name already exists: {0}")]
    DuplicateCategoryName(String),

    /// No user with this id.
    #[error("user {0} not found")]
    UnknownUser(UserId),

    /// No category with this id.
    #[error("category {0} not found")]
    UnknownCategory(CategoryId),

    /// No product with this id.
    #[error("product {0} not found")]
    UnknownProduct(ProductId),

    /// No order with this id.
    #[error("order {0} not found")]
    UnknownOrder(OrderId),

    /// The category is still referenced by at least one product.
    #[error("category {0} is referenced by existing products")]
    CategoryInUse(CategoryId),

    /// The product is still referenced by at least one order.
    #[error("product {0} is referenced by existing orders")]
    ProductInUse(ProductId),

    /// The user still owns products or has placed orders.
    #[error("user {0} is referenced by existing products or orders")]
    UserInUse(UserId),
}

struct Inner {
    users: DashMap<UserId, User>,
    emails: DashMap<String, UserId>,
    categories: DashMap<CategoryId, Category>,
    category_names: DashMap<String, CategoryId>,
    products: DashMap<ProductId, Product>,
    orders: DashMap<OrderId, Order>,
    /// Token digest (SHA-256 hex) → account. Plaintext tokens never land here.
    tokens: DashMap<String, UserId>,
}

/// Shared application store holding all in-memory maps.
///
/// Cheaply cloneable via `Arc` — all clones share the same data.
#[derive(Clone)]
pub struct MarketStore {
    inner: Arc<Inner>,
}

impl Default for MarketStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                users: DashMap::new(),
                emails: DashMap::new(),
                categories: DashMap::new(),
                category_names: DashMap::new(),
                products: DashMap::new(),
                orders: DashMap::new(),
                tokens: DashMap::new(),
            }),
        }
    }

    // ── Users ───────────────────────────────────────────────────────

    /// Insert a new user. Fails if the normalized email is taken.
    pub fn insert_user(&self, user: User) -> Result<(), StoreError> {
        match self.inner.emails.entry(user.email.clone()) {
            dashmap::Entry::Occupied(_) => Err(StoreError::DuplicateEmail(user.email)),
            dashmap::Entry::Vacant(slot) => {
                slot.insert(user.id);
                self.inner.users.insert(user.id, user);
                Ok(())
            }
        }
    }

    pub fn get_user(&self, id: &UserId) -> Option<User> {
        self.inner.users.get(id).map(|u| u.clone())
    }

    pub fn user_by_email(&self, email: &str) -> Option<User> {
        let id = *self.inner.emails.get(email)?;
        self.get_user(&id)
    }

    /// All users, newest first.
    pub fn list_users(&self) -> Vec<User> {
        let mut users: Vec<User> = self.inner.users.iter().map(|u| u.clone()).collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        users
    }

    /// Apply a mutation to a user record. Handles email re-indexing and
    /// uniqueness when the mutation changes the address, and revokes all
    /// tokens when it deactivates the account. Bumps `updated_at`.
    pub fn update_user(
        &self,
        id: &UserId,
        apply: impl FnOnce(&mut User),
    ) -> Result<User, StoreError> {
        let mut entry = self
            .inner
            .users
            .get_mut(id)
            .ok_or(StoreError::UnknownUser(*id))?;
        let old_email = entry.email.clone();
        let was_active = entry.is_active;

        apply(&mut entry);

        if entry.email != old_email {
            match self.inner.emails.entry(entry.email.clone()) {
                dashmap::Entry::Occupied(_) => {
                    let taken = entry.email.clone();
                    entry.email = old_email;
                    return Err(StoreError::DuplicateEmail(taken));
                }
                dashmap::Entry::Vacant(slot) => {
                    slot.insert(*id);
                    self.inner.emails.remove(&old_email);
                }
            }
        }

        entry.updated_at = Utc::now();
        let updated = entry.clone();
        drop(entry);

        if was_active && !updated.is_active {
            self.revoke_tokens_for(id);
        }
        Ok(updated)
    }

    /// Delete a user. Staff-only at the API layer; here we enforce the
    /// referential protection: owners of products and placers of orders
    /// cannot be removed.
    pub fn delete_user(&self, id: &UserId) -> Result<User, StoreError> {
        if self.inner.products.iter().any(|p| p.farmer == *id)
            || self.inner.orders.iter().any(|o| o.buyer == *id)
        {
            return Err(StoreError::UserInUse(*id));
        }
        let (_, user) = self
            .inner
            .users
            .remove(id)
            .ok_or(StoreError::UnknownUser(*id))?;
        self.inner.emails.remove(&user.email);
        self.revoke_tokens_for(id);
        Ok(user)
    }

    pub fn user_count(&self) -> usize {
        self.inner.users.len()
    }

    // ── Tokens ──────────────────────────────────────────────────────

    /// Register a token digest for an account.
    pub fn insert_token(&self, digest: String, user: UserId) {
        self.inner.tokens.insert(digest, user);
    }

    /// Resolve a token digest to its account. Inactive accounts do not
    /// resolve — a disabled user's tokens are dead even if still stored.
    pub fn user_for_token(&self, digest: &str) -> Option<User> {
        let id = *self.inner.tokens.get(digest)?;
        self.get_user(&id).filter(|u| u.is_active)
    }

    /// Drop every token belonging to the given account.
    pub fn revoke_tokens_for(&self, user: &UserId) {
        self.inner.tokens.retain(|_, owner| owner != user);
    }

    /// All live token digests with their owners, for persistence mirroring.
    pub fn list_tokens(&self) -> Vec<(String, UserId)> {
        self.inner
            .tokens
            .iter()
            .map(|t| (t.key().clone(), *t.value()))
            .collect()
    }

    // ── Categories ──────────────────────────────────────────────────

    /// Insert a new category. Fails if the name is taken.
    pub fn insert_category(&self, category: Category) -> Result<(), StoreError> {
        match self.inner.category_names.entry(category.name.clone()) {
            dashmap::Entry::Occupied(_) => {
                Err(StoreError::DuplicateCategoryName(category.name))
            }
            dashmap::Entry::Vacant(slot) => {
                slot.insert(category.id);
                self.inner.categories.insert(category.id, category);
                Ok(())
            }
        }
    }

    pub fn get_category(&self, id: &CategoryId) -> Option<Category> {
        self.inner.categories.get(id).map(|c| c.clone())
    }

    /// All categories, ordered by name.
    pub fn list_categories(&self) -> Vec<Category> {
        let mut categories: Vec<Category> =
            self.inner.categories.iter().map(|c| c.clone()).collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        categories
    }

    /// Apply a mutation to a category, re-indexing the name if it changes.
    pub fn update_category(
        &self,
        id: &CategoryId,
        apply: impl FnOnce(&mut Category),
    ) -> Result<Category, StoreError> {
        let mut entry = self
            .inner
            .categories
            .get_mut(id)
            .ok_or(StoreError::UnknownCategory(*id))?;
        let old_name = entry.name.clone();

        apply(&mut entry);

        if entry.name != old_name {
            match self.inner.category_names.entry(entry.name.clone()) {
                dashmap::Entry::Occupied(_) => {
                    let taken = entry.name.clone();
                    entry.name = old_name;
                    return Err(StoreError::DuplicateCategoryName(taken));
                }
                dashmap::Entry::Vacant(slot) => {
                    slot.insert(*id);
                    self.inner.category_names.remove(&old_name);
                }
            }
        }

        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    /// Delete a category. Rejected while any product references it — the
    /// protection is a hard invariant, not a cascade.
    pub fn delete_category(&self, id: &CategoryId) -> Result<Category, StoreError> {
        if self.inner.products.iter().any(|p| p.category == *id) {
            return Err(StoreError::CategoryInUse(*id));
        }
        let (_, category) = self
            .inner
            .categories
            .remove(id)
            .ok_or(StoreError::UnknownCategory(*id))?;
        self.inner.category_names.remove(&category.name);
        Ok(category)
    }

    pub fn category_count(&self) -> usize {
        self.inner.categories.len()
    }

    // ── Products ────────────────────────────────────────────────────

    /// Insert a new product. The owning farmer and the category must
    /// already exist — a broken owner reference never enters the store.
    pub fn insert_product(&self, product: Product) -> Result<(), StoreError> {
        if !self.inner.users.contains_key(&product.farmer) {
            return Err(StoreError::UnknownUser(product.farmer));
        }
        if !self.inner.categories.contains_key(&product.category) {
            return Err(StoreError::UnknownCategory(product.category));
        }
        self.inner.products.insert(product.id, product);
        Ok(())
    }

    pub fn get_product(&self, id: &ProductId) -> Option<Product> {
        self.inner.products.get(id).map(|p| p.clone())
    }

    /// All products, newest first.
    pub fn list_products(&self) -> Vec<Product> {
        let mut products: Vec<Product> =
            self.inner.products.iter().map(|p| p.clone()).collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        products
    }

    /// Apply a mutation to a product, validating a category change.
    pub fn update_product(
        &self,
        id: &ProductId,
        apply: impl FnOnce(&mut Product),
    ) -> Result<Product, StoreError> {
        let mut entry = self
            .inner
            .products
            .get_mut(id)
            .ok_or(StoreError::UnknownProduct(*id))?;
        let old_category = entry.category;

        apply(&mut entry);

        if entry.category != old_category
            && !self.inner.categories.contains_key(&entry.category)
        {
            let missing = entry.category;
            entry.category = old_category;
            return Err(StoreError::UnknownCategory(missing));
        }

        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    /// Delete a product. Rejected while any order references it.
    pub fn delete_product(&self, id: &ProductId) -> Result<Product, StoreError> {
        if self.inner.orders.iter().any(|o| o.product == *id) {
            return Err(StoreError::ProductInUse(*id));
        }
        self.inner
            .products
            .remove(id)
            .map(|(_, p)| p)
            .ok_or(StoreError::UnknownProduct(*id))
    }

    pub fn product_count(&self) -> usize {
        self.inner.products.len()
    }

    // ── Orders ──────────────────────────────────────────────────────

    /// Insert a new order. Buyer and product must exist.
    pub fn insert_order(&self, order: Order) -> Result<(), StoreError> {
        if !self.inner.users.contains_key(&order.buyer) {
            return Err(StoreError::UnknownUser(order.buyer));
        }
        if !self.inner.products.contains_key(&order.product) {
            return Err(StoreError::UnknownProduct(order.product));
        }
        self.inner.orders.insert(order.id, order);
        Ok(())
    }

    pub fn get_order(&self, id: &OrderId) -> Option<Order> {
        self.inner.orders.get(id).map(|o| o.clone())
    }

    /// All orders, newest first. Staff-only at the API layer.
    pub fn list_orders(&self) -> Vec<Order> {
        let mut orders: Vec<Order> = self.inner.orders.iter().map(|o| o.clone()).collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }

    /// One buyer's orders, newest first.
    pub fn list_orders_for(&self, buyer: &UserId) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .inner
            .orders
            .iter()
            .filter(|o| o.buyer == *buyer)
            .map(|o| o.clone())
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }

    /// Apply a mutation to an order. The total is frozen at creation —
    /// callers only touch status and delivery date.
    pub fn update_order(
        &self,
        id: &OrderId,
        apply: impl FnOnce(&mut Order),
    ) -> Result<Order, StoreError> {
        let mut entry = self
            .inner
            .orders
            .get_mut(id)
            .ok_or(StoreError::UnknownOrder(*id))?;
        apply(&mut entry);
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    pub fn delete_order(&self, id: &OrderId) -> Result<Order, StoreError> {
        self.inner
            .orders
            .remove(id)
            .map(|(_, o)| o)
            .ok_or(StoreError::UnknownOrder(*id))
    }

    pub fn order_count(&self) -> usize {
        self.inner.orders.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mandi_core::{parse_amount, OrderStatus, ProductStatus, Role};

    fn user(email: &str, role: Option<Role>) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(),
            email: email.to_string(),
            password: "salt:digest".to_string(),
            name: String::new(),
            phone_number: String::new(),
            address: String::new(),
            role,
            is_staff: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn category(name: &str) -> Category {
        let now = Utc::now();
        Category {
            id: CategoryId::new(),
            name: name.to_string(),
            description: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn product(farmer: UserId, cat: CategoryId) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::new(),
            farmer,
            category: cat,
            name: "Bananas".to_string(),
            description: String::new(),
            price: parse_amount("10.50").unwrap(),
            quantity: 20,
            unit: "kg".to_string(),
            status: ProductStatus::Available,
            created_at: now,
            updated_at: now,
        }
    }

    fn order(buyer: UserId, p: ProductId, total: i64) -> Order {
        let now = Utc::now();
        Order {
            id: OrderId::new(),
            buyer,
            product: p,
            quantity: 2,
            total_price: total,
            status: OrderStatus::Pending,
            delivery_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn duplicate_email_rejected() {
        let store = MarketStore::new();
        store.insert_user(user("ali@example.com", None)).unwrap();
        let err = store
            .insert_user(user("ali@example.com", None))
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail(_)));
    }

    #[test]
    fn email_change_reindexes_lookup() {
        let store = MarketStore::new();
        let u = user("old@example.com", None);
        let id = u.id;
        store.insert_user(u).unwrap();

        store
            .update_user(&id, |u| u.email = "new@example.com".to_string())
            .unwrap();
        assert!(store.user_by_email("old@example.com").is_none());
        assert_eq!(store.user_by_email("new@example.com").unwrap().id, id);
    }

    #[test]
    fn email_change_to_taken_address_rejected_and_rolled_back() {
        let store = MarketStore::new();
        let a = user("a@example.com", None);
        let b = user("b@example.com", None);
        let b_id = b.id;
        store.insert_user(a).unwrap();
        store.insert_user(b).unwrap();

        let err = store
            .update_user(&b_id, |u| u.email = "a@example.com".to_string())
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail(_)));
        assert_eq!(store.get_user(&b_id).unwrap().email, "b@example.com");
    }

    #[test]
    fn category_with_products_cannot_be_deleted() {
        let store = MarketStore::new();
        let farmer = user("farmer@example.com", Some(Role::Farmer));
        let farmer_id = farmer.id;
        store.insert_user(farmer).unwrap();
        let cat = category("Fruits");
        let cat_id = cat.id;
        store.insert_category(cat).unwrap();
        store.insert_product(product(farmer_id, cat_id)).unwrap();

        let err = store.delete_category(&cat_id).unwrap_err();
        assert!(matches!(err, StoreError::CategoryInUse(_)));
        // The category remains.
        assert!(store.get_category(&cat_id).is_some());
    }

    #[test]
    fn product_with_orders_cannot_be_deleted() {
        let store = MarketStore::new();
        let farmer = user("farmer@example.com", Some(Role::Farmer));
        let buyer = user("buyer@example.com", Some(Role::Buyer));
        let (farmer_id, buyer_id) = (farmer.id, buyer.id);
        store.insert_user(farmer).unwrap();
        store.insert_user(buyer).unwrap();
        let cat = category("Fruits");
        let cat_id = cat.id;
        store.insert_category(cat).unwrap();
        let p = product(farmer_id, cat_id);
        let p_id = p.id;
        store.insert_product(p).unwrap();
        store.insert_order(order(buyer_id, p_id, 2100)).unwrap();

        let err = store.delete_product(&p_id).unwrap_err();
        assert!(matches!(err, StoreError::ProductInUse(_)));
    }

    #[test]
    fn user_owning_products_cannot_be_deleted() {
        let store = MarketStore::new();
        let farmer = user("farmer@example.com", Some(Role::Farmer));
        let farmer_id = farmer.id;
        store.insert_user(farmer).unwrap();
        let cat = category("Fruits");
        let cat_id = cat.id;
        store.insert_category(cat).unwrap();
        store.insert_product(product(farmer_id, cat_id)).unwrap();

        let err = store.delete_user(&farmer_id).unwrap_err();
        assert!(matches!(err, StoreError::UserInUse(_)));
    }

    #[test]
    fn product_requires_existing_farmer_and_category() {
        let store = MarketStore::new();
        let err = store
            .insert_product(product(UserId::new(), CategoryId::new()))
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownUser(_)));
    }

    #[test]
    fn deactivation_revokes_tokens() {
        let store = MarketStore::new();
        let u = user("ali@example.com", Some(Role::Buyer));
        let id = u.id;
        store.insert_user(u).unwrap();
        store.insert_token("digest-1".to_string(), id);
        assert!(store.user_for_token("digest-1").is_some());

        store.update_user(&id, |u| u.is_active = false).unwrap();
        assert!(store.user_for_token("digest-1").is_none());
    }

    #[test]
    fn listings_are_newest_first() {
        let store = MarketStore::new();
        let mut first = user("first@example.com", None);
        let mut second = user("second@example.com", None);
        first.created_at = Utc::now() - chrono::Duration::seconds(10);
        second.created_at = Utc::now();
        store.insert_user(first).unwrap();
        store.insert_user(second).unwrap();

        let users = store.list_users();
        assert_eq!(users[0].email, "second@example.com");
        assert_eq!(users[1].email, "first@example.com");
    }

    #[test]
    fn categories_listed_by_name() {
        let store = MarketStore::new();
        store.insert_category(category("Vegetables")).unwrap();
        store.insert_category(category("Fruits")).unwrap();
        let names: Vec<String> = store.list_categories().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Fruits".to_string(), "Vegetables".to_string()]);
    }

    #[test]
    fn buyer_order_listing_is_scoped() {
        let store = MarketStore::new();
        let farmer = user("farmer@example.com", Some(Role::Farmer));
        let buyer_a = user("a@example.com", Some(Role::Buyer));
        let buyer_b = user("b@example.com", Some(Role::Buyer));
        let (farmer_id, a_id, b_id) = (farmer.id, buyer_a.id, buyer_b.id);
        store.insert_user(farmer).unwrap();
        store.insert_user(buyer_a).unwrap();
        store.insert_user(buyer_b).unwrap();
        let cat = category("Fruits");
        let cat_id = cat.id;
        store.insert_category(cat).unwrap();
        let p = product(farmer_id, cat_id);
        let p_id = p.id;
        store.insert_product(p).unwrap();

        store.insert_order(order(a_id, p_id, 2100)).unwrap();
        store.insert_order(order(b_id, p_id, 1050)).unwrap();

        assert_eq!(store.list_orders().len(), 2);
        assert_eq!(store.list_orders_for(&a_id).len(), 1);
        assert_eq!(store.list_orders_for(&a_id)[0].buyer, a_id);
    }
}
