//! Application state container
//!
//! In-memory mirror of the logged-in user's books, cart, orders, favorites
//! and profile. Data is loaded in bulk after login and re-fetched after every
//! mutation; nothing is patched locally.
//!
//! # Phases
//!
//! ```text
//! Anonymous --login--> Loading --load_all--> Ready
//!     ^                                        |
//!     +------------- logout / 401 -------------+
//! ```
//!
//! Background refreshes never move the phase backwards. Every session carries
//! a generation number; results of a load that started before a logout are
//! dropped instead of resurrecting the old session's data.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use shared::models::{
    Book, BookStatus, CartItem, Favorite, Order, OrderCreated, ProfileUpdate, ReceiverInfo,
    UserProfile,
};
use shared::{BookQuery, OrderQuery};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{RwLock, broadcast, watch};
use tokio::task::JoinHandle;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::services::Services;
use crate::session::SessionEvent;

const EVENT_CAPACITY: usize = 64;

// ============================================================================
// Types
// ============================================================================

/// Session lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Anonymous,
    Loading,
    Ready,
}

/// Entity collection held by the container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Books,
    Cart,
    Orders,
    Favorites,
    Profile,
}

impl Resource {
    /// Label used in user-facing warnings
    pub fn label(&self) -> &'static str {
        match self {
            Resource::Books => "图书",
            Resource::Cart => "购物车",
            Resource::Orders => "订单",
            Resource::Favorites => "收藏",
            Resource::Profile => "个人资料",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Snapshot of every entity collection
#[derive(Debug, Clone, Default)]
pub struct AppData {
    pub books: Vec<Book>,
    pub cart: Vec<CartItem>,
    pub orders: Vec<Order>,
    pub favorites: Vec<Favorite>,
    pub profile: Option<UserProfile>,
}

/// Notification for the UI layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateEvent {
    PhaseChanged(Phase),
    /// Non-fatal problem worth showing to the user
    Warning(String),
    Refreshed(Resource),
}

/// Outcome of a bulk load
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Resources that fell back to an empty value, with the reason
    pub failures: Vec<(Resource, String)>,
    /// The session ended while loading; nothing was stored
    pub stale: bool,
    /// No session was stored; nothing was fetched
    pub anonymous: bool,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        !self.stale && !self.anonymous && self.failures.is_empty()
    }

    pub fn failed(&self, resource: Resource) -> bool {
        self.failures.iter().any(|(r, _)| *r == resource)
    }

    /// Unwrap a fetch result, recording a failure and defaulting on error
    fn take<T: Default>(&mut self, resource: Resource, result: ClientResult<T>) -> T {
        result.unwrap_or_else(|e| {
            self.failures.push((resource, e.to_string()));
            T::default()
        })
    }
}

/// Cart mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    Add { book_id: i64, quantity: u32 },
    Update { cart_item_id: i64, quantity: u32 },
    Remove(i64),
    RemoveMany(Vec<i64>),
    Clear,
}

/// Favorite mutation, by book id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteAction {
    Add(i64),
    Remove(i64),
}

/// Books sold out but still marked available, in list order
pub fn stock_reconciliation_targets(books: &[Book]) -> Vec<i64> {
    books
        .iter()
        .filter(|b| b.needs_out_of_stock_mark())
        .map(|b| b.id)
        .collect()
}

// ============================================================================
// Container
// ============================================================================

#[derive(Debug)]
pub struct AppState {
    services: Services,
    fallback_page_size: u32,
    data: RwLock<AppData>,
    phase: watch::Sender<Phase>,
    events: broadcast::Sender<StateEvent>,
    generation: AtomicU64,
}

impl AppState {
    pub fn new(services: Services, config: &ClientConfig) -> Self {
        let (phase, _) = watch::channel(Phase::Anonymous);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            services,
            fallback_page_size: config.fallback_page_size,
            data: RwLock::new(AppData::default()),
            phase,
            events,
            generation: AtomicU64::new(0),
        }
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    pub fn watch_phase(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    /// Resolve once the container reaches `target`
    pub async fn wait_for_phase(&self, target: Phase) {
        let mut rx = self.phase.subscribe();
        // the sender lives in `self`, so the channel cannot close here
        let _ = rx.wait_for(|p| *p == target).await;
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> AppData {
        self.data.read().await.clone()
    }

    /// Reset to `Anonymous` whenever the session is cleared elsewhere
    /// (a 401 from any call, or another holder of the store logging out)
    pub fn attach_session_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let state = Arc::downgrade(self);
        let mut rx = self.services.session().subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(SessionEvent::Cleared) => {
                        let Some(state) = state.upgrade() else { break };
                        if state.phase() != Phase::Anonymous {
                            tracing::info!("Session cleared, resetting application state");
                            state.reset().await;
                        }
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Session listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    // ========== Session transitions ==========

    /// Log in, then load everything in the background
    ///
    /// Returns as soon as the session is stored; the phase moves from
    /// `Loading` to `Ready` when the background load finishes.
    pub async fn login(self: &Arc<Self>, username: &str, password: &str) -> ClientResult<UserProfile> {
        let user = self.services.auth.login(username, password).await?;
        self.start_background_load();
        Ok(user)
    }

    /// Start loading for a session restored from storage
    ///
    /// Returns `false` when there is no session or one is already active.
    pub fn resume(self: &Arc<Self>) -> bool {
        if self.phase() != Phase::Anonymous || !self.services.session().is_authenticated() {
            return false;
        }
        self.start_background_load();
        true
    }

    /// Drop every entity and the session
    pub async fn logout(&self) {
        tracing::info!("Logging out");
        self.reset().await;
        self.services.auth.logout().await;
    }

    fn start_background_load(self: &Arc<Self>) {
        let generation = self.generation.load(Ordering::SeqCst);
        self.set_phase(Phase::Loading);
        let state = Arc::clone(self);
        tokio::spawn(async move {
            let report = state.load_generation(generation).await;
            if !report.is_complete() {
                tracing::warn!(failures = ?report.failures, stale = report.stale, "Background load incomplete");
            }
        });
    }

    async fn reset(&self) {
        let mut data = self.data.write().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        *data = AppData::default();
        self.set_phase(Phase::Anonymous);
    }

    // ========== Loading ==========

    /// Fetch every resource in parallel
    ///
    /// Each resource succeeds or fails on its own; a failed one is emptied
    /// and reported as a warning without holding up the rest.
    pub async fn load_all(&self) -> LoadReport {
        let generation = self.generation.load(Ordering::SeqCst);
        self.load_generation(generation).await
    }

    async fn load_generation(&self, generation: u64) -> LoadReport {
        let mut report = LoadReport::default();
        if self.generation.load(Ordering::SeqCst) != generation {
            report.stale = true;
            return report;
        }
        if !self.services.session().is_authenticated() {
            tracing::debug!("No session stored, skipping load");
            if self.phase() != Phase::Anonymous {
                self.reset().await;
            }
            report.anonymous = true;
            return report;
        }
        if self.phase() == Phase::Anonymous {
            self.set_phase(Phase::Loading);
        }

        let orders_query = OrderQuery::default();
        let (books, cart, orders, favorites, profile) = tokio::join!(
            self.fetch_books(),
            self.services.cart.get_cart(),
            self.services.orders.get_orders(&orders_query),
            self.fetch_favorites(),
            self.fetch_profile(),
        );

        let books = report.take(Resource::Books, books);
        let cart = report.take(Resource::Cart, cart);
        let orders = report.take(Resource::Orders, orders);
        let favorites = report.take(Resource::Favorites, favorites);
        let profile = report.take(Resource::Profile, profile.map(Some));

        let stored = self
            .store(generation, |data| {
                *data = AppData {
                    books,
                    cart,
                    orders,
                    favorites,
                    profile,
                };
                self.set_phase(Phase::Ready);
            })
            .await;
        if !stored {
            tracing::info!("Discarding load results of an ended session");
            report.stale = true;
            return report;
        }

        for (resource, reason) in &report.failures {
            tracing::warn!(%resource, %reason, "Resource failed to load");
            self.warn(format!("{}数据加载失败: {}", resource, reason));
        }
        tracing::info!(failures = report.failures.len(), "Application data loaded");

        if !report.failed(Resource::Books) {
            self.reconcile_stock().await;
        }
        report
    }

    /// Primary listing, then the paged convention
    async fn fetch_books(&self) -> ClientResult<Vec<Book>> {
        match self.services.books.get_all_books().await {
            Ok(books) => Ok(books),
            Err(e) => {
                tracing::warn!(error = %e, "Book listing failed, retrying with paging parameters");
                self.services
                    .books
                    .get_books(&BookQuery::paged(self.fallback_page_size))
                    .await
            }
        }
    }

    async fn fetch_favorites(&self) -> ClientResult<Vec<Favorite>> {
        let user_id = self.services.session().require_user_id()?;
        self.services.users.get_favorites(user_id).await
    }

    /// Backend profile, falling back to the session user
    async fn fetch_profile(&self) -> ClientResult<UserProfile> {
        let session = self.services.session();
        let user_id = session.require_user_id()?;
        match self.services.users.get_profile(user_id).await {
            Ok(profile) => Ok(profile),
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Profile fetch failed, using session user");
                session.current_user().ok_or(e)
            }
        }
    }

    /// Re-fetch one resource
    ///
    /// A book refresh is followed by a stock reconciliation pass.
    pub async fn refresh(&self, resource: Resource) -> ClientResult<()> {
        let generation = self.generation.load(Ordering::SeqCst);
        self.reload(resource, generation).await?;
        if resource == Resource::Books {
            self.reconcile_stock().await;
        }
        Ok(())
    }

    async fn reload(&self, resource: Resource, generation: u64) -> ClientResult<()> {
        let stored = match resource {
            Resource::Books => {
                let books = self.fetch_books().await?;
                self.store(generation, |d| d.books = books).await
            }
            Resource::Cart => {
                let cart = self.services.cart.get_cart().await?;
                self.store(generation, |d| d.cart = cart).await
            }
            Resource::Orders => {
                let orders = self.services.orders.get_orders(&OrderQuery::default()).await?;
                self.store(generation, |d| d.orders = orders).await
            }
            Resource::Favorites => {
                let favorites = self.fetch_favorites().await?;
                self.store(generation, |d| d.favorites = favorites).await
            }
            Resource::Profile => {
                let profile = self.fetch_profile().await?;
                self.store(generation, |d| d.profile = Some(profile)).await
            }
        };
        if stored {
            tracing::debug!(%resource, "Resource refreshed");
            self.emit(StateEvent::Refreshed(resource));
        }
        Ok(())
    }

    /// Mark every sold-out book that is still `AVAILABLE` as `OUT_OF_STOCK`
    ///
    /// Best effort: failures become warnings. When any book needed marking
    /// the list is fetched once more. Returns the ids actually marked.
    pub async fn reconcile_stock(&self) -> Vec<i64> {
        let generation = self.generation.load(Ordering::SeqCst);
        let targets = stock_reconciliation_targets(&self.data.read().await.books);
        if targets.is_empty() {
            return Vec::new();
        }

        tracing::info!(books = ?targets, "Reconciling sold-out books");
        let mut marked = Vec::with_capacity(targets.len());
        for book_id in targets {
            match self
                .services
                .books
                .set_book_status(book_id, BookStatus::OutOfStock)
                .await
            {
                Ok(()) => marked.push(book_id),
                Err(e) => {
                    tracing::warn!(book_id, error = %e, "Failed to mark book out of stock");
                    self.warn(format!("图书 {} 售罄状态更新失败: {}", book_id, e));
                }
            }
        }

        if let Err(e) = self.reload(Resource::Books, generation).await {
            tracing::warn!(error = %e, "Book refresh after reconciliation failed");
        }
        marked
    }

    // ========== Mutations ==========

    /// Apply a cart change, then re-fetch the cart and books
    ///
    /// A failed mutation returns the error and leaves local state untouched.
    pub async fn update_cart(&self, action: CartAction) -> ClientResult<()> {
        let cart = &self.services.cart;
        match &action {
            CartAction::Add { book_id, quantity } => cart.add_to_cart(*book_id, *quantity).await?,
            CartAction::Update {
                cart_item_id,
                quantity,
            } => cart.update_quantity(*cart_item_id, *quantity).await?,
            CartAction::Remove(cart_item_id) => cart.remove_item(*cart_item_id).await?,
            CartAction::RemoveMany(ids) => cart.remove_items(ids).await?,
            CartAction::Clear => cart.clear_cart().await?,
        }
        tracing::debug!(?action, "Cart updated");
        self.after_mutation(&[Resource::Cart], true).await;
        Ok(())
    }

    /// Check out, then re-fetch orders, cart and books
    pub async fn create_order(
        &self,
        cart_item_ids: Vec<i64>,
        receiver: ReceiverInfo,
    ) -> ClientResult<OrderCreated> {
        let created = self.services.orders.create_order(cart_item_ids, receiver).await?;
        self.after_mutation(&[Resource::Orders, Resource::Cart], true)
            .await;
        Ok(created)
    }

    pub async fn update_favorites(&self, action: FavoriteAction) -> ClientResult<()> {
        let user_id = self.services.session().require_user_id()?;
        match action {
            FavoriteAction::Add(book_id) => self.services.users.add_favorite(user_id, book_id).await?,
            FavoriteAction::Remove(book_id) => {
                self.services.users.remove_favorite(user_id, book_id).await?
            }
        }
        self.after_mutation(&[Resource::Favorites], false).await;
        Ok(())
    }

    /// Save profile changes; the stored session user picks up the new values
    pub async fn update_user_info(&self, update: ProfileUpdate) -> ClientResult<UserProfile> {
        let session = self.services.session();
        let user_id = session.require_user_id()?;
        let generation = self.generation.load(Ordering::SeqCst);
        let saved = self.services.users.update_profile(user_id, &update).await?;

        let profile = match self.services.users.get_profile(user_id).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Profile re-fetch failed, applying update locally");
                let mut profile = match saved {
                    Some(profile) => profile,
                    None => self
                        .data
                        .read()
                        .await
                        .profile
                        .clone()
                        .or_else(|| session.current_user())
                        .ok_or(ClientError::NotLoggedIn)?,
                };
                update.apply_to(&mut profile);
                profile
            }
        };

        let stored_profile = profile.clone();
        if self
            .store(generation, |d| d.profile = Some(stored_profile))
            .await
        {
            self.emit(StateEvent::Refreshed(Resource::Profile));
        }

        if let Some(mut user) = session.current_user() {
            update.apply_to(&mut user);
            if let Err(e) = session.refresh_user(&user) {
                tracing::warn!(user_id, error = %e, "Failed to refresh session user");
            }
        }
        Ok(profile)
    }

    /// Re-fetch what a mutation touched; failures only warn
    async fn after_mutation(&self, resources: &[Resource], touches_stock: bool) {
        let generation = self.generation.load(Ordering::SeqCst);
        for resource in resources {
            if let Err(e) = self.reload(*resource, generation).await {
                tracing::warn!(%resource, error = %e, "Refresh after mutation failed");
                self.warn(format!("{}数据刷新失败: {}", resource, e));
            }
        }
        if touches_stock {
            if let Err(e) = self.reload(Resource::Books, generation).await {
                tracing::warn!(error = %e, "Book refresh after mutation failed");
                return;
            }
            self.reconcile_stock().await;
        }
    }

    // ========== Internals ==========

    /// Apply `f` unless the session changed since `generation`
    async fn store<F>(&self, generation: u64, f: F) -> bool
    where
        F: FnOnce(&mut AppData),
    {
        let mut data = self.data.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            return false;
        }
        f(&mut data);
        true
    }

    fn set_phase(&self, phase: Phase) {
        if self.phase.send_replace(phase) != phase {
            tracing::debug!(?phase, "Phase changed");
            self.emit(StateEvent::PhaseChanged(phase));
        }
    }

    fn warn(&self, message: String) {
        self.emit(StateEvent::Warning(message));
    }

    fn emit(&self, event: StateEvent) {
        let _ = self.events.send(event);
    }
}
