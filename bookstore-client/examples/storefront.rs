// bookstore-client/examples/storefront.rs
// 书店客户端示例 - 登录、加载数据、加入购物车

use std::sync::Arc;

use bookstore_client::logger::init_logger_from_env;
use bookstore_client::{
    AppState, CartAction, ClientConfig, MemoryNavigator, Phase, RouteGuard, Services, SessionStore,
    StateEvent,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger_from_env();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        println!("Usage: {} <username> <password> [book_id]", args[0]);
        println!("  Example: {} reader secret 1", args[0]);
        return Ok(());
    }
    let username = &args[1];
    let password = &args[2];
    let book_id: Option<i64> = args.get(3).and_then(|v| v.parse().ok());

    let config = ClientConfig::from_env();
    let session = SessionStore::from_config(&config);
    let navigator = Arc::new(MemoryNavigator::new("/"));
    let services = Services::connect(&config, session, navigator.clone())?;

    let guard = RouteGuard::new(services.auth.clone(), config.login_route.clone());
    let state = Arc::new(AppState::new(services, &config));
    let _listener = state.attach_session_listener();

    // 打印警告提示
    let mut events = state.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if let StateEvent::Warning(message) = event {
                tracing::warn!("{}", message);
            }
        }
    });

    if !state.resume() {
        let user = state.login(username, password).await?;
        tracing::info!("Logged in as: {}", user.display_name());
    }
    state.wait_for_phase(Phase::Ready).await;

    let entry = guard.check("/cart").await;
    tracing::info!("Route guard: {:?}", entry);

    let data = state.snapshot().await;
    tracing::info!(
        books = data.books.len(),
        cart = data.cart.len(),
        orders = data.orders.len(),
        favorites = data.favorites.len(),
        "Loaded storefront"
    );

    if let Some(book_id) = book_id {
        state
            .update_cart(CartAction::Add {
                book_id,
                quantity: 1,
            })
            .await?;
        let cart = state.snapshot().await.cart;
        let total: f64 = cart.iter().map(|item| item.subtotal()).sum();
        tracing::info!(items = cart.len(), total, "Cart updated");
    }

    tracing::info!("Navigator history: {:?}", navigator.history());
    Ok(())
}
