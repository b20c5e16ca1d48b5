// bookstore-client/src/navigator.rs
// 导航 - 会话失效时跳转登录页

use parking_lot::RwLock;
use std::fmt::Debug;

/// Location control for the embedding UI
pub trait Navigator: Send + Sync + Debug {
    /// Path currently shown
    fn current_path(&self) -> String;
    /// Replace the current location
    fn navigate(&self, path: &str);
}

/// Navigator that only records locations; the UI layer polls it
#[derive(Debug)]
pub struct MemoryNavigator {
    current: RwLock<String>,
    history: RwLock<Vec<String>>,
}

impl MemoryNavigator {
    pub fn new(initial: impl Into<String>) -> Self {
        let initial = initial.into();
        Self {
            current: RwLock::new(initial.clone()),
            history: RwLock::new(vec![initial]),
        }
    }

    /// Every path visited, oldest first
    pub fn history(&self) -> Vec<String> {
        self.history.read().clone()
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.current.read().clone()
    }

    fn navigate(&self, path: &str) {
        tracing::debug!(path, "Navigating");
        *self.current.write() = path.to_string();
        self.history.write().push(path.to_string());
    }
}
