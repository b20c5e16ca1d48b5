// bookstore-client/src/services/book.rs
// 图书服务 - 目录浏览与管理员图书维护

use std::sync::Arc;

use serde_json::json;
use shared::models::{Book, BookCreate, BookStatus, BookUpdate, StatusChange, StockCheck, StockUpdate};
use shared::{BookQuery, QueryParams};

use crate::error::ClientResult;
use crate::http::{HttpClient, to_body};
use crate::normalize::{list_of, object_of};

#[derive(Debug, Clone)]
pub struct BookService {
    http: Arc<dyn HttpClient>,
}

impl BookService {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    // ========== Catalog ==========

    /// Every book, without paging parameters
    pub async fn get_all_books(&self) -> ClientResult<Vec<Book>> {
        let books: Vec<Book> = list_of(self.http.get("/books", &QueryParams::new()).await?);
        tracing::debug!(count = books.len(), "Fetched all books");
        Ok(books)
    }

    pub async fn get_books(&self, query: &BookQuery) -> ClientResult<Vec<Book>> {
        Ok(list_of(self.http.get("/books", &query.to_params()).await?))
    }

    pub async fn get_book(&self, book_id: i64) -> ClientResult<Book> {
        let value = self
            .http
            .get(&format!("/books/{}", book_id), &QueryParams::new())
            .await?;
        object_of(value, "book")
    }

    /// Keyword search; paging and category filters from `query` still apply
    pub async fn search_books(&self, keyword: &str, query: &BookQuery) -> ClientResult<Vec<Book>> {
        let params = QueryParams::new()
            .with("keyword", Some(keyword))
            .merge(query.to_params());
        Ok(list_of(self.http.get("/books/search", &params).await?))
    }

    pub async fn get_books_by_category(&self, category: &str) -> ClientResult<Vec<Book>> {
        self.get_books(&BookQuery::category(category)).await
    }

    pub async fn get_available_books(&self) -> ClientResult<Vec<Book>> {
        Ok(list_of(
            self.http.get("/books/available", &QueryParams::new()).await?,
        ))
    }

    pub async fn get_categories(&self) -> ClientResult<Vec<String>> {
        Ok(list_of(
            self.http.get("/books/categories", &QueryParams::new()).await?,
        ))
    }

    pub async fn get_popular_books(&self, limit: u32) -> ClientResult<Vec<Book>> {
        let params = QueryParams::new().with("limit", Some(limit));
        Ok(list_of(self.http.get("/books/popular", &params).await?))
    }

    // ========== Admin ==========

    pub async fn create_book(&self, book: &BookCreate) -> ClientResult<Book> {
        tracing::info!(title = %book.title, "Creating book");
        object_of(self.http.post("/admin/books", to_body(book)?).await?, "book")
    }

    pub async fn update_book(&self, book_id: i64, update: &BookUpdate) -> ClientResult<Book> {
        tracing::info!(book_id, "Updating book");
        let value = self
            .http
            .put(&format!("/admin/books/{}", book_id), to_body(update)?)
            .await?;
        object_of(value, "book")
    }

    pub async fn delete_book(&self, book_id: i64) -> ClientResult<()> {
        tracing::info!(book_id, "Deleting book");
        self.http.delete(&format!("/admin/books/{}", book_id)).await?;
        Ok(())
    }

    /// Set a book's lifecycle status
    ///
    /// The value is checked against `AVAILABLE`, `OUT_OF_STOCK` and
    /// `DISCONTINUED` before anything is sent.
    pub async fn update_book_status(&self, book_id: i64, status: &str) -> ClientResult<()> {
        let status: BookStatus = status.parse()?;
        self.set_book_status(book_id, status).await
    }

    /// Typed variant of [`Self::update_book_status`]
    pub async fn set_book_status(&self, book_id: i64, status: BookStatus) -> ClientResult<()> {
        tracing::info!(book_id, %status, "Updating book status");
        self.http
            .put(
                &format!("/admin/books/{}/status", book_id),
                to_body(&StatusChange { status })?,
            )
            .await?;
        Ok(())
    }

    /// Mark one book sold out when its stock has run dry
    pub async fn check_and_update_stock_status(&self, book_id: i64) -> ClientResult<StockCheck> {
        let book = self.get_book(book_id).await?;
        if book.needs_out_of_stock_mark() {
            self.set_book_status(book_id, BookStatus::OutOfStock).await?;
            tracing::info!(book_id, "Book marked out of stock");
            return Ok(StockCheck {
                auto_updated: true,
                status: BookStatus::OutOfStock,
            });
        }
        Ok(StockCheck {
            auto_updated: false,
            status: book.effective_status(),
        })
    }

    /// Whether another book already uses `isbn`
    pub async fn check_isbn_exists(&self, isbn: &str, exclude_book_id: Option<i64>) -> ClientResult<bool> {
        let params = QueryParams::new()
            .with("isbn", Some(isbn))
            .with("excludeBookId", exclude_book_id);
        let value = self.http.get("/admin/books/check-isbn", &params).await?;
        Ok(value
            .as_ref()
            .and_then(|v| v.get("exists"))
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }

    pub async fn batch_update_stock(&self, updates: &[StockUpdate]) -> ClientResult<()> {
        tracing::info!(count = updates.len(), "Batch updating stock");
        self.http
            .put("/admin/books/batch-stock", json!({ "updates": updates }))
            .await?;
        Ok(())
    }
}
