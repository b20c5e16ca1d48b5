//! Favorite Model

use super::book::Book;
use serde::{Deserialize, Serialize};

/// Favorited book, keyed by book id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "RawFavorite")]
pub struct Favorite {
    /// Book id
    pub id: i64,
    pub title: String,
    pub author: String,
}

/// Favorites arrive as a book projection, a row with `bookId`, or a row
/// wrapping the full `book`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFavorite {
    id: i64,
    #[serde(default)]
    book_id: Option<i64>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    book: Option<Book>,
}

impl From<RawFavorite> for Favorite {
    fn from(raw: RawFavorite) -> Self {
        match raw.book {
            Some(book) => Favorite {
                id: book.id,
                title: book.title,
                author: book.author,
            },
            None => Favorite {
                id: raw.book_id.unwrap_or(raw.id),
                title: raw.title.unwrap_or_default(),
                author: raw.author.unwrap_or_default(),
            },
        }
    }
}

impl From<&Book> for Favorite {
    fn from(book: &Book) -> Self {
        Favorite {
            id: book.id,
            title: book.title.clone(),
            author: book.author.clone(),
        }
    }
}

/// Add-favorite payload
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteAdd {
    pub book_id: i64,
}
