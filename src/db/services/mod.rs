//! Data-access layer. Each entity exposes a capability trait (`UserStore`,
//! `CategoryStore`, `TodoStore`) so handlers can run against substitutes, and
//! one SeaORM-backed implementation. Every category and todo query is scoped
//! by the owning user's id.

pub mod category_service;
pub mod todo_service;
pub mod user_service;

pub use category_service::{CategoryError, CategoryService, CategoryStore};
pub use todo_service::{TodoError, TodoFilter, TodoService, TodoStore};
pub use user_service::{UserError, UserService, UserStore};

// LIMIT and OFFSET are bound as signed 64-bit integers.
const MAX_BOUND: u64 = i64::MAX as u64;

/// Offset pagination over a 1-based page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u64,
    per_page: u64,
}

impl Pagination {
    /// Returns `None` when either value is zero, or when the page size or
    /// the resulting offset does not fit in an `i64`.
    pub fn new(page: u64, per_page: u64) -> Option<Self> {
        if page == 0 || per_page == 0 || per_page > MAX_BOUND {
            return None;
        }
        (page - 1)
            .checked_mul(per_page)
            .filter(|offset| *offset <= MAX_BOUND)?;
        Some(Self { page, per_page })
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.per_page
    }
}
