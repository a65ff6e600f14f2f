//! Page-by-page access to the results of a query.

use crate::database::Database;
use crate::query::Query;
use sqlrecord_core::coerce::leading_int;
use sqlrecord_core::{BuilderErrorKind, Connection, Error, Result, Row};
use std::cell::Cell;

/// Splits the results of a base query into fixed-size pages.
///
/// The total row count is fetched with one `COUNT(..)` query the first time it
/// is needed and memoized afterwards.
#[derive(Debug)]
pub struct QueryPaginator<'a, C: Connection> {
    db: &'a Database<C>,
    query: Query,
    count_column: String,
    page_size: u64,
    page_index: u64,
    total: Cell<Option<u64>>,
}

impl<'a, C: Connection> QueryPaginator<'a, C> {
    /// Paginate `query` counting `*`. Any LIMIT/OFFSET on the query is dropped.
    #[allow(clippy::result_large_err)]
    pub fn new(db: &'a Database<C>, query: Query, page_size: u64) -> Result<Self> {
        Self::counting(db, query, page_size, "*")
    }

    /// Paginate `query`, counting rows with `COUNT(count_column)`.
    #[allow(clippy::result_large_err)]
    pub fn counting(
        db: &'a Database<C>,
        query: Query,
        page_size: u64,
        count_column: impl Into<String>,
    ) -> Result<Self> {
        if page_size == 0 {
            return Err(Error::builder(
                BuilderErrorKind::InvalidPageSize,
                "page size must be at least 1",
            ));
        }
        Ok(Self {
            db,
            query: query.without_limit(),
            count_column: count_column.into(),
            page_size,
            page_index: 0,
            total: Cell::new(None),
        })
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn page_index(&self) -> u64 {
        self.page_index
    }

    /// Select the page subsequent calls refer to.
    pub fn set_page_index(&mut self, index: u64) {
        self.page_index = index;
    }

    /// Total number of rows the base query matches.
    #[allow(clippy::result_large_err)]
    pub fn total(&self) -> Result<u64> {
        if let Some(total) = self.total.get() {
            return Ok(total);
        }

        let mut count = self
            .query
            .clone()
            .without_order_by()
            .count(&self.count_column);
        let rows = self.db.fetch_rows(&mut count)?;
        let total = rows
            .first()
            .and_then(|row| row.get(0).flatten())
            .map_or(0, leading_int)
            .max(0) as u64;

        tracing::debug!(table = %self.query.table(), total, "counted rows for pagination");
        self.total.set(Some(total));
        Ok(total)
    }

    /// Number of pages; zero when there are no rows.
    #[allow(clippy::result_large_err)]
    pub fn page_count(&self) -> Result<u64> {
        Ok(self.total()?.div_ceil(self.page_size))
    }

    /// Is `index` a page that exists? Page 0 always exists.
    #[allow(clippy::result_large_err)]
    pub fn is_valid_page_index(&self, index: u64) -> Result<bool> {
        let pages = self.page_count()?;
        Ok(index == 0 || index < pages)
    }

    pub fn is_first_page(&self) -> bool {
        self.page_index == 0
    }

    #[allow(clippy::result_large_err)]
    pub fn is_last_page(&self) -> Result<bool> {
        let pages = self.page_count()?;
        Ok(self.page_index.saturating_add(1) >= pages)
    }

    /// Offset of the first row on the current page.
    pub fn offset(&self) -> u64 {
        self.page_index.saturating_mul(self.page_size)
    }

    /// Number of rows on the current page.
    #[allow(clippy::result_large_err)]
    pub fn current_page_item_count(&self) -> Result<u64> {
        if self.is_last_page()? {
            Ok(self.total()?.saturating_sub(self.offset()))
        } else {
            Ok(self.page_size)
        }
    }

    /// A fresh copy of the base query restricted to the current page.
    pub fn paginated_query(&self) -> Query {
        self.query
            .clone()
            .limit(self.page_size)
            .offset(self.offset())
    }

    /// Fetch the rows of the current page.
    #[allow(clippy::result_large_err)]
    pub fn fetch_rows(&self) -> Result<Vec<Row>> {
        self.db.fetch_rows(&mut self.paginated_query())
    }
}
