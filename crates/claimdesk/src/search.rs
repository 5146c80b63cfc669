//! Lookup lists behind the employer, insurer and worker pickers.

use serde::Serialize;

use crate::db::master_repo::{self, EmployerRow, InsurerRow};
use crate::db::worker_repo::{self, WorkerSummary};
use crate::db::Database;
use crate::error::Result;

/// One page of a paginated search, 1-based.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

impl<T> Page<T> {
    pub fn page_count(&self) -> u64 {
        if self.page_size == 0 {
            0
        } else {
            self.total.div_ceil(self.page_size)
        }
    }
}

#[derive(Clone)]
pub struct SearchService {
    db: Database,
    page_size: u64,
}

impl SearchService {
    pub fn new(db: Database, page_size: u64) -> Self {
        Self {
            db,
            page_size: page_size.max(1),
        }
    }

    pub fn employers(&self, term: &str) -> Result<Vec<EmployerRow>> {
        Ok(self.db.with_conn(|conn| master_repo::search_employers(conn, term))?)
    }

    pub fn insurers(&self, term: &str) -> Result<Vec<InsurerRow>> {
        Ok(self.db.with_conn(|conn| master_repo::search_insurers(conn, term))?)
    }

    /// Workers whose first or last name contains `term`. Page numbers below 1
    /// are treated as the first page.
    pub fn workers(&self, term: &str, page: u64) -> Result<Page<WorkerSummary>> {
        let page = page.max(1);
        let offset = (page - 1) * self.page_size;
        let (rows, total) = self
            .db
            .with_conn(|conn| worker_repo::search(conn, term, self.page_size, offset))?;
        Ok(Page {
            rows,
            total,
            page,
            page_size: self.page_size,
        })
    }
}
