//! List query composition: filters, page and page size.
//!
//! The remote never reports a total item count, so whether a next page
//! exists is unknown until it is fetched. "Next" is therefore always
//! enabled and an empty page is a valid terminal state.

use crate::error::CoreError;
use crate::status::ApplicationStatus;

/// First page number.
pub const FIRST_PAGE: u32 = 1;

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page size the client will request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// User-selectable list filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilters {
    pub status: Option<ApplicationStatus>,
    pub source: Option<String>,
    pub include_deleted: bool,
}

/// Working-set key of the list view.
///
/// Construct with [`compose`]; every filter setter resets `page` to 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    status: Option<ApplicationStatus>,
    source: Option<String>,
    page: u32,
    size: u32,
    include_deleted: bool,
}

/// Enabled state of the pagination controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageControls {
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

/// Build a query from filters, page and size.
///
/// A page of 0 is clamped to 1. A size of 0 is rejected; sizes above
/// [`MAX_PAGE_SIZE`] are clamped. A blank source filter counts as unset.
pub fn compose(filters: ListFilters, page: u32, size: u32) -> Result<QuerySpec, CoreError> {
    if size == 0 {
        return Err(CoreError::Validation(
            "Page size must be a positive integer".to_string(),
        ));
    }

    Ok(QuerySpec {
        status: filters.status,
        source: normalize_source(filters.source),
        page: page.max(FIRST_PAGE),
        size: size.min(MAX_PAGE_SIZE),
        include_deleted: filters.include_deleted,
    })
}

fn normalize_source(source: Option<String>) -> Option<String> {
    source
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl QuerySpec {
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn status(&self) -> Option<ApplicationStatus> {
        self.status
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn include_deleted(&self) -> bool {
        self.include_deleted
    }

    pub fn filters(&self) -> ListFilters {
        ListFilters {
            status: self.status,
            source: self.source.clone(),
            include_deleted: self.include_deleted,
        }
    }

    /// Replace the status filter and go back to the first page.
    pub fn with_status(&self, status: Option<ApplicationStatus>) -> Self {
        Self {
            status,
            page: FIRST_PAGE,
            ..self.clone()
        }
    }

    /// Replace the source filter and go back to the first page.
    pub fn with_source(&self, source: Option<String>) -> Self {
        Self {
            source: normalize_source(source),
            page: FIRST_PAGE,
            ..self.clone()
        }
    }

    /// Toggle soft-deleted rows and go back to the first page.
    pub fn with_include_deleted(&self, include_deleted: bool) -> Self {
        Self {
            include_deleted,
            page: FIRST_PAGE,
            ..self.clone()
        }
    }

    pub fn next_page(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            ..self.clone()
        }
    }

    /// Step back one page, never below the first.
    pub fn prev_page(&self) -> Self {
        Self {
            page: self.page.saturating_sub(1).max(FIRST_PAGE),
            ..self.clone()
        }
    }

    pub fn controls(&self) -> PageControls {
        PageControls {
            prev_enabled: self.page > FIRST_PAGE,
            next_enabled: true,
        }
    }

    /// Query-string pairs for the list endpoint. Unset filters are omitted.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("size", self.size.to_string()),
            ("include_deleted", self.include_deleted.to_string()),
        ];
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(source) = &self.source {
            pairs.push(("source", source.clone()));
        }
        pairs
    }
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            status: None,
            source: None,
            page: FIRST_PAGE,
            size: DEFAULT_PAGE_SIZE,
            include_deleted: false,
        }
    }
}
