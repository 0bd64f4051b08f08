use axum::http::Uri;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;

/// Items per page when the client does not ask for another size.
pub const PAGE_SIZE: u64 = 3;
/// Ceiling for a client-requested `page_size`.
pub const MAX_PAGE_SIZE: u64 = 1000;

const PAGE_PARAM: &str = "page";

/// PageParams
///
/// Pagination query parameters. Both are kept as raw strings so a malformed
/// value falls back (size) or yields `NotFound` (page) instead of a
/// deserialization rejection.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// 1-based page number, or `last`.
    pub page: Option<String>,
    /// Items per page, capped at 1000.
    pub page_size: Option<String>,
}

/// A resolved page within a collection of known size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: u64,
    pub size: u64,
    pub num_pages: u64,
}

impl PageParams {
    /// Requested size: non-positive or unparsable values use the default.
    pub fn page_size(&self) -> u64 {
        self.page_size
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|size| *size > 0)
            .map_or(PAGE_SIZE, |size| size.min(MAX_PAGE_SIZE))
    }

    /// resolve
    ///
    /// Validates the requested page against `count` items. An empty collection
    /// still has a first page.
    pub fn resolve(&self, count: u64) -> Result<PageRequest, ApiError> {
        let size = self.page_size();
        let num_pages = count.div_ceil(size).max(1);

        let number = match self.page.as_deref().map(str::trim) {
            None | Some("") => 1,
            Some("last") => num_pages,
            Some(raw) => raw.parse::<u64>().map_err(|_| ApiError::NotFound)?,
        };

        if number == 0 || number > num_pages {
            return Err(ApiError::NotFound);
        }

        Ok(PageRequest {
            number,
            size,
            num_pages,
        })
    }
}

impl PageRequest {
    pub fn limit(&self) -> i64 {
        i64::try_from(self.size).unwrap_or(i64::MAX)
    }

    pub fn offset(&self) -> i64 {
        i64::try_from((self.number - 1) * self.size).unwrap_or(i64::MAX)
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }
}

/// Page
///
/// The list envelope: total count, links to the neighbouring pages, and the
/// items of the current page.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Wraps `results` for `request`, deriving the links from the request URI.
    pub fn new(results: Vec<T>, count: u64, request: PageRequest, uri: &Uri) -> Self {
        let next = request
            .has_next()
            .then(|| page_link(uri, Some(request.number + 1)));
        let previous = request.has_previous().then(|| {
            // The first page is linked without a page parameter.
            let target = request.number - 1;
            page_link(uri, (target > 1).then_some(target))
        });

        Self {
            count,
            next,
            previous,
            results,
        }
    }
}

/// page_link
///
/// Rebuilds `uri` with its `page` parameter replaced (or dropped when `page`
/// is `None`), keeping every other query parameter verbatim.
pub fn page_link(uri: &Uri, page: Option<u64>) -> String {
    let mut pairs: Vec<String> = uri
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| pair.split('=').next() != Some(PAGE_PARAM))
        .map(str::to_string)
        .collect();

    if let Some(number) = page {
        pairs.push(format!("{PAGE_PARAM}={number}"));
    }

    if pairs.is_empty() {
        uri.path().to_string()
    } else {
        format!("{}?{}", uri.path(), pairs.join("&"))
    }
}
