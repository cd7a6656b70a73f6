//! Feed listing: pagination and title search.

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use uuid::Uuid;

use super::Post;

/// Number of posts shown per feed page.
pub const PAGE_SIZE: u64 = 4;

/// Highest accepted page; keeps `offset()` within the `i64` range SQL binds.
pub const MAX_PAGE: u64 = i64::MAX as u64 / PAGE_SIZE;

/// A validated, 1-based page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
}

impl PageRequest {
    /// Build from an untrusted query value. Missing, zero and negative pages fall back to 1;
    /// pages past [`MAX_PAGE`] are clamped to it.
    pub fn new(page: Option<i64>) -> Self {
        let page = page
            .filter(|p| *p >= 1)
            .map(|p| (p as u64).min(MAX_PAGE))
            .unwrap_or(1);
        Self { page }
    }

    /// Parse the raw `page` query parameter.
    pub fn parse(raw: Option<&str>) -> Self {
        Self::new(raw.and_then(|s| s.trim().parse().ok()))
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(PAGE_SIZE)
    }

    pub fn limit(&self) -> u64 {
        PAGE_SIZE
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Case-insensitive literal substring search on post titles.
///
/// The raw query never reaches a pattern engine unescaped: the in-memory matcher
/// escapes regex metacharacters and [`SearchTerm::like_pattern`] escapes SQL
/// `LIKE` wildcards.
#[derive(Debug, Clone)]
pub struct SearchTerm {
    raw: String,
    matcher: Regex,
}

impl SearchTerm {
    /// Returns `None` for blank input.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let raw = raw?;
        if raw.trim().is_empty() {
            return None;
        }

        let matcher = RegexBuilder::new(&regex::escape(raw))
            .case_insensitive(true)
            .build()
            .ok()?;

        Some(Self {
            raw: raw.to_string(),
            matcher,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, title: &str) -> bool {
        self.matcher.is_match(title)
    }

    /// Lower-cased `LIKE` pattern with `\` as the escape character.
    pub fn like_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.raw.len() + 2);
        pattern.push('%');
        for c in self.raw.to_lowercase().chars() {
            if matches!(c, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        pattern
    }
}

/// Criteria for selecting posts.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub author_id: Option<Uuid>,
    pub search: Option<SearchTerm>,
}

impl PostFilter {
    pub fn by_author(author_id: Uuid) -> Self {
        Self {
            author_id: Some(author_id),
            search: None,
        }
    }

    pub fn with_search(mut self, search: Option<SearchTerm>) -> Self {
        self.search = search;
        self
    }

    pub fn matches(&self, post: &Post) -> bool {
        if let Some(author_id) = self.author_id {
            if !post.is_authored_by(author_id) {
                return false;
            }
        }
        self.search
            .as_ref()
            .map(|term| term.matches(&post.title))
            .unwrap_or(true)
    }
}

/// One page of results plus the metadata needed to render pagination links.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        Self {
            items,
            current_page: request.page(),
            total_items,
            total_pages: total_items.div_ceil(PAGE_SIZE),
        }
    }

    /// `1..=total_pages`, empty when there are no results.
    pub fn page_numbers(&self) -> Vec<u64> {
        (1..=self.total_pages).collect()
    }
}
