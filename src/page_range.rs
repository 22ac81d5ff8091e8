use std::collections::BTreeSet;
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use thiserror::Error;

/// Upper bound on the pages a resolution may return.
///
/// Zero is unrepresentable: a caller that has no positive bound has broken
/// the resolver's contract, and finds out when building the limit rather than
/// through a silent fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageLimit(NonZeroU32);

impl PageLimit {
    pub const DEFAULT: PageLimit = match NonZeroU32::new(20) {
        Some(n) => PageLimit(n),
        None => panic!("default page limit must be non-zero"),
    };

    pub fn new(max_pages: u32) -> Option<Self> {
        NonZeroU32::new(max_pages).map(PageLimit)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// Narrow this limit to a document's page count. `None` for an empty document.
    pub fn clamp_to(self, page_count: u32) -> Option<Self> {
        PageLimit::new(self.get().min(page_count))
    }
}

impl Default for PageLimit {
    fn default() -> Self {
        PageLimit::DEFAULT
    }
}

impl fmt::Display for PageLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for PageLimit {
    type Err = PageRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .ok()
            .and_then(PageLimit::new)
            .ok_or_else(|| PageRangeError::InvalidLimit(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageRangeError {
    #[error("page limit must be a positive integer, got {0:?}")]
    InvalidLimit(String),

    #[error("empty entry in page range")]
    EmptyToken,

    #[error("invalid page range entry: {0:?}")]
    Malformed(String),

    #[error("page {page} is out of range (1-{max})")]
    OutOfBounds { page: i64, max: u32 },

    #[error("range {start}-{end} runs backwards")]
    Inverted { start: i64, end: i64 },

    #[error("no pages in range after clamping to 1-{0}")]
    NoPages(u32),
}

/// Ascending, duplicate-free list of 1-based page numbers, all within the
/// limit it was resolved against. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageSet(Vec<u32>);

impl PageSet {
    /// Every page from 1 through `limit`.
    pub fn full(limit: PageLimit) -> Self {
        PageSet((1..=limit.get()).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    pub fn last(&self) -> u32 {
        // non-empty by construction
        self.0[self.0.len() - 1]
    }

    pub fn into_vec(self) -> Vec<u32> {
        self.0
    }
}

impl fmt::Display for PageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, page) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", page)?;
        }
        Ok(())
    }
}

/// Resolve a page range expression like "2,3,5-8,9" against `limit`.
///
/// Never fails: a blank expression, any bad entry, or a selection that clamps
/// down to nothing yields every page from 1 through `limit`. One bad entry
/// discards the whole expression, including its valid entries.
pub fn resolve(expression: &str, limit: PageLimit) -> PageSet {
    match parse(expression, limit) {
        Ok(pages) => pages,
        Err(e @ PageRangeError::NoPages(_)) => {
            tracing::debug!(expression, "{}, using all pages", e);
            PageSet::full(limit)
        }
        Err(e) => {
            tracing::warn!(expression, "Error parsing page ranges: {}, using all pages", e);
            PageSet::full(limit)
        }
    }
}

/// Strict form of [`resolve`]: reports why an expression was rejected
/// instead of falling back. A blank expression still means every page.
pub fn parse(expression: &str, limit: PageLimit) -> Result<PageSet, PageRangeError> {
    let normalized: String = expression.chars().filter(|c| !c.is_whitespace()).collect();
    if normalized.is_empty() {
        return Ok(PageSet::full(limit));
    }

    let max = limit.get();
    let mut pages = BTreeSet::new();
    for token in normalized.split(',') {
        let (lo, hi) = parse_token(token, max)?;
        pages.extend(lo..=hi);
    }

    if pages.is_empty() {
        return Err(PageRangeError::NoPages(max));
    }
    Ok(PageSet(pages.into_iter().collect()))
}

/// Parse one entry into an inclusive span, which is empty when `lo > hi`.
fn parse_token(token: &str, max: u32) -> Result<(u32, u32), PageRangeError> {
    if token.is_empty() {
        return Err(PageRangeError::EmptyToken);
    }

    if token.contains('-') {
        let mut parts = token.split('-');
        let (start, end) = match (parts.next(), parts.next(), parts.next()) {
            (Some(start), Some(end), None) => (parse_number(start, token)?, parse_number(end, token)?),
            _ => return Err(PageRangeError::Malformed(token.to_string())),
        };
        if start > end {
            return Err(PageRangeError::Inverted { start, end });
        }
        let lo = start.max(1);
        let hi = end.min(i64::from(max));
        if lo > hi {
            // clamps to nothing; contributes no pages
            return Ok((1, 0));
        }
        // both within 1..=max here
        Ok((lo as u32, hi as u32))
    } else {
        let page = parse_number(token, token)?;
        if page < 1 || page > i64::from(max) {
            return Err(PageRangeError::OutOfBounds { page, max });
        }
        Ok((page as u32, page as u32))
    }
}

/// Parse one side of an entry. An all-digit number too large for `i64`
/// saturates, so an oversized range end still clamps to the limit.
fn parse_number(s: &str, token: &str) -> Result<i64, PageRangeError> {
    s.parse::<i64>().or_else(|_| {
        let digits = s.strip_prefix('+').unwrap_or(s);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            Ok(i64::MAX)
        } else {
            Err(PageRangeError::Malformed(token.to_string()))
        }
    })
}
