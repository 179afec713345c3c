//! Page arithmetic for the catalog view.
//!
//! The backend pages its own results; this side only needs to know which page
//! the visitor asked for and how many pages the reported total spans.

pub(crate) const PAGE_SIZE: u64 = 10;

/// Read a `page` query value the way a browser-side `Number(x) || 1` would,
/// clamped so the result is always a usable 1-based page.
pub(crate) fn parse_page(raw: Option<&str>) -> u64 {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return 1;
    };
    if let Some(page) = parse_prefixed(raw) {
        return page;
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 1.0 => {
            let page = value.trunc();
            if page >= u64::MAX as f64 {
                u64::MAX
            } else {
                page as u64
            }
        }
        _ => 1,
    }
}

/// `0x`, `0o` and `0b` literals. These take no sign, so `-0x10` falls
/// through to the decimal parse and is rejected there.
fn parse_prefixed(raw: &str) -> Option<u64> {
    let radix = match raw.get(..2)? {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    let digits = &raw[2..];
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Some(1);
    }
    // Digits are valid, so the only failure left is overflow.
    let page = u64::from_str_radix(digits, radix).unwrap_or(u64::MAX);
    Some(page.max(1))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pagination {
    pub(crate) current_page: u64,
    pub(crate) page_size: u64,
    pub(crate) total_count: u64,
    pub(crate) total_pages: u64,
    pub(crate) start_index: u64,
    pub(crate) end_index: u64,
}

impl Pagination {
    pub(crate) fn new(current_page: u64, total_count: u64, page_size: u64) -> Self {
        let current_page = current_page.max(1);
        let page_size = page_size.max(1);
        let total_pages = total_count.div_ceil(page_size);
        let start_index = (current_page - 1).saturating_mul(page_size);
        Self {
            current_page,
            page_size,
            total_count,
            total_pages,
            start_index,
            end_index: start_index.saturating_add(page_size),
        }
    }

    pub(crate) fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub(crate) fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub(crate) fn previous_page(&self) -> Option<u64> {
        self.has_previous().then(|| self.current_page - 1)
    }

    pub(crate) fn next_page(&self) -> Option<u64> {
        self.has_next().then(|| self.current_page + 1)
    }

    /// 1-based inclusive range of result positions on this page, if any.
    pub(crate) fn shown_range(&self) -> Option<(u64, u64)> {
        if self.start_index >= self.total_count {
            return None;
        }
        Some((self.start_index + 1, self.end_index.min(self.total_count)))
    }
}
