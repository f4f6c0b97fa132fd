//! Lenient parsing of `page` / `page_size` query parameters.
//!
//! Clients historically sent arbitrary strings here, so garbage is clamped
//! instead of rejected: a non-numeric or zero page becomes 1, a page size
//! defaults to 10 and is clamped to `1..=100`.

use api_types::{Page, PageQuery};
use engine::MAX_PAGE_SIZE;

pub(crate) const DEFAULT_PAGE_SIZE: u64 = 10;

/// Parses the leading integer of `raw` (optional sign, then digits), the way
/// browsers' `parseInt` does. Returns `None` when there is no number.
fn leading_int(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let (negative, digits) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let value = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

/// Returns `None` when the whole collection was requested, `(page, page_size)`
/// otherwise.
pub(crate) fn requested_page(query: &PageQuery) -> Option<(u64, u64)> {
    let page = query.page.as_deref().filter(|p| !p.is_empty())?;
    let page = match leading_int(page) {
        Some(n) if n >= 1 => n as u64,
        _ => 1,
    };
    let page_size = match query.page_size.as_deref().filter(|p| !p.is_empty()) {
        None => DEFAULT_PAGE_SIZE,
        Some(raw) => match leading_int(raw) {
            None | Some(0) => DEFAULT_PAGE_SIZE,
            Some(n) => n.clamp(1, MAX_PAGE_SIZE as i64) as u64,
        },
    };
    Some((page, page_size))
}

pub(crate) fn total_pages(total: u64, page_size: u64) -> u64 {
    total.div_ceil(page_size).max(1)
}

pub(crate) fn envelope<T>(items: Vec<T>, total: u64, page: u64, page_size: u64) -> Page<T> {
    Page {
        items,
        total,
        page,
        page_size,
        total_pages: total_pages(total, page_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<&str>, page_size: Option<&str>) -> PageQuery {
        PageQuery {
            page: page.map(str::to_string),
            page_size: page_size.map(str::to_string),
        }
    }

    #[test]
    fn no_page_means_everything() {
        assert_eq!(requested_page(&query(None, Some("20"))), None);
        assert_eq!(requested_page(&query(Some(""), None)), None);
    }

    #[test]
    fn page_defaults_and_clamps() {
        assert_eq!(requested_page(&query(Some("2"), None)), Some((2, 10)));
        assert_eq!(requested_page(&query(Some("abc"), None)), Some((1, 10)));
        assert_eq!(requested_page(&query(Some("0"), None)), Some((1, 10)));
        assert_eq!(requested_page(&query(Some("-4"), None)), Some((1, 10)));
        assert_eq!(requested_page(&query(Some("3x"), None)), Some((3, 10)));
    }

    #[test]
    fn page_size_defaults_and_clamps() {
        assert_eq!(requested_page(&query(Some("1"), Some("25"))), Some((1, 25)));
        assert_eq!(requested_page(&query(Some("1"), Some("500"))), Some((1, 100)));
        assert_eq!(requested_page(&query(Some("1"), Some("0"))), Some((1, 10)));
        assert_eq!(requested_page(&query(Some("1"), Some("-5"))), Some((1, 1)));
        assert_eq!(requested_page(&query(Some("1"), Some("many"))), Some((1, 10)));
    }

    #[test]
    fn total_pages_is_at_least_one() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(21, 10), 3);
    }
}
