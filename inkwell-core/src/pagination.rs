//! Slicing of ordered listings into fixed size pages.
//!
//! Page numbers are 1-based. Anything that does not name a positive page is
//! read as the first page, and a page past the end is clamped to the last
//! one, so a listing never renders as a blank page or an error.

use serde::{Serialize, Serializer, ser::SerializeStruct};
use std::num::{IntErrorKind, NonZeroUsize};

/// Number of posts on one page of every listing.
pub const PAGE_SIZE: NonZeroUsize = NonZeroUsize::new(10).unwrap();

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub struct PageNumber(NonZeroUsize);

impl PageNumber {
    pub const FIRST: Self = Self(NonZeroUsize::MIN);

    #[must_use]
    pub fn new(number: usize) -> Option<Self> {
        NonZeroUsize::new(number).map(Self)
    }

    /// Reads a raw `page` query value. Missing, non-numeric and non-positive
    /// values all mean the first page. Numbers too large for `usize` mean the
    /// largest page, which [`paginate`] clamps to the last one.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::FIRST;
        };

        match raw.trim().parse::<usize>() {
            Ok(number) => Self::new(number).unwrap_or_default(),
            Err(err) if *err.kind() == IntErrorKind::PosOverflow => Self(NonZeroUsize::MAX),
            Err(_) => Self::FIRST,
        }
    }

    #[must_use]
    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

/// One page of an ordered listing together with what pagination controls need.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Page<T> {
    items: Vec<T>,
    number: usize,
    total_pages: usize,
    total_items: usize,
}

/// Returns the requested page of `items`, clamped to the last page.
///
/// An empty listing still has one, empty, page.
#[must_use]
pub fn paginate<T>(items: Vec<T>, page_size: NonZeroUsize, page_number: PageNumber) -> Page<T> {
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size.get()).max(1);
    let number = page_number.get().min(total_pages);

    let items = items
        .into_iter()
        .skip((number - 1) * page_size.get())
        .take(page_size.get())
        .collect();

    Page {
        items,
        number,
        total_pages,
        total_items,
    }
}

impl<T> Page<T> {
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    #[must_use]
    pub fn number(&self) -> usize {
        self.number
    }

    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    #[must_use]
    pub fn total_items(&self) -> usize {
        self.total_items
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    #[must_use]
    pub fn next_page_number(&self) -> Option<usize> {
        self.has_next().then_some(self.number + 1)
    }

    #[must_use]
    pub fn previous_page_number(&self) -> Option<usize> {
        self.has_previous().then(|| self.number - 1)
    }
}

impl<T: Serialize> Serialize for Page<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut page = serializer.serialize_struct("Page", 7)?;
        page.serialize_field("items", &self.items)?;
        page.serialize_field("number", &self.number)?;
        page.serialize_field("total_pages", &self.total_pages)?;
        page.serialize_field("total_items", &self.total_items)?;
        page.serialize_field("has_next", &self.has_next())?;
        page.serialize_field("has_previous", &self.has_previous())?;
        page.serialize_field("page_size", &PAGE_SIZE)?;
        page.end()
    }
}

#[cfg(test)]
mod tests {
    use crate::pagination::{PAGE_SIZE, PageNumber, paginate};

    fn page(number: usize) -> PageNumber {
        PageNumber::new(number).unwrap()
    }

    #[test]
    fn page_number_parsing() {
        assert_eq!(PageNumber::parse(Some("3")), page(3));
        assert_eq!(PageNumber::parse(Some(" 2 ")), page(2));
        assert_eq!(PageNumber::parse(None), PageNumber::FIRST);
        assert_eq!(PageNumber::parse(Some("")), PageNumber::FIRST);
        assert_eq!(PageNumber::parse(Some("0")), PageNumber::FIRST);
        assert_eq!(PageNumber::parse(Some("-4")), PageNumber::FIRST);
        assert_eq!(PageNumber::parse(Some("two")), PageNumber::FIRST);
        assert_eq!(PageNumber::parse(Some("1.5")), PageNumber::FIRST);
        assert_eq!(PageNumber::parse(Some("-99999999999999999999999")), PageNumber::FIRST);
        assert_eq!(
            PageNumber::parse(Some("99999999999999999999999")),
            page(usize::MAX)
        );
    }

    #[test]
    fn last_partial_page() {
        let posts: Vec<u32> = (1..=25).collect();

        let third = paginate(posts, PAGE_SIZE, page(3));

        assert_eq!(third.items(), [21, 22, 23, 24, 25]);
        assert_eq!(third.total_pages(), 3);
        assert_eq!(third.total_items(), 25);
        assert!(!third.has_next());
        assert!(third.has_previous());
        assert_eq!(third.next_page_number(), None);
        assert_eq!(third.previous_page_number(), Some(2));
    }

    #[test]
    fn middle_page() {
        let posts: Vec<u32> = (1..=25).collect();

        let second = paginate(posts, PAGE_SIZE, page(2));

        assert_eq!(second.items(), (11..=20).collect::<Vec<_>>());
        assert_eq!(second.number(), 2);
        assert_eq!(second.next_page_number(), Some(3));
        assert_eq!(second.previous_page_number(), Some(1));
    }

    #[test]
    fn out_of_range_pages_clamp_to_last() {
        let posts: Vec<u32> = (1..=25).collect();

        let last = paginate(posts.clone(), PAGE_SIZE, page(3));
        let beyond = paginate(posts.clone(), PAGE_SIZE, page(4));
        let far_beyond = paginate(posts.clone(), PAGE_SIZE, page(usize::MAX));
        let overflowing = paginate(
            posts,
            PAGE_SIZE,
            PageNumber::parse(Some("99999999999999999999999")),
        );

        assert_eq!(beyond, last);
        assert_eq!(far_beyond, last);
        assert_eq!(overflowing, last);
        assert_eq!(overflowing.number(), 3);
    }

    #[test]
    fn invalid_pages_are_the_first_page() {
        let posts: Vec<u32> = (1..=25).collect();

        let first = paginate(posts.clone(), PAGE_SIZE, page(1));
        for raw in ["0", "-1", "abc"] {
            assert_eq!(
                paginate(posts.clone(), PAGE_SIZE, PageNumber::parse(Some(raw))),
                first
            );
        }
        assert_eq!(first.items(), (1..=10).collect::<Vec<_>>());
        assert!(!first.has_previous());
    }

    #[test]
    fn empty_listing_has_one_empty_page() {
        let empty = paginate(Vec::<u32>::new(), PAGE_SIZE, page(7));

        assert!(empty.items().is_empty());
        assert_eq!(empty.number(), 1);
        assert_eq!(empty.total_pages(), 1);
        assert!(!empty.has_next());
        assert!(!empty.has_previous());
    }

    #[test]
    fn exact_multiple_of_page_size() {
        let posts: Vec<u32> = (1..=20).collect();

        let second = paginate(posts, PAGE_SIZE, page(2));

        assert_eq!(second.total_pages(), 2);
        assert_eq!(second.items().len(), 10);
        assert!(!second.has_next());
    }

    #[test]
    fn serialized_page_carries_controls() {
        let page = paginate(vec!["a", "b"], PAGE_SIZE, PageNumber::FIRST);

        let json = serde_json::to_value(&page).unwrap();

        assert_eq!(json["items"], serde_json::json!(["a", "b"]));
        assert_eq!(json["number"], 1);
        assert_eq!(json["total_pages"], 1);
        assert_eq!(json["has_next"], false);
        assert_eq!(json["has_previous"], false);
        assert_eq!(json["page_size"], 10);
    }
}
