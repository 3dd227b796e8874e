//! Abstractions for page-number pagination.

use std::num::NonZeroU32;

/// Pagination arguments requesting a single page.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Arguments {
    /// Requested page number, starting from `1`.
    page: NonZeroU32,

    /// Number of items on a single page.
    per_page: NonZeroU32,
}

impl Arguments {
    /// Default number of items on a single page.
    pub const PER_PAGE: NonZeroU32 = match NonZeroU32::new(20) {
        Some(n) => n,
        None => unreachable!(),
    };

    /// Creates new [`Arguments`] for the provided `page` with the default
    /// [`Arguments::PER_PAGE`] size.
    ///
    /// Missing or zero `page` falls back to the first one.
    #[must_use]
    pub fn new(page: Option<u32>) -> Self {
        Self {
            page: page.and_then(NonZeroU32::new).unwrap_or(NonZeroU32::MIN),
            per_page: Self::PER_PAGE,
        }
    }

    /// Returns the requested page number.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page.get()
    }

    /// Returns the number of items on a single page.
    #[must_use]
    pub fn per_page(&self) -> u32 {
        self.per_page.get()
    }

    /// Returns the number of items to skip before the requested page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.get() - 1) * u64::from(self.per_page.get())
    }
}

impl Default for Arguments {
    fn default() -> Self {
        Self::new(None)
    }
}

/// A single page of items along with the total count of matching items.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Page<T> {
    /// Items on this [`Page`].
    pub items: Vec<T>,

    /// Total number of items across all pages.
    pub total: u64,

    /// [`Arguments`] this [`Page`] was selected with.
    pub arguments: Arguments,
}

impl<T> Page<T> {
    /// Creates a new [`Page`] out of the provided `items`.
    #[must_use]
    pub fn new(
        arguments: Arguments,
        items: impl IntoIterator<Item = T>,
        total: u64,
    ) -> Self {
        Self {
            items: items.into_iter().collect(),
            total,
            arguments,
        }
    }

    /// Returns the number of this [`Page`].
    #[must_use]
    pub fn current_page(&self) -> u32 {
        self.arguments.page()
    }

    /// Returns the number of items on a single page.
    #[must_use]
    pub fn per_page(&self) -> u32 {
        self.arguments.per_page()
    }

    /// Returns the total number of pages.
    #[must_use]
    pub fn pages(&self) -> u32 {
        let pages = self.total.div_ceil(u64::from(self.per_page()));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Returns the navigation [`Window`] around this [`Page`].
    #[must_use]
    pub fn window(&self) -> Window {
        Window::new(self.pages(), self.current_page())
    }
}

/// Bounded navigation around the current page.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Window {
    /// Number of the previous page, if any.
    pub previous: Option<u32>,

    /// Indicator whether some pages are hidden before [`Window::entries`].
    pub leading_ellipsis: bool,

    /// Visible page [`Entry`]s.
    pub entries: Vec<Entry>,

    /// Indicator whether some pages are hidden after [`Window::entries`].
    pub trailing_ellipsis: bool,

    /// Number of the next page, if any.
    pub next: Option<u32>,
}

impl Window {
    /// Number of pages shown on each side of the current one.
    pub const RADIUS: u32 = 1;

    /// Creates a new [`Window`] for the provided total number of `pages` and
    /// the `current` page.
    #[must_use]
    pub fn new(pages: u32, current: u32) -> Self {
        let start = current.saturating_sub(Self::RADIUS).max(1);
        let end = current.saturating_add(Self::RADIUS).min(pages);

        Self {
            previous: (current > 1).then(|| current - 1),
            leading_ellipsis: start > 1,
            entries: (start..=end)
                .map(|number| Entry {
                    number,
                    active: number == current,
                })
                .collect(),
            trailing_ellipsis: end < pages,
            next: (current < pages).then(|| current + 1),
        }
    }
}

/// Page link in a [`Window`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Entry {
    /// Number of the page.
    pub number: u32,

    /// Indicator whether this is the current page.
    pub active: bool,
}

#[cfg(test)]
mod spec {
    use super::{Arguments, Entry, Page, Window};

    #[test]
    fn window_invariants_hold_for_every_page() {
        for pages in 1..=30 {
            for current in 1..=pages {
                let window = Window::new(pages, current);

                assert_eq!(window.previous.is_some(), current > 1);
                assert_eq!(window.next.is_some(), current < pages);

                let active = window
                    .entries
                    .iter()
                    .filter(|e| e.active)
                    .collect::<Vec<_>>();
                assert_eq!(active.len(), 1, "pages={pages} current={current}");
                assert_eq!(active[0].number, current);

                let first = window.entries.first().unwrap().number;
                let last = window.entries.last().unwrap().number;
                assert_eq!(window.leading_ellipsis, first > 1);
                assert_eq!(window.trailing_ellipsis, last < pages);
                assert!(window.entries.len() <= 3);

                assert_eq!(window, Window::new(pages, current));
            }
        }
    }

    #[test]
    fn window_in_the_middle() {
        assert_eq!(
            Window::new(10, 5),
            Window {
                previous: Some(4),
                leading_ellipsis: true,
                entries: vec![
                    Entry {
                        number: 4,
                        active: false,
                    },
                    Entry {
                        number: 5,
                        active: true,
                    },
                    Entry {
                        number: 6,
                        active: false,
                    },
                ],
                trailing_ellipsis: true,
                next: Some(6),
            },
        );
    }

    #[test]
    fn window_of_a_single_page() {
        let window = Window::new(1, 1);
        assert_eq!(window.previous, None);
        assert_eq!(window.next, None);
        assert!(!window.leading_ellipsis);
        assert!(!window.trailing_ellipsis);
        assert_eq!(
            window.entries,
            vec![Entry {
                number: 1,
                active: true,
            }],
        );
    }

    #[test]
    fn window_without_pages_is_empty() {
        let window = Window::new(0, 1);
        assert_eq!(window.previous, None);
        assert_eq!(window.next, None);
        assert!(window.entries.is_empty());
        assert!(!window.leading_ellipsis);
        assert!(!window.trailing_ellipsis);
    }

    #[test]
    fn arguments_default_to_first_page() {
        assert_eq!(Arguments::new(None).page(), 1);
        assert_eq!(Arguments::new(Some(0)).page(), 1);
        assert_eq!(Arguments::new(Some(3)).page(), 3);
        assert_eq!(Arguments::default().per_page(), 20);
        assert_eq!(Arguments::new(Some(3)).offset(), 40);
    }

    #[test]
    fn pages_are_rounded_up() {
        let page = |total| Page::<()>::new(Arguments::default(), [], total);

        assert_eq!(page(0).pages(), 0);
        assert_eq!(page(1).pages(), 1);
        assert_eq!(page(20).pages(), 1);
        assert_eq!(page(21).pages(), 2);
        assert_eq!(page(400).pages(), 20);
    }

    #[test]
    fn out_of_range_page_is_not_clamped() {
        let page = Page::<u8>::new(Arguments::new(Some(7)), [], 41);

        assert_eq!(page.current_page(), 7);
        assert_eq!(page.pages(), 3);
        assert!(page.items.is_empty());
        assert_eq!(page.window().next, None);
        assert!(page.window().entries.is_empty());
    }
}
