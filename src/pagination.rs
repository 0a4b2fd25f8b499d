// Fixed-size page slicing for every post listing

use serde::Serialize;

/// Position of one page inside a result set of `count` items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub number: i64,
    pub num_pages: i64,
    pub count: i64,
    pub per_page: i64,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page_number: Option<i64>,
    pub previous_page_number: Option<i64>,
}

impl PageMeta {
    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

/// Page object handed to the renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub object_list: Vec<T>,
    #[serde(flatten)]
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.object_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.object_list.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    per_page: i64,
}

impl Paginator {
    pub fn new(per_page: usize) -> Self {
        Self {
            per_page: per_page.max(1) as i64,
        }
    }

    pub fn per_page(&self) -> i64 {
        self.per_page
    }

    /// Resolve the requested page against `count` items. Requests below the
    /// first page land on page 1, requests past the end land on the last page.
    /// An empty result set still has one (empty) page.
    pub fn bounds(&self, count: i64, requested: i64) -> PageMeta {
        let count = count.max(0);
        let num_pages = ((count + self.per_page - 1) / self.per_page).max(1);
        let number = requested.clamp(1, num_pages);

        PageMeta {
            number,
            num_pages,
            count,
            per_page: self.per_page,
            has_next: number < num_pages,
            has_previous: number > 1,
            next_page_number: (number < num_pages).then_some(number + 1),
            previous_page_number: (number > 1).then_some(number - 1),
        }
    }

    pub fn paginate<T: Clone>(&self, items: &[T], requested: i64) -> Page<T> {
        let meta = self.bounds(items.len() as i64, requested);
        let start = (meta.offset() as usize).min(items.len());
        let end = (start + meta.limit() as usize).min(items.len());
        Page {
            object_list: items[start..end].to_vec(),
            meta,
        }
    }
}

/// Interpret the raw `page` query parameter; anything that is not an integer
/// means the first page.
pub fn parse_page_number(raw: Option<&str>) -> i64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .unwrap_or(1)
}

/// Page number from a raw query string. A repeated `page` parameter takes
/// its last value.
pub fn page_from_query(query: Option<&str>) -> i64 {
    let raw = query.and_then(|query| {
        query
            .split('&')
            .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
            .filter(|(name, _)| *name == "page")
            .last()
            .map(|(_, value)| value.replace('+', " "))
    });

    let decoded = raw.as_deref().and_then(|value| urlencoding::decode(value).ok());
    parse_page_number(decoded.as_deref())
}
