//! Results table: latest record per identifier, filtered, sorted, paged.

use consulta_core::{ConsultationContext, Record, RecordStatus};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Column to sort by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Consultation timestamp
    #[default]
    Date,
    /// Identifier digits
    Cpf,
    /// Holder name, case-insensitive; missing names sort as empty
    Name,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Oldest first, A to Z
    Asc,
    /// Newest first, Z to A
    #[default]
    Desc,
}

/// Filters and paging for the results table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsQuery {
    /// Identifier substring or case-insensitive name substring
    pub search: Option<String>,
    /// Only records with this status
    pub status: Option<RecordStatus>,
    /// Only records from this context
    pub context: Option<ConsultationContext>,
    /// Sort column
    pub sort: SortKey,
    /// Sort direction
    pub order: SortOrder,
    /// 1-based page number; out-of-range values clamp
    pub page: usize,
    /// Rows per page
    pub page_size: usize,
}

impl Default for ResultsQuery {
    fn default() -> Self {
        Self {
            search: None,
            status: None,
            context: None,
            sort: SortKey::default(),
            order: SortOrder::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Entry of the page selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    /// A selectable page number
    Page(usize),
    /// A gap between page numbers
    Gap,
}

/// One page of the results table.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsPage<'a> {
    /// Rows on this page
    pub rows: Vec<&'a Record>,
    /// Rows matching the filters across all pages
    pub total: usize,
    /// Page actually shown
    pub page: usize,
    /// Number of pages (at least 1)
    pub total_pages: usize,
    /// Page selector: first, last, current and its neighbours
    pub window: Vec<PageItem>,
}

/// Keep only the most recent record of each identifier, in first-seen order.
#[must_use]
pub fn latest_per_identifier<'a>(records: impl IntoIterator<Item = &'a Record>) -> Vec<&'a Record> {
    let mut latest: Vec<&Record> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        match index.get(record.identifier.as_str()) {
            Some(&i) => {
                if record.consultation_timestamp > latest[i].consultation_timestamp {
                    latest[i] = record;
                }
            }
            None => {
                index.insert(record.identifier.as_str(), latest.len());
                latest.push(record);
            }
        }
    }

    latest
}

/// Build the requested page of the results table.
#[must_use]
pub fn query<'a>(records: &'a [Record], query: &ResultsQuery) -> ResultsPage<'a> {
    let in_context = records
        .iter()
        .filter(|r| query.context.map_or(true, |c| r.consultation_context == c));

    let mut rows: Vec<&Record> = latest_per_identifier(in_context)
        .into_iter()
        .filter(|r| matches_search(r, query.search.as_deref()))
        .filter(|r| query.status.map_or(true, |s| r.status == s))
        .collect();

    rows.sort_by(|a, b| {
        let ordering = compare(a, b, query.sort);
        match query.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });

    let page_size = query.page_size.max(1);
    let total = rows.len();
    let total_pages = total.div_ceil(page_size).max(1);
    let page = query.page.clamp(1, total_pages);

    let rows = rows
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();

    ResultsPage {
        rows,
        total,
        page,
        total_pages,
        window: page_window(page, total_pages),
    }
}

/// Page selector for `current` out of `total_pages`.
///
/// Shows the first and last pages plus the neighbours of the current one; a
/// gap marks each elided run.
#[must_use]
pub fn page_window(current: usize, total_pages: usize) -> Vec<PageItem> {
    let mut items = Vec::new();
    for page in 1..=total_pages {
        let near = page + 1 >= current && page <= current + 1;
        if page == 1 || page == total_pages || near {
            items.push(PageItem::Page(page));
        } else if (page + 2 == current && page > 1) || (page == current + 2 && page < total_pages) {
            items.push(PageItem::Gap);
        }
    }
    items
}

fn matches_search(record: &Record, search: Option<&str>) -> bool {
    let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) else {
        return true;
    };
    if record.identifier.as_str().contains(term) {
        return true;
    }
    let term = term.to_lowercase();
    record
        .name
        .as_deref()
        .is_some_and(|name| name.to_lowercase().contains(&term))
}

fn compare(a: &Record, b: &Record, key: SortKey) -> Ordering {
    match key {
        SortKey::Date => a.consultation_timestamp.cmp(&b.consultation_timestamp),
        SortKey::Cpf => a.identifier.cmp(&b.identifier),
        SortKey::Name => {
            let name = |r: &Record| r.name.as_deref().unwrap_or_default().to_lowercase();
            name(a).cmp(&name(b))
        }
    }
}
