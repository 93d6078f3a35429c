use paging_bench_summary_model::QueryParams;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// The two read endpoints of the service under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Products,
    Counts,
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Products => f.write_str("GET /products"),
            Endpoint::Counts => f.write_str("GET /products/counts"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{endpoint} responded with HTTP {status}: {body}")]
    Status {
        endpoint: Endpoint,
        status: u16,
        body: String,
    },
    #[error("{endpoint} request failed: {message}")]
    Transport { endpoint: Endpoint, message: String },
    #[error("{endpoint} returned a body that is not valid JSON: {message}")]
    Decode { endpoint: Endpoint, message: String },
}

/// The last sort key value of a page, as returned by the service.
///
/// Depending on the sort column this is a number, a decimal rendered as text or a timestamp. The
/// walker never looks inside it, it only hands it back on the next request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SortValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl SortValue {
    pub fn to_query_value(&self) -> String {
        match self {
            SortValue::Integer(value) => value.to_string(),
            SortValue::Float(value) => value.to_string(),
            SortValue::Text(value) => value.clone(),
        }
    }
}

/// Sentinel for "no row seen yet".
pub const NO_LAST_ID: i64 = -1;

/// The keyset state carried from one response into the next request.
#[derive(Debug, Clone, PartialEq)]
pub struct Cursor {
    pub last_id: i64,
    pub sort_by_column: String,
    pub sort_order: String,
    pub sort_last_value: Option<SortValue>,
    /// The service's remaining-count signal from the last response
    pub remaining: i64,
}

impl Cursor {
    /// The state before the first request, seeded from the scenario's sort.
    pub fn initial(query: &QueryParams) -> Self {
        Self {
            last_id: NO_LAST_ID,
            sort_by_column: query.sort_by_column.clone(),
            sort_order: query.sort_order.to_string(),
            sort_last_value: None,
            remaining: 0,
        }
    }

    /// Take over whatever the service sent back.
    ///
    /// The service may normalize or default the sort, so the values it returns replace the ones
    /// that were requested. Fields missing from the response become empty.
    pub fn absorb(&mut self, response: &PageResponse) {
        self.last_id = response.last_id.unwrap_or(NO_LAST_ID);
        self.sort_by_column = response.sort_by_column.clone().unwrap_or_default();
        self.sort_order = response.sort_order.clone().unwrap_or_default();
        self.sort_last_value = response.sort_last_value.clone();
        self.remaining = response.remaining();
    }
}

/// Which page to ask for, in the vocabulary of the scenario's pagination mode.
#[derive(Debug, Clone, Copy)]
pub enum PagePosition<'a> {
    Offset { page_number: u64, cursor: &'a Cursor },
    Cursor(&'a Cursor),
}

/// Query string for a page request: the scenario's filters, the page size and exactly one
/// pagination mode's parameters.
///
/// The sort is always taken from the cursor so that the service's normalized sort is echoed back.
/// Empty sort fields are left out so the service applies its defaults.
pub fn page_query_pairs(
    query: &QueryParams,
    position: &PagePosition<'_>,
) -> Vec<(&'static str, String)> {
    let cursor = match position {
        PagePosition::Offset { cursor, .. } => *cursor,
        PagePosition::Cursor(cursor) => *cursor,
    };

    let mut pairs = query
        .filter_pairs()
        .into_iter()
        .filter(|(key, _)| *key != "sort_by_column" && *key != "sort_order")
        .collect::<Vec<_>>();
    if !cursor.sort_by_column.is_empty() {
        pairs.push(("sort_by_column", cursor.sort_by_column.clone()));
    }
    if !cursor.sort_order.is_empty() {
        pairs.push(("sort_order", cursor.sort_order.clone()));
    }
    pairs.push(("page_size", query.page_size.to_string()));

    match position {
        PagePosition::Offset { page_number, .. } => {
            pairs.push(("page_number", page_number.to_string()));
        }
        PagePosition::Cursor(cursor) => {
            pairs.push(("last_id", cursor.last_id.to_string()));
            if let Some(value) = &cursor.sort_last_value {
                pairs.push(("sort_last_value", value.to_query_value()));
            }
        }
    }

    pairs
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductRef {
    #[serde(default)]
    pub id: i64,
}

/// Body of a successful `GET /products`. Every field is optional so that a partial body can still
/// drive the walk.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageResponse {
    #[serde(default)]
    pub products: Option<Vec<ProductRef>>,
    #[serde(default)]
    pub last_id: Option<i64>,
    #[serde(default)]
    pub sort_by_column: Option<String>,
    #[serde(default)]
    pub sort_order: Option<String>,
    #[serde(default)]
    pub sort_last_value: Option<SortValue>,
    #[serde(default)]
    pub count: Option<i64>,
    /// Time from sending the request until the whole body had arrived, before decoding. Set by
    /// transports that measure it.
    #[serde(skip)]
    pub received_in: Option<Duration>,
}

impl PageResponse {
    pub fn product_ids(&self) -> Vec<i64> {
        self.products
            .iter()
            .flatten()
            .map(|product| product.id)
            .collect()
    }

    /// The remaining-count signal. A missing count reads as exhausted.
    pub fn remaining(&self) -> i64 {
        self.count.unwrap_or(0)
    }
}

/// Body of a successful `GET /products/counts`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CountResponse {
    #[serde(default)]
    pub count: Option<i64>,
}

/// The service under test, as seen by the walker.
///
/// Each call blocks until the response arrives. Non-2xx responses come back as [ApiError]; a
/// request cut short by the shutdown signal comes back as
/// [paging_bench_core::prelude::ShutdownSignalError].
pub trait ProductsApi {
    fn count(&self, query: &QueryParams) -> anyhow::Result<CountResponse>;

    fn page(&self, query: &QueryParams, position: &PagePosition<'_>)
        -> anyhow::Result<PageResponse>;
}

impl<A: ProductsApi + ?Sized> ProductsApi for &A {
    fn count(&self, query: &QueryParams) -> anyhow::Result<CountResponse> {
        (**self).count(query)
    }

    fn page(
        &self,
        query: &QueryParams,
        position: &PagePosition<'_>,
    ) -> anyhow::Result<PageResponse> {
        (**self).page(query, position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paging_bench_summary_model::SortOrder;
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_full_response() {
        let response: PageResponse = serde_json::from_str(
            r#"{
                "products": [{"id": 7, "title": "a"}, {"id": 9, "title": "b"}],
                "last_id": 9,
                "sort_by_column": "price",
                "sort_order": "asc",
                "sort_last_value": "19.990000",
                "count": 2
            }"#,
        )
        .unwrap();

        assert_eq!(response.product_ids(), vec![7, 9]);
        assert_eq!(
            response.sort_last_value,
            Some(SortValue::Text("19.990000".to_string()))
        );
        assert_eq!(response.remaining(), 2);
    }

    #[test]
    fn missing_fields_are_tolerated() {
        let response: PageResponse =
            serde_json::from_str(r#"{"products": null, "sort_last_value": 42}"#).unwrap();
        assert!(response.product_ids().is_empty());
        assert_eq!(response.remaining(), 0);
        assert_eq!(response.sort_last_value, Some(SortValue::Integer(42)));

        let mut cursor = Cursor::initial(&QueryParams::sorted_by("price", SortOrder::Desc, 20));
        cursor.absorb(&response);
        assert_eq!(cursor.last_id, NO_LAST_ID);
        assert_eq!(cursor.sort_by_column, "");
        assert_eq!(cursor.sort_order, "");
    }

    #[test]
    fn cursor_pairs_echo_returned_sort() {
        let query = QueryParams::sorted_by("price", SortOrder::Asc, 20).with_category("Books");
        let mut cursor = Cursor::initial(&query);
        cursor.absorb(&PageResponse {
            last_id: Some(55),
            sort_by_column: Some("price".to_string()),
            sort_order: Some("desc".to_string()),
            sort_last_value: Some(SortValue::Float(12.5)),
            count: Some(20),
            ..Default::default()
        });

        assert_eq!(
            page_query_pairs(&query, &PagePosition::Cursor(&cursor)),
            vec![
                ("category", "Books".to_string()),
                ("sort_by_column", "price".to_string()),
                ("sort_order", "desc".to_string()),
                ("page_size", "20".to_string()),
                ("last_id", "55".to_string()),
                ("sort_last_value", "12.5".to_string()),
            ]
        );
    }

    #[test]
    fn first_cursor_request_has_no_sort_value() {
        let query = QueryParams::sorted_by("updated_at", SortOrder::Desc, 20);
        let cursor = Cursor::initial(&query);
        let pairs = page_query_pairs(&query, &PagePosition::Cursor(&cursor));
        assert!(pairs.contains(&("last_id", "-1".to_string())));
        assert!(!pairs.iter().any(|(key, _)| *key == "sort_last_value"));
        assert!(!pairs.iter().any(|(key, _)| *key == "page_number"));
    }

    #[test]
    fn offset_pairs_carry_page_number_only() {
        let query = QueryParams::sorted_by("price", SortOrder::Asc, 50);
        let cursor = Cursor::initial(&query);
        let pairs = page_query_pairs(
            &query,
            &PagePosition::Offset {
                page_number: 11,
                cursor: &cursor,
            },
        );
        assert!(pairs.contains(&("page_number", "11".to_string())));
        assert!(pairs.contains(&("page_size", "50".to_string())));
        assert!(!pairs.iter().any(|(key, _)| *key == "last_id"));
    }
}
