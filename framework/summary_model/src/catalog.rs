use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Group assigned to catalog entries that do not declare one.
pub const DEFAULT_GROUP: &str = "Other Queries";

/// How a scenario walks through the result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaginationMode {
    /// Keyset pagination, carrying `last_id` and `sort_last_value` from each response.
    Cursor,
    /// Page number pagination, translated to skip/limit by the service.
    Offset,
}

impl PaginationMode {
    /// The label used in display names and reports, e.g. `Cursor Pagination`.
    pub fn label(&self) -> &'static str {
        match self {
            PaginationMode::Cursor => "Cursor Pagination",
            PaginationMode::Offset => "Offset Pagination",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl Display for SortOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    /// Substring match on title and description.
    Simple,
    /// Full text search against the precomputed search vector.
    Vector,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Simple => "simple",
            SearchType::Vector => "vector",
        }
    }
}

/// The query parameters of a scenario, excluding whatever the pagination mode adds per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryParams {
    pub sort_by_column: String,
    #[serde(default)]
    pub sort_order: SortOrder,
    pub page_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_more_than_equal: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_out_of_stock: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_type: Option<SearchType>,
}

impl QueryParams {
    pub fn sorted_by(column: &str, order: SortOrder, page_size: u32) -> Self {
        Self {
            sort_by_column: column.to_string(),
            sort_order: order,
            page_size,
            category: None,
            brand: None,
            min_price: None,
            max_price: None,
            rating_more_than_equal: None,
            review_count: None,
            show_out_of_stock: None,
            search_query_text: None,
            search_type: None,
        }
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn with_search(mut self, text: &str, search_type: SearchType) -> Self {
        self.search_query_text = Some(text.to_string());
        self.search_type = Some(search_type);
        self
    }

    /// Whether the query narrows the catalog by search text.
    pub fn is_search(&self) -> bool {
        self.search_query_text
            .as_deref()
            .is_some_and(|text| !text.trim().is_empty())
    }

    /// The filter parameters as they go on the wire, shared by the count and page endpoints.
    ///
    /// Pagination fields (`page_size`, `page_number`, `last_id`, `sort_last_value`) are not
    /// included.
    pub fn filter_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("sort_by_column", self.sort_by_column.clone()),
            ("sort_order", self.sort_order.to_string()),
        ];

        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(brand) = &self.brand {
            pairs.push(("brand", brand.clone()));
        }
        if let Some(min_price) = self.min_price {
            pairs.push(("min_price", min_price.to_string()));
        }
        if let Some(max_price) = self.max_price {
            pairs.push(("max_price", max_price.to_string()));
        }
        if let Some(rating) = self.rating_more_than_equal {
            pairs.push(("rating_more_than_equal", rating.to_string()));
        }
        if let Some(review_count) = self.review_count {
            pairs.push(("review_count", review_count.to_string()));
        }
        if let Some(show_out_of_stock) = self.show_out_of_stock {
            pairs.push(("show_out_of_stock", show_out_of_stock.to_string()));
        }
        if self.is_search() {
            if let Some(text) = &self.search_query_text {
                pairs.push(("search_query_text", text.clone()));
            }
            if let Some(search_type) = self.search_type {
                pairs.push(("search_type", search_type.as_str().to_string()));
            }
        }

        pairs
    }
}

/// One named, parameterized benchmark query under a single pagination mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub group: String,
    pub mode: PaginationMode,
    pub query: QueryParams,
}

impl Scenario {
    /// Display label, e.g. `Popular Products (Cursor Pagination)`.
    ///
    /// This is also the key the scenario's series is stored under.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.mode.label())
    }
}

/// The static list of scenarios for a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryCatalog {
    scenarios: Vec<Scenario>,
}

/// A catalog entry as written in a TOML catalog file. One entry expands into a scenario per mode.
#[derive(Debug, Deserialize)]
struct CatalogEntry {
    name: String,
    #[serde(default = "default_group")]
    group: String,
    #[serde(default = "default_modes")]
    modes: Vec<PaginationMode>,
    #[serde(flatten)]
    query: QueryParams,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    query: Vec<CatalogEntry>,
}

fn default_group() -> String {
    DEFAULT_GROUP.to_string()
}

fn default_modes() -> Vec<PaginationMode> {
    vec![PaginationMode::Cursor, PaginationMode::Offset]
}

impl QueryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the query once for each of the given modes.
    pub fn with_query(
        mut self,
        name: &str,
        group: &str,
        modes: &[PaginationMode],
        query: QueryParams,
    ) -> Self {
        for mode in modes {
            self.scenarios.push(Scenario {
                name: name.to_string(),
                group: group.to_string(),
                mode: *mode,
                query: query.clone(),
            });
        }
        self
    }

    /// Parse a catalog from TOML, made of `[[query]]` tables.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let file: CatalogFile = toml::from_str(content)?;

        let mut catalog = QueryCatalog::new();
        for entry in file.query {
            if entry.modes.is_empty() {
                anyhow::bail!("Query [{}] does not list any pagination modes", entry.name);
            }
            if entry.query.page_size == 0 {
                anyhow::bail!("Query [{}] has a page size of 0", entry.name);
            }
            catalog = catalog.with_query(&entry.name, &entry.group, &entry.modes, entry.query);
        }
        catalog.validate()?;

        Ok(catalog)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid catalog {}: {e}", path.display()))
    }

    /// Labels are storage keys, so they must be unique.
    pub fn validate(&self) -> anyhow::Result<()> {
        let mut seen = HashSet::new();
        for scenario in &self.scenarios {
            let label = scenario.label();
            if !seen.insert(label.clone()) {
                anyhow::bail!("Scenario [{label}] is defined more than once");
            }
        }
        Ok(())
    }

    /// Keep only the scenarios whose name or label is in `names`. An empty filter keeps everything.
    pub fn retain_named(mut self, names: &[String]) -> Self {
        if names.is_empty() {
            return self;
        }
        self.scenarios.retain(|scenario| {
            names
                .iter()
                .any(|name| *name == scenario.name || *name == scenario.label())
        });
        self
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

/// The catalog of product listing queries the benchmark was built around.
pub fn default_catalog() -> QueryCatalog {
    let both = [PaginationMode::Cursor, PaginationMode::Offset];

    QueryCatalog::new()
        .with_query(
            "Popular Products",
            "Global Sorting",
            &both,
            QueryParams::sorted_by("bought_in_last_month", SortOrder::Desc, 20),
        )
        .with_query(
            "Price Low to High",
            "Global Sorting",
            &both,
            QueryParams::sorted_by("price", SortOrder::Asc, 20),
        )
        .with_query(
            "Rating High to Low",
            "Global Sorting",
            &both,
            QueryParams::sorted_by("avg_rating", SortOrder::Desc, 20),
        )
        .with_query(
            "Recently Updated",
            "Global Sorting",
            &both,
            QueryParams::sorted_by("updated_at", SortOrder::Desc, 20),
        )
        .with_query(
            "Filter by Category",
            "Category Filtering",
            &both,
            QueryParams::sorted_by("price", SortOrder::Asc, 20).with_category("Graphics Cards"),
        )
        .with_query(
            "Simple Text Search",
            "Text Search",
            &both,
            QueryParams::sorted_by("price", SortOrder::Asc, 20)
                .with_search("wireless headphones", SearchType::Simple),
        )
        .with_query(
            "Vector Text Search",
            "Text Search",
            &both,
            QueryParams::sorted_by("avg_rating", SortOrder::Desc, 20)
                .with_search("wireless headphones", SearchType::Vector),
        )
}
