//! Product query engine: category, availability and free-text filters
//! followed by a stable sort. Pure over borrowed input.

use std::cmp::Ordering;

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::models::{Product, ProductFilters};

mod relations;

pub use relations::{foreign_key_for, posts_by_user, related};

/// Sentinel category meaning "no category filter".
pub const ALL_CATEGORIES: &str = "all";

// ── Availability ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Availability {
    #[default]
    All,
    InStock,
    OnSale,
}

impl Availability {
    /// Unrecognized values fall back to `All`.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "in-stock" => Availability::InStock,
            "on-sale" => Availability::OnSale,
            _ => Availability::All,
        }
    }

    pub fn admits(self, product: &Product) -> bool {
        match self {
            Availability::All => true,
            Availability::InStock => product.in_stock,
            Availability::OnSale => product.is_on_sale(),
        }
    }
}

// ── Sort keys ─────────────────────────────────────────────────────────────────

pub type Comparator = fn(&Product, &Product) -> Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    PriceLow,
    PriceHigh,
    Rating,
    Newest,
    #[default]
    Name,
}

impl SortKey {
    /// Unrecognized values fall back to `Name`.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "price-low" => SortKey::PriceLow,
            "price-high" => SortKey::PriceHigh,
            "rating" => SortKey::Rating,
            "newest" => SortKey::Newest,
            _ => SortKey::Name,
        }
    }

    pub fn comparator(self) -> Comparator {
        match self {
            SortKey::PriceLow => by_price_ascending,
            SortKey::PriceHigh => by_price_descending,
            SortKey::Rating => by_rating_descending,
            SortKey::Newest => by_newest,
            SortKey::Name => by_name,
        }
    }
}

fn by_price_ascending(a: &Product, b: &Product) -> Ordering {
    a.price.total_cmp(&b.price)
}

fn by_price_descending(a: &Product, b: &Product) -> Ordering {
    b.price.total_cmp(&a.price)
}

fn by_rating_descending(a: &Product, b: &Product) -> Ordering {
    b.rating.total_cmp(&a.rating)
}

/// Latest first. Unparseable timestamps sort after every valid one.
fn by_newest(a: &Product, b: &Product) -> Ordering {
    b.created_at_timestamp().cmp(&a.created_at_timestamp())
}

/// Primary collation key: decomposed, diacritics dropped, lowercased.
fn base_letters(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Locale-style ordering: base letters first, then accents (unaccented
/// first), then case (lowercase first).
fn by_name(a: &Product, b: &Product) -> Ordering {
    base_letters(&a.name)
        .cmp(&base_letters(&b.name))
        .then_with(|| a.name.to_lowercase().nfd().cmp(b.name.to_lowercase().nfd()))
        .then_with(|| b.name.cmp(&a.name))
}

// ── Query ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub availability: Availability,
    pub search: Option<String>,
    pub sort_by: SortKey,
}

impl From<ProductFilters> for ProductQuery {
    fn from(filters: ProductFilters) -> Self {
        Self {
            category: filters.category,
            availability: filters
                .availability
                .as_deref()
                .map(Availability::parse)
                .unwrap_or_default(),
            search: filters.search,
            sort_by: filters
                .sort_by
                .as_deref()
                .map(SortKey::parse)
                .unwrap_or_default(),
        }
    }
}

impl ProductQuery {
    fn admits_category(&self, product: &Product) -> bool {
        match self.category.as_deref() {
            None | Some("") | Some(ALL_CATEGORIES) => true,
            Some(category) => product.category_id.to_string() == category,
        }
    }
}

/// Filters `products` by category, availability and search (in that order)
/// and returns the survivors as a new, stably sorted vector.
pub fn run(products: &[Product], query: &ProductQuery) -> Vec<Product> {
    let needle = query
        .search
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut result: Vec<Product> = products
        .iter()
        .filter(|p| query.admits_category(p))
        .filter(|p| query.availability.admits(p))
        .filter(|p| needle.as_deref().map_or(true, |n| p.matches_search(n)))
        .cloned()
        .collect();

    result.sort_by(query.sort_by.comparator());
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordId;
    use serde_json::json;

    #[allow(clippy::too_many_arguments)]
    fn product(
        id: i64,
        name: &str,
        price: f64,
        original_price: f64,
        in_stock: bool,
        rating: f64,
        category: &str,
        created_at: &str,
    ) -> Product {
        serde_json::from_value(json!({
            "id": id,
            "categoryId": category,
            "name": name,
            "price": price,
            "originalPrice": original_price,
            "inStock": in_stock,
            "rating": rating,
            "createdAt": created_at,
        }))
        .unwrap()
    }

    fn pair() -> Vec<Product> {
        vec![
            product(1, "Zeta", 50.0, 50.0, true, 3.0, "a", "2023-01-01"),
            product(2, "Alpha", 20.0, 40.0, false, 4.0, "a", "2023-06-01"),
        ]
    }

    fn catalog() -> Vec<Product> {
        let mut items = vec![
            product(1, "Widget Pro", 30.0, 30.0, true, 4.0, "tools", "2024-01-05"),
            product(2, "gadget", 12.0, 15.0, false, 3.5, "toys", "2024-02-10"),
            product(3, "Anvil", 30.0, 45.0, true, 4.8, "tools", "2023-11-20"),
            product(4, "Kite", 8.0, 8.0, true, 4.0, "toys", "2024-03-01"),
            product(5, "Mini widget", 5.0, 9.0, false, 2.0, "tools", "2022-07-14"),
        ];
        items[1].description = Some("A small WIDGET-like gadget".into());
        items[3].tags = Some(vec!["Outdoor".into(), "Wind".into()]);
        items
    }

    fn ids(products: &[Product]) -> Vec<RecordId> {
        products.iter().map(|p| p.id.clone()).collect()
    }

    fn query() -> ProductQuery {
        ProductQuery::default()
    }

    // ── Worked examples ────────────────────────────────────────────────────────

    #[test]
    fn on_sale_keeps_only_discounted() {
        let q = ProductQuery { availability: Availability::OnSale, ..query() };
        assert_eq!(ids(&run(&pair(), &q)), vec![RecordId::Int(2)]);
    }

    #[test]
    fn empty_query_sorts_by_name() {
        let names: Vec<String> = run(&pair(), &query()).into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Alpha", "Zeta"]);
    }

    #[test]
    fn newest_sorts_latest_first() {
        let q = ProductQuery { sort_by: SortKey::Newest, ..query() };
        assert_eq!(ids(&run(&pair(), &q)), vec![RecordId::Int(2), RecordId::Int(1)]);
    }

    #[test]
    fn search_matches_name_substring() {
        let q = ProductQuery { search: Some("zet".into()), ..query() };
        assert_eq!(ids(&run(&pair(), &q)), vec![RecordId::Int(1)]);
    }

    // ── Properties ─────────────────────────────────────────────────────────────

    #[test]
    fn result_is_subset_of_input() {
        let input = catalog();
        let queries = [
            query(),
            ProductQuery { category: Some("tools".into()), ..query() },
            ProductQuery { availability: Availability::InStock, sort_by: SortKey::Rating, ..query() },
            ProductQuery { search: Some("widget".into()), sort_by: SortKey::PriceHigh, ..query() },
        ];
        for q in &queries {
            let out = run(&input, q);
            assert!(out.len() <= input.len());
            for p in &out {
                assert!(input.iter().any(|i| i.id == p.id), "{:?} not in input", p.id);
            }
        }
    }

    #[test]
    fn running_twice_is_identical() {
        let input = catalog();
        let q = ProductQuery {
            search: Some("i".into()),
            sort_by: SortKey::PriceLow,
            ..query()
        };
        assert_eq!(run(&input, &q), run(&input, &q));
    }

    #[test]
    fn category_and_availability_intersect() {
        let input = catalog();
        let by_category = run(&input, &ProductQuery { category: Some("tools".into()), ..query() });
        let by_availability = run(&input, &ProductQuery { availability: Availability::OnSale, ..query() });
        let both = run(
            &input,
            &ProductQuery {
                category: Some("tools".into()),
                availability: Availability::OnSale,
                ..query()
            },
        );

        let expected: Vec<RecordId> = ids(&by_category)
            .into_iter()
            .filter(|id| by_availability.iter().any(|p| &p.id == id))
            .collect();
        assert_eq!(ids(&both), expected);
        assert_eq!(ids(&both), vec![RecordId::Int(3), RecordId::Int(5)]);
    }

    #[test]
    fn equal_keys_keep_prior_order() {
        let input = catalog();
        let q = ProductQuery { sort_by: SortKey::PriceHigh, ..query() };
        // Widget Pro (id 1) precedes Anvil (id 3) in the input; both cost 30.
        assert_eq!(
            ids(&run(&input, &q)),
            vec![
                RecordId::Int(1),
                RecordId::Int(3),
                RecordId::Int(2),
                RecordId::Int(4),
                RecordId::Int(5)
            ]
        );

        let q = ProductQuery { sort_by: SortKey::Rating, ..query() };
        let out = ids(&run(&input, &q));
        assert_eq!(&out[1..3], &[RecordId::Int(1), RecordId::Int(4)]);
    }

    #[test]
    fn search_is_case_insensitive() {
        let input = catalog();
        let upper = run(&input, &ProductQuery { search: Some("WIDGET".into()), ..query() });
        let lower = run(&input, &ProductQuery { search: Some("widget".into()), ..query() });
        assert_eq!(upper, lower);
        assert_eq!(
            ids(&upper),
            vec![RecordId::Int(2), RecordId::Int(5), RecordId::Int(1)]
        );
    }

    #[test]
    fn search_reaches_tags() {
        let q = ProductQuery { search: Some("wind".into()), ..query() };
        assert_eq!(ids(&run(&catalog(), &q)), vec![RecordId::Int(4)]);
    }

    #[test]
    fn empty_search_is_ignored() {
        let q = ProductQuery { search: Some(String::new()), ..query() };
        assert_eq!(run(&catalog(), &q).len(), 5);
    }

    #[test]
    fn category_all_and_integer_category_ids() {
        let all = ProductQuery { category: Some(ALL_CATEGORIES.into()), ..query() };
        assert_eq!(run(&catalog(), &all).len(), 5);

        let mut input = pair();
        input[0].category_id = RecordId::Int(3);
        let q = ProductQuery { category: Some("3".into()), ..query() };
        assert_eq!(ids(&run(&input, &q)), vec![RecordId::Int(1)]);
    }

    #[test]
    fn input_is_left_untouched() {
        let input = catalog();
        let before = input.clone();
        let _ = run(&input, &ProductQuery { sort_by: SortKey::PriceLow, ..query() });
        assert_eq!(input, before);
    }

    #[test]
    fn unparseable_timestamps_sort_last_for_newest() {
        let mut input = pair();
        input[1].created_at = "not a date".into();
        let q = ProductQuery { sort_by: SortKey::Newest, ..query() };
        assert_eq!(ids(&run(&input, &q)), vec![RecordId::Int(1), RecordId::Int(2)]);
    }

    #[test]
    fn name_sort_ignores_case() {
        let names: Vec<String> = run(&catalog(), &query()).into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Anvil", "gadget", "Kite", "Mini widget", "Widget Pro"]);
    }

    #[test]
    fn name_sort_folds_accents() {
        let input = vec![
            product(1, "Zebra", 1.0, 1.0, true, 1.0, "a", "2024-01-01"),
            product(2, "Éclair", 1.0, 1.0, true, 1.0, "a", "2024-01-01"),
            product(3, "apple", 1.0, 1.0, true, 1.0, "a", "2024-01-01"),
            product(4, "Eclair", 1.0, 1.0, true, 1.0, "a", "2024-01-01"),
            product(5, "éclair", 1.0, 1.0, true, 1.0, "a", "2024-01-01"),
        ];
        let names: Vec<String> = run(&input, &query()).into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["apple", "Eclair", "éclair", "Éclair", "Zebra"]);
    }

    #[test]
    fn name_sort_puts_lowercase_first_on_case_ties() {
        let input = vec![
            product(1, "Kite", 1.0, 1.0, true, 1.0, "a", "2024-01-01"),
            product(2, "kite", 1.0, 1.0, true, 1.0, "a", "2024-01-01"),
        ];
        assert_eq!(ids(&run(&input, &query())), vec![RecordId::Int(2), RecordId::Int(1)]);
    }

    // ── Parameter parsing ─────────────────────────────────────────────────────

    #[test]
    fn unrecognized_values_fall_back_to_defaults() {
        let q = ProductQuery::from(ProductFilters {
            availability: Some("discontinued".into()),
            sort_by: Some("popularity".into()),
            ..Default::default()
        });
        assert_eq!(q.availability, Availability::All);
        assert_eq!(q.sort_by, SortKey::Name);
    }

    #[test]
    fn filters_map_to_typed_query() {
        let q = ProductQuery::from(ProductFilters {
            category: Some("toys".into()),
            availability: Some("in-stock".into()),
            search: Some("kite".into()),
            sort_by: Some("price-high".into()),
        });
        assert_eq!(
            q,
            ProductQuery {
                category: Some("toys".into()),
                availability: Availability::InStock,
                search: Some("kite".into()),
                sort_by: SortKey::PriceHigh,
            }
        );
    }
}
