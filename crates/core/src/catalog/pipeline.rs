use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::collation::collation_key;
use crate::domain::product::Product;
use crate::errors::DomainError;

/// Stock level below which a product counts as a bestseller.
pub const BESTSELLER_STOCK_THRESHOLD: u32 = 10;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterSelection {
    #[default]
    All,
    Discounts,
    InStock,
    Featured,
    Bestsellers,
}

impl FilterSelection {
    pub const ALL: [Self; 5] =
        [Self::All, Self::Discounts, Self::InStock, Self::Featured, Self::Bestsellers];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Discounts => "discounts",
            Self::InStock => "in-stock",
            Self::Featured => "featured",
            Self::Bestsellers => "bestsellers",
        }
    }

    pub fn matches(self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Discounts => product.on_discount(),
            Self::InStock => product.in_stock(),
            Self::Featured => product.is_featured(),
            Self::Bestsellers => product.stock < BESTSELLER_STOCK_THRESHOLD,
        }
    }
}

/// Fixed price buckets, compared against the post-discount price.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriceBucket {
    #[serde(rename = "under-100")]
    Under100,
    #[serde(rename = "100-500")]
    From100To500,
    #[serde(rename = "500-1000")]
    From500To1000,
    #[serde(rename = "over-1000")]
    Over1000,
}

impl PriceBucket {
    pub const ALL: [Self; 4] =
        [Self::Under100, Self::From100To500, Self::From500To1000, Self::Over1000];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Under100 => "under-100",
            Self::From100To500 => "100-500",
            Self::From500To1000 => "500-1000",
            Self::Over1000 => "over-1000",
        }
    }

    /// Lower bound is inclusive only for 100-500; upper bounds are inclusive
    /// except for under-100.
    pub fn contains(self, final_price: Decimal) -> bool {
        let hundred = Decimal::ONE_HUNDRED;
        let five_hundred = Decimal::from(500);
        let thousand = Decimal::ONE_THOUSAND;

        match self {
            Self::Under100 => final_price < hundred,
            Self::From100To500 => final_price >= hundred && final_price <= five_hundred,
            Self::From500To1000 => final_price > five_hundred && final_price <= thousand,
            Self::Over1000 => final_price > thousand,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortSelection {
    #[default]
    Relevance,
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
    Newest,
    Discount,
}

impl SortSelection {
    pub const ALL: [Self; 7] = [
        Self::Relevance,
        Self::PriceAsc,
        Self::PriceDesc,
        Self::NameAsc,
        Self::NameDesc,
        Self::Newest,
        Self::Discount,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
            Self::Newest => "newest",
            Self::Discount => "discount",
        }
    }

    /// Stable in every mode: equal keys keep their incoming order.
    pub fn apply(self, products: &mut [Product]) {
        match self {
            Self::Relevance => {}
            Self::PriceAsc => products.sort_by_cached_key(Product::final_price),
            Self::PriceDesc => {
                products.sort_by_cached_key(|product| Reverse(product.final_price()))
            }
            Self::NameAsc => products.sort_by_cached_key(|product| collation_key(&product.title)),
            Self::NameDesc => {
                products.sort_by_cached_key(|product| Reverse(collation_key(&product.title)))
            }
            // `None < Some(_)`, so a missing timestamp sorts as the oldest.
            Self::Newest => products.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            Self::Discount => products.sort_by_key(|product| Reverse(product.discount_pct())),
        }
    }
}

macro_rules! selection_text {
    ($ty:ty, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = DomainError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let wanted = value.trim().to_ascii_lowercase();
                Self::ALL.into_iter().find(|candidate| candidate.as_str() == wanted).ok_or_else(
                    || {
                        let expected: Vec<&str> =
                            Self::ALL.iter().map(|candidate| candidate.as_str()).collect();
                        DomainError::InvariantViolation(format!(
                            "unsupported {} `{}` (expected {})",
                            $what,
                            value.trim(),
                            expected.join("|")
                        ))
                    },
                )
            }
        }
    };
}

selection_text!(FilterSelection, "filter");
selection_text!(PriceBucket, "price range");
selection_text!(SortSelection, "sort");

/// The selections a product listing is currently showing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductQuery {
    pub filter: FilterSelection,
    pub price_range: Option<PriceBucket>,
    pub sort: SortSelection,
}

impl ProductQuery {
    /// Picking `all` clears the other filters as well.
    pub fn select_filter(&mut self, filter: FilterSelection) {
        self.filter = filter;
        if filter == FilterSelection::All {
            self.price_range = None;
        }
    }

    pub fn is_filtered(&self) -> bool {
        self.filter != FilterSelection::All || self.price_range.is_some()
    }

    pub fn run(&self, products: &[Product]) -> Vec<Product> {
        view(products, self.filter, self.price_range, self.sort)
    }
}

/// Filters, buckets and sorts a product list without touching the input.
pub fn view(
    products: &[Product],
    filter: FilterSelection,
    price_range: Option<PriceBucket>,
    sort: SortSelection,
) -> Vec<Product> {
    let mut selected: Vec<Product> = products
        .iter()
        .filter(|product| filter.matches(product))
        .filter(|product| price_range.map_or(true, |bucket| bucket.contains(product.final_price())))
        .cloned()
        .collect();

    sort.apply(&mut selected);
    selected
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::{view, FilterSelection, PriceBucket, ProductQuery, SortSelection};
    use crate::domain::product::{Product, ProductId};

    fn product(id: &str, title: &str, price: i64, discount: Option<i64>, stock: u32) -> Product {
        Product {
            id: ProductId(id.to_string()),
            title: title.to_string(),
            brand: None,
            category: "General".to_string(),
            price: Decimal::from(price),
            discount: discount.map(Decimal::from),
            stock,
            image: None,
            created_at: None,
            featured: None,
            rating: None,
        }
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|product| product.id.0.as_str()).collect()
    }

    fn shelf() -> Vec<Product> {
        let mut featured = product("e", "Queso Oaxaca", 120, None, 0);
        featured.featured = Some(true);
        vec![
            product("a", "Leche Entera", 30, Some(10), 25),
            product("b", "Pan Blanco", 45, None, 0),
            product("c", "Cafe Molido", 180, Some(20), 3),
            product("d", "Aceite de Oliva", 600, Some(0), 8),
            featured,
        ]
    }

    #[test]
    fn all_filter_with_relevance_is_identity() {
        let products = shelf();
        let result = view(&products, FilterSelection::All, None, SortSelection::Relevance);
        assert_eq!(result, products);
    }

    #[test]
    fn filter_predicates_keep_relative_order() {
        let products = shelf();
        let pick = |filter| ids(&view(&products, filter, None, SortSelection::Relevance))
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();

        assert_eq!(pick(FilterSelection::Discounts), ["a", "c"]);
        assert_eq!(pick(FilterSelection::InStock), ["a", "c", "d"]);
        assert_eq!(pick(FilterSelection::Featured), ["e"]);
        assert_eq!(pick(FilterSelection::Bestsellers), ["b", "c", "d", "e"]);
    }

    #[test]
    fn stock_and_discount_filters_commute() {
        let products = shelf();
        let stock_then_discount = view(
            &view(&products, FilterSelection::InStock, None, SortSelection::Relevance),
            FilterSelection::Discounts,
            None,
            SortSelection::Relevance,
        );
        let discount_then_stock = view(
            &view(&products, FilterSelection::Discounts, None, SortSelection::Relevance),
            FilterSelection::InStock,
            None,
            SortSelection::Relevance,
        );
        assert_eq!(stock_then_discount, discount_then_stock);
    }

    #[test]
    fn bucket_boundaries_use_final_price() {
        let at_500 = product("x", "Boundary 500", 500, Some(0), 1);
        assert!(PriceBucket::From100To500.contains(at_500.final_price()));
        assert!(!PriceBucket::From500To1000.contains(at_500.final_price()));

        // 1250 at 20% off is exactly 1000.00
        let at_1000 = product("y", "Boundary 1000", 1_250, Some(20), 1);
        assert_eq!(at_1000.final_price(), Decimal::ONE_THOUSAND);
        assert!(PriceBucket::From500To1000.contains(at_1000.final_price()));
        assert!(!PriceBucket::Over1000.contains(at_1000.final_price()));

        assert!(PriceBucket::From100To500.contains(Decimal::ONE_HUNDRED));
        assert!(!PriceBucket::Under100.contains(Decimal::ONE_HUNDRED));
        assert!(PriceBucket::Under100.contains(Decimal::new(9_999, 2)));
    }

    #[test]
    fn price_bucket_applies_after_filter() {
        let products = shelf();
        // Cafe Molido: 180 at 20% off = 144
        let result = view(
            &products,
            FilterSelection::Discounts,
            Some(PriceBucket::From100To500),
            SortSelection::Relevance,
        );
        assert_eq!(ids(&result), ["c"]);
    }

    #[test]
    fn price_descending_is_reverse_of_ascending_without_ties() {
        let products = shelf();
        let mut ascending = view(&products, FilterSelection::All, None, SortSelection::PriceAsc);
        let descending = view(&products, FilterSelection::All, None, SortSelection::PriceDesc);

        assert_eq!(ids(&ascending), ["a", "b", "e", "c", "d"]);
        ascending.reverse();
        assert_eq!(ascending, descending);
    }

    #[test]
    fn equal_sort_keys_keep_incoming_order() {
        let products = vec![
            product("first", "Same", 50, None, 1),
            product("second", "Cheaper", 20, None, 1),
            product("third", "Same", 50, None, 1),
        ];

        let asc = view(&products, FilterSelection::All, None, SortSelection::PriceAsc);
        assert_eq!(ids(&asc), ["second", "first", "third"]);

        let desc = view(&products, FilterSelection::All, None, SortSelection::PriceDesc);
        assert_eq!(ids(&desc), ["first", "third", "second"]);

        let by_name = view(&products, FilterSelection::All, None, SortSelection::NameDesc);
        assert_eq!(ids(&by_name), ["first", "third", "second"]);
    }

    #[test]
    fn name_sort_ignores_case_and_accents() {
        let products = vec![
            product("1", "pan", 1, None, 1),
            product("2", "Árbol de té", 1, None, 1),
            product("3", "Bebida", 1, None, 1),
        ];
        let asc = view(&products, FilterSelection::All, None, SortSelection::NameAsc);
        assert_eq!(ids(&asc), ["2", "3", "1"]);

        let desc = view(&products, FilterSelection::All, None, SortSelection::NameDesc);
        assert_eq!(ids(&desc), ["1", "3", "2"]);
    }

    #[test]
    fn newest_treats_missing_timestamp_as_oldest() {
        let mut older = product("older", "A", 1, None, 1);
        older.created_at = Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).single();
        let mut newer = product("newer", "B", 1, None, 1);
        newer.created_at = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).single();
        let undated = product("undated", "C", 1, None, 1);

        let result = view(
            &[undated, older, newer],
            FilterSelection::All,
            None,
            SortSelection::Newest,
        );
        assert_eq!(ids(&result), ["newer", "older", "undated"]);
    }

    #[test]
    fn discount_sort_treats_missing_discount_as_zero() {
        let products = vec![
            product("none", "A", 1, None, 1),
            product("ten", "B", 1, Some(10), 1),
            product("zero", "C", 1, Some(0), 1),
            product("forty", "D", 1, Some(40), 1),
        ];
        let result = view(&products, FilterSelection::All, None, SortSelection::Discount);
        assert_eq!(ids(&result), ["forty", "ten", "none", "zero"]);
    }

    #[test]
    fn view_is_idempotent_and_leaves_input_untouched() {
        let products = shelf();
        let before = products.clone();

        let first = view(
            &products,
            FilterSelection::InStock,
            Some(PriceBucket::Under100),
            SortSelection::NameAsc,
        );
        let second = view(
            &products,
            FilterSelection::InStock,
            Some(PriceBucket::Under100),
            SortSelection::NameAsc,
        );

        assert_eq!(first, second);
        assert_eq!(products, before);
    }

    #[test]
    fn empty_input_yields_empty_view() {
        for sort in SortSelection::ALL {
            assert!(view(&[], FilterSelection::Featured, Some(PriceBucket::Over1000), sort)
                .is_empty());
        }
    }

    #[test]
    fn selecting_all_resets_price_range() {
        let mut query = ProductQuery {
            filter: FilterSelection::Discounts,
            price_range: Some(PriceBucket::Over1000),
            sort: SortSelection::Newest,
        };
        assert!(query.is_filtered());

        query.select_filter(FilterSelection::All);
        assert_eq!(query.price_range, None);
        assert_eq!(query.sort, SortSelection::Newest);
        assert!(!query.is_filtered());
    }

    #[test]
    fn selections_parse_from_their_tokens() {
        for filter in FilterSelection::ALL {
            assert_eq!(filter.as_str().parse::<FilterSelection>(), Ok(filter));
        }
        for bucket in PriceBucket::ALL {
            assert_eq!(bucket.to_string().parse::<PriceBucket>(), Ok(bucket));
        }
        for sort in SortSelection::ALL {
            assert_eq!(sort.as_str().parse::<SortSelection>(), Ok(sort));
        }
        assert_eq!(" Price-Desc ".parse::<SortSelection>(), Ok(SortSelection::PriceDesc));

        let error = "cheapest".parse::<SortSelection>().expect_err("unknown sort");
        assert!(error.to_string().contains("price-asc"));
    }

    #[test]
    fn serde_uses_kebab_tokens() {
        let query: ProductQuery = serde_json::from_value(serde_json::json!({
            "filter": "in-stock",
            "price_range": "500-1000",
            "sort": "name-desc"
        }))
        .expect("query should deserialize");

        assert_eq!(query.filter, FilterSelection::InStock);
        assert_eq!(query.price_range, Some(PriceBucket::From500To1000));
        assert_eq!(query.sort, SortSelection::NameDesc);
    }
}
