// Property-based tests for the filter/sort/paginate pipeline.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use proptest::prelude::*;
use tabview_engine::*;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

const STATUSES: [&str; 4] = ["Active", "Inactive", "VIP", "New"];

fn view_config(page_size: usize) -> FilterConfig {
    FilterConfig::new()
        .search_fields(["name", "city"])
        .status_field("status")
        .additional_filter(AdditionalFilter::new("orders", "orders").with_matcher(Matcher::Buckets(vec![
            Bucket::new("high", Some(20.0), None),
            Bucket::new("low", None, Some(20.0)),
        ])))
        .column_filter(ColumnFilterSpec::text("name"))
        .column_filter(ColumnFilterSpec::dual("status", STATUSES))
        .page_size(page_size)
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Arbitrary record: name, optional city, status, order count.
fn arb_record() -> impl Strategy<Value = Record> {
    (
        r"[A-Za-z]{1,8}",
        prop::option::of(r"[a-z]{3,6}"),
        prop::sample::select(STATUSES.to_vec()),
        0..40i64,
    )
        .prop_map(|(name, city, status, orders)| {
            let mut record = Record::new().with("name", name).with("status", status).with("orders", orders);
            if let Some(city) = city {
                record.insert("city", city);
            }
            record
        })
}

fn arb_records() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(arb_record(), 0..60)
}

/// A set of control values; each constraint may be unset.
#[derive(Debug, Clone)]
struct Constraints {
    search: Option<String>,
    status: Option<String>,
    orders: Option<String>,
    name: Option<String>,
    dual_status: Option<String>,
}

fn arb_constraints() -> impl Strategy<Value = Constraints> {
    (
        prop::option::of(r"[a-z]{1,2}"),
        prop::option::of(prop::sample::select(STATUSES.to_vec()).prop_map(String::from)),
        prop::option::of(prop::sample::select(vec!["high", "low"]).prop_map(String::from)),
        prop::option::of(r"[a-z]{1,2}"),
        prop::option::of(prop_oneof![
            prop::sample::select(STATUSES.to_vec()).prop_map(String::from),
            r"[a-z]{1,3}",
        ]),
    )
        .prop_map(|(search, status, orders, name, dual_status)| Constraints {
            search,
            status,
            orders,
            name,
            dual_status,
        })
}

fn apply(engine: &mut TableFilterEngine, c: &Constraints) {
    if let Some(v) = &c.search {
        engine.set_search(v.as_str());
    }
    if let Some(v) = &c.status {
        engine.set_status(v.as_str());
    }
    if let Some(v) = &c.orders {
        engine.set_additional_filter("orders", v.as_str());
    }
    if let Some(v) = &c.name {
        engine.set_column_filter("name", v);
    }
    if let Some(v) = &c.dual_status {
        engine.set_column_filter("status", v);
    }
}

/// Keep a subset of `c`'s constraints, selected by `mask`
fn weaken(c: &Constraints, mask: [bool; 5]) -> Constraints {
    Constraints {
        search: c.search.clone().filter(|_| mask[0]),
        status: c.status.clone().filter(|_| mask[1]),
        orders: c.orders.clone().filter(|_| mask[2]),
        name: c.name.clone().filter(|_| mask[3]),
        dual_status: c.dual_status.clone().filter(|_| mask[4]),
    }
}

fn engine_for(records: Vec<Record>, page_size: usize) -> TableFilterEngine {
    TableFilterEngine::new(records, view_config(page_size), ViewHooks::new()).unwrap()
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn reapply_is_idempotent(records in arb_records(), c in arb_constraints()) {
        let mut engine = engine_for(records, 10);
        apply(&mut engine, &c);
        let first = engine.filtered_indices().to_vec();
        engine.apply_filters();
        prop_assert_eq!(engine.filtered_indices(), &first[..]);
    }

    #[test]
    fn adding_constraints_only_narrows(
        records in arb_records(),
        c in arb_constraints(),
        mask in prop::array::uniform5(any::<bool>()),
    ) {
        let mut strong = engine_for(records.clone(), 10);
        apply(&mut strong, &c);
        let mut weak = engine_for(records, 10);
        apply(&mut weak, &weaken(&c, mask));

        let weak_rows = weak.filtered_indices();
        for row in strong.filtered_indices() {
            prop_assert!(weak_rows.contains(row), "row {} visible under stronger filter only", row);
        }
    }

    #[test]
    fn filtered_rows_are_ordered_subset(records in arb_records(), c in arb_constraints()) {
        let n = records.len();
        let mut engine = engine_for(records, 10);
        apply(&mut engine, &c);
        let rows = engine.filtered_indices();
        prop_assert!(rows.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(rows.iter().all(|&r| r < n));
    }

    #[test]
    fn pages_concatenate_to_filtered(
        records in arb_records(),
        c in arb_constraints(),
        page_size in 1usize..12,
        sort_first in any::<bool>(),
    ) {
        let mut engine = engine_for(records, page_size);
        apply(&mut engine, &c);
        if sort_first {
            engine.sort_data("orders", None);
        }

        let expected: Vec<Record> = engine.filtered_data().into_iter().cloned().collect();
        let mut collected: Vec<Record> = Vec::new();
        for page in 1..=engine.total_pages() {
            prop_assert!(engine.change_page(page));
            let data = engine.current_page_data();
            prop_assert!(!data.is_empty() && data.len() <= page_size);
            collected.extend(data.into_iter().cloned());
        }
        prop_assert_eq!(collected, expected);
    }

    #[test]
    fn sort_toggle_reverses_distinct_keys(orders in prop::collection::hash_set(0..1000i64, 0..40)) {
        let records: Vec<Record> = orders
            .into_iter()
            .map(|n| Record::new().with("name", "x").with("price", n))
            .collect();
        let mut engine = engine_for(records, 10);

        engine.sort_data("price", None);
        let asc = engine.filtered_indices().to_vec();
        engine.sort_data("price", None);
        let mut desc = engine.filtered_indices().to_vec();
        desc.reverse();
        prop_assert_eq!(asc, desc);
    }

    #[test]
    fn reset_restores_original_view(records in arb_records(), c in arb_constraints(), page_size in 1usize..8) {
        let n = records.len();
        let mut engine = engine_for(records, page_size);
        apply(&mut engine, &c);
        engine.sort_data("name", None);
        engine.change_page(2);

        engine.reset_filters();
        prop_assert_eq!(engine.filtered_indices(), &(0..n).collect::<Vec<_>>()[..]);
        prop_assert_eq!(engine.current_page(), 1);
    }

    #[test]
    fn invalid_pages_leave_state_unchanged(records in arb_records(), page in 0usize..20) {
        let mut engine = engine_for(records, 5);
        let total = engine.total_pages();
        let before = engine.current_page();
        let changed = engine.change_page(page);
        if page == 0 || page > total {
            prop_assert!(!changed);
            prop_assert_eq!(engine.current_page(), before);
        } else {
            prop_assert!(changed);
            prop_assert_eq!(engine.current_page(), page);
        }
    }
}
