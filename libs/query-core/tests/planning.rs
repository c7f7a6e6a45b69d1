use query_core::{AdvancedQuery, ParamMap, SortDir, TranslatorConfig};
use serde_json::json;

fn plan(qs: &str) -> AdvancedQuery {
    AdvancedQuery::from_params(&ParamMap::from_query_str(qs), &TranslatorConfig::default())
}

#[test]
fn range_and_membership_filters() {
    let q = plan("averageCost[lte]=10000&careers[in]=Business&careers[in]=Other&location.state=MA");
    assert_eq!(
        serde_json::to_value(&q.filter).unwrap(),
        json!({
            "averageCost": {"$lte": "10000"},
            "careers": {"$in": ["Business", "Other"]},
            "location.state": "MA",
        })
    );
}

#[test]
fn reserved_values_never_filter_even_when_repeated() {
    let q = plan("select=name&select=slug&sort=name&sort=-createdAt&page=2&page=9&limit=1");
    assert!(q.filter.is_empty());
    assert_eq!(q.projection.include, vec!["name", "slug"]);
    assert_eq!(q.sort.keys()[0].field, "name");
    assert_eq!(q.sort.keys()[1].dir, SortDir::Desc);
    assert_eq!(q.window.page, 2);
    assert_eq!(q.window.limit, 1);
}

#[test]
fn window_for_second_page() {
    let q = plan("page=2&limit=10");
    let fq = q.find_query(None);
    assert_eq!(fq.skip, 10);
    assert_eq!(fq.limit, Some(10));
    assert!(fq.populate.is_none());

    let p = q.window.pagination(30);
    assert_eq!(
        serde_json::to_value(p).unwrap(),
        json!({"next": {"page": 3, "limit": 10}, "prev": {"page": 1, "limit": 10}})
    );
}

#[test]
fn planning_is_deterministic() {
    let a = plan("tuition[gt]=5&sort=-tuition&page=x");
    let b = plan("tuition[gt]=5&sort=-tuition&page=x");
    assert_eq!(a, b);
}
