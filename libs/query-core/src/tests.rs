#[cfg(test)]
#[allow(clippy::module_inception)]
mod tests {
    use serde_json::json;

    use crate::{
        parse_int_prefix, rewrite_operators, AdvancedQuery, Document, PageWindow, ParamMap,
        ParamValue, Projection, RelationSpec, ResultEnvelope, SortDir, SortKey, SortSpec,
        TranslatorConfig,
    };

    fn cfg() -> TranslatorConfig {
        TranslatorConfig::default()
    }

    #[test]
    fn test_parse_int_prefix() {
        assert_eq!(parse_int_prefix("3"), Some(3));
        assert_eq!(parse_int_prefix(" 12abc"), Some(12));
        assert_eq!(parse_int_prefix("+7"), Some(7));
        assert_eq!(parse_int_prefix("-4"), Some(-4));
        assert_eq!(parse_int_prefix("2.9"), Some(2));
        assert_eq!(parse_int_prefix("abc"), None);
        assert_eq!(parse_int_prefix(""), None);
        assert_eq!(parse_int_prefix("-"), None);
        assert_eq!(parse_int_prefix("99999999999999999999999"), Some(i64::MAX));
    }

    #[test]
    fn test_page_window_defaults() {
        let w = PageWindow::from_params(None, None, &cfg());
        assert_eq!(w, PageWindow { page: 1, limit: 25 });
        assert_eq!(w.start_index(), 0);
        assert_eq!(w.end_index(), 25);
    }

    #[test]
    fn test_page_window_bad_input_falls_back() {
        let w = PageWindow::from_params(Some("0"), Some("-5"), &cfg());
        assert_eq!(w, PageWindow { page: 1, limit: 25 });

        let w = PageWindow::from_params(Some("abc"), Some("ten"), &cfg());
        assert_eq!(w, PageWindow { page: 1, limit: 25 });

        let w = PageWindow::from_params(Some("3x"), Some("10 per page"), &cfg());
        assert_eq!(w, PageWindow { page: 3, limit: 10 });
    }

    #[test]
    fn test_page_window_clamps_limit() {
        let w = PageWindow::from_params(None, Some("5000"), &cfg());
        assert_eq!(w.limit, 1000);

        let small = TranslatorConfig {
            max_limit: 50,
            ..cfg()
        };
        let w = PageWindow::from_params(None, Some("51"), &small);
        assert_eq!(w.limit, 50);
    }

    #[test]
    fn test_page_window_huge_page_saturates() {
        let w = PageWindow::from_params(Some("99999999999999999999"), Some("10"), &cfg());
        assert_eq!(w.start_index(), u64::MAX);
        assert!(w.pagination(100).next.is_none());
    }

    #[test]
    fn test_pagination_links() {
        let w = PageWindow { page: 2, limit: 10 };
        let p = w.pagination(30);
        assert_eq!(p.next.map(|l| (l.page, l.limit)), Some((3, 10)));
        assert_eq!(p.prev.map(|l| (l.page, l.limit)), Some((1, 10)));

        let p = PageWindow { page: 3, limit: 10 }.pagination(30);
        assert!(p.next.is_none());
        assert!(p.prev.is_some());

        let p = PageWindow { page: 1, limit: 25 }.pagination(5);
        assert!(p.next.is_none());
        assert!(p.prev.is_none());
    }

    #[test]
    fn test_envelope_serializes_without_absent_links() {
        let docs: Vec<Document> = vec![];
        let env = ResultEnvelope::assemble(docs, &PageWindow { page: 1, limit: 25 }, 0);
        let v = serde_json::to_value(&env).unwrap();
        assert_eq!(
            v,
            json!({"success": true, "count": 0, "pagination": {}, "data": []})
        );
    }

    #[test]
    fn test_envelope_map_data_keeps_pagination() {
        let env = ResultEnvelope::assemble(vec![1, 2], &PageWindow { page: 2, limit: 2 }, 10);
        let mapped = env.map_data(|n| n * 10);
        assert_eq!(mapped.data, vec![10, 20]);
        assert_eq!(mapped.count, 2);
        assert!(mapped.pagination.next.is_some());
        assert!(mapped.pagination.prev.is_some());
    }

    #[test]
    fn test_sort_spec_parse() {
        let s = SortSpec::parse("-createdAt,name");
        assert_eq!(
            s.keys(),
            &[SortKey::desc("createdAt"), SortKey::asc("name")]
        );
        assert_eq!(s.to_signed_tokens(), "-createdAt,+name");

        let s = SortSpec::parse(" name  -averageCost,,name");
        assert_eq!(s.len(), 2);
        assert_eq!(s.keys()[1].dir, SortDir::Desc);

        assert!(SortSpec::parse(",,-").is_empty());
    }

    #[test]
    fn test_sort_spec_then_skips_existing() {
        let s = SortSpec::parse("name").then("name", SortDir::Desc).then("_id", SortDir::Asc);
        assert_eq!(s.to_string(), "+name,+_id");
    }

    #[test]
    fn test_projection_parse() {
        let p = Projection::parse("name,description");
        assert_eq!(p.include, vec!["name", "description"]);
        assert!(p.exclude.is_empty());

        let p = Projection::parse("name description name");
        assert_eq!(p.include, vec!["name", "description"]);

        let p = Projection::parse("-photo,-email");
        assert_eq!(p.exclude, vec!["photo", "email"]);
        assert!(!p.is_mixed());

        assert!(Projection::parse("name,-photo").is_mixed());
        assert!(Projection::parse(" , ").is_empty());
    }

    #[test]
    fn test_rewrite_operators_nested_keys_only() {
        let mut tuition = std::collections::BTreeMap::new();
        tuition.insert("gte".to_string(), ParamValue::from("5000"));
        tuition.insert("lt".to_string(), ParamValue::from("10000"));

        let draft = ParamMap::new()
            .with("tuition", ParamValue::Map(tuition))
            .with("name", "gte")
            .with("in", "x");

        let filter = rewrite_operators(draft);
        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({
                "tuition": {"$gte": "5000", "$lt": "10000"},
                "name": "gte",
                "in": "x",
            })
        );
    }

    #[test]
    fn test_rewrite_operators_deep_and_unknown() {
        let draft = ParamMap::from_query_str("a[b][in][]=x&a[b][in][]=y&c[regex]=z");
        let filter = rewrite_operators(draft);
        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({
                "a": {"b": {"$in": ["x", "y"]}},
                "c": {"regex": "z"},
            })
        );
    }

    #[test]
    fn test_query_string_shapes() {
        let p = ParamMap::from_query_str(
            "careers[in]=Business&careers[in]=UI%2FUX&housing=true&tags[]=a&name=Dev+Works",
        );
        assert_eq!(
            serde_json::to_value(&p).unwrap(),
            json!({
                "careers": {"in": ["Business", "UI/UX"]},
                "housing": "true",
                "tags": ["a"],
                "name": "Dev Works",
            })
        );
    }

    #[test]
    fn test_query_string_conflicts_keep_first_shape() {
        let p = ParamMap::from_query_str("a[b]=1&a=2&[x]=3&=4");
        assert_eq!(
            serde_json::to_value(&p).unwrap(),
            json!({"a": {"b": "1"}, "[x]": "3"})
        );
    }

    #[test]
    fn test_advanced_query_strips_reserved_keys() {
        let params = ParamMap::from_query_str(
            "select=name,description&sort=-averageCost&page=2&limit=10&housing=true",
        );
        let c = cfg();
        let q = AdvancedQuery::from_params(&params, &c);

        for key in c.params.reserved() {
            assert!(q.filter.get(key).is_none(), "{key} leaked into filter");
        }
        assert_eq!(q.filter.get("housing"), Some(&json!("true")));
        assert_eq!(q.projection.include, vec!["name", "description"]);
        assert_eq!(q.sort.to_signed_tokens(), "-averageCost");
        assert_eq!(q.window, PageWindow { page: 2, limit: 10 });
    }

    #[test]
    fn test_advanced_query_default_sort() {
        let q = AdvancedQuery::from_params(&ParamMap::new(), &cfg());
        assert_eq!(q.sort.to_signed_tokens(), "-createdAt,-name");
        assert!(q.filter.is_empty());
        assert!(q.projection.is_empty());

        let q = AdvancedQuery::from_params(
            &ParamMap::new().with("sort", ","),
            &cfg().with_default_sort("title"),
        );
        assert_eq!(q.sort.to_signed_tokens(), "+title");
    }

    #[test]
    fn test_advanced_query_renamed_params() {
        let mut c = cfg();
        c.params.limit = "per_page".into();
        let params = ParamMap::new().with("per_page", "5").with("limit", "7");
        let q = AdvancedQuery::from_params(&params, &c);
        assert_eq!(q.window.limit, 5);
        assert_eq!(q.filter.get("limit"), Some(&json!("7")));
    }

    #[test]
    fn test_find_query_builder() {
        let params = ParamMap::from_query_str("page=3&limit=4");
        let q = AdvancedQuery::from_params(&params, &cfg());
        let fq = q.find_query(Some(RelationSpec::select("bootcamp", "name description")));
        assert_eq!(fq.skip, 8);
        assert_eq!(fq.limit, Some(4));
        match fq.populate {
            Some(RelationSpec::Select { ref path, ref select }) => {
                assert_eq!(path, "bootcamp");
                assert_eq!(select.include, vec!["name", "description"]);
            }
            other => panic!("unexpected populate: {other:?}"),
        }
    }

    #[test]
    fn test_translator_config_from_yaml_like_json() {
        let c: TranslatorConfig =
            serde_json::from_value(json!({"default_limit": 10, "params": {"page": "p"}})).unwrap();
        assert_eq!(c.default_limit, 10);
        assert_eq!(c.max_limit, 1000);
        assert_eq!(c.params.page, "p");
        assert_eq!(c.params.select, "select");

        let bad = serde_json::from_value::<TranslatorConfig>(json!({"pagesize": 10}));
        assert!(bad.is_err());
    }
}
