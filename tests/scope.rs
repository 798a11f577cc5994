use docxide_expand::config::{FillMode, LoopConfig};
use docxide_expand::model::TableCell;
use docxide_expand::scope::{Scope, item_frame};
use docxide_expand::{CellRenderer, ExpandErrorKind, PlaceholderRenderer};
use serde_json::{Map, Value, json};

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[test]
fn child_frames_shadow_and_fall_through() {
    let env = object(json!({ "name": "outer", "currency": "NOK" }));
    let root = Scope::root(&env);
    let inner = root.child(item_frame(&json!({ "name": "inner" }), 0, true));

    assert_eq!(inner.get("name"), Some(&json!("inner")));
    assert_eq!(inner.get("currency"), Some(&json!("NOK")));
    assert_eq!(inner.get("index"), Some(&json!(1)));
    assert_eq!(inner.get("hasNext"), Some(&json!(true)));
    assert_eq!(inner.depth(), 2);
    assert_eq!(root.get("name"), Some(&json!("outer")));
    assert_eq!(root.get("index"), None);
}

#[test]
fn scalar_items_bind_as_item() {
    let env = Map::new();
    let root = Scope::root(&env);
    let inner = root.child(item_frame(&json!("bolt"), 4, false));
    assert_eq!(inner.get("item"), Some(&json!("bolt")));
    assert_eq!(inner.get("index"), Some(&json!(5)));
    assert_eq!(inner.get("hasNext"), Some(&json!(false)));
}

#[test]
fn dotted_paths_walk_objects_and_lists() {
    let env = object(json!({ "order": { "customer": { "name": "Kari" }, "lines": ["a", "b"] } }));
    let root = Scope::root(&env);
    assert_eq!(root.lookup("order.customer.name"), Some(&json!("Kari")));
    assert_eq!(root.lookup("order.lines.1"), Some(&json!("b")));
    assert_eq!(root.lookup("order.lines.7"), None);
    assert_eq!(root.lookup("order.customer.name.first"), None);
}

#[test]
fn presence_flags() {
    let env = object(json!({ "a": "", "b": 0, "c": null, "d": false }));
    let root = Scope::root(&env);
    assert!(root.is_set("a"));
    assert!(root.is_set("b"));
    assert!(!root.is_set("c"));
    assert!(!root.is_set("d"));
    assert!(!root.is_set("missing"));
}

#[test]
fn loop_config_defaults() {
    let env = Map::new();
    let config = LoopConfig::resolve("goods", &Scope::root(&env)).unwrap();
    assert_eq!(config.steady_rows, None);
    assert_eq!(config.first_rows, 0);
    assert_eq!(config.rows_per_item, 1);
    assert_eq!(config.fill, FillMode::Blank);
    assert_eq!(config.reduce, 0);
    assert_eq!(config.external_footer, 0);
    assert!(!config.bottom_border_from_page_two);
    assert!(!config.remove_next_line);
    assert!(!config.vmerge);
    assert!(!config.lenient);
    assert_eq!(config.blank_text, "below is blank");
    assert_eq!(config.sub_key, "children");
    assert_eq!(config.sub_tag(), "goods_sub");
}

#[test]
fn loop_config_reads_prefixed_keys() {
    let env = object(json!({
        "goods_number": "12",
        "goods_first_number": 8,
        "goods_row_number": 2,
        "goods_mode": 2,
        "goods_reduce": 1,
        "goods_fpdb": "yes",
        "goods_external_footer": 3,
        "goods_remove_next_line": true,
        "goods_vmerge": 1,
        "other_number": 99,
    }));
    let config = LoopConfig::resolve("goods", &Scope::root(&env)).unwrap();
    assert_eq!(config.steady_rows, Some(12));
    assert_eq!(config.first_rows, 8);
    assert_eq!(config.rows_per_item, 2);
    assert_eq!(config.fill, FillMode::Diagonal);
    assert_eq!(config.reduce, 1);
    assert_eq!(config.external_footer, 3);
    assert!(config.bottom_border_from_page_two);
    assert!(config.remove_next_line);
    assert!(config.vmerge);
}

#[test]
fn nofill_overrides_mode() {
    let env = object(json!({ "goods_mode": 3, "goods_nofill": true }));
    let config = LoopConfig::resolve("goods", &Scope::root(&env)).unwrap();
    assert_eq!(config.fill, FillMode::None);
}

#[test]
fn malformed_numbers_are_configuration_errors() {
    for bad in [json!(-1), json!(2.5), json!("ten"), json!([1])] {
        let mut env = Map::new();
        env.insert("goods_number".into(), bad);
        let err = LoopConfig::resolve("goods", &Scope::root(&env)).unwrap_err();
        assert_eq!(err.kind(), Some(ExpandErrorKind::Configuration));
    }
}

#[test]
fn placeholders_render_scope_values() {
    let env = object(json!({ "qty": 3, "price": 9.5, "ok": true, "note": null }));
    let root = Scope::root(&env);
    let mut cell = TableCell::with_text(72.0, "[qty] x [price] ok=[ok] [note][missing] [not a path]");
    let mut renderer = PlaceholderRenderer::default();
    renderer.render_cell(&mut cell, &root).unwrap();
    assert_eq!(cell.text(), "3 x 9.5 ok=true  [not a path]");
    assert_eq!(renderer.unresolved, 1);
}
