use serde_json::json;

use super::*;
use crate::serialize::serialize_list;

fn encoded(text: &str) -> FieldInput {
    FieldInput::Encoded(text.to_owned())
}

fn large_size() -> SizeEntry {
    SizeEntry::new("Large", "100/ctn", &["1", "2"])
}

// -----------------------------------------------------------------------
// sizes
// -----------------------------------------------------------------------

#[test]
fn sizes_round_trip_through_serializer() {
    let sizes = vec![
        large_size(),
        SizeEntry::new("2.6", "12/box", &["r1", "r3"]),
        SizeEntry::new("Small", "200/ctn", &[]),
    ];
    let text = serialize_list(&sizes);
    assert_eq!(normalize_sizes(&encoded(&text)), sizes);
}

#[test]
fn sizes_serialization_is_idempotent() {
    let messy = encoded(r#"  [{"size":"10","packing":"50/ctn","gauge":["1","1",2]}]  "#);
    let first = serialize_list(&normalize_sizes(&messy));
    let second = serialize_list(&normalize_sizes(&encoded(&first)));
    assert_eq!(first, second);
}

#[test]
fn sizes_double_encoded_matches_plain() {
    let plain = normalize_sizes(&encoded(r#"[{"size":"10"}]"#));
    assert_eq!(plain.len(), 1);
    assert_eq!(plain[0].size, "10");

    // Escaped form: a JSON array holding one JSON-encoded string.
    let escaped = normalize_sizes(&encoded(r#"["[{\"size\":\"10\"}]"]"#));
    assert_eq!(escaped, plain);

    // Unescaped legacy form that is not valid JSON on its own.
    let legacy = normalize_sizes(&encoded(r#"["[{"size":"10"}]"]"#));
    assert_eq!(legacy, plain);
}

#[test]
fn sizes_json_string_literal_is_unwrapped() {
    let stored = serde_json::to_string(&serialize_list(&[large_size()])).expect("encode");
    assert!(stored.starts_with('"'));
    assert_eq!(normalize_sizes(&encoded(&stored)), vec![large_size()]);
}

#[test]
fn sizes_stray_backslashes_are_stripped() {
    let stored = r#"[{\"size\":\"Large\",\"packing\":\"100/ctn\",\"gauge\":[\"1\",\"2\"]}]"#;
    assert_eq!(normalize_sizes(&encoded(stored)), vec![large_size()]);
}

#[test]
fn sizes_unwrap_is_bounded() {
    let mut text = serialize_list(&[large_size()]);
    for _ in 0..=MAX_UNWRAP_DEPTH {
        text = serde_json::to_string(&vec![text]).expect("wrap");
    }
    assert!(normalize_sizes(&encoded(&text)).is_empty());
}

#[test]
fn sizes_not_json_yields_empty() {
    assert!(normalize_sizes(&encoded("not json")).is_empty());
    assert!(normalize_sizes(&encoded("Large, Small")).is_empty());
    assert!(normalize_sizes(&encoded("[{broken")).is_empty());
}

#[test]
fn sizes_from_missing_or_scalar_is_empty() {
    assert!(normalize_sizes(&FieldInput::Missing).is_empty());
    assert!(normalize_sizes(&FieldInput::from(true)).is_empty());
}

#[test]
fn sizes_from_array_passes_objects_through() {
    let input = FieldInput::List(vec![
        json!({"size": "Large", "packing": "100/ctn", "gauge": ["1", "2"]}),
        json!("stray string"),
        json!({}),
    ]);
    assert_eq!(normalize_sizes(&input), vec![large_size()]);
}

#[test]
fn sizes_coerce_numeric_labels_and_tokens() {
    let input = FieldInput::List(vec![json!({"size": 10, "packing": "50/ctn", "gauge": [1, "2", " "]})]);
    let sizes = normalize_sizes(&input);
    assert_eq!(sizes[0].size, "10");
    assert_eq!(sizes[0].gauge, vec!["1", "2"]);
}

#[test]
fn sizes_gauge_may_be_a_comma_string() {
    let input = encoded(r#"[{"size":"Large","packing":"100/ctn","gauge":"1, 2"}]"#);
    assert_eq!(normalize_sizes(&input), vec![large_size()]);
}

// -----------------------------------------------------------------------
// key_features
// -----------------------------------------------------------------------

#[test]
fn key_features_comma_string_is_split_and_trimmed() {
    assert_eq!(
        normalize_key_features(&encoded("a, b ,c")),
        vec!["a", "b", "c"]
    );
}

#[test]
fn key_features_single_value_without_comma() {
    assert_eq!(
        normalize_key_features(&encoded("  Nickel free ")),
        vec!["Nickel free"]
    );
    assert!(normalize_key_features(&encoded("   ")).is_empty());
}

#[test]
fn key_features_json_array_is_trimmed_and_keeps_duplicates() {
    assert_eq!(
        normalize_key_features(&encoded(r#"[" Durable ", "", "Durable", 3]"#)),
        vec!["Durable", "Durable", "3"]
    );
}

#[test]
fn key_features_double_encoded() {
    let inner = serialize_list(&["Rust proof".to_owned(), "Light".to_owned()]);
    let wrapped = serde_json::to_string(&vec![inner]).expect("wrap");
    assert_eq!(
        normalize_key_features(&encoded(&wrapped)),
        vec!["Rust proof", "Light"]
    );
}

#[test]
fn key_features_unparseable_bracket_falls_back_to_split() {
    assert_eq!(
        normalize_key_features(&encoded("[Durable, Light")),
        vec!["[Durable", "Light"]
    );
}

#[test]
fn key_features_from_array_and_scalar() {
    let list = FieldInput::List(vec![json!(" Hand polished "), json!(null), json!(false)]);
    assert_eq!(normalize_key_features(&list), vec!["Hand polished", "false"]);
    assert_eq!(normalize_key_features(&FieldInput::from(5_i64)), vec!["5"]);
    assert!(normalize_key_features(&FieldInput::Missing).is_empty());
}

#[test]
fn key_features_round_trip() {
    let features = vec!["Durable".to_owned(), "Anti-tarnish, coated".to_owned()];
    let text = serialize_list(&features);
    assert_eq!(normalize_key_features(&encoded(&text)), features);
}

// -----------------------------------------------------------------------
// images
// -----------------------------------------------------------------------

#[test]
fn images_bare_url_becomes_single_element() {
    assert_eq!(
        normalize_images(&encoded(" https://cdn.example.com/a.png ")),
        vec!["https://cdn.example.com/a.png"]
    );
    assert!(normalize_images(&encoded("a.png")).is_empty());
}

#[test]
fn images_repeated_form_fields_flatten_encoded_lists() {
    let input = FieldInput::List(vec![
        json!("http://a/1.png"),
        json!(r#"["http://a/2.png","http://a/3.png"]"#),
        json!(4),
    ]);
    assert_eq!(
        normalize_images(&input),
        vec!["http://a/1.png", "http://a/2.png", "http://a/3.png"]
    );
}

#[test]
fn images_round_trip() {
    let images = vec![
        "https://storage.googleapis.com/b/1-a.png".to_owned(),
        "https://storage.googleapis.com/b/2-b.png".to_owned(),
    ];
    assert_eq!(normalize_images(&encoded(&serialize_list(&images))), images);
}

#[test]
fn images_malformed_text_is_empty() {
    assert!(normalize_images(&encoded("[\"http://a/1.png\"")).is_empty());
    assert!(normalize_images(&FieldInput::Missing).is_empty());
}

// -----------------------------------------------------------------------
// values that resemble encodings
// -----------------------------------------------------------------------

fn awkward_features() -> Vec<Vec<String>> {
    [
        vec!["[New] rust proof"],
        vec!["[New] rust proof", "Light"],
        vec!["\"Premium\""],
        vec!["50\\60 mm"],
        vec!["[3\\4] gauge"],
        vec![],
    ]
    .into_iter()
    .map(|features| features.into_iter().map(str::to_owned).collect())
    .collect()
}

fn awkward_sizes() -> Vec<Vec<SizeEntry>> {
    vec![
        vec![SizeEntry::new("[10]", "50/ctn", &["1"])],
        vec![SizeEntry::new("\"XL\"", "[bulk]", &["[1]", "2\\3"])],
        vec![],
    ]
}

#[test]
fn key_feature_starting_with_bracket_is_kept() {
    assert_eq!(
        normalize_key_features(&encoded(r#"["[New] rust proof"]"#)),
        vec!["[New] rust proof"]
    );
}

#[test]
fn key_features_round_trip_values_resembling_encodings() {
    for features in awkward_features() {
        let text = serialize_list(&features);
        assert_eq!(normalize_key_features(&encoded(&text)), features, "{text}");
    }
}

#[test]
fn key_features_second_pass_changes_nothing() {
    for features in awkward_features() {
        let once = serialize_list(&normalize_key_features(&encoded(&serialize_list(&features))));
        let twice = serialize_list(&normalize_key_features(&encoded(&once)));
        assert_eq!(once, twice);
    }
}

#[test]
fn sizes_round_trip_values_resembling_encodings() {
    for sizes in awkward_sizes() {
        let text = serialize_list(&sizes);
        assert_eq!(normalize_sizes(&encoded(&text)), sizes, "{text}");

        let twice = serialize_list(&normalize_sizes(&encoded(&text)));
        assert_eq!(twice, text);
    }
}

#[test]
fn images_empty_list_round_trips() {
    assert_eq!(serialize_list(&normalize_images(&encoded("[]"))), "[]");
    assert!(normalize_images(&encoded(&serialize_list::<String>(&[]))).is_empty());
}

// -----------------------------------------------------------------------
// merge_images
// -----------------------------------------------------------------------

#[test]
fn merge_images_drops_invalid_and_keeps_order() {
    let kept = vec!["http://a/1.png".to_owned(), "not-a-url".to_owned()];
    let uploaded = vec!["http://b/2.png".to_owned()];
    assert_eq!(
        merge_images(kept, uploaded),
        vec!["http://a/1.png", "http://b/2.png"]
    );
}

#[test]
fn merge_images_places_kept_before_new() {
    let merged = merge_images(
        vec!["https://x/old.png".to_owned()],
        vec!["https://x/new-1.png".to_owned(), "https://x/new-2.png".to_owned()],
    );
    assert_eq!(
        merged,
        vec!["https://x/old.png", "https://x/new-1.png", "https://x/new-2.png"]
    );
}

#[test]
fn is_public_image_url_rules() {
    assert!(is_public_image_url("https://cdn.example.com/a.png"));
    assert!(is_public_image_url("http://localhost:3000/uploads/a.png"));
    assert!(!is_public_image_url("/uploads/a.png"));
    assert!(!is_public_image_url("ftp://host/a.png"));
    assert!(!is_public_image_url("https:///a.png"));
    assert!(!is_public_image_url("https://host/a b.png"));
    assert!(!is_public_image_url("data:image/png;base64,AAAA"));
}

// -----------------------------------------------------------------------
// coerce_flag
// -----------------------------------------------------------------------

#[test]
fn coerce_flag_truthy_forms() {
    assert!(coerce_flag(&encoded("1")));
    assert!(coerce_flag(&encoded("true")));
    assert!(coerce_flag(&encoded(" true ")));
    assert!(coerce_flag(&FieldInput::from(true)));
    assert!(coerce_flag(&FieldInput::from(1_i64)));
    assert!(coerce_flag(&FieldInput::from(json!(1.0))));
    assert!(coerce_flag(&FieldInput::List(vec![json!("true"), json!("false")])));
}

#[test]
fn coerce_flag_everything_else_is_false() {
    assert!(!coerce_flag(&FieldInput::from(0_i64)));
    assert!(!coerce_flag(&FieldInput::Missing));
    assert!(!coerce_flag(&FieldInput::from(false)));
    assert!(!coerce_flag(&encoded("yes")));
    assert!(!coerce_flag(&encoded("TRUE")));
    assert!(!coerce_flag(&encoded("")));
    assert!(!coerce_flag(&FieldInput::from(2_i64)));
    assert!(!coerce_flag(&FieldInput::List(vec![])));
}
