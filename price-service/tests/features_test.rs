//! 特征工程测试

use modelserve_price::{HousingFeatures, PredictError, EXPECTED_COLUMNS};
use serde_json::json;

fn sample_payload() -> serde_json::Value {
    json!({
        "area": 8000, "bedrooms": 3, "bathrooms": 2, "stories": 2,
        "mainroad": 1, "guestroom": 0, "basement": 0, "hotwaterheating": 0,
        "airconditioning": 1, "parking": 2, "prefarea": 1, "furnishingstatus": 2
    })
}

fn assert_close(actual: Option<f64>, expected: f64) {
    let actual = actual.expect("column missing");
    assert!(
        (actual - expected).abs() < 1e-12,
        "expected {}, got {}",
        expected,
        actual
    );
}

#[test]
fn test_derived_columns_for_reference_house() {
    let features = HousingFeatures::from_payload(sample_payload()).unwrap();
    let row = features.derive().unwrap();

    assert_eq!(row.len(), EXPECTED_COLUMNS);
    assert_close(row.get("bedrooms_per_story"), 1.5);
    assert_close(row.get("bathrooms_per_story"), 1.0);
    assert_close(row.get("total_rooms"), 5.0);
    assert_close(row.get("stories_per_area"), 0.00025);
    assert_close(row.get("parking_per_area"), 0.00025);
    assert_close(row.get("stories_area_interaction"), 16000.0);
}

#[test]
fn test_column_order_is_canonical() {
    // 字段在请求中的顺序不影响列顺序
    let reordered = json!({
        "furnishingstatus": 2, "prefarea": 1, "parking": 2, "airconditioning": 1,
        "hotwaterheating": 0, "basement": 0, "guestroom": 0, "mainroad": 1,
        "stories": 2, "bathrooms": 2, "bedrooms": 3, "area": 8000
    });
    let a = HousingFeatures::from_payload(sample_payload()).unwrap().derive().unwrap();
    let b = HousingFeatures::from_payload(reordered).unwrap().derive().unwrap();

    assert_eq!(a, b);
    assert_eq!(a.names()[0], "area");
    assert_eq!(a.names()[11], "furnishingstatus");
    assert_eq!(a.names()[12], "bedrooms_per_story");
    assert_eq!(a.names()[17], "stories_area_interaction");
    assert_eq!(a.values()[0], 8000.0);
}

#[test]
fn test_missing_field_is_a_validation_error() {
    let mut payload = sample_payload();
    payload.as_object_mut().unwrap().remove("stories");

    match HousingFeatures::from_payload(payload) {
        Err(PredictError::Validation(message)) => assert!(message.contains("stories")),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_zero_stories_is_rejected() {
    let mut payload = sample_payload();
    payload["stories"] = json!(0);

    let features = HousingFeatures::from_payload(payload).unwrap();
    match features.derive() {
        Err(PredictError::Validation(message)) => {
            assert!(message.contains("bedrooms_per_story"))
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_extra_numeric_field_adds_a_column() {
    let mut payload = sample_payload();
    payload["garden"] = json!(1);

    let row = HousingFeatures::from_payload(payload).unwrap().derive().unwrap();
    assert_eq!(row.len(), EXPECTED_COLUMNS + 1);
    assert_eq!(row.names().last().map(String::as_str), Some("garden"));
}

#[test]
fn test_extra_field_named_like_derived_column_is_overwritten() {
    let mut payload = sample_payload();
    payload["total_rooms"] = json!(42);

    let row = HousingFeatures::from_payload(payload).unwrap().derive().unwrap();
    assert_eq!(row.len(), EXPECTED_COLUMNS);
    assert_eq!(row.get("total_rooms"), Some(5.0));
}

#[test]
fn test_extra_non_numeric_field_is_rejected() {
    let mut payload = sample_payload();
    payload["color"] = json!("blue");

    let features = HousingFeatures::from_payload(payload).unwrap();
    assert!(matches!(features.derive(), Err(PredictError::Validation(_))));
}
