use super::*;
use chrono::FixedOffset;

#[test]
fn cells_deserialize_from_mixed_json() {
    let cells: Vec<Cell> =
        serde_json::from_str(r#"["Ана", 4.5, null, true, [1], {"a": 1}]"#).expect("cells");
    assert_eq!(
        cells,
        vec![
            Cell::Text("Ана".into()),
            Cell::Number(4.5),
            Cell::Empty,
            Cell::Text("true".into()),
            Cell::Empty,
            Cell::Empty,
        ]
    );
}

#[test]
fn number_cell_text_drops_trailing_zero_fraction() {
    assert_eq!(Cell::Number(5.0).text(), "5");
    assert_eq!(Cell::Number(4.5).text(), "4.5");
    assert!(Cell::Text("  ".into()).is_blank());
    assert!(!Cell::Number(0.0).is_blank());
}

#[test]
fn order_uses_backend_wire_keys() {
    let order = Order {
        client: "Ана".into(),
        vendor: "Rest".into(),
        description: "Salad".into(),
        price: 5.0,
        discounted_price: 4.5,
        quantity: 1.0,
        total: 4.5,
    };
    let json = serde_json::to_value(&order).expect("json");
    assert_eq!(json["Client"], "Ана");
    assert_eq!(json["restorant"], "Rest");
    assert_eq!(json["desc"], "Salad");
    assert_eq!(json["disc_price"], 4.5);
    assert_eq!(json["quant"], 1.0);
}

#[test]
fn effective_price_prefers_discount() {
    let mut order = Order {
        client: "Иван".into(),
        vendor: String::new(),
        description: String::new(),
        price: 3.0,
        discounted_price: 0.0,
        quantity: 2.0,
        total: 6.0,
    };
    assert_eq!(order.effective_price(), 3.0);
    order.discounted_price = 2.5;
    assert_eq!(order.effective_price(), 2.5);
}

#[test]
fn last_modified_accepts_timestamp_or_locale_text() {
    let ts: LastModified =
        serde_json::from_str(r#""2024-03-05T09:07:00.000Z""#).expect("timestamp");
    assert!(matches!(ts, LastModified::Timestamp(_)));

    let sofia = FixedOffset::east_opt(2 * 3600).expect("offset");
    assert_eq!(ts.display_in(&sofia), "05.03.2024 | 11:07");

    let text: LastModified = serde_json::from_str(r#""05.03.2024 11:07:00""#).expect("text");
    assert_eq!(text, LastModified::Text("05.03.2024 11:07:00".into()));
    assert_eq!(text.to_string(), "05.03.2024 11:07:00");
}

#[test]
fn amounts_format_to_two_decimals() {
    assert_eq!(format_amount(4.5), "4.50");
    assert_eq!(format_amount(10.0 / 3.0), "3.33");
    assert_eq!(format_amount(-0.0), "0.00");
}
