use super::*;
use serde_json::json;

fn row(cells: &[&str]) -> RawRow {
    cells.iter().map(|c| Cell::from(*c)).collect()
}

#[test]
fn normalizes_sample_sheet_and_drops_total_row() {
    let rows = vec![
        row(&["Ана", "Rest", "Salad", "5", "4.5", "1", "4.5"]),
        row(&["Иван", "Rest", "Soup", "3", "", "2", "6"]),
        row(&["total", "", "", "", "", "", ""]),
    ];

    let orders = normalize_rows(rows);
    assert_eq!(
        orders,
        vec![
            Order {
                client: "Ана".into(),
                vendor: "Rest".into(),
                description: "Salad".into(),
                price: 5.0,
                discounted_price: 4.5,
                quantity: 1.0,
                total: 4.5,
            },
            Order {
                client: "Иван".into(),
                vendor: "Rest".into(),
                description: "Soup".into(),
                price: 3.0,
                discounted_price: 0.0,
                quantity: 2.0,
                total: 6.0,
            },
        ]
    );
}

#[test]
fn empty_input_yields_no_orders() {
    assert!(normalize_rows(Vec::<RawRow>::new()).is_empty());
}

#[test]
fn rows_without_client_are_dropped() {
    let rows = vec![
        Vec::new(),
        row(&["", "Rest", "Soup", "3", "", "2", "6"]),
        row(&["   ", "Rest"]),
        vec![Cell::Empty, Cell::from("Rest")],
    ];
    assert!(normalize_rows(rows).is_empty());
}

#[test]
fn total_sentinel_is_case_sensitive() {
    let orders = normalize_rows(vec![row(&["Total", "", "", "", "", "", "10"])]);
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].total, 10.0);
}

#[test]
fn short_rows_default_missing_cells() {
    let orders = normalize_rows(vec![row(&["Мария", "Hora"])]);
    assert_eq!(orders.len(), 1);
    let order = &orders[0];
    assert_eq!(order.vendor, "Hora");
    assert_eq!(order.description, "");
    assert_eq!(order.price, 0.0);
    assert_eq!(order.quantity, 0.0);
    assert_eq!(order.total, 0.0);
}

#[test]
fn unparseable_numbers_become_zero() {
    for text in ["", "abc", "-", ".", "e5", "NaN", "inf", "Infinity", "1e400", "лв 5"] {
        assert_eq!(parse_or_zero(text), 0.0, "{text:?}");
    }
    assert_eq!(cell_number(&Cell::Number(f64::NAN)), 0.0);
    assert_eq!(cell_number(&Cell::Number(f64::INFINITY)), 0.0);
    assert_eq!(cell_number(&Cell::Empty), 0.0);
}

#[test]
fn parses_leading_numeric_literal() {
    assert_eq!(parse_or_zero("4.5"), 4.5);
    assert_eq!(parse_or_zero("  12 "), 12.0);
    assert_eq!(parse_or_zero("4.50 лв."), 4.5);
    assert_eq!(parse_or_zero("1,5"), 1.0);
    assert_eq!(parse_or_zero(".5"), 0.5);
    assert_eq!(parse_or_zero("5."), 5.0);
    assert_eq!(parse_or_zero("-2.25"), -2.25);
    assert_eq!(parse_or_zero("+3"), 3.0);
    assert_eq!(parse_or_zero("1e2x"), 100.0);
    assert_eq!(parse_or_zero("7e"), 7.0);
}

#[test]
fn numeric_cells_pass_through() {
    let orders = normalize_rows(vec![vec![
        Cell::from("Ана"),
        Cell::from("Rest"),
        Cell::from("Salad"),
        Cell::Number(5.0),
        Cell::Empty,
        Cell::Number(2.0),
        Cell::Number(10.0),
    ]]);
    assert_eq!(orders[0].price, 5.0);
    assert_eq!(orders[0].discounted_price, 0.0);
    assert_eq!(orders[0].total, 10.0);
}

#[test]
fn text_fields_are_trimmed() {
    let orders = normalize_rows(vec![row(&[" Ана ", " Rest", "Salad ", "1", "", "1", "1"])]);
    assert_eq!(orders[0].client, "Ана");
    assert_eq!(orders[0].vendor, "Rest");
    assert_eq!(orders[0].description, "Salad");
}

#[test]
fn normalizes_rows_and_records_from_payload() {
    let values = vec![
        json!(["Ана", "Rest", "Salad", 5, 4.5, 1, 4.5]),
        json!({
            "Client": "Иван",
            "restorant": "Rest",
            "desc": "Soup",
            "price": 3,
            "disc_price": 0,
            "quant": 2,
            "total": 6
        }),
        json!({ "clientName": "Мария", "total": "7.20" }),
        json!({ "Client": "total", "total": 17.7 }),
        json!("garbage"),
        json!(42),
        json!(null),
    ];

    let orders = normalize_values(&values);
    let clients: Vec<&str> = orders.iter().map(|o| o.client.as_str()).collect();
    assert_eq!(clients, vec!["Ана", "Иван", "Мария"]);
    assert_eq!(orders[1].description, "Soup");
    assert_eq!(orders[2].total, 7.2);
    assert_eq!(orders[2].vendor, "");
}

#[test]
fn each_valid_row_yields_exactly_one_order() {
    let names = ["Ана", "total", "", "Иван", " ", "Total", "5"];
    let rows: Vec<RawRow> = names.iter().map(|n| row(&[n, "R", "D", "1", "1", "1", "1"])).collect();
    let expected = names
        .iter()
        .filter(|n| !n.trim().is_empty() && n.trim() != "total")
        .count();
    assert_eq!(normalize_rows(rows).len(), expected);
}
