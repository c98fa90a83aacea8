//! End-to-end pipeline tests: free-text Bulgarian question in, rendered
//! answer out, over seeded sheets.

use chrono::NaiveDate;
use plan_assist::sheet_store::{SHEET_CONFECTION, SHEET_KNITTING, SHEET_SUMMARY};
use plan_assist::{Assistant, Intent, QueryOutcome, SheetStore};
use polars::prelude::*;
use std::collections::HashMap;

fn seeded_assistant() -> Assistant {
    let knitting = df![
        "Фирма" => ["Lebek", "Lebek", "Matinique", "Zerbi"],
        "цех" => ["1", "1", "2", "3"],
        "поръчка" => [100.0, 50.0, 200.0, 80.0],
        "изплетено до момента в бр." => [60.0, 30.0, 150.0, 40.0],
        "пета" => ["", "", "", ""],
        "вид" => ["пуловер", "жилетка", "пуловер", "шал"],
        "март" => [20.0, 10.0, 70.0, 5.0],
        "април" => [40.0, 20.0, 80.0, 35.0]
    ]
    .unwrap();

    let confection = df![
        "Фирма" => ["Lebek", "Lebek", "Matinique", "Zerbi"],
        "Модел" => ["AB-123", "AB-124", "CD-55", "EF-9"],
        "файн" => ["12", "12", "7", "5"],
        "Поръчка" => [100.0, 50.0, 200.0, 80.0],
        "изплетено до момента в бр." => [60.0, 30.0, 150.0, 40.0],
        "остава за плетене в бр" => [40.0, 20.0, 50.0, 40.0],
        "конфекционирано до момента в бр." => [55.0, 25.0, 120.0, 30.0],
        "остава за конфекция в бр" => [45.0, 25.0, 80.0, 50.0],
        "вид" => ["пуловер", "жилетка", "пуловер", "шал"],
        "март" => [15.0, 5.0, 60.0, 4.0],
        "април" => [30.0, 15.0, 70.0, 20.0]
    ]
    .unwrap();

    let summary = df![
        "Фирма" => ["Lebek", "Matinique", "Zerbi"],
        "поръчки в бр." => [150.0, 200.0, 80.0]
    ]
    .unwrap();

    let mut sheets = HashMap::new();
    sheets.insert(SHEET_KNITTING.to_string(), knitting);
    sheets.insert(SHEET_CONFECTION.to_string(), confection);
    sheets.insert(SHEET_SUMMARY.to_string(), summary);

    Assistant::with_store(SheetStore::with_sheets(sheets))
        .with_today(NaiveDate::from_ymd_opt(2025, 3, 15).unwrap())
}

#[test]
fn client_question_renders_client_report() {
    let assistant = seeded_assistant();
    let response = assistant.resolve_query("клиент Lebek");

    assert!(response.success);
    assert_eq!(response.intent, Some(Intent::Client));
    assert_eq!(
        response.params.as_ref().unwrap().client.as_deref(),
        Some("lebek")
    );
    assert!(matches!(response.result, Some(QueryOutcome::Client(_))));

    assert!(response.message.starts_with("Информация за клиент Lebek:"));
    assert!(response.message.contains("- Общо поръчани: 150 бр."));
    assert!(response.message.contains("- Общо изплетени: 90 бр."));
    assert!(response.message.contains("- Общо конфекционирани: 80 бр."));
    assert!(response.message.contains("- Видове изделия: жилетка, пуловер"));
    assert!(response.message.contains("Месечно разпределение:"));
    assert!(response
        .message
        .contains("- март: плетене: 30 бр., конфекция: 20 бр."));
}

#[test]
fn product_question_renders_product_report() {
    let assistant = seeded_assistant();
    let response = assistant.resolve_query("продукт жилетка");

    assert!(response.success);
    assert_eq!(response.intent, Some(Intent::Product));
    assert_eq!(
        response.params.as_ref().unwrap().product_type.as_deref(),
        Some("жилетка")
    );
    assert!(response
        .message
        .starts_with("Информация за продукт 'жилетка':"));
    assert!(response.message.contains("- Клиенти: Lebek"));
}

#[test]
fn plural_product_phrase_still_resolves() {
    let assistant = seeded_assistant();
    let response = assistant.resolve_query("Покажи данни за жилетки");

    assert!(response.success);
    assert_eq!(response.intent, Some(Intent::Product));
    assert_eq!(
        response.params.as_ref().unwrap().product_type.as_deref(),
        Some("жилетка")
    );
    assert!(response
        .message
        .starts_with("Информация за продукт 'жилетка':"));
}

#[test]
fn unknown_client_is_polite_not_found() {
    let assistant = seeded_assistant();
    let response = assistant.resolve_query("клиент Unknownimque");

    // A miss is still a successful response, with an explanation.
    assert!(response.success);
    assert!(matches!(
        response.result,
        Some(QueryOutcome::NotFound { .. })
    ));
    assert_eq!(
        response.message,
        "Не намерих клиент, съответстващ на 'unknownimque'. Опитайте с друго име."
    );
}

#[test]
fn today_question_renders_daily_summary() {
    let assistant = seeded_assistant();
    let response = assistant.resolve_query("какво произвеждаме днес");

    assert!(response.success);
    assert_eq!(response.intent, Some(Intent::Summary));
    assert_eq!(
        response.params.as_ref().unwrap().date.as_deref(),
        Some("2025-03-15")
    );
    assert!(response
        .message
        .starts_with("Производствена справка за днес (месец март):"));
    assert!(response
        .message
        .contains("- Прогнозно дневно количество за плетене: 105 бр."));
    assert!(response
        .message
        .contains("- Общо дневно производство: 189 бр."));
    assert!(response.message.contains("Активни клиенти:"));
    assert!(response.message.contains("1. Matinique: общо 130 бр."));
}

#[test]
fn empty_question_defaults_to_monthly_summary() {
    let assistant = seeded_assistant();
    let response = assistant.resolve_query("");

    assert!(response.success);
    assert_eq!(response.intent, Some(Intent::Summary));
    let Some(QueryOutcome::Monthly(report)) = &response.result else {
        panic!("expected monthly outcome");
    };
    assert_eq!(report.month, 3);
    assert!(response
        .message
        .starts_with("Производствена справка за март (месец март):"));
}

#[test]
fn all_products_question_lists_models() {
    let assistant = seeded_assistant();
    let response = assistant.resolve_query("клиент lebek всички модели");

    assert!(response.success);
    assert_eq!(response.intent, Some(Intent::Client));
    assert!(response.params.as_ref().unwrap().all_products);
    assert!(response
        .message
        .starts_with("Информация за всички продукти за Lebek:"));
    assert!(response.message.contains("- AB-123 - файн: 12; вид: пуловер;"));
    assert!(response.message.contains("- AB-124"));
}

#[test]
fn specific_model_question_lists_only_those_models() {
    let assistant = seeded_assistant();
    let response = assistant.resolve_query("клиент lebek модел ab123");

    assert!(response.success);
    assert!(response
        .message
        .starts_with("Информация за избраните модели за Lebek:"));
    assert!(response.message.contains("- AB-123"));
    assert!(!response.message.contains("AB-124"));
}

#[test]
fn march_question_aggregates_that_month() {
    let assistant = seeded_assistant();
    let response = assistant.resolve_query("справка за март");

    assert!(response.success);
    let Some(QueryOutcome::Monthly(report)) = &response.result else {
        panic!("expected monthly outcome");
    };
    assert_eq!(report.month, 3);
    assert_eq!(report.knitting_total, 105.0);
    assert_eq!(report.confection_total, 84.0);
}

#[test]
fn response_serializes_to_json() {
    let assistant = seeded_assistant();
    let response = assistant.resolve_query("клиент Lebek");

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["intent"], "client");
    assert_eq!(json["result"]["outcome"], "client");
    assert_eq!(json["result"]["client"], "Lebek");
}
