//! Response synthesis: structured query results into a multi-line Bulgarian
//! answer.
//!
//! Pure function of the query outcome. NotFound explanations pass
//! through verbatim; an empty render falls back to a fixed "insufficient
//! information" line.

use crate::executor::{ClientReport, ModelRow, MonthRow, MonthlyReport, ProductReport, QueryOutcome};

/// How many breakdown entries are listed before "+N more".
const BREAKDOWN_LIMIT: usize = 5;

pub const FALLBACK_MESSAGE: &str =
    "Не успях да намеря подходяща информация по вашата заявка. Моля, опитайте с по-конкретен въпрос.";

/// Render quantities without a trailing `.0` for whole numbers.
pub fn fmt_qty(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

pub fn render(outcome: &QueryOutcome) -> String {
    let lines = match outcome {
        QueryOutcome::NotFound { message } => return message.clone(),
        QueryOutcome::Client(report) => render_client(report),
        QueryOutcome::Product(report) => render_product(report),
        QueryOutcome::Monthly(report) => render_monthly(report),
    };

    if lines.is_empty() {
        FALLBACK_MESSAGE.to_string()
    } else {
        lines.join("\n")
    }
}

fn render_client(report: &ClientReport) -> Vec<String> {
    // A model listing replaces the aggregate view entirely.
    if !report.all_products.is_empty() {
        let mut lines = vec![format!(
            "Информация за всички продукти за {}:",
            report.client
        )];
        lines.extend(report.all_products.iter().map(model_line));
        return lines;
    }
    if !report.selected_products.is_empty() {
        let mut lines = vec![format!(
            "Информация за избраните модели за {}:",
            report.client
        )];
        lines.extend(report.selected_products.iter().map(model_line));
        return lines;
    }

    let mut lines = vec![format!("Информация за клиент {}:", report.client)];

    if report.total_ordered > 0.0 {
        lines.push(format!("- Общо поръчани: {} бр.", fmt_qty(report.total_ordered)));
    }
    lines.push(format!("- Общо изплетени: {} бр.", fmt_qty(report.total_knitted)));
    lines.push(format!(
        "- Общо конфекционирани: {} бр.",
        fmt_qty(report.total_confectioned)
    ));

    if !report.product_types.is_empty() {
        lines.push(format!("- Видове изделия: {}", report.product_types.join(", ")));
    }

    push_monthly_section(&mut lines, &report.monthly);

    let with_orders: Vec<_> = report
        .by_product_type
        .iter()
        .filter(|p| p.ordered > 0.0)
        .collect();
    if !with_orders.is_empty() {
        lines.push(String::new());
        lines.push("Информация по видове изделия:".to_string());
        for product in with_orders {
            lines.push(format!(
                "- {}: общо {} бр. (изплетени: {}, конфекционирани: {})",
                product.kind,
                fmt_qty(product.ordered),
                fmt_qty(product.knitted),
                fmt_qty(product.confectioned)
            ));
        }
    }

    lines
}

fn render_product(report: &ProductReport) -> Vec<String> {
    let mut lines = vec![format!("Информация за продукт '{}':", report.product_type)];

    if report.total_ordered > 0.0 {
        lines.push(format!("- Общо поръчани: {} бр.", fmt_qty(report.total_ordered)));
    }
    lines.push(format!("- Общо изплетени: {} бр.", fmt_qty(report.total_knitted)));
    lines.push(format!(
        "- Общо конфекционирани: {} бр.",
        fmt_qty(report.total_confectioned)
    ));

    if !report.clients.is_empty() {
        let shown: Vec<&str> = report
            .clients
            .iter()
            .take(BREAKDOWN_LIMIT)
            .map(|c| c.as_str())
            .collect();
        let mut clients_line = shown.join(", ");
        if report.clients.len() > BREAKDOWN_LIMIT {
            clients_line.push_str(&format!(
                " и още {}",
                report.clients.len() - BREAKDOWN_LIMIT
            ));
        }
        lines.push(format!("- Клиенти: {clients_line}"));
    }

    push_monthly_section(&mut lines, &report.monthly);

    let nonzero: Vec<_> = report
        .by_client
        .iter()
        .filter(|c| c.knitted + c.confectioned > 0.0)
        .collect();
    if !nonzero.is_empty() {
        lines.push(String::new());
        lines.push("Информация по клиенти:".to_string());
        for client in nonzero.iter().take(BREAKDOWN_LIMIT) {
            lines.push(format!(
                "- {}: общо {} бр. (изплетени: {}, конфекционирани: {})",
                client.name,
                fmt_qty(client.knitted + client.confectioned),
                fmt_qty(client.knitted),
                fmt_qty(client.confectioned)
            ));
        }
        if report.by_client.len() > BREAKDOWN_LIMIT {
            lines.push(format!(
                "...и още {} клиенти",
                report.by_client.len() - BREAKDOWN_LIMIT
            ));
        }
    }

    lines
}

fn render_monthly(report: &MonthlyReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Производствена справка за {} (месец {}):",
        report.date_display, report.month_name
    )];

    lines.push(format!(
        "- Прогнозно дневно количество за плетене: {} бр.",
        fmt_qty(report.knitting_total)
    ));
    lines.push(format!(
        "- Прогнозно дневно количество за конфекция: {} бр.",
        fmt_qty(report.confection_total)
    ));
    lines.push(format!(
        "- Общо дневно производство: {} бр.",
        fmt_qty(report.knitting_total + report.confection_total)
    ));

    if !report.clients.is_empty() {
        lines.push(String::new());
        lines.push("Активни клиенти:".to_string());
        for (idx, client) in report.clients.iter().take(BREAKDOWN_LIMIT).enumerate() {
            let mut details = Vec::new();
            if client.knitting > 0.0 {
                details.push(format!("плетене: {} бр.", fmt_qty(client.knitting)));
            }
            if client.confection > 0.0 {
                details.push(format!("конфекция: {} бр.", fmt_qty(client.confection)));
            }
            lines.push(format!(
                "{}. {}: общо {} бр. ({})",
                idx + 1,
                client.name,
                fmt_qty(client.total),
                details.join(", ")
            ));
        }
        if report.clients.len() > BREAKDOWN_LIMIT {
            lines.push(format!(
                "...и още {} клиенти",
                report.clients.len() - BREAKDOWN_LIMIT
            ));
        }
    }

    if !report.product_types.is_empty() {
        lines.push(String::new());
        lines.push("Продукти в производство:".to_string());
        for (idx, product) in report.product_types.iter().take(BREAKDOWN_LIMIT).enumerate() {
            let mut details = Vec::new();
            if product.knitting > 0.0 {
                details.push(format!("плетене: {} бр.", fmt_qty(product.knitting)));
            }
            if product.confection > 0.0 {
                details.push(format!("конфекция: {} бр.", fmt_qty(product.confection)));
            }
            lines.push(format!(
                "{}. {}: общо {} бр. ({})",
                idx + 1,
                product.name,
                fmt_qty(product.total),
                details.join(", ")
            ));
        }
        if report.product_types.len() > BREAKDOWN_LIMIT {
            lines.push(format!(
                "...и още {} вида продукти",
                report.product_types.len() - BREAKDOWN_LIMIT
            ));
        }
    }

    lines
}

fn push_monthly_section(lines: &mut Vec<String>, monthly: &[MonthRow]) {
    let nonzero: Vec<&MonthRow> = monthly
        .iter()
        .filter(|m| m.knitting + m.confection > 0.0)
        .collect();
    if nonzero.is_empty() {
        return;
    }

    lines.push(String::new());
    lines.push("Месечно разпределение:".to_string());
    for month in nonzero {
        let mut details = Vec::new();
        if month.knitting > 0.0 {
            details.push(format!("плетене: {} бр.", fmt_qty(month.knitting)));
        }
        if month.confection > 0.0 {
            details.push(format!("конфекция: {} бр.", fmt_qty(month.confection)));
        }
        lines.push(format!("- {}: {}", month.month, details.join(", ")));
    }
}

fn model_line(model: &ModelRow) -> String {
    format!(
        "- {} - файн: {}; вид: {}; поръчка: {}; изплетено: {}; за плетене: {}; конфекционирано: {}; за конфекциониране: {};",
        model.model,
        model.fain.as_deref().unwrap_or("-"),
        model.kind.as_deref().unwrap_or("-"),
        fmt_qty(model.ordered),
        fmt_qty(model.knitted),
        fmt_qty(model.for_knitting),
        fmt_qty(model.confectioned),
        fmt_qty(model.for_confection)
    )
}
