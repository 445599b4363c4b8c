//! Output formatting module

use std::path::Path;

use anyhow::Result;
use serde_json::json;

use tiredesk_core::Money;
use tiredesk_inventory::{SearchPage, TireRecord};
use tiredesk_pricing::ServicePrices;
use tiredesk_sales::{CartTotal, CheckoutReport};

use crate::cli::OutputFormat;
use crate::status::StatusMessage;

fn amount(money: Money, currency: &str) -> String {
    format!("{money} {currency}")
}

fn stock_cell(record: &TireRecord) -> String {
    record.stock.map(|s| s.to_string()).unwrap_or_else(|| "?".to_string())
}

pub fn print_search(format: OutputFormat, page: &SearchPage<'_>, currency: &str) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(page)?);
        return Ok(());
    }

    println!(
        "{:<16} {:<12} {:<34} {:>12} {:>6}  {}",
        "PART", "SIZE", "TIRE", "PRICE", "STOCK", "EU LABEL"
    );
    for record in &page.items {
        let name = format!("{} {}", record.manufacturer, record.product_line);
        println!(
            "{:<16} {:<12} {:<34} {:>12} {:>6}  {}",
            record.part_number.as_str(),
            record.size_label(),
            name,
            amount(record.price, currency),
            stock_cell(record),
            record.eu_label().unwrap_or_default()
        );
    }
    println!(
        "\nPage {} of {} ({} matches)",
        page.page,
        page.page_count.max(1),
        page.total
    );
    Ok(())
}

pub fn print_manufacturers(format: OutputFormat, names: &[String]) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(names)?);
    } else {
        for name in names {
            println!("{name}");
        }
    }
    Ok(())
}

pub fn print_prices(format: OutputFormat, prices: &ServicePrices, currency: &str) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(prices)?);
        return Ok(());
    }

    println!("Service prices");
    println!("==============");
    for (key, fee) in prices.entries() {
        println!("{:<22}{:>14}", key.as_str(), amount(fee, currency));
    }
    Ok(())
}

pub fn print_status(format: OutputFormat, status: &StatusMessage) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(status)?);
    } else {
        println!("{status}");
    }
    Ok(())
}

pub fn print_quote(
    format: OutputFormat,
    path: &Path,
    total: &CartTotal,
    currency: &str,
) -> Result<()> {
    if format == OutputFormat::Json {
        let value = json!({ "file": path.display().to_string(), "total": total });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Quote written to {}", path.display());
    println!("Tires:         {:>14}", amount(total.tires, currency));
    println!("Mounting:      {:>14}", amount(total.mounting, currency));
    println!("Wheel change:  {:>14}", amount(total.wheel_change, currency));
    println!("Storage:       {:>14}", amount(total.storage, currency));
    println!("Total:         {:>14}", amount(total.total, currency));
    Ok(())
}

pub fn print_checkout(format: OutputFormat, path: &Path, report: &CheckoutReport) -> Result<()> {
    if format == OutputFormat::Json {
        let value = json!({ "file": path.display().to_string(), "report": report });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Quote written to {}", path.display());
    println!("{}", StatusMessage::from(report));
    for (part, err) in &report.failures {
        println!("  {part}: {err}");
    }
    Ok(())
}
