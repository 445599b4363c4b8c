//! Command handlers

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use chrono::{Local, NaiveDateTime};

use tiredesk_core::{DomainError, DomainResult, Money};
use tiredesk_inventory::{Table, TableView};
use tiredesk_quoting::{CustomerData, RenderedQuote};

use crate::cli::{CartArgs, Cli, Commands, OutputFormat, SearchArgs};
use crate::config::AppConfig;
use crate::data::DataDir;
use crate::output;
use crate::session::Session;
use crate::status::StatusMessage;

/// Execute CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let data = DataDir::new(&cli.data_dir);
    let config = AppConfig::load(cli.config.as_deref(), data.root())?;
    let mut session = data.open_session(&config)?;

    if let Some(password) = &cli.password {
        session
            .unlock(password)
            .map_err(|_| anyhow!("wrong admin password"))?;
    }

    let format = cli.format;
    let currency = config.currency.as_str();
    let now = Local::now().naive_local();

    match cli.command {
        Commands::Search(args) => cmd_search(&mut session, &args, format, currency),

        Commands::Quote {
            cart,
            customer,
            out,
        } => {
            fill_cart(&mut session, &cart, format)?;
            let quote = session.render_quote(&customer.into(), now)?;
            let path = write_quote(&out, &quote)?;
            output::print_quote(format, &path, &session.cart_total(), currency)
        }

        Commands::Checkout {
            cart,
            customer,
            out,
            reduce_stock,
        } => {
            fill_cart(&mut session, &cart, format)?;
            cmd_checkout(&data, &mut session, &customer.into(), &out, reduce_stock, now, format)
        }

        Commands::Import { table, file } => {
            let count = finish(format, import_file(&mut session, &file, table), |n| {
                format!("Imported {n} rows into the {table} table")
            })?;
            tracing::debug!(count, "import saved");
            data.save_table(session.store(), table)
        }

        Commands::Export { table, out } => {
            let bytes = finish(format, session.export_csv(table), |b| {
                format!("Exported the {table} table ({} bytes) to {}", b.len(), out.display())
            })?;
            std::fs::write(&out, bytes)
                .with_context(|| format!("failed to write {}", out.display()))
        }

        Commands::Stock {
            part_number,
            delta,
            table,
        } => {
            finish(format, session.update_stock(&part_number, delta, table), |stock| {
                format!("Stock of {part_number} in the {table} table is now {stock}")
            })?;
            data.save_table(session.store(), table)
        }

        Commands::Clear { table, yes } => {
            if !yes {
                bail!("refusing to clear the {table} table without --yes");
            }
            finish(format, session.clear_table(table), |_| {
                format!("Cleared the {table} table")
            })?;
            data.save_table(session.store(), table)
        }

        Commands::Prices { set } => {
            if !set.is_empty() {
                for entry in &set {
                    let (key, fee) = parse_price_assignment(entry)?;
                    finish(format, session.set_service_price(&key, fee), |_| {
                        format!("{key} set to {fee} {currency}")
                    })?;
                }
                data.save_prices(session.prices())?;
            }
            output::print_prices(format, session.prices(), currency)
        }
    }
}

/// Print the status for `result`; an error status becomes the command error.
fn finish<T>(
    format: OutputFormat,
    result: DomainResult<T>,
    on_ok: impl FnOnce(&T) -> String,
) -> Result<T> {
    let status = StatusMessage::from_result(&result, on_ok);
    match result {
        Ok(value) => {
            output::print_status(format, &status)?;
            Ok(value)
        }
        Err(_) => Err(anyhow!(status.text)),
    }
}

fn cmd_search(
    session: &mut Session,
    args: &SearchArgs,
    format: OutputFormat,
    currency: &str,
) -> Result<()> {
    if args.manufacturers {
        return output::print_manufacturers(format, &session.manufacturers(args.view));
    }
    let query = args.to_query(session.new_query());
    let page = session.search(args.view, &query)?;
    output::print_search(format, &page, currency)
}

/// Add every requested item. Duplicates are reported and skipped; an unknown
/// part stops the command.
fn fill_cart(session: &mut Session, cart: &CartArgs, format: OutputFormat) -> Result<()> {
    let services = cart.services();
    for item in &cart.items {
        let (part_number, quantity) = {
            let catalog = session.view(TableView::Combined);
            item.resolve(|part| catalog.contains(part))
        };
        let result = session.add_to_cart(TableView::Combined, &part_number, quantity, services);
        let status = StatusMessage::from_result(&result, |id| format!("Added {id}"));
        if status.is_error() {
            bail!(status.text);
        }
        if result.is_err() {
            output::print_status(format, &status)?;
        }
    }
    Ok(())
}

fn cmd_checkout(
    data: &DataDir,
    session: &mut Session,
    customer: &CustomerData,
    out: &Path,
    reduce_stock: bool,
    at: NaiveDateTime,
    format: OutputFormat,
) -> Result<()> {
    let done = session.complete_checkout(customer, reduce_stock, at)?;
    let path = write_quote(out, &done.quote)?;
    if done.report.succeeded > 0 {
        data.save_table(session.store(), Table::Central)?;
    }
    output::print_checkout(format, &path, &done.report)
}

fn import_file(session: &mut Session, file: &Path, table: Table) -> DomainResult<usize> {
    let reader = File::open(file).map_err(|e| {
        DomainError::validation(format!("cannot open {}: {e}", file.display()))
    })?;
    if is_spreadsheet(file) {
        session.import_spreadsheet(reader, table)
    } else {
        session.import_csv(reader, table)
    }
}

fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "xlsx" | "xlsm"))
}

fn write_quote(dir: &Path, quote: &RenderedQuote) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(&quote.filename);
    std::fs::write(&path, &quote.text)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "quote written");
    Ok(path)
}

/// `montage_ab_20=45.00` into key and fee.
fn parse_price_assignment(entry: &str) -> Result<(String, Money)> {
    let (key, amount) = entry
        .split_once('=')
        .ok_or_else(|| anyhow!("expected KEY=AMOUNT, got '{entry}'"))?;
    let fee = Money::parse(amount).with_context(|| format!("invalid amount for {key}"))?;
    Ok((key.trim().to_string(), fee))
}
