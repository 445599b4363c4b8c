//! CLI definition using clap

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use tiredesk_core::{DomainError, PartNumber};
use tiredesk_inventory::{SortOrder, Table, TableView, TireQuery};
use tiredesk_pricing::WheelChangeTier;
use tiredesk_quoting::CustomerData;
use tiredesk_sales::{DEFAULT_QUANTITY, ServiceSelection, clamp_quantity};

/// Output format for results
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "tiredesk")]
#[command(version)]
#[command(about = "Tire search, service pricing, quotes and stock for the shop counter")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding master.csv, central.csv and service_prices.csv
    #[arg(long, short = 'd', global = true, default_value = ".")]
    pub data_dir: PathBuf,

    /// Config file (default: <data-dir>/tiredesk.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(long, short = 'f', global = true, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Admin password, required by import, export, stock, clear and price edits
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// Verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search tires
    Search(SearchArgs),

    /// Write a quote for a set of tires without touching stock
    Quote {
        #[command(flatten)]
        cart: CartArgs,

        #[command(flatten)]
        customer: CustomerArgs,

        /// Directory the quote file is written to
        #[arg(long, short = 'o', default_value = ".")]
        out: PathBuf,
    },

    /// Write the final quote and book the sale
    Checkout {
        #[command(flatten)]
        cart: CartArgs,

        #[command(flatten)]
        customer: CustomerArgs,

        /// Directory the quote file is written to
        #[arg(long, short = 'o', default_value = ".")]
        out: PathBuf,

        /// Subtract the sold quantities from the central table
        #[arg(long)]
        reduce_stock: bool,
    },

    /// Replace a table from a CSV or XLSX file (admin)
    Import {
        /// Target table (master, central)
        #[arg(long)]
        table: Table,

        /// CSV or .xlsx file
        file: PathBuf,
    },

    /// Export a table or the combined view as CSV (admin)
    Export {
        /// Source (master, central, combined)
        #[arg(long, default_value = "combined")]
        table: TableView,

        /// Output file
        #[arg(long, short = 'o')]
        out: PathBuf,
    },

    /// Adjust the stock of one part (admin)
    Stock {
        part_number: PartNumber,

        /// Change to apply, e.g. 8 or -4
        #[arg(allow_negative_numbers = true)]
        delta: i64,

        #[arg(long, default_value = "central")]
        table: Table,
    },

    /// Remove every row from a table (admin)
    Clear {
        #[arg(long)]
        table: Table,

        /// Confirm; the table cannot be restored
        #[arg(long)]
        yes: bool,
    },

    /// Show the service price table, optionally changing fees (admin)
    Prices {
        /// Set a fee, e.g. --set montage_ab_20=45.00
        #[arg(long = "set", value_name = "KEY=AMOUNT")]
        set: Vec<String>,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    #[default]
    Table,
    PriceAsc,
    PriceDesc,
    Stock,
    Size,
}

impl From<SortArg> for SortOrder {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Table => SortOrder::Table,
            SortArg::PriceAsc => SortOrder::PriceAsc,
            SortArg::PriceDesc => SortOrder::PriceDesc,
            SortArg::Stock => SortOrder::StockDesc,
            SortArg::Size => SortOrder::Size,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Table or view to search (master, central, combined)
    #[arg(long, default_value = "combined")]
    pub view: TableView,

    #[arg(long, short = 'w')]
    pub width: Option<u32>,

    /// Aspect ratio
    #[arg(long)]
    pub height: Option<u32>,

    /// Rim diameter in inches
    #[arg(long, short = 'r')]
    pub rim: Option<u32>,

    #[arg(long, short = 'm')]
    pub manufacturer: Option<String>,

    /// Free text over brand, product line and part number
    #[arg(long, short = 't')]
    pub text: Option<String>,

    #[arg(long)]
    pub in_stock: bool,

    #[arg(long, value_enum, default_value_t = SortArg::Table)]
    pub sort: SortArg,

    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Rows per page (default from config)
    #[arg(long)]
    pub page_size: Option<usize>,

    /// List the manufacturers in the view instead of tires
    #[arg(long)]
    pub manufacturers: bool,
}

impl SearchArgs {
    /// Apply these arguments on top of `base`.
    pub fn to_query(&self, base: TireQuery) -> TireQuery {
        TireQuery {
            width: self.width,
            height: self.height,
            rim_diameter: self.rim,
            manufacturer: self.manufacturer.clone(),
            text: self.text.clone(),
            in_stock_only: self.in_stock,
            sort: self.sort.into(),
            page: self.page,
            page_size: self.page_size.unwrap_or(base.page_size),
        }
    }
}

/// `PART` or `PARTxQTY`, e.g. `CO-0311x2`.
///
/// Part numbers may themselves end in `x` plus digits (`CT-205X55`), so the
/// split is only a candidate until [`ItemSpec::resolve`] has seen the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSpec {
    whole: PartNumber,
    split: Option<(PartNumber, u32)>,
}

impl ItemSpec {
    /// Part number and quantity. A part number the catalog knows is taken
    /// whole with the default quantity; otherwise a trailing `xQTY` counts.
    pub fn resolve(&self, is_known: impl Fn(&PartNumber) -> bool) -> (PartNumber, u32) {
        match &self.split {
            Some((part, quantity)) if !is_known(&self.whole) => (part.clone(), *quantity),
            _ => (self.whole.clone(), DEFAULT_QUANTITY),
        }
    }
}

impl FromStr for ItemSpec {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let whole = PartNumber::new(s)?;
        let split = s.rsplit_once(['x', 'X', '*']).and_then(|(part, qty)| {
            let quantity = qty.trim().parse::<i64>().ok()?;
            let part = PartNumber::new(part).ok()?;
            Some((part, clamp_quantity(quantity)))
        });
        Ok(Self { whole, split })
    }
}

#[derive(Args, Debug, Clone)]
pub struct CartArgs {
    /// Tire to add, PART or PARTxQTY (quantity 1-8, default 4)
    #[arg(long = "item", short = 'i', required = true, value_name = "PART[xQTY]")]
    pub items: Vec<ItemSpec>,

    /// Book mounting for every item
    #[arg(long)]
    pub mounting: bool,

    /// Book a wheel change for 1-4 wheels
    #[arg(long, value_name = "WHEELS")]
    pub wheel_change: Option<WheelChangeTier>,

    /// Book storage for every item
    #[arg(long)]
    pub storage: bool,
}

impl CartArgs {
    pub fn services(&self) -> ServiceSelection {
        ServiceSelection {
            mounting: self.mounting,
            wheel_change: self.wheel_change,
            storage: self.storage,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct CustomerArgs {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub company: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub vehicle: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,
}

impl From<CustomerArgs> for CustomerData {
    fn from(args: CustomerArgs) -> Self {
        CustomerData {
            name: args.name.unwrap_or_default(),
            company: args.company.unwrap_or_default(),
            email: args.email.unwrap_or_default(),
            phone: args.phone.unwrap_or_default(),
            vehicle: args.vehicle.unwrap_or_default(),
            notes: args.notes.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn item_spec_forms() {
        let unknown = |_: &PartNumber| false;

        let plain: ItemSpec = "CO-0311".parse().unwrap();
        assert_eq!(
            plain.resolve(unknown),
            (PartNumber::new("CO-0311").unwrap(), DEFAULT_QUANTITY)
        );

        let qty: ItemSpec = "CO-0311x2".parse().unwrap();
        assert_eq!(qty.resolve(unknown), (PartNumber::new("CO-0311").unwrap(), 2));

        let clamped: ItemSpec = "CO-0311*20".parse().unwrap();
        assert_eq!(clamped.resolve(unknown).1, 8);

        // a trailing x without digits belongs to the part number
        let part_x: ItemSpec = "MAXX".parse().unwrap();
        assert_eq!(part_x.resolve(unknown).0.as_str(), "MAXX");

        assert!("  ".parse::<ItemSpec>().is_err());
    }

    #[test]
    fn known_part_number_is_not_split() {
        let spec: ItemSpec = "CT-205X55".parse().unwrap();
        let catalog = |p: &PartNumber| p.as_str() == "CT-205X55";
        assert_eq!(
            spec.resolve(catalog),
            (PartNumber::new("CT-205X55").unwrap(), DEFAULT_QUANTITY)
        );

        let with_qty: ItemSpec = "CT-205X55x2".parse().unwrap();
        assert_eq!(with_qty.resolve(catalog), (PartNumber::new("CT-205X55").unwrap(), 2));
    }

    #[test]
    fn parses_quote_command() {
        let cli = Cli::try_parse_from([
            "tiredesk",
            "--data-dir",
            "/srv/tires",
            "quote",
            "-i",
            "MI-225-18x4",
            "--mounting",
            "--wheel-change",
            "4",
            "--name",
            "Anna Berger",
        ])
        .unwrap();

        match cli.command {
            Commands::Quote { cart, customer, .. } => {
                assert_eq!(cart.items.len(), 1);
                assert_eq!(cart.services().wheel_change, Some(WheelChangeTier::Four));
                assert!(!cart.services().storage);
                assert_eq!(CustomerData::from(customer).name, "Anna Berger");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn negative_stock_delta() {
        let cli = Cli::try_parse_from(["tiredesk", "stock", "CO-0311", "-4"]).unwrap();
        match cli.command {
            Commands::Stock { delta, table, .. } => {
                assert_eq!(delta, -4);
                assert_eq!(table, Table::Central);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn unknown_table_is_rejected() {
        assert!(Cli::try_parse_from(["tiredesk", "clear", "--table", "archive"]).is_err());
    }
}
