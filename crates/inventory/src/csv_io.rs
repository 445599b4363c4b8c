//! Tabular import/export of tire records.
//!
//! Import goes through a [`RawSheet`] (header row + string cells) so CSV
//! files and XLSX workbooks share the same column mapping and validation.

use std::collections::HashMap;
use std::io::{Read, Seek};

use calamine::{Data, Reader, Xlsx};

use tiredesk_core::{DomainError, DomainResult, Money, PartNumber};

use crate::table::TireTable;
use crate::tire::{EuLabel, TireRecord};

/// Known columns, in export order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Width,
    Height,
    RimDiameter,
    Manufacturer,
    ProductLine,
    PartNumber,
    Price,
    Stock,
    FuelEfficiency,
    WetGrip,
}

impl Column {
    pub const ALL: [Column; 10] = [
        Column::Width,
        Column::Height,
        Column::RimDiameter,
        Column::Manufacturer,
        Column::ProductLine,
        Column::PartNumber,
        Column::Price,
        Column::Stock,
        Column::FuelEfficiency,
        Column::WetGrip,
    ];

    /// Header written on export.
    pub fn header(self) -> &'static str {
        match self {
            Column::Width => "width",
            Column::Height => "height",
            Column::RimDiameter => "rimDiameter",
            Column::Manufacturer => "manufacturer",
            Column::ProductLine => "productLine",
            Column::PartNumber => "partNumber",
            Column::Price => "price",
            Column::Stock => "stock",
            Column::FuelEfficiency => "fuelEfficiency",
            Column::WetGrip => "wetGrip",
        }
    }

    /// Alternative headers found in the shop's supplier lists.
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Column::Width => &["breite"],
            Column::Height => &["hoehe", "höhe", "querschnitt"],
            Column::RimDiameter => &["zoll", "rim"],
            Column::Manufacturer => &["fabrikat", "hersteller", "brand"],
            Column::ProductLine => &["profil", "model"],
            Column::PartNumber => &["teilenummer", "artikelnummer"],
            Column::Price => &["preis", "vk"],
            Column::Stock => &["bestand"],
            Column::FuelEfficiency => &["kraftstoffeffizienz"],
            Column::WetGrip => &["nasshaftung"],
        }
    }

    pub fn is_required(self) -> bool {
        !matches!(self, Column::Stock | Column::FuelEfficiency | Column::WetGrip)
    }

    fn matches(self, header: &str) -> bool {
        let header = normalize(header);
        normalize(self.header()) == header || self.aliases().iter().any(|a| normalize(a) == header)
    }
}

/// Lowercase and drop everything but letters and digits, so `Part Number`,
/// `part_number` and `partNumber` compare equal.
fn normalize(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Header row plus data rows as strings; each row carries its 1-based line
/// number in the source (header = 1).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSheet {
    pub headers: Vec<String>,
    pub rows: Vec<(usize, Vec<String>)>,
}

fn csv_error(err: csv::Error) -> DomainError {
    let row = err.position().map(|p| p.line() as usize).unwrap_or(1);
    DomainError::parse(row, err.to_string())
}

/// Read a CSV document into a [`RawSheet`].
pub fn read_csv<R: Read>(reader: R) -> DomainResult<RawSheet> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(csv_error)?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);
        rows.push((line, record.iter().map(str::to_string).collect()));
    }

    Ok(RawSheet { headers, rows })
}

/// Read the first worksheet of an XLSX workbook into a [`RawSheet`].
pub fn read_xlsx<RS: Read + Seek>(reader: RS) -> DomainResult<RawSheet> {
    let mut workbook: Xlsx<_> = Xlsx::new(reader)
        .map_err(|e: calamine::XlsxError| DomainError::parse(1, e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| DomainError::parse(1, "workbook has no worksheets"))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| DomainError::parse(1, e.to_string()))?;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .ok_or_else(|| DomainError::parse(1, "worksheet has no header row"))?
        .iter()
        .map(cell_text)
        .collect();

    let rows = rows
        .enumerate()
        .map(|(idx, cells)| (idx + 2, cells.iter().map(cell_text).collect()))
        .collect();

    Ok(RawSheet { headers, rows })
}

/// Text for one worksheet cell.
///
/// Numeric cells never carry thousands separators, so fractions are written
/// with four decimals: `89.995` must not read back as `89,995`. Whole numbers
/// lose their `.0` so widths and stock parse as integers.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Int(v) => v.to_string(),
        Data::Float(v) if v.fract() == 0.0 => format!("{v:.0}"),
        Data::Float(v) => format!("{v:.4}"),
        other => other.to_string().trim().to_string(),
    }
}

/// Map a raw sheet onto tire records.
///
/// Missing required columns are a validation error naming the column; a
/// cell that does not parse is a parse error naming the row. Fully blank rows
/// are skipped, unknown columns ignored.
pub fn parse_records(sheet: &RawSheet) -> DomainResult<TireTable> {
    let mut columns: HashMap<Column, usize> = HashMap::new();
    for column in Column::ALL {
        if let Some(idx) = sheet.headers.iter().position(|h| column.matches(h)) {
            columns.insert(column, idx);
        } else if column.is_required() {
            return Err(DomainError::validation(format!(
                "missing required column: {}",
                column.header()
            )));
        }
    }

    let mut records = Vec::with_capacity(sheet.rows.len());
    let mut first_seen: HashMap<PartNumber, usize> = HashMap::new();

    for (line, cells) in &sheet.rows {
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        let row = RowReader {
            line: *line,
            cells,
            columns: &columns,
        };
        let record = row.record()?;

        if let Some(first) = first_seen.insert(record.part_number.clone(), *line) {
            return Err(DomainError::validation(format!(
                "part number '{}' appears more than once (rows {first} and {line})",
                record.part_number
            )));
        }
        records.push(record);
    }

    Ok(TireTable::from_unique(records))
}

struct RowReader<'a> {
    line: usize,
    cells: &'a [String],
    columns: &'a HashMap<Column, usize>,
}

impl RowReader<'_> {
    fn cell(&self, column: Column) -> &str {
        self.columns
            .get(&column)
            .and_then(|idx| self.cells.get(*idx))
            .map(|s| s.trim())
            .unwrap_or("")
    }

    fn error(&self, column: Column, msg: impl core::fmt::Display) -> DomainError {
        DomainError::parse(self.line, format!("{}: {msg}", column.header()))
    }

    fn whole_number(&self, column: Column) -> DomainResult<u32> {
        let raw = self.cell(column);
        let cleaned = strip_float_suffix(raw.trim_start_matches(['R', 'r']).trim_end_matches('"'));
        if cleaned.is_empty() {
            return Err(self.error(column, "value is missing"));
        }
        cleaned
            .parse()
            .map_err(|_| self.error(column, format!("'{raw}' is not a whole number")))
    }

    fn stock(&self) -> DomainResult<Option<i64>> {
        let raw = self.cell(Column::Stock);
        let cleaned = strip_float_suffix(raw);
        if cleaned.is_empty() {
            return Ok(None);
        }
        cleaned
            .parse()
            .map(Some)
            .map_err(|_| self.error(Column::Stock, format!("'{raw}' is not a whole number")))
    }

    fn label(&self, column: Column) -> DomainResult<Option<EuLabel>> {
        match self.cell(column) {
            "" | "-" => Ok(None),
            raw => raw.parse().map(Some).map_err(|_| {
                self.error(column, format!("'{raw}' is not an EU label grade (A-G)"))
            }),
        }
    }

    fn record(&self) -> DomainResult<TireRecord> {
        let part_number = PartNumber::new(self.cell(Column::PartNumber))
            .map_err(|_| self.error(Column::PartNumber, "value is missing"))?;
        let price = Money::parse(self.cell(Column::Price)).map_err(|e| match e {
            DomainError::Validation(msg) => self.error(Column::Price, msg),
            other => other,
        })?;

        Ok(TireRecord {
            width: self.whole_number(Column::Width)?,
            height: self.whole_number(Column::Height)?,
            rim_diameter: self.whole_number(Column::RimDiameter)?,
            manufacturer: self.cell(Column::Manufacturer).to_string(),
            product_line: self.cell(Column::ProductLine).to_string(),
            part_number,
            price,
            stock: self.stock()?,
            fuel_efficiency: self.label(Column::FuelEfficiency)?,
            wet_grip: self.label(Column::WetGrip)?,
        })
    }
}

/// Spreadsheets hand back `16` as `16.0`.
fn strip_float_suffix(raw: &str) -> &str {
    let raw = raw.trim();
    raw.strip_suffix(".0").unwrap_or(raw)
}

/// Serialize records with the canonical header row.
///
/// Unknown stock and missing labels become empty cells.
pub fn write_csv(table: &TireTable) -> DomainResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(Column::ALL.map(Column::header))
        .map_err(csv_error)?;

    for record in table {
        let label = |l: Option<EuLabel>| l.map(|l| l.to_string()).unwrap_or_default();
        writer
            .write_record([
                record.width.to_string(),
                record.height.to_string(),
                record.rim_diameter.to_string(),
                record.manufacturer.clone(),
                record.product_line.clone(),
                record.part_number.to_string(),
                record.price.to_string(),
                record.stock.map(|s| s.to_string()).unwrap_or_default(),
                label(record.fuel_efficiency),
                label(record.wet_grip),
            ])
            .map_err(csv_error)?;
    }

    writer
        .into_inner()
        .map_err(|e| DomainError::validation(format!("failed to flush CSV: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = concat!(
        "width,height,rimDiameter,manufacturer,productLine,",
        "partNumber,price,stock,fuelEfficiency,wetGrip"
    );

    fn parse(csv: &str) -> DomainResult<TireTable> {
        parse_records(&read_csv(csv.as_bytes())?)
    }

    #[test]
    fn numeric_cells_keep_their_decimal_point() {
        let row = vec![
            cell_text(&Data::Float(205.0)),
            cell_text(&Data::Float(55.0)),
            cell_text(&Data::Int(16)),
            cell_text(&Data::String(" Continental ".to_string())),
            cell_text(&Data::String("PremiumContact 6".to_string())),
            cell_text(&Data::String("CT-205-16".to_string())),
            cell_text(&Data::Float(89.995)),
            cell_text(&Data::Float(4.0)),
            cell_text(&Data::Empty),
        ];
        assert_eq!(row[0], "205");
        assert_eq!(row[3], "Continental");
        assert_eq!(row[6], "89.9950");

        let sheet = RawSheet {
            headers: HEADER.split(',').map(str::to_string).collect(),
            rows: vec![(2, row)],
        };
        let parsed = parse_records(&sheet).unwrap();
        let record = &parsed.records()[0];
        assert_eq!(record.price, Money::from_cents(9_000));
        assert_eq!(record.rim_diameter, 16);
        assert_eq!(record.stock, Some(4));
        assert_eq!(record.fuel_efficiency, None);
    }

    #[test]
    fn parses_full_rows() {
        let csv = format!(
            "{HEADER}\n\
             205,55,16,Continental,PremiumContact 6,CT-205-16,89.90,12,C,B\n\
             225,40,18,Michelin,Pilot Sport 5,MI-225-18,\"139,50\",-2,,\n"
        );
        let table = parse(&csv).unwrap();
        assert_eq!(table.len(), 2);

        let first = &table.records()[0];
        assert_eq!(first.size_label(), "205/55 R16");
        assert_eq!(first.price, Money::from_cents(8_990));
        assert_eq!(first.stock, Some(12));
        assert_eq!(first.fuel_efficiency, Some(EuLabel::C));
        assert_eq!(first.wet_grip, Some(EuLabel::B));

        let second = &table.records()[1];
        assert_eq!(second.price, Money::from_cents(13_950));
        assert_eq!(second.stock, Some(-2));
        assert_eq!(second.fuel_efficiency, None);
    }

    #[test]
    fn german_headers_and_extra_columns_are_accepted() {
        let csv = "Breite;Höhe;Zoll;Fabrikat;Profil;Teilenummer;Preis;Lager-Ort\n"
            .replace(';', ",")
            + "195,65,15,Hankook,Kinergy Eco 2,HK-195-15,62.00,Regal 4\n";
        let table = parse(&csv).unwrap();
        let record = &table.records()[0];
        assert_eq!(record.manufacturer, "Hankook");
        assert_eq!(record.stock, None);
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let csv = "width,height,rimDiameter,manufacturer,productLine,partNumber,price\n\
                   205,55,16,Continental,EcoContact 6,CT-1,80\n";
        let table = parse(csv).unwrap();
        assert_eq!(table.records()[0].stock, None);
        assert_eq!(table.records()[0].wet_grip, None);
    }

    #[test]
    fn missing_required_column_is_named() {
        let csv = "width,height,rimDiameter,manufacturer,productLine,partNumber\n205,55,16,C,P,X\n";
        let err = parse(csv).unwrap_err();
        assert_eq!(err, DomainError::validation("missing required column: price"));
    }

    #[test]
    fn malformed_cell_reports_row() {
        let csv = format!("{HEADER}\n205,55,16,C,P,A,10,1,,\n205,55,16,C,P,B,zehn,1,,\n");
        let err = parse(&csv).unwrap_err();
        match err {
            DomainError::Parse { row, message } => {
                assert_eq!(row, 3);
                assert!(message.starts_with("price:"), "{message}");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn bad_label_and_missing_width_are_parse_errors() {
        let bad_label = format!("{HEADER}\n205,55,16,C,P,A,10,1,X,\n");
        assert!(matches!(
            parse(&bad_label).unwrap_err(),
            DomainError::Parse { row: 2, .. }
        ));

        let no_width = format!("{HEADER}\n,55,16,C,P,A,10,1,,\n");
        assert!(matches!(
            parse(&no_width).unwrap_err(),
            DomainError::Parse { row: 2, .. }
        ));
    }

    #[test]
    fn repeated_part_number_is_a_validation_error() {
        let csv = format!("{HEADER}\n205,55,16,C,P,A,10,,,\n205,55,16,C,P,A,12,,,\n");
        assert!(matches!(
            parse(&csv).unwrap_err(),
            DomainError::Validation(msg) if msg.contains("rows 2 and 3")
        ));
    }

    #[test]
    fn blank_rows_are_skipped_and_spreadsheet_numbers_accepted() {
        let csv = format!("{HEADER}\n,,,,,,,,,\n205.0,55,R16,C,P,A,10,3.0,,\n");
        let table = parse(&csv).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.records()[0].rim_diameter, 16);
        assert_eq!(table.records()[0].stock, Some(3));
    }

    #[test]
    fn export_writes_canonical_headers_and_empty_cells() {
        let csv = "Teilenummer,Preis,Breite,Hoehe,Zoll,Fabrikat,Profil\nA,10,205,55,16,C,P\n";
        let table = parse(csv).unwrap();
        let text = String::from_utf8(write_csv(&table).unwrap()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(HEADER));
        assert_eq!(lines.next(), Some("205,55,16,C,P,A,10.00,,,"));
    }
}
