//! # Table module
//!
//! In-memory tables and their delimited-text representation.
//!
//! ## Types
//!
//! - [`Field`]: One typed cell.
//! - [`Table`]: Input table, a header and rows of [`Field`]s.
//! - [`EmbeddedRow`]: Output row, passthrough fields followed by an [`Embedding`].
//! - [`EmbeddedTable`]: Output table.
//!
//! ## Typing
//!
//! Cells are read as text and typed per column afterwards. Cells matching one of [`MISSING_MARKERS`] become [`Field::Missing`]. A column whose present cells all parse as integers is an integer column, else as floats a float column, else as `True`/`False` a boolean column; any other column is a text column.
//!
//! ## Rendering
//!
//! [`Field::Missing`] is rendered as a placeholder (`NaN` by default). Floats always carry a fractional part or an exponent, e.g. `2.0`, `0.125`, `1e-05`.

use super::{Embedding, ReadError};
use std::{
    collections::HashMap,
    fmt::{Display, LowerExp},
    fs::File,
    io::{Read, Write},
    path::Path,
};

/// Cell values treated as missing when reading.
pub const MISSING_MARKERS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// One typed cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// Absent value.
    Missing,
    /// Boolean value.
    Boolean(bool),
    /// Integer value.
    Integer(i64),
    /// Floating point value.
    Float(f64),
    /// String value.
    Text(String),
}

impl Field {
    /// The string value, if this is a [`Text`](Field::Text) field.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Render the field, writing `na_rep` for [`Missing`](Field::Missing).
    #[must_use]
    pub fn render(&self, na_rep: &str) -> String {
        match self {
            Self::Missing => na_rep.to_owned(),
            Self::Boolean(true) => "True".to_owned(),
            Self::Boolean(false) => "False".to_owned(),
            Self::Integer(value) => value.to_string(),
            Self::Float(value) => format_float(*value),
            Self::Text(text) => text.clone(),
        }
    }
}

impl From<&str> for Field {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<i64> for Field {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Field {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Input table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Field>>,
}

impl Table {
    /// Build a table from a header and rows.
    ///
    /// # Panics
    ///
    /// Panics if a row does not have as many fields as there are columns.
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Field>>) -> Self {
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(
                row.len(),
                columns.len(),
                "Row {} has {} fields, expected {}",
                i + 1,
                row.len(),
                columns.len()
            );
        }
        Self { columns, rows }
    }

    /// Read a delimited file fully into memory.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::Csv`] if the file cannot be opened or parsed, or [`ReadError::Empty`] if it has no header.
    pub fn read_csv<T: AsRef<Path>>(path: T, delimiter: u8) -> Result<Self, ReadError> {
        let file = File::open(path).map_err(csv::Error::from)?;
        Self::from_reader(file, delimiter)
    }

    /// Read delimited text fully into memory.
    ///
    /// # Errors
    ///
    /// See [`read_csv`](Table::read_csv).
    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self, ReadError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .from_reader(reader);

        let headers = reader.headers()?;
        if headers.is_empty() {
            return Err(ReadError::Empty);
        }
        let columns = dedup_columns(headers.iter());

        let raw = reader
            .records()
            .collect::<Result<Vec<_>, _>>()?;
        let kinds: Vec<_> = (0..columns.len())
            .map(|i| Kind::infer(raw.iter().filter_map(|record| record.get(i))))
            .collect();
        let rows = raw
            .iter()
            .map(|record| {
                record
                    .iter()
                    .zip(&kinds)
                    .map(|(cell, kind)| kind.field(cell))
                    .collect()
            })
            .collect();

        Ok(Self { columns, rows })
    }

    /// Column names, in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows, in order.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Field>] {
        &self.rows
    }

    /// Position of the column called `name`.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Output row.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedRow {
    /// Input fields, text field removed.
    pub fields: Vec<Field>,
    /// Embedding of the text field.
    pub embedding: Embedding,
}

/// Output table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EmbeddedTable {
    columns: Vec<String>,
    rows: Vec<EmbeddedRow>,
}

/// Options for writing an [`EmbeddedTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Placeholder for missing values.
    pub na_rep: String,
    /// Field delimiter.
    pub delimiter: u8,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            na_rep: "NaN".to_owned(),
            delimiter: b',',
        }
    }
}

impl EmbeddedTable {
    /// Create an empty table with the full output header.
    #[must_use]
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row.
    pub fn push(&mut self, row: EmbeddedRow) {
        debug_assert_eq!(
            row.fields.len() + row.embedding.dimension(),
            self.columns.len()
        );
        self.rows.push(row);
    }

    /// Column names, passthrough columns first.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows, in order.
    #[must_use]
    pub fn rows(&self) -> &[EmbeddedRow] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write the table to a file, creating or truncating it.
    ///
    /// # Errors
    ///
    /// Returns a [CSV error](csv::Error) if the file cannot be created or written.
    pub fn write_csv<T: AsRef<Path>>(&self, path: T, options: &WriteOptions) -> Result<(), csv::Error> {
        let file = File::create(path)?;
        self.to_writer(file, options)
    }

    /// Write the table to any writer. The header is written even if there are no rows.
    ///
    /// # Errors
    ///
    /// Returns a [CSV error](csv::Error) if writing fails.
    pub fn to_writer<W: Write>(&self, writer: W, options: &WriteOptions) -> Result<(), csv::Error> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .from_writer(writer);

        writer.write_record(&self.columns)?;
        for row in &self.rows {
            let fields = row.fields.iter().map(|field| field.render(&options.na_rep));
            let values = row.embedding.iter().map(|value| format_float(*value));
            writer.write_record(fields.chain(values))?;
        }
        writer.flush()?;

        Ok(())
    }
}

/// Column type, decided after reading all cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Integer,
    Float,
    Boolean,
    Text,
}

impl Kind {
    fn infer<'a>(cells: impl Iterator<Item = &'a str>) -> Self {
        let (mut integer, mut float, mut boolean) = (true, true, true);
        let mut gaps = false;
        for cell in cells {
            if is_missing(cell) {
                gaps = true;
                continue;
            }
            integer = integer && cell.parse::<i64>().is_ok();
            float = float && cell.parse::<f64>().is_ok();
            boolean = boolean && parse_bool(cell).is_some();
            if !(integer || float || boolean) {
                return Self::Text;
            }
        }

        // Integers have no missing value, so a column with gaps is read as floats
        if integer && !gaps {
            Self::Integer
        } else if float {
            Self::Float
        } else if boolean {
            Self::Boolean
        } else {
            Self::Text
        }
    }

    /// Convert a cell of a column of this kind. Inference guarantees parsing succeeds.
    fn field(self, cell: &str) -> Field {
        if is_missing(cell) {
            return Field::Missing;
        }
        let parsed = match self {
            Self::Integer => cell.parse().ok().map(Field::Integer),
            Self::Float => cell.parse().ok().map(Field::Float),
            Self::Boolean => parse_bool(cell).map(Field::Boolean),
            Self::Text => None,
        };
        parsed.unwrap_or_else(|| Field::Text(cell.to_owned()))
    }
}

fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell)
}

fn parse_bool(cell: &str) -> Option<bool> {
    match cell {
        "True" | "TRUE" | "true" => Some(true),
        "False" | "FALSE" | "false" => Some(false),
        _ => None,
    }
}

/// Disambiguate repeated header names as `name.1`, `name.2`, ...
fn dedup_columns<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut columns = Vec::new();

    for name in headers {
        let mut column = name.to_owned();
        let mut count = counts.get(&column).copied().unwrap_or(0);
        while count > 0 {
            counts.insert(column.clone(), count + 1);
            column = format!("{column}.{count}");
            count = counts.get(&column).copied().unwrap_or(0);
        }
        counts.insert(column.clone(), count + 1);
        columns.push(column);
    }

    columns
}

/// Shortest round-trip rendering, always with a fractional part or an exponent.
fn format_float<T>(value: T) -> String
where
    T: Copy + Into<f64> + Display + LowerExp,
{
    let wide: f64 = value.into();
    if wide.is_nan() {
        return "nan".to_owned();
    }
    if wide.is_infinite() {
        return if wide > 0.0 { "inf" } else { "-inf" }.to_owned();
    }

    let magnitude = wide.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let scientific = format!("{value:e}");
        let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
        let (sign, digits) = exponent
            .strip_prefix('-')
            .map_or(("+", exponent), |digits| ("-", digits));
        format!("{mantissa}e{sign}{digits:0>2}")
    } else {
        let plain = value.to_string();
        if plain.contains('.') {
            plain
        } else {
            format!("{plain}.0")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(content: &str) -> Result<Table, ReadError> {
        Table::from_reader(content.as_bytes(), b',')
    }

    fn names(columns: &[&str]) -> Vec<String> {
        columns.iter().map(|&column| column.to_owned()).collect()
    }

    #[test]
    fn column_typing() {
        let table = read(
            "id,score,flag,Text\n\
             1,0.5,True,hello\n\
             2,,false,42\n\
             3,1e3,TRUE,\n",
        )
        .unwrap();

        assert_eq!(table.columns(), names(&["id", "score", "flag", "Text"]));
        assert_eq!(table.len(), 3);
        assert_eq!(
            table.rows()[0],
            [
                Field::Integer(1),
                Field::Float(0.5),
                Field::Boolean(true),
                Field::from("hello"),
            ]
        );
        // A text column keeps numeric-looking cells as text
        assert_eq!(
            table.rows()[1],
            [
                Field::Integer(2),
                Field::Missing,
                Field::Boolean(false),
                Field::from("42"),
            ]
        );
        assert_eq!(table.rows()[2][1], Field::Float(1000.0));
        assert_eq!(table.rows()[2][3], Field::Missing);
    }

    #[test]
    fn numeric_text_column() {
        let table = read("Text,id\n42,1\n3.5,2\n").unwrap();
        assert_eq!(table.rows()[0][0], Field::Float(42.0));
        assert_eq!(table.rows()[1][0], Field::Float(3.5));
        assert!(table.rows().iter().all(|row| row[0].as_text().is_none()));
    }

    #[test]
    fn integer_column_with_gaps() {
        let table = read("Text,id,count\nhello,1,7\nworld,,8\n").unwrap();
        assert_eq!(table.rows()[0][1], Field::Float(1.0));
        assert_eq!(table.rows()[1][1], Field::Missing);
        assert_eq!(table.rows()[0][2], Field::Integer(7));
        assert_eq!(table.rows()[0][1].render("NaN"), "1.0");
    }

    #[test]
    fn missing_markers() {
        let table = read("Text\nNaN\nNA\nnull\nN/A\nactual\n").unwrap();
        let missing = table
            .rows()
            .iter()
            .filter(|row| row[0] == Field::Missing)
            .count();
        assert_eq!(missing, 4);
        assert_eq!(table.rows()[4][0], Field::from("actual"));
    }

    #[test]
    fn duplicate_columns() {
        let table = read("a,b,a,a,a.1\n1,2,3,4,5\n").unwrap();
        assert_eq!(
            table.columns(),
            names(&["a", "b", "a.1", "a.2", "a.1.1"])
        );
        assert_eq!(table.column_index("a.2"), Some(3));
    }

    #[test]
    fn header_only() {
        let table = read("id,Text\n").unwrap();
        assert_eq!(table.columns(), names(&["id", "Text"]));
        assert!(table.is_empty());
    }

    #[test]
    fn empty_input() {
        assert!(matches!(read(""), Err(ReadError::Empty)));
    }

    #[test]
    fn ragged_rows() {
        assert!(matches!(read("a,b\n1,2\n3\n"), Err(ReadError::Csv(_))));
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        assert!(matches!(Table::read_csv(path, b','), Err(ReadError::Csv(_))));
    }

    #[test]
    fn tab_delimited() {
        let table = Table::from_reader("id\tText\n1\thello, world\n".as_bytes(), b'\t').unwrap();
        assert_eq!(table.rows()[0][1], Field::from("hello, world"));
    }

    #[test]
    fn float_rendering() {
        assert_eq!(format_float(2.0_f64), "2.0");
        assert_eq!(format_float(-0.0_f64), "-0.0");
        assert_eq!(format_float(0.5_f64), "0.5");
        assert_eq!(format_float(0.1_f32), "0.1");
        assert_eq!(format_float(1e-5_f32), "1e-05");
        assert_eq!(format_float(1.5e20_f64), "1.5e+20");
        assert_eq!(format_float(1e16_f64), "1e+16");
        assert_eq!(format_float(0.0001_f64), "0.0001");
        assert_eq!(format_float(f64::INFINITY), "inf");
    }

    #[test]
    fn float_rendering_round_trips() {
        for value in [0.123_456_78_f32, -0.031_25, 7.0, 3.3e-7, 12_345.678] {
            let rendered = format_float(value);
            assert_eq!(rendered.parse::<f32>().unwrap(), value, "{rendered}");
        }
    }

    #[test]
    fn write_with_placeholder() {
        let mut table = EmbeddedTable::new(names(&["id", "note", "E_1", "E_2"]));
        table.push(EmbeddedRow {
            fields: vec![Field::Integer(1), Field::Missing],
            embedding: Embedding::with_dimension(vec![0.25, -1.0], 2).unwrap(),
        });
        table.push(EmbeddedRow {
            fields: vec![Field::Integer(2), Field::from("a, b")],
            embedding: Embedding::with_dimension(vec![1e-5, 3.0], 2).unwrap(),
        });

        let mut buffer = Vec::new();
        table.to_writer(&mut buffer, &WriteOptions::default()).unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "id,note,E_1,E_2\n1,NaN,0.25,-1.0\n2,\"a, b\",1e-05,3.0\n"
        );
    }

    #[test]
    fn write_header_only() {
        let table = EmbeddedTable::new(names(&["id", "E_1"]));
        let options = WriteOptions {
            na_rep: "NA".to_owned(),
            delimiter: b';',
        };

        let mut buffer = Vec::new();
        table.to_writer(&mut buffer, &options).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "id,E_1\n".replace(',', ";"));
    }

    #[test]
    fn render_fields() {
        assert_eq!(Field::Missing.render("NaN"), "NaN");
        assert_eq!(Field::Boolean(false).render("NaN"), "False");
        assert_eq!(Field::Integer(-3).render("NaN"), "-3");
        assert_eq!(Field::Float(3.0).render("NaN"), "3.0");
        assert_eq!(Field::from("x").render("NaN"), "x");
    }
}
