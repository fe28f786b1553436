//! Tabular frame codec (CSV with header row, no index column).

use super::{Codec, DecodeHint};
use crate::payload::Payload;
use crate::{Result, StorageError};
use std::fmt;

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	Null,
	Bool(bool),
	Int(i64),
	Float(f64),
	Str(String),
}

impl Value {
	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	/// CSV cell text for this value.
	fn to_cell(&self) -> String {
		match self {
			Value::Null => String::new(),
			Value::Bool(true) => "True".to_string(),
			Value::Bool(false) => "False".to_string(),
			Value::Int(n) => n.to_string(),
			// Keep a fractional part so integral floats read back as floats.
			Value::Float(x) if x.is_finite() && x.fract() == 0.0 => format!("{:.1}", x),
			Value::Float(x) => x.to_string(),
			Value::Str(s) => s.clone(),
		}
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_cell())
	}
}

impl From<i64> for Value {
	fn from(n: i64) -> Self {
		Value::Int(n)
	}
}

impl From<i32> for Value {
	fn from(n: i32) -> Self {
		Value::Int(n.into())
	}
}

impl From<f64> for Value {
	fn from(x: f64) -> Self {
		Value::Float(x)
	}
}

impl From<bool> for Value {
	fn from(b: bool) -> Self {
		Value::Bool(b)
	}
}

impl From<&str> for Value {
	fn from(s: &str) -> Self {
		Value::Str(s.to_string())
	}
}

impl From<String> for Value {
	fn from(s: String) -> Self {
		Value::Str(s)
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(value: Option<T>) -> Self {
		value.map_or(Value::Null, Into::into)
	}
}

/// Column-labelled table stored row-major.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
	columns: Vec<String>,
	rows: Vec<Vec<Value>>,
}

impl Frame {
	/// Empty frame with the given column labels.
	pub fn new<I, S>(columns: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			columns: columns.into_iter().map(Into::into).collect(),
			rows: Vec::new(),
		}
	}

	/// Build a frame from named columns of equal length.
	///
	/// # Examples
	///
	/// ```
	/// use storage_adapter::{Frame, Value};
	///
	/// let frame = Frame::from_columns(vec![
	///     ("a", vec![Value::Int(1), Value::Int(2)]),
	///     ("b", vec![Value::from("x"), Value::from("y")]),
	/// ])
	/// .unwrap();
	/// assert_eq!(frame.len(), 2);
	/// ```
	pub fn from_columns<S: Into<String>>(columns: Vec<(S, Vec<Value>)>) -> Result<Self> {
		let height = columns.first().map_or(0, |(_, values)| values.len());
		let mut names = Vec::with_capacity(columns.len());
		let mut data = Vec::with_capacity(columns.len());

		for (name, values) in columns {
			let name = name.into();
			if values.len() != height {
				return Err(StorageError::UnsupportedPayload(format!(
					"column {} has {} values, expected {}",
					name,
					values.len(),
					height
				)));
			}
			names.push(name);
			data.push(values.into_iter());
		}

		let rows = (0..height)
			.map(|_| data.iter_mut().filter_map(|column| column.next()).collect())
			.collect();

		Ok(Self {
			columns: names,
			rows,
		})
	}

	/// Append a row.
	///
	/// # Errors
	///
	/// Returns `` `StorageError::UnsupportedPayload` `` if the row width does
	/// not match the column count.
	pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
		if row.len() != self.columns.len() {
			return Err(StorageError::UnsupportedPayload(format!(
				"row has {} values, frame has {} columns",
				row.len(),
				self.columns.len()
			)));
		}
		self.rows.push(row);
		Ok(())
	}

	pub fn columns(&self) -> &[String] {
		&self.columns
	}

	pub fn rows(&self) -> &[Vec<Value>] {
		&self.rows
	}

	/// Values of the named column, top to bottom.
	pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
		let index = self.columns.iter().position(|c| c == name)?;
		Some(self.rows.iter().map(|row| &row[index]).collect())
	}

	/// Number of rows.
	pub fn len(&self) -> usize {
		self.rows.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}

	/// Column types taken from the first non-null value of each column.
	///
	/// All-null columns are reported as [`ColumnType::Str`].
	pub fn schema(&self) -> Vec<ColumnType> {
		(0..self.columns.len())
			.map(|index| {
				self.rows
					.iter()
					.find_map(|row| row.get(index).and_then(ColumnType::of))
					.unwrap_or(ColumnType::Str)
			})
			.collect()
	}
}

/// A single named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
	name: String,
	values: Vec<Value>,
}

impl Series {
	pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
		Self {
			name: name.into(),
			values,
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn values(&self) -> &[Value] {
		&self.values
	}

	/// One-column frame labelled with the series name.
	pub fn into_frame(self) -> Frame {
		Frame {
			columns: vec![self.name],
			rows: self.values.into_iter().map(|value| vec![value]).collect(),
		}
	}
}

/// Declared or inferred type of a table column.
///
/// Empty cells decode as [`Value::Null`] whatever the column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
	Bool,
	Int,
	Float,
	Str,
}

impl ColumnType {
	/// Type of a non-null value, `None` for [`Value::Null`].
	pub fn of(value: &Value) -> Option<Self> {
		match value {
			Value::Null => None,
			Value::Bool(_) => Some(ColumnType::Bool),
			Value::Int(_) => Some(ColumnType::Int),
			Value::Float(_) => Some(ColumnType::Float),
			Value::Str(_) => Some(ColumnType::Str),
		}
	}
}

fn parse_bool(cell: &str) -> Option<bool> {
	match cell {
		"True" | "true" | "TRUE" => Some(true),
		"False" | "false" | "FALSE" => Some(false),
		_ => None,
	}
}

fn infer_column(cells: &[&str]) -> ColumnType {
	let present: Vec<&str> = cells.iter().copied().filter(|c| !c.is_empty()).collect();
	if present.is_empty() {
		ColumnType::Str
	} else if present.iter().all(|c| c.parse::<i64>().is_ok()) {
		ColumnType::Int
	} else if present.iter().all(|c| c.parse::<f64>().is_ok()) {
		ColumnType::Float
	} else if present.iter().all(|c| parse_bool(c).is_some()) {
		ColumnType::Bool
	} else {
		ColumnType::Str
	}
}

fn parse_cell(cell: &str, column_type: ColumnType) -> Result<Value> {
	if cell.is_empty() {
		return Ok(Value::Null);
	}
	let value = match column_type {
		ColumnType::Int => cell.parse().ok().map(Value::Int),
		ColumnType::Float => cell.parse().ok().map(Value::Float),
		ColumnType::Bool => parse_bool(cell).map(Value::Bool),
		ColumnType::Str => Some(Value::Str(cell.to_string())),
	};
	value.ok_or_else(|| {
		StorageError::CodecError(format!("cell {:?} is not a valid {:?}", cell, column_type))
	})
}

/// CSV codec for [`Frame`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TableCodec;

impl TableCodec {
	pub fn encode_frame(&self, frame: &Frame) -> Result<Vec<u8>> {
		let mut writer = csv::Writer::from_writer(Vec::new());
		writer.write_record(&frame.columns)?;
		for row in &frame.rows {
			writer.write_record(row.iter().map(Value::to_cell))?;
		}
		writer
			.into_inner()
			.map_err(|e| StorageError::CodecError(e.to_string()))
	}

	/// Parse CSV with a header row, inferring one type per column.
	///
	/// Inference tries Int, Float, Bool ("True"/"False") and falls back to
	/// Str, so a text column of digits reads back as integers. Use
	/// [`TableCodec::decode_frame_with_schema`] when the column types are
	/// known.
	///
	/// # Errors
	///
	/// Returns `` `StorageError::CodecError` `` for empty input, ragged rows
	/// or invalid UTF-8.
	pub fn decode_frame(&self, bytes: &[u8]) -> Result<Frame> {
		self.parse(bytes, None)
	}

	/// Parse CSV with a header row into columns of the given types.
	///
	/// # Errors
	///
	/// Returns `` `StorageError::CodecError` `` if the schema width differs
	/// from the header or a cell does not parse as its column type.
	pub fn decode_frame_with_schema(&self, bytes: &[u8], schema: &[ColumnType]) -> Result<Frame> {
		self.parse(bytes, Some(schema))
	}

	fn parse(&self, bytes: &[u8], schema: Option<&[ColumnType]>) -> Result<Frame> {
		let mut reader = csv::ReaderBuilder::new()
			.has_headers(true)
			.from_reader(bytes);

		let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
		if columns.is_empty() {
			return Err(StorageError::CodecError(
				"no columns to parse from input".to_string(),
			));
		}

		let records = reader
			.records()
			.collect::<std::result::Result<Vec<csv::StringRecord>, csv::Error>>()?;

		let column_types: Vec<ColumnType> = match schema {
			Some(schema) if schema.len() != columns.len() => {
				return Err(StorageError::CodecError(format!(
					"schema has {} columns, input has {}",
					schema.len(),
					columns.len()
				)));
			}
			Some(schema) => schema.to_vec(),
			None => (0..columns.len())
				.map(|index| {
					let cells: Vec<&str> = records
						.iter()
						.map(|record| record.get(index).unwrap_or(""))
						.collect();
					infer_column(&cells)
				})
				.collect(),
		};

		let rows = records
			.iter()
			.map(|record| {
				record
					.iter()
					.zip(&column_types)
					.map(|(cell, column_type)| parse_cell(cell, *column_type))
					.collect::<Result<Vec<Value>>>()
			})
			.collect::<Result<Vec<Vec<Value>>>>()?;

		Ok(Frame { columns, rows })
	}
}

impl Codec for TableCodec {
	fn encode(&self, payload: &Payload) -> Result<Vec<u8>> {
		match payload {
			Payload::Table(frame) => self.encode_frame(frame),
			other => Err(StorageError::UnsupportedPayload(format!(
				"table codec cannot encode {}",
				other.kind()
			))),
		}
	}

	fn decode(&self, bytes: &[u8], hint: DecodeHint) -> Result<Payload> {
		let frame = match hint {
			DecodeHint::Table(schema) => self.decode_frame_with_schema(bytes, &schema),
			_ => self.decode_frame(bytes),
		};
		frame.map(Payload::Table)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn roundtrip(frame: &Frame) -> Frame {
		let codec = TableCodec;
		let bytes = codec.encode_frame(frame).unwrap();
		codec.decode_frame(&bytes).unwrap()
	}

	#[rstest]
	fn test_encode_has_header_and_no_index() {
		let frame = Frame::from_columns(vec![("a", vec![Value::Int(1), Value::Int(2)])]).unwrap();

		let bytes = TableCodec.encode_frame(&frame).unwrap();

		assert_eq!(String::from_utf8(bytes).unwrap(), "a\n1\n2\n");
	}

	#[rstest]
	fn test_mixed_roundtrip() {
		let frame = Frame::from_columns(vec![
			("id", vec![Value::Int(1), Value::Int(-2), Value::Int(3)]),
			(
				"score",
				vec![Value::Float(0.5), Value::Float(2.0), Value::Null],
			),
			(
				"label",
				vec![Value::from("cat"), Value::from("dog, big"), Value::from("\"q\"")],
			),
			(
				"ok",
				vec![Value::Bool(true), Value::Bool(false), Value::Bool(true)],
			),
		])
		.unwrap();

		assert_eq!(roundtrip(&frame), frame);
	}

	#[rstest]
	fn test_header_only_roundtrip() {
		let frame = Frame::new(["a", "b"]);

		let decoded = roundtrip(&frame);

		assert_eq!(decoded.columns(), &["a".to_string(), "b".to_string()]);
		assert!(decoded.is_empty());
	}

	#[rstest]
	fn test_integral_float_stays_float() {
		let frame = Frame::from_columns(vec![("x", vec![Value::Float(1.0), Value::Float(3.0)])])
			.unwrap();

		let bytes = TableCodec.encode_frame(&frame).unwrap();

		assert_eq!(String::from_utf8(bytes.clone()).unwrap(), "x\n1.0\n3.0\n");
		assert_eq!(TableCodec.decode_frame(&bytes).unwrap(), frame);
	}

	#[rstest]
	#[case("a\n1\n2.5\n", Value::Float(1.0))]
	#[case("a\n1\nx\n", Value::from("1"))]
	#[case("a\nTrue\nFalse\n", Value::Bool(true))]
	#[case("a,b\n,1\n7,2\n", Value::Null)]
	fn test_column_inference(#[case] csv: &str, #[case] first: Value) {
		let frame = TableCodec.decode_frame(csv.as_bytes()).unwrap();
		assert_eq!(frame.rows()[0][0], first);
	}

	#[rstest]
	fn test_schema_keeps_numeric_looking_strings() {
		let frame = Frame::from_columns(vec![
			("id", vec![Value::from("007"), Value::from("42")]),
			("flag", vec![Value::from("True"), Value::from("1.5")]),
			("n", vec![Value::Int(7), Value::Null]),
		])
		.unwrap();
		let bytes = TableCodec.encode_frame(&frame).unwrap();

		let decoded = TableCodec
			.decode_frame_with_schema(&bytes, &frame.schema())
			.unwrap();

		assert_eq!(decoded, frame);
		// Inference alone reads the digits back as integers
		assert_eq!(
			TableCodec.decode_frame(&bytes).unwrap().rows()[0][0],
			Value::Int(7)
		);
	}

	#[rstest]
	fn test_schema_via_decode_hint() {
		let bytes = b"zip\n01234\n";

		let payload = TableCodec
			.decode(bytes, DecodeHint::Table(vec![ColumnType::Str]))
			.unwrap();

		assert_eq!(
			payload,
			Payload::Table(
				Frame::from_columns(vec![("zip", vec![Value::from("01234")])]).unwrap()
			)
		);
	}

	#[rstest]
	#[case(b"a,b\n1,2\n".as_slice(), vec![ColumnType::Int])]
	#[case(b"a\nx\n".as_slice(), vec![ColumnType::Int])]
	fn test_schema_mismatch_is_codec_error(#[case] bytes: &[u8], #[case] schema: Vec<ColumnType>) {
		assert!(matches!(
			TableCodec.decode_frame_with_schema(bytes, &schema),
			Err(StorageError::CodecError(_))
		));
	}

	#[rstest]
	fn test_schema_from_first_non_null() {
		let frame = Frame::from_columns(vec![
			("a", vec![Value::Null, Value::Float(1.5)]),
			("b", vec![Value::Null, Value::Null]),
		])
		.unwrap();

		assert_eq!(frame.schema(), vec![ColumnType::Float, ColumnType::Str]);
	}

	#[rstest]
	fn test_empty_input_is_codec_error() {
		assert!(matches!(
			TableCodec.decode_frame(b""),
			Err(StorageError::CodecError(_))
		));
	}

	#[rstest]
	fn test_ragged_rows_are_codec_error() {
		assert!(matches!(
			TableCodec.decode_frame(b"a,b\n1,2\n3\n"),
			Err(StorageError::CodecError(_))
		));
	}

	#[rstest]
	fn test_from_columns_rejects_uneven_lengths() {
		let result = Frame::from_columns(vec![
			("a", vec![Value::Int(1)]),
			("b", vec![Value::Int(1), Value::Int(2)]),
		]);
		assert!(matches!(result, Err(StorageError::UnsupportedPayload(_))));
	}

	#[rstest]
	fn test_push_row_checks_width() {
		let mut frame = Frame::new(["a", "b"]);
		assert!(frame.push_row(vec![Value::Int(1), Value::Int(2)]).is_ok());
		assert!(frame.push_row(vec![Value::Int(1)]).is_err());
		assert_eq!(frame.len(), 1);
	}

	#[rstest]
	fn test_series_into_frame() {
		let series = Series::new("scores", vec![Value::Int(3), Value::Int(4)]);

		let frame = series.into_frame();

		assert_eq!(frame.columns(), &["scores".to_string()]);
		assert_eq!(
			frame.column("scores"),
			Some(vec![&Value::Int(3), &Value::Int(4)])
		);
	}
}
