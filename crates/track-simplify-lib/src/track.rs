//! Track representations and input shapes
//!
//! This module provides the [`GeoPoint`] value type and the closed set of input shapes
//! ([`TrackInput`]) accepted by the simplifier: a table of rows with latitude/longitude
//! columns, or a pair of parallel coordinate arrays.

use crate::{IndexSet, Result, SimplifyError};

/// A geographic position in decimal degrees
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    /// Latitude in degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180)
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new point from latitude and longitude in degrees
    #[inline]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both coordinates are neither NaN nor infinite
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Latitude within [-90, 90] and longitude within [-180, 180]
    #[inline]
    pub fn is_in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl From<(f64, f64)> for GeoPoint {
    /// Interprets the tuple as `(latitude, longitude)`
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

impl From<geo::Point<f64>> for GeoPoint {
    /// geo points store longitude as x and latitude as y
    fn from(point: geo::Point<f64>) -> Self {
        Self::new(point.y(), point.x())
    }
}

/// Reject the whole track if any point is not finite (or, with `strict_ranges`, outside
/// the valid degree ranges). The first offending point is reported.
pub(crate) fn validate_points(points: &[GeoPoint], strict_ranges: bool) -> Result<()> {
    for (index, point) in points.iter().enumerate() {
        if !point.is_finite() {
            return Err(SimplifyError::NonFiniteCoordinate {
                index,
                latitude: point.latitude,
                longitude: point.longitude,
            });
        }
        if strict_ranges && !point.is_in_range() {
            tracing::warn!(
                "Rejecting track: point {} outside degree ranges ({}, {})",
                index,
                point.latitude,
                point.longitude
            );
            return Err(SimplifyError::CoordinateOutOfRange {
                index,
                latitude: point.latitude,
                longitude: point.longitude,
            });
        }
    }
    Ok(())
}

/// A single cell of a [`Table`]
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellValue {
    Float(f64),
    Int(i64),
    Text(String),
    Bool(bool),
    Null,
}

impl CellValue {
    /// Numeric value of the cell, if it holds one
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(value) => Some(*value),
            CellValue::Int(value) => Some(*value as f64),
            _ => None,
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

/// A table of rows sharing a fixed set of named columns
///
/// Rows keep their insertion order. Every row has exactly one cell per column.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawTable")
)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

/// Deserialized form of a [`Table`], before the row widths are checked
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawTable> for Table {
    type Error = SimplifyError;

    fn try_from(raw: RawTable) -> Result<Self> {
        Table::from_rows(raw.columns, raw.rows)
    }
}

impl Table {
    /// Create an empty table with the given column names
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Create a table from column names and rows
    ///
    /// # Returns
    /// The table, or [`SimplifyError::SchemaMismatch`] if a row width differs from the
    /// number of columns
    pub fn from_rows<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        rows: Vec<Vec<CellValue>>,
    ) -> Result<Self> {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Append a row at the end of the table
    pub fn push_row(&mut self, row: Vec<CellValue>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(SimplifyError::SchemaMismatch(format!(
                "row {} has {} cells, table has {} columns",
                self.rows.len(),
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Column names, in table order
    #[inline]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows, in insertion order
    #[inline]
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Number of rows
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name
    #[inline]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Get a cell by row index and column name
    pub fn get(&self, row: usize, column: &str) -> Option<&CellValue> {
        let column = self.column_index(column)?;
        self.rows.get(row)?.get(column)
    }

    /// Read the coordinate columns as a track
    fn geo_points(&self, latitude_column: &str, longitude_column: &str) -> Result<Vec<GeoPoint>> {
        let lat_idx = self.required_column(latitude_column)?;
        let lon_idx = self.required_column(longitude_column)?;

        self.rows
            .iter()
            .enumerate()
            .map(|(row_idx, row)| {
                let latitude = Self::numeric_cell(row, lat_idx, row_idx, latitude_column)?;
                let longitude = Self::numeric_cell(row, lon_idx, row_idx, longitude_column)?;
                Ok(GeoPoint::new(latitude, longitude))
            })
            .collect()
    }

    fn required_column(&self, name: &str) -> Result<usize> {
        self.column_index(name).ok_or_else(|| {
            SimplifyError::SchemaMismatch(format!("table must contain a '{}' column", name))
        })
    }

    fn numeric_cell(row: &[CellValue], column: usize, row_idx: usize, name: &str) -> Result<f64> {
        row.get(column)
            .and_then(CellValue::as_f64)
            .ok_or_else(|| {
                SimplifyError::SchemaMismatch(format!(
                    "column '{}' is not numeric at row {}",
                    name, row_idx
                ))
            })
    }

    /// Keep only the selected rows; the column set is unchanged
    fn select_rows(&self, indices: &IndexSet) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: indices.select(&self.rows),
        }
    }
}

/// The shapes a track can be supplied in
///
/// [`crate::simplify`] returns the same variant it was given.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrackInput {
    /// Rows exposing latitude and longitude columns, plus any other columns
    Tabular(Table),
    /// Parallel arrays of latitudes and longitudes
    ParallelArrays {
        latitudes: Vec<f64>,
        longitudes: Vec<f64>,
    },
}

impl TrackInput {
    /// Build the parallel-array variant
    pub fn parallel(latitudes: Vec<f64>, longitudes: Vec<f64>) -> Self {
        TrackInput::ParallelArrays {
            latitudes,
            longitudes,
        }
    }

    /// Number of points (rows, or latitude entries)
    pub fn len(&self) -> usize {
        match self {
            TrackInput::Tabular(table) => table.len(),
            TrackInput::ParallelArrays { latitudes, .. } => latitudes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Extract the track, checking the shape-specific schema
    pub(crate) fn geo_points(
        &self,
        latitude_column: &str,
        longitude_column: &str,
    ) -> Result<Vec<GeoPoint>> {
        match self {
            TrackInput::Tabular(table) => table.geo_points(latitude_column, longitude_column),
            TrackInput::ParallelArrays {
                latitudes,
                longitudes,
            } => {
                if latitudes.len() != longitudes.len() {
                    return Err(SimplifyError::SchemaMismatch(format!(
                        "{} latitudes but {} longitudes",
                        latitudes.len(),
                        longitudes.len()
                    )));
                }
                Ok(latitudes
                    .iter()
                    .zip(longitudes)
                    .map(|(&lat, &lon)| GeoPoint::new(lat, lon))
                    .collect())
            }
        }
    }

    /// Re-index the original input, keeping its shape
    pub(crate) fn select(&self, indices: &IndexSet) -> Self {
        match self {
            TrackInput::Tabular(table) => TrackInput::Tabular(table.select_rows(indices)),
            TrackInput::ParallelArrays {
                latitudes,
                longitudes,
            } => TrackInput::ParallelArrays {
                latitudes: indices.select(latitudes),
                longitudes: indices.select(longitudes),
            },
        }
    }
}

impl From<Table> for TrackInput {
    fn from(table: Table) -> Self {
        TrackInput::Tabular(table)
    }
}
