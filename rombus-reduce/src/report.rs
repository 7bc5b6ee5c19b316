use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

/// Aggregated per-dimension results of an error or speed-up analysis.
///
/// Values are recorded per `(column, N)` cell, one value per testing-set
/// point, and summarized as min/mean/max over the cell.
/// `N` is the reduced dimension the row was evaluated at.
///
/// # Examples
///
/// ```
/// use rombus_reduce::AnalysisTable;
///
/// let mut table = AnalysisTable::new("error_analysis");
/// table.record("error_u", 1, 0.5);
/// table.record("error_u", 1, 0.3);
///
/// assert_eq!(table.mean("error_u", 1), Some(0.4));
/// assert_eq!(table.max("error_u", 1), Some(0.5));
/// ```
#[derive(Debug, Clone, Default)]
pub struct AnalysisTable {
    name: String,
    cells: BTreeMap<String, BTreeMap<usize, Vec<f64>>>,
}

impl AnalysisTable {
    /// Creates an empty table titled `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
        }
    }

    /// The table's title.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends one sample `value` to the `(column, n)` cell.
    pub fn record(&mut self, column: &str, n: usize, value: f64) {
        self.cells
            .entry(column.to_owned())
            .or_default()
            .entry(n)
            .or_default()
            .push(value);
    }

    /// The smallest value recorded in the `(column, n)` cell.
    #[must_use]
    pub fn min(&self, column: &str, n: usize) -> Option<f64> {
        self.values(column, n)?
            .iter()
            .copied()
            .reduce(f64::min)
    }

    /// The mean of the values recorded in the `(column, n)` cell.
    #[must_use]
    pub fn mean(&self, column: &str, n: usize) -> Option<f64> {
        let values = self.values(column, n)?;
        (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
    }

    /// The largest value recorded in the `(column, n)` cell.
    #[must_use]
    pub fn max(&self, column: &str, n: usize) -> Option<f64> {
        self.values(column, n)?
            .iter()
            .copied()
            .reduce(f64::max)
    }

    /// The recorded column names, in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    /// Every reduced dimension any column has a cell for.
    #[must_use]
    pub fn dimensions(&self) -> BTreeSet<usize> {
        self.cells
            .values()
            .flat_map(|rows| rows.keys().copied())
            .collect()
    }

    fn values(&self, column: &str, n: usize) -> Option<&Vec<f64>> {
        self.cells.get(column)?.get(&n)
    }
}

impl fmt::Display for AnalysisTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        write!(f, "{:>6}", "N")?;
        for column in self.columns() {
            write!(f, "  {column:>14}(min)  {column:>13}(mean)  {column:>14}(max)")?;
        }
        writeln!(f)?;

        for n in self.dimensions() {
            write!(f, "{n:>6}")?;
            for column in self.cells.keys() {
                for aggregate in [
                    self.min(column, n),
                    self.mean(column, n),
                    self.max(column, n),
                ] {
                    match aggregate {
                        Some(value) => write!(f, "  {value:>19.6e}")?,
                        None => write!(f, "  {:>19}", "-")?,
                    }
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
