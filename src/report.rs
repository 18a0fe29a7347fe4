// FlowMon Report: Summaries of Throughput and Drop Rates from ns-3 Flow-Monitor Records
// Copyright (C) 2024-2025 Roland Schmid <roschmi@ethz.ch> and Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//! Module building the summary tables and writing them to CSV.

use std::{fs, path::Path, path::PathBuf};

use itertools::Itertools;

use crate::{
    config::{self, Condition, Monitor, ReportConfig},
    flow_monitor,
    metrics::{Metric, MetricError, Value},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cannot compute the {metric} of {monitor:?} for {condition:?} from {path:?}: {source}")]
    Evaluation {
        metric: Metric,
        condition: String,
        monitor: String,
        path: PathBuf,
        #[source]
        source: EvaluationError,
    },
    #[error("Configuration error: {0}")]
    Config(#[from] config::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("The CSV file {0:?} has no header.")]
    MissingHeader(PathBuf),
    #[error("Cannot parse the value {value:?} in column {column:?}.")]
    InvalidValue { column: String, value: String },
}

/// Error while evaluating a single flow-monitor document.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Document(#[from] flow_monitor::Error),
    #[error(transparent)]
    Metric(#[from] MetricError),
}

/// One row of a summary: the condition and one value per column.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub condition: String,
    pub values: Vec<Value>,
}

/// A summary table, with rows in condition order and columns in monitor order.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub condition_header: String,
    pub columns: Vec<String>,
    pub rows: Vec<SummaryRow>,
}

impl Table {
    /// Lookup the value of a given condition and column.
    pub fn get(&self, condition: &str, column: &str) -> Option<Value> {
        let col = self.columns.iter().position(|c| c == column)?;
        self.rows
            .iter()
            .find(|row| row.condition == condition)
            .and_then(|row| row.values.get(col).copied())
    }

    /// Iterate over the cells of a row as pairs of column label and value.
    pub fn row_entries<'a>(
        &'a self,
        row: &'a SummaryRow,
    ) -> impl Iterator<Item = (&'a str, Value)> + 'a {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(row.values.iter().copied())
    }
}

/// Paths of the written summaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub throughput: PathBuf,
    pub drop_rate: PathBuf,
}

/// Evaluate `metric` on the first flow group of a single flow-monitor document.
fn evaluate_monitor(
    config: &ReportConfig,
    metric: Metric,
    condition: &Condition,
    monitor: &Monitor,
) -> Result<Value, Error> {
    let path = config.monitor_path(condition, monitor);
    let wrap = |source: EvaluationError| Error::Evaluation {
        metric,
        condition: condition.label.clone(),
        monitor: monitor.label.clone(),
        path: path.clone(),
        source,
    };

    let group = flow_monitor::load_first_group(&path).map_err(|e| wrap(e.into()))?;
    metric
        .evaluate(&group, config.selector, config.throughput_divisor)
        .map_err(|e| wrap(e.into()))
}

/// Build the summary of `metric` for all conditions and monitors of `config`. Only the first flow
/// group of every document is analyzed. The first failing document aborts the whole table.
pub fn build_table(config: &ReportConfig, metric: Metric) -> Result<Table, Error> {
    let mut rows = Vec::with_capacity(config.conditions.len());

    for condition in config.conditions.iter() {
        log::info!(
            "Computing the {metric} for {} = {}",
            config.condition_header,
            condition.label
        );
        let values = config
            .monitors
            .iter()
            .map(|monitor| evaluate_monitor(config, metric, condition, monitor))
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(SummaryRow {
            condition: condition.label.clone(),
            values,
        });
    }

    Ok(Table {
        condition_header: config.condition_header.clone(),
        columns: config.labels(),
        rows,
    })
}

/// Write the table to `path` as CSV with a header row. An existing file is overwritten.
pub fn write_csv(table: &Table, path: impl AsRef<Path>) -> Result<(), Error> {
    let path = path.as_ref();
    let mut csv = csv::WriterBuilder::new().has_headers(true).from_writer(
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?,
    );

    csv.write_record(
        std::iter::once(table.condition_header.as_str())
            .chain(table.columns.iter().map(String::as_str)),
    )?;
    for row in table.rows.iter() {
        csv.write_record(
            std::iter::once(row.condition.clone())
                .chain(row.values.iter().map(Value::to_string)),
        )?;
    }
    csv.flush()?;

    log::info!(
        "Written {} rows of [{}] to {path:?}",
        table.rows.len(),
        table.columns.iter().join(", ")
    );
    Ok(())
}

/// Read a table written by [`write_csv`].
pub fn read_csv(path: impl AsRef<Path>) -> Result<Table, Error> {
    let path = path.as_ref();
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;

    let mut headers = rdr.headers()?.iter().map(str::to_string);
    let Some(condition_header) = headers.next() else {
        return Err(Error::MissingHeader(path.to_path_buf()));
    };
    let columns = headers.collect_vec();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let condition = record.get(0).unwrap_or_default().to_string();
        let values = columns
            .iter()
            .zip(record.iter().skip(1))
            .map(|(column, value)| {
                value.parse().map_err(|_| Error::InvalidValue {
                    column: column.clone(),
                    value: value.to_string(),
                })
            })
            .collect::<Result<Vec<Value>, _>>()?;
        rows.push(SummaryRow { condition, values });
    }

    Ok(Table {
        condition_header,
        columns,
        rows,
    })
}

/// Compute both summaries and write them to the configured output files. The throughput summary
/// is written before the drop rates are computed.
pub fn run_report(config: &ReportConfig) -> Result<ReportPaths, Error> {
    config.validate()?;
    let (throughput, drop_rate) = config.output_paths();
    fs::create_dir_all(&config.output_dir)?;

    let table = build_table(config, Metric::Throughput)?;
    write_csv(&table, &throughput)?;

    let table = build_table(config, Metric::DropRate)?;
    write_csv(&table, &drop_rate)?;

    Ok(ReportPaths {
        throughput,
        drop_rate,
    })
}
