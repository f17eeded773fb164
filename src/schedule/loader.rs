//! Load cash flow schedules from CSV
//!
//! Expected columns: `date,amount`, with an optional leading `schedule_id`
//! column for files holding several schedules.

use super::{CashFlow, Schedule};
use crate::error::LoadError;
use chrono::NaiveDate;
use csv::{Reader, ReaderBuilder, Trim};
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw CSV row
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(default)]
    schedule_id: Option<String>,
    date: String,
    amount: f64,
}

impl CsvRow {
    /// `row` is 1-based and counts the header line
    fn to_cashflow(&self, row: usize) -> Result<CashFlow, LoadError> {
        let date = NaiveDate::parse_from_str(&self.date, DATE_FORMAT).map_err(|_| {
            LoadError::InvalidDate {
                row,
                value: self.date.clone(),
            }
        })?;
        Ok(CashFlow::new(date, self.amount))
    }
}

fn csv_reader<R: std::io::Read>(reader: R) -> Reader<R> {
    ReaderBuilder::new().trim(Trim::All).from_reader(reader)
}

/// Read every row with its schedule_id, if any
fn read_rows<R: std::io::Read>(reader: R) -> Result<Vec<(Option<String>, CashFlow)>, LoadError> {
    let mut csv_reader = csv_reader(reader);
    let mut rows = Vec::new();

    for (i, result) in csv_reader.deserialize().enumerate() {
        let row: CsvRow = result?;
        let cashflow = row.to_cashflow(i + 2)?;
        rows.push((row.schedule_id, cashflow));
    }

    if rows.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(rows)
}

/// Load a single schedule from any reader
///
/// Rows may carry a `schedule_id`, but only one distinct id; files holding
/// several schedules must go through [`load_schedules_from_reader`].
pub fn load_schedule_from_reader<R: std::io::Read>(reader: R) -> Result<Schedule, LoadError> {
    let rows = read_rows(reader)?;

    let mut ids: Vec<String> = Vec::new();
    for id in rows.iter().filter_map(|(id, _)| id.as_deref()) {
        if !id.is_empty() && !ids.iter().any(|seen| seen == id) {
            ids.push(id.to_string());
        }
    }
    if ids.len() > 1 {
        return Err(LoadError::MultipleSchedules { ids });
    }

    let flows: Vec<CashFlow> = rows.into_iter().map(|(_, cf)| cf).collect();
    log::debug!("Loaded {} cash flows", flows.len());

    Schedule::new(flows).map_err(|source| LoadError::Schedule {
        id: "default".to_string(),
        source,
    })
}

/// Load a single schedule from a CSV file
pub fn load_schedule<P: AsRef<Path>>(path: P) -> Result<Schedule, LoadError> {
    let file = std::fs::File::open(path)?;
    load_schedule_from_reader(file)
}

/// Load schedules grouped by `schedule_id`, in order of first appearance
///
/// Rows without an id fall into a group named "default".
pub fn load_schedules_from_reader<R: std::io::Read>(
    reader: R,
) -> Result<Vec<(String, Schedule)>, LoadError> {
    let mut groups: Vec<(String, Vec<CashFlow>)> = Vec::new();

    for (id, cashflow) in read_rows(reader)? {
        let id = id
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "default".to_string());
        match groups.iter_mut().find(|(existing, _)| *existing == id) {
            Some((_, flows)) => flows.push(cashflow),
            None => groups.push((id, vec![cashflow])),
        }
    }
    log::debug!("Loaded {} schedules", groups.len());

    groups
        .into_iter()
        .map(|(id, flows)| match Schedule::new(flows) {
            Ok(schedule) => Ok((id, schedule)),
            Err(source) => Err(LoadError::Schedule { id, source }),
        })
        .collect()
}

/// Load grouped schedules from a CSV file
pub fn load_schedules<P: AsRef<Path>>(path: P) -> Result<Vec<(String, Schedule)>, LoadError> {
    let file = std::fs::File::open(path)?;
    load_schedules_from_reader(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_single_schedule() {
        let data = "date,amount\n2023-01-01,-1000\n2023-06-30, 250.5\n2024-01-01,900\n";
        let schedule = load_schedule_from_reader(data.as_bytes()).unwrap();

        assert_eq!(schedule.len(), 3);
        assert_eq!(schedule.origin(), NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(schedule.flows()[1].amount, 250.5);
    }

    #[test]
    fn test_load_grouped_schedules() {
        let data = "schedule_id,date,amount\n\
                    b,2023-01-01,-500\n\
                    a,2023-01-01,-1000\n\
                    b,2024-01-01,600\n\
                    a,2024-01-01,1100\n";
        let schedules = load_schedules_from_reader(data.as_bytes()).unwrap();

        assert_eq!(schedules.len(), 2);
        assert_eq!(schedules[0].0, "b");
        assert_eq!(schedules[1].0, "a");
        assert_eq!(schedules[1].1.flows()[1].amount, 1100.0);
    }

    #[test]
    fn test_single_loader_rejects_several_schedules() {
        let data = "schedule_id,date,amount\n\
                    loan_a,2023-01-01,-1000\n\
                    loan_a,2024-01-01,1100\n\
                    fund_b,2022-03-01,-5000\n\
                    fund_b,2022-09-01,1500\n\
                    fund_b,2023-06-15,4200\n";
        match load_schedule_from_reader(data.as_bytes()) {
            Err(LoadError::MultipleSchedules { ids }) => {
                assert_eq!(ids, vec!["loan_a".to_string(), "fund_b".to_string()]);
            }
            other => panic!("expected MultipleSchedules, got {:?}", other),
        }
    }

    #[test]
    fn test_single_loader_accepts_one_schedule_id() {
        let data = "schedule_id,date,amount\n\
                    loan_a,2023-01-01,-1000\n\
                    loan_a,2024-01-01,1100\n";
        let schedule = load_schedule_from_reader(data.as_bytes()).unwrap();
        assert_eq!(schedule.len(), 2);
    }

    #[test]
    fn test_bad_date_reports_row() {
        let data = "date,amount\n2023-01-01,-1000\n01/02/2024,1100\n";
        match load_schedule_from_reader(data.as_bytes()) {
            Err(LoadError::InvalidDate { row, value }) => {
                assert_eq!(row, 3);
                assert_eq!(value, "01/02/2024");
            }
            other => panic!("expected InvalidDate, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_group_names_schedule() {
        let data = "schedule_id,date,amount\n\
                    ok,2023-01-01,-1000\n\
                    ok,2024-01-01,1100\n\
                    bad,2023-01-01,100\n\
                    bad,2024-01-01,100\n";
        match load_schedules_from_reader(data.as_bytes()) {
            Err(LoadError::Schedule { id, .. }) => assert_eq!(id, "bad"),
            other => panic!("expected Schedule error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_file() {
        let data = "date,amount\n";
        assert!(matches!(
            load_schedule_from_reader(data.as_bytes()),
            Err(LoadError::Empty)
        ));
    }
}
