use crate::reconcile::Outcome;
use ansi_term::Colour::{Green, Purple, Red, Yellow};
use ascii_table::AsciiTable;
use log::info;

/// Status of one step in a summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Done(Outcome),
    DryRun(Outcome),
    Failed,
    Skipped,
}

impl Status {
    fn paint(&self) -> String {
        match self {
            Status::Done(outcome) => Green.paint(outcome.to_string()).to_string(),
            Status::DryRun(outcome) => Purple.paint(format!("would be {}", outcome)).to_string(),
            Status::Failed => Red.paint("failed").to_string(),
            Status::Skipped => Yellow.paint("skipped").to_string(),
        }
    }
}

/// Rows of (resource kind, name, status).
#[derive(Debug, Default)]
pub struct Summary {
    rows: Vec<(&'static str, String, Status)>,
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: &'static str, name: &str, status: Status) {
        self.rows.push((kind, name.to_string(), status));
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_table(&self) -> Vec<Vec<String>> {
        let mut table = vec![vec![
            "Resource".to_string(),
            "Name".to_string(),
            "Status".to_string(),
        ]];
        table.push(vec!["---".to_string(), "---".to_string(), "---".to_string()]);

        for (kind, name, status) in &self.rows {
            table.push(vec![kind.to_string(), name.clone(), status.paint()]);
        }

        table
    }

    /// Print summary table, sized to the terminal
    pub fn print(&self) {
        let term_width = term_size::dimensions().map(|(w, _)| w).unwrap_or(120);

        let mut table = AsciiTable::default();
        table.set_max_width(term_width.saturating_sub(5).max(40));

        info!("Summary:\n{}", table.format(self.to_table()));
    }
}
