//! View model for the detail drawer.
//!
//! Pure function of a [`SelectionView`]; holds no state of its own.

use lone_star_ledger_models::{CampusSummary, EntityDetail, SpendingSlice};

use crate::selection::{SelectionState, SelectionView};

/// What the drawer shows.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawerView {
    /// Whether the drawer is open.
    pub visible: bool,
    /// Whether a detail fetch is outstanding.
    pub loading: bool,
    /// Content, present only once a detail has been fetched.
    pub panel: Option<DetailPanel>,
}

/// Rendered detail for one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailPanel {
    /// Entity name.
    pub title: String,
    /// Labelled headline figures.
    pub facts: Vec<(&'static str, String)>,
    /// Chart input, in chart order.
    pub spending: [SpendingSlice; 4],
    /// One line per campus.
    pub campuses: Vec<String>,
}

impl DrawerView {
    /// Derives the drawer from the selection.
    #[must_use]
    pub fn from_selection(view: &SelectionView) -> Self {
        let panel = match &view.state {
            SelectionState::Ready(detail) => Some(DetailPanel::new(detail)),
            SelectionState::Idle | SelectionState::Loading(_) | SelectionState::Failed(_) => None,
        };
        Self {
            visible: view.drawer_visible,
            loading: matches!(view.state, SelectionState::Loading(_)),
            panel,
        }
    }
}

impl DetailPanel {
    /// Formats `detail` for display.
    #[must_use]
    pub fn new(detail: &EntityDetail) -> Self {
        Self {
            title: detail.name.clone(),
            facts: vec![
                ("Per Pupil Spending", format_money(detail.per_pupil_spending)),
                ("Total Debt", format_money(detail.total_debt)),
                ("Avg Teacher Salary", format_money(detail.avg_teacher_salary)),
            ],
            spending: detail.spending.slices(),
            campuses: detail.campuses.iter().map(campus_line).collect(),
        }
    }

    /// The panel as plain text lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let total: f64 = self.spending.iter().map(|s| s.value).sum();
        let mut lines = vec![self.title.clone()];
        lines.extend(
            self.facts
                .iter()
                .map(|(label, value)| format!("{label}: {value}")),
        );
        lines.push("Spending:".to_string());
        lines.extend(self.spending.iter().map(|slice| {
            format!(
                "  {}: {} ({:.1}%)",
                slice.category,
                format_money(slice.value),
                slice.share(total) * 100.0
            )
        }));
        lines.push("Campuses:".to_string());
        if self.campuses.is_empty() {
            lines.push("  (none)".to_string());
        } else {
            lines.extend(self.campuses.iter().map(|c| format!("  {c}")));
        }
        lines
    }
}

fn campus_line(campus: &CampusSummary) -> String {
    format!(
        "{} - Reading: {}%, Math: {}%",
        campus.name, campus.reading_on_grade, campus.math_on_grade
    )
}

/// Formats a dollar amount with thousands separators, rounded to whole
/// dollars.
#[must_use]
pub fn format_money(amount: f64) -> String {
    let rounded = format!("{:.0}", amount.abs());
    let mut grouped = String::with_capacity(rounded.len() + rounded.len() / 3);
    for (i, ch) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0.0 && rounded != "0" {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}
