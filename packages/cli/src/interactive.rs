//! Interactive exploration loop.
//!
//! Each menu action maps onto one dashboard input channel: filter edits,
//! search-and-select, map clicks on the boundary layer, drawer toggles,
//! and the newsletter form.

use dialoguer::{Input, Select};
use lone_star_ledger_dashboard::Dashboard;
use lone_star_ledger_dashboard::geo::LayerKind;

use crate::{CliError, render};

enum Action {
    Search,
    ClickMap,
    MinSpend,
    MaxDebt,
    OpenDrawer,
    CloseDrawer,
    Newsletter,
    Quit,
}

impl Action {
    const ALL: &[Self] = &[
        Self::Search,
        Self::ClickMap,
        Self::MinSpend,
        Self::MaxDebt,
        Self::OpenDrawer,
        Self::CloseDrawer,
        Self::Newsletter,
        Self::Quit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Search => "Search for a school",
            Self::ClickMap => "Click a district on the map",
            Self::MinSpend => "Set min per-pupil spend",
            Self::MaxDebt => "Set max total debt",
            Self::OpenDrawer => "Open detail drawer",
            Self::CloseDrawer => "Close detail drawer",
            Self::Newsletter => "Subscribe to the newsletter",
            Self::Quit => "Quit",
        }
    }
}

/// Runs the menu loop until the user quits.
///
/// # Errors
///
/// Returns [`CliError::Prompt`] if a prompt cannot be shown.
pub async fn run(mut dashboard: Dashboard) -> Result<(), CliError> {
    println!("Lone Star Ledger");
    println!();
    render::summary(dashboard.summary());
    render::layers(dashboard.geo());
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    loop {
        let idx = Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()?;

        match Action::ALL[idx] {
            Action::Search => search(&mut dashboard).await?,
            Action::ClickMap => click_map(&mut dashboard).await?,
            Action::MinSpend => {
                let raw = prompt_text("Min per-pupil spend (empty for none)")?;
                if dashboard.filters_mut().set_min_spend(&raw).is_err() {
                    log::debug!("Kept previous min spend");
                }
                print_filters(&dashboard);
            }
            Action::MaxDebt => {
                let raw = prompt_text("Max total debt (empty for none)")?;
                if dashboard.filters_mut().set_max_debt(&raw).is_err() {
                    log::debug!("Kept previous max debt");
                }
                print_filters(&dashboard);
            }
            Action::OpenDrawer => {
                if !dashboard.selection_mut().open_drawer() {
                    println!("Nothing loaded yet");
                }
                render::selection(&dashboard);
            }
            Action::CloseDrawer => {
                dashboard.selection_mut().close_drawer();
                render::selection(&dashboard);
            }
            Action::Newsletter => {
                let email = prompt_text("Email for newsletter")?;
                dashboard.newsletter_mut().set_email(&email);
                if dashboard.subscribe().await {
                    println!("Subscribed!");
                }
            }
            Action::Quit => return Ok(()),
        }
    }
}

async fn search(dashboard: &mut Dashboard) -> Result<(), CliError> {
    let query = prompt_text("Search for a school")?;
    let options = dashboard.search(&query).await.to_vec();
    if options.is_empty() {
        println!("No matching districts");
        return Ok(());
    }

    let labels: Vec<String> = options
        .iter()
        .map(|o| format!("{} ({})", o.name, o.id))
        .collect();
    let Some(idx) = Select::new()
        .with_prompt("Select a school")
        .items(&labels)
        .default(0)
        .interact_opt()?
    else {
        return Ok(());
    };

    dashboard.select(options[idx].clone());
    settle(dashboard).await;
    Ok(())
}

async fn click_map(dashboard: &mut Dashboard) -> Result<(), CliError> {
    let Some(boundaries) = dashboard.geo().boundaries() else {
        println!("District boundaries are not loaded");
        return Ok(());
    };
    let features = boundaries.features.clone();
    if features.is_empty() {
        println!("No districts on the map");
        return Ok(());
    }

    let labels: Vec<String> = features
        .iter()
        .map(|f| {
            f.property("name")
                .and_then(|value| value.as_str())
                .unwrap_or("(unnamed feature)")
                .to_string()
        })
        .collect();
    let Some(idx) = Select::new()
        .with_prompt("Click a district")
        .items(&labels)
        .default(0)
        .interact_opt()?
    else {
        return Ok(());
    };

    if dashboard
        .click(LayerKind::Boundaries, &features[idx])
        .is_none()
    {
        println!("That feature cannot be selected");
        return Ok(());
    }
    settle(dashboard).await;
    Ok(())
}

async fn settle(dashboard: &mut Dashboard) {
    render::selection(dashboard);
    dashboard.selection_mut().settle().await;
    render::selection(dashboard);
}

fn prompt_text(prompt: &str) -> Result<String, CliError> {
    Ok(Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?)
}

fn print_filters(dashboard: &Dashboard) {
    let current = dashboard.filters().current();
    let show = |bound: Option<f64>| bound.map_or_else(|| "none".to_string(), |v| v.to_string());
    println!(
        "Filters: min spend {}, max debt {}",
        show(current.min_spend),
        show(current.max_debt)
    );
}
