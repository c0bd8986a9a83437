//! Plain-text rendering of dashboard state.

use lone_star_ledger_dashboard::Dashboard;
use lone_star_ledger_dashboard::drawer::format_money;
use lone_star_ledger_dashboard::geo::{DEFAULT_VIEWPORT, GeoLayerManager};
use lone_star_ledger_dashboard::selection::SelectionState;
use lone_star_ledger_models::{EntityRef, SummaryStats};

pub fn summary(stats: Option<&SummaryStats>) {
    println!("Summary Stats");
    let Some(stats) = stats else {
        println!("  (unavailable)");
        return;
    };
    println!("  Total Spending   {}", format_money(stats.total_spending));
    println!("  Avg Per Pupil    {}", format_money(stats.avg_per_pupil));
    println!("  District Count   {}", stats.district_count);
}

pub fn layers(geo: &GeoLayerManager) {
    let (lat, lon) = DEFAULT_VIEWPORT.center;
    println!("Map centered at {lat}, {lon} (zoom {})", DEFAULT_VIEWPORT.zoom);
    let mut drawn = 0;
    for (kind, collection) in geo.layers() {
        let style = kind.style();
        println!(
            "  {kind}: {} features{}{}",
            collection.features.len(),
            style.color.map_or_else(String::new, |c| format!(", color {c}")),
            if style.interactive { ", clickable" } else { "" }
        );
        drawn += 1;
    }
    if drawn == 0 {
        println!("  (no layers loaded)");
    }
}

pub fn options(results: &[EntityRef]) {
    if results.is_empty() {
        println!("No matching districts");
        return;
    }
    for entity in results {
        println!("  {:<10} {}", entity.id, entity.name);
    }
}

pub fn selection(dashboard: &Dashboard) {
    match dashboard.selection().state() {
        SelectionState::Idle => println!("Nothing selected"),
        SelectionState::Loading(entity) => println!("Loading {}...", entity.name),
        SelectionState::Failed(entity) => {
            println!("Could not load {} ({})", entity.name, entity.id);
        }
        SelectionState::Ready(_) => {
            let drawer = dashboard.drawer();
            match drawer.panel {
                Some(panel) if drawer.visible => {
                    println!();
                    for line in panel.lines() {
                        println!("{line}");
                    }
                    println!();
                }
                Some(panel) => println!("{} loaded (drawer closed)", panel.title),
                None => {}
            }
        }
    }
}
