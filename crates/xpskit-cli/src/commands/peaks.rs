use crate::cli::{PeaksArgs, PeaksCommands};
use crate::error::{CliError, Result};
use crate::utils::table;
use tracing::info;
use xpskit::core::models::peaks::PeakModelTable;
use xpskit::core::settings::SettingsStore;

pub fn run(args: PeaksArgs) -> Result<()> {
    let store = super::settings_store()?;
    match args.command {
        PeaksCommands::List => handle_list(&store),
        PeaksCommands::Add {
            level,
            name,
            center,
            fwhm,
        } => handle_add(&store, level, name, center, fwhm),
        PeaksCommands::Remove { id } => handle_remove(&store, &id),
        PeaksCommands::Init { force } => handle_init(&store, force),
    }
}

fn render(table: &PeakModelTable) -> String {
    let rows: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|model| {
            vec![
                model.id.clone(),
                model.level.clone(),
                model.name.clone(),
                format!("{:.2}", model.center),
                format!("{:.2}", model.center_error),
                format!("{:.2}", model.fwhm),
                format!("{:.2}", model.fwhm_error),
            ]
        })
        .collect();
    table::render(
        &["Id", "Level", "Name", "Center", "CenterErr", "FWHM", "FWHMErr"],
        &rows,
    )
}

fn handle_list(store: &SettingsStore) -> Result<()> {
    match store.load_peak_models() {
        Some(saved) => print!("{}", render(&saved)),
        None => {
            println!("No peak models saved; fitting is skipped until some are.");
            println!("Built-in seed set ('xpskit peaks init' saves it):\n");
            print!("{}", render(&PeakModelTable::seed()));
        }
    }
    Ok(())
}

fn handle_add(
    store: &SettingsStore,
    level: String,
    name: String,
    center: f64,
    fwhm: f64,
) -> Result<()> {
    let mut table = store.peak_models_or_seed();
    let id = table.add_row(level, name, center, fwhm).id.clone();
    let path = store.save_peak_models(&table)?;
    info!("Peak models saved to {:?}", path);
    println!("✓ Added peak model {}", id);
    Ok(())
}

fn handle_remove(store: &SettingsStore, id: &str) -> Result<()> {
    let mut table = store
        .load_peak_models()
        .ok_or_else(|| CliError::Argument("No peak-model table is saved.".to_string()))?;
    let removed = table
        .remove(id)
        .ok_or_else(|| CliError::Argument(format!("No peak model with id '{}'.", id)))?;
    store.save_peak_models(&table)?;
    println!(
        "✓ Removed peak model {} ({} {})",
        removed.id, removed.level, removed.name
    );
    Ok(())
}

fn handle_init(store: &SettingsStore, force: bool) -> Result<()> {
    if store.load_peak_models().is_some() && !force {
        return Err(CliError::Argument(
            "A peak-model table already exists. Use --force to replace it.".to_string(),
        ));
    }
    let path = store.save_peak_models(&PeakModelTable::seed())?;
    println!("✓ Seed peak models written to: {}", path.display());
    Ok(())
}
