//! Available items listing

use equipment_receipts_client::services::session::build_snapshot;
use equipment_receipts_client::{ClientResult, Config};
use shared::{available_groups, search_groups, SelectionModel};

pub async fn available(config: &Config, search: Option<&str>) -> ClientResult<()> {
    let api = super::api_client(config)?;
    let snapshot = build_snapshot(api.get_available_items().await?);

    let groups = available_groups(&snapshot, &SelectionModel::new());
    let groups = match search {
        Some(query) => search_groups(&groups, query),
        None => groups,
    };

    for group in &groups {
        let location = group.location_label.as_deref().unwrap_or("-");
        match &group.id_number {
            Some(number) => println!("{:<24} {:<24} #{}", group.name, location, number),
            None => println!("{:<24} {:<24} x{}", group.name, location, group.available),
        }
    }
    tracing::info!(groups = groups.len(), items = snapshot.len(), "Listed available items");
    Ok(())
}
