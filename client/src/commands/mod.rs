pub mod inventory;
pub mod receipt;

use equipment_receipts_client::{ClientResult, Config, EquipmentApiClient};

fn api_client(config: &Config) -> ClientResult<EquipmentApiClient> {
    EquipmentApiClient::new(&config.api)
}
