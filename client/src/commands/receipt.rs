//! Receipt issue, update, return and export

use std::path::Path;

use equipment_receipts_client::{
    return_receipt, selection_csv, ClientResult, Config, ReceiptPlan, ReceiptSession,
};
use shared::{signature_data_url, Receipt, ReceiptId};

pub async fn issue(config: &Config, plan: &Path, signature: Option<&Path>) -> ClientResult<()> {
    let plan = ReceiptPlan::load(plan)?;
    let api = super::api_client(config)?;

    let mut session = ReceiptSession::open_create(&api, config.receipts.require_signature).await?;
    plan.apply(&mut session)?;
    if let Some(path) = signature {
        let png = std::fs::read(path)?;
        session.set_signature(signature_data_url(&png))?;
    }

    let receipt = session.submit().await?;
    print_receipt(&receipt);
    Ok(())
}

pub async fn update(config: &Config, receipt_id: &str, plan: &Path) -> ClientResult<()> {
    let plan = ReceiptPlan::load(plan)?;
    let api = super::api_client(config)?;

    let mut session = ReceiptSession::open_update(&api, &ReceiptId::new(receipt_id)).await?;
    plan.apply(&mut session)?;

    let receipt = session.submit().await?;
    print_receipt(&receipt);
    Ok(())
}

pub async fn return_all(config: &Config, receipt_id: &str) -> ClientResult<()> {
    let api = super::api_client(config)?;
    let receipt = return_receipt(&api, &ReceiptId::new(receipt_id)).await?;
    print_receipt(&receipt);
    Ok(())
}

pub async fn export(config: &Config, plan: &Path) -> ClientResult<()> {
    let plan = ReceiptPlan::load(plan)?;
    let api = super::api_client(config)?;

    // Signature is irrelevant for a preview
    let mut session = ReceiptSession::open_create(&api, false).await?;
    plan.apply(&mut session)?;

    print!("{}", selection_csv(&session.draft().rows())?);
    Ok(())
}

fn print_receipt(receipt: &Receipt) {
    println!(
        "Receipt {} ({}) for {}: {} item(s)",
        receipt.id,
        receipt.status,
        receipt.recipient.display_name(),
        receipt.items.len()
    );
}
