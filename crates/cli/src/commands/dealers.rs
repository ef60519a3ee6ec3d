//! Dealer commands.

use project_tracker_admin::services::ResourceService;
use project_tracker_core::{CreateDealerDto, Dealer, DealerId, UpdateDealerDto};

use super::{CommandError, print_json};

pub async fn list(service: &dyn ResourceService<Dealer>) -> Result<(), CommandError> {
    let dealers = service.list_all().await?;
    tracing::info!(count = dealers.len(), "Fetched dealers");
    print_json(&dealers)?;
    Ok(())
}

pub async fn get(service: &dyn ResourceService<Dealer>, id: &str) -> Result<(), CommandError> {
    print_json(&service.get_by_id(&DealerId::new(id)).await?)?;
    Ok(())
}

pub async fn create(
    service: &dyn ResourceService<Dealer>,
    input: CreateDealerDto,
) -> Result<(), CommandError> {
    let dealer = service.create(input).await?;
    tracing::info!(id = %dealer.id, code = %dealer.code, "Created dealer");
    print_json(&dealer)?;
    Ok(())
}

pub async fn update(
    service: &dyn ResourceService<Dealer>,
    input: UpdateDealerDto,
) -> Result<(), CommandError> {
    print_json(&service.update(input).await?)?;
    Ok(())
}

pub async fn delete(service: &dyn ResourceService<Dealer>, id: &str) -> Result<(), CommandError> {
    service.delete(&DealerId::new(id)).await?;
    println!("Deleted dealer {id}");
    Ok(())
}
