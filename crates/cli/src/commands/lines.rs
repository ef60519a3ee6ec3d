//! Line account commands.

use project_tracker_admin::services::ResourceService;
use project_tracker_core::{CreateLineDto, EntityStatus, Line, LineId, UpdateLineDto};

use super::{CommandError, print_json};

pub async fn list(service: &dyn ResourceService<Line>) -> Result<(), CommandError> {
    let lines = service.list_all().await?;
    tracing::info!(count = lines.len(), "Fetched Line accounts");
    print_json(&lines)?;
    Ok(())
}

pub async fn get(service: &dyn ResourceService<Line>, id: &str) -> Result<(), CommandError> {
    print_json(&service.get_by_id(&LineId::new(id)).await?)?;
    Ok(())
}

pub async fn create(
    service: &dyn ResourceService<Line>,
    name: String,
    line_id: String,
) -> Result<(), CommandError> {
    let line = service.create(CreateLineDto { name, line_id }).await?;
    tracing::info!(id = %line.id, "Created Line account");
    print_json(&line)?;
    Ok(())
}

pub async fn update(
    service: &dyn ResourceService<Line>,
    id: &str,
    name: Option<String>,
    line_id: Option<String>,
    status: Option<EntityStatus>,
) -> Result<(), CommandError> {
    let input = UpdateLineDto {
        id: LineId::new(id),
        name,
        line_id,
        status,
    };
    print_json(&service.update(input).await?)?;
    Ok(())
}

pub async fn delete(service: &dyn ResourceService<Line>, id: &str) -> Result<(), CommandError> {
    service.delete(&LineId::new(id)).await?;
    println!("Deleted Line account {id}");
    Ok(())
}
