mod common;

use axum::extract::State;
use jmd_backoffice_api::routes::health::health_check;

#[tokio::test]
async fn health_check_reports_database() -> anyhow::Result<()> {
    let Some(database_url) = common::database_url() else {
        return Ok(());
    };
    let app = common::setup_app(&database_url).await?;

    let response = health_check(State(app.state.clone())).await;
    assert_eq!(response.0.message, "Health check");

    let data = response.0.data.expect("health data");
    assert_eq!(data.status, "ok");
    assert_eq!(data.database, "ok");
    assert_eq!(data.cached_documents, 0);

    app.drain().await;
    Ok(())
}
