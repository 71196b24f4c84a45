//! NATS message handlers

pub mod ping;
pub mod plan;
pub mod trip;

use std::sync::Arc;

use anyhow::Result;
use async_nats::Client;
use sqlx::PgPool;
use tokio::select;
use tracing::{error, info};

use crate::config::Config;
use crate::services::planner::TripPlanner;
use crate::services::store::PgStore;

/// Start all message handlers
pub async fn start_handlers(client: Client, pool: PgPool, config: &Config) -> Result<()> {
    info!("Starting message handlers...");

    // One Postgres-backed store serves all five planner seams.
    let store = Arc::new(PgStore::new(pool));
    let planner = Arc::new(TripPlanner::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        store,
        config.planning.clone(),
    ));

    // Subscribe to all subjects
    let ping_sub = client.subscribe("fieldtrip.ping").await?;
    let plan_auto_sub = client.subscribe("fieldtrip.plan.auto").await?;
    let plan_by_technician_sub = client.subscribe("fieldtrip.plan.auto_by_technician").await?;
    let plan_suggest_sub = client.subscribe("fieldtrip.plan.suggest").await?;
    let trip_save_sub = client.subscribe("fieldtrip.trip.save").await?;
    let trip_get_sub = client.subscribe("fieldtrip.trip.get").await?;
    let trip_status_sub = client.subscribe("fieldtrip.trip.status").await?;
    let trip_recalculate_sub = client.subscribe("fieldtrip.trip.costs.recalculate").await?;
    let task_complete_sub = client.subscribe("fieldtrip.trip.task.complete").await?;

    info!("Subscribed to NATS subjects");

    // Clone for each handler
    let client_ping = client.clone();
    let client_plan_auto = client.clone();
    let client_plan_by_technician = client.clone();
    let client_plan_suggest = client.clone();
    let client_trip_save = client.clone();
    let client_trip_get = client.clone();
    let client_trip_status = client.clone();
    let client_trip_recalculate = client.clone();
    let client_task_complete = client.clone();

    let planner_auto = planner.clone();
    let planner_by_technician = planner.clone();
    let planner_suggest = planner.clone();
    let planner_save = planner.clone();
    let planner_get = planner.clone();
    let planner_status = planner.clone();
    let planner_recalculate = planner.clone();
    let planner_complete = planner;

    // Spawn handlers
    let ping_handle = tokio::spawn(async move {
        ping::handle_ping(client_ping, ping_sub).await
    });

    let plan_auto_handle = tokio::spawn(async move {
        plan::handle_auto_plan(client_plan_auto, plan_auto_sub, planner_auto).await
    });

    let plan_by_technician_handle = tokio::spawn(async move {
        plan::handle_auto_plan_by_technician(
            client_plan_by_technician,
            plan_by_technician_sub,
            planner_by_technician,
        )
        .await
    });

    let plan_suggest_handle = tokio::spawn(async move {
        plan::handle_suggest_technicians(client_plan_suggest, plan_suggest_sub, planner_suggest)
            .await
    });

    let trip_save_handle = tokio::spawn(async move {
        trip::handle_save(client_trip_save, trip_save_sub, planner_save).await
    });

    let trip_get_handle = tokio::spawn(async move {
        trip::handle_get(client_trip_get, trip_get_sub, planner_get).await
    });

    let trip_status_handle = tokio::spawn(async move {
        trip::handle_status(client_trip_status, trip_status_sub, planner_status).await
    });

    let trip_recalculate_handle = tokio::spawn(async move {
        trip::handle_recalculate_costs(
            client_trip_recalculate,
            trip_recalculate_sub,
            planner_recalculate,
        )
        .await
    });

    let task_complete_handle = tokio::spawn(async move {
        trip::handle_complete_task(client_task_complete, task_complete_sub, planner_complete).await
    });

    info!("All handlers started, waiting for messages...");

    // Wait for any handler to finish (which means an error occurred)
    select! {
        result = ping_handle => {
            error!("Ping handler finished: {:?}", result);
        }
        result = plan_auto_handle => {
            error!("Auto plan handler finished: {:?}", result);
        }
        result = plan_by_technician_handle => {
            error!("Auto plan by technician handler finished: {:?}", result);
        }
        result = plan_suggest_handle => {
            error!("Technician suggest handler finished: {:?}", result);
        }
        result = trip_save_handle => {
            error!("Trip save handler finished: {:?}", result);
        }
        result = trip_get_handle => {
            error!("Trip get handler finished: {:?}", result);
        }
        result = trip_status_handle => {
            error!("Trip status handler finished: {:?}", result);
        }
        result = trip_recalculate_handle => {
            error!("Trip cost recalculate handler finished: {:?}", result);
        }
        result = task_complete_handle => {
            error!("Task complete handler finished: {:?}", result);
        }
    }

    Ok(())
}
