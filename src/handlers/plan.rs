//! Auto-planning message handlers

use std::sync::Arc;

use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::services::planner::TripPlanner;
use crate::types::{
    AutoPlanByTechnicianRequest, AutoPlanRequest, ErrorResponse, Request, SuccessResponse,
    SuggestTechniciansRequest,
};

/// Handle plan.auto messages
pub async fn handle_auto_plan(
    client: Client,
    mut subscriber: Subscriber,
    planner: Arc<TripPlanner>,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received plan.auto message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        let request: Request<AutoPlanRequest> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = client
                    .publish(reply, serde_json::to_vec(&error)?.into())
                    .await;
                continue;
            }
        };

        info!(
            "Auto-planning trip to {} ({} - {})",
            request.payload.destination_city, request.payload.start_date, request.payload.end_date
        );

        match planner.auto_plan(request.payload).await {
            Ok(plan) => {
                let success = SuccessResponse::new(request.id, plan);
                let _ = client
                    .publish(reply, serde_json::to_vec(&success)?.into())
                    .await;
            }
            Err(e) => {
                error!("Auto-planning failed: {}", e);
                let error = ErrorResponse::new(request.id, e.code(), e.to_string());
                let _ = client
                    .publish(reply, serde_json::to_vec(&error)?.into())
                    .await;
            }
        }
    }

    Ok(())
}

/// Handle plan.auto_by_technician messages
pub async fn handle_auto_plan_by_technician(
    client: Client,
    mut subscriber: Subscriber,
    planner: Arc<TripPlanner>,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received plan.auto_by_technician message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        let request: Request<AutoPlanByTechnicianRequest> =
            match serde_json::from_slice(&msg.payload) {
                Ok(req) => req,
                Err(e) => {
                    error!("Failed to parse request: {}", e);
                    let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                    let _ = client
                        .publish(reply, serde_json::to_vec(&error)?.into())
                        .await;
                    continue;
                }
            };

        info!(
            "Auto-planning trip for technician {}",
            request.payload.technician_id
        );

        match planner.auto_plan_by_technician(request.payload).await {
            Ok(plan) => {
                let success = SuccessResponse::new(request.id, plan);
                let _ = client
                    .publish(reply, serde_json::to_vec(&success)?.into())
                    .await;
            }
            Err(e) => {
                error!("Auto-planning by technician failed: {}", e);
                let error = ErrorResponse::new(request.id, e.code(), e.to_string());
                let _ = client
                    .publish(reply, serde_json::to_vec(&error)?.into())
                    .await;
            }
        }
    }

    Ok(())
}

/// Handle plan.suggest messages
pub async fn handle_suggest_technicians(
    client: Client,
    mut subscriber: Subscriber,
    planner: Arc<TripPlanner>,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received plan.suggest message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        let request: Request<SuggestTechniciansRequest> =
            match serde_json::from_slice(&msg.payload) {
                Ok(req) => req,
                Err(e) => {
                    error!("Failed to parse request: {}", e);
                    let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                    let _ = client
                        .publish(reply, serde_json::to_vec(&error)?.into())
                        .await;
                    continue;
                }
            };

        match planner.suggest_technicians(request.payload).await {
            Ok(suggestions) => {
                let success = SuccessResponse::new(request.id, suggestions);
                let _ = client
                    .publish(reply, serde_json::to_vec(&success)?.into())
                    .await;
            }
            Err(e) => {
                error!("Technician suggestion failed: {}", e);
                let error = ErrorResponse::new(request.id, e.code(), e.to_string());
                let _ = client
                    .publish(reply, serde_json::to_vec(&error)?.into())
                    .await;
            }
        }
    }

    Ok(())
}
