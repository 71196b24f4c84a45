//! Trip message handlers

use std::sync::Arc;

use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::services::planner::TripPlanner;
use crate::types::{
    CompleteTaskRequest, ErrorResponse, Request, SaveTripRequest, SuccessResponse, TripIdRequest,
    UpdateTripStatusRequest,
};

/// Handle trip.save messages
pub async fn handle_save(
    client: Client,
    mut subscriber: Subscriber,
    planner: Arc<TripPlanner>,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received trip.save message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        let request: Request<SaveTripRequest> = match serde_json::from_slice(&msg.payload) {
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
            "Saving trip to {} for technician {}",
            request.payload.destination_city, request.payload.technician_id
        );

        match planner.save_trip(request.payload, request.user_id).await {
            Ok(saved) => {
                let success = SuccessResponse::new(request.id, saved);
                let _ = client
                    .publish(reply, serde_json::to_vec(&success)?.into())
                    .await;
            }
            Err(e) => {
                error!("Failed to save trip: {}", e);
                let error = ErrorResponse::new(request.id, e.code(), e.to_string());
                let _ = client
                    .publish(reply, serde_json::to_vec(&error)?.into())
                    .await;
            }
        }
    }

    Ok(())
}

/// Handle trip.get messages
pub async fn handle_get(
    client: Client,
    mut subscriber: Subscriber,
    planner: Arc<TripPlanner>,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received trip.get message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        let request: Request<TripIdRequest> = match serde_json::from_slice(&msg.payload) {
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

        match planner.trip_detail(request.payload).await {
            Ok(detail) => {
                let success = SuccessResponse::new(request.id, detail);
                let _ = client
                    .publish(reply, serde_json::to_vec(&success)?.into())
                    .await;
            }
            Err(e) => {
                error!("Failed to load trip: {}", e);
                let error = ErrorResponse::new(request.id, e.code(), e.to_string());
                let _ = client
                    .publish(reply, serde_json::to_vec(&error)?.into())
                    .await;
            }
        }
    }

    Ok(())
}

/// Handle trip.status messages
pub async fn handle_status(
    client: Client,
    mut subscriber: Subscriber,
    planner: Arc<TripPlanner>,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received trip.status message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        let request: Request<UpdateTripStatusRequest> = match serde_json::from_slice(&msg.payload)
        {
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
            "Updating trip {} to status {}",
            request.payload.id,
            request.payload.status.as_str()
        );

        match planner.update_trip_status(request.payload).await {
            Ok(trip) => {
                let success = SuccessResponse::new(request.id, trip);
                let _ = client
                    .publish(reply, serde_json::to_vec(&success)?.into())
                    .await;
            }
            Err(e) => {
                error!("Failed to update trip status: {}", e);
                let error = ErrorResponse::new(request.id, e.code(), e.to_string());
                let _ = client
                    .publish(reply, serde_json::to_vec(&error)?.into())
                    .await;
            }
        }
    }

    Ok(())
}

/// Handle trip.costs.recalculate messages
pub async fn handle_recalculate_costs(
    client: Client,
    mut subscriber: Subscriber,
    planner: Arc<TripPlanner>,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received trip.costs.recalculate message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        let request: Request<TripIdRequest> = match serde_json::from_slice(&msg.payload) {
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

        info!("Recalculating costs for trip {}", request.payload.id);

        match planner.recalculate_costs(request.payload).await {
            Ok(costs) => {
                let success = SuccessResponse::new(request.id, costs);
                let _ = client
                    .publish(reply, serde_json::to_vec(&success)?.into())
                    .await;
            }
            Err(e) => {
                error!("Failed to recalculate costs: {}", e);
                let error = ErrorResponse::new(request.id, e.code(), e.to_string());
                let _ = client
                    .publish(reply, serde_json::to_vec(&error)?.into())
                    .await;
            }
        }
    }

    Ok(())
}

/// Handle trip.task.complete messages
pub async fn handle_complete_task(
    client: Client,
    mut subscriber: Subscriber,
    planner: Arc<TripPlanner>,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received trip.task.complete message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        let request: Request<CompleteTaskRequest> = match serde_json::from_slice(&msg.payload) {
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

        match planner.complete_task(request.payload).await {
            Ok(task) => {
                let success = SuccessResponse::new(request.id, task);
                let _ = client
                    .publish(reply, serde_json::to_vec(&success)?.into())
                    .await;
            }
            Err(e) => {
                error!("Failed to complete task: {}", e);
                let error = ErrorResponse::new(request.id, e.code(), e.to_string());
                let _ = client
                    .publish(reply, serde_json::to_vec(&error)?.into())
                    .await;
            }
        }
    }

    Ok(())
}
