use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};

use crate::entities::{contacts, prelude::*};
use crate::error::ServiceError;
use crate::models::contact::{ContactListResponse, ContactResponse, CreateContactRequest};
use crate::AppState;

pub async fn create_contact(
    State(state): State<AppState>,
    Json(payload): Json<CreateContactRequest>,
) -> Result<(StatusCode, Json<ContactResponse>), ServiceError> {
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(ServiceError::validation("contact name is required"));
    }

    let now = Utc::now().naive_utc();
    let contact = contacts::ActiveModel {
        name: Set(name),
        phone: Set(payload.phone),
        email: Set(payload.email),
        created_at: Set(Some(now)),
        updated_at: Set(Some(now)),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    tracing::info!(contact_id = contact.id, "Contact created");

    Ok((StatusCode::CREATED, Json(contact_response(contact))))
}

pub async fn list_contacts(
    State(state): State<AppState>,
) -> Result<Json<ContactListResponse>, ServiceError> {
    let rows = Contacts::find()
        .order_by_asc(contacts::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(ContactListResponse {
        contacts: rows.into_iter().map(contact_response).collect(),
    }))
}

pub async fn get_contact(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ContactResponse>, ServiceError> {
    let contact = Contacts::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ServiceError::NotFound {
            entity: "contact",
            id,
        })?;

    Ok(Json(contact_response(contact)))
}

fn contact_response(contact: contacts::Model) -> ContactResponse {
    ContactResponse {
        id: contact.id,
        name: contact.name,
        phone: contact.phone,
        email: contact.email,
        created_at: contact.created_at,
    }
}
