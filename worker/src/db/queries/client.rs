//! Client database queries

use anyhow::{anyhow, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::types::Client;

/// List all clients, oldest first.
pub async fn list_clients(pool: &PgPool) -> Result<Vec<Client>> {
    let clients = sqlx::query_as::<_, Client>(
        r#"
        SELECT
            id, name, email, phone, address, suburb,
            lat, lng,
            bedrooms, bathrooms, living_areas, kitchens,
            frequency, preferred_day, preferred_time,
            duration_override_minutes,
            access_notes, special_instructions,
            status, is_demo,
            created_at, updated_at
        FROM clients
        ORDER BY created_at, id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(clients)
}

/// Get a single client
pub async fn get_client(pool: &PgPool, client_id: Uuid) -> Result<Option<Client>> {
    let client = sqlx::query_as::<_, Client>(
        r#"
        SELECT
            id, name, email, phone, address, suburb,
            lat, lng,
            bedrooms, bathrooms, living_areas, kitchens,
            frequency, preferred_day, preferred_time,
            duration_override_minutes,
            access_notes, special_instructions,
            status, is_demo,
            created_at, updated_at
        FROM clients
        WHERE id = $1
        "#,
    )
    .bind(client_id)
    .fetch_optional(pool)
    .await?;

    Ok(client)
}

/// Insert a new client
pub async fn create_client(pool: &PgPool, client: &Client) -> Result<Client> {
    let created = sqlx::query_as::<_, Client>(
        r#"
        INSERT INTO clients (
            id, name, email, phone, address, suburb,
            lat, lng,
            bedrooms, bathrooms, living_areas, kitchens,
            frequency, preferred_day, preferred_time,
            duration_override_minutes,
            access_notes, special_instructions,
            status, is_demo,
            created_at, updated_at
        )
        VALUES (
            $1, $2, $3, $4, $5, $6,
            $7, $8,
            $9, $10, $11, $12,
            $13, $14, $15,
            $16,
            $17, $18,
            $19, $20,
            $21, $22
        )
        RETURNING
            id, name, email, phone, address, suburb,
            lat, lng,
            bedrooms, bathrooms, living_areas, kitchens,
            frequency, preferred_day, preferred_time,
            duration_override_minutes,
            access_notes, special_instructions,
            status, is_demo,
            created_at, updated_at
        "#,
    )
    .bind(client.id)
    .bind(&client.name)
    .bind(&client.email)
    .bind(&client.phone)
    .bind(&client.address)
    .bind(&client.suburb)
    .bind(client.lat)
    .bind(client.lng)
    .bind(client.bedrooms)
    .bind(client.bathrooms)
    .bind(client.living_areas)
    .bind(client.kitchens)
    .bind(client.frequency)
    .bind(&client.preferred_day)
    .bind(client.preferred_time)
    .bind(client.duration_override_minutes)
    .bind(&client.access_notes)
    .bind(&client.special_instructions)
    .bind(client.status)
    .bind(client.is_demo)
    .bind(client.created_at)
    .bind(client.updated_at)
    .fetch_one(pool)
    .await?;

    Ok(created)
}

/// Replace a client record
pub async fn update_client(pool: &PgPool, client: &Client) -> Result<Client> {
    let updated = sqlx::query_as::<_, Client>(
        r#"
        UPDATE clients SET
            name = $2,
            email = $3,
            phone = $4,
            address = $5,
            suburb = $6,
            lat = $7,
            lng = $8,
            bedrooms = $9,
            bathrooms = $10,
            living_areas = $11,
            kitchens = $12,
            frequency = $13,
            preferred_day = $14,
            preferred_time = $15,
            duration_override_minutes = $16,
            access_notes = $17,
            special_instructions = $18,
            status = $19,
            is_demo = $20,
            updated_at = $21
        WHERE id = $1
        RETURNING
            id, name, email, phone, address, suburb,
            lat, lng,
            bedrooms, bathrooms, living_areas, kitchens,
            frequency, preferred_day, preferred_time,
            duration_override_minutes,
            access_notes, special_instructions,
            status, is_demo,
            created_at, updated_at
        "#,
    )
    .bind(client.id)
    .bind(&client.name)
    .bind(&client.email)
    .bind(&client.phone)
    .bind(&client.address)
    .bind(&client.suburb)
    .bind(client.lat)
    .bind(client.lng)
    .bind(client.bedrooms)
    .bind(client.bathrooms)
    .bind(client.living_areas)
    .bind(client.kitchens)
    .bind(client.frequency)
    .bind(&client.preferred_day)
    .bind(client.preferred_time)
    .bind(client.duration_override_minutes)
    .bind(&client.access_notes)
    .bind(&client.special_instructions)
    .bind(client.status)
    .bind(client.is_demo)
    .bind(client.updated_at)
    .fetch_optional(pool)
    .await?;

    updated.ok_or_else(|| anyhow!("Client {} not found", client.id))
}

/// Delete a client
pub async fn delete_client(pool: &PgPool, client_id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM clients WHERE id = $1")
        .bind(client_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
