//! Vehicle persistence used by the geocoding runner.
//!
//! Only two things are read (a vehicle by id, vehicles lacking coordinates)
//! and one thing is written (the address plus `updated_at`).

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use roadshare_common::{Address, Vehicle};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

#[async_trait]
pub trait VehicleStore: Send + Sync {
    async fn find_vehicle(&self, id: Uuid) -> Result<Option<Vehicle>>;

    /// Up to `limit` vehicles whose address lacks latitude OR longitude,
    /// including vehicles with no address at all.
    async fn vehicles_missing_coordinates(&self, limit: usize) -> Result<Vec<Vehicle>>;

    async fn vehicles_with_coordinates(&self) -> Result<Vec<Vehicle>>;

    async fn update_address(
        &self,
        id: Uuid,
        address: &Address,
        updated_at: DateTime<Utc>,
    ) -> Result<()>;
}

#[derive(Debug, sqlx::FromRow)]
struct VehicleRow {
    id: Uuid,
    title: String,
    address: Option<Json<Address>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<VehicleRow> for Vehicle {
    fn from(row: VehicleRow) -> Self {
        Vehicle {
            id: row.id,
            title: row.title,
            address: row.address.map(|Json(a)| a),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct PgVehicleStore {
    pool: PgPool,
}

impl PgVehicleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, vehicle: &Vehicle) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO vehicles (id, title, address, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(vehicle.id)
        .bind(&vehicle.title)
        .bind(vehicle.address.as_ref().map(Json))
        .bind(vehicle.created_at)
        .bind(vehicle.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl VehicleStore for PgVehicleStore {
    async fn find_vehicle(&self, id: Uuid) -> Result<Option<Vehicle>> {
        let row = sqlx::query_as::<_, VehicleRow>(
            "SELECT id, title, address, created_at, updated_at FROM vehicles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Vehicle::from))
    }

    async fn vehicles_missing_coordinates(&self, limit: usize) -> Result<Vec<Vehicle>> {
        let rows = sqlx::query_as::<_, VehicleRow>(
            r#"
            SELECT id, title, address, created_at, updated_at
            FROM vehicles
            WHERE address->>'latitude' IS NULL OR address->>'longitude' IS NULL
            ORDER BY created_at
            LIMIT $1
            "#,
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Vehicle::from).collect())
    }

    async fn vehicles_with_coordinates(&self) -> Result<Vec<Vehicle>> {
        let rows = sqlx::query_as::<_, VehicleRow>(
            r#"
            SELECT id, title, address, created_at, updated_at
            FROM vehicles
            WHERE address->>'latitude' IS NOT NULL AND address->>'longitude' IS NOT NULL
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Vehicle::from).collect())
    }

    async fn update_address(
        &self,
        id: Uuid,
        address: &Address,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let result = sqlx::query("UPDATE vehicles SET address = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(Json(address))
            .bind(updated_at)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            bail!("vehicle {id} not found");
        }
        Ok(())
    }
}
