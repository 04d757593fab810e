//! `SubdomainRepository` implementation for `SqliteSubdomainStore`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait,
    ActiveValue::{NotSet, Set},
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    SqlErr, TransactionTrait,
};

use subdomain_orchestrator_core::error::{CoreError, CoreResult};
use subdomain_orchestrator_core::traits::SubdomainRepository;
use subdomain_orchestrator_core::types::{DeleteMode, NewSubdomain, Subdomain, SubdomainStatus};

use super::entity::subdomain;
use super::SqliteSubdomainStore;

fn parse_ts(field: &str, value: &str) -> CoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CoreError::SerializationError(format!("Invalid {field}: {e}")))
}

fn parse_opt_ts(field: &str, value: Option<&str>) -> CoreResult<Option<DateTime<Utc>>> {
    value.map(|v| parse_ts(field, v)).transpose()
}

impl subdomain::Model {
    /// Convert a `SeaORM` row model into a domain `Subdomain`.
    fn into_subdomain(self) -> CoreResult<Subdomain> {
        let port = u16::try_from(self.port)
            .map_err(|e| CoreError::SerializationError(format!("Invalid port: {e}")))?;

        Ok(Subdomain {
            id: self.id,
            status: self.status.parse()?,
            released_at: parse_opt_ts("released_at", self.released_at.as_deref())?,
            cooldown_until: parse_opt_ts("cooldown_until", self.cooldown_until.as_deref())?,
            created_at: parse_ts("created_at", &self.created_at)?,
            updated_at: parse_ts("updated_at", &self.updated_at)?,
            name: self.name,
            owner_id: self.owner_id,
            ip_address: self.ip_address,
            port,
            dns_record_id: self.dns_record_id,
        })
    }
}

/// Convert a domain `Subdomain` into a fully-set active model.
fn subdomain_to_active_model(s: &Subdomain) -> subdomain::ActiveModel {
    subdomain::ActiveModel {
        id: Set(s.id),
        name: Set(s.name.clone()),
        live_name: Set(s.is_live().then(|| s.name.clone())),
        owner_id: Set(s.owner_id.clone()),
        ip_address: Set(s.ip_address.clone()),
        port: Set(i32::from(s.port)),
        status: Set(s.status.as_str().to_string()),
        dns_record_id: Set(s.dns_record_id.clone()),
        released_at: Set(s.released_at.map(|t| t.to_rfc3339())),
        cooldown_until: Set(s.cooldown_until.map(|t| t.to_rfc3339())),
        created_at: Set(s.created_at.to_rfc3339()),
        updated_at: Set(s.updated_at.to_rfc3339()),
    }
}

/// Map a write failure, turning a live-name unique violation into `Conflict`.
fn write_error(action: &str, name: &str, e: &DbErr) -> CoreError {
    if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return CoreError::Conflict(format!("Subdomain '{name}' is already claimed"));
    }
    CoreError::StorageError(format!("Failed to {action}: {e}"))
}

/// Live row for `name`, else the most recent released row.
async fn lookup<C: ConnectionTrait>(conn: &C, name: &str) -> CoreResult<Option<subdomain::Model>> {
    let live = subdomain::Entity::find()
        .filter(subdomain::Column::LiveName.eq(name))
        .one(conn)
        .await
        .map_err(|e| CoreError::StorageError(format!("Failed to query subdomain: {e}")))?;
    if live.is_some() {
        return Ok(live);
    }

    subdomain::Entity::find()
        .filter(subdomain::Column::Name.eq(name))
        .order_by_desc(subdomain::Column::Id)
        .one(conn)
        .await
        .map_err(|e| CoreError::StorageError(format!("Failed to query subdomain: {e}")))
}

#[async_trait]
impl SubdomainRepository for SqliteSubdomainStore {
    async fn create(&self, new: &NewSubdomain) -> CoreResult<Subdomain> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to begin transaction: {e}")))?;

        if let Some(existing) = lookup(&txn, &new.name).await? {
            let existing = existing.into_subdomain()?;
            if existing.is_live() || existing.in_cooldown(new.created_at) {
                return Err(CoreError::Conflict(format!(
                    "Subdomain '{}' is already claimed",
                    new.name
                )));
            }
        }

        let created_at = new.created_at.to_rfc3339();
        let model = subdomain::ActiveModel {
            id: NotSet,
            name: Set(new.name.clone()),
            live_name: Set(Some(new.name.clone())),
            owner_id: Set(Some(new.owner_id.clone())),
            ip_address: Set(None),
            port: Set(i32::from(new.port)),
            status: Set(SubdomainStatus::Reserved.as_str().to_string()),
            dns_record_id: Set(None),
            released_at: Set(None),
            cooldown_until: Set(None),
            created_at: Set(created_at.clone()),
            updated_at: Set(created_at),
        }
        .insert(&txn)
        .await
        .map_err(|e| write_error("create subdomain", &new.name, &e))?;

        txn.commit()
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to commit subdomain: {e}")))?;

        model.into_subdomain()
    }

    async fn find_by_name(&self, name: &str) -> CoreResult<Option<Subdomain>> {
        lookup(&self.db, name)
            .await?
            .map(subdomain::Model::into_subdomain)
            .transpose()
    }

    async fn find_by_id(&self, id: i64) -> CoreResult<Option<Subdomain>> {
        let row = subdomain::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to query subdomain: {e}")))?;

        row.map(subdomain::Model::into_subdomain).transpose()
    }

    async fn update(&self, subdomain: &Subdomain) -> CoreResult<Subdomain> {
        let exists = subdomain::Entity::find_by_id(subdomain.id)
            .one(&self.db)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to query subdomain: {e}")))?
            .is_some();
        if !exists {
            return Err(CoreError::NotFound(format!(
                "Subdomain {} not found",
                subdomain.id
            )));
        }

        subdomain_to_active_model(subdomain)
            .update(&self.db)
            .await
            .map_err(|e| write_error("update subdomain", &subdomain.name, &e))?
            .into_subdomain()
    }

    async fn delete(&self, id: i64, mode: DeleteMode) -> CoreResult<()> {
        match mode {
            DeleteMode::Hard => {
                let result = subdomain::Entity::delete_by_id(id)
                    .exec(&self.db)
                    .await
                    .map_err(|e| {
                        CoreError::StorageError(format!("Failed to delete subdomain: {e}"))
                    })?;
                if result.rows_affected == 0 {
                    return Err(CoreError::NotFound(format!("Subdomain {id} not found")));
                }
                Ok(())
            }
            DeleteMode::Soft { at } => {
                let current = self
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| CoreError::NotFound(format!("Subdomain {id} not found")))?;
                let retired = Subdomain {
                    owner_id: None,
                    ip_address: None,
                    status: SubdomainStatus::Released,
                    dns_record_id: None,
                    released_at: Some(at),
                    cooldown_until: None,
                    updated_at: at,
                    ..current
                };
                self.update(&retired).await.map(|_| ())
            }
        }
    }

    async fn count_by_owner(&self, owner_id: &str) -> CoreResult<u64> {
        subdomain::Entity::find()
            .filter(subdomain::Column::OwnerId.eq(owner_id))
            .filter(subdomain::Column::LiveName.is_not_null())
            .count(&self.db)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to count subdomains: {e}")))
    }

    async fn list_by_status(&self, status: SubdomainStatus) -> CoreResult<Vec<Subdomain>> {
        let rows = subdomain::Entity::find()
            .filter(subdomain::Column::Status.eq(status.as_str()))
            .order_by_asc(subdomain::Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to list subdomains: {e}")))?;

        rows.into_iter()
            .map(subdomain::Model::into_subdomain)
            .collect()
    }
}
