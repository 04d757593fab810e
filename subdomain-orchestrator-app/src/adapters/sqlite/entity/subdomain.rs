//! `SeaORM` entity for the `subdomains` table.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "subdomains")]
/// Database row model for one subdomain, live or released.
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    /// Equal to `name` while the row is live, NULL once released. The unique
    /// index on this column enforces one live row per name.
    #[sea_orm(unique)]
    pub live_name: Option<String>,
    pub owner_id: Option<String>,
    pub ip_address: Option<String>,
    pub port: i32,
    pub status: String,
    pub dns_record_id: Option<String>,
    pub released_at: Option<String>,
    pub cooldown_until: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
