use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Subdomain::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Subdomain::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Subdomain::Name).string().not_null())
                    // NULL for released rows; SQLite allows many NULLs under UNIQUE
                    .col(ColumnDef::new(Subdomain::LiveName).string().null().unique_key())
                    .col(ColumnDef::new(Subdomain::OwnerId).string().null())
                    .col(ColumnDef::new(Subdomain::IpAddress).string().null())
                    .col(
                        ColumnDef::new(Subdomain::Port)
                            .integer()
                            .not_null()
                            .default(80),
                    )
                    .col(ColumnDef::new(Subdomain::Status).string().not_null())
                    .col(ColumnDef::new(Subdomain::DnsRecordId).string().null())
                    .col(ColumnDef::new(Subdomain::ReleasedAt).string().null())
                    .col(ColumnDef::new(Subdomain::CooldownUntil).string().null())
                    .col(ColumnDef::new(Subdomain::CreatedAt).string().not_null())
                    .col(ColumnDef::new(Subdomain::UpdatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_subdomains_name")
                    .table(Subdomain::Table)
                    .col(Subdomain::Name)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_subdomains_owner_id")
                    .table(Subdomain::Table)
                    .col(Subdomain::OwnerId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Subdomain::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Subdomain {
    #[sea_orm(iden = "subdomains")]
    Table,
    Id,
    Name,
    LiveName,
    OwnerId,
    IpAddress,
    Port,
    Status,
    DnsRecordId,
    ReleasedAt,
    CooldownUntil,
    CreatedAt,
    UpdatedAt,
}
