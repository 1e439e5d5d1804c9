use anyhow::Result;
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::prelude::*;
use std::time::Duration;
use tracing::{error, info};

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_customers_table::Migration),
            Box::new(m20240301_000002_create_shipments_table::Migration),
            Box::new(m20240301_000003_create_partial_shipments_table::Migration),
            Box::new(m20240301_000004_create_packages_table::Migration),
            Box::new(m20240301_000005_create_items_table::Migration),
        ]
    }
}

mod m20240301_000001_create_customers_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_customers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Customers::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Customers::Name).string().not_null())
                        .col(ColumnDef::new(Customers::Phone).string().null())
                        .col(ColumnDef::new(Customers::Address).string().not_null())
                        .col(
                            ColumnDef::new(Customers::Balance)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Customers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_customers_name")
                        .table(Customers::Table)
                        .col(Customers::Name)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Customers {
        Table,
        Id,
        Name,
        Phone,
        Address,
        Balance,
        CreatedAt,
    }
}

mod m20240301_000002_create_shipments_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_shipments_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Shipments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Shipments::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Shipments::Destination).string().not_null())
                        .col(
                            ColumnDef::new(Shipments::DateCreated)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Shipments::IsOpen)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Shipments::TotalWeight)
                                .double()
                                .not_null()
                                .default(0.0),
                        )
                        .col(
                            ColumnDef::new(Shipments::TotalVolume)
                                .double()
                                .not_null()
                                .default(0.0),
                        )
                        .col(ColumnDef::new(Shipments::DriverName).string().null())
                        .col(ColumnDef::new(Shipments::DriverVehicle).string().null())
                        .col(
                            ColumnDef::new(Shipments::DateClosed)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(Shipments::Note).text().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_shipments_is_open")
                        .table(Shipments::Table)
                        .col(Shipments::IsOpen)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_shipments_date_created")
                        .table(Shipments::Table)
                        .col(Shipments::DateCreated)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Shipments::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Shipments {
        Table,
        Id,
        Destination,
        DateCreated,
        IsOpen,
        TotalWeight,
        TotalVolume,
        DriverName,
        DriverVehicle,
        DateClosed,
        Note,
    }
}

mod m20240301_000003_create_partial_shipments_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_partial_shipments_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PartialShipments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PartialShipments::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(PartialShipments::ShipmentId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PartialShipments::CustomerId)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PartialShipments::ReceiverName).string().null())
                        .col(ColumnDef::new(PartialShipments::ReceiverPhone).string().null())
                        .col(
                            ColumnDef::new(PartialShipments::ReceiverAddress)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PartialShipments::Volume)
                                .double()
                                .not_null()
                                .default(0.0),
                        )
                        .col(
                            ColumnDef::new(PartialShipments::Cost)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PartialShipments::AmountPaid)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PartialShipments::PaymentStatus)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PartialShipments::PaymentResponsibility)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PartialShipments::IsPaid)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(PartialShipments::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_partial_shipments_shipment_id")
                                .from(PartialShipments::Table, PartialShipments::ShipmentId)
                                .to(Shipments::Table, Shipments::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_partial_shipments_customer_id")
                                .from(PartialShipments::Table, PartialShipments::CustomerId)
                                .to(Customers::Table, Customers::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_partial_shipments_shipment_id")
                        .table(PartialShipments::Table)
                        .col(PartialShipments::ShipmentId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_partial_shipments_customer_id")
                        .table(PartialShipments::Table)
                        .col(PartialShipments::CustomerId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PartialShipments::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum PartialShipments {
        Table,
        Id,
        ShipmentId,
        CustomerId,
        ReceiverName,
        ReceiverPhone,
        ReceiverAddress,
        Volume,
        Cost,
        AmountPaid,
        PaymentStatus,
        PaymentResponsibility,
        IsPaid,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Shipments {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Customers {
        Table,
        Id,
    }
}

mod m20240301_000004_create_packages_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_packages_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Packages::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Packages::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Packages::PartialShipmentId)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Packages::Length).double().not_null())
                        .col(ColumnDef::new(Packages::Width).double().not_null())
                        .col(ColumnDef::new(Packages::Height).double().not_null())
                        .col(ColumnDef::new(Packages::Weight).double().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_packages_partial_shipment_id")
                                .from(Packages::Table, Packages::PartialShipmentId)
                                .to(PartialShipments::Table, PartialShipments::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_packages_partial_shipment_id")
                        .table(Packages::Table)
                        .col(Packages::PartialShipmentId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Packages::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Packages {
        Table,
        Id,
        PartialShipmentId,
        Length,
        Width,
        Height,
        Weight,
    }

    #[derive(DeriveIden)]
    enum PartialShipments {
        Table,
        Id,
    }
}

mod m20240301_000005_create_items_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000005_create_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Items::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Items::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Items::PartialShipmentId).integer().not_null())
                        .col(ColumnDef::new(Items::Weight).double().not_null())
                        .col(ColumnDef::new(Items::Origin).string().not_null())
                        .col(ColumnDef::new(Items::Hscode).string().not_null())
                        .col(ColumnDef::new(Items::Amount).double().not_null())
                        .col(ColumnDef::new(Items::Value).decimal().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_items_partial_shipment_id")
                                .from(Items::Table, Items::PartialShipmentId)
                                .to(PartialShipments::Table, PartialShipments::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_items_partial_shipment_id")
                        .table(Items::Table)
                        .col(Items::PartialShipmentId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Items::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Items {
        Table,
        Id,
        PartialShipmentId,
        Weight,
        Origin,
        Hscode,
        Amount,
        Value,
    }

    #[derive(DeriveIden)]
    enum PartialShipments {
        Table,
        Id,
    }
}

/// Connects to `db_url` and applies every pending migration.
pub async fn run_migration(db_url: &str) -> Result<()> {
    info!("Setting up database connection for migrations");

    let mut opt = ConnectOptions::new(db_url);
    opt.max_connections(2)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(30))
        .sqlx_logging(true);

    let db = Database::connect(opt).await?;

    info!("Running database migrations");

    match Migrator::up(&db, None).await {
        Ok(_) => {
            info!("Migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Migration failed: {}", e);
            Err(e.into())
        }
    }
}
