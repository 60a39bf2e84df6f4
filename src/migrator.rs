use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20240101_000001_create_accounts_table::Migration)]
    }
}

mod m20240101_000001_create_accounts_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_accounts_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Column widths match the validation limits on AccountPayload
            manager
                .create_table(
                    Table::create()
                        .table(Accounts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Accounts::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Accounts::Name).string_len(64).not_null())
                        .col(ColumnDef::new(Accounts::Email).string_len(64).not_null())
                        .col(ColumnDef::new(Accounts::Address).string_len(256).not_null())
                        .col(
                            ColumnDef::new(Accounts::PhoneNumber)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Accounts::DateJoined).date().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Accounts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Accounts {
        Table,
        Id,
        Name,
        Email,
        Address,
        PhoneNumber,
        DateJoined,
    }
}
