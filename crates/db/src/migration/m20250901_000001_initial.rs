//! Initial schema.
//!
//! Tables are generated from the entities so the same migration runs on
//! PostgreSQL and on the SQLite databases used in tests.

use sea_orm::{EntityName, EntityTrait, Schema};
use sea_orm_migration::prelude::*;

use crate::entities::{
    activity_logs, advance_periods, advance_requests, borrowers, collections, loans,
    salary_statements, upload_logs, users,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

fn create<E: EntityTrait>(schema: &Schema, entity: E) -> TableCreateStatement {
    schema
        .create_table_from_entity(entity)
        .if_not_exists()
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        // Referenced tables first.
        for table in [
            create(&schema, users::Entity),
            create(&schema, salary_statements::Entity),
            create(&schema, upload_logs::Entity),
            create(&schema, advance_periods::Entity),
            create(&schema, advance_requests::Entity),
            create(&schema, borrowers::Entity),
            create(&schema, loans::Entity),
            create(&schema, collections::Entity),
            create(&schema, activity_logs::Entity),
        ] {
            manager.create_table(table).await?;
        }

        // One request per employee, type and period.
        manager
            .create_index(
                Index::create()
                    .name("uq_advance_requests_user_type_period")
                    .table(advance_requests::Entity)
                    .col(advance_requests::Column::UserId)
                    .col(advance_requests::Column::AdvanceType)
                    .col(advance_requests::Column::PeriodId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_salary_statements_month_user")
                    .table(salary_statements::Entity)
                    .col(salary_statements::Column::Month)
                    .col(salary_statements::Column::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_loans_borrower")
                    .table(loans::Entity)
                    .col(loans::Column::BorrowerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_collections_loan")
                    .table(collections::Entity)
                    .col(collections::Column::LoanId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            activity_logs::Entity.table_name(),
            collections::Entity.table_name(),
            loans::Entity.table_name(),
            borrowers::Entity.table_name(),
            advance_requests::Entity.table_name(),
            advance_periods::Entity.table_name(),
            upload_logs::Entity.table_name(),
            salary_statements::Entity.table_name(),
            users::Entity.table_name(),
        ] {
            manager
                .drop_table(Table::drop().table(Alias::new(table)).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}
