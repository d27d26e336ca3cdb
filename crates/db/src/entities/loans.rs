//! `SeaORM` Entity for loans table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{LoanStatus, RepaymentType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "loans")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub loan_number: String,
    pub borrower_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub amount: Decimal,
    pub status: LoanStatus,
    pub repayment_type: RepaymentType,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))", nullable)]
    pub monthly_installment: Option<Decimal>,
    pub received_at: DateTimeWithTimeZone,
    pub maturity_date: Option<Date>,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_paid: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_remaining: Decimal,
    pub last_collection_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub last_collect_amount: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::borrowers::Entity",
        from = "Column::BorrowerId",
        to = "super::borrowers::Column::Id",
        on_delete = "Cascade"
    )]
    Borrowers,
    #[sea_orm(has_many = "super::collections::Entity")]
    Collections,
}

impl Related<super::borrowers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Borrowers.def()
    }
}

impl Related<super::collections::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Collections.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
