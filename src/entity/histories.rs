use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "histories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub barber_id: Uuid,
    pub payment_method: String,
    pub installments: i16,
    pub gross_cents: i64,
    pub fee_cents: i64,
    pub net_cents: i64,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::barbers::Entity",
        from = "Column::BarberId",
        to = "super::barbers::Column::Id"
    )]
    Barbers,
    #[sea_orm(has_many = "super::history_services::Entity")]
    HistoryServices,
    #[sea_orm(has_many = "super::history_items::Entity")]
    HistoryItems,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::barbers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Barbers.def()
    }
}

impl Related<super::history_services::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HistoryServices.def()
    }
}

impl Related<super::history_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HistoryItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
