use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "services")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub name: String,
    pub price_cents: i64,
    pub average_minutes: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::queue_services::Entity")]
    QueueServices,
}

impl Related<super::queue_services::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QueueServices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
