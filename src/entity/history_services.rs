use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "history_services")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub history_id: Uuid,
    pub service_id: Uuid,
    pub price_cents: i64,
    pub is_extra: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::histories::Entity",
        from = "Column::HistoryId",
        to = "super::histories::Column::Id"
    )]
    Histories,
}

impl Related<super::histories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Histories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
