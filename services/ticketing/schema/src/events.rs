use sea_orm::entity::prelude::*;

/// Event with denormalized attendance counters.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub starts_at: chrono::DateTime<chrono::Utc>,
    pub ends_at: chrono::DateTime<chrono::Utc>,
    pub max_attendees: Option<i32>,
    pub registered_count: i32,
    pub checked_in_count: i32,
    pub removed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sections::Entity")]
    Sections,
    #[sea_orm(has_many = "super::ticket_packages::Entity")]
    TicketPackages,
}

impl Related<super::sections::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sections.def()
    }
}

impl Related<super::ticket_packages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TicketPackages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
