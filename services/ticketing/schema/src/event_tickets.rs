use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "event_tickets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub event_id: Uuid,
    pub package_id: Uuid,
    pub order_id: Uuid,
    pub attendee_name: Option<String>,
    pub attendee_email: Option<String>,
    pub attendee_phone: Option<String>,
    #[sea_orm(unique)]
    pub qr_code: String,
    pub status: String,
    pub checked_in_at: Option<chrono::DateTime<chrono::Utc>>,
    pub seat_id: Option<Uuid>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price: Decimal,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ticket_orders::Entity",
        from = "Column::OrderId",
        to = "super::ticket_orders::Column::Id"
    )]
    TicketOrder,
}

impl Related<super::ticket_orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TicketOrder.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
