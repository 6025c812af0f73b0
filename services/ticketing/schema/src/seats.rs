use sea_orm::entity::prelude::*;

/// Seat inventory. `status` is stored raw; a `reserved` row whose
/// `reserved_until` has passed is available to readers. `held_by_order` is set
/// while the hold belongs to a pending order.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "seats")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub section_id: Uuid,
    pub seat_number: String,
    #[sea_orm(column_name = "row")]
    pub row_index: i32,
    #[sea_orm(column_name = "column")]
    pub column_index: i32,
    pub status: String,
    pub reserved_until: Option<chrono::DateTime<chrono::Utc>>,
    pub held_by: Option<Uuid>,
    pub held_by_order: Option<Uuid>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price_modifier: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sections::Entity",
        from = "Column::SectionId",
        to = "super::sections::Column::Id"
    )]
    Section,
}

impl Related<super::sections::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Section.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
