use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle of a todo. The only transition is `OnGoing -> Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text", enum_name = "todo_status_enum")]
pub enum TodoStatus {
    #[sea_orm(string_value = "OnGoing")]
    OnGoing,
    #[sea_orm(string_value = "Done")]
    Done,
}

impl TodoStatus {
    pub fn can_transition_to(self, next: TodoStatus) -> bool {
        self == next || (self == TodoStatus::OnGoing && next == TodoStatus::Done)
    }
}

impl fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl FromStr for TodoStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OnGoing" => Ok(TodoStatus::OnGoing),
            "Done" => Ok(TodoStatus::Done),
            other => Err(format!("unknown todo status '{other}'")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "todos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    // Not a foreign key: a dangling reference is tolerated on write and
    // rejected when the todo is read back.
    pub category_id: i32,
    pub memo: String,
    pub date_time: ChronoDateTimeUtc,
    pub status: TodoStatus,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade",
        on_update = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
