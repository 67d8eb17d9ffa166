//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Self-declared gender.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(1))")]
pub enum Gender {
    #[sea_orm(string_value = "M")]
    #[serde(rename = "M")]
    #[default]
    Male,
    #[sea_orm(string_value = "F")]
    #[serde(rename = "F")]
    Female,
    #[sea_orm(string_value = "O")]
    #[serde(rename = "O")]
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Trimmed, lowercased email address
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2 PHC string
    pub password_hash: String,

    pub first_name: String,

    pub last_name: String,

    pub age: i32,

    pub gender: Gender,

    pub photo_url: String,

    #[sea_orm(column_type = "Text")]
    pub about: String,

    /// JSON array of normalized skill strings
    #[sea_orm(column_type = "JsonBinary")]
    pub skills: Json,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Skills as plain strings. Non-string entries are skipped.
    #[must_use]
    pub fn skill_list(&self) -> Vec<String> {
        self.skills
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(ToString::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
