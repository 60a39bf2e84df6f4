use chrono::{NaiveDate, Utc};
use sea_orm::{entity::prelude::*, ActiveValue::NotSet, Set};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

use crate::errors::ServiceError;

/// A customer account record.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "accounts")]
#[schema(as = Account, example = json!({
    "id": 1,
    "name": "Jane Doe",
    "email": "jane@example.com",
    "address": "1 Main St",
    "phone_number": "555-1234",
    "date_joined": "2024-01-15"
}))]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub email: String,
    pub address: String,
    pub phone_number: String,
    pub date_joined: NaiveDate,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "id": self.id,
            "name": self.name,
            "email": self.email,
            "address": self.address,
            "phone_number": self.phone_number,
            "date_joined": self.date_joined.format("%Y-%m-%d").to_string(),
        })
    }
}

/// Client-supplied fields of an account. `id` is never read from a payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "name": "Jane Doe",
    "email": "jane@example.com",
    "address": "1 Main St",
    "phone_number": "555-1234"
}))]
pub struct AccountPayload {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    #[validate(length(max = 64))]
    pub email: String,
    #[validate(length(max = 256))]
    pub address: String,
    #[validate(length(max = 32))]
    pub phone_number: String,
    /// Defaults to today (UTC) when absent or null
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_joined: Option<NaiveDate>,
}

impl AccountPayload {
    /// Parses and validates a JSON body.
    pub fn from_json(value: &Value) -> Result<Self, ServiceError> {
        if !value.is_object() {
            return Err(ServiceError::ValidationError(
                "Invalid Account: body of request contained bad or no data".to_string(),
            ));
        }

        let payload: AccountPayload = serde_json::from_value(value.clone())
            .map_err(|e| ServiceError::ValidationError(format!("Invalid Account: {}", e)))?;
        payload.validate()?;
        Ok(payload)
    }

    pub fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            id: NotSet,
            name: Set(self.name),
            email: Set(self.email),
            address: Set(self.address),
            phone_number: Set(self.phone_number),
            date_joined: Set(self.date_joined.unwrap_or_else(today)),
        }
    }

    /// Replaces every mutable field of an existing record.
    pub fn apply_to(self, model: &mut ActiveModel) {
        model.name = Set(self.name);
        model.email = Set(self.email);
        model.address = Set(self.address);
        model.phone_number = Set(self.phone_number);
        model.date_joined = Set(self.date_joined.unwrap_or_else(today));
    }
}

impl From<&Model> for AccountPayload {
    fn from(model: &Model) -> Self {
        Self {
            name: model.name.clone(),
            email: model.email.clone(),
            address: model.address.clone(),
            phone_number: model.phone_number.clone(),
            date_joined: Some(model.date_joined),
        }
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
