use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::{Villa, VillaDto};
use crate::store::{Entity, KeyStrategy};

/// Name of the relation that loads the owning villa.
pub const VILLA_INCLUDE: &str = "villa";

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct VillaNumber {
    pub villa_no: i32,
    pub villa_id: i32,
    pub special_details: Option<String>,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
    /// Only populated when the read asked for `include = "villa"`.
    #[sqlx(skip)]
    pub villa: Option<Villa>,
}

impl Entity for VillaNumber {
    const NAME: &'static str = "VillaNumber";
    const KEY_STRATEGY: KeyStrategy = KeyStrategy::CallerAssigned;
    const INCLUDES: &'static [&'static str] = &[VILLA_INCLUDE];

    fn key(&self) -> i32 {
        self.villa_no
    }

    fn set_key(&mut self, key: i32) {
        self.villa_no = key;
    }

    fn created_date(&self) -> DateTime<Utc> {
        self.created_date
    }

    fn set_created_date(&mut self, at: DateTime<Utc>) {
        self.created_date = at;
    }

    fn set_updated_date(&mut self, at: DateTime<Utc>) {
        self.updated_date = at;
    }

    fn clear_includes(&mut self) {
        self.villa = None;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VillaNumberDto {
    pub villa_no: i32,
    pub villa_id: i32,
    pub special_details: Option<String>,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub villa: Option<VillaDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VillaNumberCreateDto {
    #[validate(range(min = 1, message = "Villa number must be positive"))]
    pub villa_no: i32,
    #[validate(range(min = 1, message = "Villa id must be positive"))]
    pub villa_id: i32,
    #[serde(default)]
    pub special_details: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VillaNumberUpdateDto {
    #[validate(range(min = 1, message = "Villa number must be positive"))]
    pub villa_no: i32,
    #[validate(range(min = 1, message = "Villa id must be positive"))]
    pub villa_id: i32,
    #[serde(default)]
    pub special_details: Option<String>,
}

impl From<VillaNumber> for VillaNumberDto {
    fn from(number: VillaNumber) -> Self {
        Self {
            villa_no: number.villa_no,
            villa_id: number.villa_id,
            special_details: number.special_details,
            created_date: number.created_date,
            updated_date: number.updated_date,
            villa: number.villa.map(VillaDto::from),
        }
    }
}

impl From<VillaNumberCreateDto> for VillaNumber {
    fn from(dto: VillaNumberCreateDto) -> Self {
        Self {
            villa_no: dto.villa_no,
            villa_id: dto.villa_id,
            special_details: dto.special_details,
            created_date: DateTime::<Utc>::default(),
            updated_date: DateTime::<Utc>::default(),
            villa: None,
        }
    }
}

impl From<VillaNumberUpdateDto> for VillaNumber {
    fn from(dto: VillaNumberUpdateDto) -> Self {
        Self {
            villa_no: dto.villa_no,
            villa_id: dto.villa_id,
            special_details: dto.special_details,
            created_date: DateTime::<Utc>::default(),
            updated_date: DateTime::<Utc>::default(),
            villa: None,
        }
    }
}

impl From<&VillaNumber> for VillaNumberUpdateDto {
    fn from(number: &VillaNumber) -> Self {
        Self {
            villa_no: number.villa_no,
            villa_id: number.villa_id,
            special_details: number.special_details.clone(),
        }
    }
}

impl From<VillaNumberDto> for VillaNumberUpdateDto {
    fn from(dto: VillaNumberDto) -> Self {
        Self {
            villa_no: dto.villa_no,
            villa_id: dto.villa_id,
            special_details: dto.special_details,
        }
    }
}
