use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::store::{Entity, KeyStrategy};

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Villa {
    pub id: i32,
    pub name: String,
    pub occupancy: i32,
    pub sqft: i32,
    pub image_url: Option<String>,
    pub details: Option<String>,
    pub rate: f64,
    pub amenity: Option<String>,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

impl Villa {
    /// Case-insensitive name comparison used for the uniqueness rule.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

impl Entity for Villa {
    const NAME: &'static str = "Villa";
    const KEY_STRATEGY: KeyStrategy = KeyStrategy::StoreAssigned;

    fn key(&self) -> i32 {
        self.id
    }

    fn set_key(&mut self, key: i32) {
        self.id = key;
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

    fn conflicts_with(&self, other: &Self) -> bool {
        self.id != other.id && self.has_name(&other.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VillaDto {
    pub id: i32,
    pub name: String,
    pub occupancy: i32,
    pub sqft: i32,
    pub image_url: Option<String>,
    pub details: Option<String>,
    pub rate: f64,
    pub amenity: Option<String>,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VillaCreateDto {
    #[validate(length(min = 1, max = 30, message = "Name is required and must be at most 30 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(range(min = 0, message = "Occupancy cannot be negative"))]
    pub occupancy: i32,
    #[serde(default)]
    #[validate(range(min = 0, message = "Sqft cannot be negative"))]
    pub sqft: i32,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "Rate cannot be negative"))]
    pub rate: f64,
    #[serde(default)]
    pub amenity: Option<String>,
}

/// Everything a caller may change on an existing villa. PATCH documents are
/// applied to this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VillaUpdateDto {
    pub id: i32,
    #[validate(length(min = 1, max = 30, message = "Name is required and must be at most 30 characters"))]
    pub name: String,
    #[validate(range(min = 0, message = "Occupancy cannot be negative"))]
    pub occupancy: i32,
    #[validate(range(min = 0, message = "Sqft cannot be negative"))]
    pub sqft: i32,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[validate(range(min = 0.0, message = "Rate cannot be negative"))]
    pub rate: f64,
    #[serde(default)]
    pub amenity: Option<String>,
}

impl From<Villa> for VillaDto {
    fn from(villa: Villa) -> Self {
        Self {
            id: villa.id,
            name: villa.name,
            occupancy: villa.occupancy,
            sqft: villa.sqft,
            image_url: villa.image_url,
            details: villa.details,
            rate: villa.rate,
            amenity: villa.amenity,
            created_date: villa.created_date,
            updated_date: villa.updated_date,
        }
    }
}

impl From<VillaCreateDto> for Villa {
    fn from(dto: VillaCreateDto) -> Self {
        Self {
            id: 0,
            name: dto.name,
            occupancy: dto.occupancy,
            sqft: dto.sqft,
            image_url: dto.image_url,
            details: dto.details,
            rate: dto.rate,
            amenity: dto.amenity,
            created_date: DateTime::<Utc>::default(),
            updated_date: DateTime::<Utc>::default(),
        }
    }
}

impl From<VillaUpdateDto> for Villa {
    fn from(dto: VillaUpdateDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            occupancy: dto.occupancy,
            sqft: dto.sqft,
            image_url: dto.image_url,
            details: dto.details,
            rate: dto.rate,
            amenity: dto.amenity,
            created_date: DateTime::<Utc>::default(),
            updated_date: DateTime::<Utc>::default(),
        }
    }
}

impl From<&Villa> for VillaUpdateDto {
    fn from(villa: &Villa) -> Self {
        Self {
            id: villa.id,
            name: villa.name.clone(),
            occupancy: villa.occupancy,
            sqft: villa.sqft,
            image_url: villa.image_url.clone(),
            details: villa.details.clone(),
            rate: villa.rate,
            amenity: villa.amenity.clone(),
        }
    }
}

impl From<VillaDto> for VillaUpdateDto {
    fn from(dto: VillaDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            occupancy: dto.occupancy,
            sqft: dto.sqft,
            image_url: dto.image_url,
            details: dto.details,
            rate: dto.rate,
            amenity: dto.amenity,
        }
    }
}
