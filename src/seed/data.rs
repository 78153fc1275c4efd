use anyhow::{Context, Result};
use log::info;

use crate::model::{Villa, VillaCreateDto};
use crate::store::{villa_repository, VillaStore};

/// Demo villas loaded on startup when `seed = true`.
pub fn demo_villas() -> Vec<VillaCreateDto> {
    vec![
        demo_villa("Pool View", 3, 100),
        demo_villa("Beach View", 4, 200),
    ]
}

fn demo_villa(name: &str, occupancy: i32, sqft: i32) -> VillaCreateDto {
    VillaCreateDto {
        name: name.to_string(),
        occupancy,
        sqft,
        image_url: None,
        details: None,
        rate: 0.0,
        amenity: None,
    }
}

/// Creates every demo villa whose name is not taken yet. Returns how many were added.
pub async fn load_seed_data<S: VillaStore>(store: &S) -> Result<usize> {
    let villas = villa_repository(store);
    let mut loaded = 0;

    for dto in demo_villas() {
        let name = dto.name.clone();
        let existing = villas
            .get(&|villa: &Villa| villa.has_name(&name), false, None)
            .await
            .with_context(|| format!("Failed to look up seed villa {}", name))?;
        if existing.is_some() {
            continue;
        }

        villas
            .create(Villa::from(dto))
            .await
            .with_context(|| format!("Failed to create seed villa {}", name))?;
        loaded += 1;
    }

    info!("Seed data: {} villa(s) added", loaded);
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, Repository};

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let store = MemoryStore::new();

        assert_eq!(load_seed_data(&store).await.unwrap(), 2);
        assert_eq!(load_seed_data(&store).await.unwrap(), 0);

        let villas = Repository::<Villa>::get_all(&store, None, None).await.unwrap();
        let names: Vec<_> = villas.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["Pool View", "Beach View"]);
        assert_eq!(villas[1].sqft, 200);
    }
}
