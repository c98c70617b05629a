use std::collections::BTreeSet;
use std::sync::Arc;

use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

use super::catalog::{ImageCatalog, ImageCategory};
use super::error::GameError;
use super::store::ProgressStore;

pub struct ImagesLibraryModel {
    catalog: ImageCatalog,
    unlocked_set: BTreeSet<String>,
    store: Arc<dyn ProgressStore>,
    rng: StdRng,
}

impl ImagesLibraryModel {
    pub fn load(catalog: ImageCatalog, store: Arc<dyn ProgressStore>) -> Self {
        Self::with_rng(catalog, store, StdRng::from_os_rng())
    }

    pub fn with_rng(catalog: ImageCatalog, store: Arc<dyn ProgressStore>, rng: StdRng) -> Self {
        let mut library = ImagesLibraryModel {
            catalog,
            unlocked_set: BTreeSet::new(),
            store,
            rng,
        };
        library.reload();
        library
    }

    pub fn reload(&mut self) {
        self.unlocked_set = match self.store.load_unlocked_image_set() {
            Ok(images) => images,
            Err(err) => {
                warn!("[Images] could not load unlocked images: {}", err);
                BTreeSet::new()
            }
        };
    }

    pub fn save(&self) -> Result<(), GameError> {
        self.store.save_unlocked_image_set(&self.unlocked_set)?;
        Ok(())
    }

    pub fn catalog(&self) -> &ImageCatalog {
        &self.catalog
    }

    pub fn unlocked_set(&self) -> &BTreeSet<String> {
        &self.unlocked_set
    }

    pub fn starter_set(&self) -> BTreeSet<String> {
        self.catalog.starter_set()
    }

    pub fn available_set(&self) -> BTreeSet<String> {
        let all = self.catalog.all_set();
        self.unlocked_set
            .union(&self.starter_set())
            .filter(|name| all.contains(*name))
            .cloned()
            .collect()
    }

    pub fn locked_set(&self) -> BTreeSet<String> {
        let starter = self.starter_set();
        self.catalog
            .all_set()
            .into_iter()
            .filter(|name| !self.unlocked_set.contains(name) && !starter.contains(name))
            .collect()
    }

    pub fn images_for_category(&self, category: Option<ImageCategory>) -> BTreeSet<String> {
        let available = self.available_set();
        let Some(category) = category else {
            return available;
        };
        let filtered: BTreeSet<String> = available
            .intersection(&self.catalog.category_set(category))
            .cloned()
            .collect();
        if filtered.is_empty() { available } else { filtered }
    }

    // Locked images of the earliest bucket holding one that fits every
    // category. When none fits, the last category is dropped and the search
    // starts over.
    fn locked_candidates(&self, categories: &[ImageCategory]) -> Option<Vec<String>> {
        let locked = self.locked_set();
        if locked.is_empty() {
            return None;
        }
        for bucket in self.catalog.buckets() {
            let candidates: Vec<String> = bucket
                .iter()
                .filter(|image| locked.contains(&image.name) && image.matches(categories))
                .map(|image| image.name.clone())
                .collect();
            if !candidates.is_empty() {
                return Some(candidates);
            }
        }
        let (_, preferred) = categories.split_last()?;
        self.locked_candidates(preferred)
    }

    pub fn locked_image_available(&mut self, categories: &[ImageCategory]) -> Option<String> {
        let candidates = self.locked_candidates(categories)?;
        candidates.choose(&mut self.rng).cloned()
    }

    pub fn has_locked_image(
        &self,
        prefer_category1: Option<ImageCategory>,
        prefer_category2: Option<ImageCategory>,
    ) -> bool {
        let categories: Vec<ImageCategory> =
            [prefer_category1, prefer_category2].into_iter().flatten().collect();
        self.locked_candidates(&categories).is_some()
    }

    pub(super) fn unlock_new_image_unsaved(
        &mut self,
        prefer_category1: Option<ImageCategory>,
        prefer_category2: Option<ImageCategory>,
    ) -> Option<String> {
        let categories: Vec<ImageCategory> =
            [prefer_category1, prefer_category2].into_iter().flatten().collect();
        let name = self.locked_image_available(&categories)?;
        self.unlocked_set.insert(name.clone());
        info!("[Images] unlocked {}", name);
        Some(name)
    }

    pub fn unlock_new_image(
        &mut self,
        prefer_category1: Option<ImageCategory>,
        prefer_category2: Option<ImageCategory>,
    ) -> Result<Option<String>, GameError> {
        let Some(name) = self.unlock_new_image_unsaved(prefer_category1, prefer_category2) else {
            return Ok(None);
        };
        if let Err(err) = self.save() {
            self.unlocked_set.remove(&name);
            return Err(err);
        }
        Ok(Some(name))
    }
}
