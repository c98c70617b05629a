use std::collections::BTreeSet;

use super::levels::{CardsType, LevelKey, LevelModel, StageModel};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ImageCategory {
    Animals,
    Food,
    Nature,
    Objects,
    Outline,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogImage {
    pub name: String,
    pub categories: BTreeSet<ImageCategory>,
}

impl CatalogImage {
    pub fn new(name: &str, categories: &[ImageCategory]) -> Self {
        CatalogImage {
            name: name.to_string(),
            categories: categories.iter().copied().collect(),
        }
    }

    pub fn matches(&self, categories: &[ImageCategory]) -> bool {
        categories.iter().all(|category| self.categories.contains(category))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageCatalog {
    buckets: Vec<Vec<CatalogImage>>,
}

impl ImageCatalog {
    pub fn new(buckets: Vec<Vec<CatalogImage>>) -> Self {
        ImageCatalog { buckets }
    }

    pub fn buckets(&self) -> &[Vec<CatalogImage>] {
        &self.buckets
    }

    pub fn starter_set(&self) -> BTreeSet<String> {
        self.buckets
            .first()
            .map(|bucket| bucket.iter().map(|image| image.name.clone()).collect())
            .unwrap_or_default()
    }

    pub fn all_set(&self) -> BTreeSet<String> {
        self.images().map(|image| image.name.clone()).collect()
    }

    pub fn category_set(&self, category: ImageCategory) -> BTreeSet<String> {
        self.images()
            .filter(|image| image.categories.contains(&category))
            .map(|image| image.name.clone())
            .collect()
    }

    pub fn images(&self) -> impl Iterator<Item = &CatalogImage> {
        self.buckets.iter().flatten()
    }

    pub fn builtin() -> Self {
        use ImageCategory::*;
        let starter = vec![
            CatalogImage::new("cat", &[Animals, Outline]),
            CatalogImage::new("dog", &[Animals]),
            CatalogImage::new("owl", &[Animals, Outline]),
            CatalogImage::new("fox", &[Animals]),
            CatalogImage::new("apple", &[Food, Outline]),
            CatalogImage::new("pear", &[Food]),
            CatalogImage::new("cherry", &[Food]),
            CatalogImage::new("leaf", &[Nature, Outline]),
            CatalogImage::new("sun", &[Nature, Outline]),
            CatalogImage::new("moon", &[Nature, Outline]),
            CatalogImage::new("key", &[Objects, Outline]),
            CatalogImage::new("bell", &[Objects, Outline]),
            CatalogImage::new("kite", &[Objects]),
            CatalogImage::new("anchor", &[Objects, Outline]),
        ];
        let explorer = vec![
            CatalogImage::new("rabbit", &[Animals]),
            CatalogImage::new("turtle", &[Animals, Outline]),
            CatalogImage::new("lemon", &[Food]),
            CatalogImage::new("carrot", &[Food, Outline]),
            CatalogImage::new("cactus", &[Nature]),
            CatalogImage::new("cloud", &[Nature, Outline]),
            CatalogImage::new("umbrella", &[Objects, Outline]),
            CatalogImage::new("guitar", &[Objects]),
        ];
        let collector = vec![
            CatalogImage::new("whale", &[Animals, Outline]),
            CatalogImage::new("panda", &[Animals]),
            CatalogImage::new("grapes", &[Food]),
            CatalogImage::new("croissant", &[Food, Outline]),
            CatalogImage::new("mushroom", &[Nature, Outline]),
            CatalogImage::new("snowflake", &[Nature, Outline]),
            CatalogImage::new("rocket", &[Objects]),
            CatalogImage::new("lantern", &[Objects, Outline]),
        ];
        let master = vec![
            CatalogImage::new("octopus", &[Animals, Outline]),
            CatalogImage::new("hedgehog", &[Animals]),
            CatalogImage::new("pretzel", &[Food, Outline]),
            CatalogImage::new("volcano", &[Nature]),
            CatalogImage::new("compass", &[Objects, Outline]),
            CatalogImage::new("telescope", &[Objects]),
        ];
        ImageCatalog::new(vec![starter, explorer, collector, master])
    }
}

pub fn builtin_stages() -> Vec<StageModel> {
    let pairs = [4, 8, 12, 16];
    let colors = [8, 12, 16];
    let doubles = [6, 10, 14];
    let triples = [9, 12, 18];

    let mut stages = Vec::new();
    stages.push(StageModel::new(
        0,
        "pairs",
        pairs
            .iter()
            .enumerate()
            .map(|(idx, cards)| {
                LevelModel::new(LevelKey::new(0, idx), format!("pairs.{}", idx + 1))
                    .with_cards(*cards, 2)
            })
            .collect(),
    ));
    stages.push(StageModel::new(
        1,
        "colors",
        colors
            .iter()
            .enumerate()
            .map(|(idx, cards)| {
                LevelModel::new(LevelKey::new(1, idx), format!("colors.{}", idx + 1))
                    .with_cards(*cards, 2)
                    .with_cards_type(CardsType::MultiColor { colors_by_deal: 2 + idx })
                    .with_image_category(ImageCategory::Outline)
            })
            .collect(),
    ));
    stages.push(StageModel::new(
        2,
        "doubles",
        doubles
            .iter()
            .enumerate()
            .map(|(idx, cards)| {
                LevelModel::new(LevelKey::new(2, idx), format!("doubles.{}", idx + 1))
                    .with_cards(*cards, 2)
                    .with_cards_type(CardsType::DoubleImage { double_order: idx > 0 })
            })
            .collect(),
    ));
    stages.push(StageModel::new(
        3,
        "triples",
        triples
            .iter()
            .enumerate()
            .map(|(idx, cards)| {
                LevelModel::new(LevelKey::new(3, idx), format!("triples.{}", idx + 1))
                    .with_cards(*cards, 3)
                    .with_dealing(true)
            })
            .collect(),
    ));
    stages
}
