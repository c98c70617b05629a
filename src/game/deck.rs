use std::collections::{BTreeSet, HashSet, VecDeque};
use std::sync::Arc;

use log::debug;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};

use super::card::{CardImages, MatchingCardsModel};
use super::colors::{CardColor, ColorsLibrary};

pub const RENEWING_DEALS_MEMORY: usize = 4;

pub trait Deck: Send {
    fn unique_matching_cards_model(&mut self) -> Option<Arc<MatchingCardsModel>>;
    fn new_deal(&mut self, renewing_images: bool);
    fn remaining_matching_cards_models(&self) -> usize;
    fn colors_library(&self) -> &ColorsLibrary;
}

#[derive(Clone, Debug)]
pub struct ImagesPicker {
    images: Vec<String>,
    remaining: Vec<String>,
    delivered: Vec<String>,
    history: VecDeque<HashSet<String>>,
}

impl ImagesPicker {
    pub fn new<I, S>(images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let images: Vec<String> = images
            .into_iter()
            .map(Into::into)
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect();
        ImagesPicker {
            remaining: images.clone(),
            images,
            delivered: Vec::new(),
            history: VecDeque::new(),
        }
    }

    pub fn new_deal(&mut self, renewing_images: bool) {
        if renewing_images {
            if !self.delivered.is_empty() {
                self.history
                    .push_front(self.delivered.iter().cloned().collect());
                self.history.truncate(RENEWING_DEALS_MEMORY);
            }
        } else {
            self.history.clear();
        }
        self.delivered.clear();
        self.remaining = self.images.clone();
    }

    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    pub fn recent_deals(&self) -> usize {
        self.history.len()
    }

    fn freshness(&self, image: &str) -> usize {
        self.history
            .iter()
            .position(|deal| deal.contains(image))
            .unwrap_or(self.history.len())
    }

    pub fn pick(&mut self, rng: &mut StdRng) -> Option<String> {
        let best = self
            .remaining
            .iter()
            .map(|image| self.freshness(image))
            .max()?;
        let candidates: Vec<usize> = (0..self.remaining.len())
            .filter(|&idx| self.freshness(&self.remaining[idx]) == best)
            .collect();
        let idx = *candidates.choose(rng)?;
        let image = self.remaining.swap_remove(idx);
        self.delivered.push(image.clone());
        Some(image)
    }
}

pub struct SingleImageDeck {
    picker: ImagesPicker,
    colors: ColorsLibrary,
    colors_by_deal: usize,
    deal_colors: Vec<CardColor>,
    buffer: Vec<(String, CardColor)>,
    rng: StdRng,
}

impl SingleImageDeck {
    pub fn new<I, S>(images: I, colors_by_deal: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_rng(
            ImagesPicker::new(images),
            ColorsLibrary::default(),
            colors_by_deal,
            StdRng::from_os_rng(),
        )
    }

    pub fn with_rng(
        picker: ImagesPicker,
        colors: ColorsLibrary,
        colors_by_deal: usize,
        rng: StdRng,
    ) -> Self {
        let mut deck = SingleImageDeck {
            picker,
            colors,
            colors_by_deal: colors_by_deal.max(1),
            deal_colors: Vec::new(),
            buffer: Vec::new(),
            rng,
        };
        deck.new_deal(false);
        deck
    }

    pub fn deal_colors(&self) -> &[CardColor] {
        &self.deal_colors
    }
}

impl Deck for SingleImageDeck {
    fn unique_matching_cards_model(&mut self) -> Option<Arc<MatchingCardsModel>> {
        if self.buffer.is_empty() {
            let image = self.picker.pick(&mut self.rng)?;
            for color in &self.deal_colors {
                self.buffer.push((image.clone(), *color));
            }
        }
        self.buffer.shuffle(&mut self.rng);
        let (image, color) = self.buffer.pop()?;
        Some(Arc::new(MatchingCardsModel::new(CardImages::Single(image), color)))
    }

    fn new_deal(&mut self, renewing_images: bool) {
        self.picker.new_deal(renewing_images);
        self.buffer.clear();
        self.deal_colors = if self.colors_by_deal == 1 {
            vec![CardColor::White]
        } else {
            self.colors.pick_distinct(self.colors_by_deal, &mut self.rng)
        };
        debug!(
            "[Deck] single-image deal: {} images, {} colors",
            self.picker.remaining(),
            self.deal_colors.len()
        );
    }

    fn remaining_matching_cards_models(&self) -> usize {
        self.picker.remaining() * self.deal_colors.len() + self.buffer.len()
    }

    fn colors_library(&self) -> &ColorsLibrary {
        &self.colors
    }
}

// Two images per matching group. Every new image is paired with all images
// already seen in the deal; with `double_order` both `(A, B)` and `(B, A)`
// are distinct groups.
pub struct DoubleImageDeck {
    picker: ImagesPicker,
    colors: ColorsLibrary,
    double_order: bool,
    deal_color: CardColor,
    seen: Vec<String>,
    pairs: Vec<(String, String)>,
    rng: StdRng,
}

impl DoubleImageDeck {
    pub fn new<I, S>(images: I, double_order: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_rng(
            ImagesPicker::new(images),
            ColorsLibrary::default(),
            double_order,
            StdRng::from_os_rng(),
        )
    }

    pub fn with_rng(
        picker: ImagesPicker,
        colors: ColorsLibrary,
        double_order: bool,
        rng: StdRng,
    ) -> Self {
        let mut deck = DoubleImageDeck {
            picker,
            colors,
            double_order,
            deal_color: CardColor::White,
            seen: Vec::new(),
            pairs: Vec::new(),
            rng,
        };
        deck.new_deal(false);
        deck
    }

    fn pairs_per_image(&self) -> usize {
        if self.double_order { 2 } else { 1 }
    }
}

impl Deck for DoubleImageDeck {
    fn unique_matching_cards_model(&mut self) -> Option<Arc<MatchingCardsModel>> {
        while self.pairs.is_empty() {
            let image = self.picker.pick(&mut self.rng)?;
            for other in &self.seen {
                self.pairs.push((image.clone(), other.clone()));
                if self.double_order {
                    self.pairs.push((other.clone(), image.clone()));
                }
            }
            self.seen.push(image);
        }
        self.pairs.shuffle(&mut self.rng);
        let (left, right) = self.pairs.pop()?;
        Some(Arc::new(MatchingCardsModel::new(
            CardImages::Double(left, right),
            self.deal_color,
        )))
    }

    fn new_deal(&mut self, renewing_images: bool) {
        self.picker.new_deal(renewing_images);
        self.seen.clear();
        self.pairs.clear();
        self.deal_color = self
            .colors
            .pick_distinct(1, &mut self.rng)
            .first()
            .copied()
            .unwrap_or_default();
        debug!(
            "[Deck] double-image deal: {} images, double order {}",
            self.picker.remaining(),
            self.double_order
        );
    }

    fn remaining_matching_cards_models(&self) -> usize {
        let seen = self.seen.len();
        let left = self.picker.remaining();
        let future = left * seen + left * left.saturating_sub(1) / 2;
        self.pairs.len() + future * self.pairs_per_image()
    }

    fn colors_library(&self) -> &ColorsLibrary {
        &self.colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn single_deck_runs_dry_after_source() {
        let mut deck = SingleImageDeck::with_rng(
            ImagesPicker::new(["owl", "fox", "elk"]),
            ColorsLibrary::default(),
            1,
            rng(),
        );
        assert_eq!(deck.remaining_matching_cards_models(), 3);
        let mut names = HashSet::new();
        for _ in 0..3 {
            let model = deck.unique_matching_cards_model().unwrap();
            names.insert(model.images().clone());
        }
        assert_eq!(names.len(), 3);
        assert_eq!(deck.remaining_matching_cards_models(), 0);
        assert!(deck.unique_matching_cards_model().is_none());
    }

    #[test]
    fn single_deck_deals_each_image_per_color() {
        let mut deck = SingleImageDeck::with_rng(
            ImagesPicker::new(["owl", "fox"]),
            ColorsLibrary::default(),
            3,
            rng(),
        );
        assert_eq!(deck.deal_colors().len(), 3);
        assert_eq!(deck.remaining_matching_cards_models(), 6);
        let mut combos = HashSet::new();
        while let Some(model) = deck.unique_matching_cards_model() {
            combos.insert((model.images().clone(), model.color()));
        }
        assert_eq!(combos.len(), 6);
        assert_eq!(deck.remaining_matching_cards_models(), 0);
    }

    #[test]
    fn new_deal_refills_the_supply() {
        let mut deck = SingleImageDeck::with_rng(
            ImagesPicker::new(["owl"]),
            ColorsLibrary::default(),
            1,
            rng(),
        );
        assert!(deck.unique_matching_cards_model().is_some());
        assert!(deck.unique_matching_cards_model().is_none());
        deck.new_deal(true);
        assert_eq!(deck.remaining_matching_cards_models(), 1);
    }

    #[test]
    fn double_deck_pairs_every_seen_image() {
        let mut deck = DoubleImageDeck::with_rng(
            ImagesPicker::new(["owl", "fox", "elk"]),
            ColorsLibrary::default(),
            false,
            rng(),
        );
        assert_eq!(deck.remaining_matching_cards_models(), 3);
        let mut pairs = Vec::new();
        while let Some(model) = deck.unique_matching_cards_model() {
            if let CardImages::Double(a, b) = model.images() {
                assert_ne!(a, b);
                let mut key = [a.clone(), b.clone()];
                key.sort();
                pairs.push(key);
            }
        }
        pairs.sort();
        pairs.dedup();
        assert_eq!(pairs.len(), 3);
        assert_eq!(deck.remaining_matching_cards_models(), 0);
    }

    #[test]
    fn double_order_makes_sides_distinct_groups() {
        let mut deck = DoubleImageDeck::with_rng(
            ImagesPicker::new(["owl", "fox", "elk"]),
            ColorsLibrary::default(),
            true,
            rng(),
        );
        assert_eq!(deck.remaining_matching_cards_models(), 6);
        let mut groups = HashSet::new();
        while let Some(model) = deck.unique_matching_cards_model() {
            groups.insert(model.images().clone());
        }
        assert_eq!(groups.len(), 6);
        assert!(groups.contains(&CardImages::Double("owl".into(), "fox".into())));
        assert!(groups.contains(&CardImages::Double("fox".into(), "owl".into())));
    }

    #[test]
    fn renewing_deal_prefers_images_not_seen_recently() {
        let mut picker = ImagesPicker::new(["a", "b", "c", "d"]);
        let mut rng = rng();
        let first: HashSet<String> = (0..2).filter_map(|_| picker.pick(&mut rng)).collect();
        picker.new_deal(true);
        assert_eq!(picker.recent_deals(), 1);
        let second: HashSet<String> = (0..2).filter_map(|_| picker.pick(&mut rng)).collect();
        assert!(first.is_disjoint(&second));
    }

    #[test]
    fn plain_deal_forgets_history() {
        let mut picker = ImagesPicker::new(["a", "b"]);
        let mut rng = rng();
        picker.pick(&mut rng);
        picker.new_deal(true);
        picker.pick(&mut rng);
        picker.new_deal(true);
        assert_eq!(picker.recent_deals(), 2);
        picker.new_deal(false);
        assert_eq!(picker.recent_deals(), 0);
        assert_eq!(picker.remaining(), 2);
    }

    #[test]
    fn history_is_bounded() {
        let mut picker = ImagesPicker::new(["a", "b"]);
        let mut rng = rng();
        for _ in 0..(RENEWING_DEALS_MEMORY + 3) {
            picker.pick(&mut rng);
            picker.new_deal(true);
        }
        assert_eq!(picker.recent_deals(), RENEWING_DEALS_MEMORY);
    }
}
