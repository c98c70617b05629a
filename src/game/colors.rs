use rand::Rng;
use rand::seq::SliceRandom;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum CardColor {
    #[default]
    White,
    Red,
    Orange,
    Yellow,
    Green,
    Teal,
    Blue,
    Purple,
    Pink,
}

impl CardColor {
    pub fn as_str(self) -> &'static str {
        match self {
            CardColor::White => "white",
            CardColor::Red => "red",
            CardColor::Orange => "orange",
            CardColor::Yellow => "yellow",
            CardColor::Green => "green",
            CardColor::Teal => "teal",
            CardColor::Blue => "blue",
            CardColor::Purple => "purple",
            CardColor::Pink => "pink",
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            CardColor::White => "#f6f5f4",
            CardColor::Red => "#e01b24",
            CardColor::Orange => "#ff7800",
            CardColor::Yellow => "#f6d32d",
            CardColor::Green => "#33d17a",
            CardColor::Teal => "#2ec27e",
            CardColor::Blue => "#3584e4",
            CardColor::Purple => "#9141ac",
            CardColor::Pink => "#dc8add",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColorsLibrary {
    palette: Vec<CardColor>,
}

impl Default for ColorsLibrary {
    fn default() -> Self {
        ColorsLibrary {
            palette: vec![
                CardColor::Red,
                CardColor::Orange,
                CardColor::Yellow,
                CardColor::Green,
                CardColor::Teal,
                CardColor::Blue,
                CardColor::Purple,
                CardColor::Pink,
            ],
        }
    }
}

impl ColorsLibrary {
    pub fn new(palette: Vec<CardColor>) -> Self {
        let mut deduped = Vec::with_capacity(palette.len());
        for color in palette {
            if !deduped.contains(&color) {
                deduped.push(color);
            }
        }
        ColorsLibrary { palette: deduped }
    }

    pub fn palette(&self) -> &[CardColor] {
        &self.palette
    }

    pub fn len(&self) -> usize {
        self.palette.len()
    }

    pub fn is_empty(&self) -> bool {
        self.palette.is_empty()
    }

    pub fn pick_distinct<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<CardColor> {
        if self.palette.is_empty() {
            return vec![CardColor::White];
        }
        let mut colors = self.palette.clone();
        colors.shuffle(rng);
        colors.truncate(count.clamp(1, self.palette.len()));
        colors
    }
}
