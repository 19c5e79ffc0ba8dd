use crate::model::deck::DeckError;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

/// The infection deck. `undrawn[0]` is the top card. `layers` records the
/// sizes of the contiguous runs the undrawn sequence is made of (top first):
/// every reshuffle of the drawn pile lands on top as a new layer, so draws
/// exhaust the most recent layer before touching older ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadDeck {
    undrawn: Vec<String>,
    layers: Vec<usize>,
    drawn: Vec<String>,
}

impl SpreadDeck {
    pub fn new(locations: Vec<String>) -> Self {
        let layers = if locations.is_empty() {
            Vec::new()
        } else {
            vec![locations.len()]
        };
        Self {
            undrawn: locations,
            layers,
            drawn: Vec::new(),
        }
    }

    pub fn undrawn(&self) -> &[String] {
        &self.undrawn
    }

    pub fn drawn(&self) -> &[String] {
        &self.drawn
    }

    pub fn layers(&self) -> &[usize] {
        &self.layers
    }

    pub fn total(&self) -> usize {
        self.undrawn.len() + self.drawn.len()
    }

    pub fn is_undrawn(&self, location: &str) -> bool {
        self.undrawn.iter().any(|id| id == location)
    }

    pub fn is_drawn(&self, location: &str) -> bool {
        self.drawn.iter().any(|id| id == location)
    }

    /// Top draw. The named card is swapped to the top before it comes off so
    /// the top layer is always the one that shrinks.
    pub fn draw(&mut self, location: &str) -> Result<(), DeckError> {
        let position = self.position(location)?;
        self.undrawn.swap(0, position);
        let card = self.undrawn.remove(0);
        self.shrink_layer(0);
        debug!(location = %card, drawn = self.drawn.len() + 1, "spread card drawn");
        self.drawn.push(card);
        Ok(())
    }

    /// Crisis draw: the named card is treated as the deepest undrawn card.
    pub fn pull_from_bottom(&mut self, location: &str) -> Result<(), DeckError> {
        let position = self.position(location)?;
        let last = self.undrawn.len() - 1;
        if position != last {
            warn!(
                location,
                modelled_position = position,
                "crisis card was not at the modelled bottom, swapping"
            );
            self.undrawn.swap(position, last);
        }
        if let Some(card) = self.undrawn.pop() {
            self.shrink_layer(self.layers.len().saturating_sub(1));
            debug!(location = %card, "spread card pulled from bottom");
            self.drawn.push(card);
        }
        Ok(())
    }

    /// Shuffles the drawn pile and stacks it on top as a new layer.
    pub fn shuffle_drawn<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.drawn.is_empty() {
            return;
        }
        let mut pile = std::mem::take(&mut self.drawn);
        pile.shuffle(rng);
        self.layers.insert(0, pile.len());
        pile.extend(self.undrawn.drain(..));
        self.undrawn = pile;
        debug!(layers = self.layers.len(), "spread drawn pile reshuffled on top");
    }

    /// The bottom `rate` undrawn cards (fewer if the deck is shorter).
    pub fn bottom_striation(&self, rate: usize) -> Vec<&str> {
        let start = self.undrawn.len().saturating_sub(rate);
        self.undrawn[start..].iter().map(String::as_str).collect()
    }

    /// Chance the location comes up during an ordinary draw of `rate` cards.
    pub fn probability_of_drawing(&self, location: &str, rate: usize) -> f64 {
        if self.is_drawn(location) {
            let contenders = (self.drawn.len() + 1).max(1);
            return (rate as f64 / contenders as f64).min(1.0);
        }
        let Some(position) = self.undrawn.iter().position(|id| id == location) else {
            return 0.0;
        };

        let mut draws_left = rate;
        let mut layer_start = 0;
        for &size in &self.layers {
            if draws_left == 0 {
                return 0.0;
            }
            if position < layer_start + size {
                return (draws_left as f64 / size as f64).min(1.0);
            }
            draws_left = draws_left.saturating_sub(size);
            layer_start += size;
        }
        0.0
    }

    /// Layer sizes must cover the undrawn sequence exactly and no card may
    /// appear twice.
    pub fn is_consistent(&self) -> bool {
        let covered: usize = self.layers.iter().sum();
        let mut seen = HashSet::new();
        covered == self.undrawn.len()
            && self.layers.iter().all(|&size| size > 0)
            && self.undrawn.iter().chain(self.drawn.iter()).all(|id| seen.insert(id))
    }

    fn position(&self, location: &str) -> Result<usize, DeckError> {
        self.undrawn
            .iter()
            .position(|id| id == location)
            .ok_or_else(|| DeckError::NotFound(location.to_string()))
    }

    fn shrink_layer(&mut self, index: usize) {
        if let Some(size) = self.layers.get_mut(index) {
            *size -= 1;
            if *size == 0 {
                self.layers.remove(index);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SpreadDeck;
    use crate::model::deck::DeckError;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn deck(names: &[&str]) -> SpreadDeck {
        SpreadDeck::new(names.iter().map(|n| n.to_string()).collect())
    }

    const TEN: [&str; 10] = ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"];

    #[test]
    fn single_drawn_card_is_certain_at_rate_two() {
        let mut spread = deck(&TEN);
        spread.draw("f").unwrap();
        assert_eq!(spread.probability_of_drawing("f", 2), 1.0);
    }

    #[test]
    fn drawn_share_shrinks_as_pile_grows() {
        let mut spread = deck(&TEN);
        spread.draw("e").unwrap();
        spread.draw("f").unwrap();
        assert!((spread.probability_of_drawing("e", 2) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn undrawn_odds_use_rate_over_layer() {
        let mut spread = deck(&TEN);
        assert_eq!(spread.probability_of_drawing("a", 2), 0.2);
        spread.draw("a").unwrap();
        spread.draw("b").unwrap();
        assert_eq!(spread.probability_of_drawing("c", 2), 0.25);
        assert_eq!(spread.probability_of_drawing("zz", 2), 0.0);
    }

    #[test]
    fn reshuffled_layer_is_drawn_first() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut spread = deck(&TEN);
        spread.draw("a").unwrap();
        spread.draw("b").unwrap();
        spread.shuffle_drawn(&mut rng);

        assert_eq!(spread.layers(), &[2, 8]);
        assert!(spread.drawn().is_empty());
        assert_eq!(spread.probability_of_drawing("a", 2), 1.0);
        assert_eq!(spread.probability_of_drawing("c", 2), 0.0);
        assert_eq!(spread.probability_of_drawing("c", 3), 0.125);
    }

    #[test]
    fn top_draw_always_shrinks_top_layer() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut spread = deck(&TEN);
        spread.draw("a").unwrap();
        spread.shuffle_drawn(&mut rng);
        spread.draw("j").unwrap();

        assert_eq!(spread.layers(), &[9]);
        assert!(spread.is_undrawn("a"));
        assert!(spread.is_consistent());
    }

    #[test]
    fn pull_from_bottom_reconciles_position() {
        let mut spread = deck(&["a", "b", "c", "d"]);
        spread.pull_from_bottom("a").unwrap();

        assert_eq!(spread.drawn(), ["a".to_string()]);
        assert_eq!(spread.undrawn(), ["d", "b", "c"]);
        assert_eq!(spread.bottom_striation(2), vec!["b", "c"]);
        assert!(spread.is_consistent());
    }

    #[test]
    fn missing_or_drawn_cards_are_not_found() {
        let mut spread = deck(&["a", "b"]);
        spread.draw("a").unwrap();
        assert_eq!(spread.draw("a"), Err(DeckError::NotFound("a".into())));
        assert_eq!(
            spread.pull_from_bottom("q"),
            Err(DeckError::NotFound("q".into()))
        );
    }

    #[test]
    fn bottom_striation_caps_at_deck_size() {
        let spread = deck(&["a", "b"]);
        assert_eq!(spread.bottom_striation(4), vec!["a", "b"]);
        assert_eq!(spread.bottom_striation(0), Vec::<&str>::new());
    }

    #[test]
    fn cardinality_is_constant() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut spread = deck(&TEN);
        spread.draw("c").unwrap();
        spread.pull_from_bottom("h").unwrap();
        assert_eq!(spread.total(), 10);
        spread.shuffle_drawn(&mut rng);
        assert_eq!(spread.total(), 10);
        assert_eq!(spread.undrawn().len(), 10);
        assert!(spread.is_consistent());
    }
}
