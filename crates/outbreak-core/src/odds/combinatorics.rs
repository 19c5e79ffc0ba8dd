//! Hypergeometric draw probabilities over a finite population.
//!
//! All inputs are signed so callers can pass raw arithmetic results (for
//! example a draw budget that went negative) without pre-clamping.

use statrs::function::factorial::ln_binomial;

/// Probability of exactly `hits` successes when making `draws` draws without
/// replacement from `population` items of which `successes` are successes.
pub fn exactly_n_draws(population: i64, draws: i64, hits: i64, successes: i64) -> f64 {
    let population = population.max(0);
    let successes = successes.clamp(0, population);
    let draws = draws.clamp(0, population);
    let failures = population - successes;

    if hits < 0 || hits > successes || hits > draws || draws - hits > failures {
        return 0.0;
    }

    let ln = ln_binomial(successes as u64, hits as u64)
        + ln_binomial(failures as u64, (draws - hits) as u64)
        - ln_binomial(population as u64, draws as u64);
    ln.exp()
}

/// Probability of at least `required` successes in `draws` draws without
/// replacement. `required <= 0` is already satisfied; `draws <= 0` can
/// satisfy nothing else.
pub fn at_least_n_draws(population: i64, draws: i64, required: i64, successes: i64) -> f64 {
    if required <= 0 {
        return 1.0;
    }
    if draws <= 0 {
        return 0.0;
    }

    let population = population.max(0);
    let successes = successes.clamp(0, population);
    let draws = draws.min(population);
    let ceiling = draws.min(successes);
    if required > ceiling {
        return 0.0;
    }

    let total: f64 = (required..=ceiling)
        .map(|hits| exactly_n_draws(population, draws, hits, successes))
        .sum();
    total.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::{at_least_n_draws, exactly_n_draws};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn nothing_required_is_certain() {
        assert_eq!(at_least_n_draws(40, 0, 0, 5), 1.0);
        assert_eq!(at_least_n_draws(40, 6, -2, 5), 1.0);
    }

    #[test]
    fn no_draws_left_is_hopeless() {
        assert_eq!(at_least_n_draws(40, 0, 1, 40), 0.0);
        assert_eq!(at_least_n_draws(40, -4, 3, 12), 0.0);
    }

    #[test]
    fn single_draw_matches_ratio() {
        assert!(close(at_least_n_draws(10, 1, 1, 3), 0.3));
    }

    #[test]
    fn two_of_two_from_small_deck() {
        // C(3,2) / C(5,2) = 3 / 10
        assert!(close(at_least_n_draws(5, 2, 2, 3), 0.3));
        assert!(close(exactly_n_draws(5, 2, 1, 3), 0.6));
    }

    #[test]
    fn drawing_everything_guarantees_available_successes() {
        assert!(close(at_least_n_draws(12, 12, 4, 4), 1.0));
        assert!(close(at_least_n_draws(12, 40, 4, 4), 1.0));
        assert_eq!(at_least_n_draws(12, 12, 5, 4), 0.0);
    }

    #[test]
    fn pmf_sums_to_one() {
        let total: f64 = (0..=8).map(|k| exactly_n_draws(48, 8, k, 12)).sum();
        assert!(close(total, 1.0));
    }

    #[test]
    fn tail_is_monotone_in_draws() {
        let mut last = 0.0;
        for draws in 1..=30 {
            let p = at_least_n_draws(48, draws, 4, 12);
            assert!(p + 1e-12 >= last, "draws={draws} p={p} last={last}");
            last = p;
        }
    }
}
