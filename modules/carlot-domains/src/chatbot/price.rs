use std::sync::LazyLock;

use regex::Regex;

static UPPER_BOUND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:under|below|less than)\b").unwrap());
static LOWER_BOUND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:above|more than)\b").unwrap());
static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d[\d,]*(?:\.\d+)?)(?:\s*(lakhs?|lacs?|crores?|cr)\b)?").unwrap()
});

const LAKH: u64 = 100_000;
const CRORE: u64 = 10_000_000;

/// Inclusive price range requested in a chat message. `max: None` is
/// unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBand {
    pub min: u64,
    pub max: Option<u64>,
}

impl Default for PriceBand {
    fn default() -> Self {
        Self { min: 0, max: None }
    }
}

impl PriceBand {
    pub fn is_unbounded(&self) -> bool {
        self.min == 0 && self.max.is_none()
    }

    pub fn contains(&self, price: i64) -> bool {
        let Ok(price) = u64::try_from(price) else {
            return false;
        };
        price >= self.min && self.max.is_none_or(|max| price <= max)
    }
}

/// Detect "under X" / "below X" / "less than X" (upper bound) and
/// "above X" / "more than X" (lower bound). Both may apply to one message,
/// in which case they use the same amount. Non-positive or missing amounts
/// leave the band unbounded.
pub fn parse_price_intent(text: &str) -> PriceBand {
    let lower = text.to_lowercase();
    let mut band = PriceBand::default();

    let wants_max = UPPER_BOUND_RE.is_match(&lower);
    let wants_min = LOWER_BOUND_RE.is_match(&lower);
    if !wants_max && !wants_min {
        return band;
    }

    let Some(amount) = first_amount(&lower).filter(|a| *a > 0) else {
        return band;
    };
    if wants_max {
        band.max = Some(amount);
    }
    if wants_min {
        band.min = amount;
    }
    band
}

/// First number in the text. Commas inside the digits are digit-group
/// separators; a trailing lakh/crore word scales the value, including any
/// decimal part ("7.5 lakh"). Without a unit the decimal part is dropped.
fn first_amount(text: &str) -> Option<u64> {
    let caps = AMOUNT_RE.captures(text)?;
    let number = caps.get(1)?.as_str();
    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));

    let digits: String = whole.chars().filter(char::is_ascii_digit).collect();
    let whole: u64 = digits.parse().ok()?;
    let scale = match caps.get(2).map(|m| m.as_str()) {
        Some(unit) if unit.starts_with('l') => LAKH,
        Some(_) => CRORE,
        None => 1,
    };

    let mut amount = whole.checked_mul(scale)?;
    let mut place = scale;
    for digit in fraction.chars().filter_map(|c| c.to_digit(10)) {
        place /= 10;
        if place == 0 {
            break;
        }
        amount = amount.checked_add(u64::from(digit) * place)?;
    }
    Some(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_under_sets_max() {
        assert_eq!(
            parse_price_intent("cars under 500000"),
            PriceBand { min: 0, max: Some(500_000) }
        );
        assert_eq!(parse_price_intent("Below 8,00,000 please").max, Some(800_000));
    }

    #[test]
    fn test_above_sets_min() {
        assert_eq!(
            parse_price_intent("cars above 200000"),
            PriceBand { min: 200_000, max: None }
        );
        assert_eq!(parse_price_intent("more than 300000").min, 300_000);
    }

    #[test]
    fn test_no_intent_is_unbounded() {
        assert_eq!(parse_price_intent("sedan"), PriceBand::default());
        assert!(parse_price_intent("sedan 2024").is_unbounded());
    }

    #[test]
    fn test_missing_or_zero_amount_keeps_defaults() {
        assert!(parse_price_intent("something under budget").is_unbounded());
        assert!(parse_price_intent("under 0").is_unbounded());
    }

    #[test]
    fn test_both_phrases_form_a_band_on_the_same_number() {
        let band = parse_price_intent("above or under 900000");
        assert_eq!(band, PriceBand { min: 900_000, max: Some(900_000) });
    }

    #[test]
    fn test_lakh_and_crore_units() {
        assert_eq!(parse_price_intent("suv under 15 lakh").max, Some(1_500_000));
        assert_eq!(parse_price_intent("above 1 crore").min, 10_000_000);
        assert_eq!(parse_price_intent("under 5 lacs").max, Some(500_000));
        // "cr" only counts as a whole word.
        assert_eq!(parse_price_intent("under 2 crv").max, Some(2));
    }

    #[test]
    fn test_decimal_lakh_and_crore_amounts_are_scaled() {
        assert_eq!(parse_price_intent("suv under 7.5 lakh").max, Some(750_000));
        assert_eq!(
            parse_price_intent("under 1.5 crore"),
            PriceBand { min: 0, max: Some(15_000_000) }
        );
        assert_eq!(parse_price_intent("above 12.25 lakhs").min, 1_225_000);
        assert_eq!(parse_price_intent("under 0.5 lakh").max, Some(50_000));
    }

    #[test]
    fn test_decimal_without_unit_drops_fraction() {
        assert_eq!(parse_price_intent("under 500000.99").max, Some(500_000));
        assert_eq!(parse_price_intent("below 8,00,000.50 rupees").max, Some(800_000));
    }

    #[test]
    fn test_trigger_words_need_word_boundaries() {
        assert!(parse_price_intent("I understand 500000").is_unbounded());
    }

    #[test]
    fn test_overflow_is_ignored() {
        assert!(parse_price_intent("under 99999999999999999999999").is_unbounded());
    }

    #[test]
    fn test_band_contains_is_inclusive() {
        let band = PriceBand { min: 100, max: Some(200) };
        assert!(band.contains(100));
        assert!(band.contains(200));
        assert!(!band.contains(99));
        assert!(!band.contains(201));
        assert!(!band.contains(-5));
        assert!(PriceBand::default().contains(i64::MAX));
    }
}
