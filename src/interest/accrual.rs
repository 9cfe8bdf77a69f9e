use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::decimal::Rate;

/// days in the actual/365 year basis
pub const YEAR_BASIS: Decimal = dec!(365);

/// signed actual days from `earlier` to `later`
pub fn days_between(later: NaiveDate, earlier: NaiveDate) -> i64 {
    (later - earlier).num_days()
}

/// actual/365 share of an annual rate for the span between two dates
pub fn actual_365_fraction(later: NaiveDate, earlier: NaiveDate, annual_rate: Rate) -> Decimal {
    Decimal::from(days_between(later, earlier)) / YEAR_BASIS * annual_rate.as_decimal()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_between_crosses_leap_day() {
        assert_eq!(days_between(date(2024, 3, 1), date(2024, 2, 1)), 29);
        assert_eq!(days_between(date(2023, 3, 1), date(2023, 2, 1)), 28);
    }

    #[test]
    fn test_days_between_sign_follows_order() {
        assert_eq!(days_between(date(2023, 9, 1), date(2023, 12, 1)), -91);
    }

    #[test]
    fn test_full_year_fraction_is_the_rate() {
        let fraction = actual_365_fraction(
            date(2023, 1, 1),
            date(2022, 1, 1),
            Rate::from_decimal(dec!(0.07)),
        );
        assert_eq!(fraction, dec!(0.07));
    }
}
