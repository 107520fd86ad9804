use rust_decimal::{Decimal, RoundingStrategy};

/// One slice of a progressive tax table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxBracket {
    /// Inclusive upper bound of the slice, `None` for the final open-ended bracket
    pub upper_bound: Option<Decimal>,
    pub marginal_rate: Decimal,
}

impl TaxBracket {
    pub fn up_to(upper_bound: impl Into<Decimal>, marginal_rate: Decimal) -> Self {
        Self {
            upper_bound: Some(upper_bound.into()),
            marginal_rate,
        }
    }

    pub fn above(marginal_rate: Decimal) -> Self {
        Self {
            upper_bound: None,
            marginal_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxTable {
    /// Income tax brackets, ascending by upper bound
    pub brackets: Vec<TaxBracket>,
    /// Flat social security contribution rate
    pub contribution_rate: Decimal,
}

impl TaxTable {
    /// Mozambique IRT brackets with the 3% INSS employee contribution.
    pub fn mozambique() -> Self {
        Self {
            brackets: vec![
                TaxBracket::up_to(42_000, Decimal::ZERO),
                TaxBracket::up_to(168_000, Decimal::new(10, 2)),
                TaxBracket::up_to(504_000, Decimal::new(15, 2)),
                TaxBracket::up_to(1_512_000, Decimal::new(20, 2)),
                TaxBracket::above(Decimal::new(32, 2)),
            ],
            contribution_rate: Decimal::new(3, 2),
        }
    }
}

impl Default for TaxTable {
    fn default() -> Self {
        Self::mozambique()
    }
}

/// Quantizes to cents, rounding half away from zero.
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Sum of `slice * marginal_rate` over every bracket the gross amount reaches.
///
/// The walk stops at the first bracket that receives nothing, so a gross
/// amount sitting exactly on a bound is taxed entirely by the brackets below.
/// Callers must not pass a negative amount.
pub fn progressive_tax(gross: Decimal, brackets: &[TaxBracket]) -> Decimal {
    debug_assert!(!gross.is_sign_negative(), "gross amount must not be negative");

    let mut tax = Decimal::ZERO;
    let mut previous_bound = Decimal::ZERO;

    for bracket in brackets {
        let ceiling = match bracket.upper_bound {
            Some(upper_bound) => gross.min(upper_bound),
            None => gross,
        };

        let slice = ceiling - previous_bound;
        if slice <= Decimal::ZERO {
            break;
        }

        tax += slice * bracket.marginal_rate;

        match bracket.upper_bound {
            Some(upper_bound) => previous_bound = upper_bound,
            None => break,
        }
    }

    round_currency(tax)
}

pub fn flat_contribution(gross: Decimal, rate: Decimal) -> Decimal {
    debug_assert!(!gross.is_sign_negative(), "gross amount must not be negative");

    round_currency(gross * rate)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_progressive_tax_example() {
        let table = TaxTable::mozambique();

        assert_eq!(progressive_tax(dec!(100000), &table.brackets), dec!(5800.00));
        assert_eq!(flat_contribution(dec!(100000), table.contribution_rate), dec!(3000.00));
    }

    #[test]
    fn test_progressive_tax_every_bracket() {
        let table = TaxTable::mozambique();

        assert_eq!(progressive_tax(Decimal::ZERO, &table.brackets), Decimal::ZERO);
        assert_eq!(progressive_tax(dec!(42000), &table.brackets), Decimal::ZERO);
        assert_eq!(progressive_tax(dec!(168000), &table.brackets), dec!(12600.00));
        assert_eq!(progressive_tax(dec!(504000), &table.brackets), dec!(63000.00));
        assert_eq!(progressive_tax(dec!(1512000), &table.brackets), dec!(264600.00));
        // 264,600 + 32% of 488,000
        assert_eq!(progressive_tax(dec!(2000000), &table.brackets), dec!(420760.00));
    }

    #[test]
    fn test_progressive_tax_continuous_at_bounds() {
        let table = TaxTable::mozambique();

        for bound in [dec!(42000), dec!(168000), dec!(504000), dec!(1512000)] {
            let at_bound = progressive_tax(bound, &table.brackets);
            let just_above = progressive_tax(bound + dec!(0.01), &table.brackets);

            // One cent more can add at most one cent of tax
            assert!(just_above >= at_bound);
            assert!(just_above - at_bound <= dec!(0.01), "jump at {bound}");
        }
    }

    #[test]
    fn test_progressive_tax_monotonic() {
        let table = TaxTable::mozambique();

        let mut previous = Decimal::ZERO;
        let mut gross = Decimal::ZERO;

        while gross <= dec!(2500000) {
            let tax = progressive_tax(gross, &table.brackets);
            assert!(tax >= previous, "tax decreased at {gross}");

            previous = tax;
            gross += dec!(7777.77);
        }
    }

    #[test]
    fn test_rounds_half_up() {
        assert_eq!(round_currency(dec!(2.345)), dec!(2.35));
        assert_eq!(round_currency(dec!(2.344)), dec!(2.34));
        assert_eq!(round_currency(dec!(0.125)), dec!(0.13));

        // 1.50 * 3% = 0.045, banker's rounding would give 0.04
        assert_eq!(flat_contribution(dec!(1.50), dec!(0.03)), dec!(0.05));
        // 42,000.15 -> 0.015 of taxable income at 10%
        assert_eq!(progressive_tax(dec!(42000.15), &TaxTable::mozambique().brackets), dec!(0.02));
    }

    #[test]
    fn test_custom_table() {
        let brackets = vec![
            TaxBracket::up_to(1_000, dec!(0.05)),
            TaxBracket::above(dec!(0.50)),
        ];

        assert_eq!(progressive_tax(dec!(500), &brackets), dec!(25.00));
        assert_eq!(progressive_tax(dec!(3000), &brackets), dec!(1050.00));
    }
}
