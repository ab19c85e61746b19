use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::pricing::round_money;

const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Eleven",
    "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

fn below_hundred(n: u64) -> String {
    if n < 20 {
        ONES[n as usize].to_string()
    } else if n % 10 == 0 {
        TENS[(n / 10) as usize].to_string()
    } else {
        format!("{} {}", TENS[(n / 10) as usize], ONES[(n % 10) as usize])
    }
}

fn below_thousand(n: u64) -> String {
    let hundreds = n / 100;
    let rest = n % 100;
    match (hundreds, rest) {
        (0, _) => below_hundred(rest),
        (h, 0) => format!("{} Hundred", ONES[h as usize]),
        (h, r) => format!("{} Hundred {}", ONES[h as usize], below_hundred(r)),
    }
}

/// Whole number in the Indian system (thousand, lakh, crore).
pub fn number_in_words(n: u64) -> String {
    if n == 0 {
        return "Zero".to_string();
    }

    let crore = n / 10_000_000;
    let lakh = (n / 100_000) % 100;
    let thousand = (n / 1_000) % 100;
    let rest = n % 1_000;

    let mut parts = Vec::new();
    if crore > 0 {
        // Amounts of a hundred crore and more repeat the scale words.
        let crore_words = if crore >= 1_000 {
            number_in_words(crore)
        } else {
            below_thousand(crore)
        };
        parts.push(format!("{crore_words} Crore"));
    }
    if lakh > 0 {
        parts.push(format!("{} Lakh", below_hundred(lakh)));
    }
    if thousand > 0 {
        parts.push(format!("{} Thousand", below_hundred(thousand)));
    }
    if rest > 0 {
        parts.push(below_thousand(rest));
    }
    parts.join(" ")
}

/// `Rupees One Thousand Sixty Two and Fifty Paise Only`.
pub fn amount_in_words(amount: Decimal) -> String {
    let amount = round_money(amount.abs());
    let rupees = amount.trunc();
    let paise = ((amount - rupees) * Decimal::ONE_HUNDRED)
        .round()
        .to_u64()
        .unwrap_or(0);
    let rupees = rupees.to_u64().unwrap_or(0);

    if paise == 0 {
        format!("Rupees {} Only", number_in_words(rupees))
    } else {
        format!(
            "Rupees {} and {} Paise Only",
            number_in_words(rupees),
            below_hundred(paise)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn groups_by_lakh_and_crore() {
        assert_eq!(number_in_words(0), "Zero");
        assert_eq!(number_in_words(15), "Fifteen");
        assert_eq!(number_in_words(1062), "One Thousand Sixty Two");
        assert_eq!(number_in_words(150_000), "One Lakh Fifty Thousand");
        assert_eq!(
            number_in_words(12_345_678),
            "One Crore Twenty Three Lakh Forty Five Thousand Six Hundred Seventy Eight"
        );
        assert_eq!(number_in_words(700), "Seven Hundred");
    }

    #[test]
    fn paise_are_spelled_separately() {
        assert_eq!(amount_in_words(dec!(1062)), "Rupees One Thousand Sixty Two Only");
        assert_eq!(
            amount_in_words(dec!(562.50)),
            "Rupees Five Hundred Sixty Two and Fifty Paise Only"
        );
    }
}
