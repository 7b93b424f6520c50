//! ISO 4217 codes accepted for `currencyId` and the symbol each one is
//! displayed with.

const SYMBOLS: &[(&str, &str)] = &[
    ("AED", "د.إ"),
    ("AUD", "$"),
    ("BDT", "৳"),
    ("BRL", "R$"),
    ("CAD", "$"),
    ("CHF", "CHF"),
    ("CNY", "¥"),
    ("EUR", "€"),
    ("GBP", "£"),
    ("HKD", "$"),
    ("IDR", "Rp"),
    ("INR", "₹"),
    ("JPY", "¥"),
    ("KRW", "₩"),
    ("LKR", "₨"),
    ("MXN", "$"),
    ("NPR", "₨"),
    ("NZD", "$"),
    ("PKR", "₨"),
    ("RUB", "₽"),
    ("SAR", "﷼"),
    ("SGD", "$"),
    ("THB", "฿"),
    ("TRY", "₺"),
    ("USD", "$"),
    ("ZAR", "R"),
];

/// Looks up the display symbol of a currency code, ignoring case and
/// surrounding whitespace.
pub fn symbol_for(code: &str) -> Option<&'static str> {
    let code = code.trim();
    SYMBOLS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(code))
        .map(|(_, symbol)| *symbol)
}
