//! Number formatting for terminal output: locale-aware thousands separators
//! (`30,000` vs `30.000`) and signed percentages.

use num_format::{Locale, ToFormattedString};

/// Map a user-provided locale tag to a `num_format::Locale` and its decimal separator char.
///
/// Supported tags (case-insensitive): `en`, `us`, `en_US`, `de`, `de_DE`, `german`,
/// `fr`, `es`, `it`, `pt`, `pt_BR`, `nl`. Defaults to English.
pub fn map_locale(tag: &str) -> (&'static Locale, char) {
    match tag.to_lowercase().as_str() {
        "de" | "de_de" | "german" => (&Locale::de, ','),
        "fr" | "fr_fr" => (&Locale::fr, ','),
        "es" | "es_es" => (&Locale::es, ','),
        "it" | "it_it" => (&Locale::it, ','),
        "pt" | "pt_pt" | "pt_br" => (&Locale::pt, ','),
        "nl" | "nl_nl" => (&Locale::nl, ','),
        _ => (&Locale::en, '.'),
    }
}

/// Formatter bound to one locale.
#[derive(Debug, Clone, Copy)]
pub struct NumFmt {
    locale: &'static Locale,
    decimal: char,
}

impl Default for NumFmt {
    fn default() -> Self {
        Self::new("en")
    }
}

impl NumFmt {
    pub fn new(tag: &str) -> Self {
        let (locale, decimal) = map_locale(tag);
        Self { locale, decimal }
    }

    /// `1234567` -> `1,234,567` (en) / `1.234.567` (de).
    pub fn count(&self, v: u64) -> String {
        v.to_formatted_string(self.locale)
    }

    /// Signed whole number with grouping: `+1,200`, `-35`.
    pub fn signed(&self, v: i64) -> String {
        let body = v.unsigned_abs().to_formatted_string(self.locale);
        if v < 0 { format!("-{body}") } else { format!("+{body}") }
    }

    /// Rounded float with grouping, e.g. a mean.
    pub fn approx(&self, v: f64) -> String {
        if !v.is_finite() {
            return "NA".to_string();
        }
        let n = v.round() as i64;
        let body = n.unsigned_abs().to_formatted_string(self.locale);
        if n < 0 { format!("-{body}") } else { body }
    }

    /// Percentage with `prec` decimals and the locale's decimal separator.
    pub fn pct(&self, v: f64, prec: usize) -> String {
        if !v.is_finite() {
            return "NA".to_string();
        }
        let s = format!("{:.*}%", prec, v);
        if self.decimal == '.' { s } else { s.replace('.', &self.decimal.to_string()) }
    }

    /// Like [`NumFmt::pct`] but always carries a sign.
    pub fn signed_pct(&self, v: f64, prec: usize) -> String {
        let s = self.pct(v, prec);
        if v.is_finite() && v >= 0.0 { format!("+{s}") } else { s }
    }

    pub fn opt_pct(&self, v: Option<f64>, prec: usize) -> String {
        v.map(|x| self.signed_pct(x, prec)).unwrap_or_else(|| "NA".to_string())
    }
}
