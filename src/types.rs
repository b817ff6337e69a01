//! Core types: Price, Symbol, OrderId, Size, Position, Timestamp

use std::fmt;

/// Price in units of 1/10,000 (four decimal places).
///
/// `Price(1_000_500)` represents 100.05. All book prices are multiples of a
/// product's minimum price variation, so comparisons are exact — no epsilon
/// slack is needed anywhere in the matching path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(pub i64);

impl Price {
    /// Units per 1.0 of displayed price.
    pub const SCALE: i64 = 10_000;

    pub const ZERO: Price = Price(0);

    /// Convert from a decimal price, rounding to the nearest representable
    /// unit (1e-4).
    pub fn from_f64(value: f64) -> Self {
        Price((value * Self::SCALE as f64).round() as i64)
    }

    /// Decimal value of this price.
    #[inline]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / Self::SCALE as f64
    }

    /// True if this price is a whole number of `mpv` steps.
    #[inline]
    pub fn is_multiple_of(self, mpv: Price) -> bool {
        mpv.0 > 0 && self.0 % mpv.0 == 0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / Self::SCALE as u64;
        let frac = abs % Self::SCALE as u64;
        if frac == 0 {
            write!(f, "{sign}{whole}")
        } else {
            let mut digits = format!("{frac:04}");
            while digits.ends_with('0') {
                digits.pop();
            }
            write!(f, "{sign}{whole}.{digits}")
        }
    }
}

/// Order size in units. Always positive for live orders.
pub type Size = u64;

/// Signed inventory: positive = long, negative = short.
pub type Position = i64;

/// Engine-local monotonic event counter.
pub type Timestamp = u64;

/// Order identifier chosen by the submitting agent. Single-use across a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A short inline ASCII identifier used for tickers and bot names.
///
/// Copyable and comparable without heap allocation; ordering is
/// lexicographic.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol {
    bytes: [u8; Self::MAX_LEN],
    len: u8,
}

impl Symbol {
    pub const MAX_LEN: usize = 23;

    /// Create a symbol from a string.
    ///
    /// # Panics
    ///
    /// Panics if the string is empty, not ASCII, or longer than `MAX_LEN`.
    /// Use [`Symbol::try_new`] for untrusted input.
    pub fn new(s: &str) -> Self {
        Self::try_new(s).unwrap_or_else(|| panic!("invalid symbol {s:?}"))
    }

    /// Fallible constructor for untrusted input (e.g. configuration files).
    pub fn try_new(s: &str) -> Option<Self> {
        if s.is_empty() || s.len() > Self::MAX_LEN || !s.is_ascii() {
            return None;
        }
        let mut bytes = [0u8; Self::MAX_LEN];
        bytes[..s.len()].copy_from_slice(s.as_bytes());
        Some(Self {
            bytes,
            len: s.len() as u8,
        })
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.bytes[..self.len as usize])
            .expect("invariant: symbol bytes are ASCII")
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_ordering() {
        assert!(Price(100) < Price(200));
        assert!(Price(-50) < Price(50));
        assert_eq!(Price(100), Price(100));
    }

    #[test]
    fn price_display() {
        assert_eq!(format!("{}", Price(1_000_500)), "100.05");
        assert_eq!(format!("{}", Price(1_000_000)), "100");
        assert_eq!(format!("{}", Price(1)), "0.0001");
        assert_eq!(format!("{}", Price(-25_000)), "-2.5");
    }

    #[test]
    fn price_f64_round_trip() {
        assert_eq!(Price::from_f64(100.05), Price(1_000_500));
        assert_eq!(Price::from_f64(0.1), Price(1_000));
        assert!((Price(1_000_500).to_f64() - 100.05).abs() < 1e-12);
    }

    #[test]
    fn price_multiple_of_mpv() {
        let mpv = Price::from_f64(0.1);
        assert!(Price::from_f64(100.0).is_multiple_of(mpv));
        assert!(Price::from_f64(100.1).is_multiple_of(mpv));
        assert!(!Price::from_f64(100.05).is_multiple_of(mpv));
        assert!(!Price(5).is_multiple_of(Price(0)));
    }

    #[test]
    fn symbol_round_trip() {
        let s = Symbol::new("UEC");
        assert_eq!(s.as_str(), "UEC");
        assert_eq!(format!("{s}"), "UEC");
        assert_eq!(format!("{s:?}"), "\"UEC\"");
    }

    #[test]
    fn symbol_ordering_is_lexicographic() {
        assert!(Symbol::new("AB") < Symbol::new("ABC"));
        assert!(Symbol::new("AAA") < Symbol::new("AAB"));
        assert_eq!(Symbol::new("QFIN"), Symbol::new("QFIN"));
    }

    #[test]
    fn symbol_rejects_bad_input() {
        assert!(Symbol::try_new("").is_none());
        assert!(Symbol::try_new("é").is_none());
        assert!(Symbol::try_new(&"X".repeat(24)).is_none());
        assert!(Symbol::try_new(&"X".repeat(23)).is_some());
    }

    #[test]
    fn order_id_display() {
        assert_eq!(format!("{}", OrderId(42)), "42");
    }
}
