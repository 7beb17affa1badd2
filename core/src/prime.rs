use core::fmt;
use serde::{Deserialize, Serialize};

/// Trial-division primality test.
///
/// `n` is prime when `n >= 2` and no `i` in `2..=floor(sqrt(n))` divides it.
pub const fn is_prime(n: u32) -> bool {
    n > 1 && smallest_factor(n).is_none()
}

/// Smallest `i` in `2..=floor(sqrt(n))` that divides `n`.
pub const fn smallest_factor(n: u32) -> Option<u32> {
    let mut i = 2;
    // widen so `i * i` cannot overflow near u32::MAX
    while (i as u64) * (i as u64) <= n as u64 {
        if n % i == 0 {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Splits `range` into `(primes, non_primes)`, both in ascending order.
pub fn partition_primes(range: core::ops::RangeInclusive<u8>) -> (Vec<u8>, Vec<u8>) {
    range.partition(|&value| is_prime(value.into()))
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotPrimeReason {
    /// Zero, which has no useful factor to show.
    BelowTwo,
    IsOne,
    DivisibleBy(u32),
}

/// Why a value failed the primality test, for display next to the offending cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotPrime {
    pub value: u32,
    pub reason: NotPrimeReason,
}

impl NotPrime {
    /// Returns `None` when `value` is prime.
    pub const fn check(value: u32) -> Option<Self> {
        let reason = match value {
            0 => NotPrimeReason::BelowTwo,
            1 => NotPrimeReason::IsOne,
            _ => match smallest_factor(value) {
                Some(factor) => NotPrimeReason::DivisibleBy(factor),
                None => return None,
            },
        };
        Some(Self { value, reason })
    }
}

impl fmt::Display for NotPrime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is not prime. ", self.value)?;
        match self.reason {
            NotPrimeReason::BelowTwo => write!(f, "Primes start at 2."),
            NotPrimeReason::IsOne => write!(f, "1 is not a prime number."),
            NotPrimeReason::DivisibleBy(factor) => write!(f, "Divisible by {}.", factor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_is_prime(n: u32) -> bool {
        n >= 2 && (2..n).all(|d| n % d != 0)
    }

    #[test]
    fn matches_reference_oracle() {
        for n in 0..200 {
            assert_eq!(is_prime(n), reference_is_prime(n), "mismatch for {}", n);
        }
    }

    #[test]
    fn known_values() {
        assert!(!is_prime(1));
        assert!(is_prime(2));
        assert!(is_prime(3));
        assert!(!is_prime(4));
        assert!(is_prime(97));
        assert!(!is_prime(100));
        assert!(is_prime(u32::MAX - 4));
    }

    #[test]
    fn range_has_25_primes() {
        let (primes, non_primes) = partition_primes(2..=100);
        assert_eq!(primes.len(), 25);
        assert_eq!(non_primes.len(), 74);
        assert_eq!(primes.first(), Some(&2));
        assert_eq!(primes.last(), Some(&97));
    }

    #[test]
    fn explains_smallest_factor() {
        let diag = NotPrime::check(91).unwrap();
        assert_eq!(diag.reason, NotPrimeReason::DivisibleBy(7));
        assert_eq!(diag.to_string(), "91 is not prime. Divisible by 7.");

        let one = NotPrime::check(1).unwrap();
        assert_eq!(one.to_string(), "1 is not prime. 1 is not a prime number.");

        assert_eq!(NotPrime::check(53), None);
    }
}
