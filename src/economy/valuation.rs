//! Number valuation
//!
//! Every commodity is a positive integer. Its food value ("nutrition") and
//! production cost ("weight") come from its prime factorization, with each
//! prime contributing according to its rank in the ascending prime sequence
//! (2 → 1, 3 → 2, 5 → 3, ...). All functions are pure and deterministic.

use std::collections::BTreeMap;

/// Trial-division primality test
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 {
        return false;
    }
    let mut d = 3;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

/// 1-indexed position of `n` among the primes, 0 if `n` is not prime
pub fn prime_rank(n: u64) -> u64 {
    if !is_prime(n) {
        return 0;
    }
    (2..=n).filter(|&k| is_prime(k)).count() as u64
}

/// Prime factorization as `prime -> exponent`, ascending by prime
///
/// `factorize(1)` is empty.
pub fn factorize(mut n: u64) -> BTreeMap<u64, u32> {
    let mut factors = BTreeMap::new();
    let mut d = 2;
    while d * d <= n {
        while n % d == 0 {
            *factors.entry(d).or_insert(0) += 1;
            n /= d;
        }
        d += 1;
    }
    if n > 1 {
        *factors.entry(n).or_insert(0) += 1;
    }
    factors
}

/// Food value of a number
pub fn nutrition(n: u64) -> u64 {
    if n <= 1 {
        return 0;
    }
    if is_prime(n) {
        return prime_rank(n);
    }
    factorize(n)
        .into_iter()
        .map(|(prime, exp)| prime_rank(prime) * u64::from(exp))
        .sum()
}

/// Production cost of a number
pub fn weight(n: u64) -> u64 {
    if n == 0 {
        return 0;
    }
    if n == 1 {
        return 1;
    }
    if is_prime(n) {
        let rank = prime_rank(n);
        return rank * rank;
    }
    factorize(n)
        .into_iter()
        .map(|(prime, exp)| {
            let term = prime_rank(prime) * u64::from(exp);
            term * term
        })
        .sum()
}

/// Nutrition per unit of weight (0 when weight is 0)
pub fn efficiency(n: u64) -> f64 {
    let w = weight(n);
    if w == 0 {
        return 0.0;
    }
    nutrition(n) as f64 / w as f64
}

/// Smallest prime strictly greater than `n`
pub fn next_prime_after(n: u64) -> u64 {
    let mut candidate = n + 1;
    while !is_prime(candidate) {
        candidate += 1;
    }
    candidate
}

/// All primes `<= n`, ascending
pub fn primes_up_to(n: u64) -> Vec<u64> {
    (2..=n).filter(|&k| is_prime(k)).collect()
}
