//! Exact rational and integer arithmetic.
//!
//! [`Rational`] keeps its numerator and denominator exactly as constructed.
//! Nothing is reduced implicitly: structural comparison of expression trees
//! looks at the raw `(p, q)` pair, so callers canonicalize when they need to.

use std::fmt;
use std::hash::{Hash, Hasher};

use num_bigint::{BigInt, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::error::{CasError, CasResult};

/// Number of strong pseudoprime rounds used by [`is_probable_prime`]
pub const PRIME_TEST_ROUNDS: usize = 100;

/// Exact fraction `p / q`
#[derive(Debug, Clone)]
pub struct Rational {
    pub p: BigInt,
    pub q: BigInt,
}

impl Rational {
    pub fn new(p: impl Into<BigInt>, q: impl Into<BigInt>) -> Self {
        Rational {
            p: p.into(),
            q: q.into(),
        }
    }

    pub fn integer(n: impl Into<BigInt>) -> Self {
        Rational::new(n, 1)
    }

    pub fn zero() -> Self {
        Rational::integer(0)
    }

    pub fn one() -> Self {
        Rational::integer(1)
    }

    /// Reduce by the gcd, force `q > 0`, and use `q = 1` for zero.
    ///
    /// A zero denominator is left untouched.
    pub fn canonical(&self) -> Rational {
        if self.q.is_zero() {
            return self.clone();
        }
        let g = self.p.gcd(&self.q);
        let (mut p, mut q) = (&self.p / &g, &self.q / &g);
        if q.is_negative() {
            p = -p;
            q = -q;
        }
        if p.is_zero() {
            q = BigInt::one();
        }
        Rational { p, q }
    }

    pub fn is_canonical(&self) -> bool {
        let c = self.canonical();
        c.p == self.p && c.q == self.q
    }

    pub fn add(&self, other: &Rational) -> Rational {
        Rational {
            p: &self.p * &other.q + &other.p * &self.q,
            q: &self.q * &other.q,
        }
        .canonical()
    }

    pub fn mul(&self, other: &Rational) -> Rational {
        Rational {
            p: &self.p * &other.p,
            q: &self.q * &other.q,
        }
        .canonical()
    }

    pub fn neg(&self) -> Rational {
        Rational {
            p: -&self.p,
            q: self.q.clone(),
        }
    }

    pub fn inverse(&self) -> Rational {
        Rational {
            p: self.q.clone(),
            q: self.p.clone(),
        }
        .canonical()
    }

    /// Largest rational dividing both with an integral quotient
    pub fn gcd(&self, other: &Rational) -> Rational {
        Rational {
            p: (&self.p * &other.q).gcd(&(&other.p * &self.q)),
            q: &self.q * &other.q,
        }
        .canonical()
    }

    pub fn is_zero(&self) -> bool {
        self.p.is_zero() && !self.q.is_zero()
    }

    /// Value equals one, regardless of representation
    pub fn is_one(&self) -> bool {
        !self.q.is_zero() && self.p == self.q
    }

    pub fn is_integer(&self) -> bool {
        !self.q.is_zero() && (&self.p % &self.q).is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.p.sign() * self.q.sign() == num_bigint::Sign::Minus
    }

    /// `p * q >= 0`
    pub fn is_non_negative(&self) -> bool {
        !self.is_negative()
    }
}

impl PartialEq for Rational {
    /// Value equality: `a/b == c/d` iff `a*d == c*b`
    fn eq(&self, other: &Self) -> bool {
        &self.p * &other.q == &other.p * &self.q
    }
}

impl Eq for Rational {}

impl Hash for Rational {
    /// Hashes the canonical form so equal values share a hash. Every zero
    /// denominator lands in one bucket.
    fn hash<H: Hasher>(&self, state: &mut H) {
        if self.q.is_zero() {
            return 0u8.hash(state);
        }
        let c = self.canonical();
        1u8.hash(state);
        c.p.hash(state);
        c.q.hash(state);
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.q.is_one() {
            write!(f, "{}", self.p)
        } else {
            write!(f, "{}/{}", self.p, self.q)
        }
    }
}

// =============================================================================
// INTEGER HELPERS
// =============================================================================

/// Non-negative remainder for positive `m`: `((n % m) + m) % m`
pub fn modulo(n: &BigInt, m: &BigInt) -> BigInt {
    ((n % m) + m) % m
}

/// Least common multiple of two or more integers; zero if any argument is zero
pub fn lcm(args: &[BigInt]) -> CasResult<BigInt> {
    if args.len() < 2 {
        return Err(CasError::invalid("lcm", "needs at least two arguments"));
    }
    if args.iter().any(Zero::is_zero) {
        return Ok(BigInt::zero());
    }
    Ok(args[1..]
        .iter()
        .fold(args[0].abs(), |acc, n| acc.lcm(n)))
}

/// Generic exponentiation by repeated squaring.
///
/// Computes `a^n` for `n >= 1` with `mul` as the product.
pub fn repeat_square<T: Clone>(a: &T, n: &BigInt, mul: impl Fn(&T, &T) -> T) -> T {
    let mut result: Option<T> = None;
    let mut base = a.clone();
    let mut n = n.clone();
    let two = BigInt::from(2);
    while n.is_positive() {
        if n.is_odd() {
            result = Some(match result {
                Some(r) => mul(&r, &base),
                None => base.clone(),
            });
        }
        n /= &two;
        if n.is_positive() {
            base = mul(&base, &base);
        }
    }
    result.unwrap_or(base)
}

/// `q^a mod n` by repeated squaring
pub fn mod_pow(q: &BigInt, a: &BigInt, n: &BigInt) -> BigInt {
    if a.is_zero() {
        return modulo(&BigInt::one(), n);
    }
    repeat_square(&modulo(q, n), a, |x, y| modulo(&(x * y), n))
}

/// Uniform random integer in `[from, to]`
pub fn random_in(from: &BigInt, to: &BigInt) -> BigInt {
    let mut rng = rand::thread_rng();
    rng.gen_bigint_range(from, &(to + 1))
}

/// Number of bits needed to represent `|n|`
pub fn bit_length(n: &BigInt) -> u64 {
    n.bits()
}

/// Strong pseudoprime test with `rounds` random bases
pub fn is_probable_prime_with(n: &BigInt, rounds: usize) -> bool {
    let two = BigInt::from(2);
    if n < &two {
        return false;
    }
    if n == &two || n == &BigInt::from(3) {
        return true;
    }
    if n.is_even() {
        return false;
    }

    // n - 1 = 2^s * t with t odd
    let n_minus_one: BigInt = n - 1;
    let mut t = n_minus_one.clone();
    let mut s = 0u32;
    while t.is_even() {
        t /= &two;
        s += 1;
    }

    'rounds: for _ in 0..rounds {
        let a = random_in(&two, &(n - 2));
        let mut b = mod_pow(&a, &t, n);
        if b.is_one() || b == n_minus_one {
            continue;
        }
        for _ in 1..s {
            b = modulo(&(&b * &b), n);
            if b == n_minus_one {
                continue 'rounds;
            }
        }
        return false;
    }
    true
}

pub fn is_probable_prime(n: &BigInt) -> bool {
    is_probable_prime_with(n, PRIME_TEST_ROUNDS)
}

/// Random probable prime in `[from, to]`, or `None` when the range holds none
pub fn random_prime(from: &BigInt, to: &BigInt) -> Option<BigInt> {
    if from > to {
        return None;
    }
    let start = random_in(from, to);
    let mut n = start.clone();
    loop {
        if is_probable_prime(&n) {
            return Some(n);
        }
        n += 1;
        if &n > to {
            n = from.clone();
        }
        if n == start {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(p: i64, q: i64) -> Rational {
        Rational::new(p, q)
    }

    #[test]
    fn test_canonical_sign_and_zero() {
        let c = r(4, -6).canonical();
        assert_eq!((c.p.clone(), c.q.clone()), (BigInt::from(-2), BigInt::from(3)));
        let z = r(0, -5).canonical();
        assert_eq!((z.p, z.q), (BigInt::zero(), BigInt::one()));
    }

    #[test]
    fn test_equal_values_hash_alike() {
        let mut set = rustc_hash::FxHashSet::default();
        set.insert(r(1, 2));
        assert!(set.contains(&r(2, 4)));
        assert!(set.contains(&r(-3, -6)));
        assert!(!set.contains(&r(1, 3)));

        set.insert(r(-4, 2));
        set.insert(r(2, -1));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_field_ops() {
        assert_eq!(r(1, 2).add(&r(1, 3)), r(5, 6));
        assert_eq!(r(2, 3).mul(&r(3, 4)), r(1, 2));
        assert_eq!(r(-2, 5).inverse().q, BigInt::from(2));
        assert_eq!(r(4, 1).gcd(&r(6, 1)), r(2, 1));
    }

    #[test]
    fn test_modulo_is_non_negative() {
        assert_eq!(modulo(&BigInt::from(-7), &BigInt::from(3)), BigInt::from(2));
    }

    #[test]
    fn test_lcm() {
        let args = [BigInt::from(4), BigInt::from(6), BigInt::from(10)];
        assert_eq!(lcm(&args).unwrap(), BigInt::from(60));
        assert_eq!(lcm(&[BigInt::from(4), BigInt::zero()]).unwrap(), BigInt::zero());
        assert!(lcm(&[BigInt::from(4)]).is_err());
    }

    #[test]
    fn test_mod_pow_and_primes() {
        assert_eq!(
            mod_pow(&BigInt::from(3), &BigInt::from(200), &BigInt::from(13)),
            BigInt::from(9)
        );
        for p in [2, 3, 5, 7, 97, 7919] {
            assert!(is_probable_prime(&BigInt::from(p)), "{p} is prime");
        }
        for c in [1, 4, 9, 561, 7917] {
            assert!(!is_probable_prime(&BigInt::from(c)), "{c} is composite");
        }
    }

    #[test]
    fn test_random_prime_in_range() {
        let p = random_prime(&BigInt::from(100), &BigInt::from(200)).unwrap();
        assert!(p >= BigInt::from(100) && p <= BigInt::from(200));
        assert!(is_probable_prime(&p));
        assert_eq!(random_prime(&BigInt::from(24), &BigInt::from(28)), None);
    }

    #[test]
    fn test_bit_length() {
        assert_eq!(bit_length(&BigInt::from(255)), 8);
        assert_eq!(bit_length(&BigInt::from(256)), 9);
    }
}
