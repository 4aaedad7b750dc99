//! Fixed-capacity token bucket.

use std::sync::atomic::{AtomicI64, Ordering};

use crate::tokens::Token;

/// A lock-free token bucket, full on construction.
///
/// `0 <= available() <= capacity()` holds at every instant: each mutation is a
/// single compare-and-swap from one in-range value to another.
#[derive(Debug)]
pub struct Bucket {
    tokens: AtomicI64,
    capacity: i64,
}

impl Bucket {
    /// Create a full bucket. A negative capacity is treated as zero.
    pub fn new(capacity: i64) -> Self {
        let capacity = capacity.max(0);
        Self {
            tokens: AtomicI64::new(capacity),
            capacity,
        }
    }
}

impl Token for Bucket {
    fn take(&self, n: i64) -> i64 {
        if n <= 0 {
            return 0;
        }

        let mut tokens = self.tokens.load(Ordering::Acquire);
        loop {
            if tokens == 0 {
                return 0;
            }

            let (next, taken) = if n <= tokens {
                (tokens - n, n)
            } else {
                // Partial grant: drain whatever is left.
                (0, tokens)
            };

            match self
                .tokens
                .compare_exchange_weak(tokens, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return taken,
                Err(actual) => tokens = actual,
            }
        }
    }

    fn put(&self, n: i64) -> i64 {
        if n <= 0 {
            return 0;
        }

        let mut tokens = self.tokens.load(Ordering::Acquire);
        loop {
            if tokens >= self.capacity {
                return 0;
            }

            let room = self.capacity - tokens;
            let (next, added) = if n <= room {
                (tokens + n, n)
            } else {
                (self.capacity, room)
            };

            match self
                .tokens
                .compare_exchange_weak(tokens, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return added,
                Err(actual) => tokens = actual,
            }
        }
    }

    fn available(&self) -> i64 {
        self.tokens.load(Ordering::Acquire)
    }

    fn capacity(&self) -> i64 {
        self.capacity
    }

    fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_take_and_put() {
        let bucket = Bucket::new(10);
        assert_eq!(bucket.take(3), 3);
        assert_eq!(bucket.available(), 7);

        assert_eq!(bucket.put(2), 2);
        assert_eq!(bucket.available(), 9);

        assert_eq!(bucket.put(5), 1, "put is clamped at capacity");
        assert_eq!(bucket.available(), 10);
        assert_eq!(bucket.put(1), 0);
    }

    #[test]
    fn test_empty_bucket() {
        let bucket = Bucket::new(2);
        assert_eq!(bucket.take(2), 2);
        assert_eq!(bucket.take(1), 0);
    }

    #[test]
    fn test_non_positive_amounts() {
        let bucket = Bucket::new(5);
        assert_eq!(bucket.take(0), 0);
        assert_eq!(bucket.take(-3), 0);
        assert_eq!(bucket.put(-3), 0);
        assert_eq!(bucket.available(), 5);
    }

    #[test]
    fn test_negative_capacity() {
        let bucket = Bucket::new(-4);
        assert_eq!(bucket.capacity(), 0);
        assert_eq!(bucket.take(1), 0);
        assert_eq!(bucket.put(1), 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Property: taking at most the capacity grants exactly what was asked.
        #[test]
        fn prop_take_within_capacity(capacity in 1i64..10_000, ratio in 0.0f64..=1.0) {
            let n = ((capacity as f64) * ratio) as i64;
            let bucket = Bucket::new(capacity);

            prop_assert_eq!(bucket.take(n), n);
            prop_assert_eq!(bucket.available(), capacity - n);
        }

        /// Property: over-asking drains the bucket and grants only the capacity.
        #[test]
        fn prop_take_beyond_capacity(capacity in 0i64..10_000, extra in 1i64..10_000) {
            let bucket = Bucket::new(capacity);

            prop_assert_eq!(bucket.take(capacity + extra), capacity);
            prop_assert_eq!(bucket.available(), 0);
        }

        /// Property: no sequence of puts and takes escapes [0, capacity].
        #[test]
        fn prop_bounds_hold(
            capacity in 0i64..1_000,
            ops in proptest::collection::vec((any::<bool>(), -10i64..2_000), 0..50),
        ) {
            let bucket = Bucket::new(capacity);
            for (is_put, n) in ops {
                let before = bucket.available();
                if is_put {
                    let added = bucket.put(n);
                    prop_assert_eq!(bucket.available(), before + added);
                } else {
                    let taken = bucket.take(n);
                    prop_assert_eq!(bucket.available(), before - taken);
                }
                prop_assert!(bucket.available() >= 0);
                prop_assert!(bucket.available() <= capacity);
            }
        }
    }
}
