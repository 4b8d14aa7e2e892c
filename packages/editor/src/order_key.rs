//! Fractional order keys
//!
//! A key is a base-62 fraction written with the digits `0-9A-Za-z`, whose
//! ASCII order matches digit order, so plain string comparison sorts keys.
//! Generated keys never end in `0`, which guarantees there is always room for
//! another key between any two of them.

/// Key used for entries that carry no order key (the midpoint of the key space)
pub const DEFAULT_KEY: &str = "V";

const DIGITS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const BASE: usize = 62;

fn digit_value(c: u8) -> usize {
    match c {
        b'0'..=b'9' => (c - b'0') as usize,
        b'A'..=b'Z' => (c - b'A') as usize + 10,
        b'a'..=b'z' => (c - b'a') as usize + 36,
        _ => 0,
    }
}

/// Generate a key strictly between `lower` and `upper`
///
/// `None` means unbounded on that side. If the bounds are out of order the
/// upper bound is ignored and a key after `lower` is returned.
pub fn key_between(lower: Option<&str>, upper: Option<&str>) -> String {
    let lower = lower.unwrap_or_default();
    let upper = match upper {
        Some(upper) if upper <= lower => {
            tracing::warn!(lower, upper, "order key bounds out of order, appending");
            None
        }
        other => other,
    };

    let key = midpoint(lower.as_bytes(), upper.map(str::as_bytes));
    // Digits are ASCII
    String::from_utf8(key).unwrap_or_else(|_| DEFAULT_KEY.to_string())
}

/// Generate `n` ascending keys strictly between `lower` and `upper`
pub fn n_keys_between(lower: Option<&str>, upper: Option<&str>, n: usize) -> Vec<String> {
    match n {
        0 => Vec::new(),
        1 => vec![key_between(lower, upper)],
        _ if upper.is_none() => {
            let mut keys = Vec::with_capacity(n);
            let mut previous = lower.map(str::to_string);
            for _ in 0..n {
                let key = key_between(previous.as_deref(), None);
                previous = Some(key.clone());
                keys.push(key);
            }
            keys
        }
        _ if lower.is_none() => {
            let mut keys = Vec::with_capacity(n);
            let mut next = upper.map(str::to_string);
            for _ in 0..n {
                let key = key_between(None, next.as_deref());
                next = Some(key.clone());
                keys.push(key);
            }
            keys.reverse();
            keys
        }
        _ => {
            // Split around a middle key so key length grows logarithmically
            let mid = n / 2;
            let middle = key_between(lower, upper);
            let mut keys = n_keys_between(lower, Some(&middle), mid);
            let after = n_keys_between(Some(&middle), upper, n - mid - 1);
            keys.push(middle);
            keys.extend(after);
            keys
        }
    }
}

fn midpoint(lower: &[u8], upper: Option<&[u8]>) -> Vec<u8> {
    if let Some(upper) = upper {
        // Shared prefix, treating missing lower digits as zero
        let mut n = 0;
        while n < upper.len() && lower.get(n).copied().unwrap_or(b'0') == upper[n] {
            n += 1;
        }
        if n > 0 {
            let mut key = upper[..n].to_vec();
            let rest = upper.get(n..).filter(|rest| !rest.is_empty());
            key.extend(midpoint(lower.get(n..).unwrap_or_default(), rest));
            return key;
        }
    }

    let digit_lower = lower.first().map(|&c| digit_value(c)).unwrap_or(0);
    let digit_upper = upper
        .and_then(|upper| upper.first())
        .map(|&c| digit_value(c))
        .unwrap_or(BASE);

    if digit_upper > digit_lower + 1 {
        return vec![DIGITS[(digit_lower + digit_upper + 1) / 2]];
    }

    match upper {
        Some(upper) if upper.len() > 1 => upper[..1].to_vec(),
        _ => {
            let mut key = vec![DIGITS[digit_lower]];
            key.extend(midpoint(lower.get(1..).unwrap_or_default(), None));
            key
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_key_is_default() {
        assert_eq!(key_between(None, None), DEFAULT_KEY);
    }

    #[test]
    fn test_keys_around_default() {
        let before = key_between(None, Some(DEFAULT_KEY));
        let after = key_between(Some(DEFAULT_KEY), None);
        assert!(before.as_str() < DEFAULT_KEY);
        assert!(after.as_str() > DEFAULT_KEY);
    }

    #[test]
    fn test_adjacent_digits_extend_key() {
        let key = key_between(Some("V"), Some("W"));
        assert_eq!(key, "VV");
    }

    #[test]
    fn test_out_of_order_bounds_append() {
        let key = key_between(Some("b"), Some("a"));
        assert!(key.as_str() > "b");
    }

    #[test]
    fn test_n_keys_between_bounds() {
        let keys = n_keys_between(Some("A"), Some("B"), 5);
        assert_eq!(keys.len(), 5);
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
        assert!(keys.iter().all(|k| k.as_str() > "A" && k.as_str() < "B"));
    }

    #[test]
    fn test_repeated_prepend_and_append_stay_sorted() {
        let mut keys = vec![key_between(None, None)];
        for _ in 0..200 {
            let first = keys.first().cloned();
            keys.insert(0, key_between(None, first.as_deref()));
            let last = keys.last().cloned();
            keys.push(key_between(last.as_deref(), None));
        }
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
        assert!(keys.iter().all(|k| !k.ends_with('0')));
    }

    proptest! {
        #[test]
        fn prop_inserted_keys_fall_between_neighbours(positions in proptest::collection::vec(any::<prop::sample::Index>(), 1..120)) {
            let mut keys: Vec<String> = Vec::new();
            for position in positions {
                let at = position.index(keys.len() + 1);
                let lower = at.checked_sub(1).map(|i| keys[i].clone());
                let upper = keys.get(at).cloned();
                let key = key_between(lower.as_deref(), upper.as_deref());

                if let Some(lower) = &lower {
                    prop_assert!(key.as_str() > lower.as_str());
                }
                if let Some(upper) = &upper {
                    prop_assert!(key.as_str() < upper.as_str());
                }
                prop_assert!(!key.ends_with('0'));
                keys.insert(at, key);
            }
        }

        #[test]
        fn prop_batches_fit_between_neighbours(n in 1usize..40, lower_first in any::<bool>()) {
            let lower = key_between(None, None);
            let upper = key_between(Some(&lower), None);
            let (lower, upper) = if lower_first {
                (Some(lower.as_str()), Some(upper.as_str()))
            } else {
                (None, Some(lower.as_str()))
            };

            let keys = n_keys_between(lower, upper, n);
            prop_assert_eq!(keys.len(), n);
            prop_assert!(keys.windows(2).all(|w| w[0] < w[1]));
            if let Some(lower) = lower {
                prop_assert!(keys[0].as_str() > lower);
            }
            if let Some(upper) = upper {
                prop_assert!(keys[n - 1].as_str() < upper);
            }
        }
    }
}
