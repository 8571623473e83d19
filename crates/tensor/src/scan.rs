//! Sequential folds.
//!
//! `scan` threads a carry through a sequence and collects one output per
//! element, the same contract as a compiled loop primitive: the number of
//! iterations is fixed by the length of `xs`, and the body runs once per
//! element in order.

/// Folds `f` over `xs`, returning the final carry and every per-step output.
pub fn scan<C, X, Y, F>(init: C, xs: impl IntoIterator<Item = X>, mut f: F) -> (C, Vec<Y>)
where
    F: FnMut(C, X) -> (C, Y),
{
    let xs = xs.into_iter();
    let mut ys = Vec::with_capacity(xs.size_hint().0);
    let mut carry = init;
    for x in xs {
        let (next, y) = f(carry, x);
        carry = next;
        ys.push(y);
    }
    (carry, ys)
}

/// Fallible [`scan`]: stops at the first error.
pub fn try_scan<C, X, Y, E, F>(
    init: C,
    xs: impl IntoIterator<Item = X>,
    mut f: F,
) -> Result<(C, Vec<Y>), E>
where
    F: FnMut(C, X) -> Result<(C, Y), E>,
{
    let xs = xs.into_iter();
    let mut ys = Vec::with_capacity(xs.size_hint().0);
    let mut carry = init;
    for x in xs {
        let (next, y) = f(carry, x)?;
        carry = next;
        ys.push(y);
    }
    Ok((carry, ys))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_emits_running_sum() {
        let (total, partial) = scan(0, [1, 2, 3, 4], |acc, x| (acc + x, acc + x));
        assert_eq!(total, 10);
        assert_eq!(partial, vec![1, 3, 6, 10]);
    }

    #[test]
    fn scan_over_empty_returns_init() {
        let (carry, ys): (i32, Vec<i32>) = scan(7, std::iter::empty::<i32>(), |c, x| (c + x, x));
        assert_eq!(carry, 7);
        assert!(ys.is_empty());
    }

    #[test]
    fn try_scan_stops_at_first_error() {
        let mut calls = 0;
        let result: Result<(i32, Vec<i32>), &str> = try_scan(0, [1, 2, -1, 4], |acc, x| {
            calls += 1;
            if x < 0 {
                Err("negative")
            } else {
                Ok((acc + x, acc))
            }
        });
        assert_eq!(result, Err("negative"));
        assert_eq!(calls, 3);
    }
}
