//! Log-domain helpers for products and entropies of probabilities.

/// ln(p) with ln(0) = -inf and NaN for invalid inputs.
pub fn safe_ln(p: f64) -> f64 {
    if p.is_nan() || p < 0.0 {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    p.ln()
}

/// Stable ln(prod(factors)) as a sum of logs.
///
/// Returns NEG_INFINITY as soon as any factor is zero, 0.0 for empty input.
pub fn log_product(factors: &[f64]) -> f64 {
    let mut acc = 0.0;
    for f in factors {
        let l = safe_ln(*f);
        if l.is_nan() {
            return f64::NAN;
        }
        if l == f64::NEG_INFINITY {
            return f64::NEG_INFINITY;
        }
        acc += l;
    }
    acc
}

/// Shannon entropy in bits; zero-probability entries contribute nothing.
pub fn entropy_bits(probs: &[f64]) -> f64 {
    let mut h = 0.0;
    for p in probs {
        if *p > 0.0 {
            h -= p * p.log2();
        }
    }
    h
}
