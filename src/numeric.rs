//! Probability primitives shared by every significance test
//!
//! The normal CDF and the chi-square(1) survival function are both evaluated
//! through `libm::erfc`, so the upper and lower tails keep full relative
//! precision instead of losing it to `1.0 - x` cancellation.

use std::f64::consts::{PI, SQRT_2};

/// Standard normal cumulative distribution function
///
/// `Φ(z) = 0.5 · (1 + erf(z / √2))`, computed as `0.5 · erfc(-z / √2)`.
///
/// # Example
/// ```
/// use schnapsen_stats::numeric::standard_normal_cdf;
///
/// assert!((standard_normal_cdf(0.0) - 0.5).abs() < 1e-15);
/// assert!((standard_normal_cdf(1.96) - 0.975).abs() < 1e-4);
/// ```
pub fn standard_normal_cdf(z: f64) -> f64 {
    0.5 * libm::erfc(-z / SQRT_2)
}

/// Upper tail of the standard normal, `1 - Φ(z)`
pub fn standard_normal_sf(z: f64) -> f64 {
    0.5 * libm::erfc(z / SQRT_2)
}

/// Survival function of the chi-square distribution with one degree of freedom
///
/// Closed form `2 · (1 - Φ(√x))`, which reduces to `erfc(√(x / 2))`.
/// Callers guarantee `x >= 0`; zero (and anything below it) maps to `1`.
pub fn chi_square_survival_1df(x: f64) -> f64 {
    if x <= 0.0 {
        return 1.0;
    }
    libm::erfc((x / 2.0).sqrt())
}

// Acklam's rational approximation for the normal quantile.
const ACKLAM_A: [f64; 6] = [
    -3.969_683_028_665_376e1,
    2.209_460_984_245_205e2,
    -2.759_285_104_469_687e2,
    1.383_577_518_672_690e2,
    -3.066_479_806_614_716e1,
    2.506_628_277_459_239,
];
const ACKLAM_B: [f64; 5] = [
    -5.447_609_879_822_406e1,
    1.615_858_368_580_409e2,
    -1.556_989_798_598_866e2,
    6.680_131_188_771_972e1,
    -1.328_068_155_288_572e1,
];
const ACKLAM_C: [f64; 6] = [
    -7.784_894_002_430_293e-3,
    -3.223_964_580_411_365e-1,
    -2.400_758_277_161_838,
    -2.549_732_539_343_734,
    4.374_664_141_464_968,
    2.938_163_982_698_783,
];
const ACKLAM_D: [f64; 4] = [
    7.784_695_709_041_462e-3,
    3.224_671_290_700_398e-1,
    2.445_134_137_142_996,
    3.754_408_661_907_416,
];
const ACKLAM_P_LOW: f64 = 0.02425;

/// Inverse of the standard normal CDF
///
/// Acklam's approximation (relative error ~1e-9) followed by one Halley step
/// against [`standard_normal_cdf`], which brings it to near machine precision.
/// Returns `-inf`/`+inf` at `p <= 0` / `p >= 1`.
pub fn standard_normal_quantile(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    let x = if p < ACKLAM_P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        tail_ratio(q)
    } else if p <= 1.0 - ACKLAM_P_LOW {
        let q = p - 0.5;
        let r = q * q;
        let [a0, a1, a2, a3, a4, a5] = ACKLAM_A;
        let [b0, b1, b2, b3, b4] = ACKLAM_B;
        (((((a0 * r + a1) * r + a2) * r + a3) * r + a4) * r + a5) * q
            / (((((b0 * r + b1) * r + b2) * r + b3) * r + b4) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -tail_ratio(q)
    };

    // Halley refinement
    let e = standard_normal_cdf(x) - p;
    let u = e * (2.0 * PI).sqrt() * (x * x / 2.0).exp();
    x - u / (1.0 + x * u / 2.0)
}

fn tail_ratio(q: f64) -> f64 {
    let [c0, c1, c2, c3, c4, c5] = ACKLAM_C;
    let [d0, d1, d2, d3] = ACKLAM_D;
    (((((c0 * q + c1) * q + c2) * q + c3) * q + c4) * q + c5)
        / ((((d0 * q + d1) * q + d2) * q + d3) * q + 1.0)
}

/// Two-sided critical value `z_γ` for a confidence level `γ`
///
/// `Φ⁻¹(1 - (1 - γ) / 2)`; 0.95 gives 1.959964.
pub fn two_sided_critical_value(confidence: f64) -> f64 {
    standard_normal_quantile(1.0 - (1.0 - confidence) / 2.0)
}

/// Natural log of the Binomial(n, p) probability mass at `k`
///
/// Requires `0 < p < 1`; `k > n` has zero mass (`-inf`).
pub fn binomial_ln_pmf(n: u64, k: u64, p: f64) -> f64 {
    if k > n {
        return f64::NEG_INFINITY;
    }
    let (nf, kf) = (n as f64, k as f64);
    let ln_choose = libm::lgamma(nf + 1.0) - libm::lgamma(kf + 1.0) - libm::lgamma(nf - kf + 1.0);
    ln_choose + kf * p.ln() + (nf - kf) * (-p).ln_1p()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_cdf_at_zero_is_half() {
        assert!((standard_normal_cdf(0.0) - 0.5).abs() < 1e-15);
    }

    #[test]
    fn test_normal_cdf_reference_values() {
        // Φ(1) and Φ(-2.5) to 12 significant digits
        assert!((standard_normal_cdf(1.0) - 0.841_344_746_068_543).abs() < 1e-12);
        assert!((standard_normal_cdf(-2.5) - 0.006_209_665_325_776_132).abs() < 1e-12);
    }

    #[test]
    fn test_normal_cdf_symmetry() {
        for z in [0.3, 1.0, 1.96, 3.5, 6.0] {
            let sum = standard_normal_cdf(z) + standard_normal_cdf(-z);
            assert!((sum - 1.0).abs() < 1e-12, "z={} sum={}", z, sum);
        }
    }

    #[test]
    fn test_normal_sf_complements_cdf() {
        for z in [-3.0, -0.5, 0.0, 0.7, 2.2] {
            assert!((standard_normal_sf(z) + standard_normal_cdf(z) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_chi_square_survival_at_zero() {
        assert_eq!(chi_square_survival_1df(0.0), 1.0);
    }

    #[test]
    fn test_chi_square_survival_critical_value() {
        // 3.841459 is the 95th percentile of chi-square(1)
        assert!((chi_square_survival_1df(3.841_458_820_694_124) - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_chi_square_matches_normal_closed_form() {
        for x in [0.25, 1.0, 2.7, 9.0] {
            let closed = 2.0 * (1.0 - standard_normal_cdf(f64::sqrt(x)));
            assert!((chi_square_survival_1df(x) - closed).abs() < 1e-12);
        }
    }

    #[test]
    fn test_quantile_inverts_cdf() {
        for p in [1e-6, 0.01, 0.025, 0.3, 0.5, 0.8, 0.975, 0.999_999] {
            let z = standard_normal_quantile(p);
            assert!((standard_normal_cdf(z) - p).abs() < 1e-12, "p={}", p);
        }
    }

    #[test]
    fn test_quantile_bounds() {
        assert_eq!(standard_normal_quantile(0.0), f64::NEG_INFINITY);
        assert_eq!(standard_normal_quantile(1.0), f64::INFINITY);
    }

    #[test]
    fn test_critical_value_95() {
        assert!((two_sided_critical_value(0.95) - 1.959_963_984_540_054).abs() < 1e-9);
    }

    #[test]
    fn test_critical_value_99() {
        assert!((two_sided_critical_value(0.99) - 2.575_829_303_548_901).abs() < 1e-9);
    }

    #[test]
    fn test_binomial_pmf_small_case() {
        // P(X = 2) for Binomial(4, 0.5) = 6/16
        assert!((binomial_ln_pmf(4, 2, 0.5).exp() - 0.375).abs() < 1e-12);
    }

    #[test]
    fn test_binomial_pmf_sums_to_one() {
        let total: f64 = (0..=30).map(|k| binomial_ln_pmf(30, k, 0.3).exp()).sum();
        assert!((total - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_binomial_pmf_outside_support() {
        assert_eq!(binomial_ln_pmf(5, 6, 0.5), f64::NEG_INFINITY);
    }
}
