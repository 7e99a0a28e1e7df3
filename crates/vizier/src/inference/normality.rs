//! D'Agostino-Pearson omnibus normality test.

use crate::input::DataTable;
use crate::schema::Normality;

/// Outcome of attempting a normality test on one column.
///
/// A column that cannot be tested is a recoverable condition, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalityOutcome {
    Tested(Normality),
    Unavailable(String),
}

impl NormalityOutcome {
    pub fn into_option(self) -> Option<Normality> {
        match self {
            NormalityOutcome::Tested(n) => Some(n),
            NormalityOutcome::Unavailable(_) => None,
        }
    }
}

// =============================================================================
// STREAMING MOMENTS
// =============================================================================
// Single-pass central moments up to the fourth (Terriberry's extension of Welford).

#[derive(Debug, Clone, Default)]
struct Moments {
    n: f64,
    mean: f64,
    m2: f64,
    m3: f64,
    m4: f64,
}

impl Moments {
    fn add(&mut self, x: f64) {
        let n1 = self.n;
        self.n += 1.0;
        let n = self.n;
        let delta = x - self.mean;
        let delta_n = delta / n;
        let delta_n2 = delta_n * delta_n;
        let term1 = delta * delta_n * n1;

        self.mean += delta_n;
        self.m4 += term1 * delta_n2 * (n * n - 3.0 * n + 3.0) + 6.0 * delta_n2 * self.m2
            - 4.0 * delta_n * self.m3;
        self.m3 += term1 * delta_n * (n - 2.0) - 3.0 * delta_n * self.m2;
        self.m2 += term1;
    }

    /// Biased sample skewness, m3 / m2^1.5.
    fn skewness(&self) -> f64 {
        let m2 = self.m2 / self.n;
        (self.m3 / self.n) / m2.powf(1.5)
    }

    /// Biased (Pearson, non-excess) kurtosis, m4 / m2^2.
    fn kurtosis(&self) -> f64 {
        let m2 = self.m2 / self.n;
        (self.m4 / self.n) / (m2 * m2)
    }
}

/// Coerce a column's non-null values to floats and test them.
pub fn column_normality(table: &DataTable, index: usize, min_samples: usize) -> NormalityOutcome {
    let mut values = Vec::new();
    for raw in table.non_null_values(index) {
        match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => values.push(v),
            _ => {
                return NormalityOutcome::Unavailable(format!(
                    "value '{raw}' cannot be coerced to a number"
                ));
            }
        }
    }
    normality_test(&values, min_samples)
}

/// Run the K² test. Needs at least `min_samples` (and never fewer than 8) values
/// with non-zero variance.
pub fn normality_test(values: &[f64], min_samples: usize) -> NormalityOutcome {
    let required = min_samples.max(8);
    if values.len() < required {
        return NormalityOutcome::Unavailable(format!(
            "need at least {required} values, got {}",
            values.len()
        ));
    }

    let mut moments = Moments::default();
    for &v in values {
        moments.add(v);
    }

    if moments.m2 <= f64::EPSILON * moments.n {
        return NormalityOutcome::Unavailable("zero variance".to_string());
    }

    let n = moments.n;
    let Some(z_skew) = skew_z(moments.skewness(), n) else {
        return NormalityOutcome::Unavailable("skewness test undefined".to_string());
    };
    let Some(z_kurt) = kurtosis_z(moments.kurtosis(), n) else {
        return NormalityOutcome::Unavailable("kurtosis test undefined".to_string());
    };

    let statistic = z_skew * z_skew + z_kurt * z_kurt;
    // Chi-square survival function with two degrees of freedom.
    let p_value = (-statistic / 2.0).exp();

    if !statistic.is_finite() {
        return NormalityOutcome::Unavailable("non-finite statistic".to_string());
    }

    NormalityOutcome::Tested(Normality { statistic, p_value })
}

fn skew_z(b2: f64, n: f64) -> Option<f64> {
    let y = b2 * ((n + 1.0) * (n + 3.0) / (6.0 * (n - 2.0))).sqrt();
    let beta2 = 3.0 * (n * n + 27.0 * n - 70.0) * (n + 1.0) * (n + 3.0)
        / ((n - 2.0) * (n + 5.0) * (n + 7.0) * (n + 9.0));
    let w2 = -1.0 + (2.0 * (beta2 - 1.0)).sqrt();
    let delta = 1.0 / (0.5 * w2.ln()).sqrt();
    let alpha = (2.0 / (w2 - 1.0)).sqrt();
    let y = if y == 0.0 { 1.0 } else { y };
    let ratio = y / alpha;
    let z = delta * (ratio + (ratio * ratio + 1.0).sqrt()).ln();
    z.is_finite().then_some(z)
}

fn kurtosis_z(b2: f64, n: f64) -> Option<f64> {
    let expected = 3.0 * (n - 1.0) / (n + 1.0);
    let variance = 24.0 * n * (n - 2.0) * (n - 3.0)
        / ((n + 1.0) * (n + 1.0) * (n + 3.0) * (n + 5.0));
    let x = (b2 - expected) / variance.sqrt();
    let sqrt_beta1 = 6.0 * (n * n - 5.0 * n + 2.0) / ((n + 7.0) * (n + 9.0))
        * (6.0 * (n + 3.0) * (n + 5.0) / (n * (n - 2.0) * (n - 3.0))).sqrt();
    let a = 6.0
        + 8.0 / sqrt_beta1 * (2.0 / sqrt_beta1 + (1.0 + 4.0 / (sqrt_beta1 * sqrt_beta1)).sqrt());
    let term1 = 1.0 - 2.0 / (9.0 * a);
    let denom = 1.0 + x * (2.0 / (a - 4.0)).sqrt();
    if denom == 0.0 {
        return None;
    }
    let term2 = denom.signum() * ((1.0 - 2.0 / a) / denom.abs()).cbrt();
    let z = (term1 - term2) / (2.0 / (9.0 * a)).sqrt();
    z.is_finite().then_some(z)
}
