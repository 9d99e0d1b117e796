use statrs::function::beta::beta_reg;

/// Probabilities fed into a logarithm must stay inside the open unit interval.
pub const PROB_EPSILON: f64 = 1e-12;

pub fn clamp_probability(p: f64) -> f64 {
    p.clamp(PROB_EPSILON, 1. - PROB_EPSILON)
}

pub fn elo_logistic_cdf(rating_diff: f64, scale: f64) -> f64 {
    1. / (1. + 10f64.powf(-rating_diff / scale))
}

// CDF of the Student-t distribution with nu degrees of freedom, via the
// regularized incomplete beta function. Returns exactly 0.5 at x == 0
// since beta_reg(a, b, 1) == 1.
pub fn student_t_cdf(x: f64, nu: f64) -> f64 {
    let t = nu / (x * x + nu);
    let ib = beta_reg(0.5 * nu, 0.5, t);
    if x >= 0. { 1. - 0.5 * ib } else { 0.5 * ib }
}
