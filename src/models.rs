use crate::numerical::{clamp_probability, elo_logistic_cdf, student_t_cdf};

/// Predicts the probability that side A beats side B from their effective
/// team ratings. Total on all finite inputs; implementations must stay inside
/// the open interval (0, 1) and return exactly 0.5 for equal ratings.
pub trait WinProbabilityModel: std::fmt::Debug {
    fn win_probability(&self, rating_a: f64, rating_b: f64) -> f64;
}

/// Classic Elo: 1 / (1 + 10^((b - a) / scale)).
#[derive(Debug)]
pub struct Logistic {
    pub scale: f64,
}

impl Default for Logistic {
    fn default() -> Self {
        Self { scale: 400. }
    }
}

impl WinProbabilityModel for Logistic {
    fn win_probability(&self, rating_a: f64, rating_b: f64) -> f64 {
        clamp_probability(elo_logistic_cdf(rating_a - rating_b, self.scale))
    }
}

/// Student-t CDF over the scaled rating differential. The low degree of
/// freedom gives heavier tails than the logistic model, so upsets cost the
/// favorite less confidence.
#[derive(Debug)]
pub struct StudentT {
    pub scale: f64,
    pub degrees_of_freedom: f64,
}

impl Default for StudentT {
    fn default() -> Self {
        Self {
            scale: 100.,
            degrees_of_freedom: 3.,
        }
    }
}

impl WinProbabilityModel for StudentT {
    fn win_probability(&self, rating_a: f64, rating_b: f64) -> f64 {
        let z = (rating_a - rating_b) / self.scale;
        clamp_probability(student_t_cdf(z, self.degrees_of_freedom))
    }
}

pub fn get_model_by_name(
    model_name: &str,
) -> Result<Box<dyn WinProbabilityModel + Send>, String> {
    match model_name {
        "logistic" => Ok(Box::new(Logistic::default())),
        "student-t" => Ok(Box::new(StudentT::default())),
        name => Err(format!(
            "{} is not a valid win-probability model. Must be one of: logistic, student-t",
            name
        )),
    }
}
