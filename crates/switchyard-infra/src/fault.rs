//! Random fault source backed by `rand`.

use std::sync::Arc;

use switchyard_core::fault::{AlwaysFail, FaultInjector, NeverFail};

/// Fails with a fixed probability.
#[derive(Debug, Clone, Copy)]
pub struct RandomFault {
    rate: f64,
}

impl RandomFault {
    /// `rate` is clamped into `[0, 1]`.
    pub fn new(rate: f64) -> Self {
        let rate = if rate.is_nan() { 0.0 } else { rate.clamp(0.0, 1.0) };
        Self { rate }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl FaultInjector for RandomFault {
    fn should_fail(&self) -> bool {
        rand::random::<f64>() < self.rate
    }
}

/// Pick an injector for `rate`: deterministic at the extremes, random between.
pub fn fault_from_rate(rate: f64) -> Arc<dyn FaultInjector> {
    if rate <= 0.0 || rate.is_nan() {
        Arc::new(NeverFail)
    } else if rate >= 1.0 {
        Arc::new(AlwaysFail)
    } else {
        Arc::new(RandomFault::new(rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_is_clamped() {
        assert_eq!(RandomFault::new(-1.0).rate(), 0.0);
        assert_eq!(RandomFault::new(7.0).rate(), 1.0);
        assert_eq!(RandomFault::new(f64::NAN).rate(), 0.0);
    }

    #[test]
    fn extreme_rates_are_deterministic() {
        let never = fault_from_rate(0.0);
        let always = fault_from_rate(1.0);
        for _ in 0..100 {
            assert!(!never.should_fail());
            assert!(always.should_fail());
        }
    }

    #[test]
    fn zero_and_one_random_faults_are_exact() {
        let never = RandomFault::new(0.0);
        let always = RandomFault::new(1.0);
        for _ in 0..100 {
            assert!(!never.should_fail());
            assert!(always.should_fail());
        }
    }

    #[test]
    fn intermediate_rate_produces_both_outcomes() {
        let fault = RandomFault::new(0.5);
        let failures = (0..1_000).filter(|_| fault.should_fail()).count();
        assert!(failures > 0 && failures < 1_000);
    }
}
