use std::f64::consts::PI;

/// Tapering applied to each analysis window before the FFT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowType {
    Hann,
    #[default]
    Hamming,
    Blackman,
}

impl WindowType {
    /// Coefficients for a window of `n` samples, symmetric over `n - 1`.
    pub fn generate(self, n: usize) -> Vec<f64> {
        if n <= 1 { return vec![1.0; n]; }
        let denom = (n - 1) as f64;

        (0..n)
            .map(|i| {
                let x = (2.0 * PI * i as f64) / denom;
                match self {
                    WindowType::Hann => 0.5 * (1.0 - x.cos()),
                    WindowType::Hamming => 0.54 - 0.46 * x.cos(),
                    WindowType::Blackman => 0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos(),
                }
            })
            .collect()
    }

    pub fn name(self) -> &'static str {
        match self {
            WindowType::Hann => "Hann",
            WindowType::Hamming => "Hamming",
            WindowType::Blackman => "Blackman",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "hann" => Some(WindowType::Hann),
            "hamming" => Some(WindowType::Hamming),
            "blackman" => Some(WindowType::Blackman),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_hamming_endpoints_and_peak() {
        let w = WindowType::Hamming.generate(401);
        assert_relative_eq!(w[0], 0.08, epsilon = 1e-12);
        assert_relative_eq!(w[400], 0.08, epsilon = 1e-12);
        assert_relative_eq!(w[200], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_windows_are_symmetric() {
        for kind in [WindowType::Hann, WindowType::Hamming, WindowType::Blackman] {
            let w = kind.generate(64);
            for i in 0..32 {
                assert_relative_eq!(w[i], w[63 - i], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_degenerate_lengths() {
        assert!(WindowType::Hamming.generate(0).is_empty());
        assert_eq!(WindowType::Hamming.generate(1), vec![1.0]);
    }

    #[test]
    fn test_name_round_trip() {
        assert_eq!(WindowType::from_name("HAMMING"), Some(WindowType::Hamming));
        assert_eq!(WindowType::from_name(WindowType::Blackman.name()), Some(WindowType::Blackman));
        assert_eq!(WindowType::from_name("kaiser"), None);
    }
}
