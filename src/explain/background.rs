//! Background sample for attribution baselines

use ndarray::{Array1, Array2, Axis};
use rand::seq::index::sample;
use rand::Rng;

use crate::{Error, Result};

/// Default number of background rows
pub const DEFAULT_BACKGROUND_SIZE: usize = 100;

/// A fixed sample of standardized reference rows
///
/// Drawn once per process and reused for every explanation; the column
/// means of the sample are the attribution baseline. The draw is random
/// over the full reference population and not required to be reproducible
/// across sessions, but seeding the rng makes it so for tests.
#[derive(Debug, Clone)]
pub struct BackgroundSample {
    rows: Array2<f64>,
    mean: Array1<f64>,
}

impl BackgroundSample {
    /// Draw `size` rows without replacement from a standardized matrix
    pub fn draw<R: Rng + ?Sized>(
        scaled: &Array2<f64>,
        size: usize,
        rng: &mut R,
    ) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidParameter(
                "background sample size must be positive".to_string(),
            ));
        }
        if scaled.nrows() < size {
            return Err(Error::InsufficientBackground {
                requested: size,
                available: scaled.nrows(),
            });
        }

        let indices = sample(rng, scaled.nrows(), size);
        let mut rows = Array2::zeros((size, scaled.ncols()));
        for (out, idx) in indices.iter().enumerate() {
            rows.row_mut(out).assign(&scaled.row(idx));
        }

        Self::from_rows(rows)
    }

    /// Use the given standardized rows directly as the background
    pub fn from_rows(rows: Array2<f64>) -> Result<Self> {
        if rows.nrows() == 0 {
            return Err(Error::InvalidParameter(
                "background sample cannot be empty".to_string(),
            ));
        }
        let mean = rows.mean_axis(Axis(0)).ok_or_else(|| {
            Error::InvalidParameter("background sample cannot be empty".to_string())
        })?;
        Ok(Self { rows, mean })
    }

    /// Per-column mean of the sample (the attribution baseline)
    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    /// Number of sampled rows
    pub fn size(&self) -> usize {
        self.rows.nrows()
    }

    /// Number of feature columns
    pub fn width(&self) -> usize {
        self.rows.ncols()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_draw_without_replacement() {
        let matrix = Array2::from_shape_fn((50, 3), |(i, j)| (i * 3 + j) as f64);
        let mut rng = StdRng::seed_from_u64(7);
        let sample = BackgroundSample::draw(&matrix, 20, &mut rng).unwrap();
        assert_eq!(sample.size(), 20);
        assert_eq!(sample.width(), 3);
    }

    #[test]
    fn test_insufficient_population() {
        let matrix = Array2::<f64>::zeros((5, 3));
        let mut rng = StdRng::seed_from_u64(7);
        let err = BackgroundSample::draw(&matrix, 100, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientBackground {
                requested: 100,
                available: 5
            }
        ));
    }

    #[test]
    fn test_zero_size_rejected() {
        let matrix = Array2::<f64>::zeros((5, 3));
        let mut rng = StdRng::seed_from_u64(7);
        assert!(BackgroundSample::draw(&matrix, 0, &mut rng).is_err());
    }

    #[test]
    fn test_mean_is_column_mean() {
        let rows = arr2(&[[1.0, 10.0], [3.0, 30.0]]);
        let sample = BackgroundSample::from_rows(rows).unwrap();
        assert_eq!(sample.mean()[0], 2.0);
        assert_eq!(sample.mean()[1], 20.0);
    }

    #[test]
    fn test_seeded_draw_is_reproducible() {
        let matrix = Array2::from_shape_fn((40, 2), |(i, j)| (i + j) as f64);
        let a = BackgroundSample::draw(&matrix, 10, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = BackgroundSample::draw(&matrix, 10, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a.mean(), b.mean());
    }
}
