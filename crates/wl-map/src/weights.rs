use wl_core::error::CoreError;
use wl_core::layout::linspace;

/// Normalized exponential-decay weights of every LED against every microphone
/// of one wall.
///
/// `weight(m, k) = exp(-|led[m] - mic[k]|) / Σ_k exp(-|led[m] - mic[k]|)`.
/// Built once, read-only afterwards.
///
/// # Example
/// ```
/// use wl_map::weights::SpatialWeightTable;
/// let table = SpatialWeightTable::new(&[0.0, 5.0], &[0.0, 10.0]).unwrap();
/// let row = table.row(1);
/// assert!((row[0] - 0.5).abs() < 1e-12);
/// assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-12);
/// ```
#[derive(Clone, Debug)]
pub struct SpatialWeightTable {
    /// Row-major M×K weights.
    weights: Vec<f64>,
    emitter_count: usize,
    mic_count: usize,
}

impl SpatialWeightTable {
    /// Builds the table for arbitrary LED and microphone coordinates.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidConfiguration`] if either list is empty,
    /// contains a non-finite coordinate, or if an LED lies so far from every
    /// microphone that its row sum underflows to zero.
    pub fn new(emitters: &[f64], mics: &[f64]) -> Result<Self, CoreError> {
        if emitters.is_empty() {
            return Err(CoreError::config("at least one LED position is required"));
        }
        if mics.is_empty() {
            return Err(CoreError::config("at least one microphone position is required"));
        }
        if let Some(x) = mics.iter().find(|x| !x.is_finite()) {
            return Err(CoreError::config(format!("microphone position {x} is not finite")));
        }
        if let Some(x) = emitters.iter().find(|x| !x.is_finite()) {
            return Err(CoreError::config(format!("LED position {x} is not finite")));
        }

        let mut weights = Vec::with_capacity(emitters.len() * mics.len());
        for (m, &led) in emitters.iter().enumerate() {
            let start = weights.len();
            weights.extend(mics.iter().map(|&mic| (-(led - mic).abs()).exp()));
            let row = &mut weights[start..];
            let sum: f64 = row.iter().sum();
            if sum <= 0.0 || !sum.is_finite() {
                return Err(CoreError::config(format!(
                    "LED {m} at {led} has no reachable microphone"
                )));
            }
            for w in row.iter_mut() {
                *w /= sum;
            }
        }

        Ok(Self {
            weights,
            emitter_count: emitters.len(),
            mic_count: mics.len(),
        })
    }

    /// Builds the table for a strip of `led_count` LEDs spread evenly over
    /// the span of the microphones, first to last.
    ///
    /// # Errors
    /// Same conditions as [`SpatialWeightTable::new`].
    ///
    /// # Example
    /// ```
    /// use wl_map::weights::SpatialWeightTable;
    /// let table = SpatialWeightTable::for_strip(&[0.0, 2.5, 5.0, 7.5, 10.0], 100).unwrap();
    /// assert_eq!(table.emitter_count(), 100);
    /// // The last LED sits on the last microphone.
    /// assert!(table.row(99)[4] > table.row(99)[3]);
    /// ```
    pub fn for_strip(mics: &[f64], led_count: usize) -> Result<Self, CoreError> {
        if mics.is_empty() {
            return Err(CoreError::config("at least one microphone position is required"));
        }
        let lo = mics.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = mics.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self::new(&linspace(lo, hi, led_count), mics)
    }

    /// Weights of LED `m`, one per microphone, summing to 1.
    ///
    /// # Panics
    /// Panics if `m >= emitter_count()`.
    #[inline]
    #[must_use]
    pub fn row(&self, m: usize) -> &[f64] {
        &self.weights[m * self.mic_count..(m + 1) * self.mic_count]
    }

    /// Weighted average of `values` (one per microphone) for LED `m`.
    #[inline]
    #[must_use]
    pub fn weighted_sum(&self, m: usize, values: &[f64]) -> f64 {
        debug_assert_eq!(values.len(), self.mic_count, "one value per microphone");
        self.row(m).iter().zip(values).map(|(w, v)| w * v).sum()
    }

    /// Number of LEDs (M).
    #[must_use]
    pub fn emitter_count(&self) -> usize {
        self.emitter_count
    }

    /// Number of microphones (K).
    #[must_use]
    pub fn mic_count(&self) -> usize {
        self.mic_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> SpatialWeightTable {
        match SpatialWeightTable::for_strip(&linspace(0.0, 10.0, 5), 100) {
            Ok(t) => t,
            Err(e) => panic!("reference layout rejected: {e}"),
        }
    }

    #[test]
    fn every_row_sums_to_one() {
        let table = reference();
        for m in 0..table.emitter_count() {
            let sum: f64 = table.row(m).iter().sum();
            assert!((sum - 1.0).abs() < 1e-9, "row {m} sums to {sum}");
        }
    }

    #[test]
    fn irregular_layout_rows_sum_to_one() -> Result<(), CoreError> {
        let table = SpatialWeightTable::new(&[-3.0, 0.1, 2.2, 40.0], &[0.0, 0.3, 7.0])?;
        for m in 0..table.emitter_count() {
            assert!((table.row(m).iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
        Ok(())
    }

    #[test]
    fn coincident_microphone_dominates() {
        let table = reference();
        // LED 0 sits on microphone 0, LED 99 on microphone 4.
        let first = table.row(0);
        assert!(first[0] > 0.5);
        assert!(first.iter().skip(1).all(|&w| w < first[0]));
        let last = table.row(99);
        assert!(last[4] > last[3]);
    }

    #[test]
    fn weights_decay_with_distance() -> Result<(), CoreError> {
        let table = SpatialWeightTable::new(&[0.0], &[0.0, 1.0, 2.0, 3.0])?;
        let row = table.row(0);
        assert!(row.windows(2).all(|w| w[0] > w[1]));
        assert!((row[0] / row[1] - std::f64::consts::E).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn weighted_sum_of_constant_is_constant() {
        let table = reference();
        let values = [200.0; 5];
        for m in [0, 17, 50, 99] {
            assert!((table.weighted_sum(m, &values) - 200.0).abs() < 1e-9);
        }
    }

    #[test]
    fn non_finite_positions_are_rejected() {
        assert!(SpatialWeightTable::new(&[0.0], &[0.0, f64::NAN]).is_err());
        assert!(SpatialWeightTable::new(&[f64::INFINITY], &[0.0]).is_err());
        assert!(SpatialWeightTable::for_strip(&[0.0, f64::INFINITY], 10).is_err());
    }

    #[test]
    fn unreachable_led_is_rejected() {
        assert!(SpatialWeightTable::new(&[1.0e4], &[0.0]).is_err());
    }

    #[test]
    fn empty_inputs_are_rejected() {
        assert!(SpatialWeightTable::new(&[], &[0.0]).is_err());
        assert!(SpatialWeightTable::for_strip(&[], 10).is_err());
        assert!(SpatialWeightTable::for_strip(&[0.0, 1.0], 0).is_err());
    }
}
