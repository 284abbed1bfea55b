use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum DatasetError {
    #[error("Spectrum '{tag}' has {x_len} x samples but {y_len} y samples")]
    AxisLength {
        tag: String,
        x_len: usize,
        y_len: usize,
    },

    #[error("Parallel collections disagree: {tags} tags, {x_arrays} x arrays, {y_arrays} y arrays")]
    ParallelLength {
        tags: usize,
        x_arrays: usize,
        y_arrays: usize,
    },
}

/// A single measured region: a survey scan or one core line.
///
/// The energy axis is kept exactly as it was loaded. It is monotonic within the
/// spectrum but may run in either direction; nothing in the engine resorts it.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    tag: String,
    x: Vec<f64>,
    y: Vec<f64>,
}

impl Spectrum {
    /// Creates a spectrum, checking that both axes carry the same number of samples.
    ///
    /// # Arguments
    ///
    /// * `tag` - Short label of the region (e.g. `"C1s"`).
    /// * `x` - Energy axis samples.
    /// * `y` - Intensity samples, index-aligned with `x`.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::AxisLength`] when `x.len() != y.len()`.
    pub fn new(tag: impl Into<String>, x: Vec<f64>, y: Vec<f64>) -> Result<Self, DatasetError> {
        let tag = tag.into();
        if x.len() != y.len() {
            return Err(DatasetError::AxisLength {
                tag,
                x_len: x.len(),
                y_len: y.len(),
            });
        }
        Ok(Self { tag, x, y })
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// An ordered collection of spectra.
///
/// Insertion order is load order, which is also display and analysis order. Tags and
/// both axes live together in one [`Spectrum`] per index, so the three parallel views
/// exposed by [`Dataset::tags`], [`Dataset::x_arrays`] and [`Dataset::y_arrays`] can
/// never drift out of alignment. A dataset is immutable once built; corrections
/// produce a new dataset through [`Dataset::with_axes`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    spectra: Vec<Spectrum>,
}

impl Dataset {
    pub fn new(spectra: Vec<Spectrum>) -> Self {
        Self { spectra }
    }

    /// Builds a dataset from three parallel collections, as returned by a loader.
    ///
    /// # Arguments
    ///
    /// * `tags` - One label per spectrum.
    /// * `x` - One energy axis per spectrum.
    /// * `y` - One intensity array per spectrum.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::ParallelLength`] if the three collections differ in
    /// length, or [`DatasetError::AxisLength`] if any single spectrum is ragged.
    pub fn from_parallel(
        tags: Vec<String>,
        x: Vec<Vec<f64>>,
        y: Vec<Vec<f64>>,
    ) -> Result<Self, DatasetError> {
        if tags.len() != x.len() || tags.len() != y.len() {
            return Err(DatasetError::ParallelLength {
                tags: tags.len(),
                x_arrays: x.len(),
                y_arrays: y.len(),
            });
        }

        let spectra = tags
            .into_iter()
            .zip(x)
            .zip(y)
            .map(|((tag, x), y)| Spectrum::new(tag, x, y))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { spectra })
    }

    /// Returns a new dataset with every spectrum's axes replaced, keeping tag order.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::ParallelLength`] unless exactly one `x` and one `y`
    /// array is supplied per existing spectrum.
    pub fn with_axes(&self, x: Vec<Vec<f64>>, y: Vec<Vec<f64>>) -> Result<Self, DatasetError> {
        let tags = self.spectra.iter().map(|s| s.tag.clone()).collect();
        Self::from_parallel(tags, x, y)
    }

    pub fn len(&self) -> usize {
        self.spectra.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spectra.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Spectrum> {
        self.spectra.get(index)
    }

    pub fn spectra(&self) -> &[Spectrum] {
        &self.spectra
    }

    pub fn iter(&self) -> impl Iterator<Item = &Spectrum> {
        self.spectra.iter()
    }

    pub fn tags(&self) -> Vec<&str> {
        self.spectra.iter().map(Spectrum::tag).collect()
    }

    pub fn x_arrays(&self) -> Vec<&[f64]> {
        self.spectra.iter().map(Spectrum::x).collect()
    }

    pub fn y_arrays(&self) -> Vec<&[f64]> {
        self.spectra.iter().map(Spectrum::y).collect()
    }
}
