//src/types.rs

use ndarray::Array2;

/// A numeric time series, one k-mer id per window position.
pub type Series = Vec<u32>;

/// A square Gramian Angular Field. Dimension equals the series length.
pub type Image = Array2<f64>;

/// A minimal representation of a FASTA read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Read {
    pub id: String,
    pub header_line: String,
    /// Sequence bytes, newlines removed.
    pub seq: Vec<u8>,
}

impl Read {
    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }
}
