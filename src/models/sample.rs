//! Sample types for pd-gamma.
//!
//! A persistence diagram arrives as a text file of `<creation> <destruction>`
//! pairs. Loading is the only place samples are mutated; afterwards a
//! [`SampleSet`] is read-only.

use super::{EstimationError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

/// Which coordinate of a persistence pair is being estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    /// Birth value of a topological feature
    Creation,
    /// Death value of a topological feature
    Destruction,
}

impl Dimension {
    /// Both dimensions, in processing order.
    pub const ALL: [Dimension; 2] = [Dimension::Creation, Dimension::Destruction];
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Creation => write!(f, "creation"),
            Self::Destruction => write!(f, "destruction"),
        }
    }
}

/// One `(creation, destruction)` point of a persistence diagram.
///
/// Neither component is infinite. NaN is not infinite and passes through.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePair {
    pub creation: f64,
    pub destruction: f64,
}

impl SamplePair {
    pub fn new(creation: f64, destruction: f64) -> Self {
        Self {
            creation,
            destruction,
        }
    }

    /// Component for the given dimension.
    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Creation => self.creation,
            Dimension::Destruction => self.destruction,
        }
    }

    fn is_finite_pair(&self) -> bool {
        !self.creation.is_infinite() && !self.destruction.is_infinite()
    }
}

impl From<(f64, f64)> for SamplePair {
    fn from((creation, destruction): (f64, f64)) -> Self {
        Self::new(creation, destruction)
    }
}

/// Ordered, immutable collection of sample pairs in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleSet {
    pairs: Vec<SamplePair>,

    /// Number of input pairs dropped for containing an infinite component
    #[serde(default)]
    dropped: usize,
}

impl SampleSet {
    /// Build a sample set from pairs, dropping any with an infinite component.
    pub fn from_pairs<I, P>(pairs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<SamplePair>,
    {
        let mut set = Self::default();
        for pair in pairs {
            set.push(pair.into());
        }
        set
    }

    fn push(&mut self, pair: SamplePair) {
        if pair.is_finite_pair() {
            self.pairs.push(pair);
        } else {
            self.dropped += 1;
        }
    }

    /// Load samples from a persistence diagram file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| EstimationError::io("opening samples file", e))?;
        let set = Self::from_reader(BufReader::new(file))?;

        info!(
            path = %path.display(),
            count = set.len(),
            dropped = set.dropped(),
            "Loaded samples"
        );
        Ok(set)
    }

    /// Parse samples from an in-memory string.
    pub fn parse_str(input: &str) -> Result<Self> {
        Self::from_reader(input.as_bytes())
    }

    /// Parse samples from any buffered reader.
    ///
    /// Blank lines and lines starting with `#` are skipped. Every other line
    /// must hold exactly two floating-point tokens.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut set = Self::default();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| EstimationError::io("reading samples", e))?;
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let pair = parse_line(&line).map_err(|message| EstimationError::Parse {
                line: line_num + 1,
                message,
            })?;

            if !pair.is_finite_pair() {
                debug!(line = line_num + 1, "Dropping pair with infinite component");
            }
            set.push(pair);
        }

        Ok(set)
    }

    /// All retained pairs, in input order.
    pub fn pairs(&self) -> &[SamplePair] {
        &self.pairs
    }

    /// The first `n` pairs (or all of them, if there are fewer).
    pub fn head(&self, n: usize) -> &[SamplePair] {
        &self.pairs[..n.min(self.pairs.len())]
    }

    /// Projection of every pair onto one dimension.
    pub fn values(&self, dimension: Dimension) -> Vec<f64> {
        self.pairs.iter().map(|p| p.get(dimension)).collect()
    }

    pub fn creation(&self) -> Vec<f64> {
        self.values(Dimension::Creation)
    }

    pub fn destruction(&self) -> Vec<f64> {
        self.values(Dimension::Destruction)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Number of pairs dropped for containing an infinite component.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

fn parse_line(line: &str) -> std::result::Result<SamplePair, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != 2 {
        return Err(format!(
            "expected 2 whitespace-separated values, found {}",
            tokens.len()
        ));
    }

    let parse = |token: &str| {
        token
            .parse::<f64>()
            .map_err(|e| format!("invalid number '{token}': {e}"))
    };

    Ok(SamplePair::new(parse(tokens[0])?, parse(tokens[1])?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_skips_comments_blanks_and_infinite_pairs() {
        let set = SampleSet::parse_str("1.0 2.0\n# comment\n\ninf 5.0\n3.0 4.0\n").unwrap();

        assert_eq!(
            set.pairs(),
            &[SamplePair::new(1.0, 2.0), SamplePair::new(3.0, 4.0)]
        );
        assert_eq!(set.dropped(), 1);
    }

    #[test]
    fn test_negative_infinity_drops_whole_pair() {
        let set = SampleSet::parse_str("0.5 -inf\n0.25 0.75\n").unwrap();

        assert_eq!(set.len(), 1);
        assert_eq!(set.creation(), vec![0.25]);
        assert_eq!(set.destruction(), vec![0.75]);
    }

    #[test]
    fn test_nan_is_kept() {
        let set = SampleSet::parse_str("nan 1.0\n").unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.creation()[0].is_nan());
    }

    #[test]
    fn test_whitespace_only_line_is_blank() {
        let set = SampleSet::parse_str("   \t \n1e-3\t2.5E1\n").unwrap();
        assert_eq!(set.pairs(), &[SamplePair::new(0.001, 25.0)]);
    }

    #[test]
    fn test_wrong_token_count_is_fatal() {
        let err = SampleSet::parse_str("1.0 2.0\n1.0 2.0 3.0\n").unwrap_err();
        match err {
            EstimationError::Parse { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("found 3"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unparseable_token_is_fatal() {
        let err = SampleSet::parse_str("# header\n1.0 abc\n").unwrap_err();
        assert!(matches!(err, EstimationError::Parse { line: 2, .. }));
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_indented_hash_is_not_a_comment() {
        let err = SampleSet::parse_str("  # not a comment\n").unwrap_err();
        assert!(matches!(err, EstimationError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_head_caps_at_len() {
        let set = SampleSet::from_pairs([(1.0, 2.0), (3.0, 4.0), (5.0, 6.0)]);
        assert_eq!(set.head(2).len(), 2);
        assert_eq!(set.head(100).len(), 3);
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("diagram.txt");
        fs::write(&path, "# dim 0\n0.0 1.5\n0.5 inf\n0.2 0.9\n").unwrap();

        let set = SampleSet::load(&path).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.dropped(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = SampleSet::load(&temp_dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, EstimationError::Io { .. }));
    }

    #[test]
    fn test_dimension_display() {
        assert_eq!(Dimension::Creation.to_string(), "creation");
        assert_eq!(
            serde_json::to_string(&Dimension::Destruction).unwrap(),
            "\"destruction\""
        );
    }
}
