use std::{fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{EngineFault, Shape};

/// Supplier of the shapes a session spawns.
///
/// This is the only nondeterministic input of the engine. Sessions take it
/// by injection so that tests and replays can fix the stream.
pub trait ShapeSource: fmt::Debug {
    fn next_shape(&mut self) -> Result<Shape, EngineFault>;
}

/// Seed for [`SeededShapeSource`].
///
/// A 128-bit value, serialized as a 32-character hex string. The same seed
/// always yields the same shape stream.
///
/// # Example
///
/// ```
/// use rand::Rng as _;
/// use stackfall_engine::{SeededShapeSource, ShapeSeed, ShapeSource as _};
///
/// let seed: ShapeSeed = rand::rng().random();
/// let mut a = SeededShapeSource::with_seed(seed);
/// let mut b = SeededShapeSource::with_seed(seed);
/// for _ in 0..10 {
///     assert_eq!(a.next_shape(), b.next_shape());
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeSeed([u8; 16]);

impl ShapeSeed {
    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        Self(value.to_be_bytes())
    }

    #[must_use]
    pub const fn as_u128(self) -> u128 {
        u128::from_be_bytes(self.0)
    }
}

impl fmt::Display for ShapeSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.as_u128())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid seed {input:?}: expected 32 hex characters")]
pub struct ParseSeedError {
    input: String,
}

impl FromStr for ShapeSeed {
    type Err = ParseSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSeedError {
            input: s.to_owned(),
        };
        if s.len() != 32 {
            return Err(err());
        }
        u128::from_str_radix(s, 16)
            .map(Self::from_u128)
            .map_err(|_| err())
    }
}

impl Serialize for ShapeSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ShapeSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

impl Distribution<ShapeSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ShapeSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        ShapeSeed(seed)
    }
}

/// Uniform random shapes from a seeded PCG generator.
#[derive(Debug, Clone)]
pub struct SeededShapeSource {
    seed: ShapeSeed,
    rng: Pcg32,
}

impl Default for SeededShapeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SeededShapeSource {
    /// Creates a source with a fresh random seed.
    ///
    /// Use [`Self::with_seed`] for a reproducible stream.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(seed: ShapeSeed) -> Self {
        Self {
            seed,
            rng: Pcg32::from_seed(seed.0),
        }
    }

    #[must_use]
    pub fn seed(&self) -> ShapeSeed {
        self.seed
    }
}

impl ShapeSource for SeededShapeSource {
    fn next_shape(&mut self) -> Result<Shape, EngineFault> {
        Ok(self.rng.random())
    }
}

/// Replays a fixed list of shape codes, cycling when it runs out.
///
/// Codes are the letters of [`Shape::as_char`]. A code that names no shape
/// is reported as [`EngineFault::UnknownShape`] when it is drawn.
#[derive(Debug, Clone)]
pub struct ScriptedShapeSource {
    codes: Vec<char>,
    cursor: usize,
}

impl ScriptedShapeSource {
    /// ```
    /// use stackfall_engine::{ScriptedShapeSource, Shape, ShapeSource as _};
    ///
    /// let mut source = ScriptedShapeSource::from_codes("IO");
    /// assert_eq!(source.next_shape(), Ok(Shape::I));
    /// assert_eq!(source.next_shape(), Ok(Shape::O));
    /// assert_eq!(source.next_shape(), Ok(Shape::I));
    /// ```
    #[must_use]
    pub fn from_codes(codes: &str) -> Self {
        Self {
            codes: codes.chars().filter(|c| !c.is_whitespace()).collect(),
            cursor: 0,
        }
    }

    #[must_use]
    pub fn from_shapes<I>(shapes: I) -> Self
    where
        I: IntoIterator<Item = Shape>,
    {
        Self {
            codes: shapes.into_iter().map(Shape::as_char).collect(),
            cursor: 0,
        }
    }
}

impl ShapeSource for ScriptedShapeSource {
    fn next_shape(&mut self) -> Result<Shape, EngineFault> {
        if self.codes.is_empty() {
            return Err(EngineFault::SourceExhausted);
        }
        let code = self.codes[self.cursor % self.codes.len()];
        self.cursor += 1;
        Shape::from_char(code).ok_or(EngineFault::UnknownShape { code })
    }
}
