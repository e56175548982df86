//! xStream: streaming anomaly scoring with half-space chains
//! ----------------------------------------------------------------------------
//! Scores each incoming feature vector by how crowded its neighbourhood was in
//! the most recent complete window, in a single pass and bounded memory.
//! It implements:
//!   * `Chain`: a random sequence of half-space splits of growing resolution,
//!     with a frequency sketch of bins at every depth
//!   * `ChainEnsemble`: many independent chains whose scores are averaged
//!   * `WindowController`: periodic refresh of feature scales and of the
//!     reference sketches scores are read against
//!   * `XStream`: the above behind a `Projector`, driven one sample at a time
//!
//! # Design notes
//! Each chain keeps two sketch generations. The *working* sketch counts the
//! window being filled; the *reference* sketch is the last complete window and
//! is what scores are computed against. Every `window_size` fitted samples the
//! per-feature half-ranges are recomputed from that window, then working is
//! promoted to reference on all chains at once. Before the first window
//! completes, fits go to both generations so scoring has something to read.
//!
//! A chain's score is `-min_d [log2(1 + count_d) + d + 1]`: the point is judged
//! at the depth where it looks most normal, and larger means more anomalous.
//!
//! # Example
//! ```
//! use xstream::{StreamingDetector, XStream, XStreamConfig};
//!
//! let config = XStreamConfig::default()
//!     .with_chains(20)
//!     .with_depth(8)
//!     .with_window_size(50)
//!     .with_seed(42);
//! let mut model = XStream::new(config, 2)?;
//!
//! // Stream some normal points
//! for i in 0..500 {
//!     let x = [(i % 10) as f64 / 10.0, 0.5];
//!     model.fit_partial(&x)?;
//! }
//!
//! let normal = model.score_partial(&[0.3, 0.5])?;
//! let suspicious = model.score_partial(&[9.0, -4.0])?;
//! assert!(suspicious > normal);
//! # Ok::<(), xstream::XStreamError>(())
//! ```

pub mod chain;
pub mod config;
pub mod ensemble;
pub mod error;
pub mod model;
pub mod projection;
pub mod sketch;
pub mod window;

pub use chain::Chain;
pub use config::XStreamConfig;
pub use ensemble::ChainEnsemble;
pub use error::{Result, XStreamError};
pub use model::{StreamingDetector, XStream};
pub use projection::{IdentityProjector, Projector, StreamHashProjector};
pub use sketch::{BinKey, FrequencySketch, Generations, Phase};
pub use window::{WindowController, clamp_half_range, window_scale};
