//! Filter parameter persistence
//!
//! Both filters save their user-editable parameters as JSON. Derived data
//! (caches, output field of view, radius floor) is never stored; it is
//! rebuilt after loading.
//!
//! Applying a loaded state always goes through the filter's setters, so
//! out-of-range values written by hand are clamped or ignored the same way
//! as interactive edits.

use crate::FilterResult;
use crate::keyframe::{CornerKeyframes, SparseCorners};
use crate::perspective::{PerspectiveRectifier, QuadSide};
use crate::radial::{RadialDistortionCorrector, RadialParams};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Saved corners of a [`PerspectiveRectifier`]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PerspectiveState {
    /// Input keyframes, frame -> `[[x, y]; 4]`
    pub in_corners: SparseCorners,
    /// Output keyframes, frame -> `[[x, y]; 4]`
    pub out_corners: SparseCorners,
    #[serde(default)]
    pub fixed_in: bool,
    #[serde(default = "default_fixed_out")]
    pub fixed_out: bool,
}

fn default_fixed_out() -> bool {
    true
}

/// Saved parameters of a [`RadialDistortionCorrector`].
///
/// Projection types are stored by name so that unknown names in a
/// hand-edited file are skipped instead of failing the whole load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadialState {
    pub fixed_radius: f64,
    /// Source field of view, radians
    pub input_fov: f64,
    pub input_type: String,
    pub output_type: String,
}

impl Default for RadialState {
    fn default() -> Self {
        Self::from(&RadialParams::default())
    }
}

impl From<&RadialParams> for RadialState {
    fn from(params: &RadialParams) -> Self {
        Self {
            fixed_radius: params.fixed_radius,
            input_fov: params.source_fov,
            input_type: params.source_projection.to_string(),
            output_type: params.output_projection.to_string(),
        }
    }
}

macro_rules! json_io {
    ($ty:ty) => {
        impl $ty {
            /// Deserialize from a JSON reader
            pub fn read_from_reader<R: Read>(reader: R) -> FilterResult<Self> {
                Ok(serde_json::from_reader(reader)?)
            }

            /// Deserialize from JSON bytes
            pub fn read_from_bytes(data: &[u8]) -> FilterResult<Self> {
                Ok(serde_json::from_slice(data)?)
            }

            /// Deserialize from a JSON file
            pub fn read_from_file<P: AsRef<Path>>(path: P) -> FilterResult<Self> {
                let file = File::open(path)?;
                Self::read_from_reader(BufReader::new(file))
            }

            /// Serialize as pretty-printed JSON
            pub fn write_to_writer<W: Write>(&self, writer: W) -> FilterResult<()> {
                serde_json::to_writer_pretty(writer, self)?;
                Ok(())
            }

            /// Serialize to JSON bytes
            pub fn write_to_bytes(&self) -> FilterResult<Vec<u8>> {
                Ok(serde_json::to_vec_pretty(self)?)
            }

            /// Serialize to a JSON file
            pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> FilterResult<()> {
                let mut writer = BufWriter::new(File::create(path)?);
                self.write_to_writer(&mut writer)?;
                writer.flush()?;
                Ok(())
            }
        }
    };
}

json_io!(PerspectiveState);
json_io!(RadialState);

impl PerspectiveRectifier {
    /// Snapshot both corner stores
    pub fn state(&self) -> PerspectiveState {
        let input = self.keyframes(QuadSide::Input);
        let output = self.keyframes(QuadSide::Output);
        PerspectiveState {
            in_corners: input.to_sparse(),
            out_corners: output.to_sparse(),
            fixed_in: input.is_fixed(),
            fixed_out: output.is_fixed(),
        }
    }

    /// Replace both corner stores with a saved state
    pub fn apply_state(&mut self, state: &PerspectiveState) {
        self.set_keyframes(
            CornerKeyframes::from_sparse(&state.in_corners, state.fixed_in),
            CornerKeyframes::from_sparse(&state.out_corners, state.fixed_out),
        );
    }
}

impl RadialDistortionCorrector {
    /// Snapshot the current parameters
    pub fn state(&self) -> RadialState {
        RadialState::from(self.params())
    }

    /// Apply a saved state through the setters.
    ///
    /// Unknown projection names keep the current projection.
    pub fn apply_state(&mut self, state: &RadialState) {
        self.set_source_fov(state.input_fov);
        self.set_source_projection_name(&state.input_type);
        self.set_output_projection_name(&state.output_type);
        self.set_fixed_radius(state.fixed_radius);
    }
}
