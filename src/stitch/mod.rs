mod simplify;
mod stitcher;

pub use simplify::{path_length_m, segment_speeds, simplify, Segment, SpeedBand};
pub use stitcher::{midpoint, stitch, MAX_JUMP_PER_HOUR_M, MAX_SPEED_MS};
