//! Native image operations behind the vision forms

pub mod color;
pub mod contours;
pub mod threshold;

pub use color::{convert_color, ColorConversion};
pub use contours::{annotate_contours, find_external_contours, AnnotatedFrame};
pub use threshold::{threshold_range, ChannelRange};
