//! DASH manifest resolution: segment descriptors, URL templates and the
//! MPD parser.
mod manifest;
mod resolver;
mod template;
mod types;


pub use manifest::{DASH_NAMESPACE, MAX_SEGMENTS_PER_REPRESENTATION, parse_manifest};
pub use resolver::ManifestResolver;
pub use template::render_segment_template;
pub use types::{SegmentDescriptor, SegmentKind};
