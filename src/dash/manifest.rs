use roxmltree::{Document, Node};
use url::Url;

use super::template::render_segment_template;
use super::types::{SegmentDescriptor, SegmentKind};
use crate::error::ManifestError;

pub const DASH_NAMESPACE: &str = "urn:mpeg:dash:schema:mpd:2011";
/// Upper bound on expanded segments for one representation.
pub const MAX_SEGMENTS_PER_REPRESENTATION: u64 = 65_536;

const DEFAULT_START_NUMBER: u64 = 1;
const UNKNOWN_REPRESENTATION: &str = "unknown";

/// Parses an MPD document into init and media descriptors.
///
/// Adaptation sets, representations and timeline entries keep document
/// order. Segment URLs are resolved against `manifest_url`.
///
/// # Errors
///
/// Returns an error when the body is not well-formed XML, the root is not a
/// DASH `MPD`, a numeric attribute is invalid, or a timeline is too long.
pub fn parse_manifest(
    body: &str,
    manifest_url: &Url,
) -> Result<Vec<SegmentDescriptor>, ManifestError> {
    let document = Document::parse(body).map_err(|err| ManifestError::Xml { source: err })?;
    let root = document.root_element();
    if !is_dash_element(root, "MPD") {
        let tag = root.tag_name();
        let found = tag.namespace().map_or_else(
            || tag.name().to_owned(),
            |namespace| format!("{{{}}}{}", namespace, tag.name()),
        );
        return Err(ManifestError::UnexpectedRoot {
            expected: DASH_NAMESPACE,
            found,
        });
    }

    let mut segments = Vec::new();
    for adaptation_set in root
        .descendants()
        .filter(|node| is_dash_element(*node, "AdaptationSet"))
    {
        let shared_template = dash_child(adaptation_set, "SegmentTemplate");
        for representation in dash_children(adaptation_set, "Representation") {
            let representation_id = representation
                .attribute("id")
                .unwrap_or(UNKNOWN_REPRESENTATION);
            let template = dash_child(representation, "SegmentTemplate").or(shared_template);
            if let Some(template) = template {
                expand_template(template, representation_id, manifest_url, &mut segments)?;
            }
        }
    }
    Ok(segments)
}

fn expand_template(
    template: Node<'_, '_>,
    representation_id: &str,
    manifest_url: &Url,
    segments: &mut Vec<SegmentDescriptor>,
) -> Result<(), ManifestError> {
    if let Some(initialization) = template.attribute("initialization") {
        let relative = render_segment_template(initialization, representation_id, None);
        segments.push(SegmentDescriptor {
            url: resolve(manifest_url, &relative)?,
            kind: SegmentKind::Init,
            representation_id: representation_id.to_owned(),
            sequence_number: None,
        });
    }

    let Some(timeline) = dash_child(template, "SegmentTimeline") else {
        return Ok(());
    };
    let media = template.attribute("media");
    let mut number = template
        .attribute("startNumber")
        .map_or(Ok(DEFAULT_START_NUMBER), |value| {
            parse_u64("startNumber", value)
        })?;
    let mut expanded: u64 = 0;

    for entry in dash_children(timeline, "S") {
        let occurrences = entry.attribute("r").map_or(Ok(1), repeat_occurrences)?;
        expanded = expanded.saturating_add(occurrences);
        if expanded > MAX_SEGMENTS_PER_REPRESENTATION {
            return Err(ManifestError::TimelineTooLong {
                representation: representation_id.to_owned(),
                limit: MAX_SEGMENTS_PER_REPRESENTATION,
            });
        }
        for _ in 0..occurrences {
            if let Some(media) = media {
                let relative = render_segment_template(media, representation_id, Some(number));
                segments.push(SegmentDescriptor {
                    url: resolve(manifest_url, &relative)?,
                    kind: SegmentKind::Media,
                    representation_id: representation_id.to_owned(),
                    sequence_number: Some(number),
                });
            }
            number = number.saturating_add(1);
        }
    }
    Ok(())
}

/// `r` repeats of an entry mean `r + 1` segments. Negative counts
/// (open-ended repeat) yield the entry once.
fn repeat_occurrences(value: &str) -> Result<u64, ManifestError> {
    let repeat = value
        .trim()
        .parse::<i64>()
        .map_err(|err| ManifestError::InvalidNumber {
            attribute: "r",
            value: value.to_owned(),
            source: err,
        })?;
    Ok(u64::try_from(repeat).map_or(1, |repeat| repeat.saturating_add(1)))
}

fn parse_u64(attribute: &'static str, value: &str) -> Result<u64, ManifestError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|err| ManifestError::InvalidNumber {
            attribute,
            value: value.to_owned(),
            source: err,
        })
}

fn resolve(manifest_url: &Url, relative: &str) -> Result<Url, ManifestError> {
    manifest_url
        .join(relative)
        .map_err(|err| ManifestError::SegmentUrl {
            url: relative.to_owned(),
            source: err,
        })
}

fn is_dash_element(node: Node<'_, '_>, name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == name
        && node.tag_name().namespace() == Some(DASH_NAMESPACE)
}

fn dash_children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |child| is_dash_element(*child, name))
}

fn dash_child<'a, 'input: 'a>(node: Node<'a, 'input>, name: &'a str) -> Option<Node<'a, 'input>> {
    dash_children(node, name).next()
}
