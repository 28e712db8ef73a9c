use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Init,
    Media,
}

impl SegmentKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SegmentKind::Init => "init",
            SegmentKind::Media => "media",
        }
    }
}

/// One fetchable segment, resolved against the manifest location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentDescriptor {
    pub url: Url,
    pub kind: SegmentKind,
    pub representation_id: String,
    /// Set for media segments only.
    pub sequence_number: Option<u64>,
}

impl SegmentDescriptor {
    #[must_use]
    pub fn is_init(&self) -> bool {
        self.kind == SegmentKind::Init
    }

    /// Request label used in the client identifier.
    #[must_use]
    pub fn label(&self) -> String {
        self.sequence_number.map_or_else(
            || format!("{}-{}", self.kind.as_str(), self.representation_id),
            |number| format!("{}-{}-{}", self.kind.as_str(), self.representation_id, number),
        )
    }
}
