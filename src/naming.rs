//! Identifier forms derived from wire names.

/// Segment delimiter in wire names.
const DELIMITER: char = '_';

/// Declaration and serialized names for one wire name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNames {
    /// Every segment capitalized: `access_level` -> `AccessLevel`.
    pub declaration: String,
    /// Non-leading segments capitalized: `access_level` -> `accessLevel`.
    pub serialized: String,
}

impl FieldNames {
    /// Derive both identifier forms from a wire name.
    ///
    /// Empty segments (from `__` or a leading/trailing `_`) are dropped.
    /// Returns `None` for an empty name or one made only of delimiters
    /// (caller should error).
    pub fn from_wire(wire_name: &str) -> Option<Self> {
        let segments: Vec<&str> = wire_name
            .split(DELIMITER)
            .filter(|s| !s.is_empty())
            .collect();
        let (first, rest) = segments.split_first()?;

        let declaration = segments.iter().map(|s| capitalize(s)).collect();

        let mut serialized = (*first).to_string();
        for segment in rest {
            serialized.push_str(&capitalize(segment));
        }

        Some(Self {
            declaration,
            serialized,
        })
    }
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
