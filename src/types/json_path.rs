use crate::{ENCODED_BACKSLASH, ENCODED_TILDE, PATH_SEPARATOR, TILDE};
use std::fmt::{Display, Formatter};

/// Location of a node inside the document, kept as escaped JSON Pointer segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonPath(pub Vec<String>);

impl JsonPath {
    pub fn new() -> Self {
        JsonPath(Vec::new())
    }

    /// Appends a raw segment, escaping `~` and `/`.
    pub fn add(&mut self, segment: impl AsRef<str>) -> &mut Self {
        let segment = segment.as_ref();
        if segment.contains(TILDE) || segment.contains(PATH_SEPARATOR) {
            let segment = segment
                .replace(TILDE, ENCODED_TILDE)
                .replace(PATH_SEPARATOR, ENCODED_BACKSLASH);
            self.0.push(segment);
        } else {
            self.0.push(segment.to_owned());
        }

        self
    }

    /// Returns a copy of this path with `segments` appended.
    pub fn join<I, S>(&self, segments: I) -> JsonPath
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut path = self.clone();
        for segment in segments {
            path.add(segment);
        }
        path
    }

    pub fn format_path(&self) -> String {
        self.0.join(PATH_SEPARATOR)
    }

    /// The path as a JSON Pointer usable with [`serde_json::Value::pointer`].
    pub fn to_pointer(&self) -> String {
        if self.0.is_empty() {
            return String::new();
        }
        format!("{}{}", PATH_SEPARATOR, self.format_path())
    }
}

impl Display for JsonPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.to_pointer())
    }
}
