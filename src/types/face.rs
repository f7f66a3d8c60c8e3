//! Face (image) lookup by name.
//!
//! Rendering is outside this crate; all the model needs is whether a face
//! name resolves to something.

use std::collections::HashMap;

/// Opaque handle of a known face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceHandle(pub u32);

/// Resolves face names.
pub trait FaceLookup {
    fn face(&self, name: &str) -> Option<FaceHandle>;
}

/// In-memory face table.
#[derive(Debug, Clone, Default)]
pub struct FaceSet {
    faces: HashMap<String, FaceHandle>,
}

impl FaceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a face list.
    ///
    /// Each non-empty, non-comment line names one face. A leading number
    /// (`00042 wall.111`) is used as the handle, otherwise the line index is.
    pub fn parse(source: &str) -> Self {
        let mut set = Self::new();
        for (index, line) in source.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.split_whitespace();
            let (handle, name) = match (parts.next(), parts.next()) {
                (Some(num), Some(name)) => match num.parse::<u32>() {
                    Ok(n) => (n, name),
                    Err(_) => (index as u32, line),
                },
                (Some(name), None) => (index as u32, name),
                _ => continue,
            };
            set.insert(name, FaceHandle(handle));
        }
        set
    }

    pub fn insert(&mut self, name: impl Into<String>, handle: FaceHandle) {
        self.faces.insert(name.into(), handle);
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

impl FaceLookup for FaceSet {
    fn face(&self, name: &str) -> Option<FaceHandle> {
        self.faces.get(name).copied()
    }
}

impl<S: Into<String>> FromIterator<S> for FaceSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for (i, name) in iter.into_iter().enumerate() {
            set.insert(name, FaceHandle(i as u32));
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numbered_list() {
        let set = FaceSet::parse("# faces\n00001 wall.111\n00002 floor.111\n");
        assert_eq!(set.len(), 2);
        assert_eq!(set.face("wall.111"), Some(FaceHandle(1)));
        assert_eq!(set.face("door.111"), None);
    }

    #[test]
    fn test_parse_plain_names() {
        let set = FaceSet::parse("wall.111\n\nfloor.111\n");
        assert!(set.face("floor.111").is_some());
    }

    #[test]
    fn test_from_iterator() {
        let set: FaceSet = ["a.111", "b.111"].into_iter().collect();
        assert_eq!(set.face("b.111"), Some(FaceHandle(1)));
    }
}
