//! Source storage for a compilation session.
//!
//! Grammar and transform-override texts live side by side; each entry records
//! which language it is written in.

/// Lightweight handle to a source in a compilation session.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, PartialOrd, Ord)]
pub struct SourceId(pub(crate) u32);

/// Describes the origin of a source.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SourceKind {
    /// Text passed directly (CLI `-g` argument, tests).
    OneLiner,
    /// Input read from stdin.
    Stdin,
    /// A file with its path.
    File(String),
}

impl SourceKind {
    /// Returns the display name for diagnostics.
    pub fn display_name(&self) -> &str {
        match self {
            SourceKind::OneLiner => "<grammar>",
            SourceKind::Stdin => "<stdin>",
            SourceKind::File(path) => path,
        }
    }
}

/// Language a source is written in.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SourceLanguage {
    Grammar,
    Transform,
}

/// A borrowed view of a source.
#[derive(Clone, Debug)]
pub struct Source<'s> {
    pub id: SourceId,
    pub kind: &'s SourceKind,
    pub language: SourceLanguage,
    pub content: &'s str,
}

impl<'s> Source<'s> {
    pub fn as_str(&self) -> &'s str {
        self.content
    }
}

#[derive(Clone, Debug)]
struct SourceEntry {
    kind: SourceKind,
    language: SourceLanguage,
    content: String,
}

/// Registry of all sources.
#[derive(Clone, Debug, Default)]
pub struct SourceMap {
    entries: Vec<SourceEntry>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add grammar text passed directly.
    pub fn add_one_liner(&mut self, content: &str) -> SourceId {
        self.push_entry(SourceKind::OneLiner, SourceLanguage::Grammar, content)
    }

    /// Add grammar text read from stdin.
    pub fn add_stdin(&mut self, content: &str) -> SourceId {
        self.push_entry(SourceKind::Stdin, SourceLanguage::Grammar, content)
    }

    /// Add a grammar file with its path.
    pub fn add_file(&mut self, path: &str, content: &str) -> SourceId {
        self.push_entry(
            SourceKind::File(path.to_owned()),
            SourceLanguage::Grammar,
            content,
        )
    }

    /// Add transform-override text passed directly.
    pub fn add_transform_one_liner(&mut self, content: &str) -> SourceId {
        self.push_entry(SourceKind::OneLiner, SourceLanguage::Transform, content)
    }

    /// Add a transform-override file with its path.
    pub fn add_transform_file(&mut self, path: &str, content: &str) -> SourceId {
        self.push_entry(
            SourceKind::File(path.to_owned()),
            SourceLanguage::Transform,
            content,
        )
    }

    /// Create a SourceMap with a single grammar one-liner.
    pub fn one_liner(content: &str) -> Self {
        let mut map = Self::new();
        map.add_one_liner(content);
        map
    }

    pub fn content(&self, id: SourceId) -> &str {
        self.entry(id).content.as_str()
    }

    pub fn kind(&self, id: SourceId) -> &SourceKind {
        &self.entry(id).kind
    }

    pub fn language(&self, id: SourceId) -> SourceLanguage {
        self.entry(id).language
    }

    /// Get the file path if this source is a file, None otherwise.
    pub fn path(&self, id: SourceId) -> Option<&str> {
        match &self.entry(id).kind {
            SourceKind::File(path) => Some(path),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: SourceId) -> Source<'_> {
        let entry = self.entry(id);
        Source {
            id,
            kind: &entry.kind,
            language: entry.language,
            content: &entry.content,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Source<'_>> {
        self.entries.iter().enumerate().map(|(idx, entry)| Source {
            id: SourceId(idx as u32),
            kind: &entry.kind,
            language: entry.language,
            content: &entry.content,
        })
    }

    fn entry(&self, id: SourceId) -> &SourceEntry {
        self.entries.get(id.0 as usize).expect("invalid SourceId")
    }

    fn push_entry(&mut self, kind: SourceKind, language: SourceLanguage, content: &str) -> SourceId {
        let id = SourceId(self.entries.len() as u32);
        self.entries.push(SourceEntry {
            kind,
            language,
            content: content.to_owned(),
        });
        id
    }
}
