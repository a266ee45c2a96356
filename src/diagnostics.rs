use std::fmt;

/// Category of a recoverable loading problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A non-zero gid did not resolve to any tile; the cell stays empty.
    UnresolvedGid,
    /// An enum attribute held an unknown value; the default was kept.
    UnknownEnum,
    /// An element the loader does not understand was skipped.
    UnknownElement,
    /// A tileset declared a second `<image>`; the first one wins.
    DuplicateImage,
    /// A property used an unknown `type`; it was read as a string.
    UnknownPropertyType,
    /// A template tile object has no matching tileset in the map.
    MissingTemplateTile,
}

/// A recoverable problem found while loading or placing tiles.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// What kind of problem this is.
    pub kind: DiagnosticKind,
    /// Human readable details.
    pub message: String,
}

impl Diagnostic {
    /// Builds a diagnostic.
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// Receives recoverable problems so loading can carry on with a safe default.
pub trait Diagnostics {
    /// Records one problem.
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Forwards every diagnostic to `log::warn!`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        log::warn!(target: "macroquad_tmx", "{}", diagnostic);
    }
}

impl Diagnostics for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

impl<D: Diagnostics + ?Sized> Diagnostics for &mut D {
    fn report(&mut self, diagnostic: Diagnostic) {
        (**self).report(diagnostic);
    }
}

impl<D: Diagnostics + ?Sized> Diagnostics for Box<D> {
    fn report(&mut self, diagnostic: Diagnostic) {
        (**self).report(diagnostic);
    }
}
