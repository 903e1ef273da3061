//! Core trait definitions shared across piqtree crates.

/// A type that carries annotations (names, descriptions, metadata).
pub trait Annotated {
    /// A short identifier, e.g. the IQ-TREE token for a model.
    fn name(&self) -> &str;

    /// An optional description.
    fn description(&self) -> Option<&str> {
        None
    }
}

/// A type that can produce a summary of its contents.
pub trait Summarizable {
    /// A one-line summary suitable for display.
    fn summary(&self) -> String;
}
