//! Text capture. Scopes an export to what the user selected inside the preview.
//!
//! Selection access is abstracted behind [`SelectionProvider`] so the host surface
//! (browser bridge, terminal, test double) supplies the actual selection state.

use thiserror::Error;
use tracing::debug;

/// Opaque identifier for a node in the host document tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

/// Handle to the bounded, scrollable preview region that selections are checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionHandle {
    pub node: NodeId,
}

/// Snapshot of the host's current text selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub text: String,
    pub range_count: usize,
    /// Common ancestor node of the first selection range.
    pub common_ancestor: NodeId,
}

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("selection API unavailable")]
    Unavailable,

    #[error("selection query failed: {0}")]
    Query(String),
}

pub trait SelectionProvider: Send + Sync {
    /// The current selection, or `None` when nothing is selected.
    fn selection(&self) -> Result<Option<Selection>, SelectionError>;

    /// Whether `node` is `container` itself or one of its descendants.
    fn contains(&self, container: &RegionHandle, node: NodeId) -> Result<bool, SelectionError>;
}

/// Resolves the selection text on pointer-release inside the preview.
///
/// Returns the trimmed selection when its common ancestor lies inside `container`,
/// and an empty string in every other case, including provider errors.
pub fn capture_selection(
    provider: &dyn SelectionProvider,
    container: Option<&RegionHandle>,
) -> String {
    match try_capture(provider, container) {
        Ok(text) => text,
        Err(e) => {
            debug!("Selection capture failed, treating as no selection: {e}");
            String::new()
        }
    }
}

fn try_capture(
    provider: &dyn SelectionProvider,
    container: Option<&RegionHandle>,
) -> Result<String, SelectionError> {
    let selection = match provider.selection()? {
        Some(sel) if sel.range_count > 0 => sel,
        _ => return Ok(String::new()),
    };

    let Some(container) = container else {
        return Ok(String::new());
    };

    if provider.contains(container, selection.common_ancestor)? {
        Ok(selection.text.trim().to_string())
    } else {
        Ok(String::new())
    }
}
