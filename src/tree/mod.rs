//! Task forests: building, flattening, drag projection and drop commit.
//!
//! Everything here is a pure function of the flat task collection. Callers
//! rebuild the views after each change instead of keeping them in sync.

pub mod build;
pub mod commit;
pub mod descendants;
pub mod flatten;
pub mod projection;

pub use build::{TreeNode, build_tree, build_tree_with};
pub use commit::{DropCommit, DropOutcome, DropRejection, Reparent, commit_drop};
pub use descendants::{descendant_ids, is_descendant};
pub use flatten::{FlattenedItem, TaskTree, flatten_tree, visible_items};
pub use projection::{DragState, Projection, get_projection};
