use serde::Serialize;

use super::flatten::FlattenedItem;

/// Where the dragged row would land if it were dropped now
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub depth: usize,
    pub parent_id: Option<String>,
}

/// Project the drop position of `active_id` while it hovers over `over_id`.
///
/// Horizontal drag distance changes the depth by whole indent steps, clamped
/// so the row nests at most one level below the hovered row and never
/// shallower than the row that follows it. Returns the default projection
/// (depth 0, no parent) when either row is not in `items`.
///
/// Runs on every pointer move, so it is a linear scan with no allocation
/// beyond the filtered row list.
pub fn get_projection(
    items: &[FlattenedItem],
    active_id: &str,
    over_id: &str,
    drag_offset_x: f64,
    indent_width: f64,
) -> Projection {
    let Some(active) = items.iter().find(|i| i.id == active_id) else {
        return Projection::default();
    };

    let without_active: Vec<&FlattenedItem> = items.iter().filter(|i| i.id != active_id).collect();
    let Some(over_index) = without_active.iter().position(|i| i.id == over_id) else {
        return Projection::default();
    };

    let previous = without_active[over_index];
    let next = without_active.get(over_index + 1);

    let max_depth = previous.depth as i64 + 1;
    let min_depth = next.map_or(0, |n| n.depth as i64);

    let projected = (active.depth as i64).saturating_add(indent_steps(drag_offset_x, indent_width));
    let depth = projected.max(min_depth).min(max_depth).max(0) as usize;

    let parent_id = if depth == 0 {
        None
    } else {
        without_active[..=over_index]
            .iter()
            .rev()
            .find(|i| i.depth == depth - 1)
            .map(|i| i.id.clone())
    };

    Projection { depth, parent_id }
}

/// Whole indent levels covered by a horizontal offset; halves round towards
/// positive infinity so a drag of exactly half a step to the left stays put.
fn indent_steps(offset: f64, indent_width: f64) -> i64 {
    if indent_width.is_nan() || indent_width <= 0.0 || !offset.is_finite() {
        return 0;
    }
    (offset / indent_width + 0.5).floor() as i64
}

/// Ephemeral state of one drag gesture. Created on drag start, consumed on
/// drop or cancel.
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub active_id: String,
    pub over_id: Option<String>,
    pub offset_x: f64,
}

impl DragState {
    pub fn start(active_id: impl Into<String>) -> Self {
        DragState {
            active_id: active_id.into(),
            over_id: None,
            offset_x: 0.0,
        }
    }

    /// Pointer moved; `offset_x` is the total horizontal delta since start
    pub fn move_to(&mut self, offset_x: f64) {
        self.offset_x = offset_x;
    }

    /// Pointer entered a row. Leaving every row keeps the last hover target.
    pub fn hover(&mut self, over_id: impl Into<String>) {
        self.over_id = Some(over_id.into());
    }

    /// Live projection for the renderer, `None` until something is hovered
    pub fn projection(&self, items: &[FlattenedItem], indent_width: f64) -> Option<Projection> {
        let over = self.over_id.as_deref()?;
        Some(get_projection(
            items,
            &self.active_id,
            over,
            self.offset_x,
            indent_width,
        ))
    }

    /// Depth to draw a row at: the projected depth for the dragged row, the
    /// row's own depth otherwise
    pub fn display_depth(&self, item: &FlattenedItem, items: &[FlattenedItem], indent_width: f64) -> usize {
        if item.id != self.active_id {
            return item.depth;
        }
        self.projection(items, indent_width)
            .map_or(item.depth, |p| p.depth)
    }

    /// Abandon the gesture without touching any data
    pub fn cancel(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{TaskNode, TaskType};
    use crate::tree::build::build_tree;
    use crate::tree::flatten::flatten_tree;

    const INDENT: f64 = 24.0;

    fn task(id: &str, parent: Option<&str>, sort_order: i64) -> TaskNode {
        TaskNode::new(id, "g", parent.map(String::from), TaskType::Pre, sort_order, id)
    }

    /// A(1) > B(2), C(3)
    fn scenario() -> Vec<FlattenedItem> {
        let tasks = vec![
            task("1", None, 0),
            task("2", Some("1"), 0),
            task("3", None, 1),
        ];
        flatten_tree(&build_tree(&tasks, "g", TaskType::Pre))
    }

    /// 1 > (2 > 3), 4
    fn deep() -> Vec<FlattenedItem> {
        let tasks = vec![
            task("1", None, 0),
            task("2", Some("1"), 0),
            task("3", Some("2"), 0),
            task("4", None, 1),
        ];
        flatten_tree(&build_tree(&tasks, "g", TaskType::Pre))
    }

    #[test]
    fn no_offset_keeps_root_depth() {
        let items = scenario();
        let p = get_projection(&items, "3", "2", 0.0, INDENT);
        assert_eq!(p, Projection { depth: 0, parent_id: None });
    }

    #[test]
    fn one_indent_right_nests_under_hovered_parent() {
        let items = scenario();
        let p = get_projection(&items, "3", "2", INDENT, INDENT);
        assert_eq!(p, Projection { depth: 1, parent_id: Some("1".into()) });
    }

    #[test]
    fn depth_is_capped_one_below_hovered_row() {
        let items = scenario();
        let p = get_projection(&items, "3", "2", INDENT * 10.0, INDENT);
        assert_eq!(p, Projection { depth: 2, parent_id: Some("2".into()) });
    }

    #[test]
    fn next_row_sets_minimum_depth() {
        let items = deep();
        // 4 hovering over 2: next row is 3 at depth 2
        let p = get_projection(&items, "4", "2", -INDENT * 5.0, INDENT);
        assert_eq!(p, Projection { depth: 2, parent_id: Some("2".into()) });
    }

    #[test]
    fn dragging_left_outdents() {
        let items = deep();
        let p = get_projection(&items, "3", "2", -INDENT * 2.0, INDENT);
        assert_eq!(p, Projection { depth: 0, parent_id: None });
    }

    #[test]
    fn offsets_round_to_nearest_level() {
        let items = scenario();
        assert_eq!(get_projection(&items, "3", "2", 11.0, INDENT).depth, 0);
        assert_eq!(get_projection(&items, "3", "2", 12.0, INDENT).depth, 1);
        assert_eq!(get_projection(&items, "3", "2", 35.0, INDENT).depth, 1);
        assert_eq!(get_projection(&items, "3", "2", 36.0, INDENT).depth, 2);
    }

    #[test]
    fn unknown_rows_give_default() {
        let items = scenario();
        assert_eq!(get_projection(&items, "3", "missing", 0.0, INDENT), Projection::default());
        assert_eq!(get_projection(&items, "missing", "2", 0.0, INDENT), Projection::default());
        // hovering over itself: it is removed from the candidate list first
        assert_eq!(get_projection(&items, "3", "3", 0.0, INDENT), Projection::default());
    }

    #[test]
    fn zero_indent_width_never_changes_depth() {
        let items = scenario();
        let p = get_projection(&items, "2", "1", 500.0, 0.0);
        assert_eq!(p, Projection { depth: 1, parent_id: Some("1".into()) });
    }

    #[test]
    fn drag_state_tracks_gesture() {
        let items = scenario();
        let mut drag = DragState::start("3");
        assert_eq!(drag.projection(&items, INDENT), None);

        drag.hover("2");
        drag.move_to(30.0);
        assert_eq!(
            drag.projection(&items, INDENT),
            Some(Projection { depth: 1, parent_id: Some("1".into()) })
        );
        assert_eq!(drag.display_depth(&items[2], &items, INDENT), 1);
        assert_eq!(drag.display_depth(&items[1], &items, INDENT), 1);
        assert_eq!(drag.display_depth(&items[0], &items, INDENT), 0);
        drag.cancel();
    }

    #[test]
    fn huge_offsets_clamp_instead_of_wrapping() {
        let items = scenario();
        assert_eq!(
            get_projection(&items, "3", "2", 1e300, INDENT),
            Projection { depth: 2, parent_id: Some("2".into()) }
        );
        assert_eq!(
            get_projection(&items, "3", "2", f64::MAX, INDENT),
            Projection { depth: 2, parent_id: Some("2".into()) }
        );
        assert_eq!(
            get_projection(&items, "3", "2", -1e300, INDENT),
            Projection { depth: 0, parent_id: None }
        );
    }
}
