//! Drag-and-drop reconciliation shared by the daily roster and the events board.
//!
//! A board is a list of containers, each holding an ordered list of item ids.
//! Ids of containers and items share one namespace: a drop "over" a container id
//! means the item was released on the empty area of that container.

use serde::Serialize;

#[derive(Debug, Clone, Copy)]
pub struct Container<'a> {
    pub id: &'a str,
    pub items: &'a [String],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DropPlan {
    #[serde(rename_all = "camelCase")]
    Reorder {
        container: String,
        items: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    Transfer {
        source: String,
        source_items: Vec<String>,
        target: String,
        target_items: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropRejection {
    NoTarget,
    UnresolvedSource,
    UnresolvedTarget,
    ItemNotFound,
    TargetFull,
}

impl DropRejection {
    pub fn as_str(self) -> &'static str {
        match self {
            DropRejection::NoTarget => "no_target",
            DropRejection::UnresolvedSource => "unresolved_source",
            DropRejection::UnresolvedTarget => "unresolved_target",
            DropRejection::ItemNotFound => "item_not_found",
            DropRejection::TargetFull => "target_full",
        }
    }
}

/// The item picked up by the last drag start, if any.
#[derive(Debug, Default)]
pub struct DragSession {
    active: Option<String>,
}

impl DragSession {
    pub fn start(&mut self, item_id: impl Into<String>) {
        self.active = Some(item_id.into());
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn finish(&mut self) -> Option<String> {
        self.active.take()
    }
}

pub fn find_container<'a>(containers: &[Container<'a>], item_id: &str) -> Option<&'a str> {
    if let Some(c) = containers.iter().find(|c| c.id == item_id) {
        return Some(c.id);
    }
    containers
        .iter()
        .find(|c| c.items.iter().any(|i| i == item_id))
        .map(|c| c.id)
}

pub fn array_move<T: Clone>(items: &[T], from: usize, to: usize) -> Vec<T> {
    let mut out = items.to_vec();
    if from >= out.len() {
        return out;
    }
    let moved = out.remove(from);
    let to = to.min(out.len());
    out.insert(to, moved);
    out
}

fn items_of<'a>(containers: &[Container<'a>], id: &str) -> &'a [String] {
    containers
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.items)
        .unwrap_or(&[])
}

/// Computes the lists that result from dropping `active_id` over `over_id`.
///
/// `capacity` bounds the target of a cross-container move; a reorder within one
/// container never changes its length so it is not checked.
pub fn plan_drop(
    containers: &[Container<'_>],
    active_id: &str,
    over_id: Option<&str>,
    capacity: Option<usize>,
) -> Result<DropPlan, DropRejection> {
    let over_id = over_id.ok_or(DropRejection::NoTarget)?;
    let source = find_container(containers, active_id).ok_or(DropRejection::UnresolvedSource)?;
    let target = find_container(containers, over_id).ok_or(DropRejection::UnresolvedTarget)?;
    if source == target {
        let items = items_of(containers, source);
        let old_index = items
            .iter()
            .position(|i| i == active_id)
            .ok_or(DropRejection::ItemNotFound)?;
        let new_index = if over_id == target {
            items.len().saturating_sub(1)
        } else {
            items
                .iter()
                .position(|i| i == over_id)
                .ok_or(DropRejection::ItemNotFound)?
        };
        return Ok(DropPlan::Reorder {
            container: source.to_string(),
            items: array_move(items, old_index, new_index),
        });
    }

    let mut source_items = items_of(containers, source).to_vec();
    let mut target_items: Vec<String> = items_of(containers, target)
        .iter()
        .filter(|i| i.as_str() != active_id)
        .cloned()
        .collect();
    if let Some(cap) = capacity {
        if target_items.len() >= cap {
            return Err(DropRejection::TargetFull);
        }
    }

    let active_index = source_items
        .iter()
        .position(|i| i == active_id)
        .ok_or(DropRejection::ItemNotFound)?;
    source_items.remove(active_index);

    let insertion = if over_id == target {
        target_items.len()
    } else {
        target_items
            .iter()
            .position(|i| i == over_id)
            .unwrap_or(target_items.len())
    };
    target_items.insert(insertion, active_id.to_string());

    Ok(DropPlan::Transfer {
        source: source.to_string(),
        source_items,
        target: target.to_string(),
        target_items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn board<'a>(cols: &'a [(&'a str, Vec<String>)]) -> Vec<Container<'a>> {
        cols.iter()
            .map(|(id, items)| Container {
                id: *id,
                items: items.as_slice(),
            })
            .collect()
    }

    #[test]
    fn array_move_shifts_neighbours() {
        let v = ids(&["a", "b", "c", "d"]);
        assert_eq!(array_move(&v, 0, 2), ids(&["b", "c", "a", "d"]));
        assert_eq!(array_move(&v, 3, 0), ids(&["d", "a", "b", "c"]));
        assert_eq!(array_move(&v, 1, 1), v);
    }

    #[test]
    fn container_resolution_prefers_container_ids() {
        let cols = vec![("x", ids(&["a"])), ("y", ids(&["b"]))];
        let b = board(&cols);
        assert_eq!(find_container(&b, "y"), Some("y"));
        assert_eq!(find_container(&b, "a"), Some("x"));
        assert_eq!(find_container(&b, "zzz"), None);
    }

    #[test]
    fn reorder_within_container() {
        let cols = vec![("x", ids(&["a", "b", "c"]))];
        let b = board(&cols);
        let plan = plan_drop(&b, "a", Some("c"), Some(12)).unwrap();
        assert_eq!(
            plan,
            DropPlan::Reorder {
                container: "x".into(),
                items: ids(&["b", "c", "a"])
            }
        );
        // Dropping on the container itself moves to the end.
        let plan = plan_drop(&b, "b", Some("x"), Some(12)).unwrap();
        assert_eq!(
            plan,
            DropPlan::Reorder {
                container: "x".into(),
                items: ids(&["a", "c", "b"])
            }
        );
    }

    #[test]
    fn transfer_inserts_at_over_item_or_appends() {
        let cols = vec![("x", ids(&["a", "b"])), ("y", ids(&["c", "d"]))];
        let b = board(&cols);
        let plan = plan_drop(&b, "a", Some("d"), Some(12)).unwrap();
        assert_eq!(
            plan,
            DropPlan::Transfer {
                source: "x".into(),
                source_items: ids(&["b"]),
                target: "y".into(),
                target_items: ids(&["c", "a", "d"]),
            }
        );
        let plan = plan_drop(&b, "a", Some("y"), Some(12)).unwrap();
        match plan {
            DropPlan::Transfer { target_items, .. } => {
                assert_eq!(target_items, ids(&["c", "d", "a"]))
            }
            other => panic!("unexpected plan {other:?}"),
        }
    }

    #[test]
    fn full_target_rejects_transfer() {
        let full: Vec<String> = (0..12).map(|i| format!("s{i}")).collect();
        let cols = vec![("x", ids(&["a"])), ("y", full)];
        let b = board(&cols);
        assert_eq!(
            plan_drop(&b, "a", Some("y"), Some(12)),
            Err(DropRejection::TargetFull)
        );
        // Without a capacity the same drop goes through.
        assert!(plan_drop(&b, "a", Some("y"), None).is_ok());
    }

    #[test]
    fn unresolvable_drops_are_rejected() {
        let cols = vec![("x", ids(&["a"]))];
        let b = board(&cols);
        assert_eq!(plan_drop(&b, "a", None, None), Err(DropRejection::NoTarget));
        assert_eq!(
            plan_drop(&b, "ghost", Some("x"), None),
            Err(DropRejection::UnresolvedSource)
        );
        assert_eq!(
            plan_drop(&b, "a", Some("nowhere"), None),
            Err(DropRejection::UnresolvedTarget)
        );
    }

    #[test]
    fn drag_session_is_cleared_on_finish() {
        let mut s = DragSession::default();
        s.start("stu-1");
        assert_eq!(s.active(), Some("stu-1"));
        assert_eq!(s.finish().as_deref(), Some("stu-1"));
        assert_eq!(s.active(), None);
    }
}
