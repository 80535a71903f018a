//! Per-contributor undo/redo policy.
//!
//! A contributor's history is the list of strokes they created, in order, each
//! flagged active or not. Nothing is ever popped: undo clears the flag of the
//! newest active entry, redo sets the flag of the oldest inactive entry sitting
//! directly above an active one. Once a new stroke lands on top of undone ones,
//! those undone strokes can no longer be reached by redo.

/// Index of the entry `undo` should deactivate, if any.
pub fn undo_target<T>(entries: &[T], is_active: impl Fn(&T) -> bool) -> Option<usize> {
    entries.iter().rposition(is_active)
}

/// Index of the entry `redo` should reactivate, if any.
pub fn redo_target<T>(entries: &[T], is_active: impl Fn(&T) -> bool) -> Option<usize> {
    match entries.len() {
        0 => None,
        1 => (!is_active(&entries[0])).then_some(0),
        len => {
            for i in (1..len).rev() {
                if is_active(&entries[i]) {
                    return None;
                }
                if is_active(&entries[i - 1]) {
                    return Some(i);
                }
            }
            Some(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn undo(flags: &[bool]) -> Option<usize> {
        undo_target(flags, |a| *a)
    }

    fn redo(flags: &[bool]) -> Option<usize> {
        redo_target(flags, |a| *a)
    }

    #[test]
    fn test_undo_empty() {
        assert_eq!(undo(&[]), None);
        assert_eq!(undo(&[false, false]), None);
    }

    #[test]
    fn test_undo_takes_newest_active() {
        assert_eq!(undo(&[true, true, true]), Some(2));
        assert_eq!(undo(&[true, true, false]), Some(1));
        assert_eq!(undo(&[false, true, false]), Some(1));
    }

    #[test]
    fn test_redo_single_entry() {
        assert_eq!(redo(&[false]), Some(0));
        assert_eq!(redo(&[true]), None);
    }

    #[test]
    fn test_redo_top_active_is_noop() {
        assert_eq!(redo(&[true, true]), None);
        assert_eq!(redo(&[false, true]), None);
    }

    #[test]
    fn test_redo_finds_boundary() {
        assert_eq!(redo(&[true, false, false]), Some(1));
        assert_eq!(redo(&[true, true, false]), Some(2));
    }

    #[test]
    fn test_redo_all_inactive_restores_first() {
        assert_eq!(redo(&[false, false, false]), Some(0));
    }

    #[test]
    fn test_undo_then_redo_is_inverse() {
        let mut flags = vec![true, true, false];
        let before = flags.clone();
        let i = undo(&flags).unwrap();
        flags[i] = false;
        let j = redo(&flags).unwrap();
        flags[j] = true;
        assert_eq!(flags, before);
    }
}
