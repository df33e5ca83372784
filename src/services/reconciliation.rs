// src/services/reconciliation.rs
//
// Find-or-create for bulk imports of named lookup entries.

use std::collections::HashMap;

use log::debug;

use crate::domain::NamedEntry;
use crate::error::{AppError, AppResult};

/// Attach ids to `entries` by name.
///
/// Entries whose name is already stored take the stored id and are not
/// inserted again. The rest are inserted with a single `save_many` call; a
/// name repeated inside the batch is inserted once and every occurrence gets
/// the same id. Output order matches input order.
pub(crate) fn reconcile_by_name<T, F, S>(
    mut entries: Vec<T>,
    find_id_by_name: F,
    save_many: S,
) -> AppResult<Vec<T>>
where
    T: NamedEntry,
    F: Fn(&str) -> AppResult<Option<i64>>,
    S: FnOnce(&[T]) -> AppResult<Vec<T>>,
{
    let mut fresh: Vec<T> = Vec::new();
    let mut fresh_slots: HashMap<String, usize> = HashMap::new();
    // (index into entries, index into fresh)
    let mut pending: Vec<(usize, usize)> = Vec::new();

    for (index, entry) in entries.iter_mut().enumerate() {
        if let Some(id) = find_id_by_name(entry.name())? {
            entry.set_id(id);
            continue;
        }

        let slot = match fresh_slots.get(entry.name()) {
            Some(&slot) => slot,
            None => {
                fresh.push(entry.clone());
                fresh_slots.insert(entry.name().to_string(), fresh.len() - 1);
                fresh.len() - 1
            }
        };
        pending.push((index, slot));
    }

    let existing = entries.len() - pending.len();

    if !fresh.is_empty() {
        let saved = save_many(&fresh)?;
        for (index, slot) in pending {
            let id = saved.get(slot).map(|entry| entry.id()).ok_or_else(|| {
                AppError::Other(format!(
                    "Bulk insert returned {} rows for {} new entries",
                    saved.len(),
                    fresh.len()
                ))
            })?;
            entries[index].set_id(id);
        }
    }

    debug!(
        "Reconciled {} entries: {} already stored, {} inserted",
        entries.len(),
        existing,
        fresh.len()
    );

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Genre;
    use std::cell::RefCell;

    #[test]
    fn test_existing_names_are_not_inserted() {
        let inserted = RefCell::new(Vec::new());

        let result = reconcile_by_name(
            vec![Genre::new("Comedy"), Genre::new("Drama")],
            |name| Ok(if name == "Comedy" { Some(7) } else { None }),
            |fresh: &[Genre]| {
                inserted.borrow_mut().extend(fresh.iter().map(|g| g.name.clone()));
                Ok(fresh
                    .iter()
                    .enumerate()
                    .map(|(i, g)| Genre { id: 100 + i as i64, name: g.name.clone() })
                    .collect())
            },
        )
        .unwrap();

        assert_eq!(*inserted.borrow(), vec!["Drama".to_string()]);
        assert_eq!(result[0], Genre { id: 7, name: "Comedy".to_string() });
        assert_eq!(result[1], Genre { id: 100, name: "Drama".to_string() });
    }

    #[test]
    fn test_repeated_name_in_batch_inserted_once() {
        let result = reconcile_by_name(
            vec![Genre::new("Drama"), Genre::new("Action"), Genre::new("Drama")],
            |_| Ok(None),
            |fresh: &[Genre]| {
                assert_eq!(fresh.len(), 2);
                Ok(vec![
                    Genre { id: 1, name: "Drama".to_string() },
                    Genre { id: 2, name: "Action".to_string() },
                ])
            },
        )
        .unwrap();

        let ids: Vec<i64> = result.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![1, 2, 1]);
    }

    #[test]
    fn test_short_insert_result_is_an_error() {
        let result = reconcile_by_name(
            vec![Genre::new("Drama"), Genre::new("Action")],
            |_| Ok(None),
            |_: &[Genre]| Ok(vec![Genre { id: 1, name: "Drama".to_string() }]),
        );

        assert!(matches!(result, Err(AppError::Other(_))));
    }

    #[test]
    fn test_all_existing_skips_insert() {
        let result = reconcile_by_name(
            vec![Genre::new("Drama")],
            |_| Ok(Some(3)),
            |_: &[Genre]| -> AppResult<Vec<Genre>> { panic!("nothing should be inserted") },
        )
        .unwrap();

        assert_eq!(result[0].id, 3);
    }
}
