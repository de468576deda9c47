use crate::{
    EngineError, ResultEngine, Storage,
    categories::{find_category, is_other, sort_categories},
    util::{name_key, normalize_required_text},
};

use super::{Ledger, Receipt};

impl<S: Storage> Ledger<S> {
    /// Adds a category. Names are unique ignoring case.
    pub fn add_category(&mut self, name: &str) -> ResultEngine<Receipt<String>> {
        self.with_tx("add_category", |draft| {
            let name = normalize_required_text(name, "category")?;
            if let Some(existing) = find_category(&draft.doc.categories, &name) {
                return Err(EngineError::Validation(format!(
                    "category {existing} already exists"
                )));
            }
            draft.doc.categories.push(name.clone());
            sort_categories(&mut draft.doc.categories);
            Ok(name)
        })
    }

    /// Renames a category and re-points every transaction using it.
    ///
    /// Returns the number of transactions updated.
    pub fn rename_category(&mut self, old: &str, new: &str) -> ResultEngine<Receipt<usize>> {
        self.with_tx("rename_category", |draft| {
            let old = find_category(&draft.doc.categories, old)
                .map(ToString::to_string)
                .ok_or_else(|| EngineError::NotFound(format!("category {old}")))?;
            if is_other(&old) {
                return Err(EngineError::Validation(
                    "the Other category cannot be renamed".to_string(),
                ));
            }
            let new = normalize_required_text(new, "category")?;
            let new_key = name_key(&new);
            let collides = draft
                .doc
                .categories
                .iter()
                .any(|category| *category != old && name_key(category) == new_key);
            if collides {
                return Err(EngineError::Validation(format!(
                    "category {new} already exists"
                )));
            }

            for category in draft.doc.categories.iter_mut().filter(|c| **c == old) {
                *category = new.clone();
            }
            sort_categories(&mut draft.doc.categories);

            let mut moved = 0;
            for tx in &mut draft.doc.transactions {
                if tx.category.as_deref() == Some(old.as_str()) {
                    tx.category = Some(new.clone());
                    moved += 1;
                }
            }
            Ok(moved)
        })
    }

    /// Deletes an unused category. "Other" cannot be deleted.
    pub fn delete_category(&mut self, name: &str) -> ResultEngine<Receipt<()>> {
        self.with_tx("delete_category", |draft| {
            if is_other(name) {
                return Err(EngineError::Validation(
                    "the Other category cannot be deleted".to_string(),
                ));
            }
            let existing = find_category(&draft.doc.categories, name)
                .map(ToString::to_string)
                .ok_or_else(|| EngineError::NotFound(format!("category {name}")))?;

            let key = name_key(&existing);
            let used = draft
                .doc
                .transactions
                .iter()
                .filter(|tx| tx.category.as_deref().is_some_and(|c| name_key(c) == key))
                .count();
            if used > 0 {
                return Err(EngineError::Validation(format!(
                    "category {existing} is used by {used} transactions"
                )));
            }

            draft.doc.categories.retain(|category| *category != existing);
            Ok(())
        })
    }
}
