use crate::{ResultEngine, Storage, util::normalize_required_text};

use super::{Ledger, Receipt};

impl<S: Storage> Ledger<S> {
    pub fn set_show_cc_dashboard_section(&mut self, show: bool) -> ResultEngine<Receipt<()>> {
        self.with_tx("set_show_cc_dashboard_section", |draft| {
            draft.doc.settings.show_cc_dashboard_section = show;
            Ok(())
        })
    }

    pub fn set_theme(&mut self, theme: &str) -> ResultEngine<Receipt<()>> {
        self.with_tx("set_theme", |draft| {
            draft.doc.settings.theme = normalize_required_text(theme, "theme")?;
            Ok(())
        })
    }
}
