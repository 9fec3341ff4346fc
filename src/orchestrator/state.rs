//! View state owned by one orchestrator.

use crate::config::{EntityConfig, FormState, Record, RecordId, SelectOption};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Create,
    Edit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageState {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

impl PageState {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            total: 0,
        }
    }

    /// `ceil(total / page_size)`, or 1 for an empty list.
    pub fn total_pages(&self) -> u32 {
        if self.total == 0 {
            return 1;
        }
        let size = u64::from(self.page_size.max(1));
        let pages = self.total.div_ceil(size);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn contains(&self, page: u32) -> bool {
        page >= 1 && page <= self.total_pages()
    }
}

/// Everything a renderer needs, cloned out of the orchestrator.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub items: Vec<Record>,
    pub form: FormState,
    pub mode: Mode,
    pub editing_id: Option<RecordId>,
    pub saving: bool,
    /// Ids with a delete request in flight.
    pub deleting: HashSet<RecordId>,
    #[serde(flatten)]
    pub page: PageState,
    /// Last loaded options per select field key.
    pub options: HashMap<String, Vec<SelectOption>>,
}

impl ViewState {
    pub fn new(config: &EntityConfig, page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            form: config.blank_form(),
            mode: Mode::Create,
            editing_id: None,
            saving: false,
            deleting: HashSet::new(),
            page: PageState::new(page_size),
            options: HashMap::new(),
        }
    }

    /// Back to an empty create form, dropping in-flight markers.
    pub(crate) fn reset_form(&mut self, config: &EntityConfig) {
        self.mode = Mode::Create;
        self.editing_id = None;
        self.form = config.blank_form();
        self.saving = false;
        self.deleting.clear();
    }

    pub(crate) fn reset_list(&mut self) {
        self.items.clear();
        self.page.total = 0;
        self.page.page = 1;
    }

    pub fn total_pages(&self) -> u32 {
        self.page.total_pages()
    }
}
