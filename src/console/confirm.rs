// Delete confirmation - nothing is deleted until the dialog is confirmed

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmState<Id> {
    Closed,
    Pending { target: Id },
    Deleting { target: Id },
}

#[derive(Debug, Clone)]
pub struct DeleteConfirmation<Id> {
    state: ConfirmState<Id>,
    title: String,
    description: String,
}

impl<Id: Clone + PartialEq> DeleteConfirmation<Id> {
    /// `label` is the lowercase record name, e.g. `"country"`.
    pub fn new(title: &str, label: &str) -> Self {
        Self {
            state: ConfirmState::Closed,
            title: title.to_string(),
            description: format!(
                "Are you sure you want to delete this {}? This action cannot be undone.",
                label
            ),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn state(&self) -> &ConfirmState<Id> {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, ConfirmState::Closed)
    }

    pub fn is_deleting(&self) -> bool {
        matches!(self.state, ConfirmState::Deleting { .. })
    }

    pub fn target(&self) -> Option<&Id> {
        match &self.state {
            ConfirmState::Closed => None,
            ConfirmState::Pending { target } | ConfirmState::Deleting { target } => Some(target),
        }
    }

    pub fn confirm_label(&self) -> &'static str {
        if self.is_deleting() {
            "Deleting..."
        } else {
            "Delete"
        }
    }

    /// Open the dialog for `target`. Ignored while a delete is in flight.
    pub fn request(&mut self, target: Id) -> bool {
        if self.is_deleting() {
            return false;
        }
        self.state = ConfirmState::Pending { target };
        true
    }

    /// Cancel or backdrop click. Never deletes.
    pub fn dismiss(&mut self) -> bool {
        match self.state {
            ConfirmState::Pending { .. } => {
                self.state = ConfirmState::Closed;
                true
            }
            _ => false,
        }
    }

    /// Hand out the target to delete, exactly once per request.
    pub fn confirm(&mut self) -> Option<Id> {
        match &self.state {
            ConfirmState::Pending { target } => {
                let target = target.clone();
                self.state = ConfirmState::Deleting {
                    target: target.clone(),
                };
                Some(target)
            }
            _ => None,
        }
    }

    /// Close after a successful delete; keep the dialog open after a failure.
    pub fn finish(&mut self, success: bool) {
        if let ConfirmState::Deleting { target } = &self.state {
            self.state = if success {
                ConfirmState::Closed
            } else {
                ConfirmState::Pending {
                    target: target.clone(),
                }
            };
        }
    }
}
