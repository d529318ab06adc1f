//! Command execution against the session store and the navigator.

use anyhow::Context;
use serde_json::{Value, json};

use safecampus_auth::{NavigationError, Navigator, explain_access};
use safecampus_core::RoleKind;
use safecampus_session::{KeyValueStorage, SessionStore};

use crate::cli::Command;

/// One shell session: a restored session store plus a navigator.
#[derive(Debug)]
pub struct Shell<S> {
    store: SessionStore<S>,
    navigator: Navigator,
}

impl<S: KeyValueStorage> Shell<S> {
    pub fn new(store: SessionStore<S>, navigator: Navigator) -> Self {
        Self { store, navigator }
    }

    pub fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    /// Run one command and return its JSON output.
    ///
    /// `Help` has no JSON form and yields `Value::Null`.
    pub fn run(&mut self, command: Command) -> anyhow::Result<Value> {
        let output = match command {
            Command::Login(update) => {
                self.store.login(update);
                json!({ "session": self.store.session() })
            }
            Command::Logout => {
                self.store.logout();
                json!({ "session": self.store.session() })
            }
            Command::WhoAmI => self.whoami(),
            Command::Update(update) => {
                let updated = self.store.update_user_info(update);
                json!({ "updated": updated, "session": self.store.session() })
            }
            Command::Go(path) => {
                let navigation = self
                    .navigator
                    .push(&path, self.store.session())
                    .with_context(|| format!("navigation to '{path}' failed"))?;
                serde_json::to_value(&navigation)?
            }
            Command::Explain(path) => {
                let (record, _) = self
                    .navigator
                    .table()
                    .resolve(&path)
                    .ok_or_else(|| NavigationError::NoMatch(path.clone()))?;
                let explanation =
                    explain_access(record.name.as_ref(), &record.meta, self.store.session());
                json!({
                    "path": path,
                    "redirect": record.redirect,
                    "explanation": explanation,
                })
            }
            Command::Routes => serde_json::to_value(self.navigator.table())?,
            Command::Help => Value::Null,
        };

        Ok(output)
    }

    fn whoami(&self) -> Value {
        let role_kind: Option<RoleKind> = self.store.user_role().and_then(|r| r.kind());

        json!({
            "session": self.store.session(),
            "userRole": self.store.user_role(),
            "roleKind": role_kind,
            "isAdmin": self.store.is_admin(),
            "isTeacher": self.store.is_teacher(),
            "isParent": self.store.is_parent(),
        })
    }
}
