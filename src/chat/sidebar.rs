// src/chat/sidebar.rs
//! Session list: titles, the current selection, and the two sidebar actions.

use super::store::SessionStore;
use crate::models::chat::SessionId;
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarEntry {
    pub id: SessionId,
    pub title: String,
    pub selected: bool,
}

pub fn entries(store: &SessionStore) -> Vec<SidebarEntry> {
    let selected = store.selected_id();
    store
        .sessions()
        .iter()
        .map(|session| SidebarEntry {
            id: session.id.clone(),
            title: session.title.clone(),
            selected: selected == Some(&session.id),
        })
        .collect()
}

pub fn select_session(store: &mut SessionStore, id: &SessionId) -> bool {
    store.select(id)
}

pub fn create_session(store: &mut SessionStore) -> SessionId {
    store.create_session().id.clone()
}

pub fn render(store: &SessionStore) -> String {
    let mut out = String::from("+ New Chat\n");
    for (index, entry) in entries(store).iter().enumerate() {
        let marker = if entry.selected { '>' } else { ' ' };
        let _ = writeln!(out, "{} {}. {}", marker, index + 1, entry.title);
    }
    out
}
