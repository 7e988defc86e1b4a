// src/services/render.rs

//! Notification content rendering.
//!
//! Produces the French subject line and HTML digest for one subscriber's
//! filtered change set. Authority transitions are phrased from the
//! derived transition kind, never from stored state.

use crate::models::{ChangeEntry, ChangeSet, ModifiedEntry, TransitionKind};

/// Build the subject line for a filtered change set.
pub fn subject(prefix: &str, changes: &ChangeSet) -> String {
    format!(
        "{} {} ajout(s), {} modification(s), {} suppression(s)",
        prefix,
        changes.added.len(),
        changes.modified.len(),
        changes.removed.len()
    )
}

/// Build the HTML digest body for a filtered change set.
pub fn body(recipient_name: &str, changes: &ChangeSet) -> String {
    let mut html = String::new();

    let greeting = if recipient_name.is_empty() {
        "Bonjour,".to_string()
    } else {
        format!("Bonjour {recipient_name},")
    };
    html.push_str(&format!("<p>{greeting}</p>"));
    html.push_str(&format!(
        "<p>Du changement dans le registre des cantines au {} :</p>",
        changes.generated_at.format("%d/%m/%Y")
    ));

    if !changes.added.is_empty() {
        html.push_str("<h3>Établissements ajoutés</h3><ul>");
        for entry in &changes.added {
            html.push_str(&format!("<li>{}</li>", describe_entry(entry)));
        }
        html.push_str("</ul>");
    }

    if !changes.modified.is_empty() {
        html.push_str("<h3>Établissements modifiés</h3><ul>");
        for entry in &changes.modified {
            html.push_str(&format!("<li>{}", describe_record(entry)));
            if let Some(transition) = describe_transition(entry) {
                html.push_str(&format!("<br/><strong>{transition}</strong>"));
            }
            html.push_str("<ul>");
            for change in &entry.changes {
                html.push_str(&format!(
                    "<li>{} : {} → {}</li>",
                    change.label,
                    value_or_dash(&change.old),
                    value_or_dash(&change.new)
                ));
            }
            html.push_str("</ul></li>");
        }
        html.push_str("</ul>");
    }

    if !changes.removed.is_empty() {
        html.push_str("<h3>Établissements supprimés</h3><ul>");
        for entry in &changes.removed {
            html.push_str(&format!("<li>{}</li>", describe_entry(entry)));
        }
        html.push_str("</ul>");
    }

    html
}

fn describe_entry(entry: &ChangeEntry) -> String {
    let name = value_or_dash(&entry.record.text("name"));
    let city = entry.record.text("city");
    let authority = &entry.supervising_authority;

    let mut parts = vec![name];
    if !city.is_empty() {
        parts.push(city);
    }
    if !authority.is_empty() {
        parts.push(format!("tutelle : {authority}"));
    }
    parts.join(" — ")
}

fn describe_record(entry: &ModifiedEntry) -> String {
    let name = value_or_dash(&entry.record.text("name"));
    let city = entry.record.text("city");
    if city.is_empty() {
        name
    } else {
        format!("{name} — {city}")
    }
}

/// Phrase the supervising-authority transition, if there is one.
fn describe_transition(entry: &ModifiedEntry) -> Option<String> {
    match entry.authority_transition()? {
        TransitionKind::Attachment => Some(format!(
            "Rattachement au ministère « {} »",
            entry.supervising_authority
        )),
        TransitionKind::Detachment => Some(format!(
            "Détachement du ministère « {} »",
            entry.previous_authority
        )),
        TransitionKind::Transfer => Some(format!(
            "Transfert du ministère « {} » vers « {} »",
            entry.previous_authority, entry.supervising_authority
        )),
    }
}

fn value_or_dash(value: &str) -> String {
    if value.is_empty() {
        "∅".to_string()
    } else {
        value.to_string()
    }
}
