//! Contact-name-to-id resolution (spec §4.4 "Contact resolution").

use std::collections::BTreeSet;

use mnemograph_core::ids::ContactId;

/// A row of the caller-supplied contacts snapshot.
#[derive(Debug, Clone)]
pub struct ContactRecord {
    pub id: ContactId,
    pub name: String,
}

/// A caller-provided `label -> contact_id` mapping for names the entry text
/// uses that don't match any snapshot record verbatim (nicknames, initials).
#[derive(Debug, Clone)]
pub struct ExplicitMention {
    pub label: String,
    pub contact_id: ContactId,
}

fn first_token(s: &str) -> &str {
    s.split_whitespace().next().unwrap_or(s)
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Resolve one extracted `contact_names` list plus the raw memory content
/// into a set of [`ContactId`]s, following spec §4.4's match order:
/// (a) exact explicit label, (b) unique first-token explicit match,
/// (c) full-name snapshot match, (d) first-name snapshot match — plus a
/// content substring scan for every explicit-mention label.
pub fn resolve_contacts(
    content: &str,
    contact_names: &[String],
    snapshot: &[ContactRecord],
    explicit_mentions: &[ExplicitMention],
) -> BTreeSet<ContactId> {
    let mut resolved = BTreeSet::new();

    for name in contact_names {
        if let Some(id) = resolve_one(name, snapshot, explicit_mentions) {
            resolved.insert(id);
        }
    }

    let lower_content = content.to_lowercase();
    for mention in explicit_mentions {
        if lower_content.contains(&mention.label.to_lowercase()) {
            resolved.insert(mention.contact_id.clone());
        }
    }

    resolved
}

fn resolve_one(
    name: &str,
    snapshot: &[ContactRecord],
    explicit_mentions: &[ExplicitMention],
) -> Option<ContactId> {
    // (a) exact explicit label, case-insensitive.
    if let Some(m) = explicit_mentions.iter().find(|m| eq_ignore_case(&m.label, name)) {
        return Some(m.contact_id.clone());
    }

    // (b) exactly one explicit mention whose first token matches the name's
    // first token.
    let name_first = first_token(name);
    let mut first_token_matches = explicit_mentions
        .iter()
        .filter(|m| eq_ignore_case(first_token(&m.label), name_first));
    if let Some(only) = first_token_matches.next() {
        if first_token_matches.next().is_none() {
            return Some(only.contact_id.clone());
        }
    }

    // (c) case-insensitive full-name exact match against the snapshot.
    if let Some(rec) = snapshot.iter().find(|r| eq_ignore_case(&r.name, name)) {
        return Some(rec.id.clone());
    }

    // (d) case-insensitive first-name match against a snapshot name's tokens.
    if let Some(rec) = snapshot.iter().find(|r| eq_ignore_case(first_token(&r.name), name_first)) {
        return Some(rec.id.clone());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cid(s: &str) -> ContactId {
        ContactId::new(s)
    }

    #[test]
    fn exact_explicit_label_wins_first() {
        let snapshot = vec![ContactRecord { id: cid("c_amy"), name: "Amy Chen".into() }];
        let mentions = vec![ExplicitMention { label: "Ames".into(), contact_id: cid("c_ames") }];
        let resolved = resolve_contacts("saw Ames today", &["Ames".to_string()], &snapshot, &mentions);
        assert!(resolved.contains(&cid("c_ames")));
    }

    #[test]
    fn full_name_snapshot_match() {
        let snapshot = vec![ContactRecord { id: cid("c_amy"), name: "Amy Chen".into() }];
        let resolved = resolve_contacts("had lunch", &["Amy Chen".to_string()], &snapshot, &[]);
        assert_eq!(resolved, BTreeSet::from([cid("c_amy")]));
    }

    #[test]
    fn first_name_snapshot_match() {
        let snapshot = vec![ContactRecord { id: cid("c_amy"), name: "Amy Chen".into() }];
        let resolved = resolve_contacts("saw Amy", &["Amy".to_string()], &snapshot, &[]);
        assert_eq!(resolved, BTreeSet::from([cid("c_amy")]));
    }

    #[test]
    fn content_scan_adds_explicit_mentions_regardless_of_contact_names() {
        let mentions = vec![ExplicitMention { label: "mom".into(), contact_id: cid("c_mom") }];
        let resolved = resolve_contacts("called mom after work", &[], &[], &mentions);
        assert_eq!(resolved, BTreeSet::from([cid("c_mom")]));
    }

    #[test]
    fn unresolved_name_is_dropped_silently() {
        let resolved = resolve_contacts("met a stranger", &["Nobody".to_string()], &[], &[]);
        assert!(resolved.is_empty());
    }
}
