use notekeep_core::{resolve_notes, RawNote, Tag};

#[test]
fn raw_note_serialization_uses_camel_case_wire_fields() {
    let note = RawNote {
        id: "n-1".to_string(),
        title: "Groceries".to_string(),
        markdown: "- milk\n- eggs".to_string(),
        tag_ids: vec!["t-2".to_string(), "t-1".to_string()],
    };

    let json = serde_json::to_value(&note).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "id": "n-1",
            "title": "Groceries",
            "markdown": "- milk\n- eggs",
            "tagIds": ["t-2", "t-1"]
        })
    );

    let decoded: RawNote = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, note);
}

#[test]
fn previously_stored_values_decode() {
    let stored = r#"[{"id":"a","title":"","markdown":"","tagIds":[]}]"#;
    let notes: Vec<RawNote> = serde_json::from_str(stored).unwrap();
    assert_eq!(notes.len(), 1);
    assert!(notes[0].tag_ids.is_empty());

    let tags: Vec<Tag> = serde_json::from_str(r#"[{"id":"t","label":"work"}]"#).unwrap();
    assert_eq!(tags, vec![Tag::new("t", "work")]);
}

#[test]
fn resolution_matches_live_tags_in_tag_id_order() {
    let t1 = Tag::new("t1", "one");
    let t2 = Tag::new("t2", "two");
    let t3 = Tag::new("t3", "three");
    let tags = vec![t1.clone(), t2.clone(), t3.clone()];
    let note = RawNote {
        id: "n".to_string(),
        title: String::new(),
        markdown: String::new(),
        tag_ids: vec![
            "t3".to_string(),
            "missing".to_string(),
            "t1".to_string(),
            "t3".to_string(),
        ],
    };

    let resolved = resolve_notes(std::slice::from_ref(&note), &tags);
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].id, note.id);
    assert_eq!(resolved[0].tags, vec![t3.clone(), t1, t3]);
    assert!(!resolved[0].has_tag("t2"));
    assert!(!resolved[0].has_tag("missing"));
}
