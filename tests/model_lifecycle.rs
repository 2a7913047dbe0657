//! Integration tests for building, creating, finding and updating records.

mod support;

use active_store::{
    Backend, Filter, InMemoryBackend, MemoryStorage, Model, ModelError, ModelSettings, Schema,
    StorageBackend,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use support::{person, Person, RecordingBackend, Write};

fn people() -> Model<Person> {
    Model::new(InMemoryBackend::new(), ModelSettings::default())
}

#[test]
fn model_takes_schema_name() {
    assert_eq!(Person::NAME, "person");
    assert_eq!(people().name(), "person");

    let renamed = Model::<Person>::with_name("staff", InMemoryBackend::new(), ModelSettings::default());
    assert_eq!(renamed.name(), "staff");
}

#[test]
fn built_record_has_no_id_until_saved() {
    let people = people();

    let mut johnrey = people.build_default();
    assert!(johnrey.id().is_none());
    assert!(!johnrey.has_id());

    johnrey.name = "johnrey".into();
    johnrey.age = 1;
    assert!(people.list().unwrap().is_empty());

    johnrey.save().unwrap();
    let id = johnrey.id().unwrap().to_string();
    assert!(!id.is_empty());

    johnrey.age = 2;
    johnrey.save().unwrap();
    johnrey.save().unwrap();
    assert_eq!(johnrey.id(), Some(id.as_str()));

    let stored = people.get(&id).unwrap().unwrap();
    assert_eq!(stored.name, "johnrey");
    assert_eq!(stored.age, 2);
    assert_eq!(people.list().unwrap().len(), 1);
}

#[test]
fn build_with_data_then_save() {
    let people = people();

    let mut jane = people.build(Person {
        name: "jane doe".into(),
        age: 3,
        hobbies: vec!["acting".into()],
    });
    jane.save().unwrap();

    let found = people.find_by_id(jane.id().unwrap()).unwrap().unwrap();
    assert_eq!(found.data(), jane.data());
}

#[test]
fn create_assigns_id_and_persists() {
    let people = people();

    let mut doe = people.create(person("john doe", 2)).unwrap();
    let id = doe.id().unwrap().to_string();
    assert!(people.get(&id).unwrap().is_some());

    doe.name = "ghege".into();
    doe.save().unwrap();
    assert_eq!(doe.id(), Some(id.as_str()));
    assert_eq!(people.get(&id).unwrap().unwrap().name, "ghege");
}

#[test]
fn create_many_uses_one_bulk_call() {
    let backend = RecordingBackend::new();
    let people = Model::<Person>::new(backend.clone(), ModelSettings::default());

    let created = people
        .create_many(vec![person("1", 1), person("2", 1), person("3", 1)])
        .unwrap();

    assert_eq!(backend.writes(), vec![Write::BulkCreate(3)]);
    let names: Vec<_> = created.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["1", "2", "3"]);
    assert!(created.iter().all(|p| p.id().is_some()));
}

#[test]
fn create_many_with_nothing_skips_backend() {
    let backend = RecordingBackend::new();
    let people = Model::<Person>::new(backend.clone(), ModelSettings::default());

    let created = people.create_many(Vec::new()).unwrap();
    assert!(created.is_empty());
    assert!(backend.writes().is_empty());
}

#[test]
fn created_ids_never_collide() {
    let people = people();
    let mut ids = HashSet::new();

    for i in 0..200 {
        let record = people.create(person("p", i)).unwrap();
        assert!(ids.insert(record.id().unwrap().to_string()));
    }
    let batch = people
        .create_many((0..200).map(|i| person("q", i)))
        .unwrap();
    for record in &batch {
        assert!(ids.insert(record.id().unwrap().to_string()));
    }
    assert_eq!(ids.len(), 400);
}

#[test]
fn lookups_signal_absence_with_none() {
    let people = people();
    people.create(person("someone", 5)).unwrap();

    assert!(people.get("missing").unwrap().is_none());
    assert!(people.find_by_id("missing").unwrap().is_none());
    assert!(people
        .find_one(&Filter::new().eq("name", "nobody"))
        .unwrap()
        .is_none());
    assert!(people
        .update("missing", &json!({ "age": 1 }))
        .unwrap()
        .is_none());
    assert!(people.find(&Filter::new().eq("age", 99)).unwrap().is_empty());
}

#[test]
fn find_matches_every_filter_field() {
    let people = people();
    people
        .create_many(vec![person("1", 1), person("2", 1), person("3", 2)])
        .unwrap();

    let age_one = people.find(&Filter::new().eq("age", 1)).unwrap();
    let names: Vec<_> = age_one.iter().map(|p| p.name.clone()).collect();
    assert_eq!(names, vec!["1", "2"]);

    let exact = people
        .find(&Filter::new().eq("age", 1).eq("name", "2"))
        .unwrap();
    assert_eq!(exact.len(), 1);
    assert_eq!(exact[0].name, "2");

    let from_json = Filter::from_serialize(&json!({ "hobbies": [] })).unwrap();
    assert_eq!(people.find(&from_json).unwrap().len(), 3);
}

#[test]
fn find_one_returns_first_in_backend_order() {
    let people = people();
    people
        .create_many(vec![person("a", 7), person("b", 7)])
        .unwrap();

    let first = people
        .find_one(&Filter::new().eq("age", 7))
        .unwrap()
        .unwrap();
    assert_eq!(first.name, "a");
}

#[test]
fn find_one_record_is_live() {
    let people = people();
    people
        .create(Person {
            name: "jane doe".into(),
            age: 3,
            hobbies: vec!["acting".into()],
        })
        .unwrap();

    let mut jane = people
        .find_one(&Filter::new().eq("name", "jane doe"))
        .unwrap()
        .unwrap();
    jane.age = 33;
    jane.save().unwrap();

    let reloaded = people.find_by_id(jane.id().unwrap()).unwrap().unwrap();
    assert_eq!(reloaded.age, 33);
    assert_eq!(reloaded.hobbies, vec!["acting".to_string()]);
}

#[test]
fn update_merges_patch_and_keeps_identity() {
    let people = people();
    let created = people.create(person("before", 1)).unwrap();
    let id = created.id().unwrap();

    let updated = people
        .update(id, &json!({ "id": "hijack", "age": 10 }))
        .unwrap()
        .unwrap();
    assert_eq!(updated.id(), Some(id));
    assert_eq!(updated.age, 10);
    assert_eq!(updated.name, "before");
    assert!(people.get("hijack").unwrap().is_none());
}

#[test]
fn update_rejects_non_object_patch() {
    let people = people();
    let created = people.create(person("x", 1)).unwrap();

    let err = people.update(created.id().unwrap(), &42).unwrap_err();
    assert!(matches!(err, ModelError::NotAnObject { .. }));
}

#[test]
fn hard_delete_removes_record() {
    let people = people();
    let created = people.create(person("gone", 1)).unwrap();
    let id = created.id().unwrap().to_string();

    assert!(people.delete(&id).unwrap());
    assert!(people.get(&id).unwrap().is_none());
    assert!(!people.delete(&id).unwrap());
}

#[test]
fn truncate_removes_everything() {
    let people = people();
    people
        .create_many(vec![person("1", 1), person("2", 2)])
        .unwrap();

    people.truncate().unwrap();
    assert!(people.list().unwrap().is_empty());
}

#[test]
fn independent_copies_last_write_wins() {
    let people = people();
    let id = people
        .create(person("original", 1))
        .unwrap()
        .id()
        .unwrap()
        .to_string();

    let mut first = people.find_by_id(&id).unwrap().unwrap();
    let mut second = people.find_by_id(&id).unwrap().unwrap();

    first.name = "first".into();
    first.save().unwrap();
    assert_eq!(second.name, "original");
    assert_eq!(people.get(&id).unwrap().unwrap().name, "first");

    second.age = 50;
    second.save().unwrap();
    let stored = people.get(&id).unwrap().unwrap();
    assert_eq!(stored.name, "original");
    assert_eq!(stored.age, 50);
}

#[test]
fn backend_failures_propagate() {
    let backend = RecordingBackend::new();
    let people = Model::<Person>::new(backend, ModelSettings::default());

    let err = people.create(person("boom", 1)).unwrap_err();
    assert!(matches!(err, ModelError::Backend(_)));

    let mut record = people.build(person("boom", 1));
    assert!(record.save().is_err());
    assert!(record.id().is_none());
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Schema)]
struct Contact {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    nickname: Option<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

fn cleared_fields_stay_cleared(backend: impl Backend + 'static) {
    let contacts = Model::<Contact>::new(backend, ModelSettings::default());
    let mut contact = contacts
        .create(Contact {
            name: "ann".into(),
            nickname: Some("x".into()),
            extra: BTreeMap::from([("color".to_string(), json!("red"))]),
        })
        .unwrap();
    let id = contact.id().unwrap().to_string();

    contact.nickname = None;
    contact.extra.clear();
    contact.save().unwrap();

    assert_eq!(contact.nickname, None);
    assert!(contact.extra.is_empty());

    let stored = contacts.get(&id).unwrap().unwrap();
    assert_eq!(stored.nickname, None);
    assert!(stored.extra.is_empty());

    let doc = stored.to_document().unwrap();
    assert!(!doc.contains_key("nickname"));
    assert!(!doc.contains_key("color"));
    assert_eq!(doc["id"], json!(id));
}

#[test]
fn save_drops_cleared_fields_in_memory() {
    cleared_fields_stay_cleared(InMemoryBackend::new());
}

#[test]
fn save_drops_cleared_fields_in_storage() {
    cleared_fields_stay_cleared(StorageBackend::new(MemoryStorage::new(), "contact"));
}

#[test]
fn has_id_survives_hard_delete() {
    let people = people();
    let mut record = people.create(person("gone", 1)).unwrap();
    assert!(record.has_id());

    assert!(record.delete().unwrap());
    assert!(record.has_id());
    assert!(people.get(record.id().unwrap()).unwrap().is_none());
}
