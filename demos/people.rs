use active_store::{Filter, MemoryStorage, ModelError, ModelRegistry, ModelSettings, Schema, StorageBackend};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize, Schema)]
struct Person {
    name: String,
    age: u32,
    hobbies: Vec<String>,
}

fn main() -> Result<(), ModelError> {
    // One storage area, like a browser's localStorage
    let storage = MemoryStorage::new();
    let registry = ModelRegistry::new();

    let settings = ModelSettings::new().timestamps(true).soft_delete(true);
    let people = registry.model::<Person>(StorageBackend::new(storage, Person::NAME), settings)?;

    // Build, mutate, save
    let mut johnrey = people.build_default();
    johnrey.name = "johnrey".to_string();
    johnrey.age = 1;
    johnrey.save()?;
    println!("Saved: {:?}", johnrey);

    // Create in one step
    let mut doe = people.create(Person {
        name: "john doe".to_string(),
        age: 2,
        hobbies: vec![],
    })?;
    doe.name = "ghege".to_string();
    doe.save()?;

    // Bulk create, then save a whole collection
    people.create_many((1..=3).map(|i| Person {
        name: i.to_string(),
        age: 1,
        hobbies: vec![],
    }))?;

    let mut everyone = people.list()?;
    everyone[1].name = "PERSON 1".to_string();
    everyone.save()?;

    // Soft delete everyone aged 1
    for person in &mut people.find(&Filter::new().eq("age", 1))? {
        person.delete()?;
    }

    match people.find_one(&Filter::new().eq("name", "ghege"))? {
        Some(found) => println!("Found: {:?}", found),
        None => println!("Nobody called ghege"),
    }

    for person in &people.list()? {
        println!(
            "{} {:<10} deleted={}",
            person.id().unwrap_or("-"),
            person.name,
            person.is_deleted()
        );
    }

    registry.truncate_all()?;
    Ok(())
}
