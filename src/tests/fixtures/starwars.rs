#![allow(missing_docs)]

use std::collections::HashMap;

use crate::{
    ArgumentDescriptor, Declaration, FieldDescriptor, FieldResult, OptionsBlock, Property,
    Registry, Scalar, SchemaType, TypeRef, Value,
    executor::ResolveInfo,
    schema::meta::{EnumMeta, EnumValue},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Episode {
    NewHope,
    Empire,
    Jedi,
}

impl Episode {
    fn name(self) -> &'static str {
        match self {
            Self::NewHope => "NEW_HOPE",
            Self::Empire => "EMPIRE",
            Self::Jedi => "JEDI",
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value.as_str()? {
            "NEW_HOPE" => Some(Self::NewHope),
            "EMPIRE" => Some(Self::Empire),
            "JEDI" => Some(Self::Jedi),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Species {
    Human,
    Droid,
}

#[derive(Clone, Debug)]
pub struct Character {
    species: Species,
    id: String,
    name: String,
    friend_ids: Vec<String>,
    appears_in: Vec<Episode>,
    secret_backstory: Option<String>,
    home_planet: Option<String>,
    primary_function: Option<String>,
}

impl Character {
    fn human(
        id: &str,
        name: &str,
        friend_ids: &[&str],
        appears_in: &[Episode],
        secret_backstory: Option<&str>,
        home_planet: Option<&str>,
    ) -> Self {
        Self {
            species: Species::Human,
            id: id.to_owned(),
            name: name.to_owned(),
            friend_ids: friend_ids.iter().copied().map(ToOwned::to_owned).collect(),
            appears_in: appears_in.to_vec(),
            secret_backstory: secret_backstory.map(ToOwned::to_owned),
            home_planet: home_planet.map(ToOwned::to_owned),
            primary_function: None,
        }
    }

    fn droid(
        id: &str,
        name: &str,
        friend_ids: &[&str],
        appears_in: &[Episode],
        secret_backstory: Option<&str>,
        primary_function: Option<&str>,
    ) -> Self {
        Self {
            species: Species::Droid,
            id: id.to_owned(),
            name: name.to_owned(),
            friend_ids: friend_ids.iter().copied().map(ToOwned::to_owned).collect(),
            appears_in: appears_in.to_vec(),
            secret_backstory: secret_backstory.map(ToOwned::to_owned),
            home_planet: None,
            primary_function: primary_function.map(ToOwned::to_owned),
        }
    }

    /// Builds the schema value of this character.
    pub fn to_value(&self, info: &ResolveInfo<'_>) -> FieldResult {
        let (ident, extra_attname, extra) = match self.species {
            Species::Human => ("Human", "home_planet", &self.home_planet),
            Species::Droid => ("Droid", "primary_function", &self.primary_function),
        };
        let declaration = info
            .schema()
            .declaration(ident)
            .ok_or_else(|| format!("`{ident}` is not declared"))?;
        let appears_in = self
            .appears_in
            .iter()
            .map(|e| Value::enum_value(e.name()))
            .collect::<Vec<_>>();

        let instance = declaration.instantiate(
            vec![self.id.as_str().into(), self.name.as_str().into()],
            [
                ("appears_in", Value::List(appears_in)),
                (extra_attname, Value::from(extra.clone())),
                ("friend_ids", Value::from(self.friend_ids.clone())),
                ("secret_backstory", Value::from(self.secret_backstory.clone())),
            ],
        )?;
        Ok(instance.into())
    }
}

#[derive(Clone, Default)]
pub struct Database {
    humans: HashMap<String, Character>,
    droids: HashMap<String, Character>,
}

impl Database {
    pub fn new() -> Self {
        let mut humans = HashMap::new();
        let mut droids = HashMap::new();

        humans.insert(
            "1000".to_owned(),
            Character::human(
                "1000",
                "Luke Skywalker",
                &["1002", "1003", "2000", "2001"],
                &[Episode::NewHope, Episode::Empire, Episode::Jedi],
                None,
                Some("Tatooine"),
            ),
        );

        humans.insert(
            "1001".to_owned(),
            Character::human(
                "1001",
                "Darth Vader",
                &["1004"],
                &[Episode::NewHope, Episode::Empire, Episode::Jedi],
                None,
                Some("Tatooine"),
            ),
        );

        humans.insert(
            "1002".to_owned(),
            Character::human(
                "1002",
                "Han Solo",
                &["1000", "1003", "2001"],
                &[Episode::NewHope, Episode::Empire, Episode::Jedi],
                None,
                None,
            ),
        );

        humans.insert(
            "1003".to_owned(),
            Character::human(
                "1003",
                "Leia Organa",
                &["1000", "1002", "2000", "2001"],
                &[Episode::NewHope, Episode::Empire, Episode::Jedi],
                None,
                Some("Alderaan"),
            ),
        );

        humans.insert(
            "1004".to_owned(),
            Character::human(
                "1004",
                "Wilhuff Tarkin",
                &["1001"],
                &[Episode::NewHope],
                None,
                None,
            ),
        );

        droids.insert(
            "2000".to_owned(),
            Character::droid(
                "2000",
                "C-3PO",
                &["1000", "1002", "1003", "2001"],
                &[Episode::NewHope, Episode::Empire, Episode::Jedi],
                None,
                Some("Protocol"),
            ),
        );

        droids.insert(
            "2001".to_owned(),
            Character::droid(
                "2001",
                "R2-D2",
                &["1000", "1002", "1003"],
                &[Episode::NewHope, Episode::Empire, Episode::Jedi],
                None,
                Some("Astromech"),
            ),
        );

        Self { humans, droids }
    }

    pub fn get_hero(&self, episode: Option<Episode>) -> Option<&Character> {
        if episode == Some(Episode::Empire) {
            self.get_human("1000")
        } else {
            self.get_droid("2001")
        }
    }

    pub fn get_human(&self, id: &str) -> Option<&Character> {
        self.humans.get(id)
    }

    pub fn get_droid(&self, id: &str) -> Option<&Character> {
        self.droids.get(id)
    }

    pub fn get_character(&self, id: &str) -> Option<&Character> {
        self.get_human(id).or_else(|| self.get_droid(id))
    }
}

/// Stores `friend_ids` keyword arguments on the instance, outside the field set.
fn friend_ids() -> Property {
    Property::new()
        .getter(|instance| instance.get("friend_ids").cloned().unwrap_or(Value::Null))
        .setter(|instance, value| instance.set("friend_ids", value))
}

fn character_interface() -> Declaration {
    Declaration::interface("Character")
        .doc("A character in the Star Wars Trilogy")
        .field(
            "id",
            FieldDescriptor::new(TypeRef::from(Scalar::String).non_null())
                .description("The id of the character"),
        )
        .field(
            "name",
            FieldDescriptor::new(Scalar::String).description("The name of the character"),
        )
        .field(
            "friends",
            FieldDescriptor::new(TypeRef::named("Character").list())
                .description("The friends of the character")
                .resolver(|source, ctx, info| {
                    let database = ctx.data::<Database>().ok_or("Database is missing")?;
                    let ids = source
                        .as_instance()
                        .and_then(|i| i.attribute("friend_ids"))
                        .unwrap_or(Value::Null);
                    let friends = ids
                        .as_list()
                        .unwrap_or_default()
                        .iter()
                        .filter_map(Value::as_str)
                        .filter_map(|id| database.get_character(id))
                        .map(|c| c.to_value(info))
                        .collect::<FieldResult<Vec<_>>>()?;
                    Ok(Value::List(friends))
                }),
        )
        .field(
            "appears_in",
            FieldDescriptor::new(TypeRef::named("Episode").list())
                .description("Which movies they appear in"),
        )
        .field(
            "secret_backstory",
            FieldDescriptor::new(Scalar::String)
                .description("Where are they from and how they came to be who they are")
                .resolver(|_, _, _| Err("secretBackstory is secret.".into())),
        )
}

fn human_object() -> Declaration {
    Declaration::object("Human")
        .doc("A humanoid creature in the Star Wars universe.")
        .options(OptionsBlock::new().interfaces(["Character"]))
        .field(
            "home_planet",
            FieldDescriptor::new(Scalar::String).description("The home planet of the human"),
        )
        .property("friend_ids", friend_ids())
}

fn droid_object() -> Declaration {
    Declaration::object("Droid")
        .doc("A mechanical creature in the Star Wars universe.")
        .options(OptionsBlock::new().interfaces(["Character"]))
        .field(
            "primary_function",
            FieldDescriptor::new(Scalar::String).description("The primary function of the droid"),
        )
        .property("friend_ids", friend_ids())
}

fn query_object() -> Declaration {
    Declaration::object("Query")
        .doc("The root query object of the schema")
        .field(
            "human",
            FieldDescriptor::new(TypeRef::named("Human"))
                .argument(
                    "id",
                    ArgumentDescriptor::new(TypeRef::from(Scalar::String).non_null())
                        .description("id of the human"),
                )
                .resolver(|_, ctx, info| {
                    let database = ctx.data::<Database>().ok_or("Database is missing")?;
                    let id = info.arguments().get_str("id").unwrap_or_default();
                    database
                        .get_human(id)
                        .map_or(Ok(Value::Null), |h| h.to_value(info))
                }),
        )
        .field(
            "droid",
            FieldDescriptor::new(TypeRef::named("Droid"))
                .argument(
                    "id",
                    ArgumentDescriptor::new(TypeRef::from(Scalar::String).non_null())
                        .description("id of the droid"),
                )
                .resolver(|_, ctx, info| {
                    let database = ctx.data::<Database>().ok_or("Database is missing")?;
                    let id = info.arguments().get_str("id").unwrap_or_default();
                    database
                        .get_droid(id)
                        .map_or(Ok(Value::Null), |d| d.to_value(info))
                }),
        )
        .field(
            "hero",
            FieldDescriptor::new(TypeRef::named("Character"))
                .argument(
                    "episode",
                    ArgumentDescriptor::new(TypeRef::named("Episode")).description(
                        "If omitted, returns the hero of the whole saga. \
                         If provided, returns the hero of that particular episode",
                    ),
                )
                .resolver(|_, ctx, info| {
                    let database = ctx.data::<Database>().ok_or("Database is missing")?;
                    let episode = info.arguments().get("episode").and_then(Episode::from_value);
                    database
                        .get_hero(episode)
                        .map_or(Ok(Value::Null), |c| c.to_value(info))
                }),
        )
}

fn episode_enum() -> EnumMeta {
    EnumMeta::new(
        "Episode",
        vec![
            EnumValue::new("NEW_HOPE").description("Released in 1977."),
            EnumValue::new("EMPIRE").description("Released in 1980."),
            EnumValue::new("JEDI").description("Released in 1983."),
        ],
    )
    .description("One of the films in the Star Wars Trilogy")
}

/// Registers the Star Wars declarations into `registry`.
pub fn register(registry: &mut Registry) {
    registry
        .register_type(episode_enum().into_meta())
        .expect("`Episode` registers");
    for declaration in [
        character_interface(),
        human_object(),
        droid_object(),
        query_object(),
    ] {
        registry
            .register(declaration)
            .expect("Star Wars declarations register");
    }
}

/// The finished Star Wars schema.
pub fn schema() -> SchemaType {
    let mut registry = Registry::new();
    register(&mut registry);
    registry.finish("Query").expect("`Query` is an object")
}
